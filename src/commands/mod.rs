mod command;
mod command_dispatcher;
mod command_error;
mod command_handler;
mod del;
mod echo;
mod exists;
mod get;
mod hget;
mod hgetall;
mod hset;
mod incr;
mod ping;
mod set;

pub use command_dispatcher::CommandDispatcher;
pub use command_error::CommandError;
pub use command_handler::{Command, CommandHandler};
