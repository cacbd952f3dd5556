use bytes::Bytes;

use crate::{
    commands::{
        command::command,
        command_error::CommandError,
        del::{DelArguments, del},
        echo::{EchoArguments, echo},
        exists::{ExistsArguments, exists},
        get::{GetArguments, get},
        hget::{HgetArguments, hget},
        hgetall::{HgetallArguments, hgetall},
        hset::{HsetArguments, hset},
        incr::{IncrArguments, incr},
        ping::{PingArguments, ping},
        set::{SetArguments, set},
    },
    resp::RespValue,
    store::Store,
};

/// Every command the server routes. Adding a variant here, to [`Command::ALL`]
/// and to the matches in [`CommandHandler`] is all a new command needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Echo,
    Command,
    Set,
    Get,
    Exists,
    Del,
    Incr,
    Hset,
    Hget,
    Hgetall,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::Ping,
        Command::Echo,
        Command::Command,
        Command::Set,
        Command::Get,
        Command::Exists,
        Command::Del,
        Command::Incr,
        Command::Hset,
        Command::Hget,
        Command::Hgetall,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::Echo => "ECHO",
            Command::Command => "COMMAND",
            Command::Set => "SET",
            Command::Get => "GET",
            Command::Exists => "EXISTS",
            Command::Del => "DEL",
            Command::Incr => "INCR",
            Command::Hset => "HSET",
            Command::Hget => "HGET",
            Command::Hgetall => "HGETALL",
        }
    }

    /// Looks up an upper-cased command name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    /// Write commands are appended to the persistence log before they run.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Command::Set | Command::Incr | Command::Hset | Command::Del
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub command: Command,
    pub arguments: Vec<Bytes>,
    /// The request exactly as decoded, kept for the persistence log.
    pub input: RespValue,
}

impl CommandHandler {
    pub fn new(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = &input else {
            return Err(CommandError::ExpectedBulkStringArray);
        };

        if elements.is_empty() {
            return Err(CommandError::NullArrayCommand);
        }

        let mut parts: Vec<Bytes> = Vec::with_capacity(elements.len());

        for element in elements {
            match element {
                RespValue::BulkString(data) => parts.push(data.clone()),
                _ => return Err(CommandError::ExpectedBulkStringArray),
            }
        }

        let arguments = parts.split_off(1);
        let name = String::from_utf8_lossy(&parts[0]).to_uppercase();
        let command = Command::from_name(&name).ok_or(CommandError::UnknownCommand)?;

        Ok(Self {
            command,
            arguments,
            input,
        })
    }

    pub fn validate_command_arguments(&self) -> Option<CommandError> {
        let arguments = self.arguments.clone();

        match self.command {
            Command::Ping => PingArguments::parse(arguments).err(),
            Command::Echo => EchoArguments::parse(arguments).err(),
            Command::Command => None,
            Command::Set => SetArguments::parse(arguments).err(),
            Command::Get => GetArguments::parse(arguments).err(),
            Command::Exists => ExistsArguments::parse(arguments).err(),
            Command::Del => DelArguments::parse(arguments).err(),
            Command::Incr => IncrArguments::parse(arguments).err(),
            Command::Hset => HsetArguments::parse(arguments).err(),
            Command::Hget => HgetArguments::parse(arguments).err(),
            Command::Hgetall => HgetallArguments::parse(arguments).err(),
        }
    }

    /// Applies the command to the store. Shared by live traffic and log
    /// replay; nothing here touches the persistence log.
    pub async fn handle_command(&self, store: &Store) -> Result<RespValue, CommandError> {
        let arguments = self.arguments.clone();

        match self.command {
            Command::Ping => ping(arguments),
            Command::Echo => echo(arguments),
            Command::Command => command(arguments),
            Command::Set => set(store, arguments).await,
            Command::Get => get(store, arguments).await,
            Command::Exists => exists(store, arguments).await,
            Command::Del => del(store, arguments).await,
            Command::Incr => incr(store, arguments).await,
            Command::Hset => hset(store, arguments).await,
            Command::Hget => hget(store, arguments).await,
            Command::Hgetall => hgetall(store, arguments).await,
        }
    }
}
