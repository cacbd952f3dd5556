use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    aof::Aof,
    commands::{CommandError, CommandHandler},
    resp::RespValue,
    store::Store,
};

/// Routes decoded requests to their handlers, appending write commands to
/// the persistence log first.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    store: Arc<Store>,
    aof: Option<Arc<Aof>>,
}

impl CommandDispatcher {
    pub fn new(store: Arc<Store>, aof: Option<Arc<Aof>>) -> Self {
        Self { store, aof }
    }

    /// Runs one request and returns the value to send back. Every failure
    /// becomes a RESP error value; nothing here closes the connection.
    pub async fn dispatch(&self, input: RespValue) -> RespValue {
        match self.try_dispatch(input).await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "command rejected");
                e.as_resp()
            }
        }
    }

    async fn try_dispatch(&self, input: RespValue) -> Result<RespValue, CommandError> {
        let command_handler = CommandHandler::new(input)?;

        if let Some(e) = command_handler.validate_command_arguments() {
            return Err(e);
        }

        if command_handler.command.is_write() {
            if let Some(aof) = &self.aof {
                // A failed append is reported but the command still runs.
                if let Err(e) = aof.append(&command_handler.input).await {
                    error!(
                        command = command_handler.command.name(),
                        error = %e,
                        "failed to append command to persistence log"
                    );
                }
            }
        }

        command_handler.handle_command(&self.store).await
    }
}
