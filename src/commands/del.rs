use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

pub struct DelArguments {
    keys: Vec<Bytes>,
}

impl DelArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("DEL"));
        }

        Ok(Self { keys: arguments })
    }
}

/// Handles the DEL command.
///
/// Expired keys that have not been evicted yet still count as deleted.
pub async fn del(store: &Store, arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let del_arguments = DelArguments::parse(arguments)?;

    Ok(RespValue::Integer(store.del(&del_arguments.keys).await))
}
