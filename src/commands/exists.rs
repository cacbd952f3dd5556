use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

pub struct ExistsArguments {
    keys: Vec<Bytes>,
}

impl ExistsArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.is_empty() {
            return Err(CommandError::WrongNumberOfArguments("EXISTS"));
        }

        Ok(Self { keys: arguments })
    }
}

/// Handles the EXISTS command. A key listed twice is counted twice.
pub async fn exists(store: &Store, arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let exists_arguments = ExistsArguments::parse(arguments)?;

    Ok(RespValue::Integer(store.exists(&exists_arguments.keys).await))
}
