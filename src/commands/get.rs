use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

pub struct GetArguments {
    key: Bytes,
}

impl GetArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        let [key]: [Bytes; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("GET"))?;

        Ok(Self { key })
    }
}

/// Handles the GET command.
///
/// Returns the value stored at the key, or a null bulk string when the key
/// is missing or expired. An expired key is removed as a side effect.
pub async fn get(store: &Store, arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    match store.get(&get_arguments.key).await {
        Some(value) => Ok(RespValue::BulkString(value)),
        None => Ok(RespValue::NullBulkString),
    }
}
