use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

pub struct HgetallArguments {
    key: Bytes,
}

impl HgetallArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        let [key]: [Bytes; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("HGETALL"))?;

        Ok(Self { key })
    }
}

/// Handles the HGETALL command.
///
/// Replies with a flat array `[field, value, field, value, ...]` ordered by
/// field. A missing hash replies with an empty array.
pub async fn hgetall(store: &Store, arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let hgetall_arguments = HgetallArguments::parse(arguments)?;

    let elements = store
        .hgetall(&hgetall_arguments.key)
        .await
        .into_iter()
        .flat_map(|(field, value)| [RespValue::BulkString(field), RespValue::BulkString(value)])
        .collect();

    Ok(RespValue::Array(elements))
}
