use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

pub struct HgetArguments {
    key: Bytes,
    field: Bytes,
}

impl HgetArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        let mut arguments = arguments.into_iter();

        let (Some(key), Some(field)) = (arguments.next(), arguments.next()) else {
            return Err(CommandError::WrongNumberOfArguments("HGET"));
        };

        Ok(Self { key, field })
    }
}

pub async fn hget(store: &Store, arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let hget_arguments = HgetArguments::parse(arguments)?;

    match store.hget(&hget_arguments.key, &hget_arguments.field).await {
        Some(value) => Ok(RespValue::BulkString(value)),
        None => Ok(RespValue::NullBulkString),
    }
}
