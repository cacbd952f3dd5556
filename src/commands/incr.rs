use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

pub struct IncrArguments {
    key: Bytes,
}

impl IncrArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        let [key]: [Bytes; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("INCR"))?;

        Ok(Self { key })
    }
}

pub async fn incr(store: &Store, arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let incr_arguments = IncrArguments::parse(arguments)?;

    let incremented = store.incr(incr_arguments.key).await?;

    Ok(RespValue::Integer(incremented))
}
