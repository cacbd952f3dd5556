use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue, store::Store};

pub struct HsetArguments {
    key: Bytes,
    pairs: Vec<(Bytes, Bytes)>,
}

impl HsetArguments {
    /// Expects `[key, field, value, field, value, ...]` with at least one
    /// complete field/value pair.
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() < 3 || arguments.len() % 2 == 0 {
            return Err(CommandError::WrongNumberOfArguments("HSET"));
        }

        let mut arguments = arguments.into_iter();
        let key = arguments
            .next()
            .ok_or(CommandError::WrongNumberOfArguments("HSET"))?;

        let mut pairs = Vec::new();
        while let (Some(field), Some(value)) = (arguments.next(), arguments.next()) {
            pairs.push((field, value));
        }

        Ok(Self { key, pairs })
    }
}

/// Handles the HSET command and replies with the number of pairs written,
/// counting overwritten fields too.
pub async fn hset(store: &Store, arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let hset_arguments = HsetArguments::parse(arguments)?;

    let written = store.hset(hset_arguments.key, hset_arguments.pairs).await;

    Ok(RespValue::Integer(written))
}
