use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue};

pub struct EchoArguments {
    message: Bytes,
}

impl EchoArguments {
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        let [message]: [Bytes; 1] = arguments
            .try_into()
            .map_err(|_| CommandError::WrongNumberOfArguments("ECHO"))?;

        Ok(Self { message })
    }
}

/// Handles the ECHO command.
///
/// Returns the single argument back to the client as a bulk string.
///
/// # Examples
///
/// ```ignore
/// // ECHO "hello world"
/// let result = echo(vec![Bytes::from("hello world")]);
/// // Returns: RespValue::BulkString("hello world")
/// ```
pub fn echo(arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let echo_arguments = EchoArguments::parse(arguments)?;

    Ok(RespValue::BulkString(echo_arguments.message))
}
