use bytes::Bytes;

use crate::{
    commands::{command_error::CommandError, command_handler::Command},
    resp::RespValue,
};

/// Handles the COMMAND command. Arguments are accepted and ignored; the
/// reply lists every command name the server routes.
pub fn command(_arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    Ok(RespValue::Array(
        Command::ALL
            .iter()
            .map(|command| RespValue::bulk_string(command.name()))
            .collect(),
    ))
}
