use thiserror::Error;

use crate::{resp::RespValue, store::StoreError};

/// Errors returned to the client as a RESP error value.
///
/// The `Display` text is the exact message the client sees after the
/// `Error ` prefix added by the encoder.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Expected array of bulk strings")]
    ExpectedBulkStringArray,
    #[error("Null array command")]
    NullArrayCommand,
    #[error("Unknown command")]
    UnknownCommand,
    #[error("wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    pub fn as_resp(&self) -> RespValue {
        RespValue::Error(self.to_string())
    }
}
