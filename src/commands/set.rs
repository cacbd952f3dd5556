use bytes::Bytes;
use tokio::time::Instant;

use crate::{
    commands::command_error::CommandError,
    resp::RespValue,
    store::{Store, StringEntry, expiration_from_seconds},
};

/// Represents the parsed arguments for SET command
pub struct SetArguments {
    /// The key name to store under
    key: Bytes,
    /// The value to be stored under the given key
    value: Bytes,
    /// Expiration of key value pair
    expiration: Option<Instant>,
}

impl SetArguments {
    /// Parses command arguments into a SetArguments structure.
    ///
    /// # Arguments
    ///
    /// * `arguments` - The command arguments:
    ///   - Format 1: `[key, value]` - For permanent storage
    ///   - Format 2: `[key, value, "EX", seconds]` - For expiring storage
    ///
    /// # Expiration Logic
    ///
    /// The third argument must be exactly `EX` (case-sensitive) and the fourth
    /// must parse as a signed integer for an expiration to be set. Any other
    /// option, a missing seconds value, or a value that is not an integer
    /// stores the key without expiration instead of failing. Arguments past
    /// the fourth are ignored. Very large values are clamped rather than
    /// overflowing the clock.
    ///
    /// # Returns
    ///
    /// * `Ok(SetArguments)` - Successfully parsed arguments
    /// * `Err(CommandError::WrongNumberOfArguments)` - If key or value is missing
    pub fn parse(arguments: Vec<Bytes>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments("SET"));
        }

        let mut expiration: Option<Instant> = None;

        if let (Some(option), Some(seconds)) = (arguments.get(2), arguments.get(3)) {
            if option.as_ref() == b"EX" {
                if let Some(seconds) = std::str::from_utf8(seconds)
                    .ok()
                    .and_then(|text| text.parse::<i64>().ok())
                {
                    expiration = expiration_from_seconds(seconds);
                }
            }
        }

        Ok(Self {
            key: arguments[0].clone(),
            value: arguments[1].clone(),
            expiration,
        })
    }
}

/// Handles the SET command.
///
/// Stores a key-value pair in the string keyspace, replacing any previous
/// value and expiration.
///
/// # Examples
///
/// ```ignore
/// // SET mykey "hello" EX 10  (expires in 10 seconds)
/// let result = set(&store, vec![
///     Bytes::from("mykey"),
///     Bytes::from("hello"),
///     Bytes::from("EX"),
///     Bytes::from("10"),
/// ]).await;
/// // Returns: RespValue::SimpleString("OK")
/// ```
pub async fn set(store: &Store, arguments: Vec<Bytes>) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    store
        .set(
            set_arguments.key,
            StringEntry::with_expiration(set_arguments.value, set_arguments.expiration),
        )
        .await;

    Ok(RespValue::simple_string("OK"))
}
