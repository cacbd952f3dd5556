use tokio::{io::BufReader, net::TcpStream};
use tracing::{debug, error, warn};

use crate::{
    commands::CommandDispatcher,
    resp::{RespError, RespReader, RespValue, write_value},
};

/// Serves one client until it disconnects.
///
/// Requests are handled strictly one at a time: decode a frame, dispatch it,
/// write and flush the reply. A malformed frame gets a single error reply
/// and the loop keeps reading, except for a line too long to buffer, which
/// is answered and then closes the connection. No lock is held while
/// reading from or writing to the client.
pub async fn handle_client_connection(
    stream: TcpStream,
    client_address: String,
    dispatcher: CommandDispatcher,
) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = RespReader::new(BufReader::new(reader));

    loop {
        let response = match reader.read_value().await {
            Ok(Some(input)) => dispatcher.dispatch(input).await,
            Ok(None) => {
                debug!(client = %client_address, "connection closed");
                break;
            }
            Err(RespError::Io(e)) => {
                warn!(client = %client_address, error = %e, "error reading from stream");
                break;
            }
            Err(e @ RespError::LineTooLong(_)) => {
                warn!(client = %client_address, error = %e, "closing connection");
                if let Err(e) = write_value(&mut writer, &invalid_request_format()).await {
                    error!(client = %client_address, error = %e, "error writing to stream");
                }
                break;
            }
            Err(e) => {
                warn!(client = %client_address, error = %e, "invalid request format");
                invalid_request_format()
            }
        };

        if let Err(e) = write_value(&mut writer, &response).await {
            error!(client = %client_address, error = %e, "error writing to stream");
        }
    }
}

fn invalid_request_format() -> RespValue {
    RespValue::Error("Invalid request format".to_string())
}
