//! Append-only persistence log.
//!
//! Every accepted write command is appended to a single file in its exact
//! RESP encoding, with no header or checksum. At startup the file is
//! replayed through the same handlers as live traffic to rebuild the store.
//! A background task fsyncs the file on a fixed interval, so an append is
//! acknowledged before it is necessarily on stable storage.

use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use thiserror::Error;
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncSeekExt, AsyncWriteExt, BufReader},
    sync::Mutex,
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, warn};

use crate::{
    commands::CommandHandler,
    resp::{RespReader, RespValue},
    store::Store,
};

pub const DEFAULT_AOF_PATH: &str = "data/redis-lite/database.aof";

#[derive(Error, Debug)]
pub enum AofError {
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("persistence log I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of replaying the log into a store.
#[derive(Debug, Default, PartialEq)]
pub struct ReplaySummary {
    /// Records whose handler ran successfully.
    pub applied: usize,
    /// Records that decoded but were not valid commands or whose handler
    /// returned an error.
    pub rejected: usize,
    /// Bytes cut from the end of the file because they did not decode.
    pub truncated_bytes: u64,
}

#[derive(Debug)]
pub struct Aof {
    path: PathBuf,
    file: Mutex<File>,
}

impl Aof {
    /// Opens the log for reading and appending, creating the file and its
    /// parent directories if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AofError> {
        let path = path.as_ref().to_path_buf();

        if let Some(directory) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(directory)
                .await
                .map_err(|source| AofError::CreateDirectory {
                    path: directory.to_path_buf(),
                    source,
                })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .await
            .map_err(|source| AofError::Open {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replays every record into `store`, in file order.
    ///
    /// Records are applied without being appended again. Replay stops at the
    /// first frame that fails to decode; that frame and everything after it
    /// is truncated so that later appends are not stranded behind it.
    pub async fn replay(&self, store: &Store) -> Result<ReplaySummary, AofError> {
        let mut file = self.file.lock().await;
        file.seek(SeekFrom::Start(0)).await?;

        let mut summary = ReplaySummary::default();
        let mut valid_length: u64 = 0;
        let mut corrupted = false;

        {
            let mut reader = RespReader::new(BufReader::new(&mut *file));

            loop {
                let value = match reader.read_value().await {
                    Ok(Some(value)) => value,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(
                            path = %self.path.display(),
                            offset = valid_length,
                            error = %e,
                            "unreadable record in persistence log, discarding the rest"
                        );
                        corrupted = true;
                        break;
                    }
                };
                valid_length = reader.consumed();

                let command_handler = match CommandHandler::new(value) {
                    Ok(handler) => handler,
                    Err(e) => {
                        warn!(offset = valid_length, error = %e, "skipping invalid record");
                        summary.rejected += 1;
                        continue;
                    }
                };

                match command_handler.handle_command(store).await {
                    Ok(_) => summary.applied += 1,
                    Err(e) => {
                        debug!(
                            command = command_handler.command.name(),
                            error = %e,
                            "replayed command returned an error"
                        );
                        summary.rejected += 1;
                    }
                }
            }
        }

        if corrupted {
            let file_length = file.metadata().await?.len();
            file.set_len(valid_length).await?;
            summary.truncated_bytes = file_length.saturating_sub(valid_length);
        }

        info!(
            path = %self.path.display(),
            applied = summary.applied,
            rejected = summary.rejected,
            truncated_bytes = summary.truncated_bytes,
            "replayed persistence log"
        );

        Ok(summary)
    }

    /// Appends the encoded request to the end of the log.
    pub async fn append(&self, request: &RespValue) -> Result<(), AofError> {
        let mut file = self.file.lock().await;
        file.write_all(&request.encode()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Forces appended data to stable storage.
    pub async fn sync(&self) -> Result<(), AofError> {
        let file = self.file.lock().await;
        file.sync_all().await?;

        Ok(())
    }

    /// Spawns the task that fsyncs the log every `interval`. It runs until
    /// the returned handle is aborted or the runtime shuts down.
    pub fn spawn_fsync_task(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if let Err(e) = self.sync().await {
                    error!(path = %self.path.display(), error = %e, "failed to fsync persistence log");
                }
            }
        })
    }
}
