//! Plays back a capture of transport messages, one JSON document per line.
//!
//! Blank lines and lines starting with `#` are skipped.

use crate::prelude::*;

use transport::ChannelData;

use tokio::io::{AsyncBufReadExt, BufReader};

pub fn parse_line(line: &str) -> Result<Option<ChannelData>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let message = serde_json::from_str(line)?;
    Ok(Some(message))
}

#[derive(Clone)]
pub struct Replay {
    file: String,
    channels: Channels,
}

impl Replay {
    pub fn new(file: String, channels: Channels) -> Self {
        Self { file, channels }
    }

    /// Sends every message in the capture, returning how many were sent. A
    /// line that does not parse is logged and skipped.
    pub async fn start(&self) -> Result<usize> {
        info!("replaying transport capture {}", self.file);

        let file = tokio::fs::File::open(&self.file)
            .await
            .map_err(|err| crate::file_error_with_source!(err, "error opening {}", self.file))?;
        let mut lines = BufReader::new(file).lines();

        let mut sent = 0;
        let mut line_number = 0;
        while let Some(line) = lines.next_line().await? {
            line_number += 1;

            let message = match parse_line(&line) {
                Ok(Some(message)) => message,
                Ok(None) => continue,
                Err(e) => {
                    warn!("{}:{}: skipping unreadable line: {}", self.file, line_number, e);
                    continue;
                }
            };

            if self.channels.from_transport.send(message).is_err() {
                bail!("send(from_transport) failed - channel closed?");
            }
            sent += 1;

            // let the coordinator keep up with the broadcast buffer
            tokio::task::yield_now().await;
        }

        info!("replay of {} finished, {} messages sent", self.file, sent);
        Ok(sent)
    }
}
