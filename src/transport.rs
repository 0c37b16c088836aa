//! Messages from the protocol client side: association life cycle and the
//! reports received on it.

use crate::iec61850::Report;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelData {
    /// Association up; `sq_num` is the device's buffered high-water mark.
    Associated { device: String, sq_num: u32 },
    Report(Box<Report>),
    AssociationClosed {
        device: String,
        #[serde(default)]
        cause: Option<String>,
    },
    Shutdown,
}

pub type Sender = tokio::sync::broadcast::Sender<ChannelData>;
