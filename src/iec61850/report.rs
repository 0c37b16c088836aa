use crate::iec61850::Node;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Entry times count milliseconds from 1984-01-01T00:00:00Z; this is the
/// distance from the unix epoch to that date.
pub const ENTRY_TIME_OFFSET_MS: i64 = 441_763_200_000;

// ReasonForInclusion {{{
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonForInclusion {
    pub reference: Option<String>,
    pub data_change: bool,
    pub quality_change: bool,
    pub data_update: bool,
    pub integrity: bool,
    pub general_interrogation: bool,
    pub application_trigger: bool,
}

impl ReasonForInclusion {
    pub fn info(&self) -> String {
        let flags = [
            (self.application_trigger, "ApplicationTrigger"),
            (self.data_change, "DataChange"),
            (self.data_update, "DataUpdate"),
            (self.general_interrogation, "GeneralInterrogation"),
            (self.integrity, "Integrity"),
            (self.quality_change, "QualityChange"),
        ];
        join_set(&flags)
    }
} // }}}

// OptFields {{{
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptFields {
    pub buffer_overflow: bool,
    pub config_revision: bool,
    pub data_reference: bool,
    pub data_set_name: bool,
    pub entry_id: bool,
    pub reason_for_inclusion: bool,
    pub report_timestamp: bool,
    pub segmentation: bool,
    pub sequence_number: bool,
}

impl OptFields {
    pub fn info(&self) -> String {
        let flags = [
            (self.buffer_overflow, "BufferOverflow"),
            (self.config_revision, "ConfigRevision"),
            (self.data_reference, "DataReference"),
            (self.data_set_name, "DataSetName"),
            (self.entry_id, "EntryId"),
            (self.reason_for_inclusion, "ReasonForInclusion"),
            (self.report_timestamp, "ReportTimestamp"),
            (self.segmentation, "Segmentation"),
            (self.sequence_number, "SequenceNumber"),
        ];
        join_set(&flags)
    }
} // }}}

fn join_set(flags: &[(bool, &str)]) -> String {
    flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

// Report {{{
/// An unsolicited report as handed over by the protocol client. Immutable
/// once received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub device_identification: String,
    pub rpt_id: String,
    pub data_set_ref: String,
    #[serde(default)]
    pub sq_num: Option<u32>,
    #[serde(default)]
    pub sub_sq_num: Option<u32>,
    #[serde(default)]
    pub buf_ovfl: bool,
    #[serde(default)]
    pub more_segments_follow: bool,
    #[serde(default)]
    pub conf_rev: Option<u32>,
    #[serde(default)]
    pub entry_id: Option<String>,
    /// Raw entry time, milliseconds since 1984-01-01.
    #[serde(default)]
    pub time_of_entry: Option<i64>,
    #[serde(default)]
    pub reason_codes: Vec<ReasonForInclusion>,
    #[serde(default)]
    pub opt_flds: Option<OptFields>,
    #[serde(default)]
    pub members: Vec<Node>,
}

impl Report {
    /// Entry time corrected to the unix epoch.
    pub fn entry_time(&self) -> Option<DateTime<Utc>> {
        self.time_of_entry
            .and_then(|ms| ms.checked_add(ENTRY_TIME_OFFSET_MS))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// One-line envelope used as log context for everything done with this report.
    pub fn description(&self) -> String {
        let entry_time = self
            .entry_time()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        let sq_num = self
            .sq_num
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let sub_sq_num = self
            .sub_sq_num
            .map(|s| format!(" subSqNum: {}", s))
            .unwrap_or_default();
        let segments = if self.more_segments_follow {
            " (more segments follow for this sqNum)"
        } else {
            ""
        };

        format!(
            "device: {}, reportId: {}, timeOfEntry: {}, sqNum: {}{}{}",
            self.device_identification, self.rpt_id, entry_time, sq_num, sub_sq_num, segments
        )
    }

    /// Multi-line dump of the envelope and members.
    pub fn details(&self) -> String {
        let mut s = format!("Report details for device {}\n", self.device_identification);

        let opt = |v: Option<String>| v.unwrap_or_else(|| "null".to_string());

        let _ = writeln!(s, "\t             RptId:\t{}", self.rpt_id);
        let _ = writeln!(s, "\t        DataSetRef:\t{}", self.data_set_ref);
        let _ = writeln!(s, "\t           ConfRev:\t{}", opt(self.conf_rev.map(|v| v.to_string())));
        let _ = writeln!(s, "\t           BufOvfl:\t{}", self.buf_ovfl);
        let _ = writeln!(s, "\t           EntryId:\t{}", opt(self.entry_id.clone()));
        let _ = writeln!(s, "\tMoreSegmentsFollow:\t{}", self.more_segments_follow);
        let _ = writeln!(s, "\t             SqNum:\t{}", opt(self.sq_num.map(|v| v.to_string())));
        let _ = writeln!(s, "\t          SubSqNum:\t{}", opt(self.sub_sq_num.map(|v| v.to_string())));
        let _ = writeln!(s, "\t       TimeOfEntry:\t{}", opt(self.time_of_entry.map(|v| v.to_string())));
        if let Some(entry_time) = self.entry_time() {
            let _ = writeln!(s, "\t                   \t({})", entry_time.to_rfc3339());
        }

        if !self.reason_codes.is_empty() {
            let _ = writeln!(s, "\t       ReasonCodes:");
            for reason in &self.reason_codes {
                let _ = writeln!(
                    s,
                    "\t                   \t{}\t({})",
                    reason.reference.as_deref().unwrap_or("-"),
                    reason.info()
                );
            }
        }

        match &self.opt_flds {
            Some(opt_flds) => {
                let _ = writeln!(s, "\t           optFlds:\t({})", opt_flds.info());
            }
            None => {
                let _ = writeln!(s, "\t           optFlds:\tnull");
            }
        }

        let _ = writeln!(s, "\t   DataSet members:\t{}", self.members.len());
        for member in &self.members {
            for line in member.to_string().lines() {
                let _ = writeln!(s, "\t            member:\t{}", line);
            }
        }

        s
    }
} // }}}
