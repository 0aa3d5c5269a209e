//! Report values and their single-line JSON rendering
//!
//! Every read renders exactly one JSON object followed by a newline, with
//! `": "` and `", "` separators, e.g. `{"units": 10, "start": 7, ...}`.

use serde::{Serialize, Serializer};
use std::io;

use crate::error::{CalibrationFailure, RaplcalError, Result};
use crate::metrics::rapl::types::{CalibrationSample, Outcome, TimingSample};

/// Outcome of one traversal of the report state machine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report<T> {
    Ready(T),
    /// A gate failed or the synchronizer hit its poll ceiling
    Failed {
        #[serde(serialize_with = "as_display")]
        error: CalibrationFailure,
    },
    /// The hardware or host could not be reached
    Unavailable { error: String },
}

pub type CalibrationReport = Report<CalibrationSample>;
pub type TimingReport = Report<TimingSample>;

fn as_display<S: Serializer>(failure: &CalibrationFailure, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(failure)
}

impl<T: Serialize> Report<T> {
    /// Fold the result of a traversal into a report
    pub fn settle(result: Result<T>) -> Self {
        match result {
            Ok(value) => Report::Ready(value),
            Err(RaplcalError::Calibration(error)) => {
                tracing::warn!("Report refused: {}", error);
                Report::Failed { error }
            }
            Err(e) => {
                tracing::error!("Report aborted: {}", e);
                Report::Unavailable {
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Report::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Report::Ready(_) => Outcome::Ok,
            Report::Failed {
                error: CalibrationFailure::SyncTimeout { .. },
            } => Outcome::Timeout,
            Report::Failed { .. } => Outcome::Unsupported,
            Report::Unavailable { .. } => Outcome::Fault,
        }
    }

    /// JSON object line with trailing newline
    pub fn render(&self) -> String {
        let mut out = Vec::with_capacity(96);
        let mut ser = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
        if let Err(e) = self.serialize(&mut ser) {
            tracing::error!("Failed to render report: {}", e);
            return "{\"error\": \"render failed\"}\n".to_string();
        }
        out.push(b'\n');
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Render into a caller-supplied buffer, truncating like `scnprintf`
    ///
    /// Returns the number of bytes written.
    pub fn render_into(&self, buf: &mut [u8]) -> usize {
        let text = self.render();
        let len = text.len().min(buf.len());
        buf[..len].copy_from_slice(&text.as_bytes()[..len]);
        len
    }
}

/// Compact JSON with a space after `:` and `,`
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}
