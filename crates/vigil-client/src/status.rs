//! Status queries and liveness interpretation.
//!
//! A watchtower's liveness is reported by the registry as the instant of its
//! own last successful login. An absent (or empty) timestamp means it has
//! never authenticated — a valid outcome, not an error. A present but
//! malformed timestamp indicates a protocol mismatch and fails loudly.

use chrono::{DateTime, Utc};
use tracing::debug;

use vigil_core::{VigilError, VigilResult};
use vigil_protocol::{ApiResponse, StatusRequest, StatusResult};

use crate::config::ClientConfig;
use crate::session::{post_json, Session};

/// Result of one status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    /// Identifier the query was made for, echoed by the service
    pub id: String,
    /// Instant of the watchtower's last successful login; `None` means it has
    /// never authenticated
    pub last_alive: Option<DateTime<Utc>>,
}

impl StatusRecord {
    /// Human-readable status line at the given reference instant.
    pub fn report_line(&self, now: DateTime<Utc>) -> String {
        match self.last_alive {
            None => format!("{} has not logged in", self.id),
            Some(at) => {
                let elapsed = (now - at).num_seconds();
                format!("{} last alive: {} ago", self.id, format_duration(elapsed))
            }
        }
    }
}

impl Session {
    /// Query the liveness status of one identifier over this session.
    pub async fn query_status(&self, id: &str) -> VigilResult<StatusRecord> {
        debug!(id, "status query");
        let body = StatusRequest { id: id.to_string() };
        let url = self.config.endpoint(ClientConfig::CHALLENGER_PATH);
        let response: ApiResponse<StatusResult> = post_json(&self.http, &url, &body).await?;
        decode_record(response.result)
    }

    /// Query several identifiers sequentially on this session.
    ///
    /// Returns one record per identifier, in input order. Queries are
    /// independent of each other, but any individual failure aborts the call.
    pub async fn query_many(&self, ids: &[String]) -> VigilResult<Vec<StatusRecord>> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push(self.query_status(id).await?);
        }
        Ok(records)
    }
}

/// Interpret a wire status result. The service reports "never authenticated"
/// as either a missing field or an empty string; both map to `None` and must
/// not reach the timestamp parser.
fn decode_record(result: StatusResult) -> VigilResult<StatusRecord> {
    let last_alive = match result.last_alive.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|e| {
                    VigilError::timestamp_parse(format!("invalid last_alive '{}': {}", raw, e))
                })?
                .with_timezone(&Utc),
        ),
    };

    Ok(StatusRecord {
        id: result.id,
        last_alive,
    })
}

/// Render a whole-second duration the way the operator tooling prints it:
/// `10s`, `1m10s`, `1h0m10s`.
fn format_duration(total_seconds: i64) -> String {
    // Clock skew can put last_alive slightly in the future
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
