//! Remote sync client for lead records.
//!
//! Every wizard action posts the entire current record; the save endpoint
//! upserts by `lead_id`, so resubmitting a step never duplicates a lead.
//! One attempt per call, no retry loop: the flow surfaces the failure text
//! and the user retries by repeating the same action.

use crate::record::LeadRecord;
use serde::Deserialize;
use thiserror::Error;
use ureq::Agent;

/// Failure surfaced to the user when a submission does not land.
///
/// `Display` yields exactly the text the presentation layer shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Server answered outside 2xx.
    #[error("HTTP {status}")]
    Status { status: u16 },
    /// Server answered 2xx but did not acknowledge the lead.
    #[error("{message}")]
    Rejected { message: String },
    /// Connection, DNS, TLS, or interrupted-body failure.
    #[error("{message}")]
    Transport { message: String },
    /// 2xx with a body this client cannot decode.
    #[error("unreadable server response: {message}")]
    Malformed { message: String },
}

/// Successful acknowledgement. `lead_id` is set when the server assigned
/// or echoed an identifier; an absent id never clears a known one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncAck {
    pub lead_id: Option<String>,
}

/// Submission port; the controller is written against this seam.
pub trait LeadGateway {
    fn submit(&mut self, record: &LeadRecord) -> Result<SyncAck, SyncError>;
}

impl<G: LeadGateway + ?Sized> LeadGateway for Box<G> {
    fn submit(&mut self, record: &LeadRecord) -> Result<SyncAck, SyncError> {
        (**self).submit(record)
    }
}

/// Wire shape of the save endpoint's reply. Older deployments send the
/// failure text in `message` where newer ones use `error`; accept both.
#[derive(Debug, Deserialize)]
struct SaveReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    lead_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map one HTTP exchange onto an ack or a user-facing error.
fn decode_reply(status: u16, body: &str) -> Result<SyncAck, SyncError> {
    if !(200..=299).contains(&status) {
        return Err(SyncError::Status { status });
    }
    let reply: SaveReply = serde_json::from_str(body).map_err(|err| SyncError::Malformed {
        message: err.to_string(),
    })?;
    if !reply.ok {
        let message = reply
            .error
            .or(reply.message)
            .unwrap_or_else(|| "Save failed".to_string());
        return Err(SyncError::Rejected { message });
    }
    Ok(SyncAck {
        lead_id: reply.lead_id,
    })
}

/// HTTP gateway over the configured save endpoint.
pub struct HttpGateway {
    agent: Agent,
    endpoint: String,
}

impl HttpGateway {
    /// Transport timeouts stay at the agent defaults; non-2xx statuses are
    /// decoded here rather than surfaced as transport errors.
    pub fn new(endpoint: String) -> HttpGateway {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        HttpGateway {
            agent: config.into(),
            endpoint,
        }
    }
}

impl LeadGateway for HttpGateway {
    fn submit(&mut self, record: &LeadRecord) -> Result<SyncAck, SyncError> {
        let started = std::time::Instant::now();
        let mut response = self
            .agent
            .post(self.endpoint.as_str())
            .header("content-type", "application/json")
            .send_json(record)
            .map_err(|err| SyncError::Transport {
                message: err.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| SyncError::Transport {
                message: err.to_string(),
            })?;
        let result = decode_reply(status, &body);
        tracing::debug!(
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "lead submission round trip"
        );
        result
    }
}

/// Local acknowledger for offline runs and demos.
///
/// Assigns sequential ids the way the real endpoint would on first save and
/// echoes an existing id afterwards.
#[derive(Debug)]
pub struct LoopbackGateway {
    next_serial: u32,
}

impl LoopbackGateway {
    pub fn new() -> LoopbackGateway {
        LoopbackGateway { next_serial: 1 }
    }
}

impl Default for LoopbackGateway {
    fn default() -> Self {
        LoopbackGateway::new()
    }
}

impl LeadGateway for LoopbackGateway {
    fn submit(&mut self, record: &LeadRecord) -> Result<SyncAck, SyncError> {
        if let Some(existing) = record.lead_id() {
            return Ok(SyncAck {
                lead_id: Some(existing.to_string()),
            });
        }
        let id = format!("LOCAL{:04}", self.next_serial);
        self.next_serial += 1;
        tracing::debug!(lead_id = %id, "loopback ack assigned id");
        Ok(SyncAck { lead_id: Some(id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LeadPatch, KEY_LEAD_ID};

    #[test]
    fn decode_accepts_ack_with_lead_id() {
        let ack = decode_reply(200, r#"{"ok":true,"lead_id":"CS0001"}"#).expect("ack");
        assert_eq!(ack.lead_id.as_deref(), Some("CS0001"));
    }

    #[test]
    fn decode_accepts_ack_without_lead_id() {
        let ack = decode_reply(200, r#"{"ok":true}"#).expect("ack");
        assert_eq!(ack.lead_id, None);
    }

    #[test]
    fn decode_maps_non_2xx_to_status_error() {
        let err = decode_reply(500, "whatever").expect_err("status error");
        assert_eq!(err, SyncError::Status { status: 500 });
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn decode_prefers_error_text_over_message() {
        let err =
            decode_reply(200, r#"{"ok":false,"error":"x","message":"y"}"#).expect_err("rejected");
        assert_eq!(err.to_string(), "x");
    }

    #[test]
    fn decode_falls_back_to_message_then_default_text() {
        let err = decode_reply(200, r#"{"ok":false,"message":"y"}"#).expect_err("rejected");
        assert_eq!(err.to_string(), "y");
        let err = decode_reply(200, r#"{"ok":false}"#).expect_err("rejected");
        assert_eq!(err.to_string(), "Save failed");
    }

    #[test]
    fn decode_treats_missing_ok_flag_as_failure() {
        let err = decode_reply(200, r#"{"lead_id":"CS0001"}"#).expect_err("rejected");
        assert_eq!(
            err,
            SyncError::Rejected {
                message: "Save failed".to_string()
            }
        );
    }

    #[test]
    fn decode_flags_unreadable_bodies() {
        let err = decode_reply(200, "<html>oops</html>").expect_err("malformed");
        assert!(matches!(err, SyncError::Malformed { .. }));
    }

    #[test]
    fn loopback_assigns_then_echoes_ids() {
        let mut gateway = LoopbackGateway::new();
        let first = gateway
            .submit(&LeadRecord::new())
            .expect("loopback never fails");
        assert_eq!(first.lead_id.as_deref(), Some("LOCAL0001"));

        let recorded =
            LeadRecord::new().merged(&LeadPatch::new().set(KEY_LEAD_ID, "LOCAL0001"));
        let second = gateway.submit(&recorded).expect("loopback never fails");
        assert_eq!(second.lead_id.as_deref(), Some("LOCAL0001"));

        let third = gateway
            .submit(&LeadRecord::new())
            .expect("loopback never fails");
        assert_eq!(third.lead_id.as_deref(), Some("LOCAL0002"));
    }
}
