//! SparkPost webhook batches and their Splunk HEC counterparts.
//!
//! A SparkPost webhook POSTs a JSON array where every element wraps exactly one
//! event two levels deep:
//!
//! ```json
//! [{"msys": {"message_event": {"type": "delivery", "timestamp": "1460989507", ...}}}]
//! ```
//!
//! The outer keys are only structural. Every innermost field map becomes one
//! [`NormalizedRecord`]. An empty array is the "ping" SparkPost sends when a
//! webhook is created and translates to no records at all.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::RecordErrorPolicy;
use crate::error::AdapterError;

/// Value of the HEC `source` field for every record.
pub const EVENT_SOURCE: &str = "sparkpost";

/// Value of the HEC `host` field when the caller's address is unknown.
pub const UNKNOWN_HOST: &str = "unknown";

pub type EventFields = Map<String, Value>;

/// `{ wrapper_key: { event_type_key: { field: value } } }`
pub type InboundEvent = BTreeMap<String, BTreeMap<String, EventFields>>;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub time: i64,
    pub host: String,
    pub source: String,
    pub event: EventFields,
}

impl NormalizedRecord {
    fn from_fields(fields: EventFields, host: &str) -> Result<Self, AdapterError> {
        let time = parse_timestamp(&fields)?;
        Ok(NormalizedRecord {
            time,
            host: host.to_string(),
            source: EVENT_SOURCE.to_string(),
            event: fields,
        })
    }
}

pub fn parse_batch(body: &str) -> Result<Vec<InboundEvent>, AdapterError> {
    serde_json::from_str::<Vec<InboundEvent>>(body).map_err(AdapterError::malformed)
}

/// Translates a raw webhook body into HEC records.
///
/// `host` is the caller's source address, if API Gateway exposed one.
pub fn translate(
    body: &str,
    host: Option<&str>,
    policy: RecordErrorPolicy,
) -> Result<Vec<NormalizedRecord>, AdapterError> {
    translate_batch(parse_batch(body)?, host, policy)
}

/// Same as [`translate`] for a batch that has already been parsed.
pub fn translate_batch(
    batch: Vec<InboundEvent>,
    host: Option<&str>,
    policy: RecordErrorPolicy,
) -> Result<Vec<NormalizedRecord>, AdapterError> {
    let host = host.filter(|h| !h.is_empty()).unwrap_or(UNKNOWN_HOST);

    if batch.is_empty() {
        debug!("empty webhook batch, nothing to translate");
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, event) in batch.into_iter().enumerate() {
        for (wrapper, typed) in event {
            for (event_type, fields) in typed {
                match NormalizedRecord::from_fields(fields, host) {
                    Ok(record) => records.push(record),
                    Err(e) if policy == RecordErrorPolicy::Skip => {
                        warn!(
                            index,
                            wrapper = %wrapper,
                            event_type = %event_type,
                            error = %e,
                            "skipping event"
                        );
                        skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    debug!(records = records.len(), skipped, "translated webhook batch");
    Ok(records)
}

fn parse_timestamp(fields: &EventFields) -> Result<i64, AdapterError> {
    match fields.get("timestamp") {
        Some(Value::String(raw)) => raw.parse::<i64>().map_err(|e| AdapterError::FieldConversion {
            reason: format!("timestamp {:?} is not a base-10 integer - {}", raw, e),
        }),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| AdapterError::FieldConversion {
            reason: format!("timestamp {} is not an integer", n),
        }),
        Some(other) => Err(AdapterError::FieldConversion {
            reason: format!("timestamp has unexpected type: {}", other),
        }),
        None => Err(AdapterError::FieldConversion {
            reason: "timestamp field is missing".to_string(),
        }),
    }
}
