use std::env;
use std::fmt;
use std::str::FromStr;
use std::string::String;
use std::time::Duration;

pub struct Config {
    pub destination_url: String,
    pub request_timeout: Duration,
    // skips TLS certificate validation on the outbound HEC client only
    pub accept_invalid_certs: bool,
    pub forward_mode: ForwardMode,
    pub record_error_policy: RecordErrorPolicy,
}

/// Selects whether inbound batches are reshaped into HEC records or
/// forwarded as received.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum ForwardMode {
    #[default]
    Translate,
    /// Forwards the raw body. The `[]` validation ping is still sent as `[]`
    /// but counts as a ping when mapping the HEC response.
    Passthrough,
}

impl FromStr for ForwardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "translate" => Ok(ForwardMode::Translate),
            "passthrough" => Ok(ForwardMode::Passthrough),
            other => Err(format!("Invalid or Unsupported forward mode {}", other)),
        }
    }
}

impl fmt::Display for ForwardMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What the translator does with an event whose timestamp cannot be converted.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum RecordErrorPolicy {
    /// Abort the whole batch on the first bad record.
    #[default]
    Fail,
    /// Drop the bad record and keep going.
    Skip,
}

impl FromStr for RecordErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(RecordErrorPolicy::Fail),
            "skip" => Ok(RecordErrorPolicy::Skip),
            other => Err(format!("Invalid or Unsupported record error policy {}", other)),
        }
    }
}

impl fmt::Display for RecordErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Config {
    pub fn new(destination_url: impl Into<String>) -> Config {
        Config {
            destination_url: destination_url.into(),
            request_timeout: Duration::from_secs(30),
            accept_invalid_certs: true,
            forward_mode: ForwardMode::default(),
            record_error_policy: RecordErrorPolicy::default(),
        }
    }

    pub fn load_from_env() -> Result<Config, String> {
        let conf = Config {
            destination_url: env::var("DESTINATION_URL")
                .map_err(|e| format!("DESTINATION_URL not set - {}", e))?,
            request_timeout: env::var("REQUEST_TIMEOUT")
                .unwrap_or("30".to_string())
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| format!("Error parsing REQUEST_TIMEOUT to u64 - {}", e))?,
            accept_invalid_certs: env::var("ACCEPT_INVALID_CERTS")
                .unwrap_or("true".to_string())
                .to_lowercase()
                .parse::<bool>()
                .map_err(|e| format!("Error parsing ACCEPT_INVALID_CERTS to bool - {}", e))?,
            forward_mode: env::var("FORWARD_MODE")
                .unwrap_or("translate".to_string())
                .parse::<ForwardMode>()?,
            record_error_policy: env::var("RECORD_ERROR_POLICY")
                .unwrap_or("fail".to_string())
                .parse::<RecordErrorPolicy>()?,
        };

        if conf.destination_url.trim().is_empty() {
            return Err("DESTINATION_URL is empty".to_string());
        }

        Ok(conf)
    }
}
