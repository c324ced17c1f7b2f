use std::time::Instant;

use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::encodings::Body;
use http::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AdapterError;
use crate::events::NormalizedRecord;

/// Sent as `User-Agent` on every HEC request, whatever the caller sent.
pub const ADAPTER_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Inbound headers copied onto the HEC request. Everything else is dropped.
pub const FORWARDED_HEADERS: [http::header::HeaderName; 4] =
    [ACCEPT_ENCODING, ACCEPT, AUTHORIZATION, CONTENT_TYPE];

// HEC answers an empty batch with this code
const HEC_NO_DATA_CODE: i64 = 5;
const HEC_NO_DATA_TEXT: &str = "No data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardResult {
    pub status_code: u16,
    pub body: String,
}

impl ForwardResult {
    pub fn unsupported_method() -> Self {
        ForwardResult {
            status_code: 404,
            body: "Unsupported method".to_string(),
        }
    }
}

impl From<ForwardResult> for ApiGatewayProxyResponse {
    fn from(result: ForwardResult) -> Self {
        let mut response = ApiGatewayProxyResponse::default();
        response.status_code = i64::from(result.status_code);
        response.body = Some(Body::Text(result.body));
        response
    }
}

#[derive(Deserialize)]
struct HecStatus {
    code: i64,
    text: String,
}

/// Line-delimited JSON, one HEC event object per line.
pub fn encode(records: &[NormalizedRecord]) -> Result<String, AdapterError> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<String>, _>>()
        .map_err(AdapterError::Serialize)?;
    Ok(lines.join("\n"))
}

pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in FORWARDED_HEADERS.iter() {
        for value in inbound.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers.insert(USER_AGENT, HeaderValue::from_static(ADAPTER_USER_AGENT));
    headers
}

/// Makes the webhook validation ping look successful.
///
/// HEC rejects an empty batch with `{"code":5,"text":"No data"}`, which would
/// stop SparkPost from registering the webhook. `ping` is true only when the
/// inbound batch itself was empty; a batch emptied by skipped records is not
/// a ping and keeps the HEC status.
pub fn remap_response(ping: bool, status_code: u16, body: String) -> ForwardResult {
    if ping && status_code >= 400 && is_no_data(&body) {
        warn!(status_code, body = %body, "remapping HEC 'No data' response for empty payload");
        return ForwardResult {
            status_code: 200,
            body: format!(
                "Empty payload: remapped HEC status code {} to 200. Original body: {}",
                status_code, body
            ),
        };
    }

    ForwardResult { status_code, body }
}

fn is_no_data(body: &str) -> bool {
    serde_json::from_str::<HecStatus>(body)
        .map(|s| s.code == HEC_NO_DATA_CODE && s.text == HEC_NO_DATA_TEXT)
        .unwrap_or(false)
}

/// A single HTTPS client bound to the configured HEC endpoint.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: reqwest::Client,
    destination_url: String,
}

impl Forwarder {
    pub fn new(config: &Config) -> Result<Self, AdapterError> {
        if config.accept_invalid_certs {
            info!(
                destination = %config.destination_url,
                "certificate validation disabled for HEC client"
            );
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Forwarder {
            client,
            destination_url: config.destination_url.clone(),
        })
    }

    pub fn destination_url(&self) -> &str {
        &self.destination_url
    }

    /// POSTs `payload` to HEC and maps the response for the original caller.
    ///
    /// `ping` marks SparkPost's empty validation batch, see [`remap_response`].
    pub async fn forward(
        &self,
        payload: String,
        inbound_headers: &HeaderMap,
        ping: bool,
    ) -> Result<ForwardResult, AdapterError> {
        let bytes = payload.len();
        let headers = outbound_headers(inbound_headers);
        debug!(?headers, "sending payload to HEC");

        let start = Instant::now();
        let response = self
            .client
            .post(&self.destination_url)
            .headers(headers)
            .body(payload)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let body = response.text().await?;

        info!(
            status = status_code,
            bytes,
            elapsed_ms = start.elapsed().as_millis(),
            uri = %self.destination_url,
            "HEC HTTP request completed"
        );

        Ok(remap_response(ping, status_code, body))
    }
}
