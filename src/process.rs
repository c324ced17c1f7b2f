use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use base64::prelude::*;
use http::Method;
use tracing::{debug, info, warn};

use crate::config::{Config, ForwardMode};
use crate::error::AdapterError;
use crate::events;
use crate::splunk::{self, ForwardResult, Forwarder};

/// Runs one API Gateway request through translation and forwarding.
pub async fn request(
    forwarder: &Forwarder,
    config: &Config,
    req: ApiGatewayProxyRequest,
) -> Result<ForwardResult, AdapterError> {
    if req.http_method != Method::POST {
        return Err(AdapterError::UnsupportedMethod(req.http_method));
    }

    let body = request_body(&req)?;
    let (payload, ping) = match config.forward_mode {
        ForwardMode::Translate => {
            let batch = events::parse_batch(&body)?;
            let ping = batch.is_empty();
            let source_ip = req.request_context.identity.source_ip.as_deref();
            let records = events::translate_batch(batch, source_ip, config.record_error_policy)?;
            if records.is_empty() && !ping {
                warn!("every event in the batch was skipped, forwarding an empty payload");
            }
            info!(records = records.len(), ping, "translated webhook batch");
            (splunk::encode(&records)?, ping)
        }
        ForwardMode::Passthrough => {
            debug!("passthrough mode, forwarding body untouched");
            let ping = is_ping(&body);
            (body, ping)
        }
    };

    forwarder.forward(payload, &req.headers, ping).await
}

// the validation ping SparkPost sends when a webhook is created
fn is_ping(body: &str) -> bool {
    events::parse_batch(body)
        .map(|batch| batch.is_empty())
        .unwrap_or(false)
}

fn request_body(req: &ApiGatewayProxyRequest) -> Result<String, AdapterError> {
    let Some(body) = req.body.as_deref() else {
        return Ok(String::new());
    };

    if !req.is_base64_encoded {
        return Ok(body.to_string());
    }

    let decoded = BASE64_STANDARD
        .decode(body)
        .map_err(|e| AdapterError::malformed(format!("invalid base64 body - {}", e)))?;
    String::from_utf8(decoded)
        .map_err(|e| AdapterError::malformed(format!("body is not valid UTF-8 - {}", e)))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn proxy_request(method: &str, body: Option<&str>, base64: bool) -> ApiGatewayProxyRequest {
        serde_json::from_value(json!({
            "resource": "/webhook",
            "path": "/webhook",
            "httpMethod": method,
            "headers": {},
            "multiValueHeaders": {},
            "queryStringParameters": {},
            "multiValueQueryStringParameters": {},
            "pathParameters": {},
            "stageVariables": {},
            "requestContext": {
                "accountId": "123456789012",
                "resourceId": "abc123",
                "stage": "prod",
                "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
                "identity": { "sourceIp": "52.24.112.9" },
                "resourcePath": "/webhook",
                "httpMethod": method,
                "apiId": "1234567890"
            },
            "body": body,
            "isBase64Encoded": base64
        }))
        .expect("failed to build proxy request")
    }

    #[test]
    fn test_is_ping() {
        assert!(is_ping("[]"));
        assert!(is_ping(" [ ]\n"));
        assert!(!is_ping(""));
        assert!(!is_ping(r#"[{"msys": {"message_event": {"timestamp": "1"}}}]"#));
        assert!(!is_ping(r#"{"event": "already shaped"}"#));
    }

    #[test]
    fn test_request_body_plain() {
        let req = proxy_request("POST", Some("[]"), false);
        assert_eq!(request_body(&req).unwrap(), "[]");
    }

    #[test]
    fn test_request_body_missing() {
        let req = proxy_request("POST", None, false);
        assert_eq!(request_body(&req).unwrap(), "");
    }

    #[test]
    fn test_request_body_base64() {
        let encoded = BASE64_STANDARD.encode(r#"[{"msys":{}}]"#);
        let req = proxy_request("POST", Some(&encoded), true);
        assert_eq!(request_body(&req).unwrap(), r#"[{"msys":{}}]"#);

        let req = proxy_request("POST", Some("%%% not base64"), true);
        assert!(matches!(
            request_body(&req).unwrap_err(),
            AdapterError::MalformedInput(_)
        ));

        let invalid_utf8 = BASE64_STANDARD.encode([0xff, 0xfe, 0xfd]);
        let req = proxy_request("POST", Some(&invalid_utf8), true);
        assert!(matches!(
            request_body(&req).unwrap_err(),
            AdapterError::MalformedInput(_)
        ));
    }

    #[tokio::test]
    async fn test_request_rejects_other_methods() {
        // nothing listens here; an outbound attempt would surface as a transport error
        let config = Config::new("http://127.0.0.1:9/services/collector");
        let forwarder = Forwarder::new(&config).unwrap();

        for method in ["GET", "PUT", "DELETE", "PATCH"] {
            let req = proxy_request(method, Some("[]"), false);
            let err = request(&forwarder, &config, req).await.unwrap_err();
            assert!(
                matches!(err, AdapterError::UnsupportedMethod(ref m) if m.as_str() == method),
                "{} gave {:?}",
                method,
                err
            );
        }
    }
}
