use std::path::Path;

use anyhow::Context as _;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use lambda_runtime::{Error, LambdaEvent};
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::AdapterError;
use crate::splunk::{ForwardResult, Forwarder};

pub mod config;
pub mod error;
pub mod events;
pub mod process;
pub mod splunk;

pub fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();
}

// lambda handler
pub async fn handler(
    forwarder: &Forwarder,
    config: &Config,
    evt: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let req = evt.payload;
    info!(
        method = %req.http_method,
        path = req.path.as_deref().unwrap_or_default(),
        request_id = req.request_context.request_id.as_deref().unwrap_or_default(),
        "Handling lambda invocation"
    );

    match process::request(forwarder, config, req).await {
        Ok(result) => {
            info!(status = result.status_code, "webhook forwarded");
            Ok(result.into())
        }
        Err(AdapterError::UnsupportedMethod(method)) => {
            warn!(%method, "unsupported method");
            Ok(ForwardResult::unsupported_method().into())
        }
        Err(e) => {
            error!(error = %e, "failed to forward webhook");
            Err(e.into())
        }
    }
}

/// Reads an API Gateway proxy request saved as JSON, for local runs.
pub fn load_request(path: &Path) -> anyhow::Result<ApiGatewayProxyRequest> {
    let raw =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).context("failed to parse API Gateway proxy request")
}
