//! Runs the adapter once against an API Gateway proxy request stored on disk.
//!
//! Configuration comes from the same environment variables as the Lambda
//! function, so `DESTINATION_URL` must point at a reachable HEC endpoint.

use std::path::PathBuf;

use anyhow::anyhow;
use aws_lambda_events::encodings::Body;
use clap::Parser;
use lambda_runtime::LambdaEvent;
use sparkpost_splunk_adapter::config::Config;
use sparkpost_splunk_adapter::splunk::Forwarder;

#[derive(Parser, Debug)]
#[command(name = "simulate", version, about = "Simulate a webhook invocation locally")]
struct Args {
    /// JSON file holding an API Gateway proxy request
    request_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sparkpost_splunk_adapter::set_up_logging();
    let args = Args::parse();

    let req = sparkpost_splunk_adapter::load_request(&args.request_file)?;

    let config = Config::load_from_env().map_err(|e| anyhow!(e))?;
    let forwarder = Forwarder::new(&config)?;

    let event = LambdaEvent::new(req, lambda_runtime::Context::default());
    let res = sparkpost_splunk_adapter::handler(&forwarder, &config, event)
        .await
        .map_err(|e| anyhow!(e))?;

    let body = match res.body {
        Some(Body::Text(text)) => text,
        Some(Body::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        _ => String::new(),
    };
    println!("Status code:\t {}", res.status_code);
    println!("Body:\t {}", body);
    println!("Base64:\t {}", res.is_base64_encoded);

    Ok(())
}
