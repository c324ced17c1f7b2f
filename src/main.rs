use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use sparkpost_splunk_adapter::config::Config;
use sparkpost_splunk_adapter::splunk::Forwarder;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    sparkpost_splunk_adapter::set_up_logging();

    info!(
        "Initializing {} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::load_from_env()?;
    let forwarder = Forwarder::new(&config)?;

    info!(
        destination = forwarder.destination_url(),
        mode = %config.forward_mode,
        record_error_policy = %config.record_error_policy,
        "adapter configured"
    );

    run(service_fn(|request: LambdaEvent<ApiGatewayProxyRequest>| {
        sparkpost_splunk_adapter::handler(&forwarder, &config, request)
    }))
    .await
}
