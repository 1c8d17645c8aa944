#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use lead_intake::adapters::lambda::{LambdaAdapter, ProxyRequest, ProxyResponse};
#[cfg(feature = "lambda")]
use lead_intake::utils::logger;
#[cfg(feature = "lambda")]
use lead_intake::{build_intake, AppConfig, StorageBackend};

#[cfg(feature = "lambda")]
async fn function_handler(
    adapter: &LambdaAdapter,
    event: LambdaEvent<ProxyRequest>,
) -> Result<ProxyResponse, Error> {
    tracing::info!(request_id = %event.context.request_id, "Handling lead-intake invocation");
    Ok(adapter.handle(event.payload).await)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 冷啟動時建立一次，之後的呼叫共用
    let config = AppConfig::from_env()?;
    let intake = build_intake(&config, StorageBackend::Supabase)?;
    let adapter = LambdaAdapter::new(intake, config.server.allowed_origins());

    let adapter_ref = &adapter;
    run(service_fn(move |event: LambdaEvent<ProxyRequest>| async move {
        function_handler(adapter_ref, event).await
    }))
    .await
}
