use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use otp_api::app::create_app;
use otp_api::routes::otp::AppState;
use otp_api::telemetry::init_tracing;
use otp_core::services::otp::{OtpReaper, OtpService, OtpServiceConfig, OtpStore};
use otp_infra::create_delivery_gateway;
use otp_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.logging)?;

    info!(
        environment = %config.environment,
        provider = %config.delivery.provider,
        "Starting OTP server"
    );

    // Fails fast on a missing setup file or an unapproved template
    let gateway = create_delivery_gateway(&config.delivery)
        .await
        .context("Delivery gateway setup failed")?;

    let store = Arc::new(OtpStore::new());
    let service_config = OtpServiceConfig::try_from(&config.otp)?;
    info!(
        code_length = service_config.code_length,
        lifetime_minutes = service_config.lifetime.num_minutes(),
        max_attempts = service_config.max_attempts,
        "OTP policy loaded"
    );
    let otp_service = Arc::new(OtpService::new(gateway, store.clone(), service_config));

    let reaper_handle = if config.otp.reaper_enabled {
        let reaper = Arc::new(OtpReaper::new(
            store,
            otp_service.clock(),
            Duration::from_secs(config.otp.reaper_interval_secs),
        ));
        Some(reaper.start_background_task())
    } else {
        None
    };

    let app_state = web::Data::new(AppState::new(otp_service));
    let max_payload_size = config.server.max_payload_size;
    let bind_address = config.server.bind_address();

    let mut server = HttpServer::new(move || create_app(app_state.clone(), max_payload_size))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    info!("OTP server listening on {}", bind_address);
    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    if let Some(handle) = reaper_handle {
        handle.abort();
    }
    info!("OTP server stopped");
    Ok(())
}
