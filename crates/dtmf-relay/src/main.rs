//! DTMF Relay - Entry point.

use dtmf_relay::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::Config,
    engine::{CallDispatcher, PlaybackEngine},
    registry::Registry,
    tones::FileToneSource,
    voip,
};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use twilio_client::TwilioClient;
use voip_gateway_client::GatewayClient;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DTMF Relay");

    // Pending verifications, shared by the API and the call engine
    let registry = Registry::with_ttl(config.registry.ttl);
    let _sweeper = registry.spawn_sweeper(config.registry.sweep_interval);

    // Tone assets
    let tones = FileToneSource::new(&config.tones.dir);
    if config.tones.preload {
        let failed = tones.preload().await;
        if !failed.is_empty() {
            warn!(
                "Missing or unusable tone assets for {:?}; codes containing them will be incomplete",
                failed
            );
        }
    }

    // Verification provider
    let twilio = match TwilioClient::new(
        &config.twilio.account_sid,
        config.twilio.auth_token.expose_secret(),
        &config.twilio.base_url,
        config.twilio.timeout,
    ) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create Twilio client: {}", e);
            std::process::exit(1);
        }
    };

    // SIP gateway
    let gateway = match GatewayClient::new(&config.voip.gateway_url) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create gateway client: {}", e);
            std::process::exit(1);
        }
    };

    if !gateway.health_check().await {
        warn!(url = %config.voip.gateway_url, "SIP gateway is not healthy yet");
    }

    match gateway.register_account(&voip::sip_account(&config.voip)).await {
        Ok(status) if status.registered => {
            info!(username = %status.username, "SIP account registered")
        }
        Ok(status) => warn!(username = %status.username, "SIP account registration pending"),
        Err(e) => error!("Failed to register SIP account: {}", e),
    }

    // Call handling
    let engine = PlaybackEngine::new(registry.clone(), Arc::new(tones));
    let dispatcher = CallDispatcher::new(engine);
    let calls = voip::incoming_calls(gateway, &config.voip);
    let call_loop = tokio::spawn(async move { dispatcher.run(calls).await });

    // HTTP API
    let state = AppState::new(registry, Arc::new(twilio));
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);
    let app = create_router_with_rate_limit(state, rate_limit);

    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        result = call_loop => {
            error!("Call loop exited unexpectedly: {:?}", result);
            std::process::exit(1);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }
}
