//! Serve command - check datastores, then run the HTTP API until shutdown

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::Request;
use gemm_adapters::credentials::MySqlCredentialStore;
use gemm_adapters::posts::MongoPostStore;
use gemm_adapters::tokens::JwtTokenService;
use gemm_adapters::weather::WeatherApiClient;
use gemm_domain::SystemClock;
use gemm_domain::usecases::wait_until_ready;
use gemm_server::{AppConfig, AppState, Dependencies, router};
use secrecy::SecretString;
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::args::ServeArgs;

pub async fn execute(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = AppConfig::load(config_path.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let token_secret = config.token_secret()?;
    let weather_key = config.weather_api_key().unwrap_or_else(|| {
        tracing::warn!(
            env = %config.weather.api_key_env,
            "Weather API key not set; weather lookups will be rejected upstream"
        );
        SecretString::new(String::new().into())
    });

    let credentials = Arc::new(MySqlCredentialStore::connect_lazy(&config.mysql_settings()));
    let posts = Arc::new(
        MongoPostStore::connect(&config.mongo_settings())
            .await
            .context("Failed to configure document store client")?,
    );

    if let Err(e) = wait_until_ready(&*credentials, &*posts).await {
        tracing::error!(error = %e, "Startup checks failed");
        credentials.close().await;
        posts.close().await;
        return Err(e.into());
    }

    let weather = WeatherApiClient::with_base_url(
        weather_key,
        config.weather.base_url.clone(),
        Duration::from_secs(config.weather.timeout_secs),
    )?;

    let state = AppState::new(Dependencies {
        credentials: credentials.clone(),
        posts: posts.clone(),
        tokens: Arc::new(JwtTokenService::with_settings(
            &token_secret,
            &config.auth.issuer,
            config.auth.token_ttl_secs,
        )),
        weather: Arc::new(weather),
        clock: Arc::new(SystemClock),
    });

    let app = router(state).layer(TraceLayer::new_for_http().make_span_with(
        |request: &Request<_>| {
            tracing::span!(
                Level::INFO,
                "http_request",
                method = %request.method(),
                path = %request.uri().path()
            )
        },
    ));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!(addr = %bind_addr, "App has started");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    tracing::info!("Shutting down, closing datastore connections");
    credentials.close().await;
    posts.close().await;

    served.context("HTTP server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
