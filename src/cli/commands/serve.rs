use axum::http::HeaderValue;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::cli::{build_api, config::ServeConfig};
use crate::config::{AppConfig, Environment};

pub async fn handle(app_config: &AppConfig, serve_config: &ServeConfig, port: Option<u16>) -> anyhow::Result<()> {
    if app_config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let api = build_api(app_config, serve_config)?;
    let mut app = api.router();

    if app_config.security.enable_cors {
        app = app.layer(cors_layer(app_config));
    }
    if app_config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let port = port.unwrap_or(app_config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!(
        "serving {} routes for {} models on http://{}",
        api.routes().len(),
        api.models().len(),
        bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

fn cors_layer(app_config: &AppConfig) -> CorsLayer {
    if app_config.environment != Environment::Production {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = app_config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}
