//! `mapstitch serve`: the HTTP front end.
//!
//! Routes:
//! - `GET /?extent=s:w:n:e&zoom=Z&p=KEY`: natural size at zoom `Z`
//! - `GET /mapimg?extent=s:w:n:e&w=W&h=H&p=KEY`: exactly `W`×`H`, zoom chosen
//! - `GET /health`

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use clap::Args;
use mapstitch::config::ConfigFile;
use mapstitch::encode::{encode, OutputFormat};
use mapstitch::provider::{AsyncHttpClient, ProviderRegistry, ProviderTemplate};
use mapstitch::request::{self, DefaultSize, RequestError, StitchQuery};
use mapstitch::stitcher::{RenderRequest, Stitcher};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::common::{build_stitcher, provider_registry};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides [server] bind)
    #[arg(long)]
    pub bind: Option<String>,
}

/// Shared per-server state. Cloned into every request.
pub struct AppState<C> {
    pub stitcher: Stitcher<C>,
    pub registry: Arc<ProviderRegistry>,
    pub defaults: DefaultSize,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            stitcher: self.stitcher.clone(),
            registry: Arc::clone(&self.registry),
            defaults: self.defaults,
        }
    }
}

/// Builds the router for the given state.
pub fn router<C>(state: AppState<C>) -> Router
where
    C: AsyncHttpClient + 'static,
{
    Router::new()
        .route("/", get(zoom_handler::<C>))
        .route("/mapimg", get(size_handler::<C>))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn zoom_handler<C>(
    State(state): State<AppState<C>>,
    Query(query): Query<StitchQuery>,
) -> Response
where
    C: AsyncHttpClient + 'static,
{
    let parsed = request::zoom_request(&query, &state.registry);
    respond(&state, parsed).await
}

async fn size_handler<C>(
    State(state): State<AppState<C>>,
    Query(query): Query<StitchQuery>,
) -> Response
where
    C: AsyncHttpClient + 'static,
{
    let parsed = request::size_request(&query, &state.registry, state.defaults);
    respond(&state, parsed).await
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn respond<C>(
    state: &AppState<C>,
    parsed: Result<(ProviderTemplate, RenderRequest), RequestError>,
) -> Response
where
    C: AsyncHttpClient + 'static,
{
    let (template, render) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Rejected request");
            let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            return (status, e.to_string()).into_response();
        }
    };

    let image = match state.stitcher.render(&template, &render).await {
        Ok(image) => image,
        Err(e) if e.is_client_error() => {
            warn!(error = %e, "Rejected request");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
        Err(e) => {
            error!(error = %e, "Render failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let format = OutputFormat::Png;
    match tokio::task::spawn_blocking(move || encode(&image, format)).await {
        Ok(Ok(bytes)) => ([(header::CONTENT_TYPE, format.content_type())], bytes).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "Encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!(error = %e, "Encoding task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Run the serve command until Ctrl-C.
pub async fn run(args: ServeArgs, config: &ConfigFile) -> Result<(), CliError> {
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|_| CliError::InvalidArgument(format!("'{}' is not a socket address", bind)))?;

    let state = AppState {
        stitcher: build_stitcher(config)?,
        registry: Arc::new(provider_registry(config)?),
        defaults: DefaultSize {
            width: config.server.default_width,
            height: config.server.default_height,
        },
    };
    let providers: Vec<&str> = state.registry.keys().collect();
    info!(providers = ?providers, "Providers loaded");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(CliError::Serve)?;
    info!(address = %addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(CliError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
