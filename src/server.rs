use std::{sync::Arc, time::Instant};

use axum::{
    Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header, uri::Authority},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{error, info};
use serde::Deserialize;
use url::Url;

use crate::{
    badge::{EmbedCode, Playing},
    clients::errors::Error,
    config::Config,
    templates,
};

pub type AppState = Arc<Config>;

/// Every handler failure ends up here: logged once, answered with a bare status.
#[derive(Debug)]
pub enum AppError {
    Service(Error),
    BadRequest(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::Service(err)
    }
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Service(Error::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Service(Error::Template(_) | Error::ConfigurationError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Service(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Service(e) => error!("Request failed ({status}): {e}"),
            AppError::BadRequest(msg) => error!("Bad request: {msg}"),
        }
        status.into_response()
    }
}

type HandlerResult<T> = Result<T, AppError>;

async fn index(State(state): State<AppState>) -> HandlerResult<Html<String>> {
    Ok(Html(state.templates.render(templates::INDEX, &())?))
}

#[derive(Debug, Deserialize)]
struct EmbedQuery {
    #[serde(default)]
    user: String,
}

// Scheme comes from X-Forwarded-Proto (https or plain http), host from the Host header
fn request_base_url(headers: &HeaderMap, uri: &Uri) -> HandlerResult<Url> {
    let scheme = match headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
    {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| uri.authority().map(Authority::as_str))
        .ok_or_else(|| AppError::BadRequest("missing Host header".into()))?;
    Url::parse(&format!("{scheme}://{host}/"))
        .map_err(|e| AppError::BadRequest(format!("invalid Host {host:?}: {e}")))
}

async fn embed_code(
    State(state): State<AppState>,
    Query(query): Query<EmbedQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> HandlerResult<Html<String>> {
    let base = match &state.public_base_url {
        Some(base) => base.clone(),
        None => request_base_url(&headers, &uri)?,
    };
    let code = EmbedCode::new(&base, &query.user);
    Ok(Html(state.templates.render(templates::EMBED, &code)?))
}

async fn playing_url(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> HandlerResult<Response> {
    let track = state.lastfm.recent_track(&user).await?;
    let location = HeaderValue::try_from(track.url.as_str()).map_err(|e| {
        Error::InvalidResponse(format!("track URL {:?} is not a header value: {e}", track.url))
    })?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

async fn playing_badge(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> HandlerResult<Response> {
    let track = state.lastfm.recent_track(&user).await?;

    // tracks without artwork come back with blank URLs
    let icon = match state.icon.pick(&track.images).filter(|i| !i.url.is_empty()) {
        Some(image) => Some(state.inliner.to_data_url(&image.url).await?),
        None => None,
    };

    let svg = state
        .templates
        .render(templates::PLAYING, &Playing::new(track, icon))?;
    let cache_control = format!("max-age={}", state.cache_seconds);
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            (header::CACHE_CONTROL, cache_control),
        ],
        svg,
    )
        .into_response())
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        "{method} {path} -> {} in {:?}",
        response.status(),
        started.elapsed()
    );
    response
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/embed_code", get(embed_code))
        .route("/playing/{user}/url", get(playing_url))
        .route("/playing/{user}", get(playing_badge))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Binds the configured address and serves until a shutdown signal arrives.
pub async fn serve(config: Config) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(Arc::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}
