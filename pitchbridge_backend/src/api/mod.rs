mod interests;
mod messages;
mod pitches;
mod profiles;
mod uploads;

use crate::config::PitchbridgeConfig;
use crate::database::Database;
use crate::error::DomainError;
use crate::messaging::ChatBus;
use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: PitchbridgeConfig,
    pub database: Database,
    pub chat: ChatBus,
}

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Domain(err) => {
                let status = match &err {
                    DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                    DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
                    DomainError::InvalidTransition(_) => StatusCode::CONFLICT,
                    DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                    DomainError::Upstream(inner) => {
                        tracing::error!(error = ?inner, "upstream failure");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorResponse {
                                message: "internal server error".into(),
                            },
                        );
                    }
                };
                (
                    status,
                    ErrorResponse {
                        message: err.to_string(),
                    },
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse { message: msg }),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: "internal server error".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Tries to bind to the given port, or finds the next available port
async fn find_available_port(start_port: u16) -> Result<(TcpListener, u16)> {
    const MAX_PORT_ATTEMPTS: u16 = 100;

    for offset in 0..MAX_PORT_ATTEMPTS {
        let port = start_port + offset;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok((listener, port)),
            Err(e) => {
                if offset == 0 {
                    tracing::debug!(port, error = %e, "Port in use, trying next port");
                }
                continue;
            }
        }
    }

    anyhow::bail!(
        "Could not find available port in range {}-{}",
        start_port,
        start_port + MAX_PORT_ATTEMPTS - 1
    )
}

pub fn router(state: AppState) -> Router {
    // 50MB default upload ceiling; pitch decks dominate.
    let max_upload_bytes = state
        .config
        .upload
        .max_upload_bytes
        .unwrap_or(50 * 1024 * 1024);

    Router::new()
        .route("/health", get(health_handler))
        .route("/profiles", post(profiles::register_profile))
        .route("/profiles/:id", get(profiles::get_profile).put(profiles::update_profile))
        .route("/pitches", get(pitches::list_pitches).post(pitches::create_pitch))
        .route(
            "/pitches/:id",
            get(pitches::get_pitch)
                .put(pitches::update_pitch)
                .delete(pitches::delete_pitch),
        )
        .route(
            "/pitches/:id/interests",
            get(interests::list_pitch_interests).post(interests::express_interest),
        )
        .route(
            "/pitches/:id/interests/withdraw",
            post(interests::withdraw_interest),
        )
        .route(
            "/pitches/:id/interests/:investor_id/status",
            post(interests::set_interest_status),
        )
        .route("/investors/:id/interests", get(interests::list_investor_interests))
        .route(
            "/pitches/:id/messages",
            get(messages::message_history).post(messages::send_message),
        )
        .route("/pitches/:id/messages/events", get(messages::message_events))
        .route(
            "/uploads/:id",
            post(uploads::store_upload).get(uploads::download_upload),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes as usize))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve_http(config: PitchbridgeConfig, database: Database) -> Result<()> {
    let state = AppState {
        config: config.clone(),
        database,
        chat: ChatBus::new(),
    };

    let app = router(state);

    let (listener, actual_port) = find_available_port(config.api_port).await?;
    let addr = SocketAddr::from(([0, 0, 0, 0], actual_port));

    if actual_port != config.api_port {
        tracing::warn!(
            requested_port = config.api_port,
            actual_port = actual_port,
            "Configured port was in use, bound to next available port"
        );
    }

    tracing::info!(?addr, "HTTP server listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
