//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, response::Json};
use tracing::{error, info, warn};

use super::{
    error::ApiError,
    responses::{ActionResponse, DurationRequest, DurationResponse, HealthResponse, StatusResponse},
};
use crate::{
    duration::{self, ParseDurationError},
    services::TimerService,
    state::{AppState, CardConfig, CardView},
};

/// Handle GET /card - Current card view
pub async fn card_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CardView>, ApiError> {
    Ok(Json(state.view()?))
}

/// Handle POST /card/duration - Store user-entered duration text.
///
/// With a `unit` only that field of the input is replaced.
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> Result<Json<DurationResponse>, ApiError> {
    let (error, card) = match request.unit {
        Some(field) => {
            let error = duration::parse_field(&request.text)
                .is_none()
                .then(|| ParseDurationError::InvalidField {
                    field: field.name(),
                    value: request.text.trim().to_string(),
                });
            (error, state.apply_field(field, &request.text)?)
        }
        None => {
            let error = duration::parse_strict(&request.text).err();
            (error, state.apply_duration_text(&request.text)?)
        }
    };
    if let Some(e) = &error {
        warn!("Duration input {:?} read as zero: {}", request.text, e);
    }

    let stored = card.input();
    Ok(Json(DurationResponse {
        duration: stored,
        formatted: stored.format(),
        valid: error.is_none(),
        error: error.map(|e| e.to_string()),
    }))
}

async fn dispatch(
    state: Arc<AppState>,
    service: TimerService,
) -> Result<Json<ActionResponse>, ApiError> {
    match state.dispatch(service) {
        Ok((call, card)) => {
            info!("{} endpoint called for {}", service, call.data.entity_id);
            Ok(Json(ActionResponse::new(
                format!("Timer {} sent", service),
                call,
                card.view(),
            )))
        }
        Err(e) => {
            error!("Failed to {} timer: {}", service, e);
            Err(e.into())
        }
    }
}

/// Handle POST /card/start - Start the timer with the entered duration
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionResponse>, ApiError> {
    dispatch(state, TimerService::Start).await
}

/// Handle POST /card/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionResponse>, ApiError> {
    dispatch(state, TimerService::Pause).await
}

/// Handle POST /card/cancel
pub async fn cancel_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionResponse>, ApiError> {
    dispatch(state, TimerService::Cancel).await
}

/// Handle GET /card/config
pub async fn get_config_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CardConfig>, ApiError> {
    Ok(Json(state.card()?.config().clone()))
}

/// Handle PUT /card/config - Editor changed header or entity
pub async fn put_config_handler(
    State(state): State<Arc<AppState>>,
    Json(config): Json<CardConfig>,
) -> Result<Json<CardView>, ApiError> {
    let config = config.normalized();
    if config.entity.is_empty() {
        return Err(ApiError::BadRequest("entity must not be empty".to_string()));
    }
    Ok(Json(state.set_config(config)?.view()))
}

/// Handle GET /status - Card view plus server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        card: state.view()?,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
