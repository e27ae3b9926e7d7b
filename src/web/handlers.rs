use std::{convert::Infallible, sync::Arc};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::{info, warn};

use crate::{
    app_state::AppState,
    core::{
        errors::AppError,
        state::{AlertAction, CameraState, CameraStatus, PrinterConfig},
    },
    printer::{PrinterType, models::PrinterState},
};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    app_name: String,
}

#[derive(Deserialize)]
pub struct SetPrinterRequest {
    printer_id: String,
    printer_config: PrinterConfig,
}

#[derive(Deserialize)]
pub struct SuspendRequest {
    action: String,
}

#[derive(Serialize)]
pub struct SuspendResponse {
    success: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app_name: state.config.app_name.clone(),
    })
}

pub async fn cameras(State(state): State<Arc<AppState>>) -> Json<Vec<CameraStatus>> {
    let mut statuses = Vec::new();
    for camera_uuid in state.cameras.camera_uuids() {
        statuses.push(state.printers.camera_status(&camera_uuid).await);
    }
    Json(statuses)
}

pub async fn get_printer(
    State(state): State<Arc<AppState>>,
    Path(camera_uuid): Path<String>,
) -> Result<Json<CameraStatus>, AppError> {
    if state.printers.get_printer_config(&camera_uuid).is_none() {
        return Err(AppError::new(
            StatusCode::NOT_FOUND,
            format!("no printer linked to camera {camera_uuid}"),
        ));
    }
    Ok(Json(state.printers.camera_status(&camera_uuid).await))
}

pub async fn set_printer(
    State(state): State<Arc<AppState>>,
    Path(camera_uuid): Path<String>,
    Json(payload): Json<SetPrinterRequest>,
) -> Result<Json<CameraState>, AppError> {
    let printer_type = PrinterType::from_tag(payload.printer_config.printer_type.as_deref())
        .map_err(|err| AppError::new(StatusCode::BAD_REQUEST, err.to_string()))?;
    if payload.printer_config.base_url.trim().is_empty() {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "base_url cannot be empty",
        ));
    }

    let updated = state
        .printers
        .set_printer(&camera_uuid, payload.printer_id, payload.printer_config)
        .await
        .ok_or_else(|| AppError::internal("failed to store printer config"))?;

    info!("camera {camera_uuid} linked to {printer_type} printer");
    Ok(Json(updated))
}

pub async fn remove_printer(
    State(state): State<Arc<AppState>>,
    Path(camera_uuid): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.printers.get_printer_config(&camera_uuid).is_none() {
        return Err(AppError::new(
            StatusCode::NOT_FOUND,
            format!("no printer linked to camera {camera_uuid}"),
        ));
    }
    state
        .printers
        .remove_printer(&camera_uuid)
        .await
        .ok_or_else(|| AppError::internal("failed to clear printer config"))?;

    info!("printer unlinked from camera {camera_uuid}");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn printer_state(
    State(state): State<Arc<AppState>>,
    Path(camera_uuid): Path<String>,
) -> Result<Json<PrinterState>, AppError> {
    let printer_state = state.printers.current_printer_state(&camera_uuid).await?;
    Ok(Json(printer_state))
}

pub async fn start_polling(
    State(state): State<Arc<AppState>>,
    Path(camera_uuid): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .printers
        .start_printer_state_polling(&camera_uuid)
        .await?;
    let status = state.printers.camera_status(&camera_uuid).await;
    Ok((StatusCode::ACCEPTED, Json(status)))
}

pub async fn stop_polling(
    State(state): State<Arc<AppState>>,
    Path(camera_uuid): Path<String>,
) -> Json<CameraStatus> {
    if !state.printers.stop_printer_state_polling(&camera_uuid).await {
        info!("stop requested for camera {camera_uuid}, which was not polling");
    }
    Json(state.printers.camera_status(&camera_uuid).await)
}

pub async fn suspend(
    State(state): State<Arc<AppState>>,
    Path(camera_uuid): Path<String>,
    Json(payload): Json<SuspendRequest>,
) -> impl IntoResponse {
    let action = AlertAction::from_tag(&payload.action);
    let success = state.printers.suspend_print_job(&camera_uuid, action).await;
    let status = if success {
        StatusCode::OK
    } else {
        warn!("suspend {action:?} failed for camera {camera_uuid}");
        StatusCode::BAD_GATEWAY
    };
    (status, Json(SuspendResponse { success }))
}

pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.updates.subscribe()).filter_map(|update| {
        // Lagging subscribers skip the updates they missed.
        let update = update.ok()?;
        let event = Event::default()
            .event("printer_state")
            .json_data(&update)
            .ok()?;
        Some(Ok(event))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, path::PathBuf, sync::Arc};

    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };

    use crate::{
        app_state::AppState,
        config::AppConfig,
        core::state::PrinterConfig,
    };

    use super::{
        SetPrinterRequest, SuspendRequest, get_printer, remove_printer, set_printer,
        start_polling, suspend,
    };

    fn test_state() -> Arc<AppState> {
        let config = AppConfig {
            app_name: "printlink".to_string(),
            bind_addr: "127.0.0.1:8080"
                .parse::<SocketAddr>()
                .expect("socket addr should parse"),
            api_token: None,
            log_dir: PathBuf::from("logs"),
            log_debug: false,
            saved_config_path: None,
            printer_polling_rate_ms: None,
        };
        Arc::new(AppState::new(config))
    }

    fn request(printer_type: Option<&str>) -> SetPrinterRequest {
        SetPrinterRequest {
            printer_id: "printer-1".to_string(),
            printer_config: PrinterConfig {
                printer_type: printer_type.map(str::to_string),
                base_url: "127.0.0.1:1".to_string(),
                api_key: "key".to_string(),
                name: "MK4".to_string(),
            },
        }
    }

    fn cam() -> Path<String> {
        Path("cam-1".to_string())
    }

    #[tokio::test]
    async fn set_printer_rejects_unknown_type() {
        let err = set_printer(State(test_state()), cam(), Json(request(Some("bambu"))))
            .await
            .expect_err("bambu should be rejected");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn linked_printer_can_be_read_and_removed() {
        let state = test_state();
        let err = get_printer(State(state.clone()), cam())
            .await
            .expect_err("nothing linked yet");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let Json(updated) = set_printer(State(state.clone()), cam(), Json(request(None)))
            .await
            .expect("legacy config without type is accepted");
        assert_eq!(updated.printer_id.as_deref(), Some("printer-1"));

        let Json(status) = get_printer(State(state.clone()), cam())
            .await
            .expect("printer should be linked");
        assert_eq!(status.printer_id.as_deref(), Some("printer-1"));

        let code = remove_printer(State(state.clone()), cam())
            .await
            .expect("remove should succeed");
        assert_eq!(code, StatusCode::NO_CONTENT);
        assert!(state.printers.get_printer_config("cam-1").is_none());
    }

    #[tokio::test]
    async fn start_polling_without_printer_is_not_found() {
        let err = start_polling(State(test_state()), cam())
            .await
            .err()
            .expect("no printer linked");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn suspend_without_printer_reports_failure() {
        let response = suspend(
            State(test_state()),
            cam(),
            Json(SuspendRequest {
                action: "cancel_print".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
