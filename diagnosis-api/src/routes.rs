use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use job_launcher::{LaunchError, SubmitError};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{
    DiagnosisRequest, DiagnosisResponse, ErrorBody, HealthStatus, ServiceStatus,
    ValidationDetail, ValidationErrorBody, SERVICE_NAME,
};
use crate::AppState;

pub async fn root() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}

/// POST /diagnosis/application
///
/// Launches the diagnosis script for `dataset` in the background and
/// returns as soon as the process exists.
pub async fn submit_diagnosis(
    State(state): State<AppState>,
    payload: Result<Json<DiagnosisRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return validation_response(ValidationDetail {
                loc: vec!["body".to_string()],
                msg: rejection.body_text(),
                kind: "value_error.jsonpayload".to_string(),
            })
        }
    };

    // Spawning forks and writes the log header; keep both off the async workers.
    let service = Arc::clone(&state.service);
    let dataset = request.dataset;
    let outcome = tokio::task::spawn_blocking(move || service.submit(&dataset)).await;

    match outcome {
        Ok(Ok(submission)) => {
            info!(
                dataset = %submission.dataset,
                pid = submission.pid,
                log_path = %submission.log_path.display(),
                "diagnosis application submitted"
            );
            let message = format!(
                "Diagnosis application submitted for {}. Check logs at: {}",
                submission.dataset,
                submission.log_path.display()
            );
            (StatusCode::OK, Json(DiagnosisResponse { message })).into_response()
        }
        Ok(Err(err)) => submit_error_response(&err, state.service.script_path()),
        Err(join_err) => {
            error!(error = %join_err, "diagnosis launch task failed");
            server_error(format!(
                "Failed to execute diagnosis script: {}",
                join_err
            ))
        }
    }
}

fn submit_error_response(err: &SubmitError, script_path: &Path) -> Response {
    match err {
        SubmitError::Validation(validation) => validation_response(ValidationDetail {
            loc: vec!["body".to_string(), "dataset".to_string()],
            msg: validation.to_string(),
            kind: "value_error".to_string(),
        }),
        SubmitError::Launch(LaunchError::NotFound { path }) if path == script_path => {
            server_error(format!(
                "Diagnosis script not found at {}",
                script_path.display()
            ))
        }
        other => server_error(format!("Failed to execute diagnosis script: {}", other)),
    }
}

fn validation_response(detail: ValidationDetail) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorBody {
            detail: vec![detail],
        }),
    )
        .into_response()
}

fn server_error(detail: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody { detail }),
    )
        .into_response()
}
