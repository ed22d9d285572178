// Library interface for diagnosis-api

pub mod models;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use config_loader::Settings;
use job_launcher::DiagnosisService;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DiagnosisService>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self::with_service(DiagnosisService::new(
            settings.script_path.clone(),
            settings.log_dir.clone(),
        ))
    }

    pub fn with_service(service: DiagnosisService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/diagnosis/application", post(routes::submit_diagnosis))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}
