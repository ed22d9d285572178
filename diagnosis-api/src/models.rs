use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "Diagnosis Engine Text Dataset API";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiagnosisRequest {
    /// Dataset name to process
    pub dataset: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiagnosisResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
}

/// One entry of a 422 body: `{"loc": [...], "msg": "...", "type": "..."}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationDetail {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationErrorBody {
    pub detail: Vec<ValidationDetail>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}
