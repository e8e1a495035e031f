use serde::Serialize;

/// Error taxonomy for the work-order workflow.
///
/// Validation errors are raised before any network call is made; transport
/// and backend errors abort the remaining submission steps without retry.
/// Already-completed steps are never rolled back.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    /// Backend has no resource for the requested identifier (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client-side rule violation; never reaches the network.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Malformed caller input (bad draft file, unparseable number, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport failure or non-2xx response from the backend.
    #[error("External API error: {0}")]
    ExternalApiError(String),

    /// The ERP reported a logical error inside a 2xx envelope.
    #[error("{0}")]
    IntegrationRejected(String),

    /// Request or response body could not be (de)serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ServiceError {
    /// Message suitable for end users: short, human readable, never a raw
    /// transport dump.
    pub fn user_message(&self) -> String {
        match self {
            Self::ExternalApiError(_) => "Error de comunicación con el servidor.".to_string(),
            Self::SerializationError(_) => "Respuesta inesperada del servidor.".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::ExternalApiError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}
