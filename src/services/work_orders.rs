use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::client::HttpClient;
use crate::errors::ServiceError;
use crate::models::payload::{
    IntegrationRequest, IntegrationResponse, LastOrderNumber, WorkOrderPayload,
};
use crate::models::status::{StatusDto, WmsState};

/// Friendly text for the ERP's duplicate-order rejection (code 212).
const DUPLICATE_ORDER_MESSAGE: &str = "La OT ya existe en Invas.";

/// Backend operations consumed by the submission orchestrator and the CLI.
/// Implemented over HTTP by [`WorkOrderService`] and in memory by the demo
/// backend.
#[async_trait]
pub trait WorkOrdersApi: Send + Sync {
    /// Last allocated order number, used to seed the correlative counter.
    async fn last_order_number(&self) -> Result<u64, ServiceError>;

    /// Fetches an existing order by number; `NotFound` when absent.
    async fn get_order(&self, number: &str) -> Result<WorkOrderPayload, ServiceError>;

    async fn create_order(&self, payload: &WorkOrderPayload) -> Result<(), ServiceError>;

    /// Sends the ERP integration batch. A 2xx envelope may still carry
    /// per-entry logical errors, which reject the whole batch.
    async fn send_integration(&self, request: &IntegrationRequest) -> Result<(), ServiceError>;

    /// Polls the WMS status for one order; unknown payloads normalize to
    /// [`WmsState::SinInformacion`].
    async fn poll_status(&self, number: &str) -> Result<WmsState, ServiceError>;
}

/// HTTP implementation of [`WorkOrdersApi`].
#[derive(Clone)]
pub struct WorkOrderService {
    client: HttpClient,
    integration_url: Option<String>,
    wms_env: String,
}

impl WorkOrderService {
    pub fn new(client: HttpClient, integration_url: Option<String>, wms_env: String) -> Self {
        Self {
            client,
            integration_url,
            wms_env,
        }
    }
}

/// Maps a logical integration error message to its user-facing text.
pub(crate) fn map_integration_error(message: Option<&str>) -> ServiceError {
    match message {
        Some(raw) if raw.contains("212") => {
            ServiceError::IntegrationRejected(DUPLICATE_ORDER_MESSAGE.to_string())
        }
        Some(raw) => ServiceError::IntegrationRejected(format!(
            "La integración fue rechazada: {raw}"
        )),
        None => {
            ServiceError::IntegrationRejected("La integración fue rechazada.".to_string())
        }
    }
}

#[async_trait]
impl WorkOrdersApi for WorkOrderService {
    #[instrument(skip(self))]
    async fn last_order_number(&self) -> Result<u64, ServiceError> {
        let last: LastOrderNumber = self.client.get_json("v1/work-orders/last").await?;
        Ok(last.last)
    }

    #[instrument(skip(self))]
    async fn get_order(&self, number: &str) -> Result<WorkOrderPayload, ServiceError> {
        self.client
            .get_json(&format!("v1/work-orders/{number}"))
            .await
            .map_err(|e| match e {
                ServiceError::NotFound(_) => {
                    ServiceError::NotFound(format!("No existe la OT {number}"))
                }
                other => other,
            })
    }

    #[instrument(skip(self, payload), fields(ot = %payload.ot))]
    async fn create_order(&self, payload: &WorkOrderPayload) -> Result<(), ServiceError> {
        let _: serde_json::Value = self.client.post_json("v1/work-orders", payload).await?;
        info!(ot = %payload.ot, "work order created");
        Ok(())
    }

    #[instrument(skip(self, request), fields(entries = request.payload.len()))]
    async fn send_integration(&self, request: &IntegrationRequest) -> Result<(), ServiceError> {
        let response: IntegrationResponse = match &self.integration_url {
            Some(url) => self.client.post_json_absolute(url, request).await?,
            None => {
                self.client
                    .post_json("v1/work-orders/integration/send", request)
                    .await?
            }
        };

        if let Some(failed) = response.results().iter().find(|r| r.is_error()) {
            warn!(ot = ?failed.ot, message = ?failed.message, "integration entry rejected");
            return Err(map_integration_error(failed.message.as_deref()));
        }
        info!(entries = request.payload.len(), "integration batch accepted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn poll_status(&self, number: &str) -> Result<WmsState, ServiceError> {
        let path = format!("v1/work-orders/{number}/status?env={}", self.wms_env);
        let dto: StatusDto = self.client.post_json(&path, &serde_json::json!({})).await?;
        Ok(dto
            .estado
            .as_deref()
            .map(WmsState::normalize)
            .unwrap_or(WmsState::SinInformacion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_212_maps_to_friendly_duplicate_message() {
        let err = map_integration_error(Some("rc=212 duplicate order"));
        assert_eq!(err.to_string(), "La OT ya existe en Invas.");
    }

    #[test]
    fn other_messages_are_wrapped_verbatim() {
        let err = map_integration_error(Some("material inexistente"));
        assert!(err.to_string().contains("material inexistente"));
    }
}
