use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::models::draft::OrderLineDraft;
use crate::models::payload::IntegrationRequest;
use crate::models::status::{WmsState, WmsStatusEntry};
use crate::payload::{build_integration_entries, build_order_payloads, SubmissionDates};
use crate::services::work_orders::WorkOrdersApi;
use crate::validate::validate_drafts;

/// Phase of one submission attempt. `Validating` can short-circuit back to
/// `Idle` with no side effects; a failure during `SendingIntegration` or
/// `CreatingOrders` aborts the remaining steps and leaves the phase at the
/// failing step. There is no automatic retry anywhere in this workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    SendingIntegration,
    /// Zero-based index of the order currently being created.
    CreatingOrders(usize),
    PollingStatus,
    Done,
}

#[derive(Debug, Serialize)]
pub struct SubmissionOutcome {
    /// Order numbers created, in draft order.
    pub created: Vec<String>,
    /// Post-creation WMS statuses; a failed poll degrades that one line to
    /// "sin información" instead of failing the batch.
    pub statuses: Vec<WmsStatusEntry>,
}

/// Sequences one submission: ERP integration first, then one creation call
/// per line strictly in draft order (fail-fast), then concurrent status
/// polls. Completed steps are never rolled back; the user reconciles
/// manually after a mid-batch failure.
pub struct SubmissionOrchestrator {
    api: Arc<dyn WorkOrdersApi>,
    source: String,
    phase: SubmissionPhase,
}

impl SubmissionOrchestrator {
    pub fn new(api: Arc<dyn WorkOrdersApi>, source: impl Into<String>) -> Self {
        Self {
            api,
            source: source.into(),
            phase: SubmissionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    #[instrument(skip_all, fields(lines = lines.len()))]
    pub async fn submit(
        &mut self,
        lines: &[OrderLineDraft],
        dates: &SubmissionDates,
    ) -> Result<SubmissionOutcome, ServiceError> {
        self.phase = SubmissionPhase::Validating;
        if let Err(err) = validate_drafts(lines) {
            self.phase = SubmissionPhase::Idle;
            return Err(err);
        }

        self.phase = SubmissionPhase::SendingIntegration;
        let entries = build_integration_entries(lines, dates);
        self.api
            .send_integration(&IntegrationRequest {
                source: self.source.clone(),
                payload: entries,
            })
            .await?;

        // Creation runs strictly sequentially so that a failure on line k
        // guarantees lines after k were never created.
        let payloads = build_order_payloads(lines, dates);
        let mut created = Vec::with_capacity(payloads.len());
        for (index, payload) in payloads.iter().enumerate() {
            self.phase = SubmissionPhase::CreatingOrders(index);
            self.api.create_order(payload).await?;
            created.push(payload.ot.clone());
        }

        self.phase = SubmissionPhase::PollingStatus;
        let statuses = self.poll_statuses(lines, &created).await;

        self.phase = SubmissionPhase::Done;
        info!(created = created.len(), "submission finished");
        Ok(SubmissionOutcome { created, statuses })
    }

    /// Re-sends only the ERP integration payload for orders that already
    /// exist server-side. Fails with a descriptive error naming any missing
    /// order numbers; no orders are re-created.
    #[instrument(skip_all, fields(lines = lines.len()))]
    pub async fn resend(
        &mut self,
        lines: &[OrderLineDraft],
        dates: &SubmissionDates,
    ) -> Result<(), ServiceError> {
        self.phase = SubmissionPhase::Validating;
        if let Err(err) = validate_drafts(lines) {
            self.phase = SubmissionPhase::Idle;
            return Err(err);
        }

        let mut missing = Vec::new();
        for line in lines {
            let number = line.order_number.trim();
            match self.api.get_order(number).await {
                Ok(_) => {}
                Err(ServiceError::NotFound(_)) => missing.push(number.to_string()),
                Err(other) => {
                    self.phase = SubmissionPhase::Idle;
                    return Err(other);
                }
            }
        }
        if !missing.is_empty() {
            self.phase = SubmissionPhase::Idle;
            return Err(ServiceError::ValidationError(format!(
                "No existen en el servidor las OT: {}.",
                missing.join(", ")
            )));
        }

        self.phase = SubmissionPhase::SendingIntegration;
        let entries = build_integration_entries(lines, dates);
        self.api
            .send_integration(&IntegrationRequest {
                source: self.source.clone(),
                payload: entries,
            })
            .await?;

        self.phase = SubmissionPhase::Done;
        info!("integration batch re-sent");
        Ok(())
    }

    async fn poll_statuses(
        &self,
        lines: &[OrderLineDraft],
        created: &[String],
    ) -> Vec<WmsStatusEntry> {
        let sku_by_number: HashMap<&str, &str> = lines
            .iter()
            .map(|l| (l.order_number.trim(), l.sku.as_str()))
            .collect();

        // Polls run concurrently; each failure is isolated to its own line.
        let polls = created.iter().map(|number| {
            let api = self.api.clone();
            async move { (number.clone(), api.poll_status(number).await) }
        });

        join_all(polls)
            .await
            .into_iter()
            .map(|(number, result)| {
                let state = match result {
                    Ok(state) => state,
                    Err(err) => {
                        warn!(ot = %number, error = %err, "status poll failed");
                        WmsState::SinInformacion
                    }
                };
                WmsStatusEntry {
                    sku: sku_by_number.get(number.as_str()).unwrap_or(&"").to_string(),
                    order_number: number,
                    state,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payload::WorkOrderPayload;
    use crate::models::recipe::MaterialRequirement;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// Records every backend call in order and fails where instructed.
    struct ScriptedApi {
        log: Mutex<Vec<String>>,
        fail_create_at: Option<usize>,
        fail_polls: bool,
        existing_orders: Vec<String>,
    }

    impl ScriptedApi {
        fn new() -> Self {
            Self {
                log: Mutex::new(Vec::new()),
                fail_create_at: None,
                fail_polls: false,
                existing_orders: Vec::new(),
            }
        }

        fn record(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }

        fn calls(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl WorkOrdersApi for ScriptedApi {
        async fn last_order_number(&self) -> Result<u64, ServiceError> {
            self.record("last".to_string());
            Ok(1200)
        }

        async fn get_order(&self, number: &str) -> Result<WorkOrderPayload, ServiceError> {
            self.record(format!("get:{number}"));
            if self.existing_orders.iter().any(|n| n == number) {
                Ok(WorkOrderPayload {
                    ot: number.to_string(),
                    contenido: crate::models::payload::WorkOrderContent {
                        sku: "PT-001".to_string(),
                        cantidad: dec!(100),
                        encargado: String::new(),
                        linea: String::new(),
                        fecha: NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(),
                        fecha_ini: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                        fecha_fin: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
                        descripcion: String::new(),
                    },
                })
            } else {
                Err(ServiceError::NotFound(format!("No existe la OT {number}")))
            }
        }

        async fn create_order(&self, payload: &WorkOrderPayload) -> Result<(), ServiceError> {
            let index = self
                .calls()
                .iter()
                .filter(|c| c.starts_with("create:"))
                .count();
            self.record(format!("create:{}", payload.ot));
            if self.fail_create_at == Some(index) {
                return Err(ServiceError::ExternalApiError("boom".to_string()));
            }
            Ok(())
        }

        async fn send_integration(
            &self,
            request: &IntegrationRequest,
        ) -> Result<(), ServiceError> {
            self.record(format!("integration:{}", request.payload.len()));
            Ok(())
        }

        async fn poll_status(&self, number: &str) -> Result<WmsState, ServiceError> {
            self.record(format!("poll:{number}"));
            if self.fail_polls {
                Err(ServiceError::ExternalApiError("timeout".to_string()))
            } else {
                Ok(WmsState::Creada)
            }
        }
    }

    fn dates() -> SubmissionDates {
        SubmissionDates {
            fecha: NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(),
            fecha_ini: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            fecha_fin: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
        }
    }

    fn line(number: u64, sku: &str) -> OrderLineDraft {
        let mut line = OrderLineDraft::empty(number, number);
        line.sku = sku.to_string();
        line.quantity = dec!(100);
        line.recipe_code = format!("REC-{sku}");
        line.recipe_base_quantity = dec!(100);
        line.materials = vec![MaterialRequirement {
            sku: "MP-010".to_string(),
            description: String::new(),
            unit_of_measure: "KG".to_string(),
            quantity_per_base: dec!(22),
            waste_percent: dec!(0),
        }];
        line
    }

    #[tokio::test]
    async fn validation_failure_makes_no_network_call() {
        let api = Arc::new(ScriptedApi::new());
        let mut orchestrator = SubmissionOrchestrator::new(api.clone(), "ot-console");
        // Duplicate order numbers.
        let lines = vec![line(1201, "PT-001"), line(1201, "PT-002")];
        let err = orchestrator.submit(&lines, &dates()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
        assert!(api.calls().is_empty());
        assert_eq!(orchestrator.phase(), SubmissionPhase::Idle);
    }

    #[tokio::test]
    async fn integration_precedes_creation_and_creation_is_sequential() {
        let api = Arc::new(ScriptedApi::new());
        let mut orchestrator = SubmissionOrchestrator::new(api.clone(), "ot-console");
        let lines = vec![line(1201, "PT-001"), line(1202, "PT-002")];
        let outcome = orchestrator.submit(&lines, &dates()).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls[0], "integration:2");
        assert_eq!(calls[1], "create:1201");
        assert_eq!(calls[2], "create:1202");
        assert_eq!(outcome.created, vec!["1201", "1202"]);
        assert_eq!(outcome.statuses.len(), 2);
        assert_eq!(orchestrator.phase(), SubmissionPhase::Done);
    }

    #[tokio::test]
    async fn creation_failure_is_fail_fast() {
        let mut api = ScriptedApi::new();
        api.fail_create_at = Some(1);
        let api = Arc::new(api);
        let mut orchestrator = SubmissionOrchestrator::new(api.clone(), "ot-console");
        let lines = vec![line(1201, "PT-001"), line(1202, "PT-002"), line(1203, "PT-003")];
        let err = orchestrator.submit(&lines, &dates()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ExternalApiError(_)));

        let calls = api.calls();
        // Line 1203 is never attempted and no polls run.
        assert!(calls.contains(&"create:1202".to_string()));
        assert!(!calls.iter().any(|c| c == "create:1203"));
        assert!(!calls.iter().any(|c| c.starts_with("poll:")));
        assert_eq!(orchestrator.phase(), SubmissionPhase::CreatingOrders(1));
    }

    #[tokio::test]
    async fn poll_failure_degrades_to_no_information() {
        let mut api = ScriptedApi::new();
        api.fail_polls = true;
        let api = Arc::new(api);
        let mut orchestrator = SubmissionOrchestrator::new(api.clone(), "ot-console");
        let lines = vec![line(1201, "PT-001")];
        let outcome = orchestrator.submit(&lines, &dates()).await.unwrap();
        assert_eq!(outcome.statuses[0].state, WmsState::SinInformacion);
        assert_eq!(outcome.statuses[0].sku, "PT-001");
    }

    #[tokio::test]
    async fn resend_names_missing_orders_and_sends_nothing() {
        let mut api = ScriptedApi::new();
        api.existing_orders = vec!["1201".to_string()];
        let api = Arc::new(api);
        let mut orchestrator = SubmissionOrchestrator::new(api.clone(), "ot-console");
        let lines = vec![line(1201, "PT-001"), line(1202, "PT-002")];
        let err = orchestrator.resend(&lines, &dates()).await.unwrap_err();
        assert!(err.to_string().contains("1202"));
        assert!(!api.calls().iter().any(|c| c.starts_with("integration:")));
    }

    #[tokio::test]
    async fn resend_sends_only_the_integration_batch() {
        let mut api = ScriptedApi::new();
        api.existing_orders = vec!["1201".to_string()];
        let api = Arc::new(api);
        let mut orchestrator = SubmissionOrchestrator::new(api.clone(), "ot-console");
        let lines = vec![line(1201, "PT-001")];
        orchestrator.resend(&lines, &dates()).await.unwrap();
        let calls = api.calls();
        assert!(calls.iter().any(|c| c.starts_with("integration:")));
        assert!(!calls.iter().any(|c| c.starts_with("create:")));
    }
}
