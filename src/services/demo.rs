//! In-memory demo backend, enabled with `OT__DEMO_MODE=true`.
//!
//! Stands in for the real backend with canned recipes and a volatile order
//! store, so the console can be exercised without network access. The web
//! front-end this replaces kept the same data in browser localStorage.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::errors::ServiceError;
use crate::models::payload::{IntegrationRequest, WorkOrderPayload};
use crate::models::recipe::{MaterialRequirement, ResolvedRecipe};
use crate::models::status::WmsState;
use crate::services::recipes::RecipeFetch;
use crate::services::work_orders::WorkOrdersApi;

pub struct DemoBackend {
    orders: Mutex<HashMap<String, WorkOrderPayload>>,
    integrated: Mutex<HashSet<String>>,
    last_number: AtomicU64,
}

impl DemoBackend {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
            integrated: Mutex::new(HashSet::new()),
            last_number: AtomicU64::new(10_000),
        }
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkOrdersApi for DemoBackend {
    async fn last_order_number(&self) -> Result<u64, ServiceError> {
        Ok(self.last_number.load(Ordering::SeqCst))
    }

    async fn get_order(&self, number: &str) -> Result<WorkOrderPayload, ServiceError> {
        self.orders
            .lock()
            .expect("demo order store poisoned")
            .get(number)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("No existe la OT {number}")))
    }

    async fn create_order(&self, payload: &WorkOrderPayload) -> Result<(), ServiceError> {
        let mut orders = self.orders.lock().expect("demo order store poisoned");
        orders.insert(payload.ot.clone(), payload.clone());
        if let Ok(n) = payload.ot.parse::<u64>() {
            self.last_number.fetch_max(n, Ordering::SeqCst);
        }
        info!(ot = %payload.ot, "demo: work order stored");
        Ok(())
    }

    async fn send_integration(&self, request: &IntegrationRequest) -> Result<(), ServiceError> {
        let mut integrated = self.integrated.lock().expect("demo integration set poisoned");
        for entry in &request.payload {
            if !integrated.insert(entry.ot.clone()) {
                // Same rejection the real ERP answers with code 212.
                return Err(ServiceError::IntegrationRejected(
                    "La OT ya existe en Invas.".to_string(),
                ));
            }
        }
        info!(entries = request.payload.len(), "demo: integration batch accepted");
        Ok(())
    }

    async fn poll_status(&self, number: &str) -> Result<WmsState, ServiceError> {
        let orders = self.orders.lock().expect("demo order store poisoned");
        Ok(if orders.contains_key(number) {
            WmsState::Creada
        } else {
            WmsState::SinInformacion
        })
    }
}

/// Canned recipe catalog for demo mode.
pub struct DemoRecipeFetcher;

fn material(sku: &str, desc: &str, unidad: &str, cantidad: Decimal) -> MaterialRequirement {
    MaterialRequirement {
        sku: sku.to_string(),
        description: desc.to_string(),
        unit_of_measure: unidad.to_string(),
        quantity_per_base: cantidad,
        waste_percent: Decimal::ZERO,
    }
}

#[async_trait]
impl RecipeFetch for DemoRecipeFetcher {
    async fn fetch(&self, sku: &str) -> Result<ResolvedRecipe, ServiceError> {
        let hundred = Decimal::from(100);
        match sku {
            "PT-001" => Ok(ResolvedRecipe {
                product_sku: "PT-001".to_string(),
                recipe_code: "REC-PT-001".to_string(),
                description: "Galleta vainilla 30g".to_string(),
                base_quantity: hundred,
                materials: vec![
                    material("MP-010", "Harina", "KG", Decimal::from(22)),
                    material("MP-020", "Azúcar", "KG", Decimal::from(8)),
                ],
            }),
            "PT-002" => Ok(ResolvedRecipe {
                product_sku: "PT-002".to_string(),
                recipe_code: "REC-PT-002".to_string(),
                description: "Barra cereal 25g".to_string(),
                base_quantity: hundred,
                materials: vec![
                    material("MP-030", "Avena", "KG", Decimal::from(15)),
                    material("MP-031", "Miel", "KG", Decimal::from(4)),
                ],
            }),
            other => Err(ServiceError::NotFound(format!(
                "No existe receta para el SKU {other}"
            ))),
        }
    }
}
