use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One flattened (order, material) pair sent to the ERP integration
/// endpoint. Built fresh per submission, never persisted. Field names follow
/// the ERP's Spanish wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationEntry {
    #[serde(rename = "OT")]
    pub ot: String,
    #[serde(rename = "SKUProducto")]
    pub sku_producto: String,
    #[serde(rename = "CodigoReceta")]
    pub codigo_receta: String,
    #[serde(rename = "SKUMaterial")]
    pub sku_material: String,
    #[serde(rename = "Descripcion")]
    pub descripcion: String,
    #[serde(rename = "Unidad")]
    pub unidad: String,
    #[serde(rename = "CantidadMaterial")]
    pub cantidad_material: Decimal,
    #[serde(rename = "FechaInicio")]
    pub fecha_inicio: NaiveDate,
    #[serde(rename = "FechaFin")]
    pub fecha_fin: NaiveDate,
}

/// Body of `POST /v1/work-orders/integration/send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationRequest {
    pub source: String,
    pub payload: Vec<IntegrationEntry>,
}

/// The integration endpoint answers 2xx even for logical failures; each
/// result entry must be inspected for `status: "error"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntegrationResponse {
    Wrapped { results: Vec<IntegrationResult> },
    Entries(Vec<IntegrationResult>),
}

impl IntegrationResponse {
    pub fn results(&self) -> &[IntegrationResult] {
        match self {
            IntegrationResponse::Wrapped { results } => results,
            IntegrationResponse::Entries(entries) => entries,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "OT", default)]
    pub ot: Option<String>,
}

impl IntegrationResult {
    pub fn is_error(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("error"))
    }
}

/// Body of `POST /v1/work-orders` and response of
/// `GET /v1/work-orders/{number}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderPayload {
    #[serde(rename = "OT")]
    pub ot: String,
    pub contenido: WorkOrderContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderContent {
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Cantidad")]
    pub cantidad: Decimal,
    #[serde(rename = "Encargado")]
    pub encargado: String,
    pub linea: String,
    pub fecha: NaiveDate,
    pub fecha_ini: NaiveDate,
    pub fecha_fin: NaiveDate,
    #[serde(default)]
    pub descripcion: String,
}

/// Response of `GET /v1/work-orders/last`, used to seed the client-side
/// correlative counter.
#[derive(Debug, Clone, Deserialize)]
pub struct LastOrderNumber {
    pub last: u64,
}
