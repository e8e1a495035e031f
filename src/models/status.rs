use serde::{Deserialize, Serialize};
use strum::Display;

/// Normalized WMS production status. The backend returns a free-text code;
/// anything unrecognized degrades to `SinInformacion` instead of failing the
/// poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum WmsState {
    #[strum(serialize = "Creada")]
    Creada,
    #[strum(serialize = "En proceso")]
    EnProceso,
    #[strum(serialize = "Finalizada")]
    Finalizada,
    #[strum(serialize = "Cancelada")]
    Cancelada,
    #[strum(serialize = "Sin información")]
    SinInformacion,
}

impl WmsState {
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "CREADA" | "CREATED" | "10" => WmsState::Creada,
            "EN PROCESO" | "PROCESO" | "IN PROCESS" | "20" => WmsState::EnProceso,
            "FINALIZADA" | "FINISHED" | "90" => WmsState::Finalizada,
            "CANCELADA" | "CANCELLED" | "99" => WmsState::Cancelada,
            _ => WmsState::SinInformacion,
        }
    }
}

/// Last polled status for one order number. Transient: overwritten on each
/// poll, dropped with its row.
#[derive(Debug, Clone, Serialize)]
pub struct WmsStatusEntry {
    pub order_number: String,
    pub sku: String,
    pub state: WmsState,
}

/// Wire shape of `POST /v1/work-orders/{number}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusDto {
    #[serde(default)]
    pub estado: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_codes_case_insensitively() {
        assert_eq!(WmsState::normalize(" creada "), WmsState::Creada);
        assert_eq!(WmsState::normalize("EN PROCESO"), WmsState::EnProceso);
        assert_eq!(WmsState::normalize("90"), WmsState::Finalizada);
    }

    #[test]
    fn unknown_codes_degrade_to_no_information() {
        assert_eq!(WmsState::normalize("???"), WmsState::SinInformacion);
        assert_eq!(WmsState::normalize(""), WmsState::SinInformacion);
    }
}
