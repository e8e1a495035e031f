use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::draft::OrderLineDraft;
use crate::models::payload::{IntegrationEntry, WorkOrderContent, WorkOrderPayload};

/// Scaled material quantities are rounded to 6 decimals.
const QUANTITY_SCALE: u32 = 6;

/// Dates entered on the order form, shared by every line of one submission.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionDates {
    pub fecha: NaiveDate,
    pub fecha_ini: NaiveDate,
    pub fecha_fin: NaiveDate,
}

/// Scales a per-base material quantity to the requested production quantity:
/// `round(quantity_per_base * order_quantity / base_quantity, 6)`.
pub fn scale_quantity(
    quantity_per_base: Decimal,
    order_quantity: Decimal,
    base_quantity: Decimal,
) -> Decimal {
    (quantity_per_base * order_quantity / base_quantity)
        .round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Builds the ERP integration batch: one entry per (line × material), with
/// scaled quantities. Entries whose scaled quantity rounds to zero are
/// dropped, since the backend rejects zero-quantity materials.
///
/// Pure function, no I/O. The caller validates the drafts first; lines
/// without a positive recipe base quantity must never reach this builder.
pub fn build_integration_entries(
    lines: &[OrderLineDraft],
    dates: &SubmissionDates,
) -> Vec<IntegrationEntry> {
    let mut entries = Vec::new();
    for line in lines {
        if !line.recipe_base_quantity.is_sign_positive() || line.recipe_base_quantity.is_zero() {
            continue;
        }
        for material in &line.materials {
            let scaled = scale_quantity(
                material.quantity_per_base,
                line.quantity,
                line.recipe_base_quantity,
            );
            if scaled.is_zero() {
                continue;
            }
            entries.push(IntegrationEntry {
                ot: line.order_number.trim().to_string(),
                sku_producto: line.sku.clone(),
                codigo_receta: line.recipe_code.clone(),
                sku_material: material.sku.clone(),
                descripcion: material.description.clone(),
                unidad: material.unit_of_measure.clone(),
                cantidad_material: scaled,
                fecha_inicio: dates.fecha_ini,
                fecha_fin: dates.fecha_fin,
            });
        }
    }
    entries
}

/// Builds one order-creation payload per draft line.
pub fn build_order_payloads(
    lines: &[OrderLineDraft],
    dates: &SubmissionDates,
) -> Vec<WorkOrderPayload> {
    lines
        .iter()
        .map(|line| WorkOrderPayload {
            ot: line.order_number.trim().to_string(),
            contenido: WorkOrderContent {
                sku: line.sku.clone(),
                cantidad: line.quantity,
                encargado: line.supervisor.clone(),
                linea: line.production_line.clone(),
                fecha: dates.fecha,
                fecha_ini: dates.fecha_ini,
                fecha_fin: dates.fecha_fin,
                descripcion: line.product_name.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::MaterialRequirement;
    use rust_decimal_macros::dec;

    fn dates() -> SubmissionDates {
        SubmissionDates {
            fecha: NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(),
            fecha_ini: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            fecha_fin: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
        }
    }

    fn line(sku: &str, quantity: Decimal, base: Decimal, materials: Vec<(&str, Decimal)>) -> OrderLineDraft {
        let mut draft = OrderLineDraft::empty(0, 1201);
        draft.sku = sku.to_string();
        draft.quantity = quantity;
        draft.recipe_code = format!("REC-{sku}");
        draft.recipe_base_quantity = base;
        draft.materials = materials
            .into_iter()
            .map(|(m, q)| MaterialRequirement {
                sku: m.to_string(),
                description: String::new(),
                unit_of_measure: "KG".to_string(),
                quantity_per_base: q,
                waste_percent: dec!(0),
            })
            .collect();
        draft
    }

    #[test]
    fn scales_proportionally_to_requested_quantity() {
        // 22 per 100 base units, 1200 requested: 22 * (1200/100) = 264.
        let lines = vec![line("PT-001", dec!(1200), dec!(100), vec![("MP-010", dec!(22))])];
        let entries = build_integration_entries(&lines, &dates());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].cantidad_material, dec!(264.000000));
        assert_eq!(entries[0].sku_material, "MP-010");
        assert_eq!(entries[0].ot, "1201");
    }

    #[test]
    fn scaling_by_the_base_quantity_is_identity() {
        let quantity = dec!(17.333333);
        let scaled = scale_quantity(quantity, dec!(250), dec!(250));
        assert_eq!(scaled, quantity);
    }

    #[test]
    fn rounds_to_six_decimals_half_away_from_zero() {
        // 1 * (1/3) = 0.333333333... -> 0.333333
        assert_eq!(scale_quantity(dec!(1), dec!(1), dec!(3)), dec!(0.333333));
        // 0.00000049999.. style midpoints round away from zero.
        assert_eq!(scale_quantity(dec!(0.0000005), dec!(1), dec!(1)), dec!(0.000001));
    }

    #[test]
    fn zero_scaled_quantities_are_dropped() {
        let lines = vec![line(
            "PT-001",
            dec!(1),
            dec!(1000000000),
            vec![("MP-010", dec!(0.1)), ("MP-020", dec!(500000000))],
        )];
        let entries = build_integration_entries(&lines, &dates());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sku_material, "MP-020");
    }

    #[test]
    fn one_creation_payload_per_line() {
        let mut first = line("PT-001", dec!(1200), dec!(100), vec![("MP-010", dec!(22))]);
        first.supervisor = "C. Soto".to_string();
        first.production_line = "Linea 1".to_string();
        let second = line("PT-002", dec!(500), dec!(100), vec![("MP-030", dec!(15))]);
        let payloads = build_order_payloads(&[first, second], &dates());
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].contenido.encargado, "C. Soto");
        assert_eq!(payloads[0].contenido.cantidad, dec!(1200));
        assert_eq!(payloads[1].contenido.sku, "PT-002");
    }
}
