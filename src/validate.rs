use std::collections::HashMap;

use crate::errors::ServiceError;
use crate::models::draft::OrderLineDraft;

/// Pre-submission validation of the draft set. One message per violated
/// rule, naming the offending SKUs or order numbers. Any violation means
/// submission does not proceed and no network call is made.
pub fn validation_messages(lines: &[OrderLineDraft]) -> Vec<String> {
    let mut messages = Vec::new();

    if lines.is_empty() {
        messages.push("No hay líneas para enviar.".to_string());
        return messages;
    }

    let missing_sku: Vec<String> = lines
        .iter()
        .filter(|l| l.sku.trim().is_empty())
        .map(|l| format!("OT {}", l.order_number))
        .collect();
    if !missing_sku.is_empty() {
        messages.push(format!("Hay líneas sin SKU: {}.", missing_sku.join(", ")));
    }

    let bad_quantity: Vec<&str> = lines
        .iter()
        .filter(|l| {
            !l.sku.trim().is_empty()
                && (l.quantity.is_zero() || l.quantity.is_sign_negative())
        })
        .map(|l| l.sku.as_str())
        .collect();
    if !bad_quantity.is_empty() {
        messages.push(format!(
            "La cantidad debe ser mayor que cero para: {}.",
            bad_quantity.join(", ")
        ));
    }

    let no_recipe: Vec<&str> = lines
        .iter()
        .filter(|l| !l.sku.trim().is_empty() && !l.has_recipe())
        .map(|l| l.sku.as_str())
        .collect();
    if !no_recipe.is_empty() {
        messages.push(format!(
            "Sin receta resuelta o sin materiales: {}.",
            no_recipe.join(", ")
        ));
    }

    let bad_base: Vec<&str> = lines
        .iter()
        .filter(|l| {
            l.has_recipe()
                && (l.recipe_base_quantity.is_zero() || l.recipe_base_quantity.is_sign_negative())
        })
        .map(|l| l.sku.as_str())
        .collect();
    if !bad_base.is_empty() {
        messages.push(format!(
            "La receta tiene cantidad base inválida para: {}.",
            bad_base.join(", ")
        ));
    }

    let bad_number: Vec<&str> = lines
        .iter()
        .filter(|l| l.numeric_order_number().is_none())
        .map(|l| l.order_number.as_str())
        .collect();
    if !bad_number.is_empty() {
        messages.push(format!(
            "Números de OT inválidos: {}.",
            bad_number.join(", ")
        ));
    }

    let mut seen: HashMap<u64, usize> = HashMap::new();
    for line in lines {
        if let Some(n) = line.numeric_order_number() {
            *seen.entry(n).or_default() += 1;
        }
    }
    let mut duplicates: Vec<u64> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(n, _)| n)
        .collect();
    duplicates.sort_unstable();
    if !duplicates.is_empty() {
        let rendered: Vec<String> = duplicates.iter().map(u64::to_string).collect();
        messages.push(format!(
            "Números de OT duplicados: {}.",
            rendered.join(", ")
        ));
    }

    messages
}

/// Convenience wrapper collapsing the rule messages into one
/// [`ServiceError::ValidationError`].
pub fn validate_drafts(lines: &[OrderLineDraft]) -> Result<(), ServiceError> {
    let messages = validation_messages(lines);
    if messages.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(messages.join(" ")))
    }
}
