use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::recipe::{MaterialRequirement, ResolvedRecipe};

/// One editable line of the work-order draft grid.
///
/// Owned exclusively by the grid's row list: created on "add row", mutated on
/// cell edits, destroyed on "remove row" or full reset. `resolve_seq` is the
/// row's monotonically increasing recipe-resolution counter; a resolution
/// response is applied only when its captured sequence still matches it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineDraft {
    pub id: u64,
    /// Numeric text; the user can overwrite the suggested correlative.
    pub order_number: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub production_line: String,
    pub supervisor: String,
    pub recipe_code: String,
    pub recipe_base_quantity: Decimal,
    pub materials: Vec<MaterialRequirement>,
    /// Per-row lookup error (recipe not found, order not found). Blocks
    /// nothing until submission-time validation re-checks all rows.
    pub error: Option<String>,
    #[serde(skip)]
    pub(crate) resolve_seq: u64,
}

impl OrderLineDraft {
    pub fn empty(id: u64, order_number: u64) -> Self {
        Self {
            id,
            order_number: order_number.to_string(),
            sku: String::new(),
            product_name: String::new(),
            quantity: Decimal::ZERO,
            production_line: String::new(),
            supervisor: String::new(),
            recipe_code: String::new(),
            recipe_base_quantity: Decimal::ZERO,
            materials: Vec::new(),
            error: None,
            resolve_seq: 0,
        }
    }

    pub fn has_recipe(&self) -> bool {
        !self.recipe_code.is_empty() && !self.materials.is_empty()
    }

    /// Copies the resolved recipe onto the row as an immutable snapshot.
    pub(crate) fn apply_recipe(&mut self, recipe: &ResolvedRecipe) {
        if self.product_name.is_empty() {
            self.product_name = recipe.description.clone();
        }
        self.recipe_code = recipe.recipe_code.clone();
        self.recipe_base_quantity = recipe.base_quantity;
        self.materials = recipe.materials.clone();
        self.error = None;
    }

    pub(crate) fn clear_recipe(&mut self) {
        self.recipe_code.clear();
        self.recipe_base_quantity = Decimal::ZERO;
        self.materials.clear();
    }

    /// Parsed order number, when the text is a positive integer.
    pub fn numeric_order_number(&self) -> Option<u64> {
        self.order_number.trim().parse::<u64>().ok().filter(|n| *n > 0)
    }
}
