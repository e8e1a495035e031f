use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One raw material requirement inside a recipe, as a quantity per
/// [`ResolvedRecipe::base_quantity`] units of finished product. Immutable
/// snapshot copied onto a draft line at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub sku: String,
    pub description: String,
    pub unit_of_measure: String,
    pub quantity_per_base: Decimal,
    pub waste_percent: Decimal,
}

/// A production recipe (bill of materials) resolved for a product SKU.
///
/// Material SKUs are unique within one recipe; duplicates are flagged as a
/// data-entry error by the recipe editor and are not re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecipe {
    pub product_sku: String,
    pub recipe_code: String,
    pub description: String,
    pub base_quantity: Decimal,
    pub materials: Vec<MaterialRequirement>,
}

/// Wire shape of `GET /v1/recipes/{sku}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub sku: String,
    pub codigo: String,
    #[serde(default)]
    pub descripcion: String,
    pub cantidad_base: Decimal,
    #[serde(default)]
    pub materiales: Vec<MaterialDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDto {
    pub sku: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub unidad: String,
    pub cantidad: Decimal,
    #[serde(default)]
    pub merma: Decimal,
}

impl From<RecipeDto> for ResolvedRecipe {
    fn from(dto: RecipeDto) -> Self {
        ResolvedRecipe {
            product_sku: dto.sku,
            recipe_code: dto.codigo,
            description: dto.descripcion,
            base_quantity: dto.cantidad_base,
            materials: dto
                .materiales
                .into_iter()
                .map(|m| MaterialRequirement {
                    sku: m.sku,
                    description: m.descripcion,
                    unit_of_measure: m.unidad,
                    quantity_per_base: m.cantidad,
                    waste_percent: m.merma,
                })
                .collect(),
        }
    }
}
