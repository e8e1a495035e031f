pub mod draft;
pub mod payload;
pub mod recipe;
pub mod status;

pub use draft::OrderLineDraft;
pub use payload::{
    IntegrationEntry, IntegrationRequest, IntegrationResponse, IntegrationResult,
    LastOrderNumber, WorkOrderContent, WorkOrderPayload,
};
pub use recipe::{MaterialRequirement, RecipeDto, ResolvedRecipe};
pub use status::{StatusDto, WmsState, WmsStatusEntry};
