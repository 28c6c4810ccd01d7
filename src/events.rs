// Event types for async communication

use crate::api::ApiError;
use crate::models::Recipe;

/// Responses reported back to the UI loop by spawned request tasks.
///
/// Every variant carries the request id it was issued under so that
/// superseded responses can be dropped.
#[derive(Debug, Clone)]
pub enum AppEvent {
    RecipeGenerated {
        request_id: u64,
        result: Result<Recipe, ApiError>,
    },
    SurpriseGenerated {
        request_id: u64,
        /// Whether the request was a generation from sampled ingredients
        constrained: bool,
        result: Result<Recipe, ApiError>,
    },
    ImageGenerated {
        request_id: u64,
        recipe_id: String,
        result: Result<String, ApiError>,
    },
    RecentRecipesLoaded {
        request_id: u64,
        result: Result<Vec<Recipe>, ApiError>,
    },
}
