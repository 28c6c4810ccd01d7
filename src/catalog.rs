// Static catalogs of selectable ingredients, diets and cuisines

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Label shown for "no constraint" in the diet and cuisine pickers
pub const ANY: &str = "Any";

/// Bounds for the number of ingredients drawn by a constrained surprise
pub const SURPRISE_MIN_INGREDIENTS: usize = 3;
pub const SURPRISE_MAX_INGREDIENTS: usize = 6;

const COMMON_INGREDIENTS: &[&str] = &[
    "chicken", "beef", "pork", "fish", "shrimp", "eggs", "tofu",
    "rice", "pasta", "bread", "potatoes", "quinoa", "beans",
    "tomatoes", "onions", "garlic", "bell peppers", "carrots", "spinach",
    "mushrooms", "broccoli", "zucchini", "cucumber", "lettuce",
    "cheese", "milk", "butter", "yogurt", "cream",
    "olive oil", "salt", "pepper", "herbs", "spices", "lemon", "lime",
];

const DIET_TYPES: &[&str] = &["Vegetarian", "Vegan", "Keto", "Gluten-Free", "Paleo", "Low-Carb"];

const CUISINES: &[&str] = &[
    "Italian", "Mexican", "Asian", "Indian", "Mediterranean", "American", "French", "Thai",
    "Japanese",
    // African
    "Ethiopian", "Moroccan", "Nigerian", "South African", "Kenyan", "Ghanaian", "Egyptian",
    "Tunisian", "Senegalese", "Congolese", "Sudanese", "Tanzanian", "Ugandan", "Rwandan",
    "Ivorian", "Malian", "Cameroonian", "Zimbabwean", "Zambian", "Botswanan", "Namibian",
    "Algerian", "Libyan", "Somalian", "Eritrean", "Central African", "Gabonese", "Chad", "Niger",
    "Burkina Faso", "Benin", "Togo", "Sierra Leone", "Guinea", "Liberian", "Cape Verdean",
    "Mauritanian", "Gambian", "Burundian", "Comorian", "Seychellois", "Mauritian", "Malagasy",
    "Lesotho", "Eswatini",
];

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Client-local catalogs. Loaded from the `[catalog]` table of the config file.
///
/// None of the lists contain [`ANY`]; "no constraint" is modelled separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default = "default_ingredients")]
    pub ingredients: Vec<String>,
    #[serde(default = "default_diets")]
    pub diets: Vec<String>,
    #[serde(default = "default_cuisines")]
    pub cuisines: Vec<String>,
}

fn default_ingredients() -> Vec<String> {
    to_owned_list(COMMON_INGREDIENTS)
}

fn default_diets() -> Vec<String> {
    to_owned_list(DIET_TYPES)
}

fn default_cuisines() -> Vec<String> {
    to_owned_list(CUISINES)
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            ingredients: default_ingredients(),
            diets: default_diets(),
            cuisines: default_cuisines(),
        }
    }
}

impl Catalog {
    pub fn has_ingredient(&self, name: &str) -> bool {
        self.ingredients.iter().any(|i| i == name)
    }

    pub fn has_diet(&self, name: &str) -> bool {
        self.diets.iter().any(|d| d == name)
    }

    pub fn has_cuisine(&self, name: &str) -> bool {
        self.cuisines.iter().any(|c| c == name)
    }

    /// Draw between 3 and 6 distinct ingredients, fewer if the catalog is smaller.
    pub fn sample_ingredients<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let count = rng.gen_range(SURPRISE_MIN_INGREDIENTS..=SURPRISE_MAX_INGREDIENTS);
        self.ingredients
            .choose_multiple(rng, count)
            .cloned()
            .collect()
    }
}
