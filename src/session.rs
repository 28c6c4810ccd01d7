// Ingredient and recipe session state

use rand::Rng;

use crate::api::{ApiError, GenerateRecipeRequest};
use crate::catalog::{Catalog, ANY};
use crate::models::{AppConfig, Notice, NoticeKind, Preference, Recipe};

pub const HISTORY_LIMIT: usize = 10;
pub const SUGGESTION_LIMIT: usize = 6;
pub const QUICK_ADD_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown diet type: {0}")]
    UnknownDiet(String),
    #[error("Unknown cuisine: {0}")]
    UnknownCuisine(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suggestion<'a> {
    Catalog(&'a str),
    /// The literal search text, offered when it is not a catalog entry
    Custom(&'a str),
}

impl<'a> Suggestion<'a> {
    pub const fn value(&self) -> &'a str {
        match self {
            Self::Catalog(value) | Self::Custom(value) => *value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAddCandidate<'a> {
    pub name: &'a str,
    pub from_history: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurprisePlan {
    Constrained(GenerateRecipeRequest),
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Generate,
    Surprise,
    Image,
    Recent,
}

/// Latest request id issued per flow
#[derive(Debug, Default)]
struct RequestTokens {
    generate: u64,
    surprise: u64,
    image: u64,
    recent: u64,
}

impl RequestTokens {
    fn slot(&mut self, flow: Flow) -> &mut u64 {
        match flow {
            Flow::Generate => &mut self.generate,
            Flow::Surprise => &mut self.surprise,
            Flow::Image => &mut self.image,
            Flow::Recent => &mut self.recent,
        }
    }

    fn issue(&mut self, flow: Flow) -> u64 {
        let slot = self.slot(flow);
        *slot += 1;
        *slot
    }

    const fn latest(&self, flow: Flow) -> u64 {
        match flow {
            Flow::Generate => self.generate,
            Flow::Surprise => self.surprise,
            Flow::Image => self.image,
            Flow::Recent => self.recent,
        }
    }

    fn is_current(&self, flow: Flow, request_id: u64) -> bool {
        let current = self.latest(flow) == request_id;
        if !current {
            log::debug!("Discarding stale {flow:?} response {request_id}");
        }
        current
    }
}

/// Catalog entries matching `text`, then the custom entry if `text` is new
pub fn suggestions<'a>(
    catalog: &'a [String],
    selected: &'a [String],
    text: &'a str,
) -> impl Iterator<Item = Suggestion<'a>> + Clone + 'a {
    let needle = text.to_lowercase();
    let custom = (!text.is_empty() && !catalog.iter().any(|entry| *entry == needle))
        .then_some(Suggestion::Custom(text));

    catalog
        .iter()
        .filter(move |entry| entry.to_lowercase().contains(&needle) && !selected.contains(*entry))
        .take(SUGGESTION_LIMIT)
        .map(|entry| Suggestion::Catalog(entry.as_str()))
        .chain(custom)
}

/// History first, then the catalog, without repeats
pub fn quick_add_candidates<'a>(
    history: &'a [String],
    catalog: &'a [String],
    selected: &'a [String],
) -> Vec<QuickAddCandidate<'a>> {
    let mut candidates: Vec<QuickAddCandidate<'a>> = Vec::with_capacity(QUICK_ADD_LIMIT);

    for name in history.iter().chain(catalog) {
        if candidates.len() == QUICK_ADD_LIMIT {
            break;
        }
        if candidates.iter().any(|c| c.name == name.as_str()) {
            continue;
        }
        candidates.push(QuickAddCandidate {
            name: name.as_str(),
            from_history: history.contains(name),
            selected: selected.contains(name),
        });
    }

    candidates
}

fn cycle_preference(current: &Preference, values: &[String], forward: bool) -> Preference {
    // Position 0 is "Any", catalog entries follow
    let len = values.len() + 1;
    let index = match current {
        Preference::Any => 0,
        Preference::Only(value) => values.iter().position(|v| v == value).map_or(0, |i| i + 1),
    };
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };

    if next == 0 {
        Preference::Any
    } else {
        Preference::Only(values[next - 1].clone())
    }
}

#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    recent_limit: usize,
    selected: Vec<String>,
    search_text: String,
    history: Vec<String>,
    diet: Preference,
    cuisine: Preference,
    current_recipe: Option<Recipe>,
    recent_recipes: Vec<Recipe>,
    is_generating: bool,
    is_generating_image: bool,
    show_suggestions: bool,
    notice: Option<Notice>,
    tokens: RequestTokens,
}

impl Session {
    pub fn new(catalog: Catalog, recent_limit: usize) -> Self {
        Self {
            catalog,
            recent_limit,
            selected: Vec::new(),
            search_text: String::new(),
            history: Vec::new(),
            diet: Preference::Any,
            cuisine: Preference::Any,
            current_recipe: None,
            recent_recipes: Vec::new(),
            is_generating: false,
            is_generating_image: false,
            show_suggestions: false,
            notice: None,
            tokens: RequestTokens::default(),
        }
    }

    /// Session for the configured catalog. Unknown default preferences are
    /// logged and left at "Any".
    pub fn from_config(config: &AppConfig) -> Self {
        let mut session = Self::new(config.catalog.clone(), config.recent_limit);
        if let Some(diet) = &config.default_diet {
            if let Err(err) = session.set_diet(diet) {
                log::warn!("Ignoring default_diet: {err}");
            }
        }
        if let Some(cuisine) = &config.default_cuisine {
            if let Err(err) = session.set_cuisine(cuisine) {
                log::warn!("Ignoring default_cuisine: {err}");
            }
        }
        session
    }

    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub const fn diet(&self) -> &Preference {
        &self.diet
    }

    pub const fn cuisine(&self) -> &Preference {
        &self.cuisine
    }

    pub const fn current_recipe(&self) -> Option<&Recipe> {
        self.current_recipe.as_ref()
    }

    pub fn recent_recipes(&self) -> &[Recipe] {
        &self.recent_recipes
    }

    pub const fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub const fn is_generating_image(&self) -> bool {
        self.is_generating_image
    }

    pub const fn show_suggestions(&self) -> bool {
        self.show_suggestions
    }

    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s == name)
    }

    fn post(&mut self, kind: NoticeKind) {
        self.notice = Some(Notice::new(kind));
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // Ingredient selection

    // Clears the search box and closes the dropdown even when nothing is added
    pub fn add_ingredient(&mut self, name: &str) -> bool {
        let added = !name.is_empty() && !self.is_selected(name);
        if added {
            self.selected.push(name.to_string());
            self.remember_custom(name);
        }
        self.search_text.clear();
        self.show_suggestions = false;
        added
    }

    fn remember_custom(&mut self, name: &str) {
        if self.catalog.has_ingredient(name) {
            return;
        }
        self.history.retain(|h| h != name);
        self.history.insert(0, name.to_string());
        self.history.truncate(HISTORY_LIMIT);
    }

    pub fn remove_ingredient(&mut self, name: &str) -> bool {
        match self.selected.iter().position(|s| s == name) {
            Some(index) => {
                self.selected.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn update_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.show_suggestions = true;
    }

    pub fn close_suggestions(&mut self) {
        self.show_suggestions = false;
    }

    pub fn suggestions<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Suggestion<'a>> + Clone + 'a {
        suggestions(&self.catalog.ingredients, &self.selected, text)
    }

    pub fn quick_add_candidates(&self) -> Vec<QuickAddCandidate<'_>> {
        quick_add_candidates(&self.history, &self.catalog.ingredients, &self.selected)
    }

    // Preferences

    pub fn set_diet(&mut self, value: &str) -> Result<(), SessionError> {
        if value == ANY {
            self.diet = Preference::Any;
        } else if self.catalog.has_diet(value) {
            self.diet = Preference::Only(value.to_string());
        } else {
            return Err(SessionError::UnknownDiet(value.to_string()));
        }
        Ok(())
    }

    pub fn set_cuisine(&mut self, value: &str) -> Result<(), SessionError> {
        if value == ANY {
            self.cuisine = Preference::Any;
        } else if self.catalog.has_cuisine(value) {
            self.cuisine = Preference::Only(value.to_string());
        } else {
            return Err(SessionError::UnknownCuisine(value.to_string()));
        }
        Ok(())
    }

    pub fn cycle_diet(&mut self, forward: bool) {
        self.diet = cycle_preference(&self.diet, &self.catalog.diets, forward);
    }

    pub fn cycle_cuisine(&mut self, forward: bool) {
        self.cuisine = cycle_preference(&self.cuisine, &self.catalog.cuisines, forward);
    }

    fn has_constraints(&self) -> bool {
        !self.diet.is_any() || !self.cuisine.is_any()
    }

    fn request_for(&self, ingredients: Vec<String>) -> GenerateRecipeRequest {
        GenerateRecipeRequest {
            ingredients,
            diet_type: self.diet.as_request_value(),
            cuisine: self.cuisine.as_request_value(),
        }
    }

    // Recipe generation

    /// Synchronous half of a generation: guards, busy flag and request token.
    /// The matching `apply_generated` ignores responses from superseded tokens.
    pub fn begin_generate(&mut self) -> Option<(u64, GenerateRecipeRequest)> {
        if self.is_generating {
            return None;
        }
        if self.selected.is_empty() {
            self.post(NoticeKind::EmptySelection);
            return None;
        }

        self.is_generating = true;
        let request_id = self.tokens.issue(Flow::Generate);
        Some((request_id, self.request_for(self.selected.clone())))
    }

    pub fn apply_generated(&mut self, request_id: u64, result: Result<Recipe, ApiError>) -> bool {
        if !self.tokens.is_current(Flow::Generate, request_id) {
            return false;
        }
        self.is_generating = false;

        match result {
            Ok(recipe) => {
                log::info!("Generated recipe {} ({})", recipe.id, recipe.title);
                self.current_recipe = Some(recipe);
                self.post(NoticeKind::RecipeReady);
                true
            }
            Err(err) => {
                log::error!("Failed to generate recipe: {err}");
                self.post(NoticeKind::GenerateFailed);
                false
            }
        }
    }

    // Never modifies the selection
    pub fn begin_surprise<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(u64, SurprisePlan)> {
        if self.is_generating {
            return None;
        }

        let plan = if self.has_constraints() {
            let ingredients = self.catalog.sample_ingredients(rng);
            SurprisePlan::Constrained(self.request_for(ingredients))
        } else {
            SurprisePlan::Random
        };

        self.is_generating = true;
        let request_id = self.tokens.issue(Flow::Surprise);
        Some((request_id, plan))
    }

    pub fn apply_surprise(&mut self, request_id: u64, result: Result<Recipe, ApiError>) -> bool {
        if !self.tokens.is_current(Flow::Surprise, request_id) {
            return false;
        }
        self.is_generating = false;

        match result {
            Ok(recipe) => {
                log::info!("Surprise recipe {} ({})", recipe.id, recipe.title);
                self.current_recipe = Some(recipe);
                self.post(NoticeKind::RecipeReady);
                true
            }
            Err(err) => {
                log::error!("Failed to get surprise recipe: {err}");
                self.post(NoticeKind::SurpriseFailed);
                false
            }
        }
    }

    pub fn select_recent(&mut self, index: usize) -> bool {
        match self.recent_recipes.get(index) {
            Some(recipe) => {
                self.current_recipe = Some(recipe.clone());
                true
            }
            None => false,
        }
    }

    pub fn begin_recent_refresh(&mut self) -> (u64, usize) {
        (self.tokens.issue(Flow::Recent), self.recent_limit)
    }

    // Failures are logged only
    pub fn apply_recent(&mut self, request_id: u64, result: Result<Vec<Recipe>, ApiError>) {
        if !self.tokens.is_current(Flow::Recent, request_id) {
            return;
        }
        match result {
            Ok(recipes) => self.recent_recipes = recipes,
            Err(err) => log::warn!("Failed to fetch recent recipes: {err}"),
        }
    }

    // Image generation

    pub fn begin_image(&mut self) -> Option<(u64, String)> {
        if self.is_generating_image {
            return None;
        }
        let recipe_id = self.current_recipe.as_ref()?.id.clone();

        self.is_generating_image = true;
        let request_id = self.tokens.issue(Flow::Image);
        Some((request_id, recipe_id))
    }

    /// Returns true if the image was merged into the current recipe
    pub fn apply_image(
        &mut self,
        request_id: u64,
        recipe_id: &str,
        result: Result<String, ApiError>,
    ) -> bool {
        if !self.tokens.is_current(Flow::Image, request_id) {
            return false;
        }
        self.is_generating_image = false;

        match result {
            Ok(image_base64) => {
                let merged = match self.current_recipe.as_mut() {
                    Some(recipe) if recipe.id == recipe_id => {
                        recipe.image_base64 = Some(image_base64);
                        true
                    }
                    _ => false,
                };
                if merged {
                    self.post(NoticeKind::ImageReady);
                } else {
                    log::debug!("Image for {recipe_id} arrived after the recipe was replaced");
                }
                merged
            }
            Err(err) if err.is_billing_related() => {
                log::warn!("Image generation needs billing: {err}");
                self.post(NoticeKind::BillingRequired);
                false
            }
            Err(err) => {
                log::error!("Failed to generate image: {err}");
                self.post(NoticeKind::ImageFailed);
                false
            }
        }
    }

    pub fn cancel_pending(&mut self) -> bool {
        if !self.is_generating && !self.is_generating_image {
            return false;
        }
        for flow in [Flow::Generate, Flow::Surprise, Flow::Image] {
            self.tokens.issue(flow);
        }
        self.is_generating = false;
        self.is_generating_image = false;
        self.post(NoticeKind::Cancelled);
        log::info!("Cancelled pending requests");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session {
        Session::new(Catalog::default(), 10)
    }

    fn recipe(id: &str, title: &str) -> Recipe {
        serde_json::from_value(serde_json::json!({"id": id, "title": title})).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_from_config_applies_default_preferences() {
        let config = AppConfig {
            default_diet: Some("Vegan".to_string()),
            default_cuisine: Some("Martian".to_string()),
            ..Default::default()
        };
        let s = Session::from_config(&config);
        assert_eq!(s.diet(), &Preference::Only("Vegan".to_string()));
        assert!(s.cuisine().is_any());
        assert_eq!(s.catalog().cuisines, config.catalog.cuisines);
    }

    #[test]
    fn test_new_session_defaults() {
        let s = session();
        assert!(s.selected().is_empty());
        assert!(s.history().is_empty());
        assert!(s.diet().is_any());
        assert!(s.cuisine().is_any());
        assert!(s.current_recipe().is_none());
        assert!(!s.is_generating());
        assert!(!s.is_generating_image());
        assert!(!s.show_suggestions());
    }

    #[test]
    fn test_add_same_ingredient_twice() {
        let mut s = session();
        assert!(s.add_ingredient("chicken"));
        assert!(!s.add_ingredient("chicken"));
        assert_eq!(s.selected(), ["chicken"]);
    }

    #[test]
    fn test_add_empty_is_noop_but_clears_input() {
        let mut s = session();
        s.update_search_text("ch");
        assert!(s.show_suggestions());
        assert!(!s.add_ingredient(""));
        assert!(s.selected().is_empty());
        assert_eq!(s.search_text(), "");
        assert!(!s.show_suggestions());
    }

    #[test]
    fn test_add_is_case_sensitive() {
        let mut s = session();
        s.add_ingredient("rice");
        assert!(s.add_ingredient("Rice"));
        assert_eq!(s.selected(), ["rice", "Rice"]);
    }

    #[test]
    fn test_add_preserves_order() {
        let mut s = session();
        for name in ["rice", "chicken", "garlic"] {
            s.add_ingredient(name);
        }
        assert_eq!(s.selected(), ["rice", "chicken", "garlic"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut s = session();
        s.add_ingredient("rice");
        assert!(!s.remove_ingredient("beef"));
        assert_eq!(s.selected(), ["rice"]);
        assert!(s.remove_ingredient("rice"));
        assert!(s.selected().is_empty());
    }

    #[test]
    fn test_catalog_ingredient_not_remembered() {
        let mut s = session();
        s.add_ingredient("chicken");
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_custom_ingredient_history_moves_to_front() {
        let mut s = session();
        s.add_ingredient("harissa paste");
        s.add_ingredient("gochujang");
        assert_eq!(s.history(), ["gochujang", "harissa paste"]);

        s.remove_ingredient("harissa paste");
        s.add_ingredient("harissa paste");
        assert_eq!(s.history(), ["harissa paste", "gochujang"]);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut s = session();
        for i in 0..=HISTORY_LIMIT {
            s.add_ingredient(&format!("custom {i}"));
        }
        assert_eq!(s.history().len(), HISTORY_LIMIT);
        assert_eq!(s.history()[0], "custom 10");
        assert!(!s.history().iter().any(|h| h == "custom 0"));
    }

    #[test]
    fn test_suggestions_filter_and_limit() {
        let s = session();
        let found: Vec<_> = s.suggestions("e").collect();
        // Six catalog matches then the custom entry
        assert_eq!(found.len(), SUGGESTION_LIMIT + 1);
        assert_eq!(found[0], Suggestion::Catalog("chicken"));
        assert_eq!(found[1], Suggestion::Catalog("beef"));
        assert_eq!(found[SUGGESTION_LIMIT], Suggestion::Custom("e"));
    }

    #[test]
    fn test_suggestions_case_insensitive_and_exclude_selected() {
        let mut s = session();
        s.add_ingredient("bell peppers");
        let found: Vec<_> = s.suggestions("PEPPER").collect();
        assert_eq!(found, vec![Suggestion::Catalog("pepper")]);

        let found: Vec<_> = s.suggestions("Pepp").collect();
        assert_eq!(
            found,
            vec![Suggestion::Catalog("pepper"), Suggestion::Custom("Pepp")]
        );
    }

    #[test]
    fn test_suggestions_exact_match_has_no_custom_entry() {
        let s = session();
        let found: Vec<_> = s.suggestions("Garlic").collect();
        assert_eq!(found, vec![Suggestion::Catalog("garlic")]);
    }

    #[test]
    fn test_suggestions_empty_text() {
        let s = session();
        let found: Vec<_> = s.suggestions("").collect();
        assert_eq!(found.len(), SUGGESTION_LIMIT);
        assert!(found.iter().all(|f| matches!(f, Suggestion::Catalog(_))));
    }

    #[test]
    fn test_suggestions_are_restartable() {
        let s = session();
        let iter = s.suggestions("o");
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_quick_add_history_first_and_deduplicated() {
        let mut s = session();
        s.add_ingredient("harissa paste");
        s.add_ingredient("chicken");

        let candidates = s.quick_add_candidates();
        assert_eq!(candidates.len(), QUICK_ADD_LIMIT);
        assert_eq!(candidates[0].name, "harissa paste");
        assert!(candidates[0].from_history);
        assert!(candidates[0].selected);

        let chicken = candidates.iter().find(|c| c.name == "chicken").unwrap();
        assert!(!chicken.from_history);
        assert!(chicken.selected);

        let beef = candidates.iter().find(|c| c.name == "beef").unwrap();
        assert!(!beef.selected);
    }

    #[test]
    fn test_quick_add_dedupes_history_that_overlaps_catalog() {
        let history = vec!["rice".to_string(), "saffron".to_string()];
        let catalog = vec!["chicken".to_string(), "rice".to_string()];
        let candidates = quick_add_candidates(&history, &catalog, &[]);
        let names: Vec<_> = candidates.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["rice", "saffron", "chicken"]);
    }

    #[test]
    fn test_set_diet_validates() {
        let mut s = session();
        assert!(s.set_diet("Vegan").is_ok());
        assert_eq!(s.diet(), &Preference::Only("Vegan".to_string()));

        let err = s.set_diet("Carnivore").unwrap_err();
        assert_eq!(err, SessionError::UnknownDiet("Carnivore".to_string()));
        assert_eq!(s.diet(), &Preference::Only("Vegan".to_string()));

        assert!(s.set_diet("Any").is_ok());
        assert!(s.diet().is_any());
    }

    #[test]
    fn test_set_cuisine_validates() {
        let mut s = session();
        assert!(s.set_cuisine("Moroccan").is_ok());
        assert!(matches!(
            s.set_cuisine("Martian"),
            Err(SessionError::UnknownCuisine(_))
        ));
        assert_eq!(s.cuisine().label(), "Moroccan");
    }

    #[test]
    fn test_cycle_diet_wraps() {
        let mut s = session();
        s.cycle_diet(true);
        assert_eq!(s.diet().label(), "Vegetarian");
        s.cycle_diet(false);
        assert!(s.diet().is_any());
        s.cycle_diet(false);
        assert_eq!(s.diet().label(), "Low-Carb");
        s.cycle_diet(true);
        assert!(s.diet().is_any());
    }

    #[test]
    fn test_begin_generate_empty_selection() {
        let mut s = session();
        assert!(s.begin_generate().is_none());
        assert!(!s.is_generating());
        assert_eq!(s.notice().unwrap().kind, NoticeKind::EmptySelection);
    }

    #[test]
    fn test_begin_generate_builds_request() {
        let mut s = session();
        s.add_ingredient("tofu");
        s.set_diet("Vegan").unwrap();

        let (_, request) = s.begin_generate().unwrap();
        assert!(s.is_generating());
        assert_eq!(request.ingredients, vec!["tofu"]);
        assert_eq!(request.diet_type.as_deref(), Some("Vegan"));
        assert_eq!(request.cuisine, None);
    }

    #[test]
    fn test_begin_generate_not_reentrant() {
        let mut s = session();
        s.add_ingredient("tofu");
        assert!(s.begin_generate().is_some());
        assert!(s.begin_generate().is_none());
    }

    #[test]
    fn test_generate_success_and_failure_reset_flag() {
        let mut s = session();
        s.add_ingredient("rice");

        let (id, _) = s.begin_generate().unwrap();
        assert!(s.apply_generated(id, Ok(recipe("r1", "Rice Bowl"))));
        assert!(!s.is_generating());
        assert_eq!(s.current_recipe().unwrap().id, "r1");

        let (id, _) = s.begin_generate().unwrap();
        assert!(!s.apply_generated(id, Err(ApiError::Network("down".to_string()))));
        assert!(!s.is_generating());
        assert_eq!(s.current_recipe().unwrap().id, "r1");
        assert_eq!(s.notice().unwrap().kind, NoticeKind::GenerateFailed);
    }

    #[test]
    fn test_stale_generate_response_discarded() {
        let mut s = session();
        s.add_ingredient("rice");
        let (stale, _) = s.begin_generate().unwrap();
        s.cancel_pending();
        let (fresh, _) = s.begin_generate().unwrap();

        assert!(!s.apply_generated(stale, Ok(recipe("old", "Old"))));
        assert!(s.current_recipe().is_none());
        assert!(s.is_generating());

        assert!(s.apply_generated(fresh, Ok(recipe("new", "New"))));
        assert_eq!(s.current_recipe().unwrap().id, "new");
    }

    #[test]
    fn test_surprise_constrained_samples_catalog() {
        let mut s = session();
        s.add_ingredient("harissa paste");
        s.set_diet("Keto").unwrap();

        let (_, plan) = s.begin_surprise(&mut rng()).unwrap();
        let SurprisePlan::Constrained(request) = plan else {
            panic!("expected a constrained surprise");
        };
        assert!((3..=6).contains(&request.ingredients.len()));
        assert!(request.ingredients.iter().all(|i| s.catalog().has_ingredient(i)));
        assert_eq!(request.diet_type.as_deref(), Some("Keto"));
        assert_eq!(s.selected(), ["harissa paste"]);
    }

    #[test]
    fn test_surprise_without_preferences_is_random() {
        let mut s = session();
        let (_, plan) = s.begin_surprise(&mut rng()).unwrap();
        assert_eq!(plan, SurprisePlan::Random);
        assert!(s.is_generating());
    }

    #[test]
    fn test_surprise_failure() {
        let mut s = session();
        s.current_recipe = Some(recipe("keep", "Keep"));
        let (id, _) = s.begin_surprise(&mut rng()).unwrap();
        s.apply_surprise(id, Err(ApiError::Parse("bad".to_string())));
        assert!(!s.is_generating());
        assert_eq!(s.current_recipe().unwrap().id, "keep");
        assert_eq!(s.notice().unwrap().kind, NoticeKind::SurpriseFailed);
    }

    #[test]
    fn test_select_recent() {
        let mut s = session();
        let (id, limit) = s.begin_recent_refresh();
        assert_eq!(limit, 10);
        s.apply_recent(id, Ok(vec![recipe("a", "A"), recipe("b", "B")]));

        assert!(s.select_recent(1));
        assert_eq!(s.current_recipe(), Some(&recipe("b", "B")));
        assert!(!s.select_recent(5));
    }

    #[test]
    fn test_recent_failure_keeps_list_and_posts_nothing() {
        let mut s = session();
        let (id, _) = s.begin_recent_refresh();
        s.apply_recent(id, Ok(vec![recipe("a", "A")]));
        let (id, _) = s.begin_recent_refresh();
        s.apply_recent(id, Err(ApiError::Network("down".to_string())));
        assert_eq!(s.recent_recipes().len(), 1);
        assert!(s.notice().is_none());
    }

    #[test]
    fn test_begin_image_requires_recipe() {
        let mut s = session();
        assert!(s.begin_image().is_none());
        assert!(!s.is_generating_image());
    }

    #[test]
    fn test_image_and_generate_run_independently() {
        let mut s = session();
        s.current_recipe = Some(recipe("r1", "Soup"));
        s.add_ingredient("tofu");

        let (generate_id, _) = s.begin_generate().unwrap();
        let (image_id, recipe_id) = s.begin_image().unwrap();
        assert!(s.is_generating());
        assert!(s.is_generating_image());
        assert!(s.begin_generate().is_none());
        assert!(s.begin_image().is_none());

        assert!(s.apply_image(image_id, &recipe_id, Ok("aGVsbG8=".to_string())));
        assert!(s.is_generating());
        assert!(!s.is_generating_image());
        assert_eq!(s.current_recipe().unwrap().image_base64.as_deref(), Some("aGVsbG8="));

        assert!(s.apply_generated(generate_id, Ok(recipe("r2", "Tofu Bowl"))));
        assert!(!s.is_generating());
        assert_eq!(s.current_recipe().unwrap().id, "r2");
    }

    #[test]
    fn test_image_merge_keeps_other_fields() {
        let mut s = session();
        s.current_recipe = Some(recipe("r1", "Soup"));
        let (id, recipe_id) = s.begin_image().unwrap();
        assert_eq!(recipe_id, "r1");

        assert!(s.apply_image(id, &recipe_id, Ok("aGVsbG8=".to_string())));
        let current = s.current_recipe().unwrap();
        assert_eq!(current.image_base64.as_deref(), Some("aGVsbG8="));
        assert_eq!(current.title, "Soup");
        assert!(!s.is_generating_image());
    }

    #[test]
    fn test_image_billing_required() {
        let mut s = session();
        s.current_recipe = Some(recipe("r1", "Soup"));
        let (id, recipe_id) = s.begin_image().unwrap();
        s.apply_image(id, &recipe_id, Err(ApiError::BillingRequired(String::new())));

        assert!(s.current_recipe().unwrap().image_base64.is_none());
        assert_eq!(s.notice().unwrap().kind, NoticeKind::BillingRequired);
        assert!(!s.is_generating_image());
    }

    #[test]
    fn test_image_generic_failure() {
        let mut s = session();
        s.current_recipe = Some(recipe("r1", "Soup"));
        let (id, recipe_id) = s.begin_image().unwrap();
        s.apply_image(
            id,
            &recipe_id,
            Err(ApiError::Api {
                status: 404,
                detail: "Recipe not found".to_string(),
            }),
        );
        assert_eq!(s.notice().unwrap().kind, NoticeKind::ImageFailed);
    }

    #[test]
    fn test_image_for_replaced_recipe_discarded() {
        let mut s = session();
        let (rid, _) = s.begin_recent_refresh();
        s.apply_recent(rid, Ok(vec![recipe("r2", "Other")]));
        s.current_recipe = Some(recipe("r1", "Soup"));

        let (id, recipe_id) = s.begin_image().unwrap();
        s.select_recent(0);
        assert!(!s.apply_image(id, &recipe_id, Ok("aGVsbG8=".to_string())));
        assert!(s.current_recipe().unwrap().image_base64.is_none());
        assert!(!s.is_generating_image());
    }

    #[test]
    fn test_cancel_pending() {
        let mut s = session();
        assert!(!s.cancel_pending());

        s.add_ingredient("rice");
        s.begin_generate().unwrap();
        assert!(s.cancel_pending());
        assert!(!s.is_generating());
        assert_eq!(s.notice().unwrap().kind, NoticeKind::Cancelled);
    }
}
