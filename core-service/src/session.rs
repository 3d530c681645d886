//! # Recipe Session
//!
//! Sequences a user query into a displayable recipe: recipe request, then
//! image request for the returned title, then prepend to the result list.
//!
//! The session owns the result list. Readers take a [`SessionSnapshot`];
//! [`SessionEvent`]s on the bus tell them when to re-read.
//!
//! Searches are not mutually exclusive. The presentation layer disables its
//! trigger while [`SessionSnapshot::is_searching`] is set; concurrent callers
//! each complete independently.

use std::sync::Arc;
use std::time::Duration;

use core_library::{random_suggestion, Recipe, RecipeGenerator, RecipeId, RecipeMode};
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// The only failure text ever shown to the user.
pub const SEARCH_FAILED_MESSAGE: &str =
    "Eita! Não conseguimos temperar essa receita agora. Tente novamente!";

/// Coarse session state derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Fetching,
    /// The last search failed; cleared by the next attempt.
    Error,
}

/// Read-only view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub query: String,
    pub is_searching: bool,
    /// Newest first.
    pub recipes: Vec<Recipe>,
    pub selected: Option<RecipeId>,
    pub error: Option<String>,
    pub mode: RecipeMode,
}

impl SessionSnapshot {
    pub fn phase(&self) -> SessionPhase {
        if self.is_searching {
            SessionPhase::Fetching
        } else if self.error.is_some() {
            SessionPhase::Error
        } else {
            SessionPhase::Idle
        }
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        let id = self.selected.as_ref()?;
        self.recipes.iter().find(|recipe| &recipe.id == id)
    }
}

/// How a call to [`RecipeSession::search`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query; nothing changed.
    Skipped,
    Added(Recipe),
    /// The recipe request failed; the session carries the user-facing error.
    Failed,
}

/// Clears `is_searching` when a search is dropped before it settles.
struct InFlight<'a> {
    state: &'a Mutex<SessionSnapshot>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Mutex<SessionSnapshot>) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    /// The caller resets the busy flag itself.
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.state.lock().is_searching = false;
            debug!("Search cancelled in flight");
        }
    }
}

/// Owner of the search state and the result list.
pub struct RecipeSession {
    generator: Arc<dyn RecipeGenerator>,
    events: EventBus,
    state: Mutex<SessionSnapshot>,
}

impl RecipeSession {
    pub fn new(generator: Arc<dyn RecipeGenerator>, events: EventBus) -> Self {
        Self {
            generator,
            events,
            state: Mutex::new(SessionSnapshot::default()),
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.emit(CoreEvent::Session(event));
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().clone()
    }

    pub fn recipe_count(&self) -> usize {
        self.state.lock().recipes.len()
    }

    pub fn mode(&self) -> RecipeMode {
        self.state.lock().mode
    }

    pub fn selected(&self) -> Option<Recipe> {
        self.state.lock().selected_recipe().cloned()
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.state.lock().query = query.into();
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    /// Switch the prompt template. Clears the stored query but keeps results
    /// and selection.
    pub fn set_mode(&self, mode: RecipeMode) {
        {
            let mut state = self.state.lock();
            state.query.clear();
            if state.mode == mode {
                return;
            }
            state.mode = mode;
        }

        info!(%mode, "Recipe mode changed");
        self.emit(SessionEvent::ModeChanged {
            mode: mode.to_string(),
        });
    }

    pub fn toggle_mode(&self) -> RecipeMode {
        let mode = self.mode().toggled();
        self.set_mode(mode);
        mode
    }

    /// Select a recipe from the result list, or clear the selection.
    ///
    /// Returns `false` and leaves the selection untouched when `id` is not in
    /// the list.
    pub fn select_recipe(&self, id: Option<&RecipeId>) -> bool {
        {
            let mut state = self.state.lock();
            if let Some(id) = id {
                if !state.recipes.iter().any(|recipe| &recipe.id == id) {
                    warn!(recipe_id = %id, "Selection ignored for unknown recipe");
                    return false;
                }
            }
            state.selected = id.cloned();
        }

        self.emit(SessionEvent::SelectionChanged {
            recipe_id: id.map(ToString::to_string),
        });
        true
    }

    /// Run one search.
    ///
    /// A non-empty `query` overrides the stored query. A blank effective
    /// query is a no-op. Image failures degrade to a recipe without an image;
    /// recipe failures set [`SEARCH_FAILED_MESSAGE`] and leave the list
    /// unchanged. Dropping the future mid-flight clears the busy flag.
    #[instrument(skip(self))]
    pub async fn search(&self, query: Option<&str>) -> SearchOutcome {
        let (query, mode) = {
            let mut state = self.state.lock();
            let query = match query {
                Some(query) if !query.is_empty() => query.trim().to_string(),
                _ => state.query.trim().to_string(),
            };
            if query.is_empty() {
                debug!("Blank query; search skipped");
                return SearchOutcome::Skipped;
            }
            state.error = None;
            state.is_searching = true;
            (query, state.mode)
        };
        let in_flight = InFlight::new(&self.state);

        info!(%query, %mode, "Recipe search started");
        self.emit(SessionEvent::SearchStarted {
            query: query.clone(),
            mode: mode.to_string(),
        });

        let draft = match self.generator.request_recipe(&query, mode).await {
            Ok(draft) => match draft.validate() {
                Ok(()) => draft,
                Err(e) => {
                    in_flight.settle();
                    return self.fail(e);
                }
            },
            Err(e) => {
                in_flight.settle();
                return self.fail(e);
            }
        };

        let image_url = match self.generator.request_food_image(&draft.title).await {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, title = %draft.title, "Food image unavailable");
                None
            }
        };

        let recipe = Recipe::from_draft(draft, RecipeId::new(), image_url);
        in_flight.settle();
        {
            let mut state = self.state.lock();
            state.recipes.insert(0, recipe.clone());
            state.query.clear();
            state.is_searching = false;
        }

        info!(recipe_id = %recipe.id, title = %recipe.title, "Recipe added");
        self.emit(SessionEvent::RecipeAdded {
            recipe_id: recipe.id.to_string(),
            title: recipe.title.clone(),
            has_image: recipe.image_url.is_some(),
        });
        SearchOutcome::Added(recipe)
    }

    fn fail(&self, cause: core_library::LibraryError) -> SearchOutcome {
        error!(error = %cause, "Recipe search failed");
        {
            let mut state = self.state.lock();
            state.error = Some(SEARCH_FAILED_MESSAGE.to_string());
            state.is_searching = false;
        }

        self.emit(SessionEvent::SearchFailed {
            message: SEARCH_FAILED_MESSAGE.to_string(),
        });
        SearchOutcome::Failed
    }

    /// Search a random suggested dish if the result list is still empty
    /// after `delay`.
    pub async fn seed(&self, delay: Duration) -> SearchOutcome {
        tokio::time::sleep(delay).await;
        if self.recipe_count() > 0 {
            debug!("Results present; seed search skipped");
            return SearchOutcome::Skipped;
        }

        let dish = random_suggestion();
        debug!(%dish, "Running seed search");
        self.search(Some(dish)).await
    }

    /// Spawn [`RecipeSession::seed`] on the current runtime.
    pub fn spawn_seed(self: &Arc<Self>, delay: Duration) -> JoinHandle<SearchOutcome> {
        let session = Arc::clone(self);
        tokio::spawn(async move { session.seed(delay).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_library::{Difficulty, LibraryError, RecipeDraft};
    use mockall::mock;

    mock! {
        Generator {}

        #[async_trait::async_trait]
        impl RecipeGenerator for Generator {
            async fn request_recipe(&self, query: &str, mode: RecipeMode) -> core_library::Result<RecipeDraft>;
            async fn request_food_image(&self, title: &str) -> core_library::Result<Option<String>>;
            async fn request_narration_audio(&self, text: &str) -> core_library::Result<Option<String>>;
        }
    }

    fn draft(title: &str) -> RecipeDraft {
        RecipeDraft {
            title: title.to_string(),
            description: "Prato nordestino".to_string(),
            ingredients: vec!["sal".to_string()],
            instructions: vec!["Cozinhe".to_string()],
            history: "Tradição".to_string(),
            cooking_time: "30 min".to_string(),
            difficulty: Difficulty::Easy,
            drink_pairings: vec![],
        }
    }

    fn session(generator: MockGenerator) -> RecipeSession {
        RecipeSession::new(Arc::new(generator), EventBus::default())
    }

    #[tokio::test]
    async fn test_stored_query_is_used_and_cleared() {
        let mut generator = MockGenerator::new();
        generator
            .expect_request_recipe()
            .withf(|query, mode| query.to_string() == "Tapioca" && *mode == RecipeMode::Traditional)
            .times(1)
            .returning(|_, _| Ok(draft("Tapioca")));
        generator
            .expect_request_food_image()
            .times(1)
            .returning(|_| Ok(None));

        let session = session(generator);
        session.set_query("  Tapioca ");
        let outcome = session.search(None).await;

        assert!(matches!(outcome, SearchOutcome::Added(_)));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.query, "");
        assert_eq!(snapshot.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_error_cleared_by_next_attempt() {
        let mut generator = MockGenerator::new();
        let mut calls = 0;
        generator
            .expect_request_recipe()
            .times(2)
            .returning(move |_, _| {
                calls += 1;
                if calls == 1 {
                    Err(LibraryError::Transport("offline".to_string()))
                } else {
                    Ok(draft("Vatapá"))
                }
            });
        generator
            .expect_request_food_image()
            .times(1)
            .returning(|_| Ok(None));

        let session = session(generator);
        assert_eq!(session.search(Some("Vatapá")).await, SearchOutcome::Failed);
        assert_eq!(session.snapshot().phase(), SessionPhase::Error);

        assert!(matches!(
            session.search(Some("Vatapá")).await,
            SearchOutcome::Added(_)
        ));
        assert_eq!(session.snapshot().error, None);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_a_failure() {
        let mut generator = MockGenerator::new();
        generator
            .expect_request_recipe()
            .times(1)
            .returning(|_, _| Ok(draft(" ")));
        generator.expect_request_food_image().times(0);

        let session = session(generator);
        assert_eq!(session.search(Some("???")).await, SearchOutcome::Failed);
        assert_eq!(session.recipe_count(), 0);
    }

    #[tokio::test]
    async fn test_selection() {
        let mut generator = MockGenerator::new();
        generator
            .expect_request_recipe()
            .returning(|query, _| Ok(draft(query)));
        generator.expect_request_food_image().returning(|_| Ok(None));

        let session = session(generator);
        let first = match session.search(Some("Sarapatel")).await {
            SearchOutcome::Added(recipe) => recipe,
            other => panic!("unexpected outcome {:?}", other),
        };

        assert!(session.select_recipe(Some(&first.id)));
        assert_eq!(session.selected().map(|r| r.title), Some("Sarapatel".to_string()));

        assert!(!session.select_recipe(Some(&RecipeId::from_string("missing00"))));
        assert_eq!(session.snapshot().selected, Some(first.id.clone()));

        assert!(session.select_recipe(None));
        assert!(session.selected().is_none());
    }

    #[tokio::test]
    async fn test_clear_error() {
        let mut generator = MockGenerator::new();
        generator
            .expect_request_recipe()
            .returning(|_, _| Err(LibraryError::Parse("bad".to_string())));

        let session = session(generator);
        session.search(Some("Moqueca")).await;
        assert_eq!(
            session.snapshot().error.as_deref(),
            Some(SEARCH_FAILED_MESSAGE)
        );

        session.clear_error();
        assert_eq!(session.snapshot().phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_toggle_mode() {
        let session = session(MockGenerator::new());
        assert_eq!(session.mode(), RecipeMode::Traditional);
        assert_eq!(session.toggle_mode(), RecipeMode::Pantry);
        assert_eq!(session.toggle_mode(), RecipeMode::Traditional);
    }
}
