//! Integration tests for the recipe session and the core façade
//!
//! This suite verifies:
//! - Blank guard, fetch ordering and failure policy of `search`
//! - The Acarajé flow end to end through the Gemini client
//! - Mode switching, seed search and startup configuration status

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::playback::{PlaybackAdapter, PlaybackRequest, PlaybackSessionId, PlaybackState};
use bytes::Bytes;
use core_library::{
    Difficulty, LibraryError, RecipeDraft, RecipeGenerator, RecipeMode, SUGGESTED_RECIPES,
};
use core_runtime::config::{AudioSettings, CoreConfig, GenerationSettings, SeedSettings};
use core_runtime::events::{CoreEvent, SessionEvent};
use core_service::{
    CoreDependencies, CoreService, CoreStartup, RecipeSession, SearchOutcome, SessionPhase,
    SEARCH_FAILED_MESSAGE,
};
use mockall::mock;
use provider_gemini::GeminiClient;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Test Doubles
// ============================================================================

mock! {
    pub Generator {}

    #[async_trait]
    impl RecipeGenerator for Generator {
        async fn request_recipe(&self, query: &str, mode: RecipeMode) -> core_library::Result<RecipeDraft>;
        async fn request_food_image(&self, title: &str) -> core_library::Result<Option<String>>;
        async fn request_narration_audio(&self, text: &str) -> core_library::Result<Option<String>>;
    }
}

mock! {
    pub Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

mock! {
    pub Adapter {}

    #[async_trait]
    impl PlaybackAdapter for Adapter {
        async fn prepare(&self, request: PlaybackRequest) -> BridgeResult<PlaybackSessionId>;
        async fn play(&self, session: PlaybackSessionId) -> BridgeResult<()>;
        async fn stop(&self, session: PlaybackSessionId) -> BridgeResult<()>;
        async fn state(&self, session: PlaybackSessionId) -> BridgeResult<PlaybackState>;
        async fn unload(&self, session: PlaybackSessionId) -> BridgeResult<()>;
    }
}

/// Backend double that checks the image request follows the recipe request
/// for the same title.
#[derive(Default)]
struct OrderedBackend {
    calls: Mutex<Vec<String>>,
    last_title: Mutex<Option<String>>,
}

#[async_trait]
impl RecipeGenerator for OrderedBackend {
    async fn request_recipe(
        &self,
        query: &str,
        _mode: RecipeMode,
    ) -> core_library::Result<RecipeDraft> {
        self.calls.lock().unwrap().push(format!("recipe:{}", query));
        let draft = draft(&format!("{} da Casa", query));
        *self.last_title.lock().unwrap() = Some(draft.title.clone());
        Ok(draft)
    }

    async fn request_food_image(&self, title: &str) -> core_library::Result<Option<String>> {
        self.calls.lock().unwrap().push(format!("image:{}", title));
        assert_eq!(self.last_title.lock().unwrap().as_deref(), Some(title));
        Ok(Some("data:image/png;base64,AA==".to_string()))
    }

    async fn request_narration_audio(&self, _text: &str) -> core_library::Result<Option<String>> {
        Ok(None)
    }
}

/// Backend whose recipe request never resolves.
#[derive(Default)]
struct StalledBackend {
    started: Notify,
}

#[async_trait]
impl RecipeGenerator for StalledBackend {
    async fn request_recipe(
        &self,
        _query: &str,
        _mode: RecipeMode,
    ) -> core_library::Result<RecipeDraft> {
        self.started.notify_one();
        std::future::pending().await
    }

    async fn request_food_image(&self, _title: &str) -> core_library::Result<Option<String>> {
        Ok(None)
    }

    async fn request_narration_audio(&self, _text: &str) -> core_library::Result<Option<String>> {
        Ok(None)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn draft(title: &str) -> RecipeDraft {
    RecipeDraft {
        title: title.to_string(),
        description: "Prato típico".to_string(),
        ingredients: vec!["farinha".to_string()],
        instructions: vec!["Misture".to_string()],
        history: "Sertão".to_string(),
        cooking_time: "20 min".to_string(),
        difficulty: Difficulty::Easy,
        drink_pairings: vec!["Cajuína".to_string()],
    }
}

fn session_with(generator: impl RecipeGenerator + 'static) -> RecipeSession {
    RecipeSession::new(Arc::new(generator), Default::default())
}

fn http_ok(body: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

fn no_seed() -> SeedSettings {
    SeedSettings {
        enabled: false,
        delay: Duration::from_millis(0),
    }
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_blank_query_leaves_state_unchanged() {
    let mut generator = MockGenerator::new();
    generator.expect_request_recipe().times(0);
    generator.expect_request_food_image().times(0);

    let session = session_with(generator);
    session.set_query("   ");
    let before = session.snapshot();

    assert_eq!(session.search(Some("")).await, SearchOutcome::Skipped);
    assert_eq!(session.search(Some(" \t\n ")).await, SearchOutcome::Skipped);
    assert_eq!(session.search(None).await, SearchOutcome::Skipped);

    assert_eq!(session.snapshot(), before);
    assert!(!session.snapshot().is_searching);
}

#[tokio::test]
async fn test_empty_argument_uses_stored_query() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .withf(|query, _| query.to_string() == "Cartola")
        .times(1)
        .returning(|query, _| Ok(draft(query)));
    generator.expect_request_food_image().returning(|_| Ok(None));

    let session = session_with(generator);
    session.set_query("Cartola");

    let outcome = session.search(Some("")).await;

    assert!(matches!(outcome, SearchOutcome::Added(ref recipe) if recipe.title == "Cartola"));
    assert_eq!(session.snapshot().query, "");
}

#[tokio::test]
async fn test_cancelled_search_clears_busy_flag() {
    let backend = Arc::new(StalledBackend::default());
    let session = Arc::new(RecipeSession::new(backend.clone(), Default::default()));

    let task = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.search(Some("Buchada")).await })
    };
    tokio::time::timeout(Duration::from_secs(2), backend.started.notified())
        .await
        .expect("recipe request never started");
    assert!(session.snapshot().is_searching);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    let snapshot = session.snapshot();
    assert!(!snapshot.is_searching);
    assert_eq!(snapshot.phase(), SessionPhase::Idle);
    assert!(snapshot.recipes.is_empty());
}

#[tokio::test]
async fn test_image_request_follows_recipe_title() {
    let backend = Arc::new(OrderedBackend::default());
    let session = RecipeSession::new(backend.clone(), Default::default());

    let outcome = session.search(Some("Cuscuz")).await;

    assert!(matches!(outcome, SearchOutcome::Added(ref recipe) if recipe.title == "Cuscuz da Casa"));
    assert_eq!(
        *backend.calls.lock().unwrap(),
        vec!["recipe:Cuscuz".to_string(), "image:Cuscuz da Casa".to_string()]
    );
}

#[tokio::test]
async fn test_image_failure_degrades_to_no_image() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .times(1)
        .returning(|_, _| Ok(draft("Baião de Dois")));
    generator
        .expect_request_food_image()
        .times(1)
        .returning(|_| Err(LibraryError::Transport("image backend down".to_string())));

    let session = session_with(generator);
    session.search(Some("Baião de Dois")).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.recipes.len(), 1);
    assert_eq!(snapshot.recipes[0].image_url, None);
    assert_eq!(snapshot.error, None);
    assert!(!snapshot.is_searching);
}

#[tokio::test]
async fn test_recipe_failure_blocks_and_reports() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .times(1)
        .returning(|_, _| Err(LibraryError::Transport("timeout".to_string())));
    generator.expect_request_food_image().times(0);

    let session = session_with(generator);
    session.set_query("Moqueca Baiana");
    let outcome = session.search(None).await;

    assert_eq!(outcome, SearchOutcome::Failed);
    let snapshot = session.snapshot();
    assert!(snapshot.recipes.is_empty());
    assert_eq!(snapshot.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
    assert!(!snapshot.is_searching);
    assert_eq!(snapshot.phase(), SessionPhase::Error);
    // The query survives a failure so the user can retry.
    assert_eq!(snapshot.query, "Moqueca Baiana");
}

#[tokio::test]
async fn test_results_are_newest_first() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .returning(|query, _| Ok(draft(query)));
    generator.expect_request_food_image().returning(|_| Ok(None));

    let session = session_with(generator);
    session.search(Some("Vatapá")).await;
    session.search(Some("Sarapatel")).await;

    let titles: Vec<String> = session
        .snapshot()
        .recipes
        .into_iter()
        .map(|recipe| recipe.title)
        .collect();
    assert_eq!(titles, vec!["Sarapatel", "Vatapá"]);
    assert_eq!(session.recipe_count(), 2);
}

#[tokio::test]
async fn test_search_emits_events() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .returning(|query, _| Ok(draft(query)));
    generator
        .expect_request_food_image()
        .returning(|_| Ok(Some("data:image/png;base64,AA==".to_string())));

    let bus = core_runtime::events::EventBus::default();
    let mut receiver = bus.subscribe();
    let session = RecipeSession::new(Arc::new(generator), bus);

    session.search(Some("Tapioca")).await;

    let mut events = Vec::new();
    while let Ok(CoreEvent::Session(event)) = receiver.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        SessionEvent::SearchStarted {
            query: "Tapioca".to_string(),
            mode: "traditional".to_string()
        }
    );
    assert!(matches!(
        &events[1],
        SessionEvent::RecipeAdded { title, has_image: true, .. } if title == "Tapioca"
    ));
}

// ============================================================================
// End to end through the Gemini client
// ============================================================================

#[tokio::test]
async fn test_acaraje_end_to_end() {
    let image_bytes: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let image_b64 = STANDARD.encode(image_bytes);

    let recipe_text = json!({
        "title": "Acarajé",
        "description": "...",
        "ingredients": ["feijão fradinho", "camarão"],
        "instructions": ["Bata o feijão", "Frite"],
        "history": "...",
        "cookingTime": "40 min",
        "difficulty": "Médio",
        "drinkPairings": ["Guaraná Jesus"]
    })
    .to_string();

    let mut http = MockHttp::new();
    let image_payload = image_b64.clone();
    http.expect_execute().times(2).returning(move |request| {
        if request.url.contains("gemini-3-flash-preview") {
            Ok(http_ok(json!({
                "candidates": [{ "content": { "parts": [{ "text": recipe_text }] } }]
            })))
        } else {
            assert!(request.url.contains("gemini-2.5-flash-image"));
            Ok(http_ok(json!({
                "candidates": [{ "content": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": image_payload } }
                ] } }]
            })))
        }
    });

    let client = GeminiClient::new(
        Arc::new(http),
        core_runtime::config::ApiKey::new("test-key"),
        GenerationSettings::default(),
    );
    let session = session_with(client);

    session.search(Some("Acarajé")).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.recipes.len(), 1);
    let recipe = &snapshot.recipes[0];
    assert_eq!(recipe.title, "Acarajé");
    assert_eq!(recipe.difficulty, Difficulty::Medium);
    assert_eq!(recipe.ingredients, vec!["feijão fradinho", "camarão"]);
    assert_eq!(recipe.drink_pairings, vec!["Guaraná Jesus"]);
    assert_eq!(
        recipe.image_url,
        Some(format!("data:image/png;base64,{}", image_b64))
    );
    assert_eq!(recipe.id.as_str().len(), 9);
}

// ============================================================================
// Mode
// ============================================================================

#[tokio::test]
async fn test_mode_change_keeps_results_and_selection() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .withf(|_, mode| *mode == RecipeMode::Traditional)
        .times(1)
        .returning(|query, _| Ok(draft(query)));
    generator
        .expect_request_recipe()
        .withf(|_, mode| *mode == RecipeMode::Pantry)
        .times(1)
        .returning(|_, _| Ok(draft("Escondidinho")));
    generator.expect_request_food_image().returning(|_| Ok(None));

    let session = session_with(generator);
    let first = match session.search(Some("Bolo de Rolo")).await {
        SearchOutcome::Added(recipe) => recipe,
        other => panic!("unexpected outcome {:?}", other),
    };
    session.select_recipe(Some(&first.id));
    session.set_query("macaxeira, carne seca");

    session.set_mode(RecipeMode::Pantry);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.mode, RecipeMode::Pantry);
    assert_eq!(snapshot.query, "");
    assert_eq!(snapshot.recipes.len(), 1);
    assert_eq!(snapshot.selected, Some(first.id));

    session.search(Some("macaxeira, carne seca")).await;
    assert_eq!(session.recipe_count(), 2);
}

// ============================================================================
// Seed search
// ============================================================================

#[tokio::test]
async fn test_seed_search_uses_a_suggestion() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .withf(|query, _| SUGGESTED_RECIPES.iter().any(|dish| *dish == query.to_string()))
        .times(1)
        .returning(|query, _| Ok(draft(query)));
    generator.expect_request_food_image().returning(|_| Ok(None));

    let session = Arc::new(session_with(generator));
    let outcome = session.spawn_seed(Duration::from_millis(10)).await.unwrap();

    assert!(matches!(outcome, SearchOutcome::Added(_)));
    assert_eq!(session.recipe_count(), 1);
}

#[tokio::test]
async fn test_seed_skipped_when_results_exist() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .times(1)
        .returning(|query, _| Ok(draft(query)));
    generator.expect_request_food_image().returning(|_| Ok(None));

    let session = session_with(generator);
    session.search(Some("Tapioca")).await;

    assert_eq!(
        session.seed(Duration::from_millis(1)).await,
        SearchOutcome::Skipped
    );
    assert_eq!(session.recipe_count(), 1);
}

#[tokio::test]
async fn test_core_service_runs_seed_on_start() {
    let mut generator = MockGenerator::new();
    generator
        .expect_request_recipe()
        .times(1)
        .returning(|query, _| Ok(draft(query)));
    generator.expect_request_food_image().returning(|_| Ok(None));

    let core = CoreService::new(
        CoreDependencies::new(Arc::new(generator), Arc::new(MockAdapter::new())),
        &AudioSettings::default(),
        SeedSettings {
            enabled: true,
            delay: Duration::from_millis(5),
        },
    );

    for _ in 0..200 {
        if core.session().recipe_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(core.session().recipe_count(), 1);
    core.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_during_seed_search_leaves_session_idle() {
    let backend = Arc::new(StalledBackend::default());
    let core = CoreService::new(
        CoreDependencies::new(backend.clone(), Arc::new(MockAdapter::new())),
        &AudioSettings::default(),
        SeedSettings {
            enabled: true,
            delay: Duration::from_millis(0),
        },
    );

    tokio::time::timeout(Duration::from_secs(2), backend.started.notified())
        .await
        .expect("seed search never started");
    assert!(core.session().snapshot().is_searching);

    core.shutdown().await;

    let snapshot = core.session().snapshot();
    assert!(!snapshot.is_searching);
    assert_eq!(snapshot.phase(), SessionPhase::Idle);
}

// ============================================================================
// Startup
// ============================================================================

#[tokio::test]
async fn test_start_without_api_key_is_unconfigured() {
    let startup = CoreService::start(CoreConfig::builder()).unwrap();

    assert!(!startup.config_status().is_ready());
    assert!(matches!(
        startup.into_service(),
        Err(core_service::CoreError::Unconfigured { .. })
    ));
}

#[tokio::test]
async fn test_start_with_blank_api_key_is_unconfigured() {
    let startup = CoreService::start(CoreConfig::builder().api_key("  ")).unwrap();
    assert!(matches!(startup, CoreStartup::Unconfigured { .. }));
}

#[tokio::test]
async fn test_start_with_api_key_is_ready() {
    let builder = CoreConfig::builder()
        .api_key("test-key")
        .http_client(Arc::new(MockHttp::new()))
        .playback_adapter(Arc::new(MockAdapter::new()))
        .seed_search(false);

    let startup = CoreService::start(builder).unwrap();
    assert!(startup.config_status().is_ready());

    let core = startup.into_service().unwrap();
    assert_eq!(core.session().recipe_count(), 0);
    assert!(core.playback().status().is_stopped());
    core.shutdown().await;
}

#[cfg(not(feature = "native-audio"))]
#[tokio::test]
async fn test_start_without_audio_output_keeps_search() {
    let recipe_text = json!({
        "title": "Cuscuz Nordestino",
        "description": "Flocão no vapor",
        "ingredients": ["flocão de milho", "sal"],
        "instructions": ["Hidrate", "Cozinhe no vapor"],
        "history": "Café do sertão",
        "cookingTime": "15 min",
        "difficulty": "Fácil",
        "drinkPairings": ["Café"]
    })
    .to_string();

    let mut http = MockHttp::new();
    http.expect_execute().returning(move |request| {
        if request.url.contains("flash-image") {
            Ok(http_ok(json!({ "candidates": [] })))
        } else if request.url.contains("tts") {
            let pcm = STANDARD.encode([0u8, 0, 0, 64]);
            Ok(http_ok(json!({
                "candidates": [{ "content": { "parts": [
                    { "inlineData": { "mimeType": "audio/L16;rate=24000", "data": pcm } }
                ] } }]
            })))
        } else {
            Ok(http_ok(json!({
                "candidates": [{ "content": { "parts": [{ "text": recipe_text.clone() }] } }]
            })))
        }
    });

    let builder = CoreConfig::builder()
        .api_key("test-key")
        .http_client(Arc::new(http))
        .seed_search(false);
    let core = CoreService::start(builder).unwrap().into_service().unwrap();

    let recipe = match core.session().search(Some("Cuscuz")).await {
        SearchOutcome::Added(recipe) => recipe,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(recipe.title, "Cuscuz Nordestino");

    let status = core.playback().toggle(&recipe).await;
    assert!(status.is_stopped());
    core.shutdown().await;
}

#[tokio::test]
async fn test_start_rejects_invalid_settings() {
    let builder = CoreConfig::builder()
        .api_key("test-key")
        .recipe_model(" ")
        .http_client(Arc::new(MockHttp::new()))
        .playback_adapter(Arc::new(MockAdapter::new()));

    assert!(matches!(
        CoreService::start(builder),
        Err(core_service::CoreError::Runtime(_))
    ));
}

#[tokio::test]
async fn test_service_without_seed_stays_empty() {
    let core = CoreService::new(
        CoreDependencies::new(Arc::new(MockGenerator::new()), Arc::new(MockAdapter::new())),
        &AudioSettings::default(),
        no_seed(),
    );

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(core.session().recipe_count(), 0);
    assert!(core.subscribe().try_recv().is_none());
}
