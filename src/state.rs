use crate::config::AppConfig;
use crate::meals::client::{RecipeApi, SpoonacularClient};
use crate::rate_limit::RateLimiter;
use crate::speech::client::{ElevenLabsClient, SpeechApi};
use crate::upstream::http_client;
use crate::workouts::client::{ExerciseApi, ExerciseDbClient};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub recipes: Arc<dyn RecipeApi>,
    pub exercises: Arc<dyn ExerciseApi>,
    pub speech: Arc<dyn SpeechApi>,
    /// Spaces out catalog lookups while a week is assembled.
    pub catalog_pacing: Arc<RateLimiter>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let upstream = &config.upstream;
        let http = http_client(Duration::from_secs(upstream.timeout_secs))?;

        let recipes = Arc::new(SpoonacularClient::new(
            http.clone(),
            upstream.spoonacular_base_url.clone(),
            upstream.spoonacular_api_key.clone(),
        )) as Arc<dyn RecipeApi>;

        let image_limiter = Arc::new(RateLimiter::new("exercise-image", config.pacing.image_min_interval()));
        let exercises = Arc::new(ExerciseDbClient::new(
            http.clone(),
            upstream.exercisedb_base_url.clone(),
            upstream.exercisedb_api_key.clone(),
            image_limiter,
        )) as Arc<dyn ExerciseApi>;

        let speech = Arc::new(ElevenLabsClient::new(
            http,
            upstream.elevenlabs_base_url.clone(),
            upstream.elevenlabs_api_key.clone(),
        )) as Arc<dyn SpeechApi>;

        for (service, key) in [
            ("Spoonacular", &upstream.spoonacular_api_key),
            ("ExercisesDB", &upstream.exercisedb_api_key),
            ("ElevenLabs", &upstream.elevenlabs_api_key),
        ] {
            if key.is_none() {
                tracing::warn!(service, "API key not configured; its routes will fail");
            }
        }

        Ok(Self::from_parts(config, recipes, exercises, speech))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        recipes: Arc<dyn RecipeApi>,
        exercises: Arc<dyn ExerciseApi>,
        speech: Arc<dyn SpeechApi>,
    ) -> Self {
        let catalog_pacing = Arc::new(RateLimiter::new(
            "exercise-catalog",
            config.pacing.catalog_request_delay(),
        ));
        Self {
            config,
            recipes,
            exercises,
            speech,
            catalog_pacing,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by in-memory clients that answer with empty successes.
    pub fn fake() -> Self {
        use crate::config::{PacingConfig, UpstreamConfig};
        use crate::testing::{FakeExercises, FakeRecipes, FakeSpeech};
        use serde_json::json;

        let config = Arc::new(AppConfig {
            upstream: UpstreamConfig {
                spoonacular_api_key: Some("test".into()),
                spoonacular_base_url: "http://fake.local".into(),
                exercisedb_api_key: Some("test".into()),
                exercisedb_base_url: "http://fake.local".into(),
                elevenlabs_api_key: Some("test".into()),
                elevenlabs_base_url: "http://fake.local".into(),
                timeout_secs: 5,
            },
            pacing: PacingConfig {
                image_min_interval_ms: 200,
                catalog_request_delay_ms: 500,
                exercises_per_muscle: 3,
            },
        });

        Self::from_parts(
            config,
            Arc::new(FakeRecipes::new(|_| Ok(json!({"meals": []})), |_| Ok(json!({})))),
            Arc::new(FakeExercises::new(|_| Ok(json!([])))),
            Arc::new(FakeSpeech::new(|_| Ok(bytes::Bytes::new()))),
        )
    }

    pub fn with_recipes(mut self, recipes: impl RecipeApi + 'static) -> Self {
        self.recipes = Arc::new(recipes);
        self
    }

    pub fn with_exercises(mut self, exercises: impl ExerciseApi + 'static) -> Self {
        self.exercises = Arc::new(exercises);
        self
    }

    pub fn with_speech(mut self, speech: impl SpeechApi + 'static) -> Self {
        self.speech = Arc::new(speech);
        self
    }

    pub fn without_exercise_key(mut self) -> Self {
        Arc::make_mut(&mut self.config).upstream.exercisedb_api_key = None;
        self
    }

    pub fn without_speech_key(mut self) -> Self {
        Arc::make_mut(&mut self.config).upstream.elevenlabs_api_key = None;
        self
    }
}
