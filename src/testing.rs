//! In-memory upstream clients for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::{
    error::UpstreamError,
    meals::{client::RecipeApi, dto::MealPlanQuery},
    speech::{client::SpeechApi, dto::Synthesis},
    workouts::client::ExerciseApi,
};

type PlanFn = dyn Fn(&MealPlanQuery) -> Result<Value, UpstreamError> + Send + Sync;
type LookupFn = dyn Fn(&str) -> Result<Value, UpstreamError> + Send + Sync;
type ImageFn = dyn Fn(&str, &str) -> Result<Bytes, UpstreamError> + Send + Sync;
type SpeechFn = dyn Fn(&Synthesis) -> Result<Bytes, UpstreamError> + Send + Sync;

#[derive(Clone)]
pub struct FakeRecipes {
    plan: Arc<PlanFn>,
    recipe: Arc<LookupFn>,
    plan_queries: Arc<Mutex<Vec<MealPlanQuery>>>,
    recipe_calls: Arc<Mutex<Vec<String>>>,
}

impl FakeRecipes {
    pub fn new(
        plan: impl Fn(&MealPlanQuery) -> Result<Value, UpstreamError> + Send + Sync + 'static,
        recipe: impl Fn(&str) -> Result<Value, UpstreamError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            plan: Arc::new(plan),
            recipe: Arc::new(recipe),
            plan_queries: Arc::default(),
            recipe_calls: Arc::default(),
        }
    }

    pub fn plan_queries(&self) -> Vec<MealPlanQuery> {
        self.plan_queries.lock().unwrap().clone()
    }

    pub fn recipe_calls(&self) -> Vec<String> {
        self.recipe_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipeApi for FakeRecipes {
    async fn generate_meal_plan(&self, query: &MealPlanQuery) -> Result<Value, UpstreamError> {
        self.plan_queries.lock().unwrap().push(query.clone());
        (self.plan)(query)
    }

    async fn recipe_information(&self, recipe_id: &str) -> Result<Value, UpstreamError> {
        self.recipe_calls.lock().unwrap().push(recipe_id.to_string());
        (self.recipe)(recipe_id)
    }
}

#[derive(Clone)]
pub struct FakeExercises {
    targets: Arc<LookupFn>,
    image: Arc<ImageFn>,
    target_calls: Arc<Mutex<Vec<String>>>,
    image_calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeExercises {
    pub fn new(targets: impl Fn(&str) -> Result<Value, UpstreamError> + Send + Sync + 'static) -> Self {
        Self {
            targets: Arc::new(targets),
            image: Arc::new(|_: &str, _: &str| Ok(Bytes::new())),
            target_calls: Arc::default(),
            image_calls: Arc::default(),
        }
    }

    pub fn with_image(
        mut self,
        image: impl Fn(&str, &str) -> Result<Bytes, UpstreamError> + Send + Sync + 'static,
    ) -> Self {
        self.image = Arc::new(image);
        self
    }

    pub fn target_calls(&self) -> Vec<String> {
        self.target_calls.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<(String, String)> {
        self.image_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExerciseApi for FakeExercises {
    async fn exercises_by_target(&self, target: &str) -> Result<Value, UpstreamError> {
        self.target_calls.lock().unwrap().push(target.to_string());
        (self.targets)(target)
    }

    async fn exercise_image(&self, exercise_id: &str, resolution: &str) -> Result<Bytes, UpstreamError> {
        self.image_calls
            .lock()
            .unwrap()
            .push((exercise_id.to_string(), resolution.to_string()));
        (self.image)(exercise_id, resolution)
    }
}

#[derive(Clone)]
pub struct FakeSpeech {
    respond: Arc<SpeechFn>,
    calls: Arc<Mutex<Vec<Synthesis>>>,
}

impl FakeSpeech {
    pub fn new(respond: impl Fn(&Synthesis) -> Result<Bytes, UpstreamError> + Send + Sync + 'static) -> Self {
        Self {
            respond: Arc::new(respond),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Synthesis> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechApi for FakeSpeech {
    async fn synthesize(&self, request: &Synthesis) -> Result<Bytes, UpstreamError> {
        self.calls.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}
