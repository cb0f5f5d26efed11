use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::dto::MealPlanQuery;
use crate::{
    error::UpstreamError,
    upstream::{endpoint, json_body},
};

const SERVICE: &str = "Spoonacular";

/// Recipe and meal-plan catalog.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn generate_meal_plan(&self, query: &MealPlanQuery) -> Result<Value, UpstreamError>;
    async fn recipe_information(&self, recipe_id: &str) -> Result<Value, UpstreamError>;
}

#[derive(Clone)]
pub struct SpoonacularClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SpoonacularClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential(SERVICE))
    }
}

/// Query string for `/mealplanner/generate`; blank diet and exclusion tags are omitted.
pub fn meal_plan_params(query: &MealPlanQuery, api_key: &str) -> Vec<(String, String)> {
    let mut params = vec![
        ("apiKey".to_string(), api_key.to_string()),
        (
            "timeFrame".to_string(),
            query
                .time_frame
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "day".into()),
        ),
        (
            "targetCalories".to_string(),
            query.target_calories.unwrap_or(2000.0).to_string(),
        ),
        ("number".to_string(), query.number.unwrap_or(3).to_string()),
    ];
    if let Some(diet) = query.diet.as_deref().filter(|d| !d.trim().is_empty()) {
        params.push(("diet".into(), diet.to_string()));
    }
    if let Some(exclude) = query.exclude.as_deref().filter(|e| !e.trim().is_empty()) {
        params.push(("exclude".into(), exclude.to_string()));
    }
    if let Some(nutrients) = &query.nutrients {
        for (key, value) in nutrients {
            params.push((format!("nutrients[{key}]"), value.to_string()));
        }
    }
    params
}

#[async_trait]
impl RecipeApi for SpoonacularClient {
    async fn generate_meal_plan(&self, query: &MealPlanQuery) -> Result<Value, UpstreamError> {
        let params = meal_plan_params(query, self.api_key()?);
        let url = endpoint(&self.base_url, "mealplanner/generate");
        debug!(%url, "requesting meal plan");
        let response = self.http.get(&url).query(&params).send().await?;
        json_body(SERVICE, response).await
    }

    async fn recipe_information(&self, recipe_id: &str) -> Result<Value, UpstreamError> {
        let api_key = self.api_key()?;
        let url = endpoint(
            &self.base_url,
            &format!("recipes/{}/information", urlencoding::encode(recipe_id)),
        );
        debug!(%url, "requesting recipe information");
        let response = self
            .http
            .get(&url)
            .query(&[("apiKey", api_key), ("includeNutrition", "true")])
            .send()
            .await?;
        json_body(SERVICE, response).await
    }
}
