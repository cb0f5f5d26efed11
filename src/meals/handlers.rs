use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{MealPlanQuery, MealPlanResponse, RecipeInfoParams, UserPreferences},
    services::generate_meal_plan,
};
use crate::{
    error::{status_line, ApiError, UpstreamError},
    state::AppState,
};

pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plan", post(meal_plan))
        .route("/recipe-info", get(recipe_info))
}

pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/plans/meals", post(create_meal_plan))
}

/// POST /meal-plan: forwards plan parameters to the recipe service.
#[instrument(skip(state, payload))]
pub async fn meal_plan(
    State(state): State<AppState>,
    payload: Result<Json<MealPlanQuery>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(query) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "meal plan request body not understood");
        ApiError::Internal(format!("Failed to generate meal plan: {}", rejection.body_text()))
    })?;
    match state.recipes.generate_meal_plan(&query).await {
        Ok(plan) => {
            info!("meal plan received from recipe service");
            Ok(Json(plan))
        }
        Err(e) => Err(meal_plan_error(e)),
    }
}

/// GET /recipe-info?id=
#[instrument(skip(state))]
pub async fn recipe_info(
    State(state): State<AppState>,
    Query(params): Query<RecipeInfoParams>,
) -> Result<Json<Value>, ApiError> {
    let Some(id) = params.id.filter(|id| !id.trim().is_empty()) else {
        return Err(ApiError::BadRequest("Recipe ID is required".into()));
    };

    match state.recipes.recipe_information(id.trim()).await {
        Ok(info) => Ok(Json(info)),
        Err(UpstreamError::MissingCredential(service)) => Err(not_configured(service)),
        Err(e) => match e.status() {
            Some(status) => {
                warn!(%status, recipe_id = %id, "recipe info rejected upstream");
                Err(ApiError::Upstream {
                    status,
                    message: status_line(status),
                    details: None,
                })
            }
            None => {
                error!(error = %e, recipe_id = %id, "recipe info request failed");
                Err(ApiError::Internal(format!("Failed to fetch recipe info: {e}")))
            }
        },
    }
}

/// POST /plans/meals: validated preferences in, three-slot plan out.
#[instrument(skip(state, payload))]
pub async fn create_meal_plan(
    State(state): State<AppState>,
    payload: Result<Json<UserPreferences>, JsonRejection>,
) -> Result<Json<MealPlanResponse>, ApiError> {
    let Json(prefs) = payload?;
    prefs.validate().map_err(ApiError::BadRequest)?;
    let meals = generate_meal_plan(state.recipes.as_ref(), &prefs).await;
    Ok(Json(MealPlanResponse { meals }))
}

fn not_configured(service: &str) -> ApiError {
    ApiError::NotConfigured(format!("{service} API key not configured"))
}

fn meal_plan_error(err: UpstreamError) -> ApiError {
    if let UpstreamError::MissingCredential(service) = err {
        return not_configured(service);
    }
    match (err.status(), err.body()) {
        (Some(status), Some(body)) => {
            warn!(%status, "meal plan rejected upstream");
            ApiError::Upstream {
                status,
                message: upstream_message(body).unwrap_or_else(|| status_line(status)),
                details: Some(body.to_string()),
            }
        }
        _ => {
            error!(error = %err, "meal plan request failed");
            ApiError::Internal(format!("Failed to generate meal plan: {err}"))
        }
    }
}

/// Human-readable message from an upstream error body: the JSON `message` or
/// `error` field, else the raw text.
fn upstream_message(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => ["message", "error"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str))
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        Err(_) => Some(body.to_string()).filter(|b| !b.is_empty()),
    }
}
