use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{ImageParams, WorkoutPlan, WorkoutPreferences, WorkoutType, MUSCLE_GROUPS},
    services::{assemble_week, catalog_muscle_name, muscle_workouts, DEFAULT_IMAGE_RESOLUTION},
};
use crate::{
    error::{ApiError, UpstreamError},
    state::AppState,
};

const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/exercises/muscles", get(list_muscles))
        .route("/exercises/muscle/:muscle", get(exercises_by_muscle))
        .route("/exercises/image", get(exercise_image))
}

pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/plans/workouts", post(create_workout_plan))
}

pub async fn list_muscles() -> Json<&'static [&'static str]> {
    Json(&MUSCLE_GROUPS[..])
}

/// GET /exercises/muscle/:muscle
#[instrument(skip(state))]
pub async fn exercises_by_muscle(
    State(state): State<AppState>,
    Path(muscle): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if muscle.trim().is_empty() {
        return Err(ApiError::BadRequest("Muscle parameter is required".into()));
    }
    let target = catalog_muscle_name(&muscle);

    match state.exercises.exercises_by_target(&target).await {
        Ok(exercises) => {
            info!(%target, "exercises received from catalog");
            Ok(Json(exercises))
        }
        Err(e) => Err(catalog_error(e, &target)),
    }
}

fn catalog_error(err: UpstreamError, target: &str) -> ApiError {
    if let UpstreamError::MissingCredential(service) = err {
        return ApiError::NotConfigured(format!("{service} API key not configured"));
    }
    let Some(status) = err.status() else {
        error!(error = %err, %target, "exercise request failed");
        return ApiError::Internal(format!("Failed to fetch exercises: {err}"));
    };

    warn!(%status, %target, "exercise catalog rejected request");
    let message = match status {
        StatusCode::FORBIDDEN => "API key is invalid or access is forbidden. Please check your ExercisesDB API key configuration.".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "Too many requests. Please wait a moment and try again.".to_string(),
        StatusCode::UNAUTHORIZED => "Unauthorized. Please verify your API key is correct.".to_string(),
        StatusCode::UNPROCESSABLE_ENTITY => format!(
            "Invalid muscle name: \"{target}\". The API may not recognize this muscle group."
        ),
        _ => format!(
            "ExercisesDB API error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        ),
    };
    ApiError::Upstream {
        status,
        message,
        details: err.body().map(str::to_string),
    }
}

/// GET /exercises/image?exerciseId=&resolution=
///
/// Upstream failures of any kind become a 404 so the browser falls back to
/// its placeholder image.
#[instrument(skip(state))]
pub async fn exercise_image(
    State(state): State<AppState>,
    Query(params): Query<ImageParams>,
) -> Result<Response, ApiError> {
    if state.config.upstream.exercisedb_api_key.is_none() {
        return Err(ApiError::NotConfigured("ExercisesDB API key not configured".into()));
    }
    let Some(exercise_id) = params.exercise_id.filter(|id| !id.trim().is_empty()) else {
        return Err(ApiError::BadRequest("exerciseId parameter is required".into()));
    };
    let resolution = params
        .resolution
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_RESOLUTION.to_string());

    match state.exercises.exercise_image(&exercise_id, &resolution).await {
        Ok(bytes) => Ok((
            [
                (header::CONTENT_TYPE, "image/gif"),
                (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL),
            ],
            bytes,
        )
            .into_response()),
        Err(UpstreamError::MissingCredential(service)) => Err(ApiError::NotConfigured(format!(
            "{service} API key not configured"
        ))),
        Err(e) => {
            warn!(error = %e, %exercise_id, "exercise image unavailable");
            Err(ApiError::NotFound("Image not available".into()))
        }
    }
}

/// POST /plans/workouts
#[instrument(skip(state, payload))]
pub async fn create_workout_plan(
    State(state): State<AppState>,
    payload: Result<Json<WorkoutPreferences>, JsonRejection>,
) -> Result<Json<WorkoutPlan>, ApiError> {
    let Json(prefs) = payload?;
    prefs.validate().map_err(ApiError::BadRequest)?;

    let plan = match (prefs.workout_type, prefs.selected_muscle()) {
        (WorkoutType::Muscle, Some(muscle)) => WorkoutPlan::Muscle {
            workouts: muscle_workouts(state.exercises.as_ref(), muscle).await,
        },
        _ => WorkoutPlan::Week {
            days: assemble_week(
                state.exercises.as_ref(),
                &state.catalog_pacing,
                state.config.pacing.exercises_per_muscle,
            )
            .await,
        },
    };
    Ok(Json(plan))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use bytes::Bytes;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{app::build_app, testing::FakeExercises};

    async fn send(state: AppState, req: Request<Body>) -> Response {
        build_app(state).oneshot(req).await.unwrap()
    }

    async fn call(state: AppState, req: Request<Body>) -> (StatusCode, Value) {
        let res = send(state, req).await;
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn failing(status: StatusCode) -> FakeExercises {
        FakeExercises::new(move |_| Err(UpstreamError::from_status(status, "{}".into())))
    }

    #[tokio::test]
    async fn lists_selectable_muscles() {
        let (status, body) = call(AppState::fake(), get("/api/exercises/muscles")).await;
        assert_eq!(status, StatusCode::OK);
        let muscles = body.as_array().unwrap();
        assert_eq!(muscles.len(), 16);
        assert!(muscles.contains(&json!("lower_back")));
    }

    #[tokio::test]
    async fn muscle_route_remaps_and_passes_through() {
        let api = FakeExercises::new(|_| Ok(json!([{"id": "0001", "name": "bench press"}])));
        let state = AppState::fake().with_exercises(api.clone());
        let (status, body) = call(state, get("/api/exercises/muscle/Chest")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "bench press");
        assert_eq!(api.target_calls(), vec!["pectorals".to_string()]);
    }

    #[tokio::test]
    async fn blank_muscle_is_rejected() {
        let (status, body) = call(AppState::fake(), get("/api/exercises/muscle/%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Muscle parameter is required");
    }

    #[tokio::test]
    async fn muscle_route_maps_upstream_statuses() {
        let cases = [
            (StatusCode::FORBIDDEN, "API key is invalid"),
            (StatusCode::TOO_MANY_REQUESTS, "Too many requests."),
            (StatusCode::UNAUTHORIZED, "Unauthorized."),
            (StatusCode::UNPROCESSABLE_ENTITY, "Invalid muscle name: \"quads\""),
            (StatusCode::SERVICE_UNAVAILABLE, "ExercisesDB API error: 503 Service Unavailable"),
        ];
        for (upstream, prefix) in cases {
            let state = AppState::fake().with_exercises(failing(upstream));
            let (status, body) = call(state, get("/api/exercises/muscle/quadriceps")).await;
            assert_eq!(status, upstream);
            assert!(
                body["error"].as_str().unwrap().starts_with(prefix),
                "{upstream}: {}",
                body["error"]
            );
        }
    }

    #[tokio::test]
    async fn image_is_served_as_cacheable_gif() {
        let api = FakeExercises::new(|_| Ok(json!([])))
            .with_image(|_, _| Ok(Bytes::from_static(b"GIF89a")));
        let state = AppState::fake().with_exercises(api.clone());
        let res = send(state, get("/api/exercises/image?exerciseId=0001")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/gif");
        assert_eq!(res.headers()[header::CACHE_CONTROL], IMAGE_CACHE_CONTROL);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"GIF89a");
        assert_eq!(api.image_calls(), vec![("0001".to_string(), "180".to_string())]);
    }

    #[tokio::test]
    async fn image_requires_exercise_id() {
        let (status, body) = call(AppState::fake(), get("/api/exercises/image")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "exerciseId parameter is required");
    }

    #[tokio::test]
    async fn image_upstream_failure_becomes_not_found() {
        let api = FakeExercises::new(|_| Ok(json!([]))).with_image(|_, _| {
            Err(UpstreamError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()))
        });
        let state = AppState::fake().with_exercises(api);
        let (status, body) = call(state, get("/api/exercises/image?exerciseId=1&resolution=360")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Image not available"}));
    }

    #[tokio::test]
    async fn image_without_key_is_server_error() {
        let state = AppState::fake().without_exercise_key();
        let (status, body) = call(state, get("/api/exercises/image")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "ExercisesDB API key not configured");
    }

    #[tokio::test]
    async fn muscle_plan_requires_muscle() {
        let req = Request::post("/api/plans/workouts")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"name": "Kim", "age": "28", "weight": "70", "fitnessGoal": "Strength", "workoutType": "muscle"})
                    .to_string(),
            ))
            .unwrap();
        let (status, _) = call(AppState::fake(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn muscle_plan_returns_tagged_workouts() {
        let api = FakeExercises::new(|_| Ok(json!([{"id": "9"}, {"id": "9"}])));
        let state = AppState::fake().with_exercises(api);
        let req = Request::post("/api/plans/workouts")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "name": "Kim", "age": "28", "weight": "70", "fitnessGoal": "Strength",
                    "workoutType": "muscle", "muscle": "biceps"
                })
                .to_string(),
            ))
            .unwrap();
        let (status, body) = call(state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "muscle");
        assert_eq!(body["workouts"][0]["id"], "9-0");
        assert_eq!(body["workouts"][1]["id"], "9-1");
    }

    #[tokio::test(start_paused = true)]
    async fn week_plan_has_seven_days() {
        let api = FakeExercises::new(|t| Ok(json!([{"id": t}])));
        let state = AppState::fake().with_exercises(api);
        let req = Request::post("/api/plans/workouts")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"name": "Kim", "age": "28", "weight": "70", "fitnessGoal": "Strength"}).to_string(),
            ))
            .unwrap();
        let (status, body) = call(state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "week");
        let days = body["days"].as_array().unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[6]["status"], "rest");
        assert_eq!(days[0]["status"], "ready");
    }

    #[tokio::test]
    async fn muscle_route_reports_unanswered_upstream() {
        let api = FakeExercises::new(|_| Err(UpstreamError::Decode("connection refused".into())));
        let state = AppState::fake().with_exercises(api);
        let (status, body) = call(state, get("/api/exercises/muscle/biceps")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "Failed to fetch exercises: unexpected upstream payload: connection refused"
        );
    }

    #[tokio::test]
    async fn workout_plan_reports_unreadable_body_as_json_error() {
        let req = Request::post("/api/plans/workouts")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"name": "Kim", "age": "28", "weight": "70", "fitnessGoal": "Strength", "workoutType": "full"})
                    .to_string(),
            ))
            .unwrap();
        let (status, body) = call(AppState::fake(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("full"));
    }
}
