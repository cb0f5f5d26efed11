use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{
    client::ExerciseApi,
    dto::{DayStatus, DayWorkout, RawExercise, Workout},
};
use crate::{error::UpstreamError, rate_limit::RateLimiter};

pub const DEFAULT_IMAGE_RESOLUTION: &str = "180";
const ERROR_WORKOUT_IMAGE: &str = "/images/exercises/default.jpg";

/// One entry of the fixed weekly split.
#[derive(Debug, Clone, Copy)]
pub struct DayTemplate {
    pub day: &'static str,
    pub focus: &'static str,
    pub muscles: &'static [&'static str],
}

const PUSH: &[&str] = &["chest", "traps", "triceps"];
const PULL: &[&str] = &["lats", "biceps"];
const LEGS: &[&str] = &["quadriceps", "hamstrings", "glutes"];

pub const WEEK_TEMPLATE: [DayTemplate; 7] = [
    DayTemplate { day: "Monday", focus: "Push", muscles: PUSH },
    DayTemplate { day: "Tuesday", focus: "Pull", muscles: PULL },
    DayTemplate { day: "Wednesday", focus: "Legs & Abs", muscles: LEGS },
    DayTemplate { day: "Thursday", focus: "Push", muscles: PUSH },
    DayTemplate { day: "Friday", focus: "Pull", muscles: PULL },
    DayTemplate { day: "Saturday", focus: "Legs & Abs", muscles: LEGS },
    DayTemplate { day: "Sunday", focus: "Rest", muscles: &[] },
];

/// Translates a user-facing muscle name into the catalog's vocabulary.
pub fn catalog_muscle_name(muscle: &str) -> String {
    let muscle = muscle.trim().to_lowercase();
    match muscle.as_str() {
        "lower_back" => "lower back".into(),
        "middle_back" => "middle back".into(),
        "chest" => "pectorals".into(),
        "quadriceps" => "quads".into(),
        _ => muscle,
    }
}

/// Route to the image proxy for a catalog exercise.
pub fn image_url(exercise_id: &str) -> String {
    format!(
        "/api/exercises/image?exerciseId={}&resolution={DEFAULT_IMAGE_RESOLUTION}",
        urlencoding::encode(exercise_id)
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn instructions_text(instructions: Option<&Value>) -> Option<String> {
    let text = match instructions? {
        Value::String(s) => s.clone(),
        Value::Array(steps) => steps
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    Some(text).filter(|t| !t.trim().is_empty())
}

/// Builds a workout from a catalog record, filling absent fields with defaults.
///
/// `day` is included in the id when the workout belongs to a weekly schedule,
/// since the same catalog exercise can appear on several days.
pub fn normalize_exercise(raw: &RawExercise, index: usize, day: Option<usize>) -> Workout {
    let position = match day {
        Some(day) => format!("{day}-{index}"),
        None => index.to_string(),
    };
    let exercise_id = non_empty(raw.id.as_deref()).map(str::to_string);
    let base_id = exercise_id
        .clone()
        .unwrap_or_else(|| format!("exercise-{position}"));

    Workout {
        id: format!("{base_id}-{position}"),
        name: non_empty(raw.name.as_deref()).unwrap_or("Exercise").to_string(),
        kind: non_empty(raw.kind.as_deref()).unwrap_or("strength").to_string(),
        muscle: non_empty(raw.muscle.as_deref())
            .or_else(|| non_empty(raw.target.as_deref()))
            .unwrap_or("full body")
            .to_string(),
        equipment: non_empty(raw.equipment.as_deref()).unwrap_or("body weight").to_string(),
        difficulty: non_empty(raw.difficulty.as_deref()).unwrap_or("beginner").to_string(),
        instructions: instructions_text(raw.instructions.as_ref())
            .unwrap_or_else(|| "No instructions available.".into()),
        image: exercise_id.as_deref().map(image_url).unwrap_or_default(),
        exercise_id,
    }
}

pub fn normalize_all(raws: &[RawExercise], day: Option<usize>) -> Vec<Workout> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| normalize_exercise(raw, index, day))
        .collect()
}

/// Reads a catalog response; anything but an array counts as no exercises.
pub fn parse_exercises(payload: Value) -> Vec<RawExercise> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| warn!(error = %e, "skipping unreadable exercise"))
                    .ok()
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub async fn fetch_muscle(api: &dyn ExerciseApi, muscle: &str) -> Result<Vec<RawExercise>, UpstreamError> {
    let payload = api.exercises_by_target(&catalog_muscle_name(muscle)).await?;
    Ok(parse_exercises(payload))
}

pub fn error_workout(message: &str) -> Workout {
    Workout {
        id: "error".into(),
        name: "Error loading workout plan".into(),
        kind: "strength".into(),
        muscle: "full body".into(),
        equipment: "body weight".into(),
        difficulty: "beginner".into(),
        instructions: format!("Error: {message}. Please check the API configuration or try again."),
        image: ERROR_WORKOUT_IMAGE.into(),
        exercise_id: None,
    }
}

/// Every catalog exercise for one muscle. A failed lookup yields a single
/// error placeholder.
#[instrument(skip(api))]
pub async fn muscle_workouts(api: &dyn ExerciseApi, muscle: &str) -> Vec<Workout> {
    match fetch_muscle(api, muscle).await {
        Ok(raws) => {
            info!(count = raws.len(), "exercises received");
            normalize_all(&raws, None)
        }
        Err(e) => {
            warn!(error = %e, "exercise lookup failed");
            vec![error_workout(&e.to_string())]
        }
    }
}

/// Builds the seven-day schedule from [`WEEK_TEMPLATE`].
///
/// Lookups are issued one at a time through `pacing`. Up to `per_muscle`
/// exercises are kept from each muscle. A failed lookup is logged and recorded
/// in the day's `failed_muscles`; it never aborts the day or the week.
#[instrument(skip(api, pacing))]
pub async fn assemble_week(api: &dyn ExerciseApi, pacing: &RateLimiter, per_muscle: usize) -> Vec<DayWorkout> {
    let mut week = Vec::with_capacity(WEEK_TEMPLATE.len());

    for (day_index, template) in WEEK_TEMPLATE.iter().enumerate() {
        let muscles: Vec<String> = template.muscles.iter().map(|m| m.to_string()).collect();
        if muscles.is_empty() {
            week.push(DayWorkout {
                day: template.day.into(),
                focus: template.focus.into(),
                muscles,
                workouts: Vec::new(),
                status: DayStatus::Rest,
                failed_muscles: Vec::new(),
            });
            continue;
        }

        let mut collected = Vec::new();
        let mut failed_muscles = Vec::new();
        for muscle in &muscles {
            pacing.acquire().await;
            match fetch_muscle(api, muscle).await {
                Ok(raws) => {
                    if raws.is_empty() {
                        warn!(day = template.day, %muscle, "no exercises found");
                    }
                    collected.extend(raws.into_iter().take(per_muscle));
                }
                Err(e) => {
                    warn!(day = template.day, %muscle, error = %e, "exercise lookup failed; continuing");
                    failed_muscles.push(muscle.clone());
                }
            }
        }

        let status = if failed_muscles.is_empty() {
            DayStatus::Ready
        } else if failed_muscles.len() == muscles.len() {
            DayStatus::NeedsRetry
        } else {
            DayStatus::Partial
        };
        info!(day = template.day, workouts = collected.len(), ?status, "day assembled");

        week.push(DayWorkout {
            day: template.day.into(),
            focus: template.focus.into(),
            muscles,
            workouts: normalize_all(&collected, Some(day_index)),
            status,
            failed_muscles,
        });
    }

    week
}
