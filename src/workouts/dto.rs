use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Muscle groups a user can pick for a single-muscle plan.
pub const MUSCLE_GROUPS: [&str; 16] = [
    "abdominals",
    "abductors",
    "adductors",
    "biceps",
    "calves",
    "chest",
    "forearms",
    "glutes",
    "hamstrings",
    "lats",
    "lower_back",
    "middle_back",
    "neck",
    "quadriceps",
    "traps",
    "triceps",
];

/// Exercise record as returned by the catalog. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExercise {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub muscle: Option<String>,
    pub target: Option<String>,
    pub equipment: Option<String>,
    pub difficulty: Option<String>,
    /// Either a single text or a list of steps.
    pub instructions: Option<Value>,
}

// Catalog ids are usually strings like "0001" but occasionally plain numbers.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// Unique within the list it belongs to.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub muscle: String,
    pub equipment: String,
    pub difficulty: String,
    pub instructions: String,
    pub image: String,
    /// Catalog id, kept for image lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Scheduled rest day.
    Rest,
    /// Every lookup for the day succeeded.
    Ready,
    /// Some lookups failed; the workouts are what could be fetched.
    Partial,
    /// Every lookup failed; the day is empty and should be regenerated.
    NeedsRetry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWorkout {
    pub day: String,
    pub focus: String,
    pub muscles: Vec<String>,
    pub workouts: Vec<Workout>,
    pub status: DayStatus,
    pub failed_muscles: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    #[default]
    Week,
    Muscle,
}

/// Form values submitted to `POST /api/plans/workouts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkoutPreferences {
    pub name: String,
    pub age: String,
    pub weight: String,
    pub fitness_goal: String,
    pub workout_type: WorkoutType,
    pub muscle: Option<String>,
}

impl WorkoutPreferences {
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("age", &self.age),
            ("weight", &self.weight),
            ("fitnessGoal", &self.fitness_goal),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("{field} is required"));
        }
        if self.workout_type == WorkoutType::Muscle && self.selected_muscle().is_none() {
            return Err("muscle is required for a muscle workout".into());
        }
        Ok(())
    }

    pub fn selected_muscle(&self) -> Option<&str> {
        self.muscle.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutPlan {
    Week { days: Vec<DayWorkout> },
    Muscle { workouts: Vec<Workout> },
}

#[derive(Debug, Deserialize)]
pub struct ImageParams {
    #[serde(rename = "exerciseId")]
    pub exercise_id: Option<String>,
    pub resolution: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_exercise_accepts_numeric_id_and_step_list() {
        let raw: RawExercise = serde_json::from_value(json!({
            "id": 42,
            "name": "push up",
            "target": "pectorals",
            "instructions": ["Lower", "Push"]
        }))
        .unwrap();
        assert_eq!(raw.id.as_deref(), Some("42"));
        assert_eq!(raw.target.as_deref(), Some("pectorals"));
        assert!(raw.instructions.unwrap().is_array());
    }

    #[test]
    fn muscle_type_requires_muscle() {
        let mut prefs = WorkoutPreferences {
            name: "Kim".into(),
            age: "28".into(),
            weight: "70".into(),
            fitness_goal: "Muscle Gain".into(),
            workout_type: WorkoutType::Muscle,
            muscle: Some(" ".into()),
        };
        assert!(prefs.validate().is_err());
        prefs.muscle = Some("biceps".into());
        assert!(prefs.validate().is_ok());
        prefs.workout_type = WorkoutType::Week;
        prefs.muscle = None;
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn plan_is_tagged_by_type() {
        let plan = WorkoutPlan::Muscle { workouts: vec![] };
        assert_eq!(
            serde_json::to_value(plan).unwrap(),
            json!({"type": "muscle", "workouts": []})
        );
    }

    #[test]
    fn day_status_is_snake_case() {
        assert_eq!(
            serde_json::to_value(DayStatus::NeedsRetry).unwrap(),
            json!("needs_retry")
        );
    }
}
