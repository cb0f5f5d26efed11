use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One of the three fixed meal categories every plan populates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// Output order of a plan.
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        }
    }

    pub fn index(self) -> usize {
        match self {
            MealSlot::Breakfast => 0,
            MealSlot::Lunch => 1,
            MealSlot::Dinner => 2,
        }
    }
}

/// A normalized meal as returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    #[serde(rename = "type")]
    pub slot: MealSlot,
    pub name: String,
    pub image: String,
    pub protein: u32,
    pub carbs: u32,
    pub calories: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
}

/// Body of `POST /api/meal-plan`, forwarded to the recipe service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanQuery {
    pub target_calories: Option<f64>,
    pub time_frame: Option<String>,
    pub diet: Option<String>,
    pub exclude: Option<String>,
    pub number: Option<u32>,
    pub nutrients: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeInfoParams {
    pub id: Option<String>,
}

/// Form values submitted to `POST /api/plans/meals`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub weight: String,
    pub fitness_goal: String,
    pub dietary_preferences: Vec<String>,
    pub allergies: Vec<String>,
}

impl UserPreferences {
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("age", &self.age),
            ("gender", &self.gender),
            ("weight", &self.weight),
            ("fitnessGoal", &self.fitness_goal),
        ];
        match required.iter().find(|(_, v)| v.trim().is_empty()) {
            Some((field, _)) => Err(format!("{field} is required")),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    pub meals: Vec<Meal>,
}

// --- recipe service payloads ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratedPlan {
    pub meals: Vec<PlannedMeal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannedMeal {
    pub id: u64,
    pub title: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeInfo {
    pub title: Option<String>,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub summary: Option<String>,
    pub nutrition: Option<Nutrition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    pub nutrients: Vec<Nutrient>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_serializes_slot_as_type() {
        let meal = Meal {
            id: "meal-1".into(),
            slot: MealSlot::Lunch,
            name: "Soup".into(),
            image: "/img.png".into(),
            protein: 10,
            carbs: 20,
            calories: 300,
            description: None,
            preparation_time: Some("15min".into()),
            serving_size: None,
        };
        let json = serde_json::to_value(&meal).unwrap();
        assert_eq!(json["type"], "lunch");
        assert_eq!(json["preparationTime"], "15min");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn preferences_report_first_missing_field() {
        let prefs = UserPreferences {
            name: "Ana".into(),
            age: "31".into(),
            gender: "  ".into(),
            weight: "60".into(),
            fitness_goal: "Weight Loss".into(),
            ..Default::default()
        };
        assert_eq!(prefs.validate().unwrap_err(), "gender is required");
    }

    #[test]
    fn recipe_payloads_tolerate_missing_fields() {
        let plan: GeneratedPlan =
            serde_json::from_str(r#"{"meals":[{"id":7,"title":"Oats"}],"nutrients":{}}"#).unwrap();
        assert_eq!(plan.meals.len(), 1);
        assert_eq!(plan.meals[0].servings, None);

        let info: RecipeInfo = serde_json::from_str(
            r#"{"title":"Oats","nutrition":{"nutrients":[{"name":"Protein","amount":12.6,"unit":"g"}]}}"#,
        )
        .unwrap();
        assert_eq!(info.nutrition.unwrap().nutrients[0].name, "Protein");
    }
}
