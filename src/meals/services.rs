use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    client::RecipeApi,
    dto::{GeneratedPlan, Meal, MealPlanQuery, MealSlot, Nutrient, PlannedMeal, RecipeInfo, UserPreferences},
};

pub const FALLBACK_MEAL_IMAGE: &str = "/images/vegan-food.svg";
const DESCRIPTION_MAX_CHARS: usize = 200;

// --- preference mapping ---

/// Daily calorie target from a fixed-height BMR estimate, moderate activity and the goal.
pub fn target_calories(goal: &str, weight_kg: f64, age: f64, gender: &str) -> u32 {
    let bmr = if gender.eq_ignore_ascii_case("male") {
        10.0 * weight_kg + 6.25 * 175.0 - 5.0 * age + 5.0
    } else {
        10.0 * weight_kg + 6.25 * 165.0 - 5.0 * age - 161.0
    };
    let tdee = bmr * 1.55;
    let adjusted = match goal.to_lowercase().as_str() {
        "weight loss" | "lose-weight" => tdee * 0.85,
        "muscle gain" | "gain-muscle" => tdee * 1.15,
        _ => tdee,
    };
    adjusted.max(0.0).round() as u32
}

pub fn diet_tag(dietary_preferences: &[String]) -> Option<&'static str> {
    const ORDER: [(&str, &str); 5] = [
        ("Vegan", "vegan"),
        ("Vegetarian", "vegetarian"),
        ("Keto", "ketogenic"),
        ("Paleo", "paleo"),
        ("Mediterranean", "mediterranean"),
    ];
    ORDER
        .iter()
        .find(|(label, _)| dietary_preferences.iter().any(|p| p == label))
        .map(|(_, tag)| *tag)
}

pub fn exclusion_tag(allergies: &[String]) -> String {
    lazy_static! {
        static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    }
    allergies
        .iter()
        .map(|allergy| match allergy.as_str() {
            "Peanut Allergy" => "peanuts".to_string(),
            "Lactose Intolerance" => "dairy".to_string(),
            "Gluten Allergy" => "gluten".to_string(),
            "Shellfish Allergy" => "shellfish".to_string(),
            "Egg Allergy" => "eggs".to_string(),
            "Soy Allergy" => "soy".to_string(),
            "Tree Nut Allergy" => "tree-nuts".to_string(),
            "Fish Allergy" => "fish".to_string(),
            "Sesame Allergy" => "sesame".to_string(),
            "Sulfite Sensitivity" => "sulfites".to_string(),
            other => WHITESPACE.replace_all(&other.to_lowercase(), "-").into_owned(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Number at the start of a form value, so `"85kg"` reads as 85.
fn leading_number(value: &str) -> Option<f64> {
    lazy_static! {
        static ref NUMBER: Regex = Regex::new(r"^[+-]?(\d+(\.\d+)?|\.\d+)").unwrap();
    }
    NUMBER
        .find(value.trim_start())
        .and_then(|m| m.as_str().parse().ok())
}

pub fn plan_query(prefs: &UserPreferences) -> MealPlanQuery {
    let age = leading_number(&prefs.age).unwrap_or(30.0).trunc();
    let weight = leading_number(&prefs.weight).unwrap_or(70.0);
    MealPlanQuery {
        target_calories: Some(f64::from(target_calories(&prefs.fitness_goal, weight, age, &prefs.gender))),
        time_frame: Some("day".into()),
        diet: diet_tag(&prefs.dietary_preferences).map(str::to_string),
        exclude: Some(exclusion_tag(&prefs.allergies)),
        number: Some(3),
        nutrients: None,
    }
}

// --- normalization ---

/// Removes markup and truncates to the description limit.
pub fn plain_description(summary: &str) -> String {
    lazy_static! {
        static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    }
    TAG.replace_all(summary, "")
        .chars()
        .take(DESCRIPTION_MAX_CHARS)
        .collect()
}

/// Rounded amount of the nutrient with exactly this name, or zero.
pub fn nutrient_amount(nutrients: &[Nutrient], name: &str) -> u32 {
    nutrients
        .iter()
        .find(|n| n.name == name)
        .map_or(0, |n| n.amount.max(0.0).round() as u32)
}

pub fn normalize_meal(planned: &PlannedMeal, info: Option<&RecipeInfo>, slot: MealSlot) -> Meal {
    let nutrients = info
        .and_then(|i| i.nutrition.as_ref())
        .map(|n| n.nutrients.as_slice())
        .unwrap_or_default();

    let name = planned
        .title
        .clone()
        .or_else(|| info.and_then(|i| i.title.clone()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Meal".into());
    let image = info
        .and_then(|i| i.image.clone())
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| FALLBACK_MEAL_IMAGE.into());
    let minutes = planned
        .ready_in_minutes
        .filter(|m| *m > 0)
        .or_else(|| info.and_then(|i| i.ready_in_minutes))
        .unwrap_or(0);
    let servings = planned
        .servings
        .filter(|s| *s > 0)
        .or_else(|| info.and_then(|i| i.servings).filter(|s| *s > 0))
        .unwrap_or(1);
    let description = info
        .and_then(|i| i.summary.as_deref())
        .map(plain_description)
        .filter(|d| !d.is_empty());

    Meal {
        id: format!("meal-{}", planned.id),
        slot,
        name,
        image,
        protein: nutrient_amount(nutrients, "Protein"),
        carbs: nutrient_amount(nutrients, "Carbohydrates"),
        calories: nutrient_amount(nutrients, "Calories"),
        description,
        preparation_time: Some(format!("{minutes}min")),
        serving_size: Some(format!(
            "{servings} {}",
            if servings == 1 { "serving" } else { "servings" }
        )),
    }
}

// --- slot assignment ---

pub fn placeholder_meal(slot: MealSlot) -> Meal {
    Meal {
        id: format!("meal-{}-{}", slot.as_str(), Uuid::new_v4()),
        slot,
        name: format!("{} Meal", slot.title()),
        image: FALLBACK_MEAL_IMAGE.into(),
        protein: 0,
        carbs: 0,
        calories: 0,
        description: None,
        preparation_time: None,
        serving_size: None,
    }
}

/// Maps any number of meals onto breakfast, lunch and dinner.
///
/// Meal `i` lands in slot `i % 3`; later meals replace earlier ones. Empty
/// slots get a zero-valued placeholder. Always returns three meals in slot order.
pub fn assign_slots(meals: Vec<Meal>) -> Vec<Meal> {
    let mut slots: [Option<Meal>; 3] = [None, None, None];
    for (index, mut meal) in meals.into_iter().enumerate() {
        let slot = MealSlot::ALL[index % MealSlot::ALL.len()];
        meal.slot = slot;
        slots[slot.index()] = Some(meal);
    }
    MealSlot::ALL
        .iter()
        .zip(slots)
        .map(|(slot, meal)| meal.unwrap_or_else(|| placeholder_meal(*slot)))
        .collect()
}

/// Complete plan returned when the plan itself could not be fetched.
pub fn error_meal_plan(message: &str) -> Vec<Meal> {
    MealSlot::ALL
        .iter()
        .enumerate()
        .map(|(index, slot)| Meal {
            id: (index + 1).to_string(),
            slot: *slot,
            name: "Error loading meal plan".into(),
            image: FALLBACK_MEAL_IMAGE.into(),
            protein: 0,
            carbs: 0,
            calories: 0,
            description: (index == 0).then(|| {
                format!("Error: {message}. Please check the API configuration or try again.")
            }),
            preparation_time: None,
            serving_size: None,
        })
        .collect()
}

// --- generation ---

/// Builds a three-slot plan for the given preferences. Never fails: upstream
/// problems degrade to placeholders.
#[instrument(skip(api, prefs), fields(goal = %prefs.fitness_goal))]
pub async fn generate_meal_plan(api: &dyn RecipeApi, prefs: &UserPreferences) -> Vec<Meal> {
    let query = plan_query(prefs);
    let plan = match api.generate_meal_plan(&query).await {
        Ok(raw) => match serde_json::from_value::<GeneratedPlan>(raw) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "meal plan payload not understood");
                return error_meal_plan(&e.to_string());
            }
        },
        Err(e) => {
            warn!(error = %e, "meal plan generation failed");
            return error_meal_plan(&e.to_string());
        }
    };
    info!(count = plan.meals.len(), "meal plan received");

    let mut meals = Vec::with_capacity(plan.meals.len());
    for (index, planned) in plan.meals.iter().enumerate() {
        let info = match api.recipe_information(&planned.id.to_string()).await {
            Ok(raw) => serde_json::from_value::<RecipeInfo>(raw)
                .map_err(|e| warn!(recipe_id = planned.id, error = %e, "recipe info not understood"))
                .ok(),
            Err(e) => {
                warn!(recipe_id = planned.id, error = %e, "recipe info lookup failed");
                None
            }
        };
        let slot = MealSlot::ALL[index % MealSlot::ALL.len()];
        meals.push(normalize_meal(planned, info.as_ref(), slot));
    }

    assign_slots(meals)
}
