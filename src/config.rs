use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub spoonacular_api_key: Option<String>,
    pub spoonacular_base_url: String,
    pub exercisedb_api_key: Option<String>,
    pub exercisedb_base_url: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Minimum gap between exercise image lookups.
    pub image_min_interval_ms: u64,
    /// Minimum gap between catalog lookups while assembling a week.
    pub catalog_request_delay_ms: u64,
    pub exercises_per_muscle: usize,
}

impl PacingConfig {
    pub fn image_min_interval(&self) -> Duration {
        Duration::from_millis(self.image_min_interval_ms)
    }

    pub fn catalog_request_delay(&self) -> Duration {
        Duration::from_millis(self.catalog_request_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub pacing: PacingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let upstream = UpstreamConfig {
            spoonacular_api_key: secret("SPOONACULAR_API_KEY"),
            spoonacular_base_url: std::env::var("SPOONACULAR_BASE_URL")
                .unwrap_or_else(|_| "https://api.spoonacular.com".into()),
            exercisedb_api_key: secret("EXERCISESDB_API_KEY"),
            exercisedb_base_url: std::env::var("EXERCISESDB_BASE_URL")
                .unwrap_or_else(|_| "https://exercisedb.p.rapidapi.com".into()),
            elevenlabs_api_key: secret("ELEVENLABS_API_KEY"),
            elevenlabs_base_url: std::env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".into()),
            timeout_secs: parsed_or("UPSTREAM_TIMEOUT_SECS", 30),
        };
        let pacing = PacingConfig {
            image_min_interval_ms: parsed_or("IMAGE_MIN_INTERVAL_MS", 200),
            catalog_request_delay_ms: parsed_or("CATALOG_REQUEST_DELAY_MS", 500),
            exercises_per_muscle: parsed_or("EXERCISES_PER_MUSCLE", 3),
        };
        Ok(Self { upstream, pacing })
    }
}

// Blank values count as unset.
fn secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
