use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Authoring limits and endpoint settings, loaded from one TOML file.
///
/// Every section falls back to the product defaults, so a partial (or empty)
/// file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthoringConfig {
    pub intake: IntakeSection,
    pub tags: TagsSection,
    pub course: CourseSection,
    pub upload: UploadSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeSection {
    pub max_videos: usize,
    pub max_video_size_mb: u64,
}

impl Default for IntakeSection {
    fn default() -> Self {
        Self {
            max_videos: 20,
            max_video_size_mb: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TagsSection {
    pub max_count: usize,
    pub max_length: usize,
}

impl Default for TagsSection {
    fn default() -> Self {
        Self {
            max_count: 10,
            max_length: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CourseSection {
    pub title_min_chars: usize,
    pub title_max_chars: usize,
    pub description_min_chars: usize,
    pub description_max_chars: usize,
    pub price_max: f64,
    pub duration_weeks_min: u32,
    pub duration_weeks_max: u32,
    pub weekly_hours_min: u32,
    pub weekly_hours_max: u32,
}

impl Default for CourseSection {
    fn default() -> Self {
        Self {
            title_min_chars: 3,
            title_max_chars: 255,
            description_min_chars: 20,
            description_max_chars: 5000,
            price_max: 999_999_999.0,
            duration_weeks_min: 1,
            duration_weeks_max: 52,
            weekly_hours_min: 1,
            weekly_hours_max: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSection {
    pub endpoint: String,
    pub request_timeout_seconds: u64,
}

impl Default for UploadSection {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            request_timeout_seconds: 120,
        }
    }
}

pub fn load_authoring_config<P: AsRef<Path>>(path: P) -> Result<AuthoringConfig> {
    load_toml(path)
}

fn load_toml<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}
