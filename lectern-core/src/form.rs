use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tags::TagEditor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseCategory {
    Development,
    Business,
    Finance,
    Design,
    Marketing,
    Music,
    Photography,
    Health,
    Lifestyle,
    Teaching,
}

impl CourseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseCategory::Development => "development",
            CourseCategory::Business => "business",
            CourseCategory::Finance => "finance",
            CourseCategory::Design => "design",
            CourseCategory::Marketing => "marketing",
            CourseCategory::Music => "music",
            CourseCategory::Photography => "photography",
            CourseCategory::Health => "health",
            CourseCategory::Lifestyle => "lifestyle",
            CourseCategory::Teaching => "teaching",
        }
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(CourseCategory::Development),
            "business" => Ok(CourseCategory::Business),
            "finance" => Ok(CourseCategory::Finance),
            "design" => Ok(CourseCategory::Design),
            "marketing" => Ok(CourseCategory::Marketing),
            "music" => Ok(CourseCategory::Music),
            "photography" => Ok(CourseCategory::Photography),
            "health" => Ok(CourseCategory::Health),
            "lifestyle" => Ok(CourseCategory::Lifestyle),
            "teaching" => Ok(CourseCategory::Teaching),
            other => Err(format!("unknown course category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    AllLevels,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
            SkillLevel::AllLevels => "all_levels",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            "all_levels" => Ok(SkillLevel::AllLevels),
            other => Err(format!("unknown skill level: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessWindow {
    #[default]
    Lifetime,
    OneYear,
    SixMonths,
    ThreeMonths,
}

impl AccessWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessWindow::Lifetime => "lifetime",
            AccessWindow::OneYear => "one_year",
            AccessWindow::SixMonths => "six_months",
            AccessWindow::ThreeMonths => "three_months",
        }
    }
}

impl fmt::Display for AccessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lifetime" => Ok(AccessWindow::Lifetime),
            "one_year" => Ok(AccessWindow::OneYear),
            "six_months" => Ok(AccessWindow::SixMonths),
            "three_months" => Ok(AccessWindow::ThreeMonths),
            other => Err(format!("unknown access window: {other}")),
        }
    }
}

/// Everything the author fills in outside the media registry.
#[derive(Debug, Clone)]
pub struct CourseForm {
    pub title: String,
    pub category: Option<CourseCategory>,
    pub level: Option<SkillLevel>,
    pub price: Option<f64>,
    pub duration_weeks: Option<u32>,
    pub weekly_hours: Option<u32>,
    pub description: String,
    pub language: String,
    pub access: AccessWindow,
    pub objectives: String,
    pub requirements: String,
    pub schedule: String,
    pub tags: TagEditor,
}

impl CourseForm {
    pub fn new(tags: TagEditor) -> Self {
        Self {
            title: String::new(),
            category: None,
            level: None,
            price: None,
            duration_weeks: None,
            weekly_hours: None,
            description: String::new(),
            language: "en".to_string(),
            access: AccessWindow::default(),
            objectives: String::new(),
            requirements: String::new(),
            schedule: String::new(),
            tags,
        }
    }
}
