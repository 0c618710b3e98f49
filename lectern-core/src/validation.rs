use std::collections::BTreeMap;
use std::fmt;

use crate::config::CourseSection;
use crate::form::CourseForm;
use crate::registry::StagedAsset;

/// Which contract a submission is held to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionIntent {
    Draft,
    Publish,
}

impl SubmissionIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionIntent::Draft => "draft",
            SubmissionIntent::Publish => "publish",
        }
    }

    /// Value of the `status` field on the wire.
    pub fn status_value(&self) -> &'static str {
        match self {
            SubmissionIntent::Draft => "draft",
            SubmissionIntent::Publish => "published",
        }
    }
}

impl fmt::Display for SubmissionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTab {
    BasicInfo,
    AdvancedInfo,
}

impl FormTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormTab::BasicInfo => "basic_info",
            FormTab::AdvancedInfo => "advanced_info",
        }
    }
}

impl fmt::Display for FormTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Fixed evaluation order for routing attention to the first offending
// field. Basic-info fields come first, so they win over extended details.
const FIELD_ORDER: &[(&str, FormTab)] = &[
    ("title", FormTab::BasicInfo),
    ("category", FormTab::BasicInfo),
    ("level", FormTab::BasicInfo),
    ("price", FormTab::BasicInfo),
    ("duration_weeks", FormTab::BasicInfo),
    ("weekly_hours", FormTab::BasicInfo),
    ("description", FormTab::BasicInfo),
    ("videos", FormTab::BasicInfo),
    ("thumbnail", FormTab::AdvancedInfo),
    ("objectives", FormTab::AdvancedInfo),
    ("requirements", FormTab::AdvancedInfo),
    ("schedule", FormTab::AdvancedInfo),
    ("tags", FormTab::AdvancedInfo),
];

/// Field-keyed validation errors. Empty means the course satisfies the
/// requested intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Tab holding the first offending field, with basic info taking
    /// precedence. `None` when the report is clean.
    pub fn focus_tab(&self) -> Option<FormTab> {
        if self.errors.is_empty() {
            return None;
        }
        FIELD_ORDER
            .iter()
            .find(|(field, _)| self.errors.contains_key(*field))
            .map(|(_, tab)| *tab)
            .or(Some(FormTab::BasicInfo))
    }

    /// Messages joined in field order, for the aggregate error toast.
    pub fn summary(&self) -> String {
        FIELD_ORDER
            .iter()
            .filter_map(|(field, _)| self.errors.get(*field).map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }
}

/// Rule bounds derived from configuration.
#[derive(Debug, Clone)]
pub struct CourseRules {
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

impl CourseRules {
    pub fn from_config(section: &CourseSection) -> Self {
        Self {
            title_min_chars: section.title_min_chars,
            title_max_chars: section.title_max_chars,
            description_min_chars: section.description_min_chars,
            description_max_chars: section.description_max_chars,
            price_max: section.price_max,
            duration_weeks_min: section.duration_weeks_min,
            duration_weeks_max: section.duration_weeks_max,
            weekly_hours_min: section.weekly_hours_min,
            weekly_hours_max: section.weekly_hours_max,
        }
    }
}

impl Default for CourseRules {
    fn default() -> Self {
        Self::from_config(&CourseSection::default())
    }
}

/// Checks the staged course against the rule set selected by `intent`.
///
/// Draft asks only for a title, at least one video, and consistency of
/// whatever optional values were supplied. Publish additionally requires
/// the full set of details, per-video completeness, a cover thumbnail and
/// at least one tag.
pub fn validate_course(
    intent: SubmissionIntent,
    assets: &[StagedAsset],
    form: &CourseForm,
    cover_present: bool,
    rules: &CourseRules,
) -> ValidationReport {
    let publish = intent == SubmissionIntent::Publish;
    let mut report = ValidationReport::default();

    if assets.is_empty() {
        report.insert("videos", "please add at least one video");
    } else if publish {
        if let Some(message) = incomplete_videos_message(assets) {
            report.insert("videos", message);
        }
    }

    let title = form.title.trim();
    if title.is_empty() {
        report.insert("title", "course title is required");
    } else if publish {
        let length = title.chars().count();
        if length < rules.title_min_chars || length > rules.title_max_chars {
            report.insert(
                "title",
                format!(
                    "course title must be between {} and {} characters",
                    rules.title_min_chars, rules.title_max_chars
                ),
            );
        }
    }

    if let Some(price) = form.price {
        if price < 0.0 {
            report.insert("price", "price cannot be negative");
        } else if publish && price > rules.price_max {
            report.insert(
                "price",
                format!("price cannot exceed {}", rules.price_max),
            );
        }
    }

    match form.duration_weeks {
        Some(weeks)
            if weeks < rules.duration_weeks_min || weeks > rules.duration_weeks_max =>
        {
            report.insert(
                "duration_weeks",
                format!(
                    "course duration must be between {} and {} weeks",
                    rules.duration_weeks_min, rules.duration_weeks_max
                ),
            );
        }
        None if publish => {
            report.insert("duration_weeks", "course duration is required");
        }
        _ => {}
    }

    match form.weekly_hours {
        Some(hours)
            if hours < rules.weekly_hours_min || hours > rules.weekly_hours_max =>
        {
            report.insert(
                "weekly_hours",
                format!(
                    "weekly hours must be between {} and {}",
                    rules.weekly_hours_min, rules.weekly_hours_max
                ),
            );
        }
        None if publish => {
            report.insert("weekly_hours", "weekly hours are required");
        }
        _ => {}
    }

    let description = form.description.trim();
    let description_len = description.chars().count();
    if description_len > rules.description_max_chars {
        report.insert(
            "description",
            format!(
                "description cannot exceed {} characters",
                rules.description_max_chars
            ),
        );
    } else if publish {
        if description.is_empty() {
            report.insert("description", "course description is required");
        } else if description_len < rules.description_min_chars {
            report.insert(
                "description",
                format!(
                    "description must be at least {} characters",
                    rules.description_min_chars
                ),
            );
        }
    }

    if publish {
        if form.category.is_none() {
            report.insert("category", "please select a category");
        }
        if form.level.is_none() {
            report.insert("level", "please select a skill level");
        }
        if form.objectives.trim().is_empty() {
            report.insert("objectives", "please describe what students will learn");
        }
        if form.requirements.trim().is_empty() {
            report.insert("requirements", "course requirements are required");
        }
        if form.schedule.trim().is_empty() {
            report.insert("schedule", "a learning schedule is required");
        }
        if !cover_present {
            report.insert("thumbnail", "course thumbnail is required");
        }
        if form.tags.is_empty() {
            report.insert("tags", "please add at least one tag");
        }
    }

    report
}

// Per-video completeness collapses into one error naming the first violated
// category (title, then description, then thumbnail) and how many videos it
// affects.
fn incomplete_videos_message(assets: &[StagedAsset]) -> Option<String> {
    let missing_titles = assets
        .iter()
        .filter(|asset| asset.title().trim().is_empty())
        .count();
    if missing_titles > 0 {
        return Some(format!("{missing_titles} video(s) are missing a title"));
    }
    let missing_descriptions = assets
        .iter()
        .filter(|asset| asset.description().trim().is_empty())
        .count();
    if missing_descriptions > 0 {
        return Some(format!(
            "{missing_descriptions} video(s) are missing a description"
        ));
    }
    let missing_thumbnails = assets
        .iter()
        .filter(|asset| asset.thumbnail().is_none())
        .count();
    if missing_thumbnails > 0 {
        return Some(format!(
            "{missing_thumbnails} video(s) are missing a thumbnail"
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::IntakeSection;
    use crate::editor::DetailEditor;
    use crate::form::{CourseCategory, SkillLevel};
    use crate::media::PreviewResolver;
    use crate::registry::{AssetRegistry, DetailUpdate};
    use crate::tags::TagEditor;
    use crate::testing::{sample_image, sample_video, CountingPreviews, RecordingNotifier, StubProbe};

    fn empty_form() -> CourseForm {
        CourseForm::new(TagEditor::new(10, 50))
    }

    fn filled_form() -> CourseForm {
        let mut form = empty_form();
        form.title = "Practical Asynchronous Rust".into();
        form.category = Some(CourseCategory::Development);
        form.level = Some(SkillLevel::Intermediate);
        form.price = Some(49.99);
        form.duration_weeks = Some(8);
        form.weekly_hours = Some(5);
        form.description = "A hands-on walk through async runtimes, channels and testing.".into();
        form.objectives = "Write and test async services".into();
        form.requirements = "Basic Rust knowledge".into();
        form.schedule = "Two lessons per week".into();
        form.tags.push_str("rust async ").unwrap();
        form
    }

    fn staged_assets(count: usize, complete: bool) -> AssetRegistry {
        let previews = Arc::new(CountingPreviews::new());
        let resolver: Arc<dyn PreviewResolver> = previews.clone();
        let mut registry = AssetRegistry::new(
            IntakeSection::default(),
            previews,
            Arc::new(StubProbe::fixed(60)),
            Arc::new(RecordingNotifier::new()),
        );
        let files = (0..count)
            .map(|index| sample_video(&format!("lesson-{index}.mp4")))
            .collect();
        let report = registry.add_files(files);
        if complete {
            for (index, id) in report.added.iter().enumerate() {
                let mut editor = DetailEditor::open(registry.get(*id).unwrap(), resolver.clone());
                editor.set_title(format!("Lesson {index}"));
                editor.set_description(format!("Covers part {index}"));
                editor
                    .attach_thumbnail(sample_image(&format!("thumb-{index}.png")))
                    .unwrap();
                let update = editor.save().unwrap();
                registry.update_details(*id, update);
            }
        }
        registry
    }

    #[tokio::test]
    async fn draft_passes_with_title_and_one_video() {
        let registry = staged_assets(1, false);
        let mut form = empty_form();
        form.title = "Untitled draft".into();
        let report = validate_course(
            SubmissionIntent::Draft,
            registry.assets(),
            &form,
            false,
            &CourseRules::default(),
        );
        assert!(report.is_valid(), "unexpected errors: {report:?}");
    }

    #[tokio::test]
    async fn draft_still_checks_supplied_values() {
        let registry = staged_assets(1, false);
        let mut form = empty_form();
        form.title = "Untitled draft".into();
        form.price = Some(-1.0);
        form.duration_weeks = Some(53);
        form.weekly_hours = Some(41);
        let report = validate_course(
            SubmissionIntent::Draft,
            registry.assets(),
            &form,
            false,
            &CourseRules::default(),
        );
        assert_eq!(report.message("price"), Some("price cannot be negative"));
        assert!(report.message("duration_weeks").is_some());
        assert!(report.message("weekly_hours").is_some());
        // absence is fine for a draft
        assert!(report.message("category").is_none());
        assert!(report.message("tags").is_none());
    }

    #[tokio::test]
    async fn publish_requires_the_full_form() {
        let registry = staged_assets(1, true);
        let mut form = empty_form();
        form.title = "ok".into();
        let report = validate_course(
            SubmissionIntent::Publish,
            registry.assets(),
            &form,
            false,
            &CourseRules::default(),
        );
        for field in [
            "title",
            "category",
            "level",
            "duration_weeks",
            "weekly_hours",
            "description",
            "objectives",
            "requirements",
            "schedule",
            "thumbnail",
            "tags",
        ] {
            assert!(report.message(field).is_some(), "expected error for {field}");
        }
    }

    #[tokio::test]
    async fn publish_bounds_sit_exactly_on_the_limits() {
        let registry = staged_assets(1, true);
        let rules = CourseRules::default();

        let mut form = filled_form();
        form.title = "abc".into();
        form.description = "d".repeat(20);
        form.duration_weeks = Some(52);
        form.weekly_hours = Some(40);
        let report =
            validate_course(SubmissionIntent::Publish, registry.assets(), &form, true, &rules);
        assert!(report.is_valid(), "unexpected errors: {report:?}");

        let mut form = filled_form();
        form.title = "ab".into();
        form.description = "d".repeat(19);
        form.price = Some(1_000_000_000.0);
        let report =
            validate_course(SubmissionIntent::Publish, registry.assets(), &form, true, &rules);
        assert!(report.message("title").is_some());
        assert!(report.message("description").is_some());
        assert!(report.message("price").is_some());
    }

    #[tokio::test]
    async fn video_errors_report_first_category_with_count() {
        let mut registry = staged_assets(3, false);
        let ids: Vec<_> = registry.assets().iter().map(|a| a.id()).collect();
        // two missing titles, all three missing descriptions and thumbnails
        registry.update_details(
            ids[0],
            DetailUpdate {
                title: Some("Only titled lesson".into()),
                ..DetailUpdate::default()
            },
        );
        let form = filled_form();
        let report = validate_course(
            SubmissionIntent::Publish,
            registry.assets(),
            &form,
            true,
            &CourseRules::default(),
        );
        assert_eq!(
            report.message("videos"),
            Some("2 video(s) are missing a title")
        );

        for id in &ids {
            registry.update_details(
                *id,
                DetailUpdate {
                    title: Some("t".into()),
                    description: Some("d".into()),
                    ..DetailUpdate::default()
                },
            );
        }
        let report = validate_course(
            SubmissionIntent::Publish,
            registry.assets(),
            &form,
            true,
            &CourseRules::default(),
        );
        assert_eq!(
            report.message("videos"),
            Some("3 video(s) are missing a thumbnail")
        );
    }

    #[tokio::test]
    async fn focus_routes_to_the_first_offending_tab() {
        let registry = staged_assets(1, true);
        let rules = CourseRules::default();

        let mut form = filled_form();
        form.objectives = String::new();
        let report =
            validate_course(SubmissionIntent::Publish, registry.assets(), &form, true, &rules);
        assert_eq!(report.focus_tab(), Some(FormTab::AdvancedInfo));

        form.title = String::new();
        let report =
            validate_course(SubmissionIntent::Publish, registry.assets(), &form, true, &rules);
        assert_eq!(report.focus_tab(), Some(FormTab::BasicInfo));

        let clean = ValidationReport::default();
        assert_eq!(clean.focus_tab(), None);
    }

    #[tokio::test]
    async fn summary_lists_messages_in_field_order() {
        let registry = staged_assets(0, false);
        let form = empty_form();
        let report = validate_course(
            SubmissionIntent::Draft,
            registry.assets(),
            &form,
            false,
            &CourseRules::default(),
        );
        let summary = report.summary();
        let title_at = summary.find("course title").unwrap();
        let videos_at = summary.find("at least one video").unwrap();
        assert!(title_at < videos_at);
    }
}
