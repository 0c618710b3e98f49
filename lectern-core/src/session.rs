use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AuthoringConfig;
use crate::editor::{DetailEditor, DetailError};
use crate::form::CourseForm;
use crate::media::{InMemoryPreviewStore, MediaFile, PreviewResolver, PreviewedMedia};
use crate::notify::{LogNavigator, LogNotifier, Navigator, Notifier, Severity};
use crate::probe::{DurationProbe, FfprobeDurationProbe};
use crate::registry::{AssetId, AssetRegistry, IntakeReport};
use crate::submission::{
    build_course_payload, HttpUploadEndpoint, SubmissionCoordinator, SubmitError, SubmitOutcome,
    SubmitResult, SubmitState, UploadEndpoint, UploadError,
};
use crate::tags::TagEditor;
use crate::validation::{
    validate_course, CourseRules, FormTab, SubmissionIntent, ValidationReport,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("upload endpoint not configured")]
    MissingEndpoint,
    #[error("upload endpoint rejected: {0}")]
    Upload(#[from] UploadError),
    #[error("course thumbnail must be an image file")]
    InvalidCover,
    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),
    #[error("no video details editor is open")]
    NoEditorOpen,
    #[error(transparent)]
    Detail(#[from] DetailError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Assembles an [`AuthoringSession`] from configuration plus whichever
/// collaborators the caller wants to swap out.
#[derive(Default)]
pub struct AuthoringSessionBuilder {
    config: AuthoringConfig,
    resolver: Option<Arc<dyn PreviewResolver>>,
    probe: Option<Arc<dyn DurationProbe>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    endpoint: Option<Arc<dyn UploadEndpoint>>,
}

impl AuthoringSessionBuilder {
    pub fn new(config: AuthoringConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn PreviewResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn DurationProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn with_endpoint(mut self, endpoint: Arc<dyn UploadEndpoint>) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Builds the session. The endpoint comes from the builder when one was
    /// supplied, otherwise from the configured URL; with neither, the
    /// session cannot submit and building fails.
    pub fn build(self) -> SessionResult<AuthoringSession> {
        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None if !self.config.upload.endpoint.is_empty() => {
                Arc::new(HttpUploadEndpoint::from_config(&self.config.upload)?)
            }
            None => return Err(SessionError::MissingEndpoint),
        };
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(InMemoryPreviewStore::new()));
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(FfprobeDurationProbe::new()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LogNavigator));

        let registry = AssetRegistry::new(
            self.config.intake.clone(),
            Arc::clone(&resolver),
            probe,
            Arc::clone(&notifier),
        );
        let form = CourseForm::new(TagEditor::from_section(&self.config.tags));
        let rules = CourseRules::from_config(&self.config.course);
        let coordinator =
            SubmissionCoordinator::new(endpoint, Arc::clone(&notifier), navigator);
        debug!(
            max_videos = self.config.intake.max_videos,
            "authoring session ready"
        );
        Ok(AuthoringSession {
            registry,
            form,
            cover: None,
            editor: None,
            coordinator,
            resolver,
            notifier,
            rules,
        })
    }
}

/// One course-authoring session: the staged videos, the course form, the
/// cover thumbnail and the submission machinery behind a single facade.
///
/// Staging mutators take `&mut self`; submission takes `&self` so a shared
/// session can be submitted from a task while the caller keeps its handle.
pub struct AuthoringSession {
    registry: AssetRegistry,
    form: CourseForm,
    cover: Option<PreviewedMedia>,
    editor: Option<DetailEditor>,
    coordinator: SubmissionCoordinator,
    resolver: Arc<dyn PreviewResolver>,
    notifier: Arc<dyn Notifier>,
    rules: CourseRules,
}

impl AuthoringSession {
    pub fn builder(config: AuthoringConfig) -> AuthoringSessionBuilder {
        AuthoringSessionBuilder::new(config)
    }

    pub fn add_videos(&mut self, files: Vec<MediaFile>) -> IntakeReport {
        self.registry.add_files(files)
    }

    pub fn apply_probe_updates(&mut self) -> usize {
        self.registry.apply_probe_updates()
    }

    pub async fn settle_probes(&mut self) -> usize {
        self.registry.settle_probes().await
    }

    /// Removes a staged video. An open details editor for that video is
    /// discarded first, so its staged thumbnail is released too.
    pub fn remove_video(&mut self, id: AssetId) -> bool {
        if self
            .editor
            .as_ref()
            .map_or(false, |editor| editor.asset_id() == id)
        {
            self.editor = None;
        }
        self.registry.remove(id)
    }

    pub fn reorder_videos(&mut self, from: usize, to: usize) -> bool {
        self.registry.reorder(from, to)
    }

    pub fn select_video(&mut self, id: AssetId) -> bool {
        self.registry.select(id)
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn form(&self) -> &CourseForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CourseForm {
        &mut self.form
    }

    /// Stages a new course thumbnail, replacing (and thereby releasing) any
    /// previous one.
    pub fn set_cover(&mut self, file: MediaFile) -> SessionResult<()> {
        if !file.is_image() {
            return Err(SessionError::InvalidCover);
        }
        self.cover = Some(PreviewedMedia::stage(&self.resolver, file));
        Ok(())
    }

    pub fn clear_cover(&mut self) {
        self.cover = None;
    }

    pub fn cover(&self) -> Option<&PreviewedMedia> {
        self.cover.as_ref()
    }

    /// Opens the details editor for one staged video, replacing any editor
    /// already open.
    pub fn open_video_details(&mut self, id: AssetId) -> SessionResult<&mut DetailEditor> {
        let asset = self
            .registry
            .get(id)
            .ok_or(SessionError::UnknownAsset(id))?;
        let editor = DetailEditor::open(asset, Arc::clone(&self.resolver));
        Ok(self.editor.insert(editor))
    }

    pub fn video_details(&mut self) -> Option<&mut DetailEditor> {
        self.editor.as_mut()
    }

    /// Commits the open editor back onto its asset and closes it. Editor
    /// validation failures leave the editor open with its state intact.
    pub fn save_video_details(&mut self) -> SessionResult<AssetId> {
        let editor = self.editor.as_mut().ok_or(SessionError::NoEditorOpen)?;
        let update = editor.save()?;
        let id = editor.asset_id();
        self.editor = None;
        if !self.registry.update_details(id, update) {
            return Err(SessionError::UnknownAsset(id));
        }
        Ok(id)
    }

    pub fn cancel_video_details(&mut self) {
        self.editor = None;
    }

    pub fn validate(&self, intent: SubmissionIntent) -> ValidationReport {
        validate_course(
            intent,
            self.registry.assets(),
            &self.form,
            self.cover.is_some(),
            &self.rules,
        )
    }

    /// Validates and submits the course. An invalid course never reaches the
    /// endpoint; the error carries the report and the tab to bring forward.
    /// Endpoint failures resolve to a [`SubmitOutcome::Failed`] with every
    /// piece of session state kept for a retry.
    pub async fn submit(&self, intent: SubmissionIntent) -> SubmitResult<SubmitOutcome> {
        let report = self.validate(intent);
        if !report.is_valid() {
            let focus = report.focus_tab().unwrap_or(FormTab::BasicInfo);
            warn!(intent = %intent, issues = report.len(), "course failed validation");
            self.notifier.notify(Severity::Error, &report.summary());
            return Err(SubmitError::Invalid {
                intent,
                report,
                focus,
            });
        }
        let payload = build_course_payload(
            intent,
            self.registry.assets(),
            &self.form,
            self.cover.as_ref(),
        )?;
        self.coordinator.submit(intent, payload).await
    }

    pub fn submit_state(&self) -> SubmitState {
        self.coordinator.state()
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.registry.total_duration_secs()
    }
}

impl fmt::Debug for AuthoringSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthoringSession")
            .field("registry", &self.registry)
            .field("cover_present", &self.cover.is_some())
            .field("editor_open", &self.editor.is_some())
            .field("submit_state", &self.coordinator.state())
            .finish()
    }
}
