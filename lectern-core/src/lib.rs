pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod media;
pub mod notify;
pub mod probe;
pub mod registry;
pub mod session;
pub mod submission;
pub mod tags;
pub mod testing;
pub mod validation;

pub use config::{
    load_authoring_config, AuthoringConfig, CourseSection, IntakeSection, TagsSection,
    UploadSection,
};
pub use editor::{DetailEditor, DetailError, DetailResult};
pub use error::{ConfigError, Result};
pub use form::{AccessWindow, CourseCategory, CourseForm, SkillLevel};
pub use media::{InMemoryPreviewStore, MediaFile, PreviewRef, PreviewResolver, PreviewedMedia};
pub use notify::{LogNavigator, LogNotifier, Navigator, Notifier, Severity};
pub use probe::{DurationProbe, FfprobeDurationProbe};
pub use registry::{
    AssetId, AssetRegistry, DetailUpdate, IntakeReport, RejectReason, RejectedFile, StagedAsset,
};
pub use session::{AuthoringSession, AuthoringSessionBuilder, SessionError, SessionResult};
pub use submission::{
    build_course_payload, CoursePayload, HttpUploadEndpoint, PayloadPart, SubmissionCoordinator,
    SubmitError, SubmitOutcome, SubmitResult, SubmitState, UploadEndpoint, UploadError,
    UploadReceipt, UploadResult,
};
pub use tags::{TagEditor, TagError, TagResult};
pub use validation::{
    validate_course, CourseRules, FormTab, SubmissionIntent, ValidationReport,
};
