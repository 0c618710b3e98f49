use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::UploadSection;
use crate::form::CourseForm;
use crate::media::{MediaFile, PreviewedMedia};
use crate::notify::{Navigator, Notifier, Severity};
use crate::registry::StagedAsset;
use crate::validation::{FormTab, SubmissionIntent, ValidationReport};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid upload endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("upload request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected endpoint response: {0}")]
    InvalidResponse(String),
}

pub type UploadResult<T> = Result<T, UploadError>;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a {0} submission is already in flight")]
    InFlight(SubmissionIntent),
    #[error("course failed {intent} validation with {} issue(s)", .report.len())]
    Invalid {
        intent: SubmissionIntent,
        report: ValidationReport,
        focus: FormTab,
    },
    #[error("could not encode course payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type SubmitResult<T> = Result<T, SubmitError>;

/// One part of the multipart submission, kept inspectable so the payload
/// can be checked before it is turned into a request body.
#[derive(Clone)]
pub enum PayloadPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Arc<Vec<u8>>,
    },
}

impl fmt::Debug for PayloadPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadPart::Text { name, value } => f
                .debug_struct("Text")
                .field("name", name)
                .field("value", value)
                .finish(),
            PayloadPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("content_type", content_type)
                .field("size_bytes", &bytes.len())
                .finish(),
        }
    }
}

/// Ordered multipart body for a course submission.
#[derive(Debug, Clone, Default)]
pub struct CoursePayload {
    parts: Vec<PayloadPart>,
}

impl CoursePayload {
    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            PayloadPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn file_name_of(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            PayloadPart::File {
                name: n, file_name, ..
            } if n == name => Some(file_name.as_str()),
            _ => None,
        })
    }

    pub fn into_form(self) -> UploadResult<Form> {
        let mut form = Form::new();
        for part in self.parts {
            match part {
                PayloadPart::Text { name, value } => {
                    form = form.text(name, value);
                }
                PayloadPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let part = Part::bytes(bytes.as_ref().clone())
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    form = form.part(name, part);
                }
            }
        }
        Ok(form)
    }

    fn push_text(&mut self, name: &str, value: impl Into<String>) {
        self.parts.push(PayloadPart::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    fn push_file(&mut self, name: String, file: &MediaFile) {
        self.parts.push(PayloadPart::File {
            name,
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
            bytes: Arc::clone(&file.payload),
        });
    }
}

/// Assembles the multipart body in wire order: course fields first, then
/// the cover thumbnail, then one group of indexed parts per staged video.
pub fn build_course_payload(
    intent: SubmissionIntent,
    assets: &[StagedAsset],
    form: &CourseForm,
    cover: Option<&PreviewedMedia>,
) -> Result<CoursePayload, serde_json::Error> {
    let mut payload = CoursePayload::default();

    payload.push_text("title", form.title.trim());
    payload.push_text(
        "category",
        form.category.map(|c| c.as_str()).unwrap_or_default(),
    );
    payload.push_text("level", form.level.map(|l| l.as_str()).unwrap_or_default());
    payload.push_text(
        "price",
        form.price.map(|p| p.to_string()).unwrap_or_default(),
    );
    payload.push_text(
        "duration_weeks",
        form.duration_weeks.map(|w| w.to_string()).unwrap_or_default(),
    );
    payload.push_text(
        "weekly_hours",
        form.weekly_hours.map(|h| h.to_string()).unwrap_or_default(),
    );
    payload.push_text("description", form.description.trim());
    payload.push_text("language", form.language.as_str());
    payload.push_text("access", form.access.as_str());
    payload.push_text("objectives", form.objectives.trim());
    payload.push_text("requirements", form.requirements.trim());
    payload.push_text("schedule", form.schedule.trim());
    payload.push_text("tags", serde_json::to_string(form.tags.tags())?);

    let total_duration: u64 = assets.iter().map(|asset| asset.duration_secs()).sum();
    payload.push_text("total_duration", total_duration.to_string());
    payload.push_text("status", intent.status_value());

    if let Some(cover) = cover {
        payload.push_file("thumbnail".into(), &cover.file);
    }

    for (index, asset) in assets.iter().enumerate() {
        payload.push_file(format!("videos[{index}]"), asset.file());
        payload.push_text(&format!("video_titles[{index}]"), asset.title());
        payload.push_text(&format!("video_descriptions[{index}]"), asset.description());
        payload.push_text(
            &format!("video_durations[{index}]"),
            asset.duration_secs().to_string(),
        );
        if let Some(thumbnail) = asset.thumbnail() {
            payload.push_file(format!("video_thumbnails[{index}]"), &thumbnail.file);
        }
    }

    Ok(payload)
}

/// Endpoint acknowledgement. Anything other than `status: "success"` is a
/// rejection even when the transport itself succeeded.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadReceipt {
    pub fn accepted(&self) -> bool {
        self.status == "success"
    }
}

#[async_trait]
pub trait UploadEndpoint: Send + Sync {
    async fn submit(&self, payload: CoursePayload) -> UploadResult<UploadReceipt>;
}

/// Talks to the course service over HTTPS multipart.
#[derive(Debug, Clone)]
pub struct HttpUploadEndpoint {
    client: Client,
    endpoint: Url,
}

impl HttpUploadEndpoint {
    pub fn new(endpoint: &str, timeout: Duration) -> UploadResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| UploadError::InvalidEndpoint(format!("{endpoint}: {err}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(section: &UploadSection) -> UploadResult<Self> {
        Self::new(
            &section.endpoint,
            Duration::from_secs(section.request_timeout_seconds),
        )
    }
}

#[async_trait]
impl UploadEndpoint for HttpUploadEndpoint {
    async fn submit(&self, payload: CoursePayload) -> UploadResult<UploadReceipt> {
        let form = payload.into_form()?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::InvalidResponse(format!(
                "endpoint returned http {status}"
            )));
        }
        response
            .json::<UploadReceipt>()
            .await
            .map_err(|err| UploadError::InvalidResponse(err.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting(SubmissionIntent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted { message: String },
    Failed { reason: String },
}

/// Drives a submission through the endpoint while holding the single
/// in-flight slot. Failures land back in `Idle` with nothing discarded,
/// so the same payload source can be retried.
pub struct SubmissionCoordinator {
    state: Mutex<SubmitState>,
    endpoint: Arc<dyn UploadEndpoint>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl SubmissionCoordinator {
    pub fn new(
        endpoint: Arc<dyn UploadEndpoint>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            state: Mutex::new(SubmitState::Idle),
            endpoint,
            notifier,
            navigator,
        }
    }

    pub fn state(&self) -> SubmitState {
        *self.state.lock().unwrap()
    }

    pub async fn submit(
        &self,
        intent: SubmissionIntent,
        payload: CoursePayload,
    ) -> SubmitResult<SubmitOutcome> {
        {
            let mut state = self.state.lock().unwrap();
            if let SubmitState::Submitting(active) = *state {
                return Err(SubmitError::InFlight(active));
            }
            *state = SubmitState::Submitting(intent);
        }

        info!(
            intent = %intent,
            parts = payload.parts().len(),
            "submitting course"
        );
        let result = self.endpoint.submit(payload).await;
        *self.state.lock().unwrap() = SubmitState::Idle;

        match result {
            Ok(receipt) if receipt.accepted() => {
                let message = receipt
                    .message
                    .unwrap_or_else(|| default_success_message(intent).to_string());
                self.notifier.notify(Severity::Success, &message);
                self.navigator.leave_authoring();
                Ok(SubmitOutcome::Accepted { message })
            }
            Ok(receipt) => {
                let reason = match receipt.message {
                    Some(message) => message,
                    None => format!("upload rejected with status {}", receipt.status),
                };
                warn!(intent = %intent, reason = %reason, "course submission rejected");
                self.notifier.notify(Severity::Error, &reason);
                Ok(SubmitOutcome::Failed { reason })
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(intent = %intent, error = %reason, "course submission failed");
                self.notifier.notify(Severity::Error, &reason);
                Ok(SubmitOutcome::Failed { reason })
            }
        }
    }
}

impl fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("state", &self.state)
            .finish()
    }
}

fn default_success_message(intent: SubmissionIntent) -> &'static str {
    match intent {
        SubmissionIntent::Draft => "course saved as draft",
        SubmissionIntent::Publish => "course published",
    }
}
