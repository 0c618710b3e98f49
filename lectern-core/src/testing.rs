//! Recording doubles and fixtures shared by the unit and integration tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::media::{MediaFile, PreviewResolver};
use crate::notify::{Navigator, Notifier, Severity};
use crate::probe::DurationProbe;
use crate::submission::{CoursePayload, UploadEndpoint, UploadReceipt, UploadResult};

/// Captures every notification in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Severity, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

/// Counts how often the authoring surface was left.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    departures: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn departures(&self) -> usize {
        self.departures.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn leave_authoring(&self) {
        self.departures.fetch_add(1, Ordering::SeqCst);
    }
}

/// Resolver that tracks the mint/revoke balance instead of holding blobs.
/// A revoke for a locator that is not live counts as a double revocation.
#[derive(Debug, Default)]
pub struct CountingPreviews {
    minted: AtomicUsize,
    revoked: AtomicUsize,
    double_revocations: AtomicUsize,
    live: Mutex<HashSet<String>>,
}

impl CountingPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minted(&self) -> usize {
        self.minted.load(Ordering::SeqCst)
    }

    pub fn revoked(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }

    pub fn double_revocations(&self) -> usize {
        self.double_revocations.load(Ordering::SeqCst)
    }

    pub fn is_live(&self, locator: &str) -> bool {
        self.live.lock().unwrap().contains(locator)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

impl PreviewResolver for CountingPreviews {
    fn mint(&self, file: &MediaFile) -> String {
        let index = self.minted.fetch_add(1, Ordering::SeqCst);
        let locator = format!("stub://{index}-{}", file.file_name);
        self.live.lock().unwrap().insert(locator.clone());
        locator
    }

    fn revoke(&self, locator: &str) {
        self.revoked.fetch_add(1, Ordering::SeqCst);
        if !self.live.lock().unwrap().remove(locator) {
            self.double_revocations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Probe returning canned durations, keyed by file name with a default for
/// everything else.
#[derive(Debug)]
pub struct StubProbe {
    default_secs: u64,
    by_file: Mutex<HashMap<String, u64>>,
}

impl StubProbe {
    pub fn fixed(default_secs: u64) -> Self {
        Self {
            default_secs,
            by_file: Mutex::new(HashMap::new()),
        }
    }

    pub fn set(&self, file_name: &str, duration_secs: u64) {
        self.by_file
            .lock()
            .unwrap()
            .insert(file_name.to_string(), duration_secs);
    }
}

#[async_trait]
impl DurationProbe for StubProbe {
    async fn probe(&self, file: &MediaFile) -> u64 {
        self.by_file
            .lock()
            .unwrap()
            .get(&file.file_name)
            .copied()
            .unwrap_or(self.default_secs)
    }
}

/// Two-way handshake with a parked [`StubEndpoint`] call: the test awaits
/// [`SubmitGate::entered`], does its concurrent checks, then calls
/// [`SubmitGate::release`] to let the submission finish.
#[derive(Clone, Default)]
pub struct SubmitGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl fmt::Debug for SubmitGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitGate").finish()
    }
}

impl SubmitGate {
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Endpoint double: records payloads, replays queued receipts and can park
/// calls behind a [`SubmitGate`].
#[derive(Default)]
pub struct StubEndpoint {
    responses: Mutex<VecDeque<UploadResult<UploadReceipt>>>,
    payloads: Mutex<Vec<CoursePayload>>,
    calls: AtomicUsize,
    gate: Option<SubmitGate>,
}

impl fmt::Debug for StubEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubEndpoint")
            .field("calls", &self.calls)
            .field("gated", &self.gate.is_some())
            .finish()
    }
}

impl StubEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, SubmitGate) {
        let gate = SubmitGate::default();
        let endpoint = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (endpoint, gate)
    }

    pub fn queue(&self, response: UploadResult<UploadReceipt>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn queue_receipt(&self, status: &str, message: Option<&str>) {
        self.queue(Ok(UploadReceipt {
            status: status.to_string(),
            message: message.map(str::to_string),
        }));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<CoursePayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadEndpoint for StubEndpoint {
    async fn submit(&self, payload: CoursePayload) -> UploadResult<UploadReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload);
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(UploadReceipt {
                status: "success".to_string(),
                message: None,
            }),
        }
    }
}

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A small fake mp4 picked from the host file picker.
pub fn sample_video(file_name: &str) -> MediaFile {
    let mut payload = file_name.as_bytes().to_vec();
    payload.resize(1024, 0);
    MediaFile::new(file_name, "video/mp4", payload)
}

/// A fake png that passes payload sniffing.
pub fn sample_image(file_name: &str) -> MediaFile {
    let mut payload = PNG_MAGIC.to_vec();
    payload.extend_from_slice(file_name.as_bytes());
    MediaFile::new(file_name, "image/png", payload)
}

/// A video whose declared size exceeds what it actually carries, for
/// exercising the intake size limit without allocating gigabytes.
pub fn oversized_video(file_name: &str, size_mb: u64) -> MediaFile {
    let mut file = sample_video(file_name);
    file.size_bytes = size_mb * 1024 * 1024;
    file
}
