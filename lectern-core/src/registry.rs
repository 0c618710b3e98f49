use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::config::IntakeSection;
use crate::media::{MediaFile, PreviewRef, PreviewResolver, PreviewedMedia};
use crate::notify::{Notifier, Severity};
use crate::probe::DurationProbe;

/// Stable handle for a staged asset. The handle survives reordering and
/// stays unique for the life of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(Uuid);

impl AssetId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One staged video lesson. The preview reference (and the thumbnail's, if
/// present) is owned exclusively and revoked when the asset is dropped.
#[derive(Debug)]
pub struct StagedAsset {
    id: AssetId,
    file: MediaFile,
    preview: PreviewRef,
    title: String,
    description: String,
    thumbnail: Option<PreviewedMedia>,
    duration_secs: u64,
}

impl StagedAsset {
    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn file(&self) -> &MediaFile {
        &self.file
    }

    pub fn preview(&self) -> &PreviewRef {
        &self.preview
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn thumbnail(&self) -> Option<&PreviewedMedia> {
        self.thumbnail.as_ref()
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }
}

/// Patch applied to a staged asset; only supplied fields change. A supplied
/// thumbnail replaces the previous one, which revokes its preview.
#[derive(Debug, Default)]
pub struct DetailUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<PreviewedMedia>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotVideo,
    TooLarge,
    CapacityReached,
}

#[derive(Debug)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: RejectReason,
}

/// What one intake batch did: which assets were staged and which files were
/// turned away.
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub added: Vec<AssetId>,
    pub rejected: Vec<RejectedFile>,
}

#[derive(Debug)]
struct ProbeUpdate {
    asset_id: AssetId,
    duration_secs: u64,
}

/// Ordered collection of staged video lessons.
///
/// Position 0 is the course intro shown as the free preview. Every accepted
/// file is probed once, on an independent task; results flow back over a
/// channel and are applied when the owner drains it.
pub struct AssetRegistry {
    assets: Vec<StagedAsset>,
    selected: Option<AssetId>,
    resolver: Arc<dyn PreviewResolver>,
    probe: Arc<dyn DurationProbe>,
    notifier: Arc<dyn Notifier>,
    limits: IntakeSection,
    probe_tx: UnboundedSender<ProbeUpdate>,
    probe_rx: UnboundedReceiver<ProbeUpdate>,
    probe_tasks: Vec<JoinHandle<()>>,
}

impl AssetRegistry {
    pub fn new(
        limits: IntakeSection,
        resolver: Arc<dyn PreviewResolver>,
        probe: Arc<dyn DurationProbe>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (probe_tx, probe_rx) = mpsc::unbounded_channel();
        Self {
            assets: Vec::new(),
            selected: None,
            resolver,
            probe,
            notifier,
            limits,
            probe_tx,
            probe_rx,
            probe_tasks: Vec::new(),
        }
    }

    /// Stages an intake batch. Non-video and oversized files are rejected
    /// with one notification each; files beyond the capacity limit are
    /// rejected with a single capacity notification for the whole batch.
    pub fn add_files(&mut self, files: Vec<MediaFile>) -> IntakeReport {
        let mut report = IntakeReport::default();
        let max_bytes = self.limits.max_video_size_mb * 1024 * 1024;
        let mut capacity_hit = false;

        for file in files {
            if !file.is_video() {
                self.notifier.notify(
                    Severity::Error,
                    &format!("{} is not a video file", file.file_name),
                );
                report.rejected.push(RejectedFile {
                    file_name: file.file_name,
                    reason: RejectReason::NotVideo,
                });
                continue;
            }
            if file.size_bytes > max_bytes {
                self.notifier.notify(
                    Severity::Error,
                    &format!(
                        "{} is larger than the {} MB limit",
                        file.file_name, self.limits.max_video_size_mb
                    ),
                );
                report.rejected.push(RejectedFile {
                    file_name: file.file_name,
                    reason: RejectReason::TooLarge,
                });
                continue;
            }
            if self.assets.len() >= self.limits.max_videos {
                capacity_hit = true;
                report.rejected.push(RejectedFile {
                    file_name: file.file_name,
                    reason: RejectReason::CapacityReached,
                });
                continue;
            }

            let preview = PreviewRef::mint(&self.resolver, &file);
            let asset = StagedAsset {
                id: AssetId::new(),
                file,
                preview,
                title: String::new(),
                description: String::new(),
                thumbnail: None,
                duration_secs: 0,
            };
            debug!(asset = %asset.id, file = %asset.file.file_name, "staged video asset");
            self.spawn_probe(asset.id, asset.file.clone());
            report.added.push(asset.id);
            self.assets.push(asset);
        }

        if capacity_hit {
            self.notifier.notify(
                Severity::Error,
                &format!(
                    "you can add up to {} videos per course",
                    self.limits.max_videos
                ),
            );
        }
        report
    }

    fn spawn_probe(&mut self, asset_id: AssetId, file: MediaFile) {
        let probe = Arc::clone(&self.probe);
        let tx = self.probe_tx.clone();
        let handle = tokio::spawn(async move {
            let duration_secs = probe.probe(&file).await;
            let _ = tx.send(ProbeUpdate {
                asset_id,
                duration_secs,
            });
        });
        self.probe_tasks.push(handle);
    }

    /// Drains finished probe results into the matching assets. Results for
    /// assets removed in the meantime are discarded.
    pub fn apply_probe_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.probe_rx.try_recv() {
            if let Some(asset) = self.assets.iter_mut().find(|a| a.id == update.asset_id) {
                asset.duration_secs = update.duration_secs;
                applied += 1;
            }
        }
        self.probe_tasks.retain(|task| !task.is_finished());
        applied
    }

    /// Awaits every outstanding probe task, then applies the results.
    pub async fn settle_probes(&mut self) -> usize {
        let tasks = std::mem::take(&mut self.probe_tasks);
        if !tasks.is_empty() {
            let _ = join_all(tasks).await;
        }
        self.apply_probe_updates()
    }

    pub fn pending_probes(&self) -> usize {
        self.probe_tasks
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Drops the asset, revoking its preview and thumbnail references. When
    /// the removed asset was selected, selection moves to the asset now at
    /// the old position (clamped), or clears when the registry empties.
    pub fn remove(&mut self, id: AssetId) -> bool {
        let Some(position) = self.position_of(id) else {
            return false;
        };
        self.assets.remove(position);
        debug!(asset = %id, position, "removed staged asset");
        if self.selected == Some(id) {
            self.selected = if self.assets.is_empty() {
                None
            } else {
                let fallback = position.min(self.assets.len() - 1);
                Some(self.assets[fallback].id)
            };
        }
        true
    }

    /// Moves the asset at `from` so it sits at `to`, preserving the
    /// relative order of everything else.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.assets.len() || to >= self.assets.len() {
            return false;
        }
        if from == to {
            return true;
        }
        let asset = self.assets.remove(from);
        self.assets.insert(to, asset);
        debug!(from, to, "reordered staged assets");
        true
    }

    pub fn update_details(&mut self, id: AssetId, update: DetailUpdate) -> bool {
        let Some(asset) = self.assets.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if let Some(title) = update.title {
            asset.title = title;
        }
        if let Some(description) = update.description {
            asset.description = description;
        }
        if let Some(thumbnail) = update.thumbnail {
            asset.thumbnail = Some(thumbnail);
        }
        true
    }

    pub fn select(&mut self, id: AssetId) -> bool {
        if self.position_of(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// The selected asset, defaulting to the first staged asset when no
    /// explicit selection was made.
    pub fn selected_id(&self) -> Option<AssetId> {
        self.selected
            .or_else(|| self.assets.first().map(|asset| asset.id))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_id().and_then(|id| self.position_of(id))
    }

    pub fn position_of(&self, id: AssetId) -> Option<usize> {
        self.assets.iter().position(|asset| asset.id == id)
    }

    pub fn get(&self, id: AssetId) -> Option<&StagedAsset> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    pub fn assets(&self) -> &[StagedAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.assets.iter().map(|asset| asset.duration_secs).sum()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
        self.selected = None;
    }
}

impl fmt::Debug for AssetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRegistry")
            .field("assets", &self.assets)
            .field("selected", &self.selected)
            .field("pending_probes", &self.probe_tasks.len())
            .finish()
    }
}
