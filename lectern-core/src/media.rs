use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use uuid::Uuid;

/// Raw file handle as delivered by the host's picker surface.
///
/// The payload is shared, so cloning a `MediaFile` never copies the bytes.
/// `size_bytes` is the size the picker declared; it normally matches the
/// payload but is kept separate because intake limits are checked against
/// the declared size.
#[derive(Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub payload: Arc<Vec<u8>>,
}

impl MediaFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        let payload = Arc::new(payload);
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes: payload.len() as u64,
            payload,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.payload
    }

    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }

    /// True when both the declared MIME type and the payload magic bytes
    /// identify an image.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/") && image::guess_format(&self.payload).is_ok()
    }
}

impl fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

/// Broker for the ephemeral preview locators handed to embedded players.
///
/// A minted locator stays resolvable until it is revoked; revocation frees
/// whatever the locator was backed by.
pub trait PreviewResolver: Send + Sync {
    fn mint(&self, file: &MediaFile) -> String;
    fn revoke(&self, locator: &str);
}

/// Owned preview locator that revokes itself exactly once, when dropped.
pub struct PreviewRef {
    locator: String,
    resolver: Arc<dyn PreviewResolver>,
}

impl PreviewRef {
    pub fn mint(resolver: &Arc<dyn PreviewResolver>, file: &MediaFile) -> Self {
        let locator = resolver.mint(file);
        Self {
            locator,
            resolver: Arc::clone(resolver),
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }
}

impl Drop for PreviewRef {
    fn drop(&mut self) {
        self.resolver.revoke(&self.locator);
    }
}

impl fmt::Debug for PreviewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRef")
            .field("locator", &self.locator)
            .finish()
    }
}

/// A media file paired with the preview reference minted for it.
#[derive(Debug)]
pub struct PreviewedMedia {
    pub file: MediaFile,
    pub preview: PreviewRef,
}

impl PreviewedMedia {
    pub fn stage(resolver: &Arc<dyn PreviewResolver>, file: MediaFile) -> Self {
        let preview = PreviewRef::mint(resolver, &file);
        Self { file, preview }
    }
}

/// Default resolver: an in-session blob cache keyed by `mem://` locators.
///
/// Holding payloads for unrevoked locators is what makes a leaked preview
/// cost real memory, the same way an unreleased object URL would.
#[derive(Debug, Default)]
pub struct InMemoryPreviewStore {
    blobs: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl InMemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, locator: &str) -> Option<Arc<Vec<u8>>> {
        self.blobs.lock().unwrap().get(locator).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

impl PreviewResolver for InMemoryPreviewStore {
    fn mint(&self, file: &MediaFile) -> String {
        let locator = format!("mem://{}", Uuid::new_v4().simple());
        self.blobs
            .lock()
            .unwrap()
            .insert(locator.clone(), Arc::clone(&file.payload));
        debug!(locator = %locator, file = %file.file_name, "minted preview locator");
        locator
    }

    fn revoke(&self, locator: &str) {
        if self.blobs.lock().unwrap().remove(locator).is_none() {
            warn!(locator = %locator, "revoked preview locator was not live");
        }
    }
}
