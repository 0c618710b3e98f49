use std::sync::Arc;

use thiserror::Error;

use crate::media::{MediaFile, PreviewResolver, PreviewedMedia};
use crate::registry::{AssetId, DetailUpdate, StagedAsset};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetailError {
    #[error("video title is required")]
    EmptyTitle,
    #[error("video description is required")]
    EmptyDescription,
    #[error("thumbnail must be an image file")]
    InvalidThumbnail,
}

pub type DetailResult<T> = std::result::Result<T, DetailError>;

/// Focused editor for one staged asset's title, description and thumbnail.
///
/// Edits live on local copies and reach the registry only through the
/// update produced by [`DetailEditor::save`]. Dropping the editor discards
/// the edits and revokes any thumbnail that was staged but never saved.
pub struct DetailEditor {
    asset_id: AssetId,
    title: String,
    description: String,
    staged_thumbnail: Option<PreviewedMedia>,
    resolver: Arc<dyn PreviewResolver>,
}

impl DetailEditor {
    pub fn open(asset: &StagedAsset, resolver: Arc<dyn PreviewResolver>) -> Self {
        Self {
            asset_id: asset.id(),
            title: asset.title().to_string(),
            description: asset.description().to_string(),
            staged_thumbnail: None,
            resolver,
        }
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn staged_thumbnail(&self) -> Option<&PreviewedMedia> {
        self.staged_thumbnail.as_ref()
    }

    /// Stages a thumbnail for this asset, replacing (and thereby revoking)
    /// any previously staged one.
    pub fn attach_thumbnail(&mut self, file: MediaFile) -> DetailResult<()> {
        if !file.is_image() {
            return Err(DetailError::InvalidThumbnail);
        }
        self.staged_thumbnail = Some(PreviewedMedia::stage(&self.resolver, file));
        Ok(())
    }

    /// Validates the edits and turns them into a registry patch. The staged
    /// thumbnail moves into the patch, so applying it hands ownership to
    /// the asset.
    pub fn save(&mut self) -> DetailResult<DetailUpdate> {
        if self.title.trim().is_empty() {
            return Err(DetailError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(DetailError::EmptyDescription);
        }
        Ok(DetailUpdate {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            thumbnail: self.staged_thumbnail.take(),
        })
    }
}
