use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Kind of media an asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// A retrievable media file curated for a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMediaAsset")]
pub struct MediaAsset {
    pub id: String,
    pub kind: MediaKind,
    pub source_path: PathBuf,
    pub relevance_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hint: Option<f64>,
}

impl MediaAsset {
    pub fn image(
        id: impl Into<String>,
        source_path: impl Into<PathBuf>,
        relevance_score: f64,
    ) -> Result<Self, RecordError> {
        Self::new(id, MediaKind::Image, source_path, relevance_score, None)
    }

    pub fn video(
        id: impl Into<String>,
        source_path: impl Into<PathBuf>,
        relevance_score: f64,
        duration_hint: Option<f64>,
    ) -> Result<Self, RecordError> {
        Self::new(id, MediaKind::Video, source_path, relevance_score, duration_hint)
    }

    pub fn new(
        id: impl Into<String>,
        kind: MediaKind,
        source_path: impl Into<PathBuf>,
        relevance_score: f64,
        duration_hint: Option<f64>,
    ) -> Result<Self, RecordError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RecordError::EmptyAssetId);
        }
        if !(0.0..=100.0).contains(&relevance_score) {
            return Err(RecordError::RelevanceOutOfRange {
                id,
                score: relevance_score,
            });
        }
        if let Some(hint) = duration_hint {
            if kind == MediaKind::Image {
                return Err(RecordError::DurationHintOnImage { id });
            }
            if !hint.is_finite() || hint <= 0.0 {
                return Err(RecordError::InvalidDurationHint { id, hint });
            }
        }

        Ok(Self {
            id,
            kind,
            source_path: source_path.into(),
            relevance_score,
            duration_hint,
        })
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

#[derive(Deserialize)]
struct RawMediaAsset {
    id: String,
    kind: MediaKind,
    source_path: PathBuf,
    relevance_score: f64,
    #[serde(default)]
    duration_hint: Option<f64>,
}

impl TryFrom<RawMediaAsset> for MediaAsset {
    type Error = RecordError;

    fn try_from(raw: RawMediaAsset) -> Result<Self, Self::Error> {
        MediaAsset::new(
            raw.id,
            raw.kind,
            raw.source_path,
            raw.relevance_score,
            raw.duration_hint,
        )
    }
}

/// Assets curated for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSceneMediaMapping")]
pub struct SceneMediaMapping {
    pub scene_number: u32,
    pub assets: Vec<MediaAsset>,
    /// How many candidates the search stage found, before curation
    pub total_assets_available: usize,
}

impl SceneMediaMapping {
    pub fn new(scene_number: u32, assets: Vec<MediaAsset>) -> Self {
        let total_assets_available = assets.len();
        Self {
            scene_number,
            assets,
            total_assets_available,
        }
    }

    pub fn videos(&self) -> Vec<&MediaAsset> {
        self.assets.iter().filter(|a| a.kind == MediaKind::Video).collect()
    }

    pub fn images(&self) -> Vec<&MediaAsset> {
        self.assets.iter().filter(|a| a.kind == MediaKind::Image).collect()
    }
}

#[derive(Deserialize)]
struct RawSceneMediaMapping {
    scene_number: u32,
    assets: Vec<MediaAsset>,
    #[serde(default)]
    total_assets_available: Option<usize>,
}

impl From<RawSceneMediaMapping> for SceneMediaMapping {
    fn from(raw: RawSceneMediaMapping) -> Self {
        let mut mapping = SceneMediaMapping::new(raw.scene_number, raw.assets);
        if let Some(total) = raw.total_assets_available {
            mapping.total_assets_available = total;
        }
        mapping
    }
}

/// Per-scene media produced by the media-search stage, keyed by scene number
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaInventory {
    mappings: BTreeMap<u32, SceneMediaMapping>,
}

impl MediaInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory keyed by each mapping's own scene number
    pub fn from_mappings(mappings: impl IntoIterator<Item = SceneMediaMapping>) -> Self {
        let mut inventory = Self::new();
        for mapping in mappings {
            inventory.insert(mapping);
        }
        inventory
    }

    pub fn insert(&mut self, mapping: SceneMediaMapping) -> Option<SceneMediaMapping> {
        self.mappings.insert(mapping.scene_number, mapping)
    }

    pub fn get(&self, scene_number: u32) -> Option<&SceneMediaMapping> {
        self.mappings.get(&scene_number)
    }

    /// Mappings in ascending key order, paired with the key they are stored under
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SceneMediaMapping)> {
        self.mappings.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Find an asset anywhere in the inventory
    pub fn asset(&self, id: &str) -> Option<&MediaAsset> {
        self.mappings
            .values()
            .flat_map(|m| m.assets.iter())
            .find(|a| a.id == id)
    }
}
