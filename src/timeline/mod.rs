pub mod assembler;
pub mod clock;
pub mod sequencer;
pub mod transition;

pub use assembler::{compile, AssemblerState, CompiledTimeline, TimelineAssembler};
pub use clock::{SceneInterval, TimelineClock};
pub use sequencer::{Phase, SceneContext, SegmentSequencer};
pub use transition::{Transition, TransitionKind, TransitionSelector};

use crate::assets::MediaAsset;
use crate::audio::TimingMark;
use crate::script::ScenePurpose;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Multi-track timeline precise enough to drive a renderer.
///
/// Produced once per compilation and never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyTimeline {
    pub total_duration: f64,
    pub scenes: Vec<SceneTimeline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTimeline {
    pub scene_number: u32,
    pub purpose: ScenePurpose,
    pub start_time: f64,
    pub end_time: f64,
    pub audio_track: AudioTrack,
    pub segments: Vec<VisualSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_out: Option<Transition>,
}

impl SceneTimeline {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// A sub-interval of a scene showing exactly one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSegment {
    pub index: usize,
    pub start_time: f64,
    pub duration: f64,
    pub phase: Phase,
    pub asset: MediaAsset,
    pub visual_treatment: VisualTreatment,
    pub transition_in: Transition,
}

impl VisualSegment {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Narration slice played under a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Offset into the narration file where this scene begins
    pub offset: f64,
    pub duration: f64,
    pub timing: AudioTiming,
    #[serde(default)]
    pub marks: Vec<TimingMark>,
}

/// Where a scene's timing came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioTiming {
    Narration,
    Estimated,
}

/// How a segment's asset is framed and animated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisualTreatment {
    Footage {
        scale_to_fill: bool,
        crop_to_frame: bool,
        fade_in: bool,
    },
    KenBurns {
        preset: KenBurnsPreset,
        fade_in: bool,
        fade_out: bool,
    },
}

/// Canned pan/zoom motions for still images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KenBurnsPreset {
    ZoomIn,
    ZoomOut,
    PanLeft,
    PanRight,
}

impl KenBurnsPreset {
    pub const CYCLE: [KenBurnsPreset; 4] = [
        KenBurnsPreset::ZoomIn,
        KenBurnsPreset::ZoomOut,
        KenBurnsPreset::PanLeft,
        KenBurnsPreset::PanRight,
    ];

    pub fn for_segment(index: usize) -> Self {
        Self::CYCLE[index % Self::CYCLE.len()]
    }
}

impl AssemblyTimeline {
    /// Get the scene playing at time `t`
    pub fn scene_at(&self, t: f64) -> Option<&SceneTimeline> {
        self.scenes
            .iter()
            .find(|s| t >= s.start_time && t < s.end_time)
    }

    /// Get the segment on screen at time `t`
    pub fn segment_at(&self, t: f64) -> Option<&VisualSegment> {
        self.scene_at(t)?
            .segments
            .iter()
            .find(|seg| t >= seg.start_time && t < seg.end_time())
    }

    /// All segments in playback order
    pub fn segments(&self) -> impl Iterator<Item = &VisualSegment> {
        self.scenes.iter().flat_map(|s| s.segments.iter())
    }

    pub fn segment_count(&self) -> usize {
        self.scenes.iter().map(|s| s.segments.len()).sum()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Hex SHA-256 of the canonical JSON encoding
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&bytes);
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Get a summary of the timeline structure
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Duration: {:.2}s\n", self.total_duration));
        summary.push_str(&format!(
            "Scenes: {} ({} segments)\n",
            self.scenes.len(),
            self.segment_count()
        ));

        for scene in &self.scenes {
            summary.push_str(&format!(
                "  Scene {} [{}]: {:.2}s-{:.2}s, {} segments, entry {}",
                scene.scene_number,
                scene.purpose,
                scene.start_time,
                scene.end_time,
                scene.segments.len(),
                scene
                    .segments
                    .first()
                    .map(|s| s.transition_in.kind.as_str())
                    .unwrap_or("none"),
            ));
            if let Some(out) = &scene.transition_out {
                summary.push_str(&format!(", exit {}", out.kind));
            }
            summary.push('\n');
        }

        summary
    }
}
