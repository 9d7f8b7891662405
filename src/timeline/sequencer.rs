use crate::assets::{MediaAsset, MediaKind, SceneMediaMapping};
use crate::audio::TimingMark;
use crate::config::{PacingConfig, SegmentRange};
use crate::error::InternalInvariantError;
use crate::random::RandomSource;
use crate::script::ScenePurpose;
use crate::timeline::{KenBurnsPreset, SceneInterval, TransitionSelector, VisualSegment, VisualTreatment};
use serde::{Deserialize, Serialize};

/// Remainders shorter than this are folded into the previous segment
const MIN_REMAINDER: f64 = 1e-9;

/// Pacing phase of a segment within its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Hook,
    Main,
    Conclusion,
}

/// What the sequencer needs to know about the scene beyond its media
#[derive(Debug, Clone, PartialEq)]
pub struct SceneContext {
    pub scene_number: u32,
    pub purpose: ScenePurpose,
    pub total_scenes: usize,
    /// Narration marks near this scene, absolute timestamps
    pub marks: Vec<TimingMark>,
}

impl SceneContext {
    pub fn new(scene_number: u32, purpose: ScenePurpose, total_scenes: usize) -> Self {
        Self {
            scene_number,
            purpose,
            total_scenes,
            marks: Vec::new(),
        }
    }

    pub fn with_marks(mut self, marks: Vec<TimingMark>) -> Self {
        self.marks = marks;
        self
    }

    /// Whether this scene closes the whole timeline
    pub fn is_final(&self) -> bool {
        self.scene_number as usize == self.total_scenes
    }
}

/// Offsets of one planned segment relative to the scene start
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    start: f64,
    end: f64,
    phase: Phase,
}

/// Expands a scene's assets into paced visual segments.
pub struct SegmentSequencer {
    pacing: PacingConfig,
    transitions: TransitionSelector,
}

impl SegmentSequencer {
    pub fn new(pacing: PacingConfig, transitions: TransitionSelector) -> Self {
        Self { pacing, transitions }
    }

    pub fn sequence(
        &self,
        context: &SceneContext,
        mapping: &SceneMediaMapping,
        interval: SceneInterval,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<VisualSegment>, InternalInvariantError> {
        let slots = self.plan_slots(context.scene_number, interval.duration, rng)?;
        let videos = mapping.videos();
        let images = mapping.images();

        let last = slots.len().saturating_sub(1);
        let mut videos_used = 0;
        let mut images_used = 0;
        let mut segments = Vec::with_capacity(slots.len());

        for (index, slot) in slots.iter().enumerate() {
            let kind = asset_kind(
                index,
                slot.phase,
                !videos.is_empty(),
                !images.is_empty(),
                self.pacing.video_every_nth,
            )
            .ok_or(InternalInvariantError::NoAssets {
                scene: context.scene_number,
                segment: index,
            })?;

            let (asset, visual_treatment) = match kind {
                MediaKind::Video => {
                    let asset = round_robin(&videos, videos_used);
                    videos_used += 1;
                    (asset, footage_treatment(slot.phase))
                }
                MediaKind::Image => {
                    let asset = round_robin(&images, images_used);
                    images_used += 1;
                    let closes_timeline = context.is_final() && index == last;
                    (asset, ken_burns_treatment(index, closes_timeline))
                }
            };
            let asset = asset.ok_or(InternalInvariantError::NoAssets {
                scene: context.scene_number,
                segment: index,
            })?;

            let start_time = interval.start + slot.start;
            let transition_in = if index == 0 {
                self.transitions.entry(
                    context.purpose,
                    context.scene_number,
                    &context.marks,
                    start_time,
                )
            } else {
                self.transitions
                    .between_segments(context.purpose, &context.marks, start_time)
            };

            segments.push(VisualSegment {
                index,
                start_time,
                duration: slot.end - slot.start,
                phase: slot.phase,
                asset: asset.clone(),
                visual_treatment,
                transition_in,
            });
        }

        tracing::debug!(
            scene = context.scene_number,
            segments = segments.len(),
            videos_used,
            images_used,
            "sequenced scene"
        );

        Ok(segments)
    }

    /// Phase boundaries are relative to the scene duration: hook is the first
    /// `min(hook_max, hook_fraction * d)` seconds, main runs to
    /// `main_end_fraction * d`, conclusion takes the rest.
    pub fn phase_bounds(&self, duration: f64) -> [(Phase, f64, f64); 3] {
        let hook_end = (self.pacing.hook_fraction * duration)
            .min(self.pacing.hook_max_seconds)
            .clamp(0.0, duration);
        let main_end = (self.pacing.main_end_fraction * duration).clamp(hook_end, duration);
        [
            (Phase::Hook, 0.0, hook_end),
            (Phase::Main, hook_end, main_end),
            (Phase::Conclusion, main_end, duration),
        ]
    }

    fn range_for(&self, phase: Phase) -> SegmentRange {
        match phase {
            Phase::Hook => self.pacing.hook_range,
            Phase::Main => self.pacing.main_range,
            Phase::Conclusion => self.pacing.conclusion_range,
        }
    }

    fn plan_slots(
        &self,
        scene: u32,
        duration: f64,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<Slot>, InternalInvariantError> {
        let mut slots = Vec::new();

        for (phase, start, end) in self.phase_bounds(duration) {
            let range = self.range_for(phase);
            if !(range.min > 0.0 && range.min <= range.max && range.max.is_finite()) {
                return Err(InternalInvariantError::UnusableRange {
                    scene,
                    min: range.min,
                    max: range.max,
                });
            }

            let mut cursor = start;
            while end - cursor > MIN_REMAINDER {
                let draw = rng.uniform(range);
                if !draw.is_finite() {
                    return Err(InternalInvariantError::InvalidDraw { scene, draw });
                }
                // Out-of-range draws are pulled back into the range
                let draw = draw.max(range.min).min(range.max);
                let next = if cursor + draw >= end - MIN_REMAINDER {
                    end
                } else {
                    cursor + draw
                };
                slots.push(Slot {
                    start: cursor,
                    end: next,
                    phase,
                });
                cursor = next;
            }
        }

        // Scenes shorter than the remainder threshold still need one segment
        if slots.is_empty() {
            slots.push(Slot {
                start: 0.0,
                end: duration,
                phase: Phase::Hook,
            });
        }

        // Pin the tail so durations sum to the scene length exactly
        if let Some(tail) = slots.last_mut() {
            tail.end = duration;
        }

        Ok(slots)
    }
}

/// Video when there is footage and the slot is every nth or outside the main
/// phase; otherwise images, falling back to whichever kind exists.
pub fn asset_kind(
    index: usize,
    phase: Phase,
    has_video: bool,
    has_image: bool,
    video_every_nth: usize,
) -> Option<MediaKind> {
    let prefers_video = index % video_every_nth.max(1) == 0 || phase != Phase::Main;
    match (has_video, has_image) {
        (true, _) if prefers_video => Some(MediaKind::Video),
        (_, true) => Some(MediaKind::Image),
        (true, false) => Some(MediaKind::Video),
        (false, false) => None,
    }
}

/// The `ordinal`-th pick from `assets`, wrapping around
pub fn round_robin<'a>(assets: &[&'a MediaAsset], ordinal: usize) -> Option<&'a MediaAsset> {
    if assets.is_empty() {
        return None;
    }
    Some(assets[ordinal % assets.len()])
}

fn footage_treatment(phase: Phase) -> VisualTreatment {
    VisualTreatment::Footage {
        scale_to_fill: true,
        crop_to_frame: true,
        fade_in: phase == Phase::Hook,
    }
}

fn ken_burns_treatment(index: usize, closes_timeline: bool) -> VisualTreatment {
    VisualTreatment::KenBurns {
        preset: KenBurnsPreset::for_segment(index),
        fade_in: index == 0,
        fade_out: closes_timeline,
    }
}
