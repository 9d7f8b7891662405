use crate::assets::MediaInventory;
use crate::audio::AudioTimingRecord;
use crate::error::{ConsistencyWarning, StructuralError};
use crate::script::ScenePlan;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Slack allowed when comparing breakpoint edges
const EDGE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    pub errors: Vec<StructuralError>,
    pub warnings: Vec<ConsistencyWarning>,
}

impl ValidationResult {
    pub fn from_findings(errors: Vec<StructuralError>, warnings: Vec<ConsistencyWarning>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Scene numbers named by any error, deduplicated
    pub fn failing_scenes(&self) -> Vec<u32> {
        let scenes: BTreeSet<u32> = self.errors.iter().filter_map(|e| e.scene()).collect();
        scenes.into_iter().collect()
    }
}

/// Cross-checks the three input records against each other.
///
/// Every check runs regardless of earlier failures so callers can fix all
/// problems in one pass.
pub struct ContextValidator {
    duration_tolerance: f64,
}

impl Default for ContextValidator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ContextValidator {
    pub fn new(duration_tolerance: f64) -> Self {
        Self { duration_tolerance }
    }

    pub fn validate(
        &self,
        plan: &ScenePlan,
        inventory: &MediaInventory,
        audio: Option<&AudioTimingRecord>,
    ) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let scenes = Self::check_scene_numbers(plan, &mut errors);
        Self::check_media_coverage(&scenes, inventory, &mut errors);
        Self::check_media_references(&scenes, inventory, &mut errors);

        match audio {
            Some(record) => {
                self.check_audio(&scenes, record, &mut errors, &mut warnings);
            }
            None => warnings.push(ConsistencyWarning::NoAudioTiming),
        }

        ValidationResult::from_findings(errors, warnings)
    }

    /// Returns the distinct scene numbers in the plan
    fn check_scene_numbers(plan: &ScenePlan, errors: &mut Vec<StructuralError>) -> BTreeSet<u32> {
        if plan.is_empty() {
            errors.push(StructuralError::EmptyScenePlan);
            return BTreeSet::new();
        }

        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        for scene in plan.scenes() {
            if !seen.insert(scene.number) && reported.insert(scene.number) {
                errors.push(StructuralError::DuplicateScene {
                    scene: scene.number,
                });
            }
        }

        let max = seen.iter().next_back().copied().unwrap_or(0);
        for number in 1..=max {
            if !seen.contains(&number) {
                errors.push(StructuralError::MissingSceneNumber { scene: number });
            }
        }

        seen
    }

    fn check_media_coverage(
        scenes: &BTreeSet<u32>,
        inventory: &MediaInventory,
        errors: &mut Vec<StructuralError>,
    ) {
        for &scene in scenes {
            match inventory.get(scene) {
                None => errors.push(StructuralError::MissingMedia { scene }),
                Some(mapping) if mapping.assets.is_empty() => {
                    errors.push(StructuralError::EmptyMedia { scene })
                }
                Some(_) => {}
            }
        }
    }

    fn check_media_references(
        scenes: &BTreeSet<u32>,
        inventory: &MediaInventory,
        errors: &mut Vec<StructuralError>,
    ) {
        for (key, mapping) in inventory.iter() {
            if mapping.scene_number != key {
                errors.push(StructuralError::MismatchedMediaKey {
                    key,
                    scene: mapping.scene_number,
                });
            }
            if !scenes.contains(&key) {
                errors.push(StructuralError::UnknownMediaScene { scene: key });
            }
        }
    }

    fn check_audio(
        &self,
        scenes: &BTreeSet<u32>,
        record: &AudioTimingRecord,
        errors: &mut Vec<StructuralError>,
        warnings: &mut Vec<ConsistencyWarning>,
    ) {
        let mut by_scene: BTreeMap<u32, usize> = BTreeMap::new();
        for bp in &record.scene_breakpoints {
            *by_scene.entry(bp.scene_number).or_default() += 1;
        }

        for &scene in scenes {
            match by_scene.get(&scene) {
                None => errors.push(StructuralError::MissingBreakpoint { scene }),
                Some(&count) if count > 1 => {
                    errors.push(StructuralError::DuplicateBreakpoint { scene })
                }
                Some(_) => {}
            }
        }
        for &scene in by_scene.keys() {
            if !scenes.contains(&scene) {
                errors.push(StructuralError::UnknownBreakpointScene { scene });
            }
        }

        // Walk breakpoints in scene order: each must start after the previous ends
        let mut ordered: Vec<_> = record.scene_breakpoints.iter().collect();
        ordered.sort_by_key(|bp| bp.scene_number);
        for pair in ordered.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if prev.scene_number == next.scene_number {
                continue;
            }
            if next.start_time + EDGE_EPSILON < prev.end_time() {
                errors.push(StructuralError::OverlappingBreakpoints {
                    previous: prev.scene_number,
                    previous_end: prev.end_time(),
                    scene: next.scene_number,
                    start: next.start_time,
                });
            }
        }

        let breakpoint_total = record.breakpoint_total();
        if (breakpoint_total - record.master_duration).abs() > self.duration_tolerance {
            warnings.push(ConsistencyWarning::DurationMismatch {
                breakpoint_total,
                master_duration: record.master_duration,
            });
        }

        for mark in &record.timing_marks {
            if !scenes.contains(&mark.scene_number) {
                warnings.push(ConsistencyWarning::OrphanTimingMark {
                    scene: mark.scene_number,
                    timestamp: mark.timestamp,
                });
            }
        }
    }
}
