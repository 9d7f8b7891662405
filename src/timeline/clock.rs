use crate::audio::AudioTimingRecord;
use crate::script::ScenePlan;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved time span of one scene, in seconds from the start of the video
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneInterval {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl SceneInterval {
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            end: start + duration,
            duration,
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Decides when each scene starts and ends.
pub struct TimelineClock;

impl TimelineClock {
    /// Breakpoints win when narration timing exists; otherwise scenes are laid
    /// back to back from t=0 using their planned durations.
    pub fn compute_scene_times(
        plan: &ScenePlan,
        audio: Option<&AudioTimingRecord>,
    ) -> BTreeMap<u32, SceneInterval> {
        match audio {
            Some(record) => Self::from_breakpoints(plan, record),
            None => Self::from_plan(plan),
        }
    }

    fn from_breakpoints(plan: &ScenePlan, record: &AudioTimingRecord) -> BTreeMap<u32, SceneInterval> {
        plan.in_order()
            .into_iter()
            .filter_map(|scene| {
                record
                    .breakpoint(scene.number)
                    .map(|bp| (scene.number, SceneInterval::new(bp.start_time, bp.duration)))
            })
            .collect()
    }

    fn from_plan(plan: &ScenePlan) -> BTreeMap<u32, SceneInterval> {
        let mut times = BTreeMap::new();
        let mut cursor = 0.0;
        for scene in plan.in_order() {
            times.insert(
                scene.number,
                SceneInterval::new(cursor, scene.planned_duration),
            );
            cursor += scene.planned_duration;
        }
        times
    }
}
