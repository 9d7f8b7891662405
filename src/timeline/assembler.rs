use crate::analysis::{ContextValidator, QualityReport, QualityScorer, ValidationResult};
use crate::assets::MediaInventory;
use crate::audio::{AudioTimingRecord, TimingMark};
use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileResult, ConsistencyWarning, InternalInvariantError};
use crate::random::{RandomProvider, SeededProvider};
use crate::script::{Scene, ScenePlan};
use crate::timeline::{
    AssemblyTimeline, AudioTiming, AudioTrack, SceneContext, SceneInterval, SceneTimeline,
    SegmentSequencer, TimelineClock, TransitionSelector,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Lifecycle of a single compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblerState {
    Pending,
    Validating,
    Failed,
    Timing,
    Sequencing,
    Scoring,
    Completed,
}

impl AssemblerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssemblerState::Failed | AssemblerState::Completed)
    }
}

/// Successful compilation output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledTimeline {
    pub timeline: AssemblyTimeline,
    pub quality: QualityReport,
    pub warnings: Vec<ConsistencyWarning>,
}

/// Runs validation, timing, per-scene sequencing and scoring.
///
/// An assembler compiles exactly once; build a fresh one per request.
pub struct TimelineAssembler {
    config: CompilerConfig,
    random: Box<dyn RandomProvider>,
    state: AssemblerState,
}

impl TimelineAssembler {
    pub fn new(config: CompilerConfig) -> Self {
        let random = Box::new(SeededProvider::new(config.runtime.seed));
        Self::with_random(config, random)
    }

    pub fn with_random(config: CompilerConfig, random: Box<dyn RandomProvider>) -> Self {
        Self {
            config,
            random,
            state: AssemblerState::Pending,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    pub fn compile(
        &mut self,
        plan: &ScenePlan,
        inventory: &MediaInventory,
        audio: Option<&AudioTimingRecord>,
    ) -> CompileResult<CompiledTimeline> {
        if self.state != AssemblerState::Pending {
            return Err(InternalInvariantError::AssemblerReused {
                state: format!("{:?}", self.state),
            }
            .into());
        }

        self.advance(AssemblerState::Validating);
        if let Err(err) = self.config.validate() {
            self.advance(AssemblerState::Failed);
            tracing::error!("{}", err);
            return Err(err.into());
        }
        let validator = ContextValidator::new(self.config.validation.duration_tolerance);
        let validation = validator.validate(plan, inventory, audio);
        if !validation.ok {
            self.advance(AssemblerState::Failed);
            for error in &validation.errors {
                tracing::warn!(scene = ?error.scene(), "{}", error);
            }
            return Err(CompileError::Validation(validation));
        }
        for warning in &validation.warnings {
            tracing::warn!("{}", warning);
        }

        self.advance(AssemblerState::Timing);
        let times = TimelineClock::compute_scene_times(plan, audio);

        self.advance(AssemblerState::Sequencing);
        let scenes = match self.sequence_scenes(plan, inventory, audio, &times) {
            Ok(scenes) => scenes,
            Err(err) => {
                self.advance(AssemblerState::Failed);
                tracing::error!("{}", err);
                return Err(err.into());
            }
        };

        let total_duration = scenes.iter().map(|s| s.end_time).fold(0.0, f64::max);
        let timeline = AssemblyTimeline {
            total_duration,
            scenes,
        };

        self.advance(AssemblerState::Scoring);
        let quality = QualityScorer::new(self.config.quality.publish_threshold).score(
            &timeline,
            audio,
            &validation,
        );

        self.advance(AssemblerState::Completed);
        tracing::info!(
            scenes = timeline.scenes.len(),
            segments = timeline.segment_count(),
            duration = timeline.total_duration,
            overall_score = quality.overall_score,
            ready = quality.ready_for_publish,
            "timeline compiled"
        );

        let ValidationResult { warnings, .. } = validation;
        Ok(CompiledTimeline {
            timeline,
            quality,
            warnings,
        })
    }

    fn advance(&mut self, next: AssemblerState) {
        tracing::debug!(from = ?self.state, to = ?next, "assembler state");
        self.state = next;
    }

    fn sequence_scenes(
        &self,
        plan: &ScenePlan,
        inventory: &MediaInventory,
        audio: Option<&AudioTimingRecord>,
        times: &BTreeMap<u32, SceneInterval>,
    ) -> Result<Vec<SceneTimeline>, InternalInvariantError> {
        let selector = TransitionSelector::new(self.config.transitions.pause_window);
        let sequencer = SegmentSequencer::new(
            self.config.pacing.clone(),
            TransitionSelector::new(self.config.transitions.pause_window),
        );
        let total_scenes = plan.len();
        let ordered = plan.in_order();

        let compile_scene = |scene: &&Scene| -> Result<SceneTimeline, InternalInvariantError> {
            let interval = *times
                .get(&scene.number)
                .ok_or(InternalInvariantError::MissingInterval {
                    scene: scene.number,
                })?;
            let mapping = inventory
                .get(scene.number)
                .ok_or(InternalInvariantError::MissingMapping {
                    scene: scene.number,
                })?;

            let nearby = audio
                .map(|record| nearby_marks(record, interval, self.config.transitions.pause_window))
                .unwrap_or_default();
            let context =
                SceneContext::new(scene.number, scene.purpose, total_scenes).with_marks(nearby);

            let mut rng = self.random.for_scene(scene.number);
            let segments = sequencer.sequence(&context, mapping, interval, rng.as_mut())?;
            let transition_out =
                selector.exit(scene.number, total_scenes, &context.marks, interval.end);

            Ok(SceneTimeline {
                scene_number: scene.number,
                purpose: scene.purpose,
                start_time: interval.start,
                end_time: interval.end,
                audio_track: audio_track(audio, scene.number, interval),
                segments,
                transition_out,
            })
        };

        let workers = self.config.worker_count().min(ordered.len()).max(1);
        tracing::debug!(workers, scenes = ordered.len(), "sequencing scenes");
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| InternalInvariantError::WorkerPool(e.to_string()))?;
        let mut scenes = pool.install(|| {
            ordered
                .par_iter()
                .map(compile_scene)
                .collect::<Result<Vec<_>, _>>()
        })?;

        // Workers may finish in any order
        scenes.sort_by_key(|s| s.scene_number);
        Ok(scenes)
    }
}

/// Marks within `window` seconds of the interval, in timestamp order
fn nearby_marks(record: &AudioTimingRecord, interval: SceneInterval, window: f64) -> Vec<TimingMark> {
    let mut marks: Vec<TimingMark> = record
        .timing_marks
        .iter()
        .filter(|m| m.timestamp >= interval.start - window && m.timestamp <= interval.end + window)
        .copied()
        .collect();
    marks.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    marks
}

fn audio_track(audio: Option<&AudioTimingRecord>, scene_number: u32, interval: SceneInterval) -> AudioTrack {
    match audio {
        Some(record) => AudioTrack {
            source: record.source.clone(),
            offset: interval.start,
            duration: interval.duration,
            timing: AudioTiming::Narration,
            marks: record.marks_for_scene(scene_number),
        },
        None => AudioTrack {
            source: None,
            offset: interval.start,
            duration: interval.duration,
            timing: AudioTiming::Estimated,
            marks: Vec::new(),
        },
    }
}

/// Compile with default configuration and seed
pub fn compile(
    plan: &ScenePlan,
    inventory: &MediaInventory,
    audio: Option<&AudioTimingRecord>,
) -> CompileResult<CompiledTimeline> {
    TimelineAssembler::new(CompilerConfig::default()).compile(plan, inventory, audio)
}
