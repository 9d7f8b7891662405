//! Error taxonomy for timeline compilation.

use crate::analysis::validator::ValidationResult;
use thiserror::Error;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Fatal cross-record problems found while validating inputs.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum StructuralError {
    #[error("scene plan contains no scenes")]
    EmptyScenePlan,

    #[error("scene {scene} appears more than once in the scene plan")]
    DuplicateScene { scene: u32 },

    #[error("scene plan has a gap: scene {scene} is missing")]
    MissingSceneNumber { scene: u32 },

    #[error("scene {scene} has no media mapping")]
    MissingMedia { scene: u32 },

    #[error("scene {scene} is mapped to zero media assets")]
    EmptyMedia { scene: u32 },

    #[error("media inventory references scene {scene}, which is not in the scene plan")]
    UnknownMediaScene { scene: u32 },

    #[error("media mapping stored under scene {key} declares scene {scene}")]
    MismatchedMediaKey { key: u32, scene: u32 },

    #[error("scene {scene} has no audio breakpoint")]
    MissingBreakpoint { scene: u32 },

    #[error("scene {scene} has more than one audio breakpoint")]
    DuplicateBreakpoint { scene: u32 },

    #[error("audio breakpoint references scene {scene}, which is not in the scene plan")]
    UnknownBreakpointScene { scene: u32 },

    #[error("audio breakpoint for scene {scene} starts at {start:.3}s, before scene {previous} ends at {previous_end:.3}s")]
    OverlappingBreakpoints {
        previous: u32,
        previous_end: f64,
        scene: u32,
        start: f64,
    },
}

impl StructuralError {
    /// Scene the error is about, if it concerns a single scene.
    pub fn scene(&self) -> Option<u32> {
        match self {
            StructuralError::EmptyScenePlan => None,
            StructuralError::DuplicateScene { scene }
            | StructuralError::MissingSceneNumber { scene }
            | StructuralError::MissingMedia { scene }
            | StructuralError::EmptyMedia { scene }
            | StructuralError::UnknownMediaScene { scene }
            | StructuralError::MismatchedMediaKey { scene, .. }
            | StructuralError::MissingBreakpoint { scene }
            | StructuralError::DuplicateBreakpoint { scene }
            | StructuralError::UnknownBreakpointScene { scene }
            | StructuralError::OverlappingBreakpoints { scene, .. } => Some(*scene),
        }
    }
}

/// Non-fatal findings. Compilation proceeds with the documented fallback.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ConsistencyWarning {
    #[error("no audio timing; falling back to estimated scene durations")]
    NoAudioTiming,

    #[error("audio breakpoints sum to {breakpoint_total:.3}s but master duration is {master_duration:.3}s")]
    DurationMismatch {
        breakpoint_total: f64,
        master_duration: f64,
    },

    #[error("timing mark at {timestamp:.3}s references unknown scene {scene}")]
    OrphanTimingMark { scene: u32, timestamp: f64 },
}

/// Broken assumptions inside the compiler. Reaching one of these is a bug.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InternalInvariantError {
    #[error("scene {scene}: no video or image assets left to assign to segment {segment}")]
    NoAssets { scene: u32, segment: usize },

    #[error("scene {scene}: no resolved time interval")]
    MissingInterval { scene: u32 },

    #[error("scene {scene}: no media mapping after validation passed")]
    MissingMapping { scene: u32 },

    #[error("worker pool could not be built: {0}")]
    WorkerPool(String),

    #[error("assembler already ran (state {state}); build a new one per compilation")]
    AssemblerReused { state: String },

    #[error("scene {scene}: segment length range {min}..{max} cannot be sequenced")]
    UnusableRange { scene: u32, min: f64, max: f64 },

    #[error("scene {scene}: random source drew {draw}, expected a finite positive length")]
    InvalidDraw { scene: u32, draw: f64 },
}

/// Why a compilation produced no timeline.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("input validation failed with {} error(s)", .0.errors.len())]
    Validation(ValidationResult),

    #[error("invalid compiler configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("internal invariant violated: {0}")]
    Internal(#[from] InternalInvariantError),
}

impl CompileError {
    /// Structural errors that blocked compilation; empty for internal failures.
    pub fn structural_errors(&self) -> &[StructuralError] {
        match self {
            CompileError::Validation(result) => &result.errors,
            CompileError::Config(_) | CompileError::Internal(_) => &[],
        }
    }
}

/// Shape problems caught by record constructors at the input boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("scene {scene}: planned duration must be positive and finite, got {duration}")]
    InvalidPlannedDuration { scene: u32, duration: f64 },

    #[error("scene number must be at least 1")]
    ZeroSceneNumber,

    #[error("asset '{id}': relevance score {score} is outside 0-100")]
    RelevanceOutOfRange { id: String, score: f64 },

    #[error("asset '{id}': duration hint is only valid for video assets")]
    DurationHintOnImage { id: String },

    #[error("asset '{id}': duration hint must be positive and finite, got {hint}")]
    InvalidDurationHint { id: String, hint: f64 },

    #[error("asset id cannot be empty")]
    EmptyAssetId,

    #[error("audio master duration must be non-negative and finite, got {0}")]
    InvalidMasterDuration(f64),

    #[error("scene {scene}: breakpoint must have a non-negative start and positive duration, got start {start}, duration {duration}")]
    InvalidBreakpoint { scene: u32, start: f64, duration: f64 },

    #[error("scene {scene}: timing mark timestamp must be non-negative and finite, got {timestamp}")]
    InvalidTimingMark { scene: u32, timestamp: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_scene() {
        assert_eq!(StructuralError::EmptyScenePlan.scene(), None);
        assert_eq!(StructuralError::MissingMedia { scene: 3 }.scene(), Some(3));
        let err = StructuralError::MismatchedMediaKey { key: 2, scene: 5 };
        assert_eq!(err.scene(), Some(5));
    }

    #[test]
    fn test_messages_name_the_scene() {
        let err = StructuralError::MissingMedia { scene: 2 };
        assert_eq!(err.to_string(), "scene 2 has no media mapping");

        let warning = ConsistencyWarning::NoAudioTiming;
        assert_eq!(
            warning.to_string(),
            "no audio timing; falling back to estimated scene durations"
        );
    }

    #[test]
    fn test_compile_error_exposes_structural_errors() {
        let result = ValidationResult::from_findings(
            vec![StructuralError::MissingMedia { scene: 2 }],
            vec![],
        );
        let err = CompileError::Validation(result);
        assert_eq!(err.structural_errors().len(), 1);
        assert!(err.to_string().contains("1 error(s)"));

        let err = CompileError::from(InternalInvariantError::MissingInterval { scene: 1 });
        assert!(err.structural_errors().is_empty());
    }
}
