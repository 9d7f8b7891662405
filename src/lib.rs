pub mod analysis;
pub mod assets;
pub mod audio;
pub mod config;
pub mod error;
pub mod parser;
pub mod random;
pub mod script;
pub mod timeline;

pub use analysis::{ContextValidator, QualityReport, QualityScorer, ValidationResult};
pub use assets::{MediaAsset, MediaInventory, MediaKind, SceneMediaMapping};
pub use audio::{AudioTimingRecord, MarkType, SceneBreakpoint, TimingMark};
pub use config::CompilerConfig;
pub use error::{CompileError, ConsistencyWarning, InternalInvariantError, StructuralError};
pub use parser::InputParser;
pub use random::{RandomProvider, RandomSource, SeededProvider};
pub use script::{Scene, ScenePlan, ScenePurpose};
pub use timeline::{compile, AssemblyTimeline, CompiledTimeline, TimelineAssembler};
