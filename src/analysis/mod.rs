pub mod quality;
pub mod validator;

pub use quality::{QualityReport, QualityScorer, SceneQuality};
pub use validator::{ContextValidator, ValidationResult};
