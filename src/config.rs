use serde::Deserialize;

/// Tunables for timeline compilation. Defaults reproduce the canonical pacing.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CompilerConfig {
    pub pacing: PacingConfig,
    pub validation: ValidationConfig,
    pub transitions: TransitionConfig,
    pub quality: QualityConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PacingConfig {
    /// Hard cap on the hook phase length in seconds
    pub hook_max_seconds: f64,
    /// Hook phase length as a fraction of scene duration
    pub hook_fraction: f64,
    /// Where the main phase ends, as a fraction of scene duration
    pub main_end_fraction: f64,
    pub hook_range: SegmentRange,
    pub main_range: SegmentRange,
    pub conclusion_range: SegmentRange,
    /// Every nth segment prefers video footage
    pub video_every_nth: usize,
}

/// Inclusive bounds for a drawn segment length, in seconds
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SegmentRange {
    pub min: f64,
    pub max: f64,
}

impl SegmentRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Allowed gap between summed breakpoints and the master duration
    pub duration_tolerance: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransitionConfig {
    /// How close a pause mark must be to flag a transition as speech aligned
    pub pause_window: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct QualityConfig {
    pub publish_threshold: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub seed: u64,
    /// Scene workers; 0 means one per core
    pub workers: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig {
                hook_max_seconds: 15.0,
                hook_fraction: 0.1,
                main_end_fraction: 0.9,
                hook_range: SegmentRange::new(3.0, 5.0),
                main_range: SegmentRange::new(5.0, 8.0),
                conclusion_range: SegmentRange::new(6.0, 10.0),
                video_every_nth: 5,
            },
            validation: ValidationConfig {
                duration_tolerance: 1.0,
            },
            transitions: TransitionConfig { pause_window: 1.0 },
            quality: QualityConfig {
                publish_threshold: 70.0,
            },
            runtime: RuntimeConfig {
                seed: 0,
                workers: 0,
            },
        }
    }
}

impl CompilerConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("pacing.hook_max_seconds", 15.0)?
            .set_default("pacing.hook_fraction", 0.1)?
            .set_default("pacing.main_end_fraction", 0.9)?
            .set_default("pacing.hook_range.min", 3.0)?
            .set_default("pacing.hook_range.max", 5.0)?
            .set_default("pacing.main_range.min", 5.0)?
            .set_default("pacing.main_range.max", 8.0)?
            .set_default("pacing.conclusion_range.min", 6.0)?
            .set_default("pacing.conclusion_range.max", 10.0)?
            .set_default("pacing.video_every_nth", 5)?
            .set_default("validation.duration_tolerance", 1.0)?
            .set_default("transitions.pause_window", 1.0)?
            .set_default("quality.publish_threshold", 70.0)?
            .set_default("runtime.seed", 0)?
            .set_default("runtime.workers", 0)?
            // Load from file if exists
            .add_source(config::File::with_name("reelsmith").required(false))
            // Allow env var overrides (e.g. REELSMITH__RUNTIME__SEED=42)
            .add_source(config::Environment::with_prefix("REELSMITH").separator("__"));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the sequencer cannot honor
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let p = &self.pacing;
        for (name, range) in [
            ("hook_range", p.hook_range),
            ("main_range", p.main_range),
            ("conclusion_range", p.conclusion_range),
        ] {
            if !(range.min > 0.0 && range.min <= range.max && range.max.is_finite()) {
                return Err(config::ConfigError::Message(format!(
                    "pacing.{} must satisfy 0 < min <= max, got {}..{}",
                    name, range.min, range.max
                )));
            }
        }

        let fractions_ok = p.hook_fraction >= 0.0
            && p.main_end_fraction <= 1.0
            && p.hook_fraction <= p.main_end_fraction;
        if !fractions_ok {
            return Err(config::ConfigError::Message(format!(
                "pacing fractions must satisfy 0 <= hook_fraction <= main_end_fraction <= 1, got {} and {}",
                p.hook_fraction, p.main_end_fraction
            )));
        }

        if p.hook_max_seconds.is_nan() || p.hook_max_seconds < 0.0 {
            return Err(config::ConfigError::Message(
                "pacing.hook_max_seconds cannot be negative".to_string(),
            ));
        }

        if p.video_every_nth == 0 {
            return Err(config::ConfigError::Message(
                "pacing.video_every_nth must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("validation.duration_tolerance", self.validation.duration_tolerance),
            ("transitions.pause_window", self.transitions.pause_window),
            ("quality.publish_threshold", self.quality.publish_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(config::ConfigError::Message(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Worker count with 0 resolved to the number of cores
    pub fn worker_count(&self) -> usize {
        if self.runtime.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.runtime.workers
        }
    }
}
