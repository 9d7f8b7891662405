use crate::error::RecordError;
use serde::{Deserialize, Serialize};

/// Ordered list of narrative scenes produced by the scene-planning stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenePlan {
    scenes: Vec<Scene>,
}

impl ScenePlan {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Look up a scene by its number
    pub fn scene(&self, number: u32) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.number == number)
    }

    /// Scenes sorted by ascending scene number
    pub fn in_order(&self) -> Vec<&Scene> {
        let mut ordered: Vec<&Scene> = self.scenes.iter().collect();
        ordered.sort_by_key(|s| s.number);
        ordered
    }

    /// Sum of planned durations across every scene
    pub fn planned_total(&self) -> f64 {
        self.scenes.iter().map(|s| s.planned_duration).sum()
    }
}

/// A narrative unit of the script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScene")]
pub struct Scene {
    pub number: u32,
    pub purpose: ScenePurpose,
    pub planned_duration: f64,
    pub visual_style: String,
    pub mood: String,
}

impl Scene {
    pub fn new(
        number: u32,
        purpose: ScenePurpose,
        planned_duration: f64,
    ) -> Result<Self, RecordError> {
        if number == 0 {
            return Err(RecordError::ZeroSceneNumber);
        }
        if !planned_duration.is_finite() || planned_duration <= 0.0 {
            return Err(RecordError::InvalidPlannedDuration {
                scene: number,
                duration: planned_duration,
            });
        }

        Ok(Self {
            number,
            purpose,
            planned_duration,
            visual_style: String::new(),
            mood: String::new(),
        })
    }

    pub fn with_style(mut self, visual_style: impl Into<String>, mood: impl Into<String>) -> Self {
        self.visual_style = visual_style.into();
        self.mood = mood.into();
        self
    }
}

#[derive(Deserialize)]
struct RawScene {
    number: u32,
    #[serde(default)]
    purpose: ScenePurpose,
    planned_duration: f64,
    #[serde(default)]
    visual_style: String,
    #[serde(default)]
    mood: String,
}

impl TryFrom<RawScene> for Scene {
    type Error = RecordError;

    fn try_from(raw: RawScene) -> Result<Self, Self::Error> {
        Ok(Scene::new(raw.number, raw.purpose, raw.planned_duration)?
            .with_style(raw.visual_style, raw.mood))
    }
}

/// What a scene is for in the narrative arc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScenePurpose {
    Hook,
    Problem,
    Solution,
    CallToAction,
    #[default]
    Generic,
}

impl ScenePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenePurpose::Hook => "hook",
            ScenePurpose::Problem => "problem",
            ScenePurpose::Solution => "solution",
            ScenePurpose::CallToAction => "call_to_action",
            ScenePurpose::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ScenePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
