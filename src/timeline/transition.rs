use crate::audio::{MarkType, TimingMark};
use crate::script::ScenePurpose;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    FadeIn,
    FadeOut,
    QuickCut,
    Dissolve,
    Slide,
    Zoom,
    Crossfade,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::FadeIn => "fade_in",
            TransitionKind::FadeOut => "fade_out",
            TransitionKind::QuickCut => "quick_cut",
            TransitionKind::Dissolve => "dissolve",
            TransitionKind::Slide => "slide",
            TransitionKind::Zoom => "zoom",
            TransitionKind::Crossfade => "crossfade",
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration: f64,
    /// A narration pause sits close to the cut; renderers may snap to it
    pub speech_aligned: bool,
}

impl Transition {
    pub fn new(kind: TransitionKind, duration: f64) -> Self {
        Self {
            kind,
            duration,
            speech_aligned: false,
        }
    }

    pub fn fade_in() -> Self {
        Self::new(TransitionKind::FadeIn, 0.5)
    }

    pub fn fade_out() -> Self {
        Self::new(TransitionKind::FadeOut, 1.0)
    }

    /// Transition implied by a scene's narrative purpose alone
    pub fn for_purpose(purpose: ScenePurpose) -> Self {
        match purpose {
            ScenePurpose::Hook => Self::new(TransitionKind::QuickCut, 0.1),
            ScenePurpose::Problem => Self::new(TransitionKind::Dissolve, 0.8),
            ScenePurpose::Solution => Self::new(TransitionKind::Slide, 0.6),
            ScenePurpose::CallToAction => Self::new(TransitionKind::Zoom, 0.4),
            ScenePurpose::Generic => Self::new(TransitionKind::Crossfade, 0.5),
        }
    }
}

/// Rule table for scene and segment boundaries. No randomness.
pub struct TransitionSelector {
    pause_window: f64,
}

impl Default for TransitionSelector {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl TransitionSelector {
    pub fn new(pause_window: f64) -> Self {
        Self { pause_window }
    }

    /// First scene fades in, last fades out, anything else follows its purpose.
    /// `at` is the timeline position of the cut.
    pub fn select_transition(
        &self,
        purpose: ScenePurpose,
        scene_number: u32,
        total_scenes: usize,
        nearby_marks: &[TimingMark],
        at: f64,
    ) -> Transition {
        let base = if scene_number == 1 {
            Transition::fade_in()
        } else if scene_number as usize == total_scenes {
            Transition::fade_out()
        } else {
            Transition::for_purpose(purpose)
        };
        self.align(base, nearby_marks, at)
    }

    /// Transition into a scene's first segment
    pub fn entry(
        &self,
        purpose: ScenePurpose,
        scene_number: u32,
        nearby_marks: &[TimingMark],
        at: f64,
    ) -> Transition {
        let base = if scene_number == 1 {
            Transition::fade_in()
        } else {
            Transition::for_purpose(purpose)
        };
        self.align(base, nearby_marks, at)
    }

    /// Transition out of a scene; only the final scene has one
    pub fn exit(
        &self,
        scene_number: u32,
        total_scenes: usize,
        nearby_marks: &[TimingMark],
        at: f64,
    ) -> Option<Transition> {
        (scene_number as usize == total_scenes)
            .then(|| self.align(Transition::fade_out(), nearby_marks, at))
    }

    /// Cut between two segments inside a scene
    pub fn between_segments(
        &self,
        purpose: ScenePurpose,
        nearby_marks: &[TimingMark],
        at: f64,
    ) -> Transition {
        self.align(Transition::for_purpose(purpose), nearby_marks, at)
    }

    fn align(&self, mut transition: Transition, marks: &[TimingMark], at: f64) -> Transition {
        transition.speech_aligned = marks
            .iter()
            .any(|m| m.mark_type == MarkType::Pause && (m.timestamp - at).abs() <= self.pause_window);
        transition
    }
}
