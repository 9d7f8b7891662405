use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Narration timing produced by the speech-synthesis stage.
///
/// When present it is authoritative over planned scene durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAudioTimingRecord")]
pub struct AudioTimingRecord {
    pub master_duration: f64,
    pub scene_breakpoints: Vec<SceneBreakpoint>,
    pub timing_marks: Vec<TimingMark>,
    /// Narration file the breakpoints were measured against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl AudioTimingRecord {
    pub fn new(
        master_duration: f64,
        scene_breakpoints: Vec<SceneBreakpoint>,
        timing_marks: Vec<TimingMark>,
    ) -> Result<Self, RecordError> {
        if !master_duration.is_finite() || master_duration < 0.0 {
            return Err(RecordError::InvalidMasterDuration(master_duration));
        }
        for bp in &scene_breakpoints {
            bp.check()?;
        }
        for mark in &timing_marks {
            mark.check()?;
        }

        Ok(Self {
            master_duration,
            scene_breakpoints,
            timing_marks,
            source: None,
        })
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn breakpoint(&self, scene_number: u32) -> Option<&SceneBreakpoint> {
        self.scene_breakpoints
            .iter()
            .find(|bp| bp.scene_number == scene_number)
    }

    /// Sum of all breakpoint durations
    pub fn breakpoint_total(&self) -> f64 {
        self.scene_breakpoints.iter().map(|bp| bp.duration).sum()
    }

    /// Marks attributed to the given scene, in timestamp order
    pub fn marks_for_scene(&self, scene_number: u32) -> Vec<TimingMark> {
        let mut marks: Vec<TimingMark> = self
            .timing_marks
            .iter()
            .filter(|m| m.scene_number == scene_number)
            .cloned()
            .collect();
        marks.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        marks
    }
}

#[derive(Deserialize)]
struct RawAudioTimingRecord {
    master_duration: f64,
    scene_breakpoints: Vec<SceneBreakpoint>,
    #[serde(default)]
    timing_marks: Vec<TimingMark>,
    #[serde(default)]
    source: Option<PathBuf>,
}

impl TryFrom<RawAudioTimingRecord> for AudioTimingRecord {
    type Error = RecordError;

    fn try_from(raw: RawAudioTimingRecord) -> Result<Self, Self::Error> {
        let mut record =
            AudioTimingRecord::new(raw.master_duration, raw.scene_breakpoints, raw.timing_marks)?;
        record.source = raw.source;
        Ok(record)
    }
}

/// Authoritative start/duration pair for a scene, measured on the narration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBreakpoint {
    pub scene_number: u32,
    pub start_time: f64,
    pub duration: f64,
}

impl SceneBreakpoint {
    pub fn new(scene_number: u32, start_time: f64, duration: f64) -> Result<Self, RecordError> {
        let bp = Self {
            scene_number,
            start_time,
            duration,
        };
        bp.check()?;
        Ok(bp)
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    fn check(&self) -> Result<(), RecordError> {
        let valid = self.start_time.is_finite()
            && self.start_time >= 0.0
            && self.duration.is_finite()
            && self.duration > 0.0;
        if !valid {
            return Err(RecordError::InvalidBreakpoint {
                scene: self.scene_number,
                start: self.start_time,
                duration: self.duration,
            });
        }
        Ok(())
    }
}

/// A notable instant in the narration, in seconds on the master timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingMark {
    pub scene_number: u32,
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub mark_type: MarkType,
}

impl TimingMark {
    pub fn new(scene_number: u32, timestamp: f64, mark_type: MarkType) -> Result<Self, RecordError> {
        let mark = Self {
            scene_number,
            timestamp,
            mark_type,
        };
        mark.check()?;
        Ok(mark)
    }

    fn check(&self) -> Result<(), RecordError> {
        if !self.timestamp.is_finite() || self.timestamp < 0.0 {
            return Err(RecordError::InvalidTimingMark {
                scene: self.scene_number,
                timestamp: self.timestamp,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkType {
    Pause,
    Emphasis,
    Speech,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialization() {
        let json = r#"
        {
            "master_duration": 20.0,
            "scene_breakpoints": [
                {"scene_number": 1, "start_time": 0.0, "duration": 8.0},
                {"scene_number": 2, "start_time": 8.0, "duration": 12.0}
            ],
            "timing_marks": [
                {"scene_number": 2, "timestamp": 14.2, "type": "emphasis"},
                {"scene_number": 2, "timestamp": 7.9, "type": "pause"}
            ],
            "source": "narration.mp3"
        }
        "#;

        let record: AudioTimingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.breakpoint_total(), 20.0);
        assert_eq!(record.breakpoint(2).unwrap().end_time(), 20.0);
        assert_eq!(record.source, Some(PathBuf::from("narration.mp3")));

        let marks = record.marks_for_scene(2);
        assert_eq!(marks.len(), 2);
        assert_eq!(marks[0].mark_type, MarkType::Pause);
    }

    #[test]
    fn test_timing_marks_default_empty() {
        let json = r#"{"master_duration": 5.0, "scene_breakpoints": []}"#;
        let record: AudioTimingRecord = serde_json::from_str(json).unwrap();
        assert!(record.timing_marks.is_empty());
        assert!(record.source.is_none());
    }

    #[test]
    fn test_shape_checks() {
        assert!(SceneBreakpoint::new(1, -1.0, 5.0).is_err());
        assert!(SceneBreakpoint::new(1, 0.0, 0.0).is_err());
        assert!(TimingMark::new(1, f64::INFINITY, MarkType::Pause).is_err());
        assert!(AudioTimingRecord::new(-2.0, vec![], vec![]).is_err());

        let json = r#"{"master_duration": 5.0, "scene_breakpoints": [
            {"scene_number": 1, "start_time": 0.0, "duration": -5.0}
        ]}"#;
        let result: Result<AudioTimingRecord, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
