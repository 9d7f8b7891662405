use crate::analysis::validator::ValidationResult;
use crate::audio::AudioTimingRecord;
use crate::timeline::AssemblyTimeline;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneQuality {
    pub scene_number: u32,
    pub average_relevance: f64,
    pub audio_sync_confidence: f64,
    pub segment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    /// Mean relevance over every segment, so reused assets count per use
    pub average_relevance: f64,
    pub audio_sync_confidence: f64,
    pub overall_score: f64,
    pub ready_for_publish: bool,
    pub distinct_assets: usize,
    pub scenes: Vec<SceneQuality>,
}

pub struct QualityScorer {
    publish_threshold: f64,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(70.0)
    }
}

impl QualityScorer {
    pub fn new(publish_threshold: f64) -> Self {
        Self { publish_threshold }
    }

    pub fn score(
        &self,
        timeline: &AssemblyTimeline,
        audio: Option<&AudioTimingRecord>,
        validation: &ValidationResult,
    ) -> QualityReport {
        let scenes: Vec<SceneQuality> = timeline
            .scenes
            .iter()
            .map(|scene| {
                let scores: Vec<f64> = scene
                    .segments
                    .iter()
                    .map(|seg| seg.asset.relevance_score)
                    .collect();
                let synced = audio
                    .map(|record| record.breakpoint(scene.scene_number).is_some())
                    .unwrap_or(false);

                SceneQuality {
                    scene_number: scene.scene_number,
                    average_relevance: mean(&scores),
                    audio_sync_confidence: if synced { 100.0 } else { 0.0 },
                    segment_count: scores.len(),
                }
            })
            .collect();

        let all_scores: Vec<f64> = timeline
            .segments()
            .map(|seg| seg.asset.relevance_score)
            .collect();
        let average_relevance = mean(&all_scores);

        let audio_sync_confidence = mean(
            &scenes
                .iter()
                .map(|s| s.audio_sync_confidence)
                .collect::<Vec<_>>(),
        );

        let overall_score = (average_relevance + audio_sync_confidence) / 2.0;
        let ready_for_publish = overall_score >= self.publish_threshold && validation.ok;

        let distinct_assets = timeline
            .segments()
            .map(|seg| seg.asset.id.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        QualityReport {
            average_relevance,
            audio_sync_confidence,
            overall_score,
            ready_for_publish,
            distinct_assets,
            scenes,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
