use crate::assets::MediaInventory;
use crate::audio::AudioTimingRecord;
use crate::script::ScenePlan;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Decodes the JSON records handed over by upstream stages.
///
/// Shape checks run during decoding, so anything returned here is well typed.
pub struct InputParser;

impl InputParser {
    pub fn scene_plan_from_str(json: &str) -> Result<ScenePlan> {
        Self::decode_str(json, "scene plan")
    }

    pub fn media_inventory_from_str(json: &str) -> Result<MediaInventory> {
        Self::decode_str(json, "media inventory")
    }

    pub fn audio_timing_from_str(json: &str) -> Result<AudioTimingRecord> {
        Self::decode_str(json, "audio timing record")
    }

    pub fn scene_plan_from_reader(reader: impl Read) -> Result<ScenePlan> {
        Self::decode_reader(reader, "scene plan")
    }

    pub fn media_inventory_from_reader(reader: impl Read) -> Result<MediaInventory> {
        Self::decode_reader(reader, "media inventory")
    }

    pub fn audio_timing_from_reader(reader: impl Read) -> Result<AudioTimingRecord> {
        Self::decode_reader(reader, "audio timing record")
    }

    fn decode_str<T: DeserializeOwned>(json: &str, what: &str) -> Result<T> {
        serde_json::from_str(json).with_context(|| format!("Failed to parse {}", what))
    }

    fn decode_reader<T: DeserializeOwned>(reader: impl Read, what: &str) -> Result<T> {
        serde_json::from_reader(reader).with_context(|| format!("Failed to read {}", what))
    }

    /// Get a summary of the input records
    pub fn summarize(
        plan: &ScenePlan,
        inventory: &MediaInventory,
        audio: Option<&AudioTimingRecord>,
    ) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Scenes: {}\n", plan.len()));
        summary.push_str(&format!("Planned duration: {:.2}s\n", plan.planned_total()));

        for scene in plan.in_order() {
            let (images, videos) = inventory
                .get(scene.number)
                .map(|m| (m.images().len(), m.videos().len()))
                .unwrap_or((0, 0));
            summary.push_str(&format!(
                "  Scene {}: {} ({:.2}s, {} images, {} videos)\n",
                scene.number, scene.purpose, scene.planned_duration, images, videos
            ));
        }

        match audio {
            Some(record) => summary.push_str(&format!(
                "Audio: {:.2}s master, {} breakpoints, {} marks\n",
                record.master_duration,
                record.scene_breakpoints.len(),
                record.timing_marks.len()
            )),
            None => summary.push_str("Audio: none\n"),
        }

        summary
    }
}
