use reelsmith::timeline::{AudioTiming, TransitionKind, VisualTreatment};
use reelsmith::{
    compile, AudioTimingRecord, CompileError, CompilerConfig, ConsistencyWarning, InputParser,
    MarkType, MediaAsset, MediaInventory, Scene, SceneBreakpoint, SceneMediaMapping, ScenePlan,
    ScenePurpose, StructuralError, TimelineAssembler, TimingMark,
};

const EPSILON: f64 = 1e-6;

fn three_scene_plan() -> ScenePlan {
    ScenePlan::new(vec![
        Scene::new(1, ScenePurpose::Hook, 15.0).unwrap(),
        Scene::new(2, ScenePurpose::Solution, 60.0).unwrap(),
        Scene::new(3, ScenePurpose::CallToAction, 10.0).unwrap(),
    ])
}

fn two_images_each(scenes: &[u32]) -> MediaInventory {
    MediaInventory::from_mappings(scenes.iter().map(|&n| {
        SceneMediaMapping::new(
            n,
            vec![
                MediaAsset::image(format!("s{}-a", n), format!("media/{}a.jpg", n), 82.0).unwrap(),
                MediaAsset::image(format!("s{}-b", n), format!("media/{}b.jpg", n), 64.0).unwrap(),
            ],
        )
    }))
}

fn mixed_inventory(scenes: &[u32]) -> MediaInventory {
    MediaInventory::from_mappings(scenes.iter().map(|&n| {
        SceneMediaMapping::new(
            n,
            vec![
                MediaAsset::image(format!("s{}-img", n), "i.jpg", 70.0).unwrap(),
                MediaAsset::video(format!("s{}-vid", n), "v.mp4", 95.0, Some(30.0)).unwrap(),
                MediaAsset::image(format!("s{}-img2", n), "j.jpg", 55.0).unwrap(),
            ],
        )
    }))
}

fn long_plan() -> ScenePlan {
    let purposes = [
        ScenePurpose::Hook,
        ScenePurpose::Problem,
        ScenePurpose::Generic,
        ScenePurpose::Solution,
        ScenePurpose::Generic,
        ScenePurpose::CallToAction,
    ];
    ScenePlan::new(
        purposes
            .iter()
            .enumerate()
            .map(|(i, &p)| Scene::new(i as u32 + 1, p, 7.5 + 23.3 * i as f64).unwrap())
            .collect(),
    )
}

fn assert_timeline_invariants(plan: &ScenePlan, timeline: &reelsmith::AssemblyTimeline) {
    // Coverage: one scene timeline per planned scene, ascending
    let numbers: Vec<u32> = timeline.scenes.iter().map(|s| s.scene_number).collect();
    let expected: Vec<u32> = plan.in_order().iter().map(|s| s.number).collect();
    assert_eq!(numbers, expected);

    for scene in &timeline.scenes {
        let segments = &scene.segments;
        assert!(!segments.is_empty());
        assert!((segments[0].start_time - scene.start_time).abs() < EPSILON);

        // Contiguity inside the scene
        for pair in segments.windows(2) {
            assert!((pair[0].end_time() - pair[1].start_time).abs() < EPSILON);
        }

        // Duration conservation
        let total: f64 = segments.iter().map(|s| s.duration).sum();
        assert!((total - scene.duration()).abs() < EPSILON);
    }

    // No overlap anywhere on the timeline
    let mut spans: Vec<(f64, f64)> = timeline
        .segments()
        .map(|s| (s.start_time, s.end_time()))
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    for pair in spans.windows(2) {
        assert!(pair[0].1 <= pair[1].0 + EPSILON);
    }
}

#[test]
fn test_three_scene_video_without_audio() {
    let plan = three_scene_plan();
    let inventory = two_images_each(&[1, 2, 3]);

    let compiled = compile(&plan, &inventory, None).unwrap();
    let timeline = &compiled.timeline;

    assert_eq!(timeline.total_duration, 85.0);
    assert_eq!((timeline.scenes[0].start_time, timeline.scenes[0].end_time), (0.0, 15.0));
    assert_eq!((timeline.scenes[1].start_time, timeline.scenes[1].end_time), (15.0, 75.0));
    assert_eq!((timeline.scenes[2].start_time, timeline.scenes[2].end_time), (75.0, 85.0));

    // Only the closing scene carries an exit transition
    assert!(timeline.scenes[0].transition_out.is_none());
    assert!(timeline.scenes[1].transition_out.is_none());
    let out = timeline.scenes[2].transition_out.unwrap();
    assert_eq!(out.kind, TransitionKind::FadeOut);
    assert_eq!(out.duration, 1.0);

    assert_eq!(timeline.scenes[0].segments[0].transition_in.kind, TransitionKind::FadeIn);
    assert_eq!(timeline.scenes[1].segments[0].transition_in.kind, TransitionKind::Slide);
    assert_eq!(timeline.scenes[2].segments[0].transition_in.kind, TransitionKind::Zoom);

    // Image-only scenes fade out on the very last segment
    let last = timeline.segments().last().unwrap();
    assert!(matches!(
        last.visual_treatment,
        VisualTreatment::KenBurns { fade_out: true, .. }
    ));

    assert_eq!(compiled.warnings, vec![ConsistencyWarning::NoAudioTiming]);
    assert_eq!(timeline.scenes[0].audio_track.timing, AudioTiming::Estimated);
    assert_eq!(compiled.quality.audio_sync_confidence, 0.0);
    assert!(!compiled.quality.ready_for_publish);
    assert_timeline_invariants(&plan, timeline);
}

#[test]
fn test_validation_failure_names_missing_scene() {
    let plan = three_scene_plan();
    let inventory = two_images_each(&[1, 3]);

    let err = compile(&plan, &inventory, None).unwrap_err();
    match err {
        CompileError::Validation(result) => {
            assert!(!result.ok);
            assert_eq!(result.errors, vec![StructuralError::MissingMedia { scene: 2 }]);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_fail_closed_on_missing_scene_three() {
    let plan = three_scene_plan();
    let inventory = two_images_each(&[1, 2]);

    let err = compile(&plan, &inventory, None).unwrap_err();
    assert_eq!(err.structural_errors().len(), 1);
    assert_eq!(err.structural_errors()[0].scene(), Some(3));
}

#[test]
fn test_all_errors_reported_together() {
    let plan = ScenePlan::new(vec![
        Scene::new(1, ScenePurpose::Hook, 5.0).unwrap(),
        Scene::new(3, ScenePurpose::Generic, 5.0).unwrap(),
    ]);
    let mut inventory = two_images_each(&[1, 9]);
    inventory.insert(SceneMediaMapping::new(3, vec![]));

    let err = compile(&plan, &inventory, None).unwrap_err();
    let errors = err.structural_errors();
    assert!(errors.contains(&StructuralError::MissingSceneNumber { scene: 2 }));
    assert!(errors.contains(&StructuralError::EmptyMedia { scene: 3 }));
    assert!(errors.contains(&StructuralError::UnknownMediaScene { scene: 9 }));
}

#[test]
fn test_fallback_timing_sums_planned_durations() {
    let plan = long_plan();
    let inventory = mixed_inventory(&[1, 2, 3, 4, 5, 6]);
    let compiled = compile(&plan, &inventory, None).unwrap();

    let mut expected_start = 0.0;
    for (scene, planned) in compiled.timeline.scenes.iter().zip(plan.in_order()) {
        assert!((scene.start_time - expected_start).abs() < EPSILON);
        expected_start += planned.planned_duration;
    }
    assert_timeline_invariants(&plan, &compiled.timeline);
}

#[test]
fn test_determinism_across_runs_and_seeds() {
    let plan = long_plan();
    let inventory = mixed_inventory(&[1, 2, 3, 4, 5, 6]);

    for seed in [0u64, 1, 7, 12345] {
        let mut config = CompilerConfig::default();
        config.runtime.seed = seed;

        let a = TimelineAssembler::new(config.clone())
            .compile(&plan, &inventory, None)
            .unwrap();
        let b = TimelineAssembler::new(config)
            .compile(&plan, &inventory, None)
            .unwrap();

        assert_eq!(
            serde_json::to_vec(&a.timeline).unwrap(),
            serde_json::to_vec(&b.timeline).unwrap()
        );
        assert_eq!(a.timeline.fingerprint().unwrap(), b.timeline.fingerprint().unwrap());
        assert_timeline_invariants(&plan, &a.timeline);
    }
}

#[test]
fn test_scene_order_in_plan_does_not_matter() {
    let plan = long_plan();
    let mut reversed: Vec<Scene> = plan.scenes().to_vec();
    reversed.reverse();
    let reversed = ScenePlan::new(reversed);
    let inventory = mixed_inventory(&[1, 2, 3, 4, 5, 6]);

    let a = compile(&plan, &inventory, None).unwrap();
    let b = compile(&reversed, &inventory, None).unwrap();
    assert_eq!(a.timeline, b.timeline);
}

#[test]
fn test_audio_timing_is_authoritative() {
    let plan = three_scene_plan();
    let inventory = mixed_inventory(&[1, 2, 3]);
    let audio = AudioTimingRecord::new(
        90.0,
        vec![
            SceneBreakpoint::new(1, 0.0, 14.2).unwrap(),
            SceneBreakpoint::new(2, 14.2, 63.1).unwrap(),
            SceneBreakpoint::new(3, 77.3, 12.0).unwrap(),
        ],
        vec![
            TimingMark::new(3, 77.0, MarkType::Pause).unwrap(),
            TimingMark::new(2, 40.0, MarkType::Emphasis).unwrap(),
        ],
    )
    .unwrap();

    let compiled = compile(&plan, &inventory, Some(&audio)).unwrap();
    let timeline = &compiled.timeline;

    assert_eq!(timeline.scenes[1].start_time, 14.2);
    assert!((timeline.scenes[1].end_time - 77.3).abs() < EPSILON);
    assert!((timeline.total_duration - 89.3).abs() < EPSILON);
    assert!(timeline.scenes[2].segments[0].transition_in.speech_aligned);
    assert_eq!(timeline.scenes[2].audio_track.timing, AudioTiming::Narration);

    assert!(compiled.warnings.is_empty());
    assert_eq!(compiled.quality.audio_sync_confidence, 100.0);
    assert_timeline_invariants(&plan, timeline);
}

#[test]
fn test_duration_mismatch_rides_along() {
    let plan = three_scene_plan();
    let inventory = two_images_each(&[1, 2, 3]);
    let audio = AudioTimingRecord::new(
        100.0,
        vec![
            SceneBreakpoint::new(1, 0.0, 15.0).unwrap(),
            SceneBreakpoint::new(2, 15.0, 60.0).unwrap(),
            SceneBreakpoint::new(3, 75.0, 10.0).unwrap(),
        ],
        vec![],
    )
    .unwrap();

    let compiled = compile(&plan, &inventory, Some(&audio)).unwrap();
    assert_eq!(
        compiled.warnings,
        vec![ConsistencyWarning::DurationMismatch {
            breakpoint_total: 85.0,
            master_duration: 100.0,
        }]
    );
    // every asset scores 64 or 82, so full sync confidence clears the threshold
    let relevance = compiled.quality.average_relevance;
    assert!((64.0..=82.0).contains(&relevance));
    assert!(compiled.quality.ready_for_publish);
}

#[test]
fn test_compile_from_json_records() {
    let plan = InputParser::scene_plan_from_str(
        r#"[
            {"number": 1, "purpose": "hook", "planned_duration": 8.0},
            {"number": 2, "purpose": "problem", "planned_duration": 22.0}
        ]"#,
    )
    .unwrap();
    let inventory = InputParser::media_inventory_from_str(
        r#"{
            "1": {"scene_number": 1, "assets": [
                {"id": "v1", "kind": "video", "source_path": "v1.mp4", "relevance_score": 91}
            ]},
            "2": {"scene_number": 2, "assets": [
                {"id": "i2", "kind": "image", "source_path": "i2.jpg", "relevance_score": 77}
            ]}
        }"#,
    )
    .unwrap();

    let compiled = compile(&plan, &inventory, None).unwrap();
    assert_eq!(compiled.timeline.total_duration, 30.0);
    assert!(compiled
        .timeline
        .scenes[0]
        .segments
        .iter()
        .all(|s| s.asset.id == "v1"));

    let json = compiled.timeline.to_json_pretty().unwrap();
    let decoded: reelsmith::AssemblyTimeline = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.segment_count(), compiled.timeline.segment_count());
    assert_eq!(decoded.scenes[1].segments[0].asset.id, "i2");
}
