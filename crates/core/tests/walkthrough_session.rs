//! Integration test: load a walkthrough configuration, then drive it the way
//! the toolbar and the render loop do, checking directives, clock, camera
//! and edit history along the way.

use layerwalk_core::ProgramConfig;
use layerwalk_core::model::{EditOutcome, ExampleId};
use layerwalk_protocol::{Anchor, Vec3};

fn load() -> layerwalk_core::ProgramState {
    let data = include_bytes!("fixtures/walkthrough.json");
    ProgramConfig::from_json_slice(data)
        .expect("fixture should be a valid configuration")
        .into_state()
        .expect("fixture should build a program state")
}

#[test]
fn play_through_the_walkthrough() {
    let mut state = load();
    assert_eq!(state.walkthrough().times().len(), 7);
    assert!(state.popup().is_none());

    // First "next" starts playback and shows the opening commentary.
    let d = state.advance();
    assert!(state.walkthrough().is_running());
    assert_eq!(
        d.text,
        "Welcome to the walkthrough. This is the embedding."
    );
    assert_eq!(d.anchor, Anchor::TopLeft);

    // The render loop moves the clock into the second commentary.
    for _ in 0..24 {
        state.tick(0.5);
    }
    assert!((state.walkthrough().time() - 12.0).abs() < f64::EPSILON);

    // Pausing inside "Layer norm" points at the next one.
    let d = state.advance();
    assert!(!state.walkthrough().is_running());
    assert_eq!(d.text, "Self-attention mixes tokens.");
    assert_eq!(d.anchor, Anchor::BottomLeft);

    // "Previous" from inside layer norm has only one earlier commentary.
    let d = state.retreat();
    assert_eq!(state.walkthrough().time(), 0.0);
    assert!(state.walkthrough().is_running());
    assert!(d.text.starts_with("Welcome"));

    // Scrub past the last commentary and play to the end.
    state.seek(33.0);
    assert!(state.current_directive().is_fallback());
    state.tick(100.0);
    assert_eq!(state.walkthrough().time(), 40.0);
    assert!(!state.walkthrough().is_running());

    // "Next" at the end rewinds without starting playback.
    let d = state.advance();
    assert_eq!(state.walkthrough().time(), 0.0);
    assert!(!state.walkthrough().is_running());
    assert!(d.text.starts_with("Welcome"));
}

#[test]
fn next_at_end_while_playing_rewinds_and_keeps_playing() {
    let mut state = load();
    state.advance();
    assert!(state.walkthrough().is_running());
    state.seek(40.0);
    assert!(state.walkthrough().is_at_end());

    let d = state.advance();
    assert_eq!(state.walkthrough().time(), 0.0);
    assert!(state.walkthrough().is_running());
    assert!(d.text.starts_with("Welcome"));
}

#[test]
fn retreat_from_late_commentary() {
    let mut state = load();
    state.seek(22.0);
    let d = state.retreat();
    assert!((state.walkthrough().time() - 10.0).abs() < f64::EPSILON);
    assert_eq!(d.text, "Layer norm rescales each column.");
    assert_eq!(d.anchor, Anchor::TopRight);

    // The point marker at 32 uses the legacy "position" key.
    state.seek(30.0);
    let d = state.advance();
    assert_eq!(d.anchor, Anchor::BottomRight);
    assert_eq!(d.start, Some(32.0));
}

#[test]
fn camera_follows_example_selection() {
    let mut state = load();

    let main_pose = state.expand();
    assert_eq!(main_pose.center, Vec3::new(-8.5, 0.0, -120.0));

    let magnified = state.magnify();
    assert!((magnified.zoom() - 0.7).abs() < f32::EPSILON);
    assert!((magnified.center - Vec3::new(3.347, 48.0, -2.634)).length() < 1e-4);

    let gpt3 = state
        .select_example(ExampleId(1))
        .map(|e| e.name.clone())
        .expect("example 1 exists");
    assert_eq!(gpt3, "GPT-3");
    assert!(state.examples().current().enabled);

    // GPT-3 has no layout of its own: magnify uses the main layout, shifted.
    let magnified = state.magnify();
    assert!((magnified.zoom() - 4.0).abs() < f32::EPSILON);
    assert!((magnified.center - Vec3::new(123.347, 48.0, -2.634)).length() < 1e-3);

    state.select_example(ExampleId(0));
    let magnified = state.magnify();
    assert!((magnified.center - Vec3::new(-79.0, 2.0, 0.0)).length() < 1e-4);

    let before = state.examples().current_id();
    assert!(state.select_example(ExampleId(99)).is_none());
    assert_eq!(state.examples().current_id(), before);
}

#[test]
fn drag_gesture_then_undo_redo() {
    let mut state = load();
    let seen = state.version();

    for step in 1..=4 {
        let outcome = state.apply_edit(false, |layout| {
            layout.move_block("attn0", Vec3::new(0.0, 0.5, 0.0))
        });
        assert_eq!(outcome, EditOutcome::Speculative, "step {step}");
    }
    assert!(state.is_dirty_since(seen));
    assert!(state.history().is_editing());
    assert_eq!(state.history().undo_depth(), 0);
    assert_eq!(
        state.layout().block("attn0").map(|b| b.position.y),
        Some(22.0)
    );

    let outcome = state.apply_edit(true, |layout| layout.move_block("attn0", Vec3::ZERO));
    // A zero move at the end of a gesture reports no change: the drag is abandoned.
    assert_eq!(outcome, EditOutcome::Unchanged);
    assert!(!state.history().is_editing());
    assert_eq!(
        state.layout().block("attn0").map(|b| b.position.y),
        Some(20.0)
    );

    state.apply_edit(false, |layout| layout.move_block("attn0", Vec3::X));
    state.apply_edit(true, |layout| layout.move_block("attn0", Vec3::X));
    assert_eq!(state.history().undo_depth(), 1);
    assert_eq!(
        state.layout().block("attn0").map(|b| b.position.x),
        Some(2.0)
    );

    assert!(state.undo());
    assert_eq!(
        state.layout().block("attn0").map(|b| b.position.x),
        Some(0.0)
    );
    assert!(state.redo());
    assert_eq!(
        state.layout().block("attn0").map(|b| b.position.x),
        Some(2.0)
    );
}

#[test]
fn rejects_unsorted_fixture() {
    let json = r#"{
        "phase_length": 10,
        "times": [
            { "start": 4, "end": 5, "kind": "phase" },
            { "start": 1, "end": 2, "kind": "commentary", "text": ["late"] }
        ],
        "main_example": { "name": "main", "camera": { "center": [0, 0, 0], "angle": [0, 0, 1] } },
        "layout": { "blocks": [], "residual": [0, 0, 0] }
    }"#;
    let err = ProgramConfig::from_json_str(json).expect_err("unsorted times must be rejected");
    assert!(err.to_string().contains("before the previous interval"));
}
