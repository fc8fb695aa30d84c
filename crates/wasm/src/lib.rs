use std::sync::{Mutex, MutexGuard};

use layerwalk_core::model::{EditOutcome, ExampleId};
use layerwalk_core::{ProgramConfig, ProgramState};
use layerwalk_protocol::{Directive, Vec3};
use serde::Serialize;
use wasm_bindgen::prelude::*;

static STATES: Mutex<Vec<Option<ProgramState>>> = Mutex::new(Vec::new());

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn to_json(value: &impl Serialize) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_err)
}

fn states() -> Result<MutexGuard<'static, Vec<Option<ProgramState>>>, JsError> {
    STATES.lock().map_err(|_| JsError::new("program state lock poisoned"))
}

fn with_state<T>(
    handle: usize,
    f: impl FnOnce(&mut ProgramState) -> Result<T, JsError>,
) -> Result<T, JsError> {
    let mut states = states()?;
    let state = states
        .get_mut(handle)
        .and_then(Option::as_mut)
        .ok_or_else(|| JsError::new("invalid program handle"))?;
    f(state)
}

/// Load a walkthrough configuration (JSON). Returns a handle for later calls.
///
/// Slots freed by [`drop_program`] are reused.
#[wasm_bindgen]
pub fn load_program(config: &[u8]) -> Result<usize, JsError> {
    let state = ProgramConfig::from_json_slice(config)
        .and_then(ProgramConfig::into_state)
        .map_err(js_err)?;
    let mut states = states()?;
    if let Some(handle) = states.iter().position(Option::is_none) {
        states[handle] = Some(state);
        return Ok(handle);
    }
    states.push(Some(state));
    Ok(states.len() - 1)
}

/// Release a program. Returns false for a handle that holds nothing.
#[wasm_bindgen]
pub fn drop_program(handle: usize) -> Result<bool, JsError> {
    let mut states = states()?;
    Ok(states.get_mut(handle).and_then(Option::take).is_some())
}

/// Change counter; re-read the state whenever it differs from the last
/// value seen.
#[wasm_bindgen]
pub fn program_version(handle: usize) -> Result<u64, JsError> {
    with_state(handle, |s| Ok(s.version()))
}

/// The "next" toolbar button. Returns the directive as JSON.
#[wasm_bindgen]
pub fn advance(handle: usize) -> Result<String, JsError> {
    with_state(handle, |s| to_json(&s.advance()))
}

/// The "previous" toolbar button. Returns the directive as JSON.
#[wasm_bindgen]
pub fn retreat(handle: usize) -> Result<String, JsError> {
    with_state(handle, |s| to_json(&s.retreat()))
}

#[wasm_bindgen]
pub fn dismiss_popup(handle: usize) -> Result<bool, JsError> {
    with_state(handle, |s| Ok(s.dismiss_popup()))
}

/// The open popup as JSON, or `null`.
#[wasm_bindgen]
pub fn popup(handle: usize) -> Result<String, JsError> {
    with_state(handle, |s| to_json(&s.popup()))
}

/// Screen placement of the open popup as JSON, or `null`.
#[wasm_bindgen]
pub fn popup_placement(handle: usize) -> Result<String, JsError> {
    with_state(handle, |s| to_json(&s.popup().map(Directive::placement)))
}

/// Advance the clock by `elapsed` seconds. Returns whether it moved.
#[wasm_bindgen]
pub fn tick(handle: usize, elapsed: f64) -> Result<bool, JsError> {
    with_state(handle, |s| Ok(s.tick(elapsed)))
}

/// Scrub the clock. Returns whether it moved.
#[wasm_bindgen]
pub fn seek(handle: usize, time: f64) -> Result<bool, JsError> {
    with_state(handle, |s| Ok(s.seek(time)))
}

/// Clock, playback flag and progress as JSON.
#[wasm_bindgen]
pub fn walkthrough_status(handle: usize) -> Result<String, JsError> {
    #[derive(Serialize)]
    struct Status {
        time: f64,
        running: bool,
        progress: f64,
        phase_length: f64,
    }
    with_state(handle, |s| {
        let w = s.walkthrough();
        to_json(&Status {
            time: w.time(),
            running: w.is_running(),
            progress: w.progress(),
            phase_length: w.phase_length(),
        })
    })
}

/// Camera target framing the whole current example, as JSON.
#[wasm_bindgen]
pub fn expand(handle: usize) -> Result<String, JsError> {
    with_state(handle, |s| to_json(&s.expand()))
}

/// Camera target on the current example's residual stream, as JSON.
#[wasm_bindgen]
pub fn magnify(handle: usize) -> Result<String, JsError> {
    with_state(handle, |s| to_json(&s.magnify()))
}

/// Pending camera target as JSON, or `null`. Clears it.
#[wasm_bindgen]
pub fn take_desired_camera(handle: usize) -> Result<String, JsError> {
    with_state(handle, |s| to_json(&s.take_desired_camera()))
}

/// Select an example. Returns false and changes nothing for unknown ids.
#[wasm_bindgen]
pub fn select_example(handle: usize, id: i32) -> Result<bool, JsError> {
    with_state(handle, |s| Ok(s.select_example(ExampleId(id)).is_some()))
}

/// One step of a drag gesture on a layout block. Returns "unchanged",
/// "speculative" or "committed".
#[wasm_bindgen]
pub fn drag_block(
    handle: usize,
    block: &str,
    dx: f32,
    dy: f32,
    dz: f32,
    end: bool,
) -> Result<String, JsError> {
    let delta = Vec3::new(dx, dy, dz);
    with_state(handle, |s| {
        let outcome = s.apply_edit(end, |layout| layout.move_block(block, delta));
        Ok(match outcome {
            EditOutcome::Unchanged => "unchanged",
            EditOutcome::Speculative => "speculative",
            EditOutcome::Committed => "committed",
        }
        .to_string())
    })
}

#[wasm_bindgen]
pub fn undo(handle: usize) -> Result<bool, JsError> {
    with_state(handle, |s| Ok(s.undo()))
}

#[wasm_bindgen]
pub fn redo(handle: usize) -> Result<bool, JsError> {
    with_state(handle, |s| Ok(s.redo()))
}

/// The layout to draw this frame, as JSON.
#[wasm_bindgen]
pub fn layout(handle: usize) -> Result<String, JsError> {
    with_state(handle, |s| to_json(s.layout()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &[u8] = br#"{
        "phase_length": 10,
        "main_example": { "name": "main", "camera": { "center": [0, 0, 0], "angle": [270, 4.5, 12] } },
        "layout": { "blocks": [], "residual": [0, 48, 0] }
    }"#;

    #[test]
    fn dropped_handles_are_reused() {
        let (Ok(first), Ok(second)) = (load_program(CONFIG), load_program(CONFIG)) else {
            panic!("config should load");
        };
        assert_ne!(first, second);

        assert!(matches!(drop_program(first), Ok(true)));
        assert!(matches!(drop_program(first), Ok(false)));
        assert!(matches!(program_version(second), Ok(0)));

        assert!(matches!(load_program(CONFIG), Ok(h) if h == first));
    }
}
