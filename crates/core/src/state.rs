use layerwalk_protocol::{CameraPose, Directive};
use tracing::{debug, trace};

use crate::camera::{self, CameraState};
use crate::model::{
    Edit, EditHistory, EditOutcome, Example, ExampleId, ExampleSelection, LayoutDocument,
    Walkthrough,
};
use crate::nav::{self, Popup};

/// The single mutable aggregate every UI handler works on.
///
/// Handlers receive `&mut ProgramState`; the renderer receives
/// `&ProgramState` and polls [`version`](Self::version) to decide whether
/// to re-read. Every mutating method bumps the version when it changed
/// something.
#[derive(Debug, Clone)]
pub struct ProgramState {
    history: EditHistory<LayoutDocument>,
    walkthrough: Walkthrough,
    examples: ExampleSelection,
    camera: CameraState,
    popup: Popup,
    version: u64,
}

impl ProgramState {
    pub fn new(
        layout: LayoutDocument,
        walkthrough: Walkthrough,
        examples: ExampleSelection,
        camera: CameraState,
    ) -> Self {
        Self {
            history: EditHistory::new(layout),
            walkthrough,
            examples,
            camera,
            popup: Popup::default(),
            version: 0,
        }
    }

    // --- Dirty tracking ---

    /// Monotonic counter bumped on every change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether anything changed since the renderer last saw `seen`.
    pub fn is_dirty_since(&self, seen: u64) -> bool {
        self.version != seen
    }

    pub fn mark_dirty(&mut self) {
        self.version = self.version.wrapping_add(1);
        trace!(version = self.version, "program state dirty");
    }

    // --- Read access for renderers ---

    pub fn history(&self) -> &EditHistory<LayoutDocument> {
        &self.history
    }

    /// The layout to draw this frame: transient while editing, committed
    /// otherwise.
    pub fn layout(&self) -> &LayoutDocument {
        self.history.effective()
    }

    pub fn walkthrough(&self) -> &Walkthrough {
        &self.walkthrough
    }

    pub fn examples(&self) -> &ExampleSelection {
        &self.examples
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn popup(&self) -> Option<&Directive> {
        self.popup.current()
    }

    /// What the commentary panel should show for the current clock,
    /// regardless of whether the popup is open.
    pub fn current_directive(&self) -> Directive {
        self.walkthrough.current_directive()
    }

    // --- Layout editing ---

    /// Feed one step of an edit gesture through the history. `end` is true
    /// for the final step of the gesture.
    pub fn apply_edit<F>(&mut self, end: bool, mutator: F) -> EditOutcome
    where
        F: FnOnce(&LayoutDocument) -> Edit<LayoutDocument>,
    {
        let had_transient = self.history.is_editing();
        let outcome = self.history.apply_edit(end, mutator);
        if outcome != EditOutcome::Unchanged || had_transient {
            self.mark_dirty();
        }
        outcome
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            self.mark_dirty();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            self.mark_dirty();
        }
        changed
    }

    // --- Walkthrough ---

    pub fn advance(&mut self) -> Directive {
        let directive = nav::advance(&mut self.walkthrough, &mut self.popup);
        self.mark_dirty();
        directive
    }

    pub fn retreat(&mut self) -> Directive {
        let directive = nav::retreat(&mut self.walkthrough, &mut self.popup);
        self.mark_dirty();
        directive
    }

    pub fn dismiss_popup(&mut self) -> bool {
        let was_visible = self.popup.dismiss();
        if was_visible {
            self.mark_dirty();
        }
        was_visible
    }

    /// Per-frame clock update from the render loop.
    pub fn tick(&mut self, elapsed: f64) -> bool {
        let moved = self.walkthrough.tick(elapsed);
        if moved {
            self.mark_dirty();
        }
        moved
    }

    /// Scrub the clock to `time`. Returns whether the clock moved.
    pub fn seek(&mut self, time: f64) -> bool {
        let moved = self.walkthrough.seek(time);
        if moved {
            self.mark_dirty();
        }
        moved
    }

    // --- Camera and examples ---

    /// Frame the whole current example.
    pub fn expand(&mut self) -> CameraPose {
        let pose = camera::expand_target(&self.examples);
        self.camera.set_desired(pose);
        self.mark_dirty();
        pose
    }

    /// Zoom in on the residual stream of the current example.
    pub fn magnify(&mut self) -> CameraPose {
        let pose = camera::magnify_target(
            &self.examples,
            self.history.effective(),
            &self.camera.model_transform,
        );
        self.camera.set_desired(pose);
        self.mark_dirty();
        pose
    }

    /// Renderer hook: take the pending camera target.
    pub fn take_desired_camera(&mut self) -> Option<CameraPose> {
        self.camera.take_desired()
    }

    /// Switch to another example and fly the camera to it. Unknown ids are
    /// ignored.
    pub fn select_example(&mut self, id: ExampleId) -> Option<&Example> {
        let pose = self.examples.select(id)?.camera;
        debug!(%id, "selected example");
        self.camera.set_desired(pose);
        self.mark_dirty();
        Some(self.examples.current())
    }
}
