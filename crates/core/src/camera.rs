use layerwalk_protocol::{CameraPose, Mat4};
use serde::Serialize;
use tracing::debug;

use crate::model::{ExampleSelection, LayoutDocument};

/// Zoom used when magnifying the main example.
pub const MAIN_EXAMPLE_ZOOM: f32 = 0.7;
/// Zoom used when magnifying a named example.
pub const NAMED_EXAMPLE_ZOOM: f32 = 4.0;

/// Camera state owned by the program: the model transform the renderer
/// draws with and the pose it should animate toward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraState {
    /// Model-to-world transform of the main model.
    pub model_transform: Mat4,
    desired: Option<CameraPose>,
}

impl CameraState {
    pub fn new(model_transform: Mat4) -> Self {
        Self {
            model_transform,
            desired: None,
        }
    }

    pub fn desired(&self) -> Option<&CameraPose> {
        self.desired.as_ref()
    }

    pub fn set_desired(&mut self, pose: CameraPose) {
        debug!(center = ?pose.center, angle = ?pose.angle, "desired camera");
        self.desired = Some(pose);
    }

    /// Take the pending target once the renderer has started animating
    /// toward it.
    pub fn take_desired(&mut self) -> Option<CameraPose> {
        self.desired.take()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

/// Pose framing the whole current example: its stored camera, verbatim.
pub fn expand_target(selection: &ExampleSelection) -> CameraPose {
    selection.current().camera
}

/// Pose looking closely at the residual stream of the current example.
///
/// The residual anchor of the example's layout (or `main_layout` when the
/// example has none) is carried through the model transform, offset by the
/// example's position, to get a world-space focus point.
pub fn magnify_target(
    selection: &ExampleSelection,
    main_layout: &LayoutDocument,
    model_transform: &Mat4,
) -> CameraPose {
    let example = selection.current();
    let layout = example.layout.as_ref().unwrap_or(main_layout);
    let transform = *model_transform * Mat4::from_translation(example.offset);
    let center = transform.project_point3(layout.residual_anchor());
    let zoom = if selection.current_id().is_main() {
        MAIN_EXAMPLE_ZOOM
    } else {
        NAMED_EXAMPLE_ZOOM
    };
    CameraPose::looking_at(center, zoom)
}
