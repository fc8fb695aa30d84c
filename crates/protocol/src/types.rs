use serde::{Deserialize, Serialize};

pub use glam::{Mat4, Vec3};

/// Yaw of the fixed "look down the model" orientation, in degrees.
pub const MAGNIFY_YAW: f32 = 270.0;
/// Pitch of the fixed "look down the model" orientation, in degrees.
pub const MAGNIFY_PITCH: f32 = 4.5;

/// A camera pose the renderer animates toward.
///
/// `angle` packs the orbit parameters the renderer expects:
/// `x` is yaw in degrees, `y` is pitch in degrees and `z` is the zoom
/// distance from `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub center: Vec3,
    pub angle: Vec3,
}

impl CameraPose {
    pub fn new(center: Vec3, angle: Vec3) -> Self {
        Self { center, angle }
    }

    /// A pose looking at `center` with the fixed magnify orientation.
    pub fn looking_at(center: Vec3, zoom: f32) -> Self {
        Self {
            center,
            angle: Vec3::new(MAGNIFY_YAW, MAGNIFY_PITCH, zoom),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.angle.z
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::looking_at(Vec3::ZERO, 1.0)
    }
}
