pub mod directive;
pub mod types;

pub use directive::{Anchor, Directive, NO_COMMENTARY_TEXT, PopupPlacement};
pub use types::{CameraPose, Mat4, Vec3};
