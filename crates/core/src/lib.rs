//! Editing and walkthrough state for an interactive layered-model viewer.
//!
//! ```text
//!   UI events ─▶ ProgramState ─┬─▶ EditHistory<LayoutDocument>  (apply_edit / undo / redo)
//!                              ├─▶ Walkthrough + nav             (advance / retreat / tick / seek)
//!                              ├─▶ ExampleSelection + camera     (select / expand / magnify)
//!                              └─▶ version counter ─▶ renderer re-reads layout + camera
//! ```
//!
//! Rendering, layout computation and asset loading live outside this crate;
//! they only read [`ProgramState`] and the value types of
//! `layerwalk-protocol`.

pub mod camera;
pub mod config;
pub mod model;
pub mod nav;
pub mod state;

pub use config::{ConfigError, ProgramConfig};
pub use state::ProgramState;
