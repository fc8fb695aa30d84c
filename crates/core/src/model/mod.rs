pub mod example;
pub mod history;
pub mod layout;
pub mod walkthrough;

pub use example::{Example, ExampleId, ExampleSelection};
pub use history::{Edit, EditHistory, EditOutcome};
pub use layout::{LayoutBlock, LayoutDocument};
pub use walkthrough::{Commentary, IntervalKind, TimeInterval, TimelineError, Walkthrough};
