use std::collections::BTreeMap;

use layerwalk_protocol::{CameraPose, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::layout::LayoutDocument;

/// Identifier of an example model. `-1` is the main example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExampleId(pub i32);

impl ExampleId {
    pub const MAIN: Self = Self(-1);

    pub fn is_main(self) -> bool {
        self == Self::MAIN
    }
}

impl Default for ExampleId {
    fn default() -> Self {
        Self::MAIN
    }
}

impl std::fmt::Display for ExampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One selectable model shown next to the main one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub name: String,
    /// Camera pose that frames this example.
    pub camera: CameraPose,
    /// Layout of this example; the main layout is used when absent.
    #[serde(default)]
    pub layout: Option<LayoutDocument>,
    /// Whether the example has been selected at least once.
    #[serde(default)]
    pub enabled: bool,
    /// World-space offset of this example relative to the main model.
    #[serde(default)]
    pub offset: Vec3,
}

impl Example {
    pub fn new(name: impl Into<String>, camera: CameraPose) -> Self {
        Self {
            name: name.into(),
            camera,
            layout: None,
            enabled: false,
            offset: Vec3::ZERO,
        }
    }
}

/// The main example, the named examples and which one is current.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleSelection {
    current: ExampleId,
    main: Example,
    examples: BTreeMap<ExampleId, Example>,
}

impl ExampleSelection {
    /// Selection with only the main example, which is current.
    pub fn new(main: Example) -> Self {
        Self {
            current: ExampleId::MAIN,
            main,
            examples: BTreeMap::new(),
        }
    }

    /// Build a selection whose ids have already been validated.
    pub(crate) fn from_parts(
        main: Example,
        examples: BTreeMap<ExampleId, Example>,
        current: ExampleId,
    ) -> Self {
        Self {
            current,
            main,
            examples,
        }
    }

    pub fn with_example(mut self, id: ExampleId, example: Example) -> Self {
        if !id.is_main() {
            self.examples.insert(id, example);
        }
        self
    }

    pub fn current_id(&self) -> ExampleId {
        self.current
    }

    /// The current example, which is the main example for id `-1`.
    pub fn current(&self) -> &Example {
        self.get(self.current).unwrap_or(&self.main)
    }

    pub fn main(&self) -> &Example {
        &self.main
    }

    pub fn get(&self, id: ExampleId) -> Option<&Example> {
        if id.is_main() {
            Some(&self.main)
        } else {
            self.examples.get(&id)
        }
    }

    /// Named examples in id order.
    pub fn examples(&self) -> impl Iterator<Item = (ExampleId, &Example)> {
        self.examples.iter().map(|(id, e)| (*id, e))
    }

    /// Make `id` current and mark it enabled.
    ///
    /// Ids that reference nothing leave the selection untouched and return
    /// `None`.
    pub fn select(&mut self, id: ExampleId) -> Option<&Example> {
        let example = if id.is_main() {
            &mut self.main
        } else {
            self.examples.get_mut(&id)?
        };
        if !example.enabled {
            debug!(%id, name = %example.name, "enabling example");
            example.enabled = true;
        }
        self.current = id;
        Some(&*example)
    }
}
