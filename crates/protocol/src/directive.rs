use serde::{Deserialize, Serialize};

/// Text shown when no commentary lies at or after the clock.
pub const NO_COMMENTARY_TEXT: &str = "No commentary available for the current time.";

/// Preferred screen corner for a commentary popup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Screen offsets of a popup in logical pixels, measured from the edges of
/// the canvas. `None` leaves that edge unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopupPlacement {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    /// Popup width as a fraction of the canvas width.
    pub width_fraction: f64,
}

const POPUP_WIDTH_FRACTION: f64 = 0.35;

impl Anchor {
    /// Where a popup with this anchor sits on screen.
    ///
    /// Top-left leaves room for the toolbar above it; the bottom anchors
    /// leave room for the phase timeline bar.
    pub fn placement(self) -> PopupPlacement {
        let (top, right, bottom, left) = match self {
            Self::TopLeft => (Some(40.0), None, None, Some(0.0)),
            Self::TopRight => (Some(0.0), Some(0.0), None, None),
            Self::BottomLeft => (None, None, Some(30.0), Some(0.0)),
            Self::BottomRight => (None, Some(0.0), Some(30.0), None),
        };
        PopupPlacement {
            top,
            right,
            bottom,
            left,
            width_fraction: POPUP_WIDTH_FRACTION,
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopLeft => write!(f, "top-left"),
            Self::TopRight => write!(f, "top-right"),
            Self::BottomLeft => write!(f, "bottom-left"),
            Self::BottomRight => write!(f, "bottom-right"),
        }
    }
}

/// What the commentary popup should display.
///
/// Front ends render this verbatim; it carries everything needed to place
/// and fill the popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub text: String,
    pub anchor: Anchor,
    /// Start time of the commentary interval this came from, `None` for the
    /// fallback.
    pub start: Option<f64>,
}

impl Directive {
    pub fn commentary(text: impl Into<String>, anchor: Anchor, start: f64) -> Self {
        Self {
            text: text.into(),
            anchor,
            start: Some(start),
        }
    }

    /// The "nothing to say here" directive.
    pub fn fallback() -> Self {
        Self {
            text: NO_COMMENTARY_TEXT.to_string(),
            anchor: Anchor::default(),
            start: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.start.is_none()
    }

    /// Where the popup showing this directive sits on screen.
    pub fn placement(&self) -> PopupPlacement {
        self.anchor.placement()
    }
}
