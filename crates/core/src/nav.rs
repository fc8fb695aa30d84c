//! Walkthrough navigation: the "next" and "previous" toolbar actions.
//!
//! Both actions mutate the [`Walkthrough`] clock and then hand the directive
//! for the new clock position to a [`DirectiveSink`]. The lookup behind the
//! directive is [`query_active_commentary`], shared with every other
//! "what is shown now" query.
//!
//! [`query_active_commentary`]: crate::model::walkthrough::query_active_commentary

use layerwalk_protocol::Directive;
use tracing::debug;

use crate::model::Walkthrough;
use crate::model::walkthrough::previous_commentary_start;

/// Receives the directive produced by a navigation action.
pub trait DirectiveSink {
    fn show(&mut self, directive: &Directive);
}

impl<F> DirectiveSink for F
where
    F: FnMut(&Directive),
{
    fn show(&mut self, directive: &Directive) {
        self(directive);
    }
}

/// The commentary popup: hidden until the first navigation action, then
/// showing the most recent directive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Popup {
    current: Option<Directive>,
}

impl Popup {
    pub fn current(&self) -> Option<&Directive> {
        self.current.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }
}

impl DirectiveSink for Popup {
    fn show(&mut self, directive: &Directive) {
        self.current = Some(directive.clone());
    }
}

/// "Next": restart from zero once the phase is over, otherwise toggle
/// play/pause. Either way, show the commentary at or after the clock.
///
/// Running past the end does not jump to another phase; the clock is reset
/// and the play state is left alone.
pub fn advance(walkthrough: &mut Walkthrough, sink: &mut impl DirectiveSink) -> Directive {
    if walkthrough.is_at_end() {
        debug!(time = walkthrough.time(), "advance past end, rewinding");
        walkthrough.set_time_unclamped(0.0);
    } else {
        walkthrough.toggle_running();
    }
    let directive = walkthrough.current_directive();
    sink.show(&directive);
    directive
}

/// "Previous": toggle play/pause and move the clock back to the start of
/// the commentary before the one currently playing (or to zero).
pub fn retreat(walkthrough: &mut Walkthrough, sink: &mut impl DirectiveSink) -> Directive {
    walkthrough.toggle_running();
    let target = previous_commentary_start(walkthrough.times(), walkthrough.time());
    debug!(from = walkthrough.time(), to = target, "retreat");
    walkthrough.set_time_unclamped(target);
    let directive = walkthrough.current_directive();
    sink.show(&directive);
    directive
}
