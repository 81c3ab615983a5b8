#![forbid(unsafe_code)]

//! Whether, and how, a badge should be drawn.
//!
//! Derived from the transition state on every call. Nothing is cached, so
//! visibility flips in the same call that applies the closing settle.

use crate::state::{Phase, TransitionState};

/// What the presentation layer should do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Draw nothing.
    Hidden,
    /// Render the labels invisibly so they can be measured.
    MeasureOnly,
    /// Draw interpolated values; a run is in flight.
    Animated,
    /// Draw values at rest.
    Resting,
}

impl RenderMode {
    /// Anything reaches the screen.
    #[must_use]
    pub fn is_drawn(self) -> bool {
        matches!(self, Self::Animated | Self::Resting)
    }
}

/// Stateless visibility rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityController;

impl VisibilityController {
    /// True unless the badge is closed.
    #[must_use]
    pub fn is_visible(state: &TransitionState) -> bool {
        state.phase() != Phase::Closed
    }

    #[must_use]
    pub fn render_mode(state: &TransitionState) -> RenderMode {
        match state.phase() {
            Phase::Closed => RenderMode::Hidden,
            Phase::Opening if state.awaiting().is_some() => RenderMode::MeasureOnly,
            _ if state.is_settled() => RenderMode::Resting,
            _ => RenderMode::Animated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutParams;
    use crate::measure::MeasuredBox;
    use crate::state::{Request, transition};

    fn step(state: &TransitionState, request: Request) -> TransitionState {
        transition(state, request, &LayoutParams::new(0.9, vec![100.0])).state
    }

    #[test]
    fn follows_the_open_cycle() {
        let closed = TransitionState::closed("Hello");
        assert!(!VisibilityController::is_visible(&closed));
        assert_eq!(VisibilityController::render_mode(&closed), RenderMode::Hidden);

        let opening = step(&closed, Request::SetOpen(true));
        assert!(VisibilityController::is_visible(&opening));
        assert_eq!(
            VisibilityController::render_mode(&opening),
            RenderMode::MeasureOnly
        );
        assert!(!RenderMode::MeasureOnly.is_drawn());

        let ticket = opening.awaiting().unwrap();
        let animating = step(
            &opening,
            Request::Measured {
                ticket,
                boxes: vec![MeasuredBox::new(40.0, 10.0)],
            },
        );
        assert_eq!(
            VisibilityController::render_mode(&animating),
            RenderMode::Animated
        );

        let open = step(&animating, Request::Settled(animating.generation()));
        assert_eq!(VisibilityController::render_mode(&open), RenderMode::Resting);
    }

    #[test]
    fn unmeasured_close_hides_immediately() {
        let opening = step(&TransitionState::closed("Hello"), Request::SetOpen(true));
        let closed = step(&opening, Request::SetOpen(false));
        assert!(!VisibilityController::is_visible(&closed));
    }
}
