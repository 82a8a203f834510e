use eframe::egui::{Pos2, Rect};

use crate::geometry::{percent_delta, Anchor, BoxGeometry};

/// Pointer travel beyond this many pixels turns a press-release pair on a
/// link box into a drag instead of a navigation click.
pub const CLICK_SLOP_PX: f32 = 5.0;

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Body,
    Handle(Anchor),
}

/// Transient per-box gesture state. Exists only between pointer-down and
/// pointer-up; the only way out of an active state is releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Dragging {
        start_pointer: Pos2,
        start: BoxGeometry,
    },
    Resizing {
        start_pointer: Pos2,
        start: BoxGeometry,
        anchor: Anchor,
    },
}

impl InteractionState {
    pub fn is_active(&self) -> bool {
        !matches!(self, InteractionState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::Dragging { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, InteractionState::Resizing { .. })
    }

    /// Enter Dragging or Resizing from Idle. A press on a handle must win
    /// over the body drag, so an already-active state is never replaced.
    pub fn pointer_down(&mut self, pointer: Pos2, target: HitTarget, geometry: BoxGeometry) {
        if self.is_active() {
            return;
        }
        *self = match target {
            HitTarget::Body => InteractionState::Dragging {
                start_pointer: pointer,
                start: geometry,
            },
            HitTarget::Handle(anchor) => InteractionState::Resizing {
                start_pointer: pointer,
                start: geometry,
                anchor,
            },
        };
    }

    /// Geometry for the current pointer position, or `None` when idle.
    pub fn pointer_moved(&self, pointer: Pos2, canvas: Rect) -> Option<BoxGeometry> {
        match *self {
            InteractionState::Idle => None,
            InteractionState::Dragging {
                start_pointer,
                start,
            } => Some(start.dragged(percent_delta(start_pointer, pointer, canvas))),
            InteractionState::Resizing {
                start_pointer,
                start,
                anchor,
            } => Some(start.resized(anchor, percent_delta(start_pointer, pointer, canvas))),
        }
    }

    /// Return to Idle. `true` when an interaction actually ended, which is
    /// the moment the box geometry should be persisted.
    pub fn pointer_up(&mut self) -> bool {
        let was_active = self.is_active();
        *self = InteractionState::Idle;
        was_active
    }
}

/// Whether a link click should be suppressed: the pointer travelled more
/// than [`CLICK_SLOP_PX`] between press and release.
pub fn suppresses_click(press: Pos2, release: Pos2) -> bool {
    press.distance(release) > CLICK_SLOP_PX
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(1000.0, 1000.0))
    }

    fn geometry() -> BoxGeometry {
        BoxGeometry::new(10.0, 10.0, 20.0, 10.0)
    }

    #[test]
    fn body_press_enters_dragging() {
        let mut state = InteractionState::Idle;
        state.pointer_down(pos2(150.0, 150.0), HitTarget::Body, geometry());
        assert!(state.is_dragging());

        let moved = state.pointer_moved(pos2(250.0, 150.0), canvas()).unwrap();
        assert_eq!(moved.left, 20.0);
        assert_eq!(moved.top, 10.0);

        assert!(state.pointer_up());
        assert_eq!(state, InteractionState::Idle);
    }

    #[test]
    fn handle_press_enters_resizing_not_dragging() {
        let mut state = InteractionState::Idle;
        state.pointer_down(
            pos2(300.0, 200.0),
            HitTarget::Handle(Anchor::Se),
            geometry(),
        );
        assert!(state.is_resizing());

        // A body press arriving while the resize is active is ignored.
        state.pointer_down(pos2(300.0, 200.0), HitTarget::Body, geometry());
        assert!(state.is_resizing());

        let resized = state.pointer_moved(pos2(260.0, 170.0), canvas()).unwrap();
        assert_eq!(resized, BoxGeometry::new(10.0, 10.0, 16.0, 7.0));
    }

    #[test]
    fn idle_ignores_moves_and_reports_no_interaction_end() {
        let mut state = InteractionState::Idle;
        assert!(state.pointer_moved(pos2(5.0, 5.0), canvas()).is_none());
        assert!(!state.pointer_up());
    }

    #[test]
    fn release_is_the_only_exit() {
        let mut state = InteractionState::Idle;
        state.pointer_down(pos2(0.0, 0.0), HitTarget::Body, geometry());
        // Moves keep the state active no matter how far the pointer goes.
        for step in 0..20 {
            let _ = state.pointer_moved(pos2(step as f32 * 100.0, 0.0), canvas());
            assert!(state.is_active());
        }
        assert!(state.pointer_up());
        assert!(!state.is_active());
    }

    #[test]
    fn click_suppression_boundary() {
        let press = pos2(100.0, 100.0);
        assert!(!suppresses_click(press, pos2(100.0, 100.0)));
        assert!(!suppresses_click(press, pos2(103.0, 104.0))); // exactly 5 px
        assert!(suppresses_click(press, pos2(104.0, 104.0)));
        assert!(suppresses_click(press, pos2(100.0, 106.0)));
    }
}
