//! Gesture state machine for the crop window.
//!
//! Input is a normalized pointer stream: each frame carries a phase and the
//! contacts still active after the event, in window coordinates. Mouse and
//! touch hosts both adapt to this shape (a mouse is a single contact that
//! exists between button-down and button-up).
//!
//! Output is at most one [`GestureAction`] per frame. The machine never
//! touches the transform itself; the crop session applies the action.
//!
//! ```text
//!            down(1)            down(2)
//!   Idle ─────────────▶ Panning ───────▶ Pinching
//!    ▲                    │  ▲              │
//!    │      up(0)         │  └── up(1) ─────┘
//!    └────────────────────┘      (re-baseline)
//! ```

use serde::{Deserialize, Serialize};

/// Squared displacement below which a single-contact release is a tap.
pub const TAP_THRESHOLD_SQ: f64 = 20.0;

/// One active contact in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

/// What happened to the contact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The platform aborted the gesture; no tap fires.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Idle,
    Panning,
    Pinching,
}

/// Instruction for the transform engine (or the host, for taps).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureAction {
    Pan { dx: f64, dy: f64 },
    Pinch { focal_x: f64, focal_y: f64, ratio: f64 },
    Tap { x: f64, y: f64 },
}

/// Start of a potential tap.
#[derive(Debug, Clone, Copy)]
struct TapTracker {
    start_x: f64,
    start_y: f64,
    max_dist_sq: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    state: GestureState,
    /// Last-known positions of the tracked contacts (one or two).
    contacts: Vec<PointerSample>,
    /// Distance between the two contacts at the last pinch frame.
    pinch_distance: f64,
    /// `None` once the gesture can no longer be a tap.
    tap: Option<TapTracker>,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Drop all contacts and return to `Idle` without emitting anything.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.contacts.clear();
        self.pinch_distance = 0.0;
        self.tap = None;
    }

    /// Feed one frame. `active` lists every contact still down after the
    /// event; contacts beyond the first two are ignored.
    pub fn handle(&mut self, phase: PointerPhase, active: &[PointerSample]) -> Option<GestureAction> {
        if phase == PointerPhase::Cancel {
            self.reset();
            return None;
        }

        let active = &active[..active.len().min(2)];
        match active.len() {
            0 => self.release(),
            1 => self.single(phase, active[0]),
            _ => self.double(active[0], active[1]),
        }
    }

    fn release(&mut self) -> Option<GestureAction> {
        let tap = match (self.state, self.tap.take()) {
            (GestureState::Panning, Some(tap)) if tap.max_dist_sq < TAP_THRESHOLD_SQ => {
                Some(GestureAction::Tap {
                    x: tap.start_x,
                    y: tap.start_y,
                })
            }
            _ => None,
        };
        self.reset();
        tap
    }

    fn single(&mut self, phase: PointerPhase, sample: PointerSample) -> Option<GestureAction> {
        let tracked = match self.state {
            GestureState::Panning => self.contacts.first().copied().filter(|c| c.id == sample.id),
            _ => None,
        };

        let Some(last) = tracked else {
            // New anchor: first contact, a lifted pinch finger, or a swapped id.
            if self.state == GestureState::Idle && phase == PointerPhase::Down {
                self.tap = Some(TapTracker {
                    start_x: sample.x,
                    start_y: sample.y,
                    max_dist_sq: 0.0,
                });
            } else {
                self.tap = None;
            }
            self.state = GestureState::Panning;
            self.contacts = vec![sample];
            return None;
        };

        if let Some(tap) = self.tap.as_mut() {
            let dx = sample.x - tap.start_x;
            let dy = sample.y - tap.start_y;
            tap.max_dist_sq = tap.max_dist_sq.max(dx * dx + dy * dy);
        }

        self.contacts[0] = sample;
        let dx = sample.x - last.x;
        let dy = sample.y - last.y;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(GestureAction::Pan { dx, dy })
    }

    fn double(&mut self, a: PointerSample, b: PointerSample) -> Option<GestureAction> {
        let same_pair = self.state == GestureState::Pinching
            && self.contacts.len() == 2
            && self.contacts[0].id == a.id
            && self.contacts[1].id == b.id;

        if !same_pair {
            self.state = GestureState::Pinching;
            self.tap = None;
            self.contacts = vec![a, b];
            self.pinch_distance = distance(a, b);
            return None;
        }

        let (pa, pb) = (self.contacts[0], self.contacts[1]);
        let l1 = self.pinch_distance;
        let l2 = distance(a, b);
        self.contacts = vec![a, b];
        self.pinch_distance = l2;

        if l1 <= 0.0 || l2 <= 0.0 || l1 == l2 {
            return None;
        }
        Some(GestureAction::Pinch {
            focal_x: (pa.x + pb.x) / 2.0,
            focal_y: (pa.y + pb.y) / 2.0,
            ratio: l2 / l1,
        })
    }
}

#[inline]
fn distance(a: PointerSample, b: PointerSample) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: u32, x: f64, y: f64) -> PointerSample {
        PointerSample::new(id, x, y)
    }

    /// Press at `(0, 0)`, drift through `path`, then release.
    fn single_contact_gesture(path: &[(f64, f64)]) -> Vec<GestureAction> {
        let mut m = GestureMachine::new();
        let mut out = Vec::new();
        out.extend(m.handle(PointerPhase::Down, &[p(1, 0.0, 0.0)]));
        for &(x, y) in path {
            out.extend(m.handle(PointerPhase::Move, &[p(1, x, y)]));
        }
        out.extend(m.handle(PointerPhase::Up, &[]));
        out
    }

    fn taps(actions: &[GestureAction]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, GestureAction::Tap { .. }))
            .count()
    }

    #[test]
    fn test_down_enters_panning() {
        let mut m = GestureMachine::new();
        assert_eq!(m.handle(PointerPhase::Down, &[p(1, 5.0, 5.0)]), None);
        assert_eq!(m.state(), GestureState::Panning);
    }

    #[test]
    fn test_move_emits_delta_from_last_position() {
        let mut m = GestureMachine::new();
        m.handle(PointerPhase::Down, &[p(1, 5.0, 5.0)]);
        assert_eq!(
            m.handle(PointerPhase::Move, &[p(1, 8.0, 1.0)]),
            Some(GestureAction::Pan { dx: 3.0, dy: -4.0 })
        );
        assert_eq!(
            m.handle(PointerPhase::Move, &[p(1, 10.0, 1.0)]),
            Some(GestureAction::Pan { dx: 2.0, dy: 0.0 })
        );
    }

    #[test]
    fn test_move_without_contact_is_ignored() {
        let mut m = GestureMachine::new();
        assert_eq!(m.handle(PointerPhase::Move, &[]), None);
        assert_eq!(m.state(), GestureState::Idle);
    }

    #[test]
    fn test_second_contact_enters_pinching() {
        let mut m = GestureMachine::new();
        m.handle(PointerPhase::Down, &[p(1, 0.0, 0.0)]);
        let action = m.handle(PointerPhase::Down, &[p(1, 0.0, 0.0), p(2, 10.0, 0.0)]);
        assert_eq!(action, None);
        assert_eq!(m.state(), GestureState::Pinching);
    }

    #[test]
    fn test_pinch_ratio_and_focal_point() {
        let mut m = GestureMachine::new();
        m.handle(PointerPhase::Down, &[p(1, 10.0, 10.0), p(2, 20.0, 10.0)]);
        let action = m.handle(PointerPhase::Move, &[p(1, 5.0, 10.0), p(2, 25.0, 10.0)]);
        assert_eq!(
            action,
            Some(GestureAction::Pinch {
                focal_x: 15.0,
                focal_y: 10.0,
                ratio: 2.0
            })
        );
        // Baseline updated: l1 is now 20
        let action = m.handle(PointerPhase::Move, &[p(1, 10.0, 10.0), p(2, 20.0, 10.0)]);
        assert_eq!(
            action,
            Some(GestureAction::Pinch {
                focal_x: 15.0,
                focal_y: 10.0,
                ratio: 0.5
            })
        );
    }

    #[test]
    fn test_coincident_contacts_do_not_pinch() {
        let mut m = GestureMachine::new();
        m.handle(PointerPhase::Down, &[p(1, 10.0, 10.0), p(2, 10.0, 10.0)]);
        assert_eq!(
            m.handle(PointerPhase::Move, &[p(1, 10.0, 10.0), p(2, 30.0, 10.0)]),
            None
        );
        // Next frame has a valid baseline
        assert!(matches!(
            m.handle(PointerPhase::Move, &[p(1, 10.0, 10.0), p(2, 50.0, 10.0)]),
            Some(GestureAction::Pinch { .. })
        ));
    }

    #[test]
    fn test_lift_one_finger_rebaselines_without_jump() {
        let mut m = GestureMachine::new();
        m.handle(PointerPhase::Down, &[p(1, 0.0, 0.0), p(2, 100.0, 0.0)]);
        // Finger 1 lifts; finger 2 stays at 100
        assert_eq!(m.handle(PointerPhase::Up, &[p(2, 100.0, 0.0)]), None);
        assert_eq!(m.state(), GestureState::Panning);
        assert_eq!(
            m.handle(PointerPhase::Move, &[p(2, 101.0, 0.0)]),
            Some(GestureAction::Pan { dx: 1.0, dy: 0.0 })
        );
    }

    #[test]
    fn test_all_up_returns_to_idle() {
        let mut m = GestureMachine::new();
        m.handle(PointerPhase::Down, &[p(1, 0.0, 0.0), p(2, 100.0, 0.0)]);
        m.handle(PointerPhase::Up, &[]);
        assert_eq!(m.state(), GestureState::Idle);
    }

    #[test]
    fn test_small_drag_taps() {
        let actions = single_contact_gesture(&[(1.0, 1.0), (3.0, 0.0)]);
        assert_eq!(taps(&actions), 1);
        assert_eq!(
            actions.last(),
            Some(&GestureAction::Tap { x: 0.0, y: 0.0 })
        );
        // The sub-threshold drag still panned
        assert!(actions
            .iter()
            .any(|a| matches!(a, GestureAction::Pan { .. })));
    }

    #[test]
    fn test_large_drag_does_not_tap() {
        let actions = single_contact_gesture(&[(5.0, 0.0), (10.0, 0.0)]);
        assert_eq!(taps(&actions), 0);
    }

    #[test]
    fn test_drag_out_and_back_does_not_tap() {
        let actions = single_contact_gesture(&[(10.0, 0.0), (0.0, 0.0)]);
        assert_eq!(taps(&actions), 0);
    }

    #[test]
    fn test_stationary_press_taps() {
        assert_eq!(taps(&single_contact_gesture(&[])), 1);
    }

    #[test]
    fn test_pinch_never_taps() {
        let mut m = GestureMachine::new();
        m.handle(PointerPhase::Down, &[p(1, 0.0, 0.0)]);
        m.handle(PointerPhase::Down, &[p(1, 0.0, 0.0), p(2, 1.0, 0.0)]);
        m.handle(PointerPhase::Up, &[p(1, 0.0, 0.0)]);
        assert_eq!(m.handle(PointerPhase::Up, &[]), None);
    }

    #[test]
    fn test_cancel_suppresses_tap() {
        let mut m = GestureMachine::new();
        m.handle(PointerPhase::Down, &[p(1, 0.0, 0.0)]);
        assert_eq!(m.handle(PointerPhase::Cancel, &[]), None);
        assert_eq!(m.state(), GestureState::Idle);
        assert_eq!(m.handle(PointerPhase::Up, &[]), None);
    }

    #[test]
    fn test_third_contact_ignored() {
        let mut m = GestureMachine::new();
        m.handle(
            PointerPhase::Down,
            &[p(1, 0.0, 0.0), p(2, 10.0, 0.0), p(3, 50.0, 50.0)],
        );
        assert_eq!(m.state(), GestureState::Pinching);
        let action = m.handle(
            PointerPhase::Move,
            &[p(1, 0.0, 0.0), p(2, 20.0, 0.0), p(3, 99.0, 99.0)],
        );
        assert!(matches!(action, Some(GestureAction::Pinch { ratio, .. }) if ratio == 2.0));
    }
}
