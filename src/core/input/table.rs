//=========================================================================
// Input State Table
//
// Converts the asynchronous stream of platform down/up events into
// synchronous, edge-aware query answers.
//
// Each normalized code owns one tri-state entry:
//
// ```text
//   Released --down--> Pressed --query--> Held
//      ^                  |                 |
//      +-------up---------+--------up-------+
// ```
//
// A down event only transitions `Released -> Pressed`, so duplicate
// down events without an intervening up cannot re-arm the edge. Reading
// an entry through `is_down`/`was_down` advances `Pressed -> Held` as a
// side effect, so the press transition is observed exactly once.
//
// The table also carries the pointer position (clamped to the window
// bounds; out-of-bounds reports retain the previous value) and the
// scroll accumulator (zeroed at the start of every poll).
//
//=========================================================================

use super::code::CODE_COUNT;

//=== KeyState ============================================================

/// Tri-state value of one input table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Not held down.
    Released,

    /// Held down, transition not yet observed by a query.
    Pressed,

    /// Held down, transition already observed.
    Held,
}

//=== InputTable ==========================================================

/// Fixed-size table over the normalized code space, plus pointer and
/// scroll state.
///
/// Out-of-range codes are silently dropped on update; platforms emit
/// codes outside the declared table and that is expected noise, not an
/// error. Typed rejection of `Key::Unknown` happens at the session's
/// public query boundary, not here.
pub(crate) struct InputTable {
    entries: [KeyState; CODE_COUNT],
    pointer: (f64, f64),
    bounds: (f64, f64),
    scroll: f64,
}

impl InputTable {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            entries: [KeyState::Released; CODE_COUNT],
            pointer: (0.0, 0.0),
            bounds: (width, height),
            scroll: 0.0,
        }
    }

    //--- Updates (driven by the session's poll) ---------------------------

    /// Applies a platform down/up event to the entry at `code`.
    ///
    /// Out-of-range codes are ignored. A down event is ignored unless
    /// the entry is currently `Released`; an up event always releases.
    pub fn set(&mut self, code: usize, down: bool) {
        let Some(entry) = self.entries.get_mut(code) else {
            return;
        };

        if down {
            if *entry == KeyState::Released {
                *entry = KeyState::Pressed;
            }
        } else {
            *entry = KeyState::Released;
        }
    }

    /// Records a pointer position report. Reports outside the current
    /// window bounds are discarded, retaining the previous position.
    pub fn set_pointer(&mut self, x: f64, y: f64) {
        if x < 0.0 || y < 0.0 || x > self.bounds.0 || y > self.bounds.1 {
            return;
        }
        self.pointer = (x, y);
    }

    /// Updates the window bounds used for pointer clamping.
    pub fn set_bounds(&mut self, width: f64, height: f64) {
        self.bounds = (width, height);
    }

    /// Accumulates a signed scroll delta.
    pub fn add_scroll(&mut self, delta: f64) {
        self.scroll += delta;
    }

    /// Starts a new poll: zeroes the scroll accumulator so that
    /// `scroll()` reports the delta gathered during this poll only.
    pub fn begin_poll(&mut self) {
        self.scroll = 0.0;
    }

    //--- Queries ----------------------------------------------------------

    /// Returns `true` while the entry is down (`Pressed` or `Held`).
    ///
    /// Side effect: `Pressed -> Held`, so the press edge is consumed.
    pub fn is_down(&mut self, code: usize) -> bool {
        let Some(entry) = self.entries.get_mut(code) else {
            return false;
        };

        let down = *entry != KeyState::Released;
        if *entry == KeyState::Pressed {
            *entry = KeyState::Held;
        }
        down
    }

    /// Returns `true` only on the first query observing a press.
    ///
    /// Same `Pressed -> Held` side effect as [`is_down`](Self::is_down).
    pub fn was_down(&mut self, code: usize) -> bool {
        let Some(entry) = self.entries.get_mut(code) else {
            return false;
        };

        let was = *entry == KeyState::Pressed;
        if was {
            *entry = KeyState::Held;
        }
        was
    }

    /// Current entry value without side effects.
    pub fn state(&self, code: usize) -> KeyState {
        self.entries.get(code).copied().unwrap_or(KeyState::Released)
    }

    /// Last accepted pointer position.
    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    /// Scroll delta accumulated since the last `begin_poll`.
    pub fn scroll(&self) -> f64 {
        self.scroll
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::code::{Key, MouseButton};

    fn table() -> InputTable {
        InputTable::new(800.0, 600.0)
    }

    //=====================================================================
    // Tri-State Transition Tests
    //=====================================================================

    /// was_down reports the press edge exactly once.
    #[test]
    fn was_down_true_exactly_once() {
        let mut t = table();
        let code = Key::Space.code();

        t.set(code, true);
        assert!(t.was_down(code));
        assert!(!t.was_down(code), "second query must not see the edge again");
        assert!(t.is_down(code), "key is still held");
    }

    /// is_down stays true until an up event arrives.
    #[test]
    fn is_down_until_release() {
        let mut t = table();
        let code = Key::W.code();

        t.set(code, true);
        for _ in 0..5 {
            assert!(t.is_down(code));
        }

        t.set(code, false);
        assert!(!t.is_down(code));
        assert!(!t.was_down(code));
    }

    /// A duplicate down without an intervening up cannot re-arm the edge.
    #[test]
    fn duplicate_down_does_not_rearm_edge() {
        let mut t = table();
        let code = Key::A.code();

        t.set(code, true);
        assert!(t.was_down(code));

        t.set(code, true);
        assert!(!t.was_down(code), "repeat down must not produce a new edge");
        assert_eq!(t.state(code), KeyState::Held);
    }

    /// An up event releases unconditionally, even from Held.
    #[test]
    fn up_releases_from_any_state() {
        let mut t = table();
        let code = Key::Enter.code();

        t.set(code, true);
        assert!(t.is_down(code)); // Pressed -> Held
        t.set(code, false);
        assert_eq!(t.state(code), KeyState::Released);

        // Up without a preceding down is harmless.
        t.set(code, false);
        assert_eq!(t.state(code), KeyState::Released);
    }

    /// A release followed by a fresh down produces a new edge.
    #[test]
    fn new_press_after_release_produces_new_edge() {
        let mut t = table();
        let code = Key::Q.code();

        t.set(code, true);
        assert!(t.was_down(code));
        t.set(code, false);
        t.set(code, true);
        assert!(t.was_down(code));
    }

    /// Buttons use the same entries and transition rules as keys.
    #[test]
    fn buttons_share_transition_rules() {
        let mut t = table();
        let code = MouseButton::Left.code();

        t.set(code, true);
        assert!(t.was_down(code));
        assert!(t.is_down(code));
        t.set(code, false);
        assert!(!t.is_down(code));
    }

    //=====================================================================
    // Out-Of-Range Tests
    //=====================================================================

    /// Out-of-range updates are dropped and corrupt nothing.
    #[test]
    fn out_of_range_update_does_not_corrupt_table() {
        let mut t = table();
        let in_range = Key::S.code();
        t.set(in_range, true);

        for bogus in [CODE_COUNT, CODE_COUNT + 1, usize::MAX] {
            t.set(bogus, true);
            t.set(bogus, false);
        }

        assert_eq!(t.state(in_range), KeyState::Pressed);
        assert!(t.was_down(in_range));
    }

    /// Out-of-range queries answer false without panicking.
    #[test]
    fn out_of_range_query_is_false() {
        let mut t = table();
        assert!(!t.is_down(CODE_COUNT));
        assert!(!t.was_down(usize::MAX));
        assert_eq!(t.state(CODE_COUNT), KeyState::Released);
    }

    //=====================================================================
    // Pointer Tests
    //=====================================================================

    /// In-bounds reports move the pointer.
    #[test]
    fn pointer_tracks_in_bounds_reports() {
        let mut t = table();
        t.set_pointer(100.0, 200.0);
        assert_eq!(t.pointer(), (100.0, 200.0));
    }

    /// Out-of-bounds reports retain the previous value.
    #[test]
    fn pointer_rejects_out_of_bounds_reports() {
        let mut t = table();
        t.set_pointer(100.0, 200.0);

        t.set_pointer(-1.0, 50.0);
        t.set_pointer(50.0, 601.0);
        t.set_pointer(801.0, 50.0);

        assert_eq!(t.pointer(), (100.0, 200.0));
    }

    /// Shrinking the bounds rejects reports beyond the new edge.
    #[test]
    fn pointer_respects_updated_bounds() {
        let mut t = table();
        t.set_bounds(640.0, 480.0);

        t.set_pointer(700.0, 100.0);
        assert_eq!(t.pointer(), (0.0, 0.0));

        t.set_pointer(640.0, 480.0);
        assert_eq!(t.pointer(), (640.0, 480.0));
    }

    //=====================================================================
    // Scroll Tests
    //=====================================================================

    /// Scroll deltas accumulate within one poll.
    #[test]
    fn scroll_accumulates_within_poll() {
        let mut t = table();
        t.add_scroll(1.5);
        t.add_scroll(-0.5);
        assert_eq!(t.scroll(), 1.0);
    }

    /// begin_poll zeroes the accumulator.
    #[test]
    fn scroll_resets_on_begin_poll() {
        let mut t = table();
        t.add_scroll(3.0);
        t.begin_poll();
        assert_eq!(t.scroll(), 0.0);
    }
}
