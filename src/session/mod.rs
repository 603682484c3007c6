//=========================================================================
// Session Facade
//
// The one public entry point: a session owns the platform window, the
// GL context, the input state table, and the frame clock, and exposes
// them through a polled API.
//
// Lifecycle:
//
// ```text
//   create --> [update | queries | present]* --> Drop
//                 |
//                 +-- CloseRequested --> !is_alive (present refused)
// ```
//
// Construction order is fixed: validate the configuration, claim the
// process-wide instance slot, build the platform backend, start the
// clock. Teardown happens in reverse through Drop, so a half-built
// session unwinds exactly what it claimed.
//
// `update` is the only place platform events are observed: it ticks
// the clock, pumps the backend, and drains the event channel into the
// input table. Everything else answers from state gathered there.
//
//=========================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info};

use crate::core::config::{ResizeCallback, SessionConfig};
use crate::core::error::SessionError;
use crate::core::input::code::{Key, MouseButton};
use crate::core::input::table::InputTable;
use crate::core::input::KeyState;
use crate::core::timing::Clock;
use crate::platform::{Backend, NativeBackend, PlatformEvent};

//=== Instance Guard ======================================================

static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Holds the process-wide "a session exists" claim; releases it on drop.
///
/// Both backends assume exactly one window per process (one window
/// class, one EGL display binding), so a second live session is refused
/// at construction.
struct InstanceGuard;

impl InstanceGuard {
    fn claim() -> Result<Self, SessionError> {
        if SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::AlreadyActive);
        }
        Ok(Self)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        SESSION_ACTIVE.store(false, Ordering::Release);
    }
}

//=== SessionInner ========================================================

/// The session state machine, generic over the backend so the whole
/// lifecycle is exercisable without a windowing system.
struct SessionInner<B: Backend> {
    title: String,
    width: u32,
    height: u32,
    alive: bool,
    clock: Clock,
    input: InputTable,
    events: Receiver<PlatformEvent>,
    on_resize: Option<ResizeCallback>,
    // Backend before guard: the window must be gone before the
    // instance slot frees up for the next session.
    backend: B,
    _guard: InstanceGuard,
}

impl<B: Backend> SessionInner<B> {
    fn create<F>(config: SessionConfig, backend: F) -> Result<Self, SessionError>
    where
        F: FnOnce(Sender<PlatformEvent>) -> Result<B, SessionError>,
    {
        config.validate()?;
        let guard = InstanceGuard::claim()?;

        let (sender, receiver) = crossbeam_channel::unbounded();
        let backend = backend(sender)?;

        info!(
            target: "glint::session",
            "session '{}' created at {}x{}", config.title, config.width, config.height
        );

        Ok(Self {
            input: InputTable::new(f64::from(config.width), f64::from(config.height)),
            title: config.title,
            width: config.width,
            height: config.height,
            alive: true,
            clock: Clock::new(),
            events: receiver,
            on_resize: config.on_resize,
            backend,
            _guard: guard,
        })
    }

    //--- Per-frame operations ---------------------------------------------

    fn update(&mut self) -> Result<(), SessionError> {
        self.clock.tick();
        self.input.begin_poll();
        self.backend.pump()?;

        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), SessionError> {
        if !self.alive {
            return Err(SessionError::InvalidState(
                "present refused after close was requested",
            ));
        }
        self.backend.swap_buffers()
    }

    fn apply(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Key { key, pressed } => {
                if key != Key::Unknown {
                    self.input.set(key.code(), pressed);
                }
            }
            PlatformEvent::Button { button, pressed } => {
                self.input.set(button.code(), pressed);
            }
            PlatformEvent::PointerMoved { x, y } => {
                self.input.set_pointer(x, y);
            }
            PlatformEvent::Scroll { delta } => {
                self.input.add_scroll(delta);
            }
            PlatformEvent::Resized { width, height } => {
                self.resize(width, height);
            }
            PlatformEvent::CloseRequested => {
                info!(target: "glint::session", "close requested for '{}'", self.title);
                self.alive = false;
            }
        }
    }

    // Compositors occasionally report degenerate sizes mid-teardown;
    // those must not shrink the surface to nothing.
    fn resize(&mut self, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }

        debug!(target: "glint::session", "resized to {width}x{height}");
        self.width = width as u32;
        self.height = height as u32;
        self.input.set_bounds(f64::from(width), f64::from(height));
        self.backend.resize_surface(width, height);

        match &mut self.on_resize {
            Some(callback) => callback(self.width, self.height),
            None => self.backend.set_viewport(width, height),
        }
    }

    //--- Input queries ----------------------------------------------------

    fn is_key_down(&mut self, key: Key) -> bool {
        key != Key::Unknown && self.input.is_down(key.code())
    }

    fn was_key_pressed(&mut self, key: Key) -> bool {
        key != Key::Unknown && self.input.was_down(key.code())
    }

    fn key_state(&self, key: Key) -> KeyState {
        if key == Key::Unknown {
            return KeyState::Released;
        }
        self.input.state(key.code())
    }

    fn is_button_down(&mut self, button: MouseButton) -> bool {
        self.input.is_down(button.code())
    }

    fn was_button_pressed(&mut self, button: MouseButton) -> bool {
        self.input.was_down(button.code())
    }
}

//=== Session =============================================================

/// A live window with an OpenGL context, polled input, and frame
/// timing.
///
/// At most one session exists per process. Dropping it releases every
/// platform resource and frees the slot for a successor.
///
/// ```no_run
/// use glint::{Key, Session, SessionConfig};
///
/// let mut session = Session::create(SessionConfig::new("demo").with_size(1280, 720))?;
/// while session.is_alive() {
///     session.update()?;
///     if session.was_key_pressed(Key::Escape) {
///         break;
///     }
///     // ... draw ...
///     session.present()?;
/// }
/// # Ok::<(), glint::SessionError>(())
/// ```
pub struct Session {
    inner: SessionInner<NativeBackend>,
}

impl Session {
    /// Opens the window, creates the GL context, and makes it current.
    ///
    /// Fails without side effects when the configuration is invalid or
    /// another session is live; platform failures unwind every resource
    /// claimed by the completed construction steps.
    pub fn create(config: SessionConfig) -> Result<Self, SessionError> {
        let title = config.title.clone();
        let (width, height) = (config.width as i32, config.height as i32);
        let inner = SessionInner::create(config, |events| {
            NativeBackend::new(&title, width, height, events)
        })?;
        Ok(Self { inner })
    }

    /// Polls the platform: advances the clock, pumps native events, and
    /// folds them into the input state. Call once per frame.
    pub fn update(&mut self) -> Result<(), SessionError> {
        self.inner.update()
    }

    /// Presents the back buffer. Refused once close has been requested.
    pub fn present(&mut self) -> Result<(), SessionError> {
        self.inner.present()
    }

    //--- State queries ----------------------------------------------------

    /// `false` once the user has requested the window to close.
    pub fn is_alive(&self) -> bool {
        self.inner.alive
    }

    /// Current client-area width in pixels.
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Current client-area height in pixels.
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// The title the session was created with.
    pub fn title(&self) -> &str {
        &self.inner.title
    }

    /// The (major, minor) version of the created OpenGL context.
    pub fn gl_version(&self) -> (u32, u32) {
        self.inner.backend.gl_version()
    }

    //--- Timing queries ---------------------------------------------------

    /// Seconds since the session was created.
    pub fn elapsed(&self) -> f64 {
        self.inner.clock.elapsed()
    }

    /// Seconds between the two most recent `update` calls.
    pub fn delta(&self) -> f64 {
        self.inner.clock.delta()
    }

    /// Frames per second derived from the last delta; 0 before the
    /// first update.
    pub fn fps(&self) -> f64 {
        self.inner.clock.fps()
    }

    //--- Input queries ----------------------------------------------------

    /// `true` while `key` is held down. `Key::Unknown` is always up.
    pub fn is_key_down(&mut self, key: Key) -> bool {
        self.inner.is_key_down(key)
    }

    /// `true` exactly once per press of `key`.
    pub fn was_key_pressed(&mut self, key: Key) -> bool {
        self.inner.was_key_pressed(key)
    }

    /// Current state of `key`, without consuming the press edge.
    pub fn key_state(&self, key: Key) -> KeyState {
        self.inner.key_state(key)
    }

    /// `true` while `button` is held down.
    pub fn is_button_down(&mut self, button: MouseButton) -> bool {
        self.inner.is_button_down(button)
    }

    /// `true` exactly once per press of `button`.
    pub fn was_button_pressed(&mut self, button: MouseButton) -> bool {
        self.inner.was_button_pressed(button)
    }

    /// Last known pointer position in client-area pixels.
    pub fn pointer(&self) -> (f64, f64) {
        self.inner.input.pointer()
    }

    /// Scroll delta gathered by the most recent `update`.
    pub fn scroll_delta(&self) -> f64 {
        self.inner.input.scroll()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::sync::{Mutex, MutexGuard};

    use super::*;

    // The instance slot is process-wide, so session tests may not
    // overlap. A poisoned lock just means another test failed.
    static SERIAL: Mutex<()> = Mutex::new(());

    fn serialize() -> MutexGuard<'static, ()> {
        SERIAL.lock().unwrap_or_else(|e| e.into_inner())
    }

    //--- Mock backend -----------------------------------------------------

    /// What the mock observed, shared with the test body.
    #[derive(Default)]
    struct MockLog {
        pumps: usize,
        swaps: usize,
        resizes: Vec<(i32, i32)>,
        viewports: Vec<(i32, i32)>,
        fail_pump: bool,
    }

    /// Scripted backend: each pump emits the next batch of events.
    struct MockBackend {
        events: Sender<PlatformEvent>,
        batches: VecDeque<Vec<PlatformEvent>>,
        log: Rc<RefCell<MockLog>>,
    }

    impl Backend for MockBackend {
        fn pump(&mut self) -> Result<(), SessionError> {
            let mut log = self.log.borrow_mut();
            log.pumps += 1;
            if log.fail_pump {
                return Err(SessionError::Platform("scripted pump failure".into()));
            }
            drop(log);

            if let Some(batch) = self.batches.pop_front() {
                for event in batch {
                    self.events.send(event).unwrap();
                }
            }
            Ok(())
        }

        fn swap_buffers(&mut self) -> Result<(), SessionError> {
            self.log.borrow_mut().swaps += 1;
            Ok(())
        }

        fn resize_surface(&mut self, width: i32, height: i32) {
            self.log.borrow_mut().resizes.push((width, height));
        }

        fn set_viewport(&mut self, width: i32, height: i32) {
            self.log.borrow_mut().viewports.push((width, height));
        }

        fn gl_version(&self) -> (u32, u32) {
            (4, 6)
        }
    }

    fn session_with(
        config: SessionConfig,
        batches: Vec<Vec<PlatformEvent>>,
    ) -> (SessionInner<MockBackend>, Rc<RefCell<MockLog>>) {
        let log = Rc::new(RefCell::new(MockLog::default()));
        let backend_log = Rc::clone(&log);
        let session = SessionInner::create(config, move |events| {
            Ok(MockBackend {
                events,
                batches: batches.into(),
                log: backend_log,
            })
        })
        .unwrap();
        (session, log)
    }

    fn basic() -> SessionConfig {
        SessionConfig::new("mock").with_size(800, 600)
    }

    fn key(key: Key, pressed: bool) -> PlatformEvent {
        PlatformEvent::Key { key, pressed }
    }

    //=====================================================================
    // Construction Tests
    //=====================================================================

    /// Invalid configurations are refused before the backend exists.
    #[test]
    fn invalid_config_refused_before_backend_runs() {
        let _lock = serialize();

        let result = SessionInner::<MockBackend>::create(SessionConfig::new(""), |_| {
            panic!("backend must not be built for an invalid config")
        });
        assert!(matches!(result, Err(SessionError::InvalidTitle)));
    }

    /// A refused configuration does not claim the instance slot.
    #[test]
    fn failed_create_leaves_instance_slot_free() {
        let _lock = serialize();

        let bad = SessionConfig::new("mock").with_size(0, 0);
        assert!(SessionInner::<MockBackend>::create(bad, |_| unreachable!()).is_err());

        let (session, _) = session_with(basic(), vec![]);
        assert!(session.alive);
    }

    /// A backend construction failure frees the slot for a retry.
    #[test]
    fn backend_failure_frees_instance_slot() {
        let _lock = serialize();

        let result = SessionInner::<MockBackend>::create(basic(), |_| {
            Err(SessionError::DisplayConnect("scripted".into()))
        });
        assert!(matches!(result, Err(SessionError::DisplayConnect(_))));

        let (session, _) = session_with(basic(), vec![]);
        assert!(session.alive);
    }

    /// Only one session may be live at a time; dropping it frees the slot.
    #[test]
    fn second_session_refused_until_first_drops() {
        let _lock = serialize();

        let (first, _) = session_with(basic(), vec![]);

        let result = SessionInner::<MockBackend>::create(basic(), |_| unreachable!());
        assert!(matches!(result, Err(SessionError::AlreadyActive)));

        drop(first);
        let (second, _) = session_with(basic(), vec![]);
        assert!(second.alive);
    }

    //=====================================================================
    // Update / Event Flow Tests
    //=====================================================================

    /// Events pumped by the backend become visible to queries after
    /// update, with the press edge observed exactly once.
    #[test]
    fn update_folds_events_into_input_state() {
        let _lock = serialize();
        let (mut session, log) =
            session_with(basic(), vec![vec![key(Key::Space, true)]]);

        assert!(!session.is_key_down(Key::Space), "nothing before update");

        session.update().unwrap();
        assert_eq!(log.borrow().pumps, 1);
        assert!(session.was_key_pressed(Key::Space));
        assert!(!session.was_key_pressed(Key::Space));
        assert!(session.is_key_down(Key::Space));
    }

    /// A press in one poll and a release in the next behave like the
    /// table promises across update boundaries.
    #[test]
    fn press_and_release_across_polls() {
        let _lock = serialize();
        let (mut session, _) = session_with(
            basic(),
            vec![vec![key(Key::W, true)], vec![key(Key::W, false)]],
        );

        session.update().unwrap();
        assert!(session.is_key_down(Key::W));

        session.update().unwrap();
        assert!(!session.is_key_down(Key::W));
        assert_eq!(session.key_state(Key::W), KeyState::Released);
    }

    /// Unknown keys never reach the table or answer queries.
    #[test]
    fn unknown_keys_are_dropped() {
        let _lock = serialize();
        let (mut session, _) =
            session_with(basic(), vec![vec![key(Key::Unknown, true)]]);

        session.update().unwrap();
        assert!(!session.is_key_down(Key::Unknown));
        assert!(!session.was_key_pressed(Key::Unknown));
        assert_eq!(session.key_state(Key::Unknown), KeyState::Released);
    }

    /// Buttons flow through the same pipeline as keys.
    #[test]
    fn buttons_flow_through_update() {
        let _lock = serialize();
        let (mut session, _) = session_with(
            basic(),
            vec![vec![PlatformEvent::Button {
                button: MouseButton::Left,
                pressed: true,
            }]],
        );

        session.update().unwrap();
        assert!(session.was_button_pressed(MouseButton::Left));
        assert!(session.is_button_down(MouseButton::Left));
    }

    /// A pump failure surfaces from update.
    #[test]
    fn pump_failure_propagates() {
        let _lock = serialize();
        let (mut session, log) = session_with(basic(), vec![]);

        log.borrow_mut().fail_pump = true;
        assert!(matches!(
            session.update(),
            Err(SessionError::Platform(_))
        ));
    }

    //=====================================================================
    // Pointer / Scroll Tests
    //=====================================================================

    /// Pointer reports land in queries; out-of-bounds reports are kept
    /// out.
    #[test]
    fn pointer_reports_respect_bounds() {
        let _lock = serialize();
        let (mut session, _) = session_with(
            basic(),
            vec![vec![
                PlatformEvent::PointerMoved { x: 10.0, y: 20.0 },
                PlatformEvent::PointerMoved { x: 900.0, y: 20.0 },
            ]],
        );

        session.update().unwrap();
        assert_eq!(session.input.pointer(), (10.0, 20.0));
    }

    /// Scroll is a per-poll delta: gathered in one update, gone by the
    /// next.
    #[test]
    fn scroll_delta_is_per_poll() {
        let _lock = serialize();
        let (mut session, _) = session_with(
            basic(),
            vec![
                vec![
                    PlatformEvent::Scroll { delta: 1.0 },
                    PlatformEvent::Scroll { delta: 0.5 },
                ],
                vec![],
            ],
        );

        session.update().unwrap();
        assert_eq!(session.input.scroll(), 1.5);

        session.update().unwrap();
        assert_eq!(session.input.scroll(), 0.0);
    }

    //=====================================================================
    // Resize Tests
    //=====================================================================

    /// Without a callback, a resize updates the dimensions, the surface,
    /// and the viewport.
    #[test]
    fn resize_defaults_to_viewport_update() {
        let _lock = serialize();
        let (mut session, log) = session_with(
            basic(),
            vec![vec![PlatformEvent::Resized {
                width: 1024,
                height: 768,
            }]],
        );

        session.update().unwrap();
        assert_eq!((session.width, session.height), (1024, 768));
        assert_eq!(log.borrow().resizes, vec![(1024, 768)]);
        assert_eq!(log.borrow().viewports, vec![(1024, 768)]);
    }

    /// With a callback bound, the callback runs instead of the default
    /// viewport update.
    #[test]
    fn resize_callback_replaces_viewport_update() {
        let _lock = serialize();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let config = basic().with_resize(move |w, h| sink.borrow_mut().push((w, h)));

        let (mut session, log) = session_with(
            config,
            vec![vec![PlatformEvent::Resized {
                width: 640,
                height: 480,
            }]],
        );

        session.update().unwrap();
        assert_eq!(*seen.borrow(), vec![(640, 480)]);
        assert!(log.borrow().viewports.is_empty());
        assert_eq!(log.borrow().resizes, vec![(640, 480)]);
    }

    /// Degenerate sizes are ignored wholesale.
    #[test]
    fn non_positive_resize_is_ignored() {
        let _lock = serialize();
        let (mut session, log) = session_with(
            basic(),
            vec![vec![
                PlatformEvent::Resized { width: 0, height: 400 },
                PlatformEvent::Resized { width: 400, height: -1 },
            ]],
        );

        session.update().unwrap();
        assert_eq!((session.width, session.height), (800, 600));
        assert!(log.borrow().resizes.is_empty());
    }

    /// Growing the window widens the pointer bounds in the same poll.
    #[test]
    fn resize_widens_pointer_bounds() {
        let _lock = serialize();
        let (mut session, _) = session_with(
            basic(),
            vec![vec![
                PlatformEvent::Resized {
                    width: 1920,
                    height: 1080,
                },
                PlatformEvent::PointerMoved { x: 1500.0, y: 900.0 },
            ]],
        );

        session.update().unwrap();
        assert_eq!(session.input.pointer(), (1500.0, 900.0));
    }

    //=====================================================================
    // Close / Present Tests
    //=====================================================================

    /// A close request flips is_alive and refuses present, but leaves
    /// queries working.
    #[test]
    fn close_request_ends_the_session() {
        let _lock = serialize();
        let (mut session, log) = session_with(
            basic(),
            vec![vec![key(Key::Escape, true), PlatformEvent::CloseRequested]],
        );

        assert!(session.present().is_ok());
        session.update().unwrap();

        assert!(!session.alive);
        assert!(matches!(
            session.present(),
            Err(SessionError::InvalidState(_))
        ));
        assert_eq!(log.borrow().swaps, 1, "no swap after close");
        assert!(session.is_key_down(Key::Escape), "queries still answer");
    }

    /// Present swaps buffers while the session is alive.
    #[test]
    fn present_swaps_while_alive() {
        let _lock = serialize();
        let (mut session, log) = session_with(basic(), vec![vec![], vec![]]);

        session.update().unwrap();
        session.present().unwrap();
        session.update().unwrap();
        session.present().unwrap();

        assert_eq!(log.borrow().swaps, 2);
    }

    //=====================================================================
    // Timing Tests
    //=====================================================================

    /// The clock only advances through update.
    #[test]
    fn clock_advances_with_update() {
        let _lock = serialize();
        let (mut session, _) = session_with(basic(), vec![vec![], vec![]]);

        assert_eq!(session.clock.delta(), 0.0);
        std::thread::sleep(std::time::Duration::from_millis(2));
        session.update().unwrap();

        assert!(session.clock.delta() > 0.0);
        assert!(session.clock.fps() > 0.0);
        assert!(session.clock.elapsed() >= session.clock.delta());
    }
}
