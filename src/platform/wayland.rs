//=========================================================================
// Wayland Backend
//
// Linux windowing through wayland-client with an EGL-created OpenGL
// context. Construction walks a fixed sequence:
//
//   1. connect to the compositor named by the environment
//   2. registry roundtrip, bind wl_compositor / xdg_wm_base / wl_seat
//      (plus the decoration manager when advertised)
//   3. create the wl_surface
//   4. wrap it in an xdg_surface + xdg_toplevel, request server-side
//      decorations, set title and app id
//   5. commit and wait (bounded) for the first configure ack
//   6. EGL display + config + context
//   7. wl_egl window, EGL window surface, make current
//   8. resolve the procedure table, query the context version
//   9. request vsync (non-fatal when refused)
//
// Any failing step unwinds everything the earlier steps claimed, in
// reverse, before its error is returned.
//
// Input arrives through the seat listeners and is translated into
// normalized events before crossing the channel; nothing native leaks
// past this module.
//
//=========================================================================

use std::ffi::c_void;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use khronos_egl as egl;
use log::{debug, info, warn};
use wayland_client::protocol::{
    wl_compositor::WlCompositor,
    wl_keyboard::{self, WlKeyboard},
    wl_pointer::{self, WlPointer},
    wl_registry::{self, WlRegistry},
    wl_seat::{self, WlSeat},
    wl_surface::WlSurface,
};
use wayland_client::{delegate_noop, Connection, Dispatch, EventQueue, Proxy, QueueHandle, WEnum};
use wayland_egl::WlEglSurface;
use wayland_protocols::xdg::decoration::zv1::client::{
    zxdg_decoration_manager_v1::ZxdgDecorationManagerV1,
    zxdg_toplevel_decoration_v1::{self, ZxdgToplevelDecorationV1},
};
use wayland_protocols::xdg::shell::client::{
    xdg_surface::{self, XdgSurface},
    xdg_toplevel::{self, XdgToplevel},
    xdg_wm_base::{self, XdgWmBase},
};

use crate::core::error::SessionError;
use crate::platform::gl::{ProcTable, GL_COLOR_BUFFER_BIT};
use crate::platform::translate::{evdev_to_button, evdev_to_key};
use crate::platform::{Backend, PlatformEvent};

type EglInstance = egl::DynamicInstance<egl::EGL1_4>;

/// How long to wait for the compositor to configure the new surface
/// before construction gives up.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

//=== Listeners ===========================================================

/// Per-queue dispatch state: globals collected during the registry
/// roundtrip, the seat devices, the configure flag, and the outbound
/// event channel.
struct Listeners {
    events: Sender<PlatformEvent>,
    compositor: Option<WlCompositor>,
    wm_base: Option<XdgWmBase>,
    seat: Option<WlSeat>,
    decoration_manager: Option<ZxdgDecorationManagerV1>,
    keyboard: Option<WlKeyboard>,
    pointer: Option<WlPointer>,
    configured: bool,
}

impl Listeners {
    fn new(events: Sender<PlatformEvent>) -> Self {
        Self {
            events,
            compositor: None,
            wm_base: None,
            seat: None,
            decoration_manager: None,
            keyboard: None,
            pointer: None,
            configured: false,
        }
    }

    // Send failures mean the session is mid-teardown; events from that
    // window are meaningless by then.
    fn emit(&self, event: PlatformEvent) {
        let _ = self.events.send(event);
    }
}

//--- Registry ------------------------------------------------------------

impl Dispatch<WlRegistry, ()> for Listeners {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match interface.as_str() {
                "wl_compositor" => {
                    state.compositor =
                        Some(registry.bind::<WlCompositor, _, _>(name, version.min(4), qh, ()));
                }
                "xdg_wm_base" => {
                    state.wm_base =
                        Some(registry.bind::<XdgWmBase, _, _>(name, version.min(3), qh, ()));
                }
                "wl_seat" => {
                    state.seat =
                        Some(registry.bind::<WlSeat, _, _>(name, version.min(5), qh, ()));
                }
                "zxdg_decoration_manager_v1" => {
                    state.decoration_manager =
                        Some(registry.bind::<ZxdgDecorationManagerV1, _, _>(name, 1, qh, ()));
                }
                _ => {}
            }
        }
    }
}

//--- Shell ---------------------------------------------------------------

impl Dispatch<XdgWmBase, ()> for Listeners {
    fn event(
        _: &mut Self,
        wm_base: &XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

impl Dispatch<XdgSurface, ()> for Listeners {
    fn event(
        state: &mut Self,
        xdg_surface: &XdgSurface,
        event: xdg_surface::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            xdg_surface.ack_configure(serial);
            state.configured = true;
        }
    }
}

impl Dispatch<XdgToplevel, ()> for Listeners {
    fn event(
        state: &mut Self,
        _: &XdgToplevel,
        event: xdg_toplevel::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            // Zero means "you pick"; the surface keeps its size then.
            xdg_toplevel::Event::Configure { width, height, .. } => {
                if width > 0 && height > 0 {
                    state.emit(PlatformEvent::Resized { width, height });
                }
            }
            xdg_toplevel::Event::Close => {
                state.emit(PlatformEvent::CloseRequested);
            }
            _ => {}
        }
    }
}

//--- Seat ----------------------------------------------------------------

impl Dispatch<WlSeat, ()> for Listeners {
    fn event(
        state: &mut Self,
        seat: &WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(capabilities),
        } = event
        {
            if capabilities.contains(wl_seat::Capability::Keyboard) && state.keyboard.is_none() {
                debug!(target: "glint::platform", "seat offered a keyboard");
                state.keyboard = Some(seat.get_keyboard(qh, ()));
            }
            if capabilities.contains(wl_seat::Capability::Pointer) && state.pointer.is_none() {
                debug!(target: "glint::platform", "seat offered a pointer");
                state.pointer = Some(seat.get_pointer(qh, ()));
            }
        }
    }
}

impl Dispatch<WlKeyboard, ()> for Listeners {
    fn event(
        state: &mut Self,
        _: &WlKeyboard,
        event: wl_keyboard::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_keyboard::Event::Key {
            key,
            state: key_state,
            ..
        } = event
        {
            let pressed = matches!(key_state, WEnum::Value(wl_keyboard::KeyState::Pressed));
            state.emit(PlatformEvent::Key {
                key: evdev_to_key(key),
                pressed,
            });
        }
    }
}

impl Dispatch<WlPointer, ()> for Listeners {
    fn event(
        state: &mut Self,
        _: &WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Motion {
                surface_x,
                surface_y,
                ..
            } => {
                state.emit(PlatformEvent::PointerMoved {
                    x: surface_x,
                    y: surface_y,
                });
            }
            wl_pointer::Event::Button {
                button,
                state: button_state,
                ..
            } => {
                if let Some(button) = evdev_to_button(button) {
                    let pressed =
                        matches!(button_state, WEnum::Value(wl_pointer::ButtonState::Pressed));
                    state.emit(PlatformEvent::Button { button, pressed });
                }
            }
            wl_pointer::Event::Axis { axis, value, .. } => {
                // Axis grows toward the user; the normalized convention
                // is positive away, matching wheel deltas elsewhere.
                if axis == WEnum::Value(wl_pointer::Axis::VerticalScroll) {
                    state.emit(PlatformEvent::Scroll { delta: -value });
                }
            }
            _ => {}
        }
    }
}

//--- Event-free interfaces -----------------------------------------------

delegate_noop!(Listeners: WlCompositor);
delegate_noop!(Listeners: ZxdgDecorationManagerV1);
delegate_noop!(Listeners: ignore WlSurface);
delegate_noop!(Listeners: ignore ZxdgToplevelDecorationV1);

//=== Shell ===============================================================

/// The Wayland protocol objects making up the window. Dropping the
/// shell sends every destructor in reverse creation order and flushes
/// the connection so the compositor sees them.
struct Shell {
    connection: Connection,
    surface: WlSurface,
    wm_base: XdgWmBase,
    xdg_surface: XdgSurface,
    toplevel: XdgToplevel,
    seat: Option<WlSeat>,
    decoration: Option<ZxdgToplevelDecorationV1>,
}

impl Drop for Shell {
    fn drop(&mut self) {
        if let Some(decoration) = self.decoration.take() {
            decoration.destroy();
        }
        self.toplevel.destroy();
        self.xdg_surface.destroy();
        self.wm_base.destroy();
        // release exists from wl_seat v5; older servers clean up on
        // disconnect anyway
        if let Some(seat) = self.seat.take() {
            if seat.version() >= 5 {
                seat.release();
            }
        }
        self.surface.destroy();
        let _ = self.connection.flush();
    }
}

//=== Graphics State ======================================================

/// EGL context, surface, and resolved procedures. Fields claimed after
/// `new` are optional so a failure partway through `finish` unwinds
/// exactly what exists.
struct GfxState {
    egl: EglInstance,
    display: egl::Display,
    context: Option<egl::Context>,
    egl_window: Option<WlEglSurface>,
    surface: Option<egl::Surface>,
    procs: Option<ProcTable>,
    version: (u32, u32),
    // Kept loaded so procedure addresses resolved through it stay valid.
    _libgl: Option<libloading::Library>,
}

impl GfxState {
    /// Loads libEGL and initializes the EGL display for `connection`.
    fn new(connection: &Connection) -> Result<Self, SessionError> {
        let egl = unsafe { EglInstance::load_required() }
            .map_err(|e| SessionError::ContextCreation(format!("failed to load libEGL: {e}")))?;

        let native = connection.backend().display_ptr() as *mut c_void;
        let display = unsafe { egl.get_display(native) }.ok_or_else(|| {
            SessionError::ContextCreation("no EGL display for the wayland connection".into())
        })?;

        egl.initialize(display)
            .map_err(|e| SessionError::ContextCreation(format!("EGL initialize failed: {e}")))?;

        Ok(Self {
            egl,
            display,
            context: None,
            egl_window: None,
            surface: None,
            procs: None,
            version: (0, 0),
            _libgl: None,
        })
    }

    /// Creates the context and window surface, makes them current, and
    /// resolves the procedure table.
    fn finish(
        &mut self,
        wl_surface: &WlSurface,
        width: i32,
        height: i32,
    ) -> Result<(), SessionError> {
        let attributes = [
            egl::SURFACE_TYPE,
            egl::WINDOW_BIT,
            egl::RENDERABLE_TYPE,
            egl::OPENGL_BIT,
            egl::RED_SIZE,
            8,
            egl::GREEN_SIZE,
            8,
            egl::BLUE_SIZE,
            8,
            egl::DEPTH_SIZE,
            24,
            egl::NONE,
        ];
        let config = self
            .egl
            .choose_first_config(self.display, &attributes)
            .map_err(|e| SessionError::ContextCreation(format!("EGL config query failed: {e}")))?
            .ok_or_else(|| {
                SessionError::ContextCreation("no EGL config supports a GL window surface".into())
            })?;

        self.egl
            .bind_api(egl::OPENGL_API)
            .map_err(|e| SessionError::ContextCreation(format!("cannot bind the GL API: {e}")))?;

        let context = self
            .egl
            .create_context(self.display, config, None, &[egl::NONE])
            .map_err(|e| SessionError::ContextCreation(e.to_string()))?;
        self.context = Some(context);

        let egl_window = WlEglSurface::new(wl_surface.id(), width, height)
            .map_err(|e| SessionError::SurfaceCreation(format!("wl_egl_window: {e}")))?;
        let surface = unsafe {
            self.egl.create_window_surface(
                self.display,
                config,
                self.egl_window.insert(egl_window).ptr() as egl::NativeWindowType,
                None,
            )
        }
        .map_err(|e| SessionError::SurfaceCreation(format!("EGL window surface: {e}")))?;
        self.surface = Some(surface);

        self.egl
            .make_current(self.display, Some(surface), Some(surface), self.context)
            .map_err(|e| SessionError::ContextCreation(format!("make current failed: {e}")))?;

        if let Err(e) = self.egl.swap_interval(self.display, 1) {
            warn!(target: "glint::platform", "vsync unavailable: {e}");
        }

        let procs = self.load_procs()?;
        procs.viewport(0, 0, width, height);
        procs.clear_color(0.0, 0.0, 0.0, 1.0);
        procs.clear(GL_COLOR_BUFFER_BIT);
        self.version = procs.version()?;
        self.procs = Some(procs);

        Ok(())
    }

    // eglGetProcAddress is only guaranteed for extensions; core 1.x
    // entry points may need a dlopen of the GL library itself.
    fn load_procs(&mut self) -> Result<ProcTable, SessionError> {
        let egl = &self.egl;
        let libgl = &mut self._libgl;
        ProcTable::load(|name| {
            if let Some(address) = egl.get_proc_address(name) {
                return address as *const c_void;
            }
            if libgl.is_none() {
                *libgl = unsafe { libloading::Library::new("libGL.so.1") }.ok();
            }
            if let Some(library) = libgl {
                let mut symbol = name.as_bytes().to_vec();
                symbol.push(0);
                if let Ok(address) =
                    unsafe { library.get::<unsafe extern "system" fn()>(&symbol) }
                {
                    return *address as *const c_void;
                }
            }
            std::ptr::null()
        })
    }

    fn swap(&self) -> Result<(), SessionError> {
        let surface = self
            .surface
            .ok_or(SessionError::InvalidState("no rendering surface"))?;
        self.egl
            .swap_buffers(self.display, surface)
            .map_err(|e| SessionError::Platform(format!("buffer swap failed: {e}")))
    }
}

impl Drop for GfxState {
    fn drop(&mut self) {
        let _ = self.egl.make_current(self.display, None, None, None);
        if let Some(surface) = self.surface.take() {
            let _ = self.egl.destroy_surface(self.display, surface);
        }
        self.egl_window = None;
        if let Some(context) = self.context.take() {
            let _ = self.egl.destroy_context(self.display, context);
        }
        let _ = self.egl.terminate(self.display);
    }
}

//=== WaylandBackend ======================================================

/// Wayland + EGL realization of [`Backend`].
///
/// Field order is teardown order: graphics state releases the context
/// while the protocol objects still exist, the shell then destroys
/// them, and the connection closes last.
pub(crate) struct WaylandBackend {
    gfx: GfxState,
    shell: Shell,
    listeners: Listeners,
    queue: EventQueue<Listeners>,
    connection: Connection,
}

impl WaylandBackend {
    pub fn new(
        title: &str,
        width: i32,
        height: i32,
        events: Sender<PlatformEvent>,
    ) -> Result<Self, SessionError> {
        // 1: compositor connection
        let connection = Connection::connect_to_env()
            .map_err(|e| SessionError::DisplayConnect(e.to_string()))?;
        debug!(target: "glint::platform", "connected to the wayland compositor");

        // 2: registry roundtrip and global binding
        let mut queue = connection.new_event_queue();
        let qh = queue.handle();
        let _registry = connection.display().get_registry(&qh, ());
        let mut listeners = Listeners::new(events);
        queue
            .roundtrip(&mut listeners)
            .map_err(|e| SessionError::DisplayConnect(format!("registry roundtrip: {e}")))?;

        let compositor = listeners
            .compositor
            .take()
            .ok_or(SessionError::GlobalMissing("wl_compositor"))?;
        let wm_base = listeners
            .wm_base
            .take()
            .ok_or(SessionError::GlobalMissing("xdg_wm_base"))?;
        let seat = listeners
            .seat
            .take()
            .ok_or(SessionError::GlobalMissing("wl_seat"))?;

        // 3 + 4: surface and shell role
        let surface = compositor.create_surface(&qh, ());
        let xdg_surface = wm_base.get_xdg_surface(&surface, &qh, ());
        let toplevel = xdg_surface.get_toplevel(&qh, ());
        toplevel.set_title(title.to_owned());
        toplevel.set_app_id(title.to_owned());

        let decoration = listeners.decoration_manager.take().map(|manager| {
            let decoration = manager.get_toplevel_decoration(&toplevel, &qh, ());
            decoration.set_mode(zxdg_toplevel_decoration_v1::Mode::ServerSide);
            manager.destroy();
            decoration
        });
        if decoration.is_none() {
            debug!(target: "glint::platform", "compositor offers no server-side decorations");
        }

        surface.commit();

        let shell = Shell {
            connection: connection.clone(),
            surface,
            wm_base,
            xdg_surface,
            toplevel,
            seat: Some(seat),
            decoration,
        };

        // 5: bounded configure handshake
        let deadline = Instant::now() + HANDSHAKE_TIMEOUT;
        while !listeners.configured {
            let now = Instant::now();
            if now >= deadline {
                return Err(SessionError::HandshakeTimeout);
            }
            dispatch_once(&mut queue, &mut listeners, deadline - now)?;
        }
        debug!(target: "glint::platform", "surface configured by the compositor");

        // 6 - 9: context, surface, procedures
        let mut gfx = GfxState::new(&connection)?;
        gfx.finish(&shell.surface, width, height)?;

        info!(
            target: "glint::platform",
            "wayland session live: {}x{}, GL {}.{}",
            width, height, gfx.version.0, gfx.version.1
        );

        Ok(Self {
            gfx,
            shell,
            listeners,
            queue,
            connection,
        })
    }
}

impl Backend for WaylandBackend {
    fn pump(&mut self) -> Result<(), SessionError> {
        dispatch_once(&mut self.queue, &mut self.listeners, Duration::ZERO)
    }

    fn swap_buffers(&mut self) -> Result<(), SessionError> {
        self.gfx.swap()
    }

    fn resize_surface(&mut self, width: i32, height: i32) {
        if let Some(window) = &self.gfx.egl_window {
            window.resize(width, height, 0, 0);
        }
    }

    fn set_viewport(&mut self, width: i32, height: i32) {
        if let Some(procs) = &self.gfx.procs {
            procs.viewport(0, 0, width, height);
        }
    }

    fn gl_version(&self) -> (u32, u32) {
        self.gfx.version
    }
}

impl Drop for WaylandBackend {
    fn drop(&mut self) {
        if let Some(keyboard) = self.listeners.keyboard.take() {
            if keyboard.version() >= 3 {
                keyboard.release();
            }
        }
        if let Some(pointer) = self.listeners.pointer.take() {
            if pointer.version() >= 3 {
                pointer.release();
            }
        }
        let _ = self.connection.flush();
        debug!(target: "glint::platform", "wayland session torn down");
    }
}

//=== Dispatch Helper =====================================================

/// One non-blocking-ish dispatch pass: deliver what is queued, flush
/// our requests, wait up to `wait` for the socket to become readable,
/// then deliver whatever arrived.
fn dispatch_once(
    queue: &mut EventQueue<Listeners>,
    listeners: &mut Listeners,
    wait: Duration,
) -> Result<(), SessionError> {
    let dispatch_error = |e: wayland_client::DispatchError| {
        SessionError::Platform(format!("event dispatch failed: {e}"))
    };

    queue.dispatch_pending(listeners).map_err(dispatch_error)?;
    queue
        .flush()
        .map_err(|e| SessionError::Platform(format!("request flush failed: {e}")))?;

    // prepare_read returns None when events are already queued locally.
    if let Some(guard) = queue.prepare_read() {
        let poll_result = {
            let fd = guard.connection_fd();
            let mut fds = [rustix::event::PollFd::new(&fd, rustix::event::PollFlags::IN)];
            let timeout = wait.as_millis().min(i32::MAX as u128) as i32;
            rustix::event::poll(&mut fds, timeout)
        };

        match poll_result {
            Ok(ready) if ready > 0 => {
                guard
                    .read()
                    .map_err(|e| SessionError::Platform(format!("display read failed: {e}")))?;
            }
            Ok(_) => drop(guard),
            Err(e) => {
                drop(guard);
                return Err(SessionError::Platform(format!(
                    "poll on the display connection failed: {e}"
                )));
            }
        }

        queue.dispatch_pending(listeners).map_err(dispatch_error)?;
    }

    Ok(())
}
