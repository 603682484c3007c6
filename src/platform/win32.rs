//=========================================================================
// Win32 Backend
//
// Windows windowing through the raw Win32 API with a WGL-created
// OpenGL context. Construction order:
//
//   1. register the window class
//   2. create the window, with the event channel threaded through
//      lpCreateParams into the window's user data slot
//   3. device context + pixel format
//   4. legacy WGL context, made current
//   5. resolve the procedure table, query the driver's version
//   6. ask wglCreateContextAttribsARB for a context of that version,
//      falling back to the legacy context when the extension is absent
//   7. request vsync (non-fatal when refused)
//
// A failing step unwinds what exists via Drop on the partially built
// backend.
//
// The window procedure translates messages into normalized events and
// sends them through the channel; WM_CLOSE is forwarded rather than
// acted on, so the application decides when the session actually ends.
//
//=========================================================================

use std::ffi::c_void;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use windows_sys::Win32::Foundation::{
    FreeLibrary, HINSTANCE, HMODULE, HWND, LPARAM, LRESULT, RECT, WPARAM,
};
use windows_sys::Win32::Graphics::Gdi::{GetDC, ReleaseDC, HDC};
use windows_sys::Win32::Graphics::OpenGL::{
    wglCreateContext, wglDeleteContext, wglGetProcAddress, wglMakeCurrent, ChoosePixelFormat,
    SetPixelFormat, SwapBuffers, HGLRC, PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW, PFD_MAIN_PLANE,
    PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR,
};
use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress, LoadLibraryW};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, LoadCursorW, PeekMessageW,
    RegisterClassW, SetWindowLongPtrW, ShowWindow, TranslateMessage, UnregisterClassW,
    AdjustWindowRect, GetWindowLongPtrW, CREATESTRUCTW, CS_OWNDC, CW_USEDEFAULT, GWLP_USERDATA,
    IDC_ARROW, MSG, PM_REMOVE, SW_SHOW, WM_CLOSE, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_NCCREATE,
    WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SIZE, WM_SYSKEYDOWN, WM_SYSKEYUP, WNDCLASSW,
    WS_OVERLAPPEDWINDOW,
};

use crate::core::error::SessionError;
use crate::core::input::code::MouseButton;
use crate::platform::gl::{ProcTable, GL_COLOR_BUFFER_BIT};
use crate::platform::translate::vk_to_key;
use crate::platform::{Backend, PlatformEvent};

const CLASS_NAME: &str = "glint_window";

// WGL_ARB_create_context attribute names.
const WGL_CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
const WGL_CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;
const WGL_CONTEXT_PROFILE_MASK_ARB: i32 = 0x9126;
const WGL_CONTEXT_CORE_PROFILE_BIT_ARB: i32 = 0x0001;

type CreateContextAttribsFn = unsafe extern "system" fn(HDC, HGLRC, *const i32) -> HGLRC;
type SwapIntervalFn = unsafe extern "system" fn(i32) -> i32;

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

//=== Win32Backend ========================================================

/// Win32 + WGL realization of [`Backend`].
pub(crate) struct Win32Backend {
    hinstance: HINSTANCE,
    class_name: Vec<u16>,
    class_registered: bool,
    hwnd: HWND,
    hdc: HDC,
    context: HGLRC,
    opengl32: HMODULE,
    procs: Option<ProcTable>,
    version: (u32, u32),
    // Owned by the window's user data slot until Drop reclaims it.
    events: *mut Sender<PlatformEvent>,
}

impl Win32Backend {
    pub fn new(
        title: &str,
        width: i32,
        height: i32,
        events: Sender<PlatformEvent>,
    ) -> Result<Self, SessionError> {
        let hinstance = unsafe { GetModuleHandleW(std::ptr::null()) };

        let mut backend = Self {
            hinstance,
            class_name: wide(CLASS_NAME),
            class_registered: false,
            hwnd: std::ptr::null_mut(),
            hdc: std::ptr::null_mut(),
            context: std::ptr::null_mut(),
            opengl32: std::ptr::null_mut(),
            procs: None,
            version: (0, 0),
            events: Box::into_raw(Box::new(events)),
        };

        backend.create_window(title, width, height)?;
        backend.create_context(width, height)?;

        unsafe { ShowWindow(backend.hwnd, SW_SHOW) };
        info!(
            target: "glint::platform",
            "win32 session live: {}x{}, GL {}.{}",
            width, height, backend.version.0, backend.version.1
        );
        Ok(backend)
    }

    // Steps 1 and 2: class, window, user data wiring.
    fn create_window(&mut self, title: &str, width: i32, height: i32) -> Result<(), SessionError> {
        let class = WNDCLASSW {
            style: CS_OWNDC,
            lpfnWndProc: Some(wndproc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: self.hinstance,
            hIcon: std::ptr::null_mut(),
            hCursor: unsafe { LoadCursorW(std::ptr::null_mut(), IDC_ARROW) },
            hbrBackground: std::ptr::null_mut(),
            lpszMenuName: std::ptr::null(),
            lpszClassName: self.class_name.as_ptr(),
        };
        if unsafe { RegisterClassW(&class) } == 0 {
            return Err(SessionError::SurfaceCreation(
                "window class registration failed".into(),
            ));
        }
        self.class_registered = true;

        // Requested size is the client area, not the outer frame.
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        };
        unsafe { AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, 0) };

        let title = wide(title);
        let hwnd = unsafe {
            CreateWindowExW(
                0,
                self.class_name.as_ptr(),
                title.as_ptr(),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                rect.right - rect.left,
                rect.bottom - rect.top,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                self.hinstance,
                self.events as *const c_void,
            )
        };
        if hwnd.is_null() {
            return Err(SessionError::SurfaceCreation("window creation failed".into()));
        }
        self.hwnd = hwnd;
        debug!(target: "glint::platform", "window created");
        Ok(())
    }

    // Steps 3 through 7.
    fn create_context(&mut self, width: i32, height: i32) -> Result<(), SessionError> {
        let hdc = unsafe { GetDC(self.hwnd) };
        if hdc.is_null() {
            return Err(SessionError::ContextCreation("no device context".into()));
        }
        self.hdc = hdc;

        let mut descriptor: PIXELFORMATDESCRIPTOR = unsafe { std::mem::zeroed() };
        descriptor.nSize = std::mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16;
        descriptor.nVersion = 1;
        descriptor.dwFlags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL | PFD_DOUBLEBUFFER;
        descriptor.iPixelType = PFD_TYPE_RGBA;
        descriptor.cColorBits = 32;
        descriptor.cDepthBits = 24;
        descriptor.iLayerType = PFD_MAIN_PLANE;

        let format = unsafe { ChoosePixelFormat(hdc, &descriptor) };
        if format == 0 || unsafe { SetPixelFormat(hdc, format, &descriptor) } == 0 {
            return Err(SessionError::ContextCreation(
                "no usable pixel format".into(),
            ));
        }

        // A legacy context must exist before any WGL extension can be
        // queried.
        let legacy = unsafe { wglCreateContext(hdc) };
        if legacy.is_null() {
            return Err(SessionError::ContextCreation(
                "legacy context creation failed".into(),
            ));
        }
        self.context = legacy;
        if unsafe { wglMakeCurrent(hdc, legacy) } == 0 {
            return Err(SessionError::ContextCreation("make current failed".into()));
        }

        self.opengl32 = unsafe { LoadLibraryW(wide("opengl32.dll").as_ptr()) };
        let opengl32 = self.opengl32;
        let procs = ProcTable::load(|name| resolve_gl_proc(opengl32, name))?;
        self.version = procs.version()?;

        // Recreate at the version the driver reported, when the ARB
        // extension is there to ask with.
        if let Some(create) = wgl_extension::<CreateContextAttribsFn>("wglCreateContextAttribsARB")
        {
            let attribs = [
                WGL_CONTEXT_MAJOR_VERSION_ARB,
                self.version.0 as i32,
                WGL_CONTEXT_MINOR_VERSION_ARB,
                self.version.1 as i32,
                WGL_CONTEXT_PROFILE_MASK_ARB,
                WGL_CONTEXT_CORE_PROFILE_BIT_ARB,
                0,
            ];
            let modern = unsafe { create(hdc, std::ptr::null_mut(), attribs.as_ptr()) };
            if !modern.is_null() {
                if unsafe { wglMakeCurrent(hdc, modern) } != 0 {
                    unsafe { wglDeleteContext(legacy) };
                    self.context = modern;
                } else {
                    unsafe {
                        wglDeleteContext(modern);
                        wglMakeCurrent(hdc, legacy);
                    }
                }
            }
        } else {
            debug!(target: "glint::platform", "wglCreateContextAttribsARB unavailable, keeping the legacy context");
        }

        match wgl_extension::<SwapIntervalFn>("wglSwapIntervalEXT") {
            Some(swap_interval) => {
                if unsafe { swap_interval(1) } == 0 {
                    warn!(target: "glint::platform", "vsync request refused");
                }
            }
            None => warn!(target: "glint::platform", "vsync unavailable"),
        }

        procs.viewport(0, 0, width, height);
        procs.clear_color(0.0, 0.0, 0.0, 1.0);
        procs.clear(GL_COLOR_BUFFER_BIT);
        self.procs = Some(procs);
        Ok(())
    }
}

impl Backend for Win32Backend {
    fn pump(&mut self) -> Result<(), SessionError> {
        let mut message: MSG = unsafe { std::mem::zeroed() };
        while unsafe { PeekMessageW(&mut message, self.hwnd, 0, 0, PM_REMOVE) } != 0 {
            unsafe {
                TranslateMessage(&message);
                DispatchMessageW(&message);
            }
        }
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), SessionError> {
        if unsafe { SwapBuffers(self.hdc) } == 0 {
            return Err(SessionError::Platform("buffer swap failed".into()));
        }
        Ok(())
    }

    fn resize_surface(&mut self, _width: i32, _height: i32) {
        // The WGL surface tracks the window; nothing to resize here.
    }

    fn set_viewport(&mut self, width: i32, height: i32) {
        if let Some(procs) = &self.procs {
            procs.viewport(0, 0, width, height);
        }
    }

    fn gl_version(&self) -> (u32, u32) {
        self.version
    }
}

impl Drop for Win32Backend {
    fn drop(&mut self) {
        unsafe {
            if !self.context.is_null() {
                wglMakeCurrent(std::ptr::null_mut(), std::ptr::null_mut());
                wglDeleteContext(self.context);
            }
            if !self.opengl32.is_null() {
                FreeLibrary(self.opengl32);
            }
            if !self.hdc.is_null() {
                ReleaseDC(self.hwnd, self.hdc);
            }
            if !self.hwnd.is_null() {
                // Detach the channel before the window dies so late
                // messages cannot reach a freed sender.
                SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
                DestroyWindow(self.hwnd);
            }
            if self.class_registered {
                UnregisterClassW(self.class_name.as_ptr(), self.hinstance);
            }
            drop(Box::from_raw(self.events));
        }
        debug!(target: "glint::platform", "win32 session torn down");
    }
}

//=== Procedure Resolution ================================================

// wglGetProcAddress covers extensions only; GL 1.x entry points come
// from opengl32.dll directly. Some drivers return sentinel values
// instead of null, hence the small-address filter.
fn resolve_gl_proc(opengl32: HMODULE, name: &str) -> *const c_void {
    let name_z = format!("{name}\0");

    if let Some(address) = unsafe { wglGetProcAddress(name_z.as_ptr()) } {
        let raw = address as usize;
        if raw > 3 && raw != usize::MAX {
            return address as *const c_void;
        }
    }

    if !opengl32.is_null() {
        if let Some(address) = unsafe { GetProcAddress(opengl32, name_z.as_ptr()) } {
            return address as *const c_void;
        }
    }

    std::ptr::null()
}

fn wgl_extension<F>(name: &str) -> Option<F> {
    let name_z = format!("{name}\0");
    let address = unsafe { wglGetProcAddress(name_z.as_ptr()) }?;
    let raw = address as usize;
    if raw <= 3 || raw == usize::MAX {
        return None;
    }
    // Size-compatible: F is always an extern "system" fn pointer here.
    Some(unsafe { std::mem::transmute_copy::<_, F>(&address) })
}

//=== Window Procedure ====================================================

unsafe extern "system" fn wndproc(
    hwnd: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if message == WM_NCCREATE {
        let create = lparam as *const CREATESTRUCTW;
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, (*create).lpCreateParams as isize);
        return DefWindowProcW(hwnd, message, wparam, lparam);
    }

    let events = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const Sender<PlatformEvent>;
    if events.is_null() {
        return DefWindowProcW(hwnd, message, wparam, lparam);
    }
    let events = &*events;
    let emit = |event: PlatformEvent| {
        let _ = events.send(event);
    };

    match message {
        WM_SIZE => {
            emit(PlatformEvent::Resized {
                width: (lparam & 0xFFFF) as i32,
                height: ((lparam >> 16) & 0xFFFF) as i32,
            });
            0
        }
        WM_CLOSE => {
            emit(PlatformEvent::CloseRequested);
            0
        }
        WM_KEYDOWN | WM_SYSKEYDOWN => {
            emit(PlatformEvent::Key {
                key: vk_to_key(wparam as u32),
                pressed: true,
            });
            0
        }
        WM_KEYUP | WM_SYSKEYUP => {
            emit(PlatformEvent::Key {
                key: vk_to_key(wparam as u32),
                pressed: false,
            });
            0
        }
        WM_MOUSEMOVE => {
            emit(PlatformEvent::PointerMoved {
                x: (lparam & 0xFFFF) as i16 as f64,
                y: ((lparam >> 16) & 0xFFFF) as i16 as f64,
            });
            0
        }
        WM_LBUTTONDOWN | WM_LBUTTONUP => {
            emit(PlatformEvent::Button {
                button: MouseButton::Left,
                pressed: message == WM_LBUTTONDOWN,
            });
            0
        }
        WM_RBUTTONDOWN | WM_RBUTTONUP => {
            emit(PlatformEvent::Button {
                button: MouseButton::Right,
                pressed: message == WM_RBUTTONDOWN,
            });
            0
        }
        WM_MBUTTONDOWN | WM_MBUTTONUP => {
            emit(PlatformEvent::Button {
                button: MouseButton::Middle,
                pressed: message == WM_MBUTTONDOWN,
            });
            0
        }
        WM_MOUSEWHEEL => {
            let delta = ((wparam >> 16) & 0xFFFF) as u16 as i16;
            emit(PlatformEvent::Scroll {
                delta: f64::from(delta) / 120.0,
            });
            0
        }
        _ => DefWindowProcW(hwnd, message, wparam, lparam),
    }
}
