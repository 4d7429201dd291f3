// ── Win32 window host ─────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register window classes and remember which procedure each one uses.
//   • Create top-level windows and map each HWND to its class's procedure.
//   • Retrieve, translate and dispatch messages for the calling thread.
//   • Hold the paint context for exactly one WM_PAINT (BeginPaint/EndPaint).
//   • Expose a safe error-dialog helper for startup failures.
//
// The class and window registries are thread-local: a window, its procedure
// and the loop all live on the thread that created them.

#![allow(unsafe_code)]

use std::{cell::RefCell, collections::HashMap, ffi::c_void};

use windows::{
    core::{HSTRING, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{
            BeginPaint, EndPaint, FillRect, TextOutW, UpdateWindow, COLOR_WINDOW, HBRUSH, HDC,
            PAINTSTRUCT,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DispatchMessageW, GetMessageW, LoadCursorW,
            MessageBoxW, PostQuitMessage, RegisterClassExW, ShowWindow, TranslateMessage,
            CREATESTRUCTW, IDC_ARROW, MB_ICONEXCLAMATION, MB_OK, MSG, SW_SHOWDEFAULT,
            WINDOW_EX_STYLE, WINDOW_STYLE, WM_NCCREATE, WM_NCDESTROY, WNDCLASSEXW,
            WS_OVERLAPPEDWINDOW, WS_POPUP,
        },
    },
};

use crate::{
    error::{HostError, Result},
    host::{
        Bounds, Canvas, ClassHandle, Host, Message, MessageKind, Rect, Reply, SharedProcedure,
        WindowClass, WindowHandle, WindowStyle,
    },
    platform::Platform,
};

thread_local! {
    /// Class name → procedure, filled by `register_class`.
    static CLASSES: RefCell<HashMap<String, SharedProcedure>> = RefCell::new(HashMap::new());

    /// Live HWND → procedure, filled on WM_NCCREATE and cleared on WM_NCDESTROY.
    static WINDOWS: RefCell<HashMap<isize, SharedProcedure>> = RefCell::new(HashMap::new());
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// The Win32 window system of the calling thread.
pub struct Win32Platform {
    hinstance: HINSTANCE,
    /// The message most recently returned by `next_message`, kept intact
    /// (time, cursor position) for `DispatchMessageW`.
    current: MSG,
}

impl Win32Platform {
    pub fn new() -> Result<Self> {
        // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
        // valid for the process lifetime.
        let hmodule = unsafe { GetModuleHandleW(None) }?;

        // HINSTANCE and HMODULE are the same value on Windows.
        Ok(Self {
            hinstance: HINSTANCE(hmodule.0),
            current: MSG::default(),
        })
    }
}

impl Platform for Win32Platform {
    fn register_class(
        &mut self,
        class: &WindowClass,
        procedure: SharedProcedure,
    ) -> Result<ClassHandle> {
        // SAFETY: LoadCursorW with IDC_ARROW loads a built-in system cursor.
        let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }?;
        let name = HSTRING::from(class.name.as_str());

        let wndclass = WNDCLASSEXW {
            // WNDCLASSEXW is ~80 bytes; the cast to u32 is always lossless.
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(wnd_proc),
            hInstance: self.hinstance,
            hCursor: cursor,
            hbrBackground: window_brush(),
            lpszClassName: PCWSTR(name.as_ptr()),
            ..Default::default()
        };

        // SAFETY: wndclass is fully initialised; `name` is a null-terminated
        // UTF-16 string that outlives the call (the system copies it).
        let atom = unsafe { RegisterClassExW(&wndclass) };
        if atom == 0 {
            return Err(last_error("RegisterClassExW"));
        }

        CLASSES.with(|c| c.borrow_mut().insert(class.name.clone(), procedure));
        log::debug!("registered class {:?} as atom {atom:#06x}", class.name);

        Ok(ClassHandle {
            name: class.name.clone(),
            atom,
        })
    }

    fn create_window(
        &mut self,
        class: &str,
        title: &str,
        style: WindowStyle,
        bounds: Bounds,
    ) -> Result<WindowHandle> {
        if !CLASSES.with(|c| c.borrow().contains_key(class)) {
            return Err(HostError::UnregisteredClass(class.to_owned()));
        }

        let class_w = HSTRING::from(class);
        let title_w = HSTRING::from(title);

        // SAFETY: the class was registered by this thread; both strings are
        // valid null-terminated UTF-16.  No parent, no menu, no creation data.
        // WM_NCCREATE and WM_CREATE are delivered to wnd_proc before this
        // returns.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                &class_w,
                &title_w,
                style_bits(style),
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                None,
                None,
                self.hinstance,
                None,
            )
        }
        .map_err(|e| HostError::Win32 {
            function: "CreateWindowExW",
            code: e.code().0 as u32,
        })?;

        let window = handle_of(hwnd);
        log::debug!("created {window} of class {class:?}");
        Ok(window)
    }

    fn show_window(&mut self, window: WindowHandle) -> Result<()> {
        if !is_live(window) {
            return Err(HostError::InvalidWindow(window));
        }
        let hwnd = hwnd_of(window);

        // SAFETY: hwnd is live (present in WINDOWS).  ShowWindow returns the
        // previous visibility state and UpdateWindow a success BOOL; neither
        // signals a failure we could act on, so both are ignored.
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWDEFAULT);
            let _ = UpdateWindow(hwnd);
        }
        Ok(())
    }

    fn next_message(&mut self) -> Result<Message> {
        // SAFETY: &mut self.current is a valid MSG pointer; a null HWND
        // retrieves messages for every window of this thread and thread
        // messages such as WM_QUIT; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut self.current, None, 0, 0) };

        match ret.0 {
            -1 => Err(last_error("GetMessageW")),
            0 => Ok(Message::quit(self.current.wParam.0 as i32)),
            _ => Ok(message_of(&self.current)),
        }
    }

    fn dispatch(&mut self, _message: &Message) {
        // `_message` is the decoded form of self.current; the raw MSG is
        // dispatched so its time and cursor position survive.
        // SAFETY: self.current was populated by the successful GetMessageW
        // that produced `_message`.  TranslateMessage's result (whether a
        // WM_CHAR was generated) and DispatchMessageW's LRESULT are unused.
        unsafe {
            let _ = TranslateMessage(&self.current);
            let _ = DispatchMessageW(&self.current);
        }
    }
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let key = hwnd.0 as isize;

    if msg == WM_NCCREATE {
        // SAFETY: for WM_NCCREATE, lparam points to the CREATESTRUCTW of the
        // CreateWindowExW call in progress; lpszClass is the name we passed.
        let cs = &*(lparam.0 as *const CREATESTRUCTW);
        if let Ok(class) = cs.lpszClass.to_string() {
            if let Some(procedure) = CLASSES.with(|c| c.borrow().get(&class).cloned()) {
                WINDOWS.with(|w| w.borrow_mut().insert(key, procedure));
            }
        }
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    if msg == WM_NCDESTROY {
        WINDOWS.with(|w| w.borrow_mut().remove(&key));
        log::debug!("{} released", handle_of(hwnd));
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let procedure = WINDOWS.with(|w| w.borrow().get(&key).cloned());
    let reply = match procedure {
        Some(procedure) => match procedure.try_borrow_mut() {
            Ok(mut p) => p.handle(
                &mut Win32Host,
                &Message {
                    window: Some(handle_of(hwnd)),
                    kind: MessageKind::from_raw(msg),
                    wparam: wparam.0,
                    lparam: lparam.0,
                },
            ),
            // Re-entered from inside its own handler (e.g. WM_ERASEBKGND
            // sent by BeginPaint).
            Err(_) => Reply::Default,
        },
        // Messages sent before WM_NCCREATE (WM_GETMINMAXINFO).
        None => Reply::Default,
    };

    match reply {
        Reply::Handled(value) => LRESULT(value),
        // SAFETY: hwnd and message parameters are valid, provided by Windows.
        Reply::Default => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Host & paint context ──────────────────────────────────────────────────────

/// The operations available to a procedure while it handles a message.
struct Win32Host;

impl Host for Win32Host {
    fn post_quit(&mut self, exit_code: i32) {
        // SAFETY: PostQuitMessage only posts WM_QUIT to this thread's queue.
        unsafe { PostQuitMessage(exit_code) };
    }

    fn paint(
        &mut self,
        window: WindowHandle,
        render: &mut dyn FnMut(&mut dyn Canvas) -> Result<()>,
    ) -> Result<()> {
        let guard = PaintGuard::begin(hwnd_of(window))?;
        let mut canvas = GdiCanvas { guard: &guard };
        render(&mut canvas)
        // guard drops here: EndPaint runs whether or not render succeeded.
    }
}

/// A BeginPaint/EndPaint pair.  EndPaint runs on drop.
struct PaintGuard {
    hwnd: HWND,
    hdc: HDC,
    ps: PAINTSTRUCT,
}

impl PaintGuard {
    fn begin(hwnd: HWND) -> Result<Self> {
        let mut ps = PAINTSTRUCT::default();
        // SAFETY: hwnd is the window whose WM_PAINT is being handled;
        // ps is a valid out-pointer.
        let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
        if hdc.is_invalid() {
            return Err(last_error("BeginPaint"));
        }
        Ok(Self { hwnd, hdc, ps })
    }
}

impl Drop for PaintGuard {
    fn drop(&mut self) {
        // SAFETY: paired with the successful BeginPaint in `begin`, same
        // hwnd and PAINTSTRUCT.  EndPaint always returns TRUE.
        unsafe {
            let _ = EndPaint(self.hwnd, &self.ps);
        }
    }
}

struct GdiCanvas<'a> {
    guard: &'a PaintGuard,
}

impl Canvas for GdiCanvas<'_> {
    fn dirty_rect(&self) -> Rect {
        let r = self.guard.ps.rcPaint;
        Rect {
            left: r.left,
            top: r.top,
            right: r.right,
            bottom: r.bottom,
        }
    }

    fn fill_window_color(&mut self, rect: Rect) -> Result<()> {
        let r = RECT {
            left: rect.left,
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
        };
        // SAFETY: hdc is valid until the guard drops; r is a valid RECT.
        let ok = unsafe { FillRect(self.guard.hdc, &r, window_brush()) };
        if ok == 0 {
            return Err(last_error("FillRect"));
        }
        Ok(())
    }

    fn text_out(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        let wide: Vec<u16> = text.encode_utf16().collect();
        // SAFETY: hdc is valid until the guard drops; TextOutW reads exactly
        // wide.len() UTF-16 units and needs no terminator.
        let ok = unsafe { TextOutW(self.guard.hdc, x, y, &wide) };
        if !ok.as_bool() {
            return Err(last_error("TextOutW"));
        }
        Ok(())
    }
}

// ── Error dialog ──────────────────────────────────────────────────────────────

/// Show a modal error dialog with no owner window.
///
/// Safe to call from any context; performs the UTF-16 conversion internally.
pub(crate) fn show_error_dialog(title: &str, text: &str) {
    let text_wide = HSTRING::from(text);
    let title_wide = HSTRING::from(title);

    // SAFETY: both strings are valid null-terminated UTF-16 that remain
    // allocated for the duration of the MessageBoxW call.  The button pressed
    // is irrelevant for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            None,
            PCWSTR(text_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_ICONEXCLAMATION | MB_OK,
        );
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn handle_of(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

fn hwnd_of(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn is_live(window: WindowHandle) -> bool {
    WINDOWS.with(|w| w.borrow().contains_key(&window.0))
}

fn message_of(msg: &MSG) -> Message {
    Message {
        window: (!msg.hwnd.is_invalid()).then(|| handle_of(msg.hwnd)),
        kind: MessageKind::from_raw(msg.message),
        wparam: msg.wParam.0,
        lparam: msg.lParam.0,
    }
}

fn style_bits(style: WindowStyle) -> WINDOW_STYLE {
    match style {
        WindowStyle::Overlapped => WS_OVERLAPPEDWINDOW,
        WindowStyle::Popup => WS_POPUP,
    }
}

/// The system window-colour brush (`COLOR_WINDOW + 1`).
fn window_brush() -> HBRUSH {
    HBRUSH((COLOR_WINDOW.0 + 1) as isize as *mut c_void)
}

/// Capture the current Win32 last-error code and wrap it in a `HostError`.
///
/// Call immediately after a Win32 function that signals failure; `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> HostError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    let code = unsafe { GetLastError() };
    HostError::Win32 {
        function,
        code: code.0,
    }
}
