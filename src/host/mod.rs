// ── Window host data model ────────────────────────────────────────────────────
//
// Platform-neutral types shared by the message loop, the window callbacks and
// every `Platform` implementation.  No Win32 imports; the raw message codes
// below are the Win32 values and are used unchanged by the headless platform.

use std::{cell::RefCell, fmt, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod message_loop;
pub mod scene;

pub use message_loop::run_loop;

// ── Handles ───────────────────────────────────────────────────────────────────

/// Opaque identifier of one on-screen window.
///
/// The OS owns the window; this is only a reference to it and carries no
/// ownership.  Valid from successful creation until the destroy event has
/// been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle(pub isize);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window {:#x}", self.0)
    }
}

/// A registered window class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHandle {
    pub name: String,
    /// The class atom returned by the OS.
    pub atom: u16,
}

// ── Messages ──────────────────────────────────────────────────────────────────

pub const WM_CREATE: u32 = 0x0001;
pub const WM_DESTROY: u32 = 0x0002;
pub const WM_PAINT: u32 = 0x000F;
pub const WM_CLOSE: u32 = 0x0010;
pub const WM_QUIT: u32 = 0x0012;
/// Sent from inside paint-context acquisition; left as `MessageKind::Other`.
pub const WM_ERASEBKGND: u32 = 0x0014;

/// The kind tag of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Create,
    Paint,
    Close,
    Destroy,
    Quit,
    /// Any message the host has no special handling for.
    Other(u32),
}

impl MessageKind {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            WM_CREATE => Self::Create,
            WM_PAINT => Self::Paint,
            WM_CLOSE => Self::Close,
            WM_DESTROY => Self::Destroy,
            WM_QUIT => Self::Quit,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Create => WM_CREATE,
            Self::Paint => WM_PAINT,
            Self::Close => WM_CLOSE,
            Self::Destroy => WM_DESTROY,
            Self::Quit => WM_QUIT,
            Self::Other(raw) => raw,
        }
    }
}

/// One OS event: target window, kind, and the two opaque parameter slots.
///
/// `Quit` messages target no window (`window` is `None`) and carry the exit
/// code in `wparam`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub window: Option<WindowHandle>,
    pub kind: MessageKind,
    pub wparam: usize,
    pub lparam: isize,
}

impl Message {
    pub fn new(window: WindowHandle, kind: MessageKind) -> Self {
        Self {
            window: Some(window),
            kind,
            wparam: 0,
            lparam: 0,
        }
    }

    pub fn quit(exit_code: i32) -> Self {
        Self {
            window: None,
            kind: MessageKind::Quit,
            // Sign-extended, as PostQuitMessage stores it.
            wparam: exit_code as isize as usize,
            lparam: 0,
        }
    }

    /// The exit code carried by a quit message.
    pub fn exit_code(&self) -> i32 {
        // Truncation back to i32 mirrors `(int)msg.wParam`.
        self.wparam as i32
    }
}

// ── Geometry & style ──────────────────────────────────────────────────────────

/// Lets the OS pick the coordinate (Win32 `CW_USEDEFAULT`).
pub const USE_DEFAULT: i32 = i32::MIN;

/// Initial position and size of a window, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    /// A window of the given size at an OS-chosen position.
    pub fn sized(width: i32, height: i32) -> Self {
        Self {
            x: USE_DEFAULT,
            y: USE_DEFAULT,
            width,
            height,
        }
    }
}

/// A rectangle in client coordinates (left/top inclusive, right/bottom exclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStyle {
    /// Title bar, sizing border, system menu, minimise/maximise boxes.
    #[default]
    Overlapped,
    /// Borderless pop-up window.
    Popup,
}

/// Registration parameters for a window class.
///
/// Windows of every class get the arrow cursor and the system window-colour
/// background; only the name varies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClass {
    pub name: String,
}

impl WindowClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ── Callbacks ─────────────────────────────────────────────────────────────────

/// Result of a callback invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The callback consumed the message; the value is returned to the OS.
    Handled(isize),
    /// Hand the message to the OS default procedure.
    Default,
}

/// Drawing surface available for the duration of one paint event.
pub trait Canvas {
    /// The region that needs repainting.
    fn dirty_rect(&self) -> Rect;

    /// Fill `rect` with the system window colour.
    fn fill_window_color(&mut self, rect: Rect) -> Result<()>;

    /// Draw `text` with its top-left corner at (`x`, `y`).
    fn text_out(&mut self, x: i32, y: i32, text: &str) -> Result<()>;
}

/// The operations a callback may issue back to the window system.
///
/// Passed in on every call; callbacks never hold on to it.
pub trait Host {
    /// Post a quit message carrying `exit_code` to this thread's queue.
    fn post_quit(&mut self, exit_code: i32);

    /// Acquire a drawing context for `window`, run `render`, and release the
    /// context before returning, whatever `render` returns.
    fn paint(
        &mut self,
        window: WindowHandle,
        render: &mut dyn FnMut(&mut dyn Canvas) -> Result<()>,
    ) -> Result<()>;
}

/// A window procedure: invoked by the loop for every message targeting a
/// window of the class it was registered with.
pub trait WindowProcedure {
    fn handle(&mut self, host: &mut dyn Host, message: &Message) -> Reply;
}

/// The form in which a callback is handed to `Platform::register_class`.
pub type SharedProcedure = Rc<RefCell<dyn WindowProcedure>>;
