// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface that the rest of the codebase uses to
// talk to the window system.  No `unsafe` lives here; all Win32 FFI is
// confined to the `win32` sub-module and never leaks outward.

use crate::{
    error::Result,
    host::{Bounds, ClassHandle, Message, SharedProcedure, WindowClass, WindowHandle, WindowStyle},
};

pub mod headless;
#[cfg(windows)]
pub mod win32;

/// A window system: class registry, window creation, and the message queue.
///
/// The platform holds the handle → callback mapping; callbacks are reached
/// only through `dispatch`.
pub trait Platform {
    /// Associate `class.name` with `procedure`.  Fails if the name is taken.
    fn register_class(
        &mut self,
        class: &WindowClass,
        procedure: SharedProcedure,
    ) -> Result<ClassHandle>;

    /// Create a top-level window of a registered class.
    fn create_window(
        &mut self,
        class: &str,
        title: &str,
        style: WindowStyle,
        bounds: Bounds,
    ) -> Result<WindowHandle>;

    /// Make the window visible and paint it once.
    fn show_window(&mut self, window: WindowHandle) -> Result<()>;

    /// Block until the next message for this thread is available.
    fn next_message(&mut self) -> Result<Message>;

    /// Translate and deliver the message most recently returned by
    /// `next_message`, passed back in as `message`, to its window's procedure.
    fn dispatch(&mut self, message: &Message);
}

// ── Native selection ──────────────────────────────────────────────────────────

#[cfg(windows)]
pub type NativePlatform = win32::window::Win32Platform;

/// Off Windows the apps run against the in-process window system, closing
/// their window once everything queued has been handled.
#[cfg(not(windows))]
pub type NativePlatform = headless::HeadlessPlatform;

#[cfg(windows)]
pub fn native() -> Result<NativePlatform> {
    win32::window::Win32Platform::new()
}

#[cfg(not(windows))]
pub fn native() -> Result<NativePlatform> {
    log::warn!("no native window system on this target, running headless");
    Ok(headless::HeadlessPlatform::new().closing_when_idle())
}

/// Report a fatal startup failure to the user.
#[cfg(windows)]
pub fn show_fatal_error(title: &str, text: &str) {
    win32::window::show_error_dialog(title, text);
}

#[cfg(not(windows))]
pub fn show_fatal_error(title: &str, text: &str) {
    eprintln!("{title}: {text}");
}

// ── Component apartment ───────────────────────────────────────────────────────

#[cfg(windows)]
pub use win32::com::Apartment;

/// Stand-in for the COM apartment on targets without COM.
#[cfg(not(windows))]
#[derive(Debug)]
pub struct Apartment(());

#[cfg(not(windows))]
impl Apartment {
    pub fn enter() -> Result<Self> {
        Ok(Self(()))
    }
}
