// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 / COM
// FFI). Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

pub mod app;
pub mod calculator;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod platform;
