// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in winapp return `error::Result<T>`.  No panics
// in production paths; startup errors surface as user-facing dialogs (see
// `platform::show_fatal_error`).

use std::fmt;

use thiserror::Error;

use crate::host::WindowHandle;

/// The startup step that failed, used to pick the user-facing diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStage {
    Configure,
    RegisterClass,
    CreateWindow,
    ShowWindow,
}

impl StartupStage {
    /// Text shown in the fatal-error dialog.
    pub fn dialog_text(self) -> &'static str {
        match self {
            Self::Configure => "Configuration Failed!",
            Self::RegisterClass => "Window Registration Failed!",
            Self::CreateWindow => "Window Creation Failed!",
            Self::ShowWindow => "Window Display Failed!",
        }
    }
}

impl fmt::Display for StartupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configure => "configuration",
            Self::RegisterClass => "window class registration",
            Self::CreateWindow => "window creation",
            Self::ShowWindow => "window display",
        };
        f.write_str(name)
    }
}

/// Every error that winapp can produce.
#[derive(Debug, Error)]
pub enum HostError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    #[error("window class {0:?} is already registered")]
    ClassAlreadyRegistered(String),

    #[error("window class {0:?} is not registered")]
    UnregisteredClass(String),

    /// The handle was never created or its destroy event was already processed.
    #[error("{0} is not a live window")]
    InvalidWindow(WindowHandle),

    /// The message queue is empty and nothing can ever post to it again.
    #[error("message queue is empty and no quit message was posted")]
    Stalled,

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),

    /// A fatal failure while bringing the app up.
    #[error("{stage} failed: {source}")]
    Startup {
        stage: StartupStage,
        #[source]
        source: Box<HostError>,
    },
}

impl HostError {
    /// Wrap `self` as a failure of the given startup stage.
    pub fn at(self, stage: StartupStage) -> Self {
        Self::Startup {
            stage,
            source: Box::new(self),
        }
    }

    /// The startup stage this error belongs to, if any.
    pub fn stage(&self) -> Option<StartupStage> {
        match self {
            Self::Startup { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

// Convert a windows-crate error (HRESULT) directly into a HostError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for HostError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_error_shows_function_and_hex_code() {
        let e = HostError::Win32 {
            function: "RegisterClassExW",
            code: 1410,
        };
        assert_eq!(e.to_string(), "RegisterClassExW failed (error 0x00000582)");
    }

    #[test]
    fn startup_wrapper_keeps_stage_and_source() {
        let e = HostError::UnregisteredClass("Nope".into()).at(StartupStage::CreateWindow);
        assert_eq!(e.stage(), Some(StartupStage::CreateWindow));
        assert_eq!(
            e.to_string(),
            "window creation failed: window class \"Nope\" is not registered"
        );
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn dialog_text_matches_stage() {
        assert_eq!(
            StartupStage::RegisterClass.dialog_text(),
            "Window Registration Failed!"
        );
        assert_eq!(StartupStage::CreateWindow.dialog_text(), "Window Creation Failed!");
    }
}
