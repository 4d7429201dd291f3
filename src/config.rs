// ── App configuration ─────────────────────────────────────────────────────────
//
// Each window app ships a built-in preset.  An optional `<exe-stem>.json`
// beside the executable replaces it wholesale.
// No `unsafe`: pure safe Rust + serde_json.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{HostError, Result},
    host::{
        scene::{Scene, TextLine},
        Bounds, WindowStyle,
    },
};

/// Default client width in device pixels.
const DEFAULT_WIDTH: i32 = 800;

/// Default client height in device pixels.
const DEFAULT_HEIGHT: i32 = 600;

/// Everything one window app needs to bring its window up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name the window class is registered under.
    pub class_name: String,
    /// Title bar text.
    pub title: String,
    #[serde(default)]
    pub style: WindowStyle,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    pub scene: Scene,
}

fn default_width() -> i32 {
    DEFAULT_WIDTH
}

fn default_height() -> i32 {
    DEFAULT_HEIGHT
}

impl AppConfig {
    /// The "Hello World" demo: two lines of text, no background fill.
    pub fn hello_world() -> Self {
        Self {
            class_name: "HelloWindowClass".to_owned(),
            title: "Hello World App - WinAppCLI Demo".to_owned(),
            style: WindowStyle::Overlapped,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scene: Scene {
                fill_background: false,
                lines: vec![
                    TextLine::new(20, 20, "Hello from WinAppCLI!"),
                    TextLine::new(20, 50, "This app was initialized with 'winapp init'"),
                ],
            },
        }
    }

    /// The sample app: window-colour fill and a welcome line.
    pub fn sample_app() -> Self {
        Self {
            class_name: "SampleAppWindowClass".to_owned(),
            title: "SampleApp".to_owned(),
            style: WindowStyle::Overlapped,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scene: Scene {
                fill_background: true,
                lines: vec![TextLine::new(10, 10, "Welcome to SampleApp!")],
            },
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::sized(self.width, self.height)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// `preset`, unless the override file for the running executable exists.
    pub fn resolve(preset: Self) -> Result<Self> {
        match override_path() {
            Some(path) => Self::resolve_at(preset, &path),
            None => Ok(preset),
        }
    }

    /// `preset`, unless `path` exists, in which case its contents.
    pub fn resolve_at(preset: Self, path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(preset);
        }
        log::info!("loading configuration from {}", path.display());
        Self::load(path)
    }

    fn validate(&self) -> Result<()> {
        if self.class_name.is_empty() {
            return Err(HostError::InvalidSetting("class_name is empty".into()));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(HostError::InvalidSetting(format!(
                "window size {}x{} is not positive",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// `<exe dir>\<exe stem>.json`, or `None` if the executable path is unknown.
pub fn override_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let stem = exe.file_stem()?.to_owned();
    let mut path = exe.parent()?.join(stem);
    path.set_extension("json");
    Some(path)
}
