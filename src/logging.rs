// ── Logging setup ─────────────────────────────────────────────────────────────
//
// `log4rs.toml` beside the executable wins; otherwise everything at `Info`
// (`Debug` in debug builds) goes to stderr.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

use crate::error::{HostError, Result};

const CONSOLE_PATTERN: &str = "{d(%H:%M:%S%.3f)} {h({l:5})} {t} - {m}{n}";

#[cfg(debug_assertions)]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;
#[cfg(not(debug_assertions))]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Install the global logger.  Call once, before anything logs.
pub fn init() -> Result<()> {
    match config_file() {
        Some(path) if path.is_file() => init_from_file(&path),
        _ => {
            let config = console_config(DEFAULT_LEVEL)?;
            log4rs::init_config(config).map_err(|e| HostError::Logging(e.to_string()))?;
            Ok(())
        }
    }
}

fn init_from_file(path: &Path) -> Result<()> {
    log4rs::init_file(path, Default::default())
        .map_err(|e| HostError::Logging(format!("{}: {e}", path.display())))
}

/// A stderr-only configuration at `level`.
pub fn console_config(level: LevelFilter) -> Result<Config> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| HostError::Logging(e.to_string()))
}

fn config_file() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("log4rs.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_config_routes_root_to_stderr() {
        let config = console_config(LevelFilter::Warn).expect("config");
        assert_eq!(config.root().level(), LevelFilter::Warn);
        assert_eq!(config.root().appenders(), ["stderr".to_owned()]);
        assert_eq!(config.appenders().len(), 1);
    }
}
