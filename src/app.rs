// ── Application lifecycle ─────────────────────────────────────────────────────
//
// Shared by the window-app binaries: resolve the configuration, register the
// class, create and show the window, then hand the thread to the message
// loop.  Any startup failure is fatal: it is reported once and the process
// exits without retrying.

use std::{cell::RefCell, rc::Rc};

use crate::{
    config::AppConfig,
    error::{HostError, Result, StartupStage},
    host::{run_loop, scene::SceneWindow, WindowClass, WindowHandle},
    platform::{self, Platform},
};

/// Exit code after a reported startup failure.  The dialog is the
/// diagnostic; the exit code stays at the value the original apps used.
pub const STARTUP_FAILURE_EXIT_CODE: i32 = 0;

/// Exit code when the message loop itself fails.
pub const LOOP_FAILURE_EXIT_CODE: i32 = 1;

/// Run one window app on the native platform and return its exit code.
pub fn launch(preset: AppConfig) -> i32 {
    let config = AppConfig::resolve(preset);

    // The module handle is the first thing class registration needs.
    let mut platform = match platform::native() {
        Ok(platform) => platform,
        Err(e) => return fail(e.at(StartupStage::RegisterClass), platform::show_fatal_error),
    };

    launch_with(&mut platform, config, platform::show_fatal_error)
}

/// Run one window app on `platform` and map the outcome to an exit code.
///
/// Startup failures, including a configuration that could not be loaded, go
/// to `report(title, text)` once and yield `STARTUP_FAILURE_EXIT_CODE`.
pub fn launch_with<P, R>(platform: &mut P, config: Result<AppConfig>, report: R) -> i32
where
    P: Platform + ?Sized,
    R: FnMut(&str, &str),
{
    let config = match config {
        Ok(config) => config,
        Err(e) => return fail(e.at(StartupStage::Configure), report),
    };

    match run(platform, &config) {
        Ok(code) => {
            log::info!("{} exited with code {code}", config.title);
            code
        }
        Err(e) if e.stage().is_some() => fail(e, report),
        Err(e) => {
            log::error!("message loop failed: {e}");
            LOOP_FAILURE_EXIT_CODE
        }
    }
}

/// Bring the window up on `platform` and drive the loop to completion.
///
/// Startup failures come back wrapped in `HostError::Startup`; loop failures
/// come back bare.
pub fn run<P: Platform + ?Sized>(platform: &mut P, config: &AppConfig) -> Result<i32> {
    let window = start(platform, config)?;
    log::debug!("{window} up, entering message loop");
    run_loop(platform)
}

/// Register, create and show.  Returns the live window.
pub fn start<P: Platform + ?Sized>(platform: &mut P, config: &AppConfig) -> Result<WindowHandle> {
    let procedure = Rc::new(RefCell::new(SceneWindow::new(config.scene.clone())));

    let class = platform
        .register_class(&WindowClass::new(config.class_name.as_str()), procedure)
        .map_err(|e| e.at(StartupStage::RegisterClass))?;
    log::debug!("class {:?} registered (atom {:#06x})", class.name, class.atom);

    let window = platform
        .create_window(&class.name, &config.title, config.style, config.bounds())
        .map_err(|e| e.at(StartupStage::CreateWindow))?;

    platform
        .show_window(window)
        .map_err(|e| e.at(StartupStage::ShowWindow))?;

    Ok(window)
}

fn fail(error: HostError, mut report: impl FnMut(&str, &str)) -> i32 {
    log::error!("{error}");
    let text = error
        .stage()
        .map_or("Startup Failed!", StartupStage::dialog_text);
    report("Error", text);
    STARTUP_FAILURE_EXIT_CODE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::{Message, MessageKind},
        platform::headless::{DrawOp, HeadlessPlatform},
    };

    #[test]
    fn hello_world_paints_and_exits_zero() {
        let mut platform = HeadlessPlatform::new().closing_when_idle();
        let config = AppConfig::hello_world();

        let window = start(&mut platform, &config).expect("start");
        assert_eq!(run_loop(&mut platform).expect("loop"), 0);

        let texts: Vec<String> = platform
            .drawing(window)
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Text(line) => Some(line.text),
                DrawOp::Fill(_) => None,
            })
            .collect();
        assert_eq!(
            texts,
            [
                "Hello from WinAppCLI!",
                "This app was initialized with 'winapp init'"
            ]
        );
    }

    #[test]
    fn start_shows_titled_window() {
        let mut platform = HeadlessPlatform::new();
        let config = AppConfig::sample_app();

        let window = start(&mut platform, &config).expect("start");
        assert!(platform.is_visible(window));
        assert_eq!(platform.title(window), Some("SampleApp"));

        platform.post(Message::new(window, MessageKind::Close));
        assert_eq!(run_loop(&mut platform).expect("loop"), 0);
    }

    #[test]
    fn class_collision_is_a_registration_failure() {
        let mut platform = HeadlessPlatform::new();
        let config = AppConfig::sample_app();
        start(&mut platform, &config).expect("first start");

        let err = start(&mut platform, &config).expect_err("second start");
        assert_eq!(err.stage(), Some(StartupStage::RegisterClass));
    }

    /// Launch on `platform`, returning the exit code and every dialog shown.
    fn launch_collecting(
        platform: &mut HeadlessPlatform,
        config: Result<AppConfig>,
    ) -> (i32, Vec<(String, String)>) {
        let mut dialogs = Vec::new();
        let code = launch_with(platform, config, |title: &str, text: &str| {
            dialogs.push((title.to_owned(), text.to_owned()))
        });
        (code, dialogs)
    }

    #[test]
    fn clean_run_exits_zero_without_dialog() {
        let mut platform = HeadlessPlatform::new().closing_when_idle();
        let (code, dialogs) = launch_collecting(&mut platform, Ok(AppConfig::sample_app()));
        assert_eq!(code, 0);
        assert!(dialogs.is_empty());
    }

    #[test]
    fn malformed_config_reports_configuration_failure() {
        let mut platform = HeadlessPlatform::new().closing_when_idle();
        let (code, dialogs) = launch_collecting(&mut platform, AppConfig::from_json("{ not json"));
        assert_eq!(code, STARTUP_FAILURE_EXIT_CODE);
        assert_eq!(
            dialogs,
            [("Error".to_owned(), "Configuration Failed!".to_owned())]
        );
    }

    #[test]
    fn class_collision_reports_registration_failure() {
        let mut platform = HeadlessPlatform::new().closing_when_idle();
        start(&mut platform, &AppConfig::sample_app()).expect("first start");

        let (code, dialogs) = launch_collecting(&mut platform, Ok(AppConfig::sample_app()));
        assert_eq!(code, STARTUP_FAILURE_EXIT_CODE);
        assert_eq!(
            dialogs,
            [("Error".to_owned(), "Window Registration Failed!".to_owned())]
        );
    }

    #[test]
    fn loop_failure_exits_one_without_dialog() {
        let mut platform = HeadlessPlatform::new();
        let (code, dialogs) = launch_collecting(&mut platform, Ok(AppConfig::hello_world()));
        assert_eq!(code, LOOP_FAILURE_EXIT_CODE);
        assert!(dialogs.is_empty());
    }

    #[test]
    fn loop_stall_is_not_a_startup_failure() {
        let mut platform = HeadlessPlatform::new();
        let err = run(&mut platform, &AppConfig::hello_world()).expect_err("stalls");
        assert!(err.stage().is_none());
        assert!(matches!(err, HostError::Stalled));
    }
}
