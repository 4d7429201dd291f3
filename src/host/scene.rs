// ── Fixed paint content & the app window procedure ────────────────────────────
//
// `Scene` is the static content an app draws on every paint.  `SceneWindow`
// is the window procedure both apps register: it paints the scene while the
// window is live and posts the quit message when the window is destroyed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    host::{Canvas, Host, Message, MessageKind, Reply, WindowHandle, WindowProcedure},
};

// ── Scene ─────────────────────────────────────────────────────────────────────

/// One line of text at a fixed client position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

impl TextLine {
    pub fn new(x: i32, y: i32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

/// Everything drawn during one paint event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Fill the dirty region with the window colour before drawing text.
    #[serde(default)]
    pub fill_background: bool,
    pub lines: Vec<TextLine>,
}

impl Scene {
    pub fn render(&self, canvas: &mut dyn Canvas) -> Result<()> {
        if self.fill_background {
            let dirty = canvas.dirty_rect();
            canvas.fill_window_color(dirty)?;
        }
        for line in &self.lines {
            canvas.text_out(line.x, line.y, &line.text)?;
        }
        Ok(())
    }
}

// ── Window lifecycle ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Live,
    Destroyed,
}

/// Window procedure that paints a `Scene` and ends the process when its
/// window is destroyed.
pub struct SceneWindow {
    scene: Scene,
    exit_code: i32,
    /// Windows not present here have not been destroyed yet.
    windows: HashMap<WindowHandle, Lifecycle>,
}

impl SceneWindow {
    /// A procedure that posts exit code 0 on destroy.
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            exit_code: 0,
            windows: HashMap::new(),
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn lifecycle(&self, window: WindowHandle) -> Lifecycle {
        self.windows
            .get(&window)
            .copied()
            .unwrap_or(Lifecycle::Live)
    }

    fn on_paint(&self, host: &mut dyn Host, window: WindowHandle) {
        let scene = &self.scene;
        if let Err(e) = host.paint(window, &mut |canvas: &mut dyn Canvas| scene.render(canvas)) {
            log::error!("paint of {window} failed: {e}");
        }
    }
}

impl WindowProcedure for SceneWindow {
    fn handle(&mut self, host: &mut dyn Host, message: &Message) -> Reply {
        let Some(window) = message.window else {
            return Reply::Default;
        };

        match (self.lifecycle(window), message.kind) {
            (Lifecycle::Live, MessageKind::Destroy) => {
                log::info!("{window} destroyed, posting quit ({})", self.exit_code);
                self.windows.insert(window, Lifecycle::Destroyed);
                host.post_quit(self.exit_code);
                Reply::Handled(0)
            }
            (Lifecycle::Live, MessageKind::Paint) => {
                self.on_paint(host, window);
                Reply::Handled(0)
            }
            (Lifecycle::Destroyed, kind) => {
                log::trace!("{window} already destroyed, {kind:?} left to default processing");
                Reply::Default
            }
            _ => Reply::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        error::HostError,
        host::{run_loop, Bounds, WindowClass, WindowStyle},
        platform::{
            headless::{DrawOp, HeadlessPlatform},
            Platform,
        },
    };

    /// Canvas whose text output always fails.
    struct FailingText;

    impl Canvas for FailingText {
        fn dirty_rect(&self) -> crate::host::Rect {
            crate::host::Rect::default()
        }
        fn fill_window_color(&mut self, _rect: crate::host::Rect) -> Result<()> {
            Ok(())
        }
        fn text_out(&mut self, _x: i32, _y: i32, _text: &str) -> Result<()> {
            Err(HostError::Render("no font".into()))
        }
    }

    fn sample_scene() -> Scene {
        Scene {
            fill_background: true,
            lines: vec![TextLine::new(10, 10, "Welcome to SampleApp!")],
        }
    }

    fn open(scene: Scene) -> (HeadlessPlatform, Rc<RefCell<SceneWindow>>, WindowHandle) {
        let mut platform = HeadlessPlatform::new();
        let procedure = Rc::new(RefCell::new(SceneWindow::new(scene)));
        platform
            .register_class(&WindowClass::new("SceneTest"), procedure.clone())
            .expect("register");
        let window = platform
            .create_window("SceneTest", "Scene", WindowStyle::Overlapped, Bounds::sized(800, 600))
            .expect("create");
        platform.show_window(window).expect("show");
        (platform, procedure, window)
    }

    #[test]
    fn render_fills_then_draws_text() {
        let (mut platform, _procedure, window) = open(sample_scene());
        platform.post(Message::new(window, MessageKind::Close));
        run_loop(&mut platform).expect("loop");

        let ops = platform.drawing(window);
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DrawOp::Fill(_)));
        assert_eq!(ops[1], DrawOp::Text(TextLine::new(10, 10, "Welcome to SampleApp!")));
    }

    #[test]
    fn text_only_scene_skips_fill() {
        let scene = Scene {
            fill_background: false,
            lines: vec![TextLine::new(20, 20, "a"), TextLine::new(20, 50, "b")],
        };
        let (mut platform, _procedure, window) = open(scene);
        platform.post(Message::new(window, MessageKind::Close));
        run_loop(&mut platform).expect("loop");

        assert_eq!(
            platform.drawing(window),
            vec![
                DrawOp::Text(TextLine::new(20, 20, "a")),
                DrawOp::Text(TextLine::new(20, 50, "b")),
            ]
        );
    }

    #[test]
    fn destroy_moves_window_to_destroyed_and_quits() {
        let (mut platform, procedure, window) = open(sample_scene());
        platform.post(Message::new(window, MessageKind::Close));

        assert_eq!(run_loop(&mut platform).expect("loop"), 0);
        assert_eq!(procedure.borrow().lifecycle(window), Lifecycle::Destroyed);
    }

    #[test]
    fn custom_exit_code_is_returned_by_loop() {
        let mut platform = HeadlessPlatform::new();
        let procedure = Rc::new(RefCell::new(SceneWindow::new(Scene::default()).with_exit_code(3)));
        platform
            .register_class(&WindowClass::new("ExitCode"), procedure)
            .expect("register");
        let window = platform
            .create_window("ExitCode", "", WindowStyle::Popup, Bounds::sized(1, 1))
            .expect("create");
        platform.post(Message::new(window, MessageKind::Destroy));
        assert_eq!(run_loop(&mut platform).expect("loop"), 3);
    }

    #[test]
    fn second_destroy_does_not_post_again() {
        let mut procedure = SceneWindow::new(Scene::default());
        let mut platform = HeadlessPlatform::new();
        let window = WindowHandle(1);

        let first = procedure.handle(&mut platform, &Message::new(window, MessageKind::Destroy));
        let second = procedure.handle(&mut platform, &Message::new(window, MessageKind::Destroy));

        assert_eq!(first, Reply::Handled(0));
        assert_eq!(second, Reply::Default);
        assert_eq!(platform.pending(), 1);
    }

    #[test]
    fn failed_render_still_releases_context() {
        let (mut platform, _procedure, window) = open(Scene {
            fill_background: false,
            lines: vec![TextLine::new(0, 0, "x")],
        });
        platform.fail_text_output(true);
        platform.post(Message::new(window, MessageKind::Paint));
        platform.post(Message::new(window, MessageKind::Close));

        assert_eq!(run_loop(&mut platform).expect("loop"), 0);
        assert_eq!(platform.open_paint_contexts(), 0);
        // The show-time paint plus the failing one.
        assert_eq!(platform.paints_completed(), 2);
        assert_eq!(platform.drawing(window).len(), 1);
    }

    #[test]
    fn scene_render_propagates_canvas_error() {
        let err = sample_scene().render(&mut FailingText).expect_err("must fail");
        assert!(matches!(err, HostError::Render(_)));
    }
}
