// ── Headless window system ────────────────────────────────────────────────────
//
// An in-process `Platform`: the class registry, the handle → callback map and
// the message queue all live in memory.  Sent messages (create, show, destroy)
// are delivered synchronously, as Win32 does; everything else goes through
// the queue.  Opening a paint context sends a background-erase request to
// the window being painted.  Drawing is recorded per window instead of
// reaching a screen.
//
// No `unsafe`: pure safe Rust.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::{
    error::{HostError, Result},
    host::{
        scene::TextLine, Bounds, Canvas, ClassHandle, Host, Message, MessageKind, Rect, Reply,
        SharedProcedure, WindowClass, WindowHandle, WindowStyle, WM_ERASEBKGND,
    },
    platform::Platform,
};

/// First atom handed out; Win32 string atoms live in 0xC000..=0xFFFF.
const FIRST_ATOM: u16 = 0xC000;

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Fill(Rect),
    Text(TextLine),
}

struct WindowEntry {
    class: String,
    title: String,
    bounds: Bounds,
    visible: bool,
}

pub struct HeadlessPlatform {
    classes: HashMap<String, SharedProcedure>,
    // Ordered so idle close requests go out in creation order.
    windows: BTreeMap<WindowHandle, WindowEntry>,
    drawings: HashMap<WindowHandle, Vec<DrawOp>>,
    queue: VecDeque<Message>,
    next_atom: u16,
    next_handle: isize,
    close_when_idle: bool,
    fail_text: bool,
    open_contexts: usize,
    paints_completed: usize,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
            windows: BTreeMap::new(),
            drawings: HashMap::new(),
            queue: VecDeque::new(),
            next_atom: FIRST_ATOM,
            next_handle: 0x10010,
            close_when_idle: false,
            fail_text: false,
            open_contexts: 0,
            paints_completed: 0,
        }
    }

    /// When the queue runs dry, send a close request to every live window
    /// instead of reporting a stall.
    pub fn closing_when_idle(mut self) -> Self {
        self.close_when_idle = true;
        self
    }

    /// Make every subsequent `text_out` fail.
    pub fn fail_text_output(&mut self, fail: bool) {
        self.fail_text = fail;
    }

    /// Append `message` to the thread queue.
    pub fn post(&mut self, message: Message) {
        self.queue.push_back(message);
    }

    /// Number of queued messages.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_live(&self, window: WindowHandle) -> bool {
        self.windows.contains_key(&window)
    }

    pub fn title(&self, window: WindowHandle) -> Option<&str> {
        self.windows.get(&window).map(|w| w.title.as_str())
    }

    pub fn is_visible(&self, window: WindowHandle) -> bool {
        self.windows.get(&window).is_some_and(|w| w.visible)
    }

    /// Everything drawn into `window`, including after it was destroyed.
    pub fn drawing(&self, window: WindowHandle) -> Vec<DrawOp> {
        self.drawings.get(&window).cloned().unwrap_or_default()
    }

    pub fn open_paint_contexts(&self) -> usize {
        self.open_contexts
    }

    pub fn paints_completed(&self) -> usize {
        self.paints_completed
    }

    /// Deliver `Destroy` to the window's procedure, then invalidate the handle.
    pub fn destroy_window(&mut self, window: WindowHandle) -> Result<()> {
        if !self.is_live(window) {
            return Err(HostError::InvalidWindow(window));
        }
        self.send(&Message::new(window, MessageKind::Destroy));
        self.windows.remove(&window);
        log::debug!("{window} released");
        Ok(())
    }

    fn procedure_for(&self, window: WindowHandle) -> Option<SharedProcedure> {
        let entry = self.windows.get(&window)?;
        self.classes.get(&entry.class).cloned()
    }

    /// Invoke the window procedure directly, bypassing the queue.
    fn send(&mut self, message: &Message) -> Reply {
        let Some(window) = message.window else {
            return Reply::Default;
        };
        let Some(procedure) = self.procedure_for(window) else {
            log::trace!("{:?} for dead {window} dropped", message.kind);
            return Reply::Default;
        };

        let reply = match procedure.try_borrow_mut() {
            Ok(mut p) => p.handle(self, message),
            // Re-entered from inside its own handler.
            Err(_) => Reply::Default,
        };

        if reply == Reply::Default {
            self.default_procedure(window, message);
        }
        reply
    }

    fn default_procedure(&mut self, window: WindowHandle, message: &Message) {
        if message.kind == MessageKind::Close {
            if let Err(e) = self.destroy_window(window) {
                log::warn!("default close of {window}: {e}");
            }
        }
    }
}

impl Platform for HeadlessPlatform {
    fn register_class(
        &mut self,
        class: &WindowClass,
        procedure: SharedProcedure,
    ) -> Result<ClassHandle> {
        if self.classes.contains_key(&class.name) {
            return Err(HostError::ClassAlreadyRegistered(class.name.clone()));
        }
        let atom = self.next_atom;
        self.next_atom = self.next_atom.wrapping_add(1).max(FIRST_ATOM);
        self.classes.insert(class.name.clone(), procedure);
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
        _style: WindowStyle,
        bounds: Bounds,
    ) -> Result<WindowHandle> {
        if !self.classes.contains_key(class) {
            return Err(HostError::UnregisteredClass(class.to_owned()));
        }
        let window = WindowHandle(self.next_handle);
        self.next_handle += 2;
        self.windows.insert(
            window,
            WindowEntry {
                class: class.to_owned(),
                title: title.to_owned(),
                bounds,
                visible: false,
            },
        );
        self.send(&Message::new(window, MessageKind::Create));
        log::debug!("created {window} of class {class:?}");
        Ok(window)
    }

    fn show_window(&mut self, window: WindowHandle) -> Result<()> {
        let entry = self
            .windows
            .get_mut(&window)
            .ok_or(HostError::InvalidWindow(window))?;
        entry.visible = true;
        self.send(&Message::new(window, MessageKind::Paint));
        Ok(())
    }

    fn next_message(&mut self) -> Result<Message> {
        if self.queue.is_empty() && self.close_when_idle {
            let live: Vec<WindowHandle> = self.windows.keys().copied().collect();
            for window in live {
                self.queue.push_back(Message::new(window, MessageKind::Close));
            }
        }
        self.queue.pop_front().ok_or(HostError::Stalled)
    }

    fn dispatch(&mut self, message: &Message) {
        self.send(message);
    }
}

impl Host for HeadlessPlatform {
    fn post_quit(&mut self, exit_code: i32) {
        self.queue.push_back(Message::quit(exit_code));
    }

    fn paint(
        &mut self,
        window: WindowHandle,
        render: &mut dyn FnMut(&mut dyn Canvas) -> Result<()>,
    ) -> Result<()> {
        let bounds = self
            .windows
            .get(&window)
            .map(|w| w.bounds)
            .ok_or(HostError::InvalidWindow(window))?;

        let mut canvas = RecordingCanvas {
            dirty: Rect {
                left: 0,
                top: 0,
                right: bounds.width,
                bottom: bounds.height,
            },
            ops: Vec::new(),
            fail_text: self.fail_text,
        };

        self.open_contexts += 1;
        // Acquiring the context asks the window to erase its background first.
        self.send(&Message::new(window, MessageKind::Other(WM_ERASEBKGND)));
        let result = render(&mut canvas);
        self.open_contexts -= 1;
        self.paints_completed += 1;

        self.drawings.entry(window).or_default().extend(canvas.ops);
        result
    }
}

// ── Recording canvas ──────────────────────────────────────────────────────────

struct RecordingCanvas {
    dirty: Rect,
    ops: Vec<DrawOp>,
    fail_text: bool,
}

impl Canvas for RecordingCanvas {
    fn dirty_rect(&self) -> Rect {
        self.dirty
    }

    fn fill_window_color(&mut self, rect: Rect) -> Result<()> {
        self.ops.push(DrawOp::Fill(rect));
        Ok(())
    }

    fn text_out(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        if self.fail_text {
            return Err(HostError::Render(format!("text_out({x}, {y}) rejected")));
        }
        self.ops.push(DrawOp::Text(TextLine::new(x, y, text)));
        Ok(())
    }
}
