// ── Message loop ──────────────────────────────────────────────────────────────

use crate::{
    error::Result,
    host::MessageKind,
    platform::Platform,
};

/// Retrieve and dispatch messages one at a time until a quit message is
/// retrieved, then return the exit code it carries.
///
/// `next_message` is the only place the thread blocks.  A retrieval failure
/// ends the loop with that error.
pub fn run_loop<P: Platform + ?Sized>(platform: &mut P) -> Result<i32> {
    let mut dispatched = 0u64;

    loop {
        let msg = platform.next_message()?;

        if msg.kind == MessageKind::Quit {
            let code = msg.exit_code();
            log::debug!("quit after {dispatched} messages, exit code {code}");
            return Ok(code);
        }

        platform.dispatch(&msg);
        dispatched += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        error::HostError,
        host::{Bounds, Host, Message, Reply, WindowClass, WindowProcedure, WindowStyle},
        platform::headless::HeadlessPlatform,
    };

    /// Posts `code` when destroyed, defers everything else.
    struct QuitOnDestroy {
        code: i32,
        seen: Vec<MessageKind>,
    }

    impl WindowProcedure for QuitOnDestroy {
        fn handle(&mut self, host: &mut dyn Host, message: &Message) -> Reply {
            self.seen.push(message.kind);
            match message.kind {
                MessageKind::Destroy => {
                    host.post_quit(self.code);
                    Reply::Handled(0)
                }
                _ => Reply::Default,
            }
        }
    }

    fn setup(code: i32) -> (HeadlessPlatform, Rc<RefCell<QuitOnDestroy>>, crate::host::WindowHandle) {
        let mut platform = HeadlessPlatform::new();
        let procedure = Rc::new(RefCell::new(QuitOnDestroy { code, seen: Vec::new() }));
        platform
            .register_class(&WindowClass::new("LoopTest"), procedure.clone())
            .expect("register");
        let window = platform
            .create_window("LoopTest", "t", WindowStyle::Overlapped, Bounds::sized(10, 10))
            .expect("create");
        (platform, procedure, window)
    }

    #[test]
    fn destroy_ends_loop_with_posted_code() {
        let (mut platform, procedure, window) = setup(0);
        platform.post(Message::new(window, MessageKind::Destroy));

        assert_eq!(run_loop(&mut platform).expect("loop"), 0);
        assert!(procedure.borrow().seen.contains(&MessageKind::Destroy));
    }

    #[test]
    fn close_request_destroys_window_then_quits() {
        let (mut platform, procedure, window) = setup(7);
        platform.post(Message::new(window, MessageKind::Close));

        assert_eq!(run_loop(&mut platform).expect("loop"), 7);
        assert_eq!(
            procedure.borrow().seen,
            vec![MessageKind::Create, MessageKind::Close, MessageKind::Destroy]
        );
        assert!(!platform.is_live(window));
    }

    #[test]
    fn quit_already_queued_returns_without_dispatch() {
        let mut platform = HeadlessPlatform::new();
        platform.post(Message::quit(-42));
        assert_eq!(run_loop(&mut platform).expect("loop"), -42);
    }

    #[test]
    fn empty_queue_without_quit_is_reported() {
        let (mut platform, _procedure, _window) = setup(0);
        let err = run_loop(&mut platform).expect_err("should stall");
        assert!(matches!(err, HostError::Stalled));
    }
}
