//! Interactive terminal review using crossterm + ratatui.
//!
//! Review mode puts the terminal into raw mode on the alternate screen with
//! the cursor hidden. Leaving it must restore all three on every exit path,
//! so acquisition is a guard whose `Drop` restores, and a process-wide panic
//! hook restores too (it runs even when panics abort instead of unwinding).
//!
//! The event loop reads from an [`EventSource`] so the whole review can be
//! driven by scripted input against ratatui's `TestBackend`.

use crate::approval::context::ApprovalContext;
use crate::approval::render;
use crate::approval::types::Verdict;
use crate::error::{display_failure, ApprovalError, ApprovalResult};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, Terminal};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default wait for input before redrawing.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Set while the real terminal is in review mode.
static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();

/// Setup and teardown of the display mode.
pub trait Screen {
    /// Raw mode, alternate screen, cursor hidden.
    fn enter(&mut self) -> io::Result<()>;
    /// Cooked mode, normal screen, cursor visible. Must be safe to repeat.
    fn restore(&mut self) -> io::Result<()>;
}

/// The process's real terminal.
#[derive(Debug, Default)]
pub struct CrosstermScreen;

impl Screen for CrosstermScreen {
    fn enter(&mut self) -> io::Result<()> {
        install_panic_hook();
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        restore_terminal()
    }
}

/// Put the real terminal back into its normal state.
///
/// Every step is attempted even if an earlier one fails.
pub fn restore_terminal() -> io::Result<()> {
    SCREEN_ACTIVE.store(false, Ordering::SeqCst);
    let raw = disable_raw_mode();
    let screen = execute!(io::stdout(), LeaveAlternateScreen, Show);
    raw.and(screen)
}

/// Registered once per process; chains to the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if SCREEN_ACTIVE.load(Ordering::SeqCst) {
                let _ = restore_terminal();
            }
            previous(info);
        }));
    });
}

/// Holds a [`Screen`] in review mode until released or dropped.
pub struct ScreenGuard<S: Screen> {
    screen: S,
    active: bool,
}

impl<S: Screen> ScreenGuard<S> {
    /// Enter review mode. A partial failure is rolled back before returning.
    pub fn acquire(mut screen: S) -> io::Result<Self> {
        if let Err(e) = screen.enter() {
            let _ = screen.restore();
            return Err(e);
        }
        Ok(Self {
            screen,
            active: true,
        })
    }

    /// Restore explicitly so the caller can see a failure.
    pub fn release(mut self) -> io::Result<()> {
        self.active = false;
        self.screen.restore()
    }
}

impl<S: Screen> Drop for ScreenGuard<S> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            let _ = self.screen.restore();
        }
    }
}

/// Source of terminal input events.
pub trait EventSource {
    /// Wait up to `timeout` for one event. `Ok(None)` means nothing arrived.
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

/// Reads events from the real terminal.
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Replays a fixed list of events.
///
/// Once the script runs out it either fails (so a test can never hang) or,
/// with [`ScriptedEvents::then_idle`], behaves like an operator who walked
/// away: every poll times out.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    queue: VecDeque<Event>,
    idle_when_empty: bool,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            queue: events.into_iter().collect(),
            idle_when_empty: false,
        }
    }

    /// Build from bare key codes (press events, no modifiers).
    pub fn keys(codes: impl IntoIterator<Item = KeyCode>) -> Self {
        Self::new(codes.into_iter().map(|code| Event::Key(KeyEvent::from(code))))
    }

    pub fn then_idle(mut self) -> Self {
        self.idle_when_empty = true;
        self
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        match self.queue.pop_front() {
            Some(event) => Ok(Some(event)),
            None if self.idle_when_empty => {
                std::thread::sleep(timeout);
                Ok(None)
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted input exhausted",
            )),
        }
    }
}

/// What a key press asks for. This mapping is an operator-facing contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Approve,
    Reject,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

impl KeyAction {
    pub fn from_key(code: KeyCode) -> Option<KeyAction> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(KeyAction::Approve),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(KeyAction::Reject),
            KeyCode::Up => Some(KeyAction::ScrollUp),
            KeyCode::Down => Some(KeyAction::ScrollDown),
            KeyCode::PageUp => Some(KeyAction::PageUp),
            KeyCode::PageDown => Some(KeyAction::PageDown),
            KeyCode::Home => Some(KeyAction::Top),
            KeyCode::End => Some(KeyAction::Bottom),
            _ => None,
        }
    }
}

/// Apply one key action. Returns the verdict once the review resolves.
pub fn dispatch(
    context: &mut ApprovalContext,
    action: KeyAction,
    viewport_height: usize,
) -> ApprovalResult<Option<Verdict>> {
    match action {
        KeyAction::Approve => {
            context.resolve(Verdict::Approved)?;
            return Ok(Some(Verdict::Approved));
        }
        KeyAction::Reject => {
            context.resolve(Verdict::Rejected)?;
            return Ok(Some(Verdict::Rejected));
        }
        KeyAction::ScrollUp => context.scroll_up(),
        KeyAction::ScrollDown => context.scroll_down(viewport_height),
        KeyAction::PageUp => context.page_up(),
        KeyAction::PageDown => context.page_down(viewport_height),
        KeyAction::Top => context.jump_top(),
        KeyAction::Bottom => context.jump_bottom(viewport_height),
    }
    Ok(None)
}

/// Draw, poll and dispatch until the operator decides or the review is cancelled.
///
/// There is no timeout: only `y`/`n`/`Esc` end the loop. Display errors are
/// returned as [`ApprovalError::DisplayFailure`].
pub fn run_event_loop<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    events: &mut E,
    context: &mut ApprovalContext,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> ApprovalResult<Verdict> {
    loop {
        if cancel.is_cancelled() {
            tracing::debug!("review cancelled while awaiting decision");
            return Err(ApprovalError::Cancelled);
        }

        let viewport = render::viewport_height(terminal.size().map_err(display_failure)?.height);
        context.clamp(viewport);
        terminal
            .draw(|frame| render::draw(frame, context))
            .map_err(display_failure)?;

        let Some(event) = events.next_event(poll_interval).map_err(display_failure)? else {
            continue;
        };

        // Release and repeat events would double-apply on some platforms.
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = KeyAction::from_key(key.code) {
                if let Some(verdict) = dispatch(context, action, viewport)? {
                    return Ok(verdict);
                }
            }
        }
    }
}

/// Run a complete interactive review on the given screen.
///
/// The screen is restored before this returns, whatever the outcome. If the
/// operator decided but restoring fails, the decision stands and the failure
/// is logged.
pub fn present<S: Screen, B: Backend, E: EventSource>(
    screen: S,
    backend: B,
    mut events: E,
    context: &mut ApprovalContext,
    poll_interval: Duration,
    cancel: &CancellationToken,
) -> ApprovalResult<Verdict> {
    let guard = ScreenGuard::acquire(screen).map_err(display_failure)?;

    let result = Terminal::new(backend)
        .map_err(display_failure)
        .and_then(|mut terminal| {
            run_event_loop(&mut terminal, &mut events, context, poll_interval, cancel)
        });

    if let Err(e) = guard.release() {
        tracing::error!("Failed to restore terminal after review: {}", e);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Change, ChangeKind, DiffCard, RiskTier};
    use crate::approval::context::TuiState;
    use ratatui::backend::TestBackend;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingScreen {
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail_enter: bool,
    }

    impl RecordingScreen {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Screen for RecordingScreen {
        fn enter(&mut self) -> io::Result<()> {
            self.calls.lock().unwrap().push("enter");
            if self.fail_enter {
                return Err(io::Error::new(io::ErrorKind::Other, "no tty"));
            }
            Ok(())
        }

        fn restore(&mut self) -> io::Result<()> {
            self.calls.lock().unwrap().push("restore");
            Ok(())
        }
    }

    struct PanickingEvents;

    impl EventSource for PanickingEvents {
        fn next_event(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
            panic!("simulated crash during review");
        }
    }

    fn context(lines: usize) -> ApprovalContext {
        let body: Vec<String> = (1..lines).map(|i| format!("line {}", i)).collect();
        let change = Change::new("config.yaml", ChangeKind::Delete).with_before(body.join("\n"));
        ApprovalContext::new(DiffCard::new("delete config.yaml", RiskTier::High, vec![change]).unwrap())
    }

    fn review(screen: RecordingScreen, events: ScriptedEvents, ctx: &mut ApprovalContext) -> ApprovalResult<Verdict> {
        present(
            screen,
            TestBackend::new(80, 24),
            events,
            ctx,
            Duration::from_millis(1),
            &CancellationToken::new(),
        )
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(KeyAction::from_key(KeyCode::Char('y')), Some(KeyAction::Approve));
        assert_eq!(KeyAction::from_key(KeyCode::Char('Y')), Some(KeyAction::Approve));
        assert_eq!(KeyAction::from_key(KeyCode::Char('n')), Some(KeyAction::Reject));
        assert_eq!(KeyAction::from_key(KeyCode::Char('N')), Some(KeyAction::Reject));
        assert_eq!(KeyAction::from_key(KeyCode::Esc), Some(KeyAction::Reject));
        assert_eq!(KeyAction::from_key(KeyCode::Up), Some(KeyAction::ScrollUp));
        assert_eq!(KeyAction::from_key(KeyCode::Down), Some(KeyAction::ScrollDown));
        assert_eq!(KeyAction::from_key(KeyCode::PageUp), Some(KeyAction::PageUp));
        assert_eq!(KeyAction::from_key(KeyCode::PageDown), Some(KeyAction::PageDown));
        assert_eq!(KeyAction::from_key(KeyCode::Home), Some(KeyAction::Top));
        assert_eq!(KeyAction::from_key(KeyCode::End), Some(KeyAction::Bottom));
        assert_eq!(KeyAction::from_key(KeyCode::Char('q')), None);
        assert_eq!(KeyAction::from_key(KeyCode::Enter), None);
    }

    #[test]
    fn test_approve_after_scrolling() {
        let screen = RecordingScreen::default();
        let mut ctx = context(30);
        let events = ScriptedEvents::keys([KeyCode::Down, KeyCode::Down, KeyCode::Char('y')]);

        let verdict = review(screen.clone(), events, &mut ctx).unwrap();
        assert_eq!(verdict, Verdict::Approved);
        assert_eq!(ctx.state(), TuiState::Approved);
        assert_eq!(ctx.scroll_offset(), 2);
        assert_eq!(screen.calls(), vec!["enter", "restore"]);
    }

    #[test]
    fn test_offset_clamped_when_terminal_grows() {
        let mut ctx = context(50);
        ctx.jump_bottom(render::viewport_height(24));
        assert_eq!(ctx.scroll_offset(), 34);

        let screen = RecordingScreen::default();
        let events = ScriptedEvents::keys([KeyCode::Up, KeyCode::Char('y')]);
        let verdict = present(
            screen,
            TestBackend::new(80, 40),
            events,
            &mut ctx,
            Duration::from_millis(1),
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(verdict, Verdict::Approved);
        assert_eq!(ctx.scroll_offset(), ctx.scroll_cap(render::viewport_height(40)) - 1);
        assert_eq!(ctx.scroll_offset(), 17);
    }

    #[test]
    fn test_escape_rejects() {
        let mut ctx = context(3);
        let events = ScriptedEvents::keys([KeyCode::Char('x'), KeyCode::Esc]);
        let verdict = review(RecordingScreen::default(), events, &mut ctx).unwrap();
        assert_eq!(verdict, Verdict::Rejected);
        assert_eq!(ctx.state(), TuiState::Rejected);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut ctx = context(3);
        let mut release = KeyEvent::from(KeyCode::Char('y'));
        release.kind = KeyEventKind::Release;
        let events = ScriptedEvents::new([
            Event::Key(release),
            Event::Resize(100, 40),
            Event::Key(KeyEvent::from(KeyCode::Char('n'))),
        ]);
        let verdict = review(RecordingScreen::default(), events, &mut ctx).unwrap();
        assert_eq!(verdict, Verdict::Rejected);
    }

    #[test]
    fn test_exhausted_input_is_display_failure() {
        let screen = RecordingScreen::default();
        let mut ctx = context(3);
        let err = review(screen.clone(), ScriptedEvents::keys([KeyCode::Down]), &mut ctx).unwrap_err();
        assert!(matches!(err, ApprovalError::DisplayFailure(_)));
        assert_eq!(ctx.state(), TuiState::AwaitingDecision);
        assert_eq!(screen.calls(), vec!["enter", "restore"]);
    }

    #[test]
    fn test_failed_enter_is_rolled_back() {
        let screen = RecordingScreen {
            fail_enter: true,
            ..Default::default()
        };
        let mut ctx = context(3);
        let err = review(screen.clone(), ScriptedEvents::keys([KeyCode::Char('y')]), &mut ctx).unwrap_err();
        assert!(matches!(err, ApprovalError::DisplayFailure(_)));
        assert_eq!(screen.calls(), vec!["enter", "restore"]);
    }

    #[test]
    fn test_cancelled_review_restores_screen() {
        let screen = RecordingScreen::default();
        let mut ctx = context(3);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = present(
            screen.clone(),
            TestBackend::new(80, 24),
            ScriptedEvents::default().then_idle(),
            &mut ctx,
            Duration::from_millis(1),
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, ApprovalError::Cancelled));
        assert_eq!(screen.calls(), vec!["enter", "restore"]);
    }

    #[test]
    fn test_panic_during_review_restores_screen() {
        let screen = RecordingScreen::default();
        let observed = screen.clone();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let mut ctx = context(3);
            present(
                screen,
                TestBackend::new(80, 24),
                PanickingEvents,
                &mut ctx,
                Duration::from_millis(1),
                &CancellationToken::new(),
            )
        }));

        assert!(outcome.is_err());
        assert_eq!(observed.calls(), vec!["enter", "restore"]);
    }

    #[test]
    fn test_dispatch_rejects_double_resolution() {
        let mut ctx = context(3);
        assert_eq!(dispatch(&mut ctx, KeyAction::Approve, 10).unwrap(), Some(Verdict::Approved));
        let err = dispatch(&mut ctx, KeyAction::Reject, 10).unwrap_err();
        assert!(matches!(err, ApprovalError::InvalidTransition { .. }));
    }
}
