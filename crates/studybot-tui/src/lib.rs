//! studybot-tui: Terminal front end for the studybot chat client
//!
//! This crate provides the interactive layer on top of `studybot-engine`:
//! - Chat screen with a scrolling transcript and auto-growing compose box
//! - Copy controls for fenced code blocks
//! - Reset and quit confirmations, help overlay

mod app;
pub mod conversation;
pub mod copy;
mod event;
mod screens;
#[cfg(test)]
pub mod test_utils;
pub mod text;
mod ui;

use screens::Screen as ScreenTrait;

pub use app::{App, Screen};
pub use event::{Action, EditKey, Event, EventHandler};
pub use studybot_engine;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyEvent, KeyboardEnhancementFlags, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, buffer::Buffer, layout::Rect, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use studybot_engine::{
    ChatRequest, ChatTransport, Config, HttpTransport, ResetRequest, SessionId, TransportError,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Rows scrolled per mouse wheel notch.
const WHEEL_ROWS: usize = 3;

type SendHandle = JoinHandle<(SessionId, Result<String, TransportError>)>;

/// RAII guard for terminal state restoration.
struct TerminalGuard {
    enhanced_keys: bool,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.enhanced_keys {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the TUI against the chat service named in `config`.
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// exit.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let transport: Arc<dyn ChatTransport> =
        Arc::new(HttpTransport::new(&config.base_url, config.reply_mode)?);

    enable_raw_mode()?;
    // Shift+Enter is only distinguishable with keyboard enhancement
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    let _guard = TerminalGuard { enhanced_keys };

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    info!(session_id = %app.client.session(), base_url = %config.base_url, "tui started");

    let mut events = EventHandler::new(200);
    let result = run_loop(&mut terminal, &mut app, &mut events, transport).await;

    terminal.show_cursor()?;
    result
}

/// Draw the whole UI for the current state.
pub fn draw(app: &App, area: Rect, buf: &mut Buffer) {
    match app.screen {
        Screen::Chat => screens::chat::ChatScreen.render(app, area, buf),
        Screen::ResetConfirm => screens::confirm::ResetConfirmScreen.render(app, area, buf),
        Screen::QuitConfirm => screens::confirm::QuitConfirmScreen.render(app, area, buf),
    }
    if app.show_help {
        screens::render_help_overlay(area, buf);
    }
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    transport: Arc<dyn ChatTransport>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut send_handles: Vec<SendHandle> = Vec::new();

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            draw(app, area, frame.buffer_mut());
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if let Some(request) = handle_key(app, key) {
                        send_handles.push(spawn_send(Arc::clone(&transport), request));
                    }
                }
                Event::Paste(text) => handle_paste(app, &text),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => app.scroll.scroll_up(WHEEL_ROWS),
                    MouseEventKind::ScrollDown => app.scroll.scroll_down(WHEEL_ROWS),
                    _ => {}
                },
                Event::Tick => app.tick(),
                // Terminal will handle resize automatically
                Event::Resize(_, _) => {}
            }
        }

        if let Some(request) = app.pending_reset.take() {
            spawn_reset(Arc::clone(&transport), request);
        }

        // Collect finished sends (non-blocking)
        let mut completed = Vec::new();
        for (i, handle) in send_handles.iter().enumerate() {
            if handle.is_finished() {
                completed.push(i);
            }
        }
        for i in completed.into_iter().rev() {
            match send_handles.remove(i).await {
                Ok((session, result)) => {
                    app.finish_send(&session, result);
                }
                Err(e) => warn!(error = %e, "send task failed"),
            }
        }

        if app.should_quit {
            for handle in send_handles {
                handle.abort();
            }
            break;
        }
    }

    Ok(())
}

/// Route a key press. Returns a chat request when the key started a send.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<ChatRequest> {
    if app.screen == Screen::Chat && !app.show_help {
        if let Some(edit) = event::key_to_edit(key) {
            return apply_edit(app, edit);
        }
    }
    app.handle_action(event::key_to_action(key));
    None
}

fn apply_edit(app: &mut App, edit: EditKey) -> Option<ChatRequest> {
    match edit {
        EditKey::Newline => app.input.insert_newline(),
        EditKey::Char(c) => app.input.insert(c),
        EditKey::Backspace => app.input.backspace(),
        EditKey::Delete => app.input.delete(),
        EditKey::Left => app.input.move_left(),
        EditKey::Right => app.input.move_right(),
        EditKey::Home => app.input.move_home(),
        EditKey::End => app.input.move_end(),
        EditKey::Send => return app.submit(),
    }
    None
}

/// Insert pasted text into the compose box without sending it.
pub fn handle_paste(app: &mut App, text: &str) {
    if app.screen == Screen::Chat {
        app.input.insert_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
    }
}

/// Run a send on the runtime; the handle yields the session it was sent under.
fn spawn_send(transport: Arc<dyn ChatTransport>, request: ChatRequest) -> SendHandle {
    tokio::spawn(async move {
        let result = transport.send_message(&request).await;
        (request.session_id, result)
    })
}

/// Fire-and-forget reset; failures are only logged.
fn spawn_reset(transport: Arc<dyn ChatTransport>, request: ResetRequest) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = transport.reset_session(&request).await {
            warn!(error = %e, session_id = %request.session_id, "reset request failed");
        }
    })
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{buffer_to_string, create_test_terminal_sized};
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::Mutex;
    use studybot_engine::{SendOutcome, REMOTE_ERROR_TEXT};

    #[derive(Default)]
    struct FakeTransport {
        sent: Mutex<Vec<ChatRequest>>,
        resets: Mutex<Vec<ResetRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatTransport for FakeTransport {
        async fn send_message(&self, request: &ChatRequest) -> Result<String, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            if self.fail {
                Err(TransportError::Remote { status: 500 })
            } else {
                Ok(format!("echo: {}", request.message))
            }
        }

        async fn reset_session(&self, request: &ResetRequest) -> Result<(), TransportError> {
            self.resets.lock().unwrap().push(request.clone());
            if self.fail {
                Err(TransportError::Unreachable("down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn press(app: &mut App, code: KeyCode) -> Option<ChatRequest> {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_typing_then_enter_sends() {
        let mut app = App::new_for_test();
        type_str(&mut app, "hi there");
        assert_eq!(app.input.content(), "hi there");

        let request = press(&mut app, KeyCode::Enter).unwrap();
        assert_eq!(request.message, "hi there");
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut app = App::new_for_test();
        type_str(&mut app, "a");
        let sent = handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        assert!(sent.is_none());
        type_str(&mut app, "b");
        assert_eq!(app.input.content(), "a\nb");
    }

    #[test]
    fn test_typing_allowed_but_send_blocked_while_pending() {
        let mut app = App::new_for_test();
        type_str(&mut app, "q");
        press(&mut app, KeyCode::Enter).unwrap();

        type_str(&mut app, "next");
        assert_eq!(app.input.content(), "next");
        assert_eq!(app.screen, Screen::Chat);
        assert!(press(&mut app, KeyCode::Enter).is_none());
        assert_eq!(app.input.content(), "next");
        assert_eq!(app.client.log().len(), 1);
    }

    #[test]
    fn test_question_mark_is_text_in_chat() {
        let mut app = App::new_for_test();
        type_str(&mut app, "why?");
        assert_eq!(app.input.content(), "why?");
        assert!(!app.show_help);
    }

    #[test]
    fn test_reset_dialog_keys() {
        let mut app = App::new_for_test();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
        );
        assert_eq!(app.screen, Screen::ResetConfirm);

        // Letters answer the dialog instead of reaching the compose box
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.screen, Screen::Chat);
        assert!(app.input.is_empty());
        assert!(app.pending_reset.is_some());
    }

    #[test]
    fn test_paste_normalises_newlines() {
        let mut app = App::new_for_test();
        handle_paste(&mut app, "one\r\ntwo\rthree");
        assert_eq!(app.input.content(), "one\ntwo\nthree");
    }

    #[tokio::test]
    async fn test_spawned_send_round_trip() {
        let transport = Arc::new(FakeTransport::default());
        let mut app = App::new_for_test();
        type_str(&mut app, "ping");
        let request = press(&mut app, KeyCode::Enter).unwrap();

        let (session, result) = spawn_send(transport.clone(), request).await.unwrap();
        assert_eq!(app.finish_send(&session, result), SendOutcome::Replied);
        assert_eq!(app.client.log().last().unwrap().body, "echo: ping");
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_send_remote_error() {
        let transport = Arc::new(FakeTransport {
            fail: true,
            ..FakeTransport::default()
        });
        let mut app = App::new_for_test();
        type_str(&mut app, "ping");
        let request = press(&mut app, KeyCode::Enter).unwrap();

        let (session, result) = spawn_send(transport, request).await.unwrap();
        assert_eq!(app.finish_send(&session, result), SendOutcome::RemoteError);
        assert_eq!(app.client.log().last().unwrap().body, REMOTE_ERROR_TEXT);
        assert!(app.input.is_enabled());
    }

    #[tokio::test]
    async fn test_failed_reset_is_swallowed() {
        let transport = Arc::new(FakeTransport {
            fail: true,
            ..FakeTransport::default()
        });
        let request = ResetRequest {
            session_id: SessionId::from_string("session_gone00000"),
        };
        spawn_reset(transport.clone(), request).await.unwrap();
        assert_eq!(transport.resets.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_draw_full_frame_with_help() {
        let mut app = App::new_for_test();
        app.show_help = true;
        let mut terminal = create_test_terminal_sized(80, 24);
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw(&app, area, frame.buffer_mut());
            })
            .unwrap();
        let text = buffer_to_string(terminal.backend().buffer());
        assert!(text.contains(" Help "));
        assert!(text.contains("Copy code block"));
    }

    #[test]
    fn test_draw_grows_compose_box() {
        let mut app = App::new_for_test();
        let area = Rect::new(0, 0, 60, 20);

        let mut small = Buffer::empty(area);
        draw(&app, area, &mut small);
        type_str(&mut app, "1");
        for line in ["2", "3", "4"] {
            handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
            type_str(&mut app, line);
        }
        let mut large = Buffer::empty(area);
        draw(&app, area, &mut large);

        let rows_with = |buf: &Buffer, needle: &str| {
            buffer_to_string(buf)
                .lines()
                .position(|l| l.contains(needle))
                .unwrap()
        };
        // The compose box title moves up as the box grows
        assert_eq!(rows_with(&small, " Message "), 16);
        assert_eq!(rows_with(&large, " Message "), 13);
    }
}
