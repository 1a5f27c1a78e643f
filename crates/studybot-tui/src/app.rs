//! Application state and update logic for the studybot TUI.

use std::time::{Duration, Instant};

use studybot_engine::{
    code_blocks, ChatRequest, Config, ConversationClient, ResetRequest, SendOutcome, SessionId,
    TransportError,
};
use tracing::{debug, warn};

use crate::conversation::{block_keys, TranscriptScroll, TranscriptView};
use crate::copy::{BlockKey, ClipboardSink, CopyControls, MemoryClipboard, SystemClipboard};
use crate::event::Action;
use crate::ui::widgets::TextInputState;

/// How long a status bar notification stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Rows moved per PgUp/PgDn.
const PAGE_ROWS: usize = 10;

/// The current screen being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Chat,
    ResetConfirm,
    QuitConfirm,
}

/// Application state.
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Current screen.
    pub screen: Screen,

    /// Session, pending flag and message log.
    pub client: ConversationClient,

    /// Compose box.
    pub input: TextInputState,

    /// Transcript scroll position.
    pub scroll: TranscriptScroll,

    /// "Copied!" deadlines per code block.
    pub copy: CopyControls,

    /// Code block targeted by the copy key.
    pub selected_block: Option<BlockKey>,

    /// Animation counter, bumped on every tick.
    pub tick: usize,

    /// Transient status bar message.
    pub notification: Option<(String, Instant)>,

    /// Compose box height cap, in rows.
    pub max_input_height: u16,

    /// Reset request waiting for the run loop to send it.
    pub pending_reset: Option<ResetRequest>,

    clipboard: Box<dyn ClipboardSink>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("session", self.client.session())
            .field("pending", &self.client.is_pending())
            .field("messages", &self.client.log().len())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create the app for an interactive session.
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            ConversationClient::new(),
            Box::new(SystemClipboard::new()),
            config.max_input_height,
        )
    }

    /// Assemble an app from explicit parts.
    pub fn with_parts(
        client: ConversationClient,
        clipboard: Box<dyn ClipboardSink>,
        max_input_height: u16,
    ) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            screen: Screen::Chat,
            client,
            input: TextInputState::new(),
            scroll: TranscriptScroll::new(),
            copy: CopyControls::new(),
            selected_block: None,
            tick: 0,
            notification: None,
            max_input_height,
            pending_reset: None,
            clipboard,
        }
    }

    /// App with a fixed session and an in-memory clipboard.
    pub fn new_for_test() -> Self {
        Self::with_parts(
            ConversationClient::with_session(SessionId::from_string("session_test00001")),
            Box::new(MemoryClipboard::default()),
            studybot_engine::DEFAULT_MAX_INPUT_HEIGHT,
        )
    }

    /// What the transcript should draw right now.
    pub fn transcript_view(&self) -> TranscriptView<'_> {
        TranscriptView {
            log: self.client.log(),
            copy: &self.copy,
            selected: self.selected_block,
            now: Instant::now(),
            tick: self.tick,
        }
    }

    /// Start sending the compose box content.
    ///
    /// Returns the request to hand to the transport, or `None` when the
    /// text is blank or a reply is still pending.
    pub fn submit(&mut self) -> Option<ChatRequest> {
        if !self.client.can_send(self.input.content()) {
            return None;
        }
        let text = self.input.take();
        let request = self.client.prepare_send(&text)?;
        self.input.set_enabled(false);
        self.scroll.scroll_to_end();
        Some(request)
    }

    /// Apply the transport result of a send started under `session`.
    pub fn finish_send(
        &mut self,
        session: &SessionId,
        result: Result<String, TransportError>,
    ) -> SendOutcome {
        let outcome = self.client.complete_send(session, result);
        if outcome != SendOutcome::Discarded {
            self.input.set_enabled(true);
            self.scroll.scroll_to_end();
            self.selected_block = None;
        }
        debug!(?outcome, "send finished");
        outcome
    }

    /// Ask for confirmation before clearing the conversation.
    pub fn request_reset(&mut self) {
        self.screen = Screen::ResetConfirm;
    }

    /// Confirmed: clear everything locally and return the request that
    /// tells the server to forget the old session.
    pub fn confirm_reset(&mut self) -> ResetRequest {
        let request = self.client.reset_request();
        self.client.finish_reset();
        self.input.clear();
        self.input.set_enabled(true);
        self.scroll.scroll_to_end();
        self.copy.clear();
        self.selected_block = None;
        self.screen = Screen::Chat;
        self.notify("Started a fresh conversation");
        request
    }

    /// Show a transient message in the status bar.
    pub fn notify(&mut self, text: impl Into<String>) {
        self.notification = Some((text.into(), Instant::now() + NOTIFICATION_TTL));
    }

    /// Notification text if it has not expired.
    pub fn active_notification(&self) -> Option<&str> {
        self.notification
            .as_ref()
            .filter(|(_, until)| Instant::now() < *until)
            .map(|(text, _)| text.as_str())
    }

    /// The block the copy key acts on: the selected one, else the newest.
    pub fn copy_target(&self) -> Option<BlockKey> {
        let keys = block_keys(self.client.log());
        match self.selected_block {
            Some(key) if keys.contains(&key) => Some(key),
            _ => keys.last().copied(),
        }
    }

    /// Move the block selection one step, wrapping around. With nothing
    /// selected, forward starts at the oldest block and backward at the newest.
    pub fn select_block(&mut self, forward: bool) {
        let keys = block_keys(self.client.log());
        let len = keys.len();
        if len == 0 {
            self.selected_block = None;
            return;
        }
        let current = self
            .selected_block
            .and_then(|key| keys.iter().position(|k| *k == key));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(idx), true) => (idx + 1) % len,
            (Some(idx), false) => (idx + len - 1) % len,
        };
        self.selected_block = Some(keys[next]);
    }

    /// Copy the target block's text to the clipboard.
    pub fn copy_selected_block(&mut self) -> Option<String> {
        let key = self.copy_target()?;
        let (message_id, index) = key;
        let text = self
            .client
            .log()
            .messages()
            .iter()
            .find(|m| m.id == message_id)
            .and_then(|m| code_blocks(&m.body).into_iter().nth(index))?;

        match self.clipboard.set_text(&text) {
            Ok(()) => {
                self.copy.record_copy(key, Instant::now());
                self.selected_block = Some(key);
                Some(text)
            }
            Err(e) => {
                warn!(error = %e, "copy failed");
                self.notify(e.to_string());
                None
            }
        }
    }

    /// Handle a tick event.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        let now = Instant::now();
        self.copy.expire(now);
        if self
            .notification
            .as_ref()
            .is_some_and(|(_, until)| now >= *until)
        {
            self.notification = None;
        }
    }

    /// Handle an action that is not plain text editing.
    pub fn handle_action(&mut self, action: Action) {
        if action == Action::Help {
            self.show_help = !self.show_help;
            return;
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.screen {
            Screen::Chat => self.handle_chat_action(action),
            Screen::ResetConfirm => match action {
                Action::Confirm => {
                    let request = self.confirm_reset();
                    self.pending_reset = Some(request);
                }
                Action::Cancel => self.screen = Screen::Chat,
                _ => {}
            },
            Screen::QuitConfirm => match action {
                Action::Confirm => self.should_quit = true,
                Action::Cancel => self.screen = Screen::Chat,
                _ => {}
            },
        }
    }

    fn handle_chat_action(&mut self, action: Action) {
        match action {
            Action::Quit | Action::Cancel => self.screen = Screen::QuitConfirm,
            Action::Reset => self.request_reset(),
            Action::ScrollUp => self.scroll.scroll_up(1),
            Action::ScrollDown => self.scroll.scroll_down(1),
            Action::PageUp => self.scroll.scroll_up(PAGE_ROWS),
            Action::PageDown => self.scroll.scroll_down(PAGE_ROWS),
            Action::PrevBlock => self.select_block(false),
            Action::NextBlock => self.select_block(true),
            Action::Copy => {
                if self.copy_selected_block().is_some() {
                    self.notify("Code copied to clipboard");
                }
            }
            _ => {}
        }
    }

    /// Rows the compose box wants at `width` columns.
    pub fn input_rows(&self, width: u16) -> u16 {
        self.input.fit_height(width, self.max_input_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybot_engine::{Sender, REMOTE_ERROR_TEXT, UNREACHABLE_ERROR_TEXT};

    fn type_text(app: &mut App, text: &str) {
        app.input.insert_str(text);
    }

    #[test]
    fn test_new_app_starts_on_chat() {
        let app = App::new_for_test();
        assert_eq!(app.screen, Screen::Chat);
        assert!(!app.should_quit);
        assert!(app.client.log().is_empty());
        assert!(app.input.is_enabled());
    }

    #[test]
    fn test_submit_clears_and_disables_input() {
        let mut app = App::new_for_test();
        type_text(&mut app, "  What is a monad?  ");

        let request = app.submit().unwrap();
        assert_eq!(request.message, "What is a monad?");
        assert_eq!(&request.session_id, app.client.session());
        assert!(app.input.is_empty());
        assert!(!app.input.is_enabled());
        assert!(app.client.is_pending());
        assert!(app.client.log().is_typing());
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut app = App::new_for_test();
        type_text(&mut app, "   \n ");
        assert!(app.submit().is_none());
        assert!(app.client.log().is_empty());
        // Whitespace stays in the box
        assert_eq!(app.input.content(), "   \n ");
    }

    #[test]
    fn test_submit_while_pending_is_noop() {
        let mut app = App::new_for_test();
        type_text(&mut app, "first");
        app.submit().unwrap();
        type_text(&mut app, "second");
        assert!(app.submit().is_none());
        assert_eq!(app.client.log().len(), 1);
    }

    #[test]
    fn test_finish_send_reenables_input() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hi");
        let request = app.submit().unwrap();
        app.scroll.scroll_up(5);

        let outcome = app.finish_send(&request.session_id, Ok("hello!".to_string()));
        assert_eq!(outcome, SendOutcome::Replied);
        assert!(app.input.is_enabled());
        assert!(app.scroll.is_following());
        assert!(!app.client.log().is_typing());
        assert_eq!(app.client.log().last().unwrap().sender, Sender::Bot);
    }

    #[test]
    fn test_finish_send_error_paths() {
        let mut app = App::new_for_test();
        type_text(&mut app, "a");
        let request = app.submit().unwrap();
        app.finish_send(&request.session_id, Err(TransportError::Remote { status: 500 }));
        let last = app.client.log().last().unwrap();
        assert!(last.is_error);
        assert_eq!(last.body, REMOTE_ERROR_TEXT);

        type_text(&mut app, "b");
        let request = app.submit().unwrap();
        app.finish_send(
            &request.session_id,
            Err(TransportError::Unreachable("refused".to_string())),
        );
        assert_eq!(app.client.log().last().unwrap().body, UNREACHABLE_ERROR_TEXT);
        assert!(app.input.is_enabled());
    }

    #[test]
    fn test_reset_needs_confirmation() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hi");
        app.submit().unwrap();

        app.handle_action(Action::Reset);
        assert_eq!(app.screen, Screen::ResetConfirm);
        app.handle_action(Action::Cancel);
        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.client.log().len(), 1);
    }

    #[test]
    fn test_confirm_action_queues_reset_request() {
        let mut app = App::new_for_test();
        let old = app.client.session().clone();
        app.handle_action(Action::Reset);
        app.handle_action(Action::Confirm);
        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.pending_reset.take().unwrap().session_id, old);
        assert_eq!(app.active_notification(), Some("Started a fresh conversation"));
    }

    #[test]
    fn test_next_block_starts_at_oldest() {
        let (mut app, first, _) = app_with_blocks();
        app.handle_action(Action::NextBlock);
        assert_eq!(app.selected_block, Some((first, 0)));
    }

    #[test]
    fn test_confirm_reset_starts_over() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hi");
        let pending = app.submit().unwrap();
        let old = app.client.session().clone();

        app.request_reset();
        let reset = app.confirm_reset();
        assert_eq!(reset.session_id, old);
        assert_ne!(app.client.session(), &old);
        assert!(app.client.log().is_empty());
        assert!(app.input.is_enabled());
        assert_eq!(app.screen, Screen::Chat);

        // The reply to the abandoned send is dropped
        let outcome = app.finish_send(&pending.session_id, Ok("late".to_string()));
        assert_eq!(outcome, SendOutcome::Discarded);
        assert!(app.client.log().is_empty());
    }

    #[test]
    fn test_quit_confirmation() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Quit);
        assert_eq!(app.screen, Screen::QuitConfirm);
        assert!(!app.should_quit);
        app.handle_action(Action::Confirm);
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_toggle_and_any_key_closes() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Help);
        assert!(app.show_help);
        app.handle_action(Action::ScrollUp);
        assert!(!app.show_help);
    }

    fn app_with_blocks() -> (App, u64, u64) {
        let mut app = App::new_for_test();
        type_text(&mut app, "show me");
        let request = app.submit().unwrap();
        app.finish_send(
            &request.session_id,
            Ok("```\nfirst()\n``` then ```second()```".to_string()),
        );
        let first = app.client.log().last().unwrap().id;

        type_text(&mut app, "more");
        let request = app.submit().unwrap();
        app.finish_send(&request.session_id, Ok("```\nthird()\n```".to_string()));
        let second = app.client.log().last().unwrap().id;
        (app, first, second)
    }

    #[test]
    fn test_copy_defaults_to_newest_block() {
        let (mut app, _, second) = app_with_blocks();
        assert_eq!(app.copy_target(), Some((second, 0)));
        assert_eq!(app.copy_selected_block().as_deref(), Some("third()"));
        assert_eq!(
            app.copy.label((second, 0), Instant::now()),
            studybot_engine::COPIED_LABEL
        );
    }

    #[test]
    fn test_block_selection_wraps() {
        let (mut app, first, second) = app_with_blocks();
        app.handle_action(Action::PrevBlock);
        assert_eq!(app.selected_block, Some((second, 0)));
        app.handle_action(Action::PrevBlock);
        assert_eq!(app.selected_block, Some((first, 1)));
        app.handle_action(Action::NextBlock);
        app.handle_action(Action::NextBlock);
        assert_eq!(app.selected_block, Some((first, 0)));

        assert_eq!(app.copy_selected_block().as_deref(), Some("first()"));
    }

    #[test]
    fn test_copy_without_blocks_does_nothing() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Copy);
        assert!(app.copy_selected_block().is_none());
        assert!(app.active_notification().is_none());
    }

    #[test]
    fn test_input_rows_capped() {
        let mut app = App::new_for_test();
        app.max_input_height = 4;
        type_text(&mut app, "1\n2\n3\n4\n5\n6");
        assert_eq!(app.input_rows(40), 4);
    }
}
