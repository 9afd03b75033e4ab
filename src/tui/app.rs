use crate::Config;
use crate::controller::{MoodController, UiState, UiStateSubscription};
use crate::models::{Mood, MoodEntry};
use ratatui::widgets::ListState;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Help,
    ConfirmDelete,
}

#[derive(Debug, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct DeleteModalState {
    pub entry: Option<MoodEntry>,
    pub selection: usize, // 0=Delete, 1=Cancel
}

pub struct App {
    pub config: Config,
    pub controller: MoodController,
    subscription: UiStateSubscription,
    pub state: UiState,
    pub mode: Mode,
    pub list_state: ListState,
    pub delete_modal: DeleteModalState,
    pub status: StatusState,
}

impl App {
    pub fn new(config: Config, controller: MoodController) -> Self {
        let mut subscription = controller.subscribe();
        let state = subscription.poll().unwrap_or_else(|| subscription.current());

        let mut app = Self {
            config,
            controller,
            subscription,
            state,
            mode: Mode::View,
            list_state: ListState::default(),
            delete_modal: DeleteModalState::default(),
            status: StatusState::default(),
        };
        app.adjust_selected_index();
        app
    }

    /// Pull the latest UI state, if any; returns whether it changed
    pub fn sync_state(&mut self) -> bool {
        match self.subscription.poll() {
            Some(state) => {
                self.state = state;
                self.adjust_selected_index();
                true
            }
            None => false,
        }
    }

    pub fn history(&self) -> &[MoodEntry] {
        &self.state.mood_history
    }

    pub fn selected_entry(&self) -> Option<&MoodEntry> {
        self.list_state.selected().and_then(|i| self.history().get(i))
    }

    /// Keep the selection inside the list after it grows or shrinks
    pub fn adjust_selected_index(&mut self) {
        let len = self.history().len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            let index = self.list_state.selected().unwrap_or(0).min(len - 1);
            self.list_state.select(Some(index));
        }
    }

    pub fn select_next(&mut self) {
        let len = self.history().len();
        if len == 0 {
            return;
        }
        let index = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.list_state.select(Some(index));
    }

    pub fn select_previous(&mut self) {
        if self.history().is_empty() {
            return;
        }
        let index = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(index));
    }

    /// Log a mood; the history updates when the store emits
    pub fn select_mood(&mut self, mood: Mood) {
        match self.controller.handle_mood_selected(mood.label()) {
            Ok(_) => {
                // Newest entries land on top
                self.list_state.select(Some(0));
                self.set_status_message(format!("Logged {} {}", mood.glyph(), mood));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn request_delete(&mut self) {
        match self.selected_entry().cloned() {
            Some(entry) => {
                self.delete_modal = DeleteModalState { entry: Some(entry), selection: 0 };
                self.mode = Mode::ConfirmDelete;
            }
            None => self.set_status_message("No entry selected".to_string()),
        }
    }

    pub fn toggle_delete_selection(&mut self) {
        self.delete_modal.selection = 1 - self.delete_modal.selection.min(1);
    }

    /// Run the highlighted modal option
    pub fn confirm_delete_selection(&mut self) {
        if self.delete_modal.selection == 0 {
            if let Some(entry) = self.delete_modal.entry.take() {
                self.controller.handle_mood_deleted(entry);
                self.set_status_message("Entry deleted".to_string());
            }
        }
        self.close_delete_modal();
    }

    pub fn close_delete_modal(&mut self) {
        self.delete_modal = DeleteModalState::default();
        self.mode = Mode::View;
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::View,
            _ => Mode::Help,
        };
    }

    /// Dismiss both the transient message and any storage error
    pub fn dismiss_notices(&mut self) {
        self.clear_status_message();
        self.controller.dismiss_error();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    pub fn key_hints(&self) -> Vec<String> {
        use crate::utils::format_key_binding_for_display as display;
        let keys = &self.config.key_bindings;
        match self.mode {
            Mode::View => vec![
                format!("{}-{}: Log mood", display(&keys.mood_1), display(&keys.mood_5)),
                format!("{}/{}: Move", display(&keys.list_down), display(&keys.list_up)),
                format!("{}: Delete", display(&keys.delete)),
                format!("{}: Help", display(&keys.help)),
                format!("{}: Quit", display(&keys.quit)),
            ],
            Mode::Help => vec![format!("{} / Esc: Close help", display(&keys.help))],
            Mode::ConfirmDelete => vec![
                "←→: Choose".to_string(),
                "Enter: Confirm".to_string(),
                "Esc: Cancel".to_string(),
            ],
        }
    }
}
