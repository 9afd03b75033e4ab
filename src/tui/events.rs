use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::time::Duration;

use crate::tui::App;
use crate::tui::app::Mode;
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::{ParsedKeyBinding, has_primary_modifier, parse_key_binding};

/// How long to wait for input before redrawing with fresh state
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Guard that ensures terminal state is restored even on panic
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit)
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Run the screen on the calling thread
///
/// Must be called inside a tokio runtime context; storage work happens on the
/// runtime while this loop only polls input and the latest UI state.
pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    loop {
        app.check_status_message_timeout();
        app.sync_state();

        terminal.draw(|f| {
            let layout = Layout::calculate(f.area());
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(POLL_INTERVAL)? {
            // Only process Press events to avoid duplicate processing on Windows
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    tracing::info!("terminal ui closed");
    Ok(())
}

/// Returns true when the user asked to quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match app.mode {
        Mode::ConfirmDelete => {
            handle_delete_confirmation_modal(app, key_event);
            Ok(false)
        }
        Mode::Help => {
            if key_event.code == KeyCode::Esc || matches_binding(key_event, &app.config.key_bindings.help)? {
                app.toggle_help();
            }
            Ok(false)
        }
        Mode::View => handle_view_mode(app, key_event),
    }
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
            app.toggle_delete_selection();
        }
        KeyCode::Enter => app.confirm_delete_selection(),
        KeyCode::Char('y') => {
            app.delete_modal.selection = 0;
            app.confirm_delete_selection();
        }
        KeyCode::Esc | KeyCode::Char('n') => app.close_delete_modal(),
        _ => {}
    }
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let keys = app.config.key_bindings.clone();

    if matches_binding(key_event, &keys.quit)? {
        return Ok(true);
    }
    if matches_binding(key_event, &keys.help)? {
        app.toggle_help();
        return Ok(false);
    }
    if matches_binding(key_event, &keys.dismiss)? {
        app.dismiss_notices();
        return Ok(false);
    }
    if matches_binding(key_event, &keys.list_up)? || key_event.code == KeyCode::Up {
        app.select_previous();
        return Ok(false);
    }
    if matches_binding(key_event, &keys.list_down)? || key_event.code == KeyCode::Down {
        app.select_next();
        return Ok(false);
    }
    if matches_binding(key_event, &keys.delete)? {
        app.request_delete();
        return Ok(false);
    }
    for (binding, mood) in keys.mood_keys() {
        if matches_binding(key_event, binding)? {
            app.select_mood(mood);
            return Ok(false);
        }
    }

    Ok(false)
}

fn matches_binding(key_event: KeyEvent, binding: &str) -> Result<bool, TuiError> {
    let parsed = parse_key_binding(binding).map_err(TuiError::KeyBindingError)?;
    Ok(matches_key_event(key_event, &parsed))
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Primary modifier is Ctrl on Windows/Linux, Option/Alt on macOS
    if binding.requires_ctrl != has_primary_modifier(key_event.modifiers) {
        return false;
    }
    binding.key_code == key_event.code
}
