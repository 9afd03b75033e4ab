use ratatui::Frame;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::tui::app::Mode;
use crate::tui::widgets::{
    color::parse_color,
    confirm_delete::render_confirm_delete,
    help::render_help,
    history_list::render_history,
    palette::render_palette,
    status_bar::{StatusLine, render_status_bar},
};
use crate::tui::{App, Layout};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    // Outer border with the app title centered in the top border
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Mood Tracker")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_palette(f, layout.palette_area, app.state.available_moods, &app.config);

    let history = std::sync::Arc::clone(&app.state.mood_history);
    render_history(f, layout.history_area, &history, &mut app.list_state, &app.config);

    // Storage errors outrank transient messages, which outrank key hints
    let hints = app.key_hints();
    let line = if let Some(error) = app.state.error.as_deref() {
        StatusLine::Error(error)
    } else if let Some(message) = app.status.message.as_deref() {
        StatusLine::Message(message)
    } else {
        StatusLine::Hints(&hints)
    };
    render_status_bar(f, layout.status_area, line, &app.config);

    // Overlays render last
    match app.mode {
        Mode::Help => render_help(f, f.area(), &app.config),
        Mode::ConfirmDelete => {
            if let Some(ref entry) = app.delete_modal.entry {
                render_confirm_delete(f, f.area(), entry, app.delete_modal.selection, &app.config);
            }
        }
        Mode::View => {}
    }
}
