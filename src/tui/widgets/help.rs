use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as display;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn build_help_text(config: &Config) -> String {
    let keys = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Log a mood:\n");
    for (key, mood) in keys.mood_keys() {
        text.push_str(&format!("  {}: {} {}\n", display(key), mood.glyph(), mood));
    }
    text.push('\n');

    text.push_str("History:\n");
    text.push_str(&format!("  {} / {}: Move selection up/down\n", display(&keys.list_up), display(&keys.list_down)));
    text.push_str(&format!("  {}: Delete selected entry\n", display(&keys.delete)));
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Dismiss message\n", display(&keys.dismiss)));
    text.push_str(&format!("  {}: Show/hide help\n", display(&keys.help)));
    text.push_str(&format!("  {}: Quit\n", display(&keys.quit)));

    text
}
