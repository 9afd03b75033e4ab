use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::models::Mood;
use crate::tui::widgets::color::{get_contrast_text_color, mood_color};

/// Render the mood selector: one colored card per palette entry, with its key
pub fn render_palette(f: &mut Frame, area: Rect, moods: &[Mood], config: &Config) {
    if moods.is_empty() {
        return;
    }

    let constraints = vec![Constraint::Ratio(1, moods.len() as u32); moods.len()];
    let cards = Layout::horizontal(constraints).split(area);
    let keys = config.key_bindings.mood_keys();

    for (index, (mood, card)) in moods.iter().zip(cards.iter()).enumerate() {
        let bg = mood_color(*mood);
        let fg = get_contrast_text_color(bg);
        let key = keys
            .iter()
            .find(|(_, bound)| bound == mood)
            .map(|(key, _)| crate::utils::format_key_binding_for_display(key))
            .unwrap_or_else(|| (index + 1).to_string());

        let lines = vec![
            Line::styled(
                format!("{} {}", mood.glyph(), mood.label()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::from(format!("[{}]", key)),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(fg).bg(bg));

        f.render_widget(paragraph, *card);
    }
}
