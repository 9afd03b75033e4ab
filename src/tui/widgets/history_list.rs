use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::Config;
use crate::models::MoodEntry;
use crate::tui::widgets::color::{mood_color, parse_color};

pub fn render_history(
    f: &mut Frame,
    area: Rect,
    entries: &[MoodEntry],
    list_state: &mut ListState,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("History ({})", entries.len()))
        .style(Style::default().fg(fg_color).bg(bg_color));

    if entries.is_empty() {
        let paragraph = Paragraph::new("No moods logged yet. Pick one above to start.")
            .block(block)
            .style(Style::default().fg(fg_color).bg(bg_color));
        f.render_widget(paragraph, area);
        return;
    }

    // 2 for borders, 2 for the highlight symbol
    let max_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            let (glyph, name_style) = match entry.mood_kind() {
                Some(mood) => (
                    mood.glyph(),
                    Style::default().fg(mood_color(mood)).add_modifier(Modifier::BOLD),
                ),
                None => ("?", Style::default().fg(fg_color)),
            };

            let name = format!("{} {:<8}", glyph, entry.mood);
            let room = max_width.saturating_sub(name.chars().count() + 1);
            let mut when = entry.timestamp_formatted.clone();
            if when.chars().count() > room {
                when = when.chars().take(room.saturating_sub(3)).collect::<String>() + "...";
            }

            ListItem::new(Line::from(vec![
                Span::styled(name, name_style),
                Span::raw(" "),
                Span::styled(when, Style::default().fg(fg_color)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, list_state);
}
