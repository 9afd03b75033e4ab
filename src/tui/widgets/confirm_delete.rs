use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::models::MoodEntry;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;

pub fn render_confirm_delete(f: &mut Frame, area: Rect, entry: &MoodEntry, selection: usize, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = parse_color(&active_theme.highlight_fg);
    let normal = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = popup_area(area, 50, 40);

    // Clear the background first - this prevents content from showing through
    f.render_widget(Clear, popup_area);

    let glyph = entry.mood_kind().map(|m| m.glyph()).unwrap_or("?");
    let mut lines = vec![
        Line::from(Span::styled("Delete this entry?", normal)),
        Line::from(""),
        Line::from(Span::styled(format!("{} {}", glyph, entry.mood), normal)),
        Line::from(Span::styled(entry.timestamp_formatted.clone(), normal)),
        Line::from(""),
    ];

    let options = ["Delete", "Cancel"];
    let option_spans: Vec<Span> = options
        .iter()
        .enumerate()
        .flat_map(|(index, option)| {
            let style = if index == selection {
                Style::default().fg(highlight_fg).bg(highlight_bg)
            } else {
                normal
            };
            [Span::styled(format!(" {} ", option), style), Span::raw("   ")]
        })
        .collect();
    lines.push(Line::from(option_spans));

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Confirm Delete")
            .title_alignment(Alignment::Center)
            .style(normal))
        .style(normal)
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
