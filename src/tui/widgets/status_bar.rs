use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;

use crate::Config;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// What the status bar shows, in priority order
pub enum StatusLine<'a> {
    Error(&'a str),
    Message(&'a str),
    Hints(&'a [String]),
}

pub fn render_status_bar(f: &mut Frame, area: Rect, line: StatusLine<'_>, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let max_width = area.width as usize;

    let (content, style) = match line {
        StatusLine::Error(error) => (
            truncate(&format!("! {}", error), max_width),
            Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        StatusLine::Message(message) => (
            truncate(message, max_width),
            Style::default()
                .fg(get_contrast_text_color(highlight_bg))
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        ),
        StatusLine::Hints(hints) => (fit_hints(hints, max_width), Style::default().fg(fg_color).bg(bg_color)),
    };

    f.render_widget(Paragraph::new(content).style(style), area);
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// Join as many hints as fit, ending with an ellipsis when some are dropped
fn fit_hints(hints: &[String], max_width: usize) -> String {
    let separator = " • ";
    let ellipsis = "...";
    let mut text = String::new();

    for (i, hint) in hints.iter().enumerate() {
        let addition = if i == 0 { hint.chars().count() } else { separator.chars().count() + hint.chars().count() };
        if text.chars().count() + addition > max_width {
            if text.is_empty() {
                return truncate(hint, max_width);
            }
            if text.chars().count() + ellipsis.len() > max_width {
                text = text.chars().take(max_width.saturating_sub(ellipsis.len())).collect();
            }
            text.push_str(ellipsis);
            return text;
        }
        if i > 0 {
            text.push_str(separator);
        }
        text.push_str(hint);
    }

    text
}
