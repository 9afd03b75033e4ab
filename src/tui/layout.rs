use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub palette_area: Rect,
    pub history_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: five palette cards of 8 columns each
    /// Height: 4 palette + 3 history (with borders) + 1 status + 2 buffer
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 10;

    /// Palette cards: 2 border lines + glyph/name line + key line
    const PALETTE_HEIGHT: u16 = 4;

    pub fn calculate(size: Rect) -> Self {
        // Ensure minimum terminal size (accounting for outer border)
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(Self::PALETTE_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner_area);

        Self {
            inner_area,
            palette_area: vertical[0],
            history_area: vertical[1],
            status_area: vertical[2],
        }
    }
}
