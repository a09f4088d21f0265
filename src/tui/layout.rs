use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub list_area: Rect,
    pub counts_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: 30 columns (28 inner + 2 borders) fits the add form's date
    /// field and the list title
    /// Height: 14 lines (2 outer borders + 9 add-form lines + 1 counts +
    /// 1 status + 1 buffer)
    pub const MIN_WIDTH: u16 = 30;
    pub const MIN_HEIGHT: u16 = 14;

    pub fn calculate(size: Rect) -> Self {
        // Ensure minimum terminal size (accounting for outer border)
        let min_width_with_border = Self::MIN_WIDTH + 2; // +2 for left/right borders
        let min_height_with_border = Self::MIN_HEIGHT + 2; // +2 for top/bottom borders
        let width = size.width.max(min_width_with_border);
        let height = size.height.max(min_height_with_border);
        let size = Rect::new(size.x, size.y, width, height);

        // Calculate inner area (accounting for outer border: 1 char on each side)
        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        // Split vertically: list (or add form), counts (1 line), status (1 line)
        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Task list / add form
                Constraint::Length(1), // Counts
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        Self {
            inner_area,
            list_area: vertical[0],
            counts_area: vertical[1],
            status_area: vertical[2],
        }
    }
}
