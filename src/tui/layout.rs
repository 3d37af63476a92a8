use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Smallest terminal the browser draws into
pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 20;

/// Split-pane layout of the session browser
pub struct AppLayout {
    pub title_area: Rect,
    pub list_area: Rect,
    pub preview_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// - Title bar: top row
    /// - Session list: 45% width (left)
    /// - Preview pane: 55% width (right)
    /// - Status bar: bottom row
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(vertical_chunks[1]);

        Self {
            title_area: vertical_chunks[0],
            list_area: horizontal_chunks[0],
            preview_area: horizontal_chunks[1],
            status_area: vertical_chunks[2],
        }
    }

    /// Rows of the list inside its border, for page navigation
    pub fn list_page_size(&self) -> usize {
        usize::from(self.list_area.height.saturating_sub(2)).max(1)
    }
}

pub fn fits(area: Rect) -> bool {
    area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT
}

/// A `width` x `height` rectangle centred in `area`, clipped to it
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_correctly() {
        let layout = AppLayout::new(Rect::new(0, 0, 100, 30));

        assert_eq!(layout.title_area.height, 1);
        assert_eq!(layout.title_area.y, 0);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.status_area.y, 29);

        assert_eq!(layout.list_area.height, 28);
        assert_eq!(layout.preview_area.height, 28);
        assert_eq!(layout.list_area.width, 45);
        assert_eq!(layout.preview_area.width, 55);
        assert_eq!(layout.list_page_size(), 26);
    }

    #[test]
    fn test_fits_minimum_size() {
        assert!(fits(Rect::new(0, 0, 80, 20)));
        assert!(!fits(Rect::new(0, 0, 79, 40)));
        assert!(!fits(Rect::new(0, 0, 120, 19)));
    }

    #[test]
    fn test_centered_is_clipped() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(centered(area, 40, 10), Rect::new(30, 10, 40, 10));
        assert_eq!(centered(area, 200, 50), area);
    }
}
