use ratatui::layout::{Constraint, Direction, Layout, Margin, Position, Rect};

/// Label in front of the year buttons
pub const YEARS_LABEL: &str = " Year: ";
/// Sidebar width in cells
pub const SIDEBAR_WIDTH: u16 = 38;

/// Screen regions, in absolute terminal coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub years: Rect,
    pub map: Rect,
    /// Map area inside its border
    pub map_inner: Rect,
    pub search: Rect,
    pub list: Rect,
    /// List rows inside the border
    pub list_inner: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn compute(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(1), // Year buttons
                Constraint::Min(3),    // Map + sidebar
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(SIDEBAR_WIDTH)])
            .split(rows[2]);

        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(2)])
            .split(body[1]);

        let border = Margin {
            horizontal: 1,
            vertical: 1,
        };
        Self {
            header: rows[0],
            years: rows[1],
            map: body[0],
            map_inner: body[0].inner(border),
            search: sidebar[0],
            list: sidebar[1],
            list_inner: sidebar[1].inner(border),
            status: rows[3],
        }
    }

    /// Column where the first year button starts
    pub fn year_buttons_x(&self) -> u16 {
        self.years.x + YEARS_LABEL.len() as u16
    }

    /// `(col, row)` relative to the map area, if inside it
    pub fn map_cell(&self, col: u16, row: u16) -> Option<(u16, u16)> {
        self.map_inner
            .contains(Position::new(col, row))
            .then(|| (col - self.map_inner.x, row - self.map_inner.y))
    }

    /// Visible list line under `(col, row)`
    pub fn list_line(&self, col: u16, row: u16) -> Option<usize> {
        self.list_inner
            .contains(Position::new(col, row))
            .then(|| (row - self.list_inner.y) as usize)
    }

    /// Column relative to the first year button, if on the years bar
    pub fn year_offset(&self, col: u16, row: u16) -> Option<u16> {
        let start = self.year_buttons_x();
        (self.years.contains(Position::new(col, row)) && col >= start).then(|| col - start)
    }

    pub fn in_search(&self, col: u16, row: u16) -> bool {
        self.search.contains(Position::new(col, row))
    }
}
