use crate::data::Year;

/// Columns between two buttons
const GAP: u16 = 1;

/// One clickable button per year, at most one active.
#[derive(Debug, Default)]
pub struct YearSelector {
    years: Vec<Year>,
    active: Option<usize>,
}

impl YearSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out buttons for `years`; `current` is active if present
    pub fn render(&mut self, years: &[Year], current: &Year) {
        self.years = years.to_vec();
        self.active = self.years.iter().position(|y| y == current);
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn active(&self) -> Option<&Year> {
        self.active.and_then(|idx| self.years.get(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Activate button `idx`, returning its year
    pub fn select(&mut self, idx: usize) -> Option<Year> {
        let year = self.years.get(idx)?.clone();
        self.active = Some(idx);
        Some(year)
    }

    /// Activate the button after the active one (wrapping)
    pub fn select_next(&mut self) -> Option<Year> {
        if self.years.is_empty() {
            return None;
        }
        let idx = self.active.map_or(0, |i| (i + 1) % self.years.len());
        self.select(idx)
    }

    /// Activate the button before the active one (wrapping)
    pub fn select_prev(&mut self) -> Option<Year> {
        if self.years.is_empty() {
            return None;
        }
        let len = self.years.len();
        let idx = self.active.map_or(len - 1, |i| (i + len - 1) % len);
        self.select(idx)
    }

    /// `(x offset, width, year, active)` per button
    pub fn buttons(&self) -> impl Iterator<Item = (u16, u16, &Year, bool)> {
        let mut x = 0u16;
        self.years.iter().enumerate().map(move |(idx, year)| {
            let label = u16::try_from(year.as_str().chars().count()).unwrap_or(u16::MAX);
            let width = label.saturating_add(2);
            let start = x;
            x = x.saturating_add(width).saturating_add(GAP);
            (start, width, year, self.active == Some(idx))
        })
    }

    /// Button under column `x` (relative to the bar's left edge)
    pub fn button_at(&self, x: u16) -> Option<usize> {
        self.buttons()
            .position(|(start, width, _, _)| x >= start && x < start.saturating_add(width))
    }
}
