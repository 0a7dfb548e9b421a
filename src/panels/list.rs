use crate::data::{ProvinceId, ProvinceRecord};
use crate::format::format_population;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: ProvinceId,
    pub name: String,
    pub population: u64,
    pub label: String,
}

/// Province list, most populous first.
///
/// Ties keep their input order (stable sort); no secondary key.
#[derive(Debug, Default)]
pub struct ProvinceList {
    rows: Vec<ListRow>,
    selected: usize,
    offset: usize,
}

impl ProvinceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows with `records`, sorted by population descending
    pub fn render<'a>(&mut self, records: impl IntoIterator<Item = &'a ProvinceRecord>) {
        let mut rows: Vec<ListRow> = records
            .into_iter()
            .map(|r| ListRow {
                id: r.id.clone(),
                name: r.name.clone(),
                population: r.population,
                label: format_population(r.population),
            })
            .collect();
        rows.sort_by(|a, b| b.population.cmp(&a.population));
        self.rows = rows;
        self.selected = 0;
        self.offset = 0;
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn selected(&self) -> Option<&ListRow> {
        self.rows.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// First row on screen
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn select_next(&mut self, height: usize) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
        self.scroll_to_selection(height);
    }

    pub fn select_prev(&mut self, height: usize) {
        self.selected = self.selected.saturating_sub(1);
        self.scroll_to_selection(height);
    }

    /// Scroll by `delta` rows (mouse wheel), selection untouched
    pub fn scroll(&mut self, delta: i32, height: usize) {
        let max_offset = self.rows.len().saturating_sub(height);
        let offset = (self.offset as i64 + delta as i64).clamp(0, max_offset as i64);
        self.offset = offset as usize;
    }

    /// Row shown at `line` (0 = first visible line); selects it
    pub fn click(&mut self, line: usize) -> Option<&ListRow> {
        let idx = self.offset + line;
        if idx < self.rows.len() {
            self.selected = idx;
            self.rows.get(idx)
        } else {
            None
        }
    }

    fn scroll_to_selection(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected + 1 - height;
        }
    }

    /// Rows visible in a viewport of `height` lines
    pub fn visible(&self, height: usize) -> impl Iterator<Item = (usize, &ListRow)> {
        self.rows.iter().enumerate().skip(self.offset).take(height)
    }
}
