use crate::api::{Completion, Request, Transport};
use crate::data::{BoundaryStore, ProvinceDataset, ProvinceId, Year};
use crate::error::DataError;
use crate::layout::ScreenLayout;
use crate::map::{MapView, SurfaceCapabilities, Viewport};
use crate::panels::{InfoPanel, Legend, ProvinceList, YearSelector};
use ratatui::layout::Rect;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Rows scrolled per mouse wheel step in the list
const LIST_SCROLL: i32 = 3;

/// Which pane receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Map,
    List,
    Search,
}

/// Everything the screen is rendered from. Single owner: [`App`].
#[derive(Debug)]
pub struct ViewState {
    pub years: Vec<Year>,
    /// Year of the active button; may differ from `dataset.year()` while a
    /// load is in flight or after completions arrived out of order
    pub current_year: Year,
    pub boundaries: Option<Arc<BoundaryStore>>,
    pub dataset: ProvinceDataset,
    pub hovered: Option<ProvinceId>,
    pub search: String,
    /// Last fetch error
    pub status: Option<String>,
    /// Requests issued and not yet completed
    pub pending: usize,
    boundaries_requested: bool,
}

impl ViewState {
    fn new(current_year: Year) -> Self {
        Self {
            years: Vec::new(),
            current_year,
            boundaries: None,
            dataset: ProvinceDataset::new(),
            hovered: None,
            search: String::new(),
            status: None,
            pending: 0,
            boundaries_requested: false,
        }
    }
}

struct Drag {
    last: (u16, u16),
    moved: bool,
}

/// Application state: sequences fetches, applies their completions and
/// routes input to the panels
pub struct App {
    pub state: ViewState,
    pub map: MapView,
    pub info: InfoPanel,
    pub legend: Legend,
    pub list: ProvinceList,
    pub years: YearSelector,
    pub layout: ScreenLayout,
    pub focus: Focus,
    pub should_quit: bool,
    drag: Option<Drag>,
    transport: Box<dyn Transport>,
}

impl App {
    pub fn new(
        transport: Box<dyn Transport>,
        initial_year: Year,
        capabilities: SurfaceCapabilities,
        width: u16,
        height: u16,
    ) -> Self {
        let layout = ScreenLayout::compute(Rect::new(0, 0, width, height));
        let viewport = Viewport::home(
            layout.map_inner.width as usize * 2,
            layout.map_inner.height as usize * 4,
        );

        Self {
            state: ViewState::new(initial_year),
            map: MapView::new(viewport, capabilities),
            info: InfoPanel::new(),
            legend: Legend::new(),
            list: ProvinceList::new(),
            years: YearSelector::new(),
            layout,
            focus: Focus::Map,
            should_quit: false,
            drag: None,
            transport,
        }
    }

    /// Kick off the fetch chain: years, then boundaries, then the
    /// current year's provinces
    pub fn start(&mut self) {
        info!(year = %self.state.current_year, "starting");
        self.request(Request::Years);
    }

    fn request(&mut self, request: Request) {
        debug!(?request, "issuing request");
        self.state.pending += 1;
        self.transport.request(request);
    }

    /// Boundaries are fetched once per session
    fn request_boundaries(&mut self) {
        if self.state.boundaries_requested {
            return;
        }
        self.state.boundaries_requested = true;
        self.request(Request::Boundaries);
    }

    pub fn load_year(&mut self, year: Year) {
        self.request(Request::Provinces(year));
    }

    /// Apply one fetch result. Completions are applied in arrival order;
    /// the last province load to arrive wins.
    pub fn apply(&mut self, completion: Completion) {
        self.state.pending = self.state.pending.saturating_sub(1);

        match completion {
            Completion::Years(Ok(years)) => {
                info!(count = years.len(), "years loaded");
                self.state.years = years;
                self.years.render(&self.state.years, &self.state.current_year);
                self.request_boundaries();
            }
            Completion::Boundaries(Ok(store)) => {
                info!(features = store.len(), "boundaries loaded");
                self.state.boundaries = Some(Arc::new(store));
                self.load_year(self.state.current_year.clone());
            }
            Completion::Provinces {
                year,
                result: Ok(records),
            } => {
                info!(%year, records = records.len(), "provinces loaded");
                self.state.dataset.replace(year, records);
                self.list.render(self.state.dataset.records());
                if let Some(boundaries) = &self.state.boundaries {
                    self.map.rebuild(Arc::clone(boundaries), &self.state.dataset);
                }
                self.sync_hover();
                self.state.status = None;
            }
            Completion::Years(Err(err)) | Completion::Boundaries(Err(err)) => self.fail(err),
            Completion::Provinces {
                year,
                result: Err(err),
            } => {
                debug!(%year, "province load failed");
                self.fail(err);
            }
        }
    }

    fn fail(&mut self, err: DataError) {
        warn!(error = %err, kind = err.kind(), "fetch failed");
        self.state.status = Some(err.to_string());
    }

    /// Sum over the loaded dataset, independent of the search term
    pub fn total_population(&self) -> u64 {
        self.state.dataset.total_population()
    }

    fn activate_year(&mut self, year: Option<Year>) {
        let Some(year) = year else {
            return;
        };
        info!(%year, "year selected");
        self.state.current_year = year.clone();
        self.load_year(year);
    }

    /// Press year button `idx`
    pub fn select_year(&mut self, idx: usize) {
        let year = self.years.select(idx);
        self.activate_year(year);
    }

    pub fn next_year(&mut self) {
        let year = self.years.select_next();
        self.activate_year(year);
    }

    pub fn prev_year(&mut self) {
        let year = self.years.select_prev();
        self.activate_year(year);
    }

    pub fn push_search(&mut self, ch: char) {
        self.state.search.push(ch);
        self.apply_search();
    }

    pub fn pop_search(&mut self) {
        self.state.search.pop();
        self.apply_search();
    }

    pub fn clear_search(&mut self) {
        self.state.search.clear();
        self.apply_search();
    }

    /// Re-render the list from the dataset filtered by the search term;
    /// the map is untouched
    fn apply_search(&mut self) {
        let matches = self.state.dataset.filter(&self.state.search);
        debug!(term = %self.state.search, matches = matches.len(), "search");
        self.list.render(matches);
    }

    fn list_height(&self) -> usize {
        self.layout.list_inner.height as usize
    }

    pub fn list_next(&mut self) {
        let height = self.list_height();
        self.list.select_next(height);
    }

    pub fn list_prev(&mut self) {
        let height = self.list_height();
        self.list.select_prev(height);
    }

    pub fn list_scroll(&mut self, delta: i32) {
        let height = self.list_height();
        self.list.scroll(delta, height);
    }

    /// Fit and highlight the selected list row on the map
    pub fn focus_selected(&mut self, now: Instant) {
        if let Some(id) = self.list.selected().map(|row| row.id.clone()) {
            self.map.focus_programmatic(&id, now, &mut self.info);
        }
    }

    /// Click on visible list line `line`
    pub fn list_click(&mut self, line: usize, now: Instant) {
        if let Some(id) = self.list.click(line).map(|row| row.id.clone()) {
            self.map.focus_programmatic(&id, now, &mut self.info);
        }
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.map.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.map.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.map.viewport.zoom_out();
    }

    /// Back to the initial view
    pub fn reset_view(&mut self) {
        let (width, height) = (self.map.viewport.width, self.map.viewport.height);
        self.map.viewport = Viewport::home(width, height);
    }

    fn sync_hover(&mut self) {
        self.state.hovered = self
            .map
            .surface_hover()
            .and_then(|idx| self.map.shapes().get(idx))
            .map(|shape| shape.id.clone());
    }

    /// Pointer moved to screen cell `(col, row)`. Feeds both the
    /// per-shape events and the ambient tracker.
    pub fn pointer_moved(&mut self, col: u16, row: u16) {
        match self.layout.map_cell(col, row) {
            Some((c, r)) => {
                self.map.surface_pointer(c, r, &mut self.info);
                self.map.track_pointer(c, r, &mut self.info);
            }
            None => self.map.pointer_left(&mut self.info),
        }
        self.sync_hover();
    }

    pub fn mouse_down(&mut self, col: u16, row: u16, now: Instant) {
        if self.layout.map_cell(col, row).is_some() {
            self.focus = Focus::Map;
            self.drag = Some(Drag {
                last: (col, row),
                moved: false,
            });
        } else if let Some(line) = self.layout.list_line(col, row) {
            self.focus = Focus::List;
            self.list_click(line, now);
        } else if let Some(x) = self.layout.year_offset(col, row) {
            if let Some(idx) = self.years.button_at(x) {
                self.select_year(idx);
            }
        } else if self.layout.in_search(col, row) {
            self.focus = Focus::Search;
        }
    }

    /// Drag pans the map so the grabbed point follows the pointer
    pub fn mouse_drag(&mut self, col: u16, row: u16) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let dx = (drag.last.0 as i32 - col as i32) * 2;
        let dy = (drag.last.1 as i32 - row as i32) * 4;
        drag.last = (col, row);
        if dx != 0 || dy != 0 {
            drag.moved = true;
            self.map.viewport.pan(dx, dy);
        }
    }

    /// Release without a drag is a click on the map
    pub fn mouse_up(&mut self, col: u16, row: u16) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if drag.moved {
            return;
        }
        if let Some((c, r)) = self.layout.map_cell(col, row) {
            self.map.click_at(c, r);
        }
    }

    /// Wheel: zoom about the pointer on the map, scroll on the list
    pub fn wheel(&mut self, col: u16, row: u16, up: bool) {
        if let Some((c, r)) = self.layout.map_cell(col, row) {
            let (px, py) = (c as i32 * 2, r as i32 * 4);
            if up {
                self.map.viewport.zoom_in_at(px, py);
            } else {
                self.map.viewport.zoom_out_at(px, py);
            }
        } else if self.layout.list_line(col, row).is_some() {
            self.list_scroll(if up { -LIST_SCROLL } else { LIST_SCROLL });
        }
    }

    /// Fire due timers
    pub fn tick(&mut self, now: Instant) {
        self.map.tick(now, &mut self.info);
    }

    /// Bring caches up to date before drawing
    pub fn prepare_frame(&mut self) {
        let inner = self.layout.map_inner;
        self.map.prepare(inner.width, inner.height);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.layout = ScreenLayout::compute(Rect::new(0, 0, width, height));
        let inner = self.layout.map_inner;
        self.map.viewport.resize_cells(inner.width, inner.height);
        self.map.pointer_left(&mut self.info);
        self.sync_hover();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
