use crate::braille::BrailleCanvas;
use crate::classify::{color_for, ColorBand};
use crate::data::{BoundaryFeature, BoundaryStore, Bounds, ProvinceDataset, ProvinceId};
use crate::map::geometry::{draw_dashed_line, draw_thick_line};
use crate::map::projection::Viewport;
use crate::map::raster::{Raster, RasterKey};
use crate::map::spatial::{FeatureGrid, DEFAULT_CELL_SIZE};
use crate::panels::{HoverInfo, InfoPanel};
use geo::{Intersects, LineString, Point};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a list-triggered highlight stays before it is reverted
pub const FOCUS_REVERT: Duration = Duration::from_millis(2000);

/// Braille pens for the two outline styles
pub const PEN_DEFAULT: u8 = 1;
pub const PEN_EMPHASIZED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStyle {
    /// Thin dashed outline
    Default,
    /// Thick solid outline
    Emphasized,
}

/// What the rendering surface can do
#[derive(Debug, Clone, Copy)]
pub struct SurfaceCapabilities {
    /// Hovered shapes may be raised above their siblings
    pub raise_on_hover: bool,
}

impl Default for SurfaceCapabilities {
    fn default() -> Self {
        Self {
            raise_on_hover: true,
        }
    }
}

/// One rendered province: a boundary joined with its dataset record
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ProvinceId,
    pub name: String,
    /// Joined population, `None` on a join miss
    pub population: Option<u64>,
    pub band: ColorBand,
    pub style: ShapeStyle,
    feature: usize,
}

/// Pending revert of a programmatic focus. Not cancelable.
struct FocusRevert {
    due: Instant,
    generation: u64,
    shape: usize,
}

/// Binds the province dataset to boundary shapes and owns their
/// interaction state.
pub struct MapView {
    pub viewport: Viewport,
    capabilities: SurfaceCapabilities,
    boundaries: Option<Arc<BoundaryStore>>,
    shapes: Vec<Shape>,
    /// Draw rank per shape; higher is on top
    z_rank: Vec<usize>,
    next_rank: usize,
    grid: FeatureGrid,
    /// Bumped on every rebuild
    generation: u64,
    /// Bumped whenever the draw order changes
    z_generation: u64,
    reverts: Vec<FocusRevert>,
    raster: Option<Raster>,
    /// Shape the pointer is over, according to the surface
    surface_hover: Option<usize>,
}

impl MapView {
    pub fn new(viewport: Viewport, capabilities: SurfaceCapabilities) -> Self {
        Self {
            viewport,
            capabilities,
            boundaries: None,
            shapes: Vec::new(),
            z_rank: Vec::new(),
            next_rank: 0,
            grid: FeatureGrid::new(DEFAULT_CELL_SIZE),
            generation: 0,
            z_generation: 0,
            reverts: Vec::new(),
            raster: None,
            surface_hover: None,
        }
    }

    /// Discard all shapes and rebuild them from `boundaries` joined with
    /// `dataset`
    pub fn rebuild(&mut self, boundaries: Arc<BoundaryStore>, dataset: &ProvinceDataset) {
        self.shapes = boundaries
            .features()
            .iter()
            .enumerate()
            .map(|(feature, f)| {
                let population = dataset.population_of(&f.id);
                Shape {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    population,
                    band: color_for(population.unwrap_or(0)),
                    style: ShapeStyle::Default,
                    feature,
                }
            })
            .collect();
        self.z_rank = (0..self.shapes.len()).collect();
        self.next_rank = self.shapes.len();
        self.grid = FeatureGrid::build(
            boundaries.features().iter().map(|f| f.bbox),
            DEFAULT_CELL_SIZE,
        );
        self.boundaries = Some(boundaries);
        self.generation += 1;
        self.raster = None;
        self.surface_hover = None;

        let joined = self.shapes.iter().filter(|s| s.population.is_some()).count();
        debug!(
            shapes = self.shapes.len(),
            joined,
            generation = self.generation,
            "rebuilt map shapes"
        );
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Index of the first shape with `id`
    pub fn shape_index(&self, id: &ProvinceId) -> Option<usize> {
        self.shapes.iter().position(|s| &s.id == id)
    }

    fn feature(&self, idx: usize) -> Option<&BoundaryFeature> {
        let shape = self.shapes.get(idx)?;
        self.boundaries.as_ref()?.features().get(shape.feature)
    }

    /// Point-in-shape test; points on an edge count as inside
    fn contains(&self, idx: usize, lon: f64, lat: f64) -> bool {
        self.feature(idx).is_some_and(|f| {
            f.bbox.contains(lon, lat) && f.geometry.intersects(&Point::new(lon, lat))
        })
    }

    pub fn hover_info(&self, idx: usize) -> Option<HoverInfo> {
        self.shapes.get(idx).map(|s| HoverInfo {
            id: s.id.clone(),
            name: s.name.clone(),
            population: s.population,
        })
    }

    /// Emphasize a shape, raise it when the surface allows, show it in the
    /// info panel
    pub fn hover_enter(&mut self, idx: usize, info: &mut InfoPanel) {
        let Some(shape) = self.shapes.get_mut(idx) else {
            return;
        };
        shape.style = ShapeStyle::Emphasized;
        if self.capabilities.raise_on_hover {
            self.bring_to_front(idx);
        }
        info.update(self.hover_info(idx));
    }

    /// Restore the classifier style and idle the info panel
    pub fn hover_exit(&mut self, idx: usize, info: &mut InfoPanel) {
        if let Some(shape) = self.shapes.get_mut(idx) {
            shape.style = ShapeStyle::Default;
        }
        info.update(None);
    }

    /// Fit the viewport to a shape's bounds
    pub fn click(&mut self, idx: usize) {
        if let Some(bbox) = self.feature(idx).map(|f| f.bbox) {
            self.viewport.fit_bounds(bbox);
        }
    }

    /// Fit, emphasize and schedule the revert. Returns false (and does
    /// nothing) when no rendered shape has `id`.
    pub fn focus_programmatic(&mut self, id: &ProvinceId, now: Instant, info: &mut InfoPanel) -> bool {
        let Some(idx) = self.shape_index(id) else {
            debug!(%id, "focus requested for a province that is not on the map");
            return false;
        };
        self.click(idx);
        self.hover_enter(idx, info);
        self.reverts.push(FocusRevert {
            due: now + FOCUS_REVERT,
            generation: self.generation,
            shape: idx,
        });
        true
    }

    /// Fire due focus reverts. A revert from before the last rebuild only
    /// idles the info panel.
    pub fn tick(&mut self, now: Instant, info: &mut InfoPanel) {
        if self.reverts.is_empty() {
            return;
        }
        let mut due = Vec::new();
        self.reverts.retain(|r| {
            if r.due <= now {
                due.push((r.generation, r.shape));
                false
            } else {
                true
            }
        });
        for (generation, shape) in due {
            if generation == self.generation {
                if let Some(s) = self.shapes.get_mut(shape) {
                    s.style = ShapeStyle::Default;
                }
            }
            info.update(None);
        }
    }

    pub fn pending_reverts(&self) -> usize {
        self.reverts.len()
    }

    fn bring_to_front(&mut self, idx: usize) {
        if self.z_rank[idx] + 1 == self.next_rank {
            return;
        }
        self.z_rank[idx] = self.next_rank;
        self.next_rank += 1;
        self.z_generation += 1;
    }

    /// Shape indices back to front
    pub fn draw_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.shapes.len()).collect();
        order.sort_by_key(|&i| self.z_rank[i]);
        order
    }

    /// Topmost shape containing a geographic point, honouring z-order
    fn topmost_at(&self, lon: f64, lat: f64) -> Option<usize> {
        self.grid
            .query_point(lon, lat)
            .iter()
            .copied()
            .filter(|&idx| self.contains(idx, lon, lat))
            .max_by_key(|&idx| self.z_rank[idx])
    }

    /// Ambient lookup: test every shape in load order, the last one
    /// containing the point wins
    pub fn feature_at(&self, lon: f64, lat: f64) -> Option<usize> {
        self.grid
            .query_point(lon, lat)
            .iter()
            .copied()
            .filter(|&idx| self.contains(idx, lon, lat))
            .last()
    }

    fn raster_key(&self) -> RasterKey {
        RasterKey {
            viewport: self.viewport.cache_key(),
            generation: self.generation,
            z_generation: self.z_generation,
        }
    }

    /// Size the viewport to the map area and re-rasterize if anything
    /// it depends on changed
    pub fn prepare(&mut self, cols: u16, rows: u16) {
        self.viewport.resize_cells(cols, rows);
        let key = self.raster_key();
        if self.raster.as_ref().is_some_and(|r| r.key() == key) {
            return;
        }
        let viewport = &self.viewport;
        let raster = Raster::build(key, cols, rows, |col, row| {
            let (lon, lat) = viewport.cell_center(col, row);
            self.topmost_at(lon, lat)
        });
        self.raster = Some(raster);
    }

    /// Shape drawn at a map cell. Uses the raster when it is current.
    pub fn surface_owner(&self, col: u16, row: u16) -> Option<usize> {
        match &self.raster {
            Some(raster) if raster.key() == self.raster_key() => raster.owner(col, row),
            _ => {
                let (lon, lat) = self.viewport.cell_center(col, row);
                self.topmost_at(lon, lat)
            }
        }
    }

    /// Band filling a map cell, from the last raster
    pub fn cell_band(&self, col: u16, row: u16) -> Option<ColorBand> {
        let owner = self.raster.as_ref()?.owner(col, row)?;
        self.shapes.get(owner).map(|s| s.band)
    }

    /// Per-shape pointer events: exit the previous shape and enter the new
    /// one when the pointer crosses into a different shape
    pub fn surface_pointer(&mut self, col: u16, row: u16, info: &mut InfoPanel) {
        let over = self.surface_owner(col, row);
        if over == self.surface_hover {
            return;
        }
        if let Some(old) = self.surface_hover.take() {
            self.hover_exit(old, info);
        }
        if let Some(new) = over {
            self.hover_enter(new, info);
        }
        self.surface_hover = over;
    }

    /// Pointer left the map area
    pub fn pointer_left(&mut self, info: &mut InfoPanel) {
        if let Some(old) = self.surface_hover.take() {
            self.hover_exit(old, info);
        }
    }

    /// Ambient tracking: point-in-polygon against every shape
    pub fn track_pointer(&self, col: u16, row: u16, info: &mut InfoPanel) {
        let (lon, lat) = self.viewport.cell_center(col, row);
        info.update(self.feature_at(lon, lat).and_then(|idx| self.hover_info(idx)));
    }

    /// Click on a map cell
    pub fn click_at(&mut self, col: u16, row: u16) {
        if let Some(idx) = self.surface_owner(col, row) {
            self.click(idx);
        }
    }

    pub fn surface_hover(&self) -> Option<usize> {
        self.surface_hover
    }

    /// Province outlines on a braille canvas of `cols` x `rows` cells, pen
    /// per cell set by the topmost shape drawn there
    pub fn outlines(&self, cols: usize, rows: usize) -> BrailleCanvas {
        let mut canvas = BrailleCanvas::new(cols, rows);
        let visible = self.viewport.visible_bounds();

        for idx in self.draw_order() {
            let Some(feature) = self.feature(idx) else {
                continue;
            };
            if !feature.bbox.intersects(&visible) {
                continue;
            }
            let style = self.shapes[idx].style;
            canvas.set_pen(match style {
                ShapeStyle::Default => PEN_DEFAULT,
                ShapeStyle::Emphasized => PEN_EMPHASIZED,
            });
            for polygon in &feature.geometry {
                for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                    self.draw_ring(&mut canvas, ring, style);
                }
            }
        }

        canvas
    }

    fn draw_ring(&self, canvas: &mut BrailleCanvas, ring: &LineString<f64>, style: ShapeStyle) {
        let mut prev: Option<(i32, i32)> = None;
        let mut phase = 0u32;

        for coord in ring.coords() {
            let (px, py) = self.viewport.project(coord.x, coord.y);

            if let Some((prev_x, prev_y)) = prev {
                if self.viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                    match style {
                        ShapeStyle::Default => {
                            draw_dashed_line(canvas, prev_x, prev_y, px, py, &mut phase)
                        }
                        ShapeStyle::Emphasized => draw_thick_line(canvas, prev_x, prev_y, px, py),
                    }
                }
            }

            prev = Some((px, py));
        }
    }

    /// Bounds of every loaded boundary
    pub fn extent(&self) -> Option<Bounds> {
        self.boundaries.as_ref().and_then(|b| b.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{collection, square_feature, ProvinceRecord, Year};

    /// Three side-by-side 1°x1° provinces along the equator at 110..113°E
    fn store() -> Arc<BoundaryStore> {
        let doc = collection(&[
            square_feature("31", "DKI Jakarta", 110.0, 0.0, 1.0),
            square_feature("32", "Jawa Barat", 111.0, 0.0, 1.0),
            square_feature("33", "Jawa Tengah", 112.0, 0.0, 1.0),
        ]);
        Arc::new(BoundaryStore::from_geojson("test", &doc).unwrap())
    }

    fn dataset() -> ProvinceDataset {
        let mut d = ProvinceDataset::new();
        d.replace(
            Year::new("2020"),
            vec![
                ProvinceRecord::new("31", "DKI Jakarta", 10_562_088),
                ProvinceRecord::new("32", "Jawa Barat", 25_000_000),
            ],
        );
        d
    }

    /// 40x20 cell map showing 110..113°E around the equator
    fn view(raise: bool) -> MapView {
        let mut view = MapView::new(
            Viewport::new(111.5, 0.5, 1.0, 80, 80),
            SurfaceCapabilities {
                raise_on_hover: raise,
            },
        );
        view.rebuild(store(), &dataset());
        view.viewport.resize_cells(40, 20);
        view.viewport.fit_bounds(view.extent().unwrap());
        view.prepare(40, 20);
        view
    }

    /// Map cell whose centre lies inside the shape with `id`
    fn cell_of(view: &MapView, id: &str) -> (u16, u16) {
        let idx = view.shape_index(&ProvinceId::new(id)).unwrap();
        for row in 0..20 {
            for col in 0..40 {
                let (lon, lat) = view.viewport.cell_center(col, row);
                if view.feature_at(lon, lat) == Some(idx) {
                    return (col, row);
                }
            }
        }
        panic!("no cell inside {id}");
    }

    #[test]
    fn test_join_colours_and_defaults_missing_to_zero() {
        let view = view(true);
        let bands: Vec<ColorBand> = view.shapes().iter().map(|s| s.band).collect();
        assert_eq!(bands, vec![ColorBand::Band6, ColorBand::Band7, ColorBand::Band1]);
        assert_eq!(view.shapes()[2].population, None);
    }

    #[test]
    fn test_rebuild_discards_shapes_and_bumps_generation() {
        let mut view = view(true);
        let before = view.generation();
        let mut other = ProvinceDataset::new();
        other.replace(Year::new("2010"), vec![ProvinceRecord::new("33", "Jawa Tengah", 45_000_000)]);
        view.rebuild(store(), &other);
        assert_eq!(view.generation(), before + 1);
        assert_eq!(view.shapes()[0].band, ColorBand::Band1);
        assert_eq!(view.shapes()[2].band, ColorBand::Band8);
    }

    #[test]
    fn test_hover_enter_and_exit() {
        let mut view = view(true);
        let mut info = InfoPanel::new();
        view.hover_enter(1, &mut info);
        assert_eq!(view.shapes()[1].style, ShapeStyle::Emphasized);
        let shown = info.current().unwrap();
        assert_eq!(shown.name, "Jawa Barat");
        assert_eq!(shown.population, Some(25_000_000));
        assert_eq!(info.lines()[1], "25.000.000 people");
        assert_eq!(view.shapes()[1].band, ColorBand::Band7);

        view.hover_exit(1, &mut info);
        assert_eq!(view.shapes()[1].style, ShapeStyle::Default);
        assert!(info.current().is_none());
    }

    #[test]
    fn test_hover_raises_only_with_capability() {
        let mut raising = view(true);
        let mut info = InfoPanel::new();
        raising.hover_enter(0, &mut info);
        assert_eq!(raising.draw_order(), vec![1, 2, 0]);

        let mut fixed = view(false);
        fixed.hover_enter(0, &mut info);
        assert_eq!(fixed.draw_order(), vec![0, 1, 2]);
        assert_eq!(fixed.shapes()[0].style, ShapeStyle::Emphasized);
    }

    #[test]
    fn test_click_fits_viewport_to_shape() {
        let mut view = view(true);
        view.click(2);
        assert!((view.viewport.center_lon - 112.5).abs() < 1e-9);
        let whole_zoom = {
            let mut v = view.viewport.clone();
            v.fit_bounds(view.extent().unwrap());
            v.zoom
        };
        assert!(view.viewport.zoom > whole_zoom);
    }

    #[test]
    fn test_focus_programmatic_reverts_after_delay() {
        let mut view = view(true);
        let mut info = InfoPanel::new();
        let t0 = Instant::now();
        assert!(view.focus_programmatic(&ProvinceId::new("32"), t0, &mut info));
        assert_eq!(view.shapes()[1].style, ShapeStyle::Emphasized);
        assert!((view.viewport.center_lon - 111.5).abs() < 1e-9);
        assert_eq!(info.current().unwrap().name, "Jawa Barat");

        view.tick(t0 + Duration::from_millis(1999), &mut info);
        assert_eq!(view.shapes()[1].style, ShapeStyle::Emphasized);

        view.tick(t0 + FOCUS_REVERT, &mut info);
        assert_eq!(view.shapes()[1].style, ShapeStyle::Default);
        assert!(info.current().is_none());
        assert_eq!(view.pending_reverts(), 0);
    }

    #[test]
    fn test_focus_unknown_id_is_noop() {
        let mut view = view(true);
        let mut info = InfoPanel::new();
        let before = view.viewport.clone();
        assert!(!view.focus_programmatic(&ProvinceId::new("99"), Instant::now(), &mut info));
        assert_eq!(view.viewport, before);
        assert_eq!(view.pending_reverts(), 0);
        assert!(info.current().is_none());
    }

    #[test]
    fn test_revert_races_with_manual_hover() {
        let mut view = view(true);
        let mut info = InfoPanel::new();
        let t0 = Instant::now();
        view.focus_programmatic(&ProvinceId::new("31"), t0, &mut info);
        // Manual hover in the window; the timer still wins afterwards
        view.hover_exit(0, &mut info);
        view.hover_enter(0, &mut info);
        view.tick(t0 + FOCUS_REVERT, &mut info);
        assert_eq!(view.shapes()[0].style, ShapeStyle::Default);
        assert!(info.current().is_none());
    }

    #[test]
    fn test_revert_after_rebuild_leaves_new_shapes_alone() {
        let mut view = view(true);
        let mut info = InfoPanel::new();
        let t0 = Instant::now();
        view.focus_programmatic(&ProvinceId::new("31"), t0, &mut info);
        view.rebuild(store(), &dataset());
        view.hover_enter(0, &mut info);
        view.tick(t0 + FOCUS_REVERT, &mut info);
        assert_eq!(view.shapes()[0].style, ShapeStyle::Emphasized);
        assert!(info.current().is_none());
    }

    #[test]
    fn test_surface_pointer_emits_exit_then_enter() {
        let mut view = view(true);
        let mut info = InfoPanel::new();
        let (c0, r0) = cell_of(&view, "31");
        let (c1, r1) = cell_of(&view, "32");

        view.surface_pointer(c0, r0, &mut info);
        assert_eq!(view.surface_hover(), Some(0));
        assert_eq!(view.shapes()[0].style, ShapeStyle::Emphasized);

        view.surface_pointer(c1, r1, &mut info);
        assert_eq!(view.surface_hover(), Some(1));
        assert_eq!(view.shapes()[0].style, ShapeStyle::Default);
        assert_eq!(view.shapes()[1].style, ShapeStyle::Emphasized);
        assert_eq!(info.current().unwrap().name, "Jawa Barat");

        view.pointer_left(&mut info);
        assert_eq!(view.surface_hover(), None);
        assert_eq!(view.shapes()[1].style, ShapeStyle::Default);
        assert!(info.current().is_none());
    }

    #[test]
    fn test_shared_edge_resolves_to_later_shape() {
        let view = view(true);
        // Edge shared by 31 and 32
        assert_eq!(view.feature_at(111.0, 0.5), Some(1));
        // Outer top edge of 31 alone
        assert_eq!(view.feature_at(110.5, 1.0), Some(0));
        // Just outside
        assert_eq!(view.feature_at(110.5, 1.001), None);
    }

    #[test]
    fn test_track_pointer_updates_info_without_styling() {
        let view = view(true);
        let mut info = InfoPanel::new();
        let (col, row) = cell_of(&view, "33");
        view.track_pointer(col, row, &mut info);
        let shown = info.current().unwrap();
        assert_eq!(shown.name, "Jawa Tengah");
        assert_eq!(shown.population, None);
        assert!(view.shapes().iter().all(|s| s.style == ShapeStyle::Default));

        // Outside every province
        view.track_pointer(0, 0, &mut info);
        assert!(info.current().is_none());
    }

    #[test]
    fn test_raster_fills_cells_with_bands() {
        let view = view(true);
        let (col, row) = cell_of(&view, "32");
        assert_eq!(view.cell_band(col, row), Some(ColorBand::Band7));
        assert_eq!(view.cell_band(0, 0), None);
    }

    #[test]
    fn test_outlines_use_emphasis_pen_for_hovered_shape() {
        let mut view = view(true);
        let mut info = InfoPanel::new();
        view.hover_enter(1, &mut info);
        let canvas = view.outlines(40, 20);
        let mut pens = Vec::new();
        for row in 0..20 {
            for col in 0..40 {
                if canvas.glyph(col, row).is_some() {
                    pens.push(canvas.pen_at(col, row));
                }
            }
        }
        assert!(pens.contains(&PEN_DEFAULT));
        assert!(pens.contains(&PEN_EMPHASIZED));
    }
}
