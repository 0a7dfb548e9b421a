use crate::data::Bounds;
use std::f64::consts::PI;

/// Initial view: the middle of the archipelago
pub const HOME_LON: f64 = 118.0;
pub const HOME_LAT: f64 = -2.5;
pub const HOME_ZOOM: f64 = 7.0;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 2000.0;
/// Fraction of the extent added on every side by `fit_bounds`
const FIT_PADDING: f64 = 0.05;

/// Web Mercator y in [0, 1] (0 = north edge)
#[inline]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-85.0, 85.0) * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline]
fn inverse_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI
}

/// Viewport representing the visible map area and zoom level.
/// Width and height are in braille pixels (2x4 per terminal cell).
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (1.0 = whole world across the canvas width)
    pub zoom: f64,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Indonesia-centred starting view
    pub fn home(width: usize, height: usize) -> Self {
        Self::new(HOME_LON, HOME_LAT, HOME_ZOOM, width, height)
    }

    /// Resize to a map area of `cols` x `rows` terminal cells
    pub fn resize_cells(&mut self, cols: u16, rows: u16) {
        self.width = cols as usize * 2;
        self.height = rows as usize * 4;
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.zoom * self.width.max(1) as f64;
        self.center_lon += dx as f64 * 360.0 / scale;
        let y = mercator_y(self.center_lat) + dy as f64 / scale;
        self.center_lat = inverse_mercator_y(y).clamp(-85.0, 85.0);

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        // Keep the point under the cursor fixed
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Center on `bounds` at the largest zoom that shows all of it
    pub fn fit_bounds(&mut self, bounds: Bounds) {
        let dx = (bounds.max_lon - bounds.min_lon) / 360.0;
        let dy = mercator_y(bounds.min_lat) - mercator_y(bounds.max_lat);
        if self.width == 0 || self.height == 0 || dx < 0.0 || dy < 0.0 {
            return;
        }

        let pad = 1.0 + FIT_PADDING * 2.0;
        let zoom_x = if dx > 0.0 { 1.0 / (dx * pad) } else { MAX_ZOOM };
        let zoom_y = if dy > 0.0 {
            self.height as f64 / (self.width as f64 * dy * pad)
        } else {
            MAX_ZOOM
        };
        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);

        self.center_lon = (bounds.min_lon + bounds.max_lon) / 2.0;
        let mid_y = (mercator_y(bounds.min_lat) + mercator_y(bounds.max_lat)) / 2.0;
        self.center_lat = inverse_mercator_y(mid_y);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        self.unproject_f(px as f64, py as f64)
    }

    /// Sub-pixel unprojection, used for cell centres
    pub fn unproject_f(&self, px: f64, py: f64) -> (f64, f64) {
        let scale = self.zoom * self.width.max(1) as f64;
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let x = (px - self.width as f64 / 2.0) / scale + center_x;
        let y = (py - self.height as f64 / 2.0) / scale + center_y;

        (x * 360.0 - 180.0, inverse_mercator_y(y))
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let scale = self.zoom * self.width as f64;

        let px = ((x - center_x) * scale + self.width as f64 / 2.0).floor() as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0).floor() as i32;

        (px, py)
    }

    /// Geographic position at the centre of terminal cell (col, row)
    pub fn cell_center(&self, col: u16, row: u16) -> (f64, f64) {
        self.unproject_f(col as f64 * 2.0 + 1.0, row as f64 * 4.0 + 2.0)
    }

    /// Geographic extent currently on screen
    pub fn visible_bounds(&self) -> Bounds {
        let (min_lon, max_lat) = self.unproject(0, 0);
        let (max_lon, min_lat) = self.unproject(self.width as i32, self.height as i32);
        Bounds {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }

    /// Key for caches that depend on what is on screen
    pub fn cache_key(&self) -> (u64, u64, u64, usize, usize) {
        (
            self.center_lon.to_bits(),
            self.center_lat.to_bits(),
            self.zoom.to_bits(),
            self.width,
            self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::home(200, 160);
        let (px, py) = vp.project(106.8, -6.2);
        let (lon, lat) = vp.unproject_f(px as f64 + 0.5, py as f64 + 0.5);
        assert!((lon - 106.8).abs() < 0.1);
        assert!((lat + 6.2).abs() < 0.1);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, 10);
        assert!(vp.center_lat < 0.0);
    }

    #[test]
    fn test_fit_bounds_centers_and_contains_extent() {
        let mut vp = Viewport::home(200, 120);
        let bounds = Bounds {
            min_lon: 106.0,
            min_lat: -7.0,
            max_lon: 108.0,
            max_lat: -6.0,
        };
        vp.fit_bounds(bounds);
        assert!((vp.center_lon - 107.0).abs() < 1e-9);
        assert!(vp.center_lat < -6.0 && vp.center_lat > -7.0);

        let (x0, y0) = vp.project(bounds.min_lon, bounds.max_lat);
        let (x1, y1) = vp.project(bounds.max_lon, bounds.min_lat);
        assert!(x0 >= 0 && y0 >= 0);
        assert!(x1 <= vp.width as i32 && y1 <= vp.height as i32);
        // Tight along at least one axis
        assert!(x0 < 20 || y0 < 20);
    }

    #[test]
    fn test_fit_bounds_ignores_empty_canvas() {
        let mut vp = Viewport::home(0, 0);
        let before = vp.clone();
        vp.fit_bounds(Bounds {
            min_lon: 0.0,
            min_lat: 0.0,
            max_lon: 1.0,
            max_lat: 1.0,
        });
        assert_eq!(vp, before);
    }

    #[test]
    fn test_zoom_at_keeps_cursor_point() {
        let mut vp = Viewport::home(200, 160);
        let before = vp.unproject(40, 40);
        vp.zoom_in_at(40, 40);
        let after = vp.unproject(40, 40);
        assert!((before.0 - after.0).abs() < 0.5);
        assert!((before.1 - after.1).abs() < 0.5);
    }
}
