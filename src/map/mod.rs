mod geometry;
mod projection;
mod raster;
mod spatial;
mod view;

pub use projection::Viewport;
pub use view::{
    MapView, Shape, ShapeStyle, SurfaceCapabilities, FOCUS_REVERT, PEN_DEFAULT, PEN_EMPHASIZED,
};
