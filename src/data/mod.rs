mod boundary;
mod province;

pub use boundary::{BoundaryFeature, BoundaryStore, Bounds};
pub use province::{
    decode_provinces, decode_years, ProvinceDataset, ProvinceId, ProvinceRecord, Year,
};

#[cfg(test)]
pub(crate) use boundary::tests::{collection, square_feature};
