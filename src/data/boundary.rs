use crate::data::province::ProvinceId;
use crate::error::{DataError, Result};
use geo::{BoundingRect, MultiPolygon};
use geojson::{feature::Id, GeoJson};
use tracing::warn;

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// One province outline
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub id: ProvinceId,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    pub bbox: Bounds,
}

/// Boundary collection, decoded once per session and then read-only
#[derive(Debug, Clone, Default)]
pub struct BoundaryStore {
    features: Vec<BoundaryFeature>,
    bounds: Option<Bounds>,
}

impl BoundaryStore {
    pub fn new(features: Vec<BoundaryFeature>) -> Self {
        let bounds = features.iter().map(|f| f.bbox).reduce(Bounds::union);
        Self { features, bounds }
    }

    /// Decode a GeoJSON FeatureCollection. Features without an id or without
    /// areal geometry are skipped.
    pub fn from_geojson(url: &str, content: &str) -> Result<Self> {
        let geojson: GeoJson = content.parse().map_err(|e| DataError::malformed(url, e))?;
        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => return Err(DataError::malformed(url, "expected a FeatureCollection")),
        };

        let mut features = Vec::with_capacity(collection.features.len());
        for (idx, feature) in collection.features.into_iter().enumerate() {
            let props = feature.properties.as_ref();

            // properties.id first, the feature-level id as a fallback
            let id = props
                .and_then(|p| p.get("id"))
                .and_then(|v| match v {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .or_else(|| match &feature.id {
                    Some(Id::String(s)) => Some(s.clone()),
                    Some(Id::Number(n)) => Some(n.to_string()),
                    None => None,
                });
            let Some(id) = id else {
                warn!(feature = idx, "skipping boundary feature without id");
                continue;
            };

            let name = props
                .and_then(|p| p.get("name"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| id.clone());

            let Some(geometry) = feature.geometry else {
                warn!(%id, "skipping boundary feature without geometry");
                continue;
            };
            let geometry: geo::Geometry<f64> = match geometry.value.try_into() {
                Ok(g) => g,
                Err(e) => {
                    warn!(%id, error = %e, "skipping unreadable boundary geometry");
                    continue;
                }
            };
            let geometry = match geometry {
                geo::Geometry::MultiPolygon(mp) => mp,
                geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                _ => {
                    warn!(%id, "skipping non-areal boundary geometry");
                    continue;
                }
            };
            let Some(rect) = geometry.bounding_rect() else {
                warn!(%id, "skipping empty boundary geometry");
                continue;
            };

            features.push(BoundaryFeature {
                id: ProvinceId::new(id),
                name,
                geometry,
                bbox: Bounds {
                    min_lon: rect.min().x,
                    min_lat: rect.min().y,
                    max_lon: rect.max().x,
                    max_lat: rect.max().y,
                },
            });
        }

        Ok(Self::new(features))
    }

    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Extent of all features
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Square province `[lon, lon+size] x [lat, lat+size]` as a GeoJSON feature
    pub(crate) fn square_feature(id: &str, name: &str, lon: f64, lat: f64, size: f64) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"id":"{id}","name":"{name}"}},
               "geometry":{{"type":"Polygon","coordinates":[[[{lon},{lat}],[{e},{lat}],[{e},{n}],[{lon},{n}],[{lon},{lat}]]]}}}}"#,
            e = lon + size,
            n = lat + size,
        )
    }

    pub(crate) fn collection(features: &[String]) -> String {
        format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        )
    }

    #[test]
    fn test_decodes_polygons_and_bounds() {
        let doc = collection(&[
            square_feature("31", "DKI Jakarta", 106.0, -7.0, 1.0),
            square_feature("32", "Jawa Barat", 107.0, -8.0, 2.0),
        ]);
        let store = BoundaryStore::from_geojson("indonesia.geojson", &doc).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.features()[0].id, ProvinceId::new("31"));
        assert_eq!(store.features()[0].name, "DKI Jakarta");
        let bounds = store.bounds().unwrap();
        assert_eq!(bounds.min_lon, 106.0);
        assert_eq!(bounds.max_lon, 109.0);
        assert_eq!(bounds.min_lat, -8.0);
        assert_eq!(bounds.max_lat, -6.0);
    }

    #[test]
    fn test_numeric_and_feature_level_ids() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"id":11,"name":"Aceh"},
             "geometry":{"type":"MultiPolygon","coordinates":[[[[95,2],[97,2],[97,5],[95,5],[95,2]]]]}},
            {"type":"Feature","id":"12","properties":{"name":"Sumatera Utara"},
             "geometry":{"type":"Polygon","coordinates":[[[98,1],[100,1],[100,3],[98,3],[98,1]]]}}
        ]}"#;
        let store = BoundaryStore::from_geojson("indonesia.geojson", doc).unwrap();
        let ids: Vec<&str> = store.features().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["11", "12"]);
    }

    #[test]
    fn test_skips_features_without_id_or_area() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Nowhere"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}},
            {"type":"Feature","properties":{"id":"x","name":"Point"},
             "geometry":{"type":"Point","coordinates":[0,0]}},
            {"type":"Feature","properties":{"id":"y"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}
        ]}"#;
        let store = BoundaryStore::from_geojson("indonesia.geojson", doc).unwrap();
        assert_eq!(store.len(), 1);
        // Name falls back to the id
        assert_eq!(store.features()[0].name, "y");
    }

    #[test]
    fn test_rejects_non_collection() {
        let doc = r#"{"type":"Point","coordinates":[0,0]}"#;
        let err = BoundaryStore::from_geojson("indonesia.geojson", doc).unwrap_err();
        assert!(matches!(err, DataError::MalformedData { .. }));

        assert!(BoundaryStore::from_geojson("indonesia.geojson", "{").is_err());
    }
}
