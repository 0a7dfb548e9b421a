use crate::error::{DataError, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// JSON scalar accepted wherever the API hands out an identifier.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

/// Province identifier, normalised to text so `11` and `"11"` join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProvinceId(String);

impl ProvinceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProvinceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProvinceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Scalar::deserialize(deserializer).map(|s| ProvinceId(s.into_text()))
    }
}

/// Opaque dataset snapshot token, e.g. `"2020"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Year(String);

impl Year {
    pub fn new(year: impl Into<String>) -> Self {
        Self(year.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Scalar::deserialize(deserializer).map(|s| Year(s.into_text()))
    }
}

/// One region's population for one year.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvinceRecord {
    pub id: ProvinceId,
    pub name: String,
    pub population: u64,
}

impl ProvinceRecord {
    pub fn new(id: &str, name: &str, population: u64) -> Self {
        Self {
            id: ProvinceId::new(id),
            name: name.to_string(),
            population,
        }
    }
}

/// Decode the `/api/years` body.
pub fn decode_years(url: &str, body: &mut [u8]) -> Result<Vec<Year>> {
    simd_json::serde::from_slice(body).map_err(|e| DataError::malformed(url, e))
}

/// Decode the `/api/provinces/{year}` body.
pub fn decode_provinces(url: &str, body: &mut [u8]) -> Result<Vec<ProvinceRecord>> {
    simd_json::serde::from_slice(body).map_err(|e| DataError::malformed(url, e))
}

/// The records of the currently loaded year.
///
/// Replaced wholesale on every successful load; search never touches it.
#[derive(Debug, Default, Clone)]
pub struct ProvinceDataset {
    year: Option<Year>,
    records: Vec<ProvinceRecord>,
    /// First record index per id
    by_id: HashMap<ProvinceId, usize>,
}

impl ProvinceDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly loaded collection
    pub fn replace(&mut self, year: Year, records: Vec<ProvinceRecord>) {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            by_id.entry(record.id.clone()).or_insert(idx);
        }
        self.year = Some(year);
        self.records = records;
        self.by_id = by_id;
    }

    /// Year the records were loaded for
    pub fn year(&self) -> Option<&Year> {
        self.year.as_ref()
    }

    pub fn records(&self) -> &[ProvinceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose name contains `term`, ignoring case. An empty term
    /// matches everything.
    pub fn filter(&self, term: &str) -> Vec<&ProvinceRecord> {
        let needle = term.to_lowercase();
        self.records
            .iter()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Sum over the full collection
    pub fn total_population(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |sum, record| sum.saturating_add(record.population))
    }

    pub fn population_of(&self, id: &ProvinceId) -> Option<u64> {
        self.by_id.get(id).map(|&idx| self.records[idx].population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProvinceDataset {
        let mut dataset = ProvinceDataset::new();
        dataset.replace(
            Year::new("2020"),
            vec![
                ProvinceRecord::new("31", "DKI Jakarta", 10_562_088),
                ProvinceRecord::new("32", "Jawa Barat", 48_274_162),
                ProvinceRecord::new("94", "Papua", 4_303_707),
            ],
        );
        dataset
    }

    #[test]
    fn test_decode_years_accepts_strings_and_numbers() {
        let mut body = br#"["2010", 2020]"#.to_vec();
        let years = decode_years("/api/years", &mut body).unwrap();
        assert_eq!(years, vec![Year::new("2010"), Year::new("2020")]);
    }

    #[test]
    fn test_decode_provinces() {
        let mut body =
            br#"[{"id": 31, "name": "DKI Jakarta", "population": 10562088},
                 {"id": "32", "name": "Jawa Barat", "population": 48274162}]"#
                .to_vec();
        let records = decode_provinces("/api/provinces/2020", &mut body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, ProvinceId::new("31"));
        assert_eq!(records[1].population, 48_274_162);
    }

    #[test]
    fn test_decode_rejects_negative_population() {
        let mut body = br#"[{"id": "31", "name": "DKI Jakarta", "population": -1}]"#.to_vec();
        let err = decode_provinces("/api/provinces/2020", &mut body).unwrap_err();
        assert!(matches!(err, DataError::MalformedData { .. }));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let mut body = br#"{"years": ["2020"]}"#.to_vec();
        assert!(decode_years("/api/years", &mut body).is_err());

        let mut body = b"not json".to_vec();
        assert!(decode_provinces("/api/provinces/2020", &mut body).is_err());
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let dataset = sample();
        let hits = dataset.filter("jak");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "DKI Jakarta");

        assert_eq!(dataset.filter("JAWA").len(), 1);
        assert_eq!(dataset.filter("a").len(), 3);
        assert!(dataset.filter("sumatera").is_empty());
    }

    #[test]
    fn test_filter_empty_term_returns_everything_in_load_order() {
        let dataset = sample();
        let all: Vec<&str> = dataset.filter("").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(all, vec!["31", "32", "94"]);
    }

    #[test]
    fn test_filter_does_not_mutate() {
        let dataset = sample();
        let _ = dataset.filter("papua");
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_total_population_ignores_filter() {
        let dataset = sample();
        let expected = 10_562_088 + 48_274_162 + 4_303_707;
        let _ = dataset.filter("jak");
        assert_eq!(dataset.total_population(), expected);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut dataset = sample();
        dataset.replace(
            Year::new("2010"),
            vec![ProvinceRecord::new("11", "Aceh", 4_494_410)],
        );
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.year(), Some(&Year::new("2010")));
        assert_eq!(dataset.population_of(&ProvinceId::new("31")), None);
        assert_eq!(dataset.population_of(&ProvinceId::new("11")), Some(4_494_410));
    }

    #[test]
    fn test_duplicate_ids_join_first_record() {
        let mut dataset = ProvinceDataset::new();
        dataset.replace(
            Year::new("2020"),
            vec![
                ProvinceRecord::new("11", "Aceh", 1),
                ProvinceRecord::new("11", "Aceh (dup)", 2),
            ],
        );
        assert_eq!(dataset.population_of(&ProvinceId::new("11")), Some(1));
    }
}
