use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PlacesError;

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/places/data");

/// Dataset used when nothing else is configured
pub const DEFAULT_DATASET: &str = "world";

/// One valid answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(alias = "city")]
    pub name: String,
}

impl PlaceRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Case-insensitive "name begins with letter" predicate
    pub fn starts_with(&self, letter: char) -> bool {
        let mut lower = self.name.chars().flat_map(char::to_lowercase);
        let mut wanted = letter.to_lowercase();
        match (lower.next(), wanted.next()) {
            (Some(first), Some(w)) => first == w,
            _ => false,
        }
    }
}

#[derive(Deserialize)]
struct Dataset {
    #[allow(dead_code)]
    name: String,
    places: Vec<PlaceRecord>,
}

/// Accepts both the dataset object and a bare array of records
#[derive(Deserialize)]
#[serde(untagged)]
enum PlaceFile {
    Dataset(Dataset),
    Records(Vec<PlaceRecord>),
}

/// Where reference data comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceSource {
    Embedded(String),
    File(PathBuf),
}

impl Default for PlaceSource {
    fn default() -> Self {
        PlaceSource::Embedded(DEFAULT_DATASET.to_string())
    }
}

/// Read-only lookup table over the loaded place list
#[derive(Debug, Clone, Default)]
pub struct Places {
    records: Vec<PlaceRecord>,
    index: HashMap<String, usize>,
}

impl Places {
    pub fn from_records(records: Vec<PlaceRecord>) -> Self {
        let records: Vec<PlaceRecord> = records
            .into_iter()
            .map(|r| PlaceRecord::new(r.name.trim()))
            .filter(|r| !r.name.is_empty())
            .collect();

        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            // first occurrence wins on duplicate names
            index.entry(record.name.to_lowercase()).or_insert(i);
        }

        Self { records, index }
    }

    pub fn load(source: &PlaceSource) -> Result<Self, PlacesError> {
        let records = match source {
            PlaceSource::Embedded(name) => read_embedded(name)?,
            PlaceSource::File(path) => read_file(path)?,
        };

        let places = Self::from_records(records);
        if places.is_empty() {
            return Err(PlacesError::Empty);
        }
        Ok(places)
    }

    /// Names of the datasets compiled into the binary
    pub fn embedded_datasets() -> Vec<String> {
        let mut names: Vec<String> = DATA_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PlaceRecord] {
        &self.records
    }

    /// Exact, case-insensitive lookup of an already lower-cased or raw name
    pub fn lookup(&self, name: &str) -> Option<&PlaceRecord> {
        self.index
            .get(&name.trim().to_lowercase())
            .map(|&i| &self.records[i])
    }

    /// The filtered set for a start letter
    pub fn matching(&self, letter: char) -> Vec<&PlaceRecord> {
        self.records.iter().filter(|r| r.starts_with(letter)).collect()
    }

    pub fn has_letter(&self, letter: char) -> bool {
        self.records.iter().any(|r| r.starts_with(letter))
    }

    /// Uniform draws with replacement from the filtered set.
    /// Returns None when nothing matches the letter.
    pub fn sample(&self, letter: char, count: usize) -> Option<Vec<String>> {
        self.sample_with_rng(letter, count, &mut rand::thread_rng())
    }

    pub fn sample_with_rng<R: Rng>(
        &self,
        letter: char,
        count: usize,
        rng: &mut R,
    ) -> Option<Vec<String>> {
        let pool = self.matching(letter);
        if pool.is_empty() {
            return None;
        }

        Some(
            (0..count)
                .filter_map(|_| pool.choose(rng).map(|r| r.name.clone()))
                .collect(),
        )
    }
}

fn read_embedded(name: &str) -> Result<Vec<PlaceRecord>, PlacesError> {
    let file = DATA_DIR
        .get_file(format!("{name}.json"))
        .ok_or_else(|| PlacesError::UnknownDataset(name.to_string()))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| PlacesError::UnknownDataset(name.to_string()))?;

    parse_json(contents)
}

fn read_file(path: &Path) -> Result<Vec<PlaceRecord>, PlacesError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => parse_json(&fs::read_to_string(path)?),
        "csv" => parse_csv(fs::File::open(path)?),
        other => Err(PlacesError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_json(contents: &str) -> Result<Vec<PlaceRecord>, PlacesError> {
    let records = match serde_json::from_str::<PlaceFile>(contents)? {
        PlaceFile::Dataset(d) => d.places,
        PlaceFile::Records(r) => r,
    };
    Ok(records)
}

fn parse_csv<R: std::io::Read>(reader: R) -> Result<Vec<PlaceRecord>, PlacesError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<PlaceRecord>() {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::io::Write;

    fn places(names: &[&str]) -> Places {
        Places::from_records(names.iter().map(|n| PlaceRecord::new(*n)).collect())
    }

    #[test]
    fn test_default_dataset_loads() {
        let places = Places::load(&PlaceSource::default()).unwrap();
        assert!(places.len() > 300);
        assert!(places.lookup("paris").is_some());
        assert!(places.lookup("PRAGUE").is_some());
        assert!(places.lookup("berlin").is_some());
    }

    #[test]
    fn test_embedded_datasets_lists_world() {
        assert!(Places::embedded_datasets().contains(&DEFAULT_DATASET.to_string()));
    }

    #[test]
    fn test_unknown_dataset() {
        let err = Places::load(&PlaceSource::Embedded("atlantis".into())).unwrap_err();
        assert!(matches!(err, PlacesError::UnknownDataset(ref n) if n == "atlantis"));
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_exact() {
        let places = places(&["New York", "Paris"]);
        assert_eq!(places.lookup("new york").unwrap().name, "New York");
        assert_eq!(places.lookup("  PARIS ").unwrap().name, "Paris");
        assert!(places.lookup("par").is_none());
    }

    #[test]
    fn test_blank_names_are_dropped() {
        let places = places(&["", "  ", "Oslo"]);
        assert_eq!(places.len(), 1);
    }

    #[test]
    fn test_starts_with_ignores_case() {
        assert!(PlaceRecord::new("Paris").starts_with('p'));
        assert!(PlaceRecord::new("paris").starts_with('P'));
        assert!(!PlaceRecord::new("Berlin").starts_with('p'));
    }

    #[test]
    fn test_matching_keeps_order() {
        let places = places(&["Porto", "Berlin", "Paris"]);
        let names: Vec<&str> = places.matching('p').iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Porto", "Paris"]);
        assert!(places.has_letter('b'));
        assert!(!places.has_letter('z'));
    }

    #[test]
    fn test_sample_draws_from_filtered_set() {
        let places = places(&["Porto", "Berlin", "Paris"]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let sample = places.sample_with_rng('p', 10, &mut rng).unwrap();
        assert_eq!(sample.len(), 10);
        assert!(sample.iter().all(|n| n == "Porto" || n == "Paris"));
    }

    #[test]
    fn test_sample_empty_filter_is_none() {
        let places = places(&["Porto"]);
        assert!(places.sample('q', 10).is_none());
    }

    #[test]
    fn test_legacy_city_field_and_bare_array() {
        let records = parse_json(r#"[{"city": "Lima"}, {"name": "Lyon"}]"#).unwrap();
        assert_eq!(records, vec![PlaceRecord::new("Lima"), PlaceRecord::new("Lyon")]);
    }

    #[test]
    fn test_load_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("towns.csv");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "name").unwrap();
        writeln!(f, "Kendal").unwrap();
        writeln!(f, " Keswick ").unwrap();

        let places = Places::load(&PlaceSource::File(path)).unwrap();
        assert_eq!(places.len(), 2);
        assert!(places.lookup("keswick").is_some());
    }

    #[test]
    fn test_load_json_file_and_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, r#"{"name": "none", "places": []}"#).unwrap();
        assert!(matches!(
            Places::load(&PlaceSource::File(path)),
            Err(PlacesError::Empty)
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Places::load(&PlaceSource::File(PathBuf::from("places.txt"))).unwrap_err();
        assert!(matches!(err, PlacesError::UnsupportedFormat(ref e) if e == "txt"));
    }
}
