//! Reference catalog of plant care profiles and its normalized name index.
//!
//! The catalog is loaded once at startup and then only read. Every name a
//! plant is known by (scientific name, canonical display name, each alias)
//! becomes one key in [`CatalogIndex`], lower-cased and trimmed, pointing
//! at exactly one [`CatalogEntry`].
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

// ---

/// Accepted keys per field, short camelCase form first, then the long-form
/// headings used by hand-curated catalog files.
const NAME_KEYS: &[&str] = &["name", "Plant Name"];
const SCIENTIFIC_NAME_KEYS: &[&str] = &["scientificName", "Scientific Name"];
const COMMON_NAMES_KEYS: &[&str] = &["commonNames", "Common Names"];
const TEMPERATURE_KEYS: &[&str] = &["idealTemperatureRange", "Temperature Range"];
const LIGHT_KEYS: &[&str] = &["light", "Light Requirements"];
const WATERING_KEYS: &[&str] = &["watering", "Watering"];
const HUMIDITY_KEYS: &[&str] = &["humidity", "Humidity Preferences"];
const FEEDING_KEYS: &[&str] = &["feeding", "Feeding Schedule"];
const SOIL_KEYS: &[&str] = &["soil", "Soil Type"];
const POTTING_KEYS: &[&str] = &["potting", "Potting & Repotting"];
const TOXICITY_KEYS: &[&str] = &["toxicity", "Toxicity"];
const ADDITIONAL_CARE_KEYS: &[&str] = &["additionalCare", "Additional Care"];

static TEMPERATURE_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*[-–]\s*([0-9]+)\s*°F").expect("valid regex"));

static TEMPERATURE_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*°F").expect("valid regex"));

/// Position of an entry in catalog order.
pub type EntryId = usize;

/// Care attributes of a catalog entry.
///
/// Only `temperature_range` feeds into scoring; everything else is opaque
/// display text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareProfile {
    pub temperature_range: Option<String>,
    pub light: Option<String>,
    pub watering: Option<String>,
    pub humidity: Option<String>,
    pub feeding: Option<String>,
    pub soil: Option<String>,
    pub potting: Option<String>,
    pub toxicity: Option<String>,
    pub additional_care: Option<String>,
}

impl CareProfile {
    /// Ideal temperature window in °F, if the range text can be parsed.
    pub fn ideal_temperature(&self) -> Option<(f64, f64)> {
        self.temperature_range
            .as_deref()
            .and_then(parse_temperature_range)
    }
}

/// One reference plant profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: Option<String>,
    pub scientific_name: Option<String>,
    pub common_names: Vec<String>,
    pub care: CareProfile,
}

impl CatalogEntry {
    // ---
    /// Name shown to users: canonical name, else scientific name.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.scientific_name.as_deref())
            .unwrap_or("")
    }

    /// Read one catalog record leniently.
    ///
    /// Returns `None` only when the record is not a JSON object. Missing,
    /// empty or wrongly typed fields are treated as absent, and a single
    /// string alias is coerced into a one-element alias list.
    pub fn from_record(record: &Value) -> Option<Self> {
        // ---
        let obj = record.as_object()?;

        Some(CatalogEntry {
            name: text_field(obj, NAME_KEYS),
            scientific_name: text_field(obj, SCIENTIFIC_NAME_KEYS),
            common_names: alias_field(obj, COMMON_NAMES_KEYS),
            care: CareProfile {
                temperature_range: text_field(obj, TEMPERATURE_KEYS),
                light: text_field(obj, LIGHT_KEYS),
                watering: text_field(obj, WATERING_KEYS),
                humidity: text_field(obj, HUMIDITY_KEYS),
                feeding: text_field(obj, FEEDING_KEYS),
                soil: text_field(obj, SOIL_KEYS),
                potting: text_field(obj, POTTING_KEYS),
                toxicity: text_field(obj, TOXICITY_KEYS),
                additional_care: text_field(obj, ADDITIONAL_CARE_KEYS),
            },
        })
    }

    /// Every name of this entry in index order: scientific, canonical, aliases.
    fn known_names(&self) -> impl Iterator<Item = (&str, NameField)> {
        self.scientific_name
            .as_deref()
            .map(|n| (n, NameField::ScientificName))
            .into_iter()
            .chain(self.name.as_deref().map(|n| (n, NameField::CanonicalName)))
            .chain(self.common_names.iter().map(|n| (n.as_str(), NameField::Alias)))
    }
}

/// Which field of the entry a name key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NameField {
    ScientificName,
    CanonicalName,
    Alias,
}

/// A normalized name key's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameIndexEntry {
    pub entry: EntryId,
    pub field: NameField,
}

/// Immutable lookup structure over the catalog.
///
/// Keys keep first-insertion order (catalog order), while a duplicate key
/// is re-pointed at the later entry: last write wins, position stays.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    names: IndexMap<String, NameIndexEntry>,
}

impl CatalogIndex {
    // ---
    pub fn build(entries: Vec<CatalogEntry>) -> Self {
        // ---
        let mut names = IndexMap::new();

        for (id, entry) in entries.iter().enumerate() {
            for (name, field) in entry.known_names() {
                let key = normalize_name(name);
                if key.is_empty() {
                    continue;
                }
                names.insert(key, NameIndexEntry { entry: id, field });
            }
        }

        tracing::info!(
            "Built catalog index: {} entries, {} name keys",
            entries.len(),
            names.len()
        );

        CatalogIndex { entries, names }
    }

    /// Build the index from an already-parsed JSON array of records.
    pub fn from_json(value: &Value) -> Result<Self> {
        // ---
        let records = value
            .as_array()
            .ok_or_else(|| anyhow!("catalog must be a JSON array of records"))?;

        let entries = records
            .iter()
            .enumerate()
            .filter_map(|(i, record)| {
                let entry = CatalogEntry::from_record(record);
                if entry.is_none() {
                    tracing::debug!("Skipping catalog record {}: not an object", i);
                }
                entry
            })
            .collect();

        Ok(Self::build(entries))
    }

    /// Look up a raw name; the key is normalized first.
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.lookup_normalized(&normalize_name(name))
            .map(|(_, entry)| entry)
    }

    /// Look up an already-normalized key.
    pub fn lookup_normalized(&self, key: &str) -> Option<(NameIndexEntry, &CatalogEntry)> {
        let hit = *self.names.get(key)?;
        self.entries.get(hit.entry).map(|entry| (hit, entry))
    }

    /// All name keys with their owning entry id, in catalog order.
    pub fn names(&self) -> impl Iterator<Item = (&str, EntryId)> {
        self.names.iter().map(|(key, hit)| (key.as_str(), hit.entry))
    }

    pub fn entry(&self, id: EntryId) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }
}

/// Read and index the catalog file at `path`.
pub fn load_catalog(path: &Path) -> Result<CatalogIndex> {
    // ---
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog '{}'", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Catalog '{}' is not valid JSON", path.display()))?;

    CatalogIndex::from_json(&value)
}

/// Lower-case and trim a name for comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parse free text such as `"65-85°F"` or `"70°F"` into `(min, max)`.
///
/// A range anywhere in the text wins over a single value; a single value
/// yields `min == max`. Text without a °F reading yields `None`.
pub fn parse_temperature_range(text: &str) -> Option<(f64, f64)> {
    // ---
    if let Some(caps) = TEMPERATURE_RANGE_RE.captures(text) {
        return Some((caps[1].parse().ok()?, caps[2].parse().ok()?));
    }

    let caps = TEMPERATURE_SINGLE_RE.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    Some((value, value))
}

// ---

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

fn alias_field(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    // ---
    let Some(value) = keys.iter().find_map(|key| obj.get(*key)) else {
        return Vec::new();
    };

    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn sample_catalog() -> CatalogIndex {
        // ---
        CatalogIndex::from_json(&json!([
            {
                "name": "Monstera",
                "scientificName": "Monstera deliciosa",
                "commonNames": ["Swiss Cheese Plant", "Split-leaf Philodendron"],
                "idealTemperatureRange": "65-85°F"
            },
            {
                "Plant Name": "Snake Plant",
                "Scientific Name": "Dracaena trifasciata",
                "Common Names": "Mother-in-law's Tongue",
                "Temperature Range": "60-85°F",
                "Watering": "Every 2-3 weeks"
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_every_name_variant_is_indexed() {
        // ---
        let index = sample_catalog();

        assert_eq!(index.len(), 2);
        assert_eq!(index.name_count(), 7);

        let monstera = index.lookup("  MONSTERA deliciosa ").unwrap();
        assert_eq!(monstera.display_name(), "Monstera");
        assert_eq!(index.lookup("swiss cheese plant"), Some(monstera));
        assert_eq!(index.lookup("Monstera"), Some(monstera));
    }

    #[test]
    fn test_long_form_keys_and_string_alias() {
        // ---
        let index = sample_catalog();
        let snake = index.lookup("mother-in-law's tongue").unwrap();

        assert_eq!(snake.name.as_deref(), Some("Snake Plant"));
        assert_eq!(snake.common_names, vec!["Mother-in-law's Tongue"]);
        assert_eq!(snake.care.watering.as_deref(), Some("Every 2-3 weeks"));
        assert_eq!(snake.care.ideal_temperature(), Some((60.0, 85.0)));
    }

    #[test]
    fn test_name_fields_are_recorded() {
        // ---
        let index = sample_catalog();

        let (hit, _) = index.lookup_normalized("monstera deliciosa").unwrap();
        assert_eq!(hit.field, NameField::ScientificName);
        let (hit, _) = index.lookup_normalized("snake plant").unwrap();
        assert_eq!(hit.field, NameField::CanonicalName);
        let (hit, _) = index.lookup_normalized("split-leaf philodendron").unwrap();
        assert_eq!(hit.field, NameField::Alias);
    }

    #[test]
    fn test_malformed_fields_degrade_to_absent() {
        // ---
        let index = CatalogIndex::from_json(&json!([
            { "name": "  ", "scientificName": 42, "commonNames": [null, "", "Pothos"] },
            "not a record",
            { "commonNames": { "nested": true } }
        ]))
        .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.name_count(), 1);

        let pothos = index.lookup("pothos").unwrap();
        assert_eq!(pothos.name, None);
        assert_eq!(pothos.scientific_name, None);
        assert_eq!(pothos.display_name(), "");
    }

    #[test]
    fn test_duplicate_key_last_write_wins_in_place() {
        // ---
        let index = CatalogIndex::from_json(&json!([
            { "name": "Rubber Plant", "commonNames": ["Ficus"] },
            { "name": "Weeping Fig", "commonNames": ["Ficus"] }
        ]))
        .unwrap();

        assert_eq!(index.lookup("ficus").unwrap().display_name(), "Weeping Fig");

        let keys: Vec<&str> = index.names().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["rubber plant", "ficus", "weeping fig"]);
    }

    #[test]
    fn test_non_array_catalog_is_rejected() {
        // ---
        assert!(CatalogIndex::from_json(&json!({ "name": "Monstera" })).is_err());
        assert!(CatalogIndex::from_json(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_temperature_range() {
        // ---
        assert_eq!(parse_temperature_range("65-85°F"), Some((65.0, 85.0)));
        assert_eq!(parse_temperature_range("Keep at 60 - 75 °F (15-24°C)"), Some((60.0, 75.0)));
        assert_eq!(parse_temperature_range("Around 70°F"), Some((70.0, 70.0)));
        assert_eq!(parse_temperature_range("Min 55°F, ideally 65-80°F"), Some((65.0, 80.0)));
        assert_eq!(parse_temperature_range("65–80°F"), Some((65.0, 80.0)));
        assert_eq!(parse_temperature_range("70 °F at night"), Some((70.0, 70.0)));
        assert_eq!(parse_temperature_range("18-24°C"), None);
        assert_eq!(parse_temperature_range("warm"), None);
        assert_eq!(parse_temperature_range(""), None);
    }
}
