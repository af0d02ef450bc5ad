//! Plant name resolution and health scoring.
//!
//! An identification result (scientific and/or common name, possibly
//! misspelled, possibly an upstream error) is resolved against a catalog of
//! plant care profiles: exact name lookups first, fuzzy similarity second,
//! ranked suggestions when nothing is confident enough. Sensor readings of
//! tracked plants are scored against their care profile and kept in a
//! bounded per-plant history.
//!
//! Module boundaries:
//! - `catalog`, `similarity`, `resolver`, `health` hold the engine and do no I/O
//!   beyond loading the catalog file
//! - `plants` owns per-plant state
//! - `identify`, `store`, `schema` talk to the outside world
//! - `config`, `state`, `routes` wire it into the HTTP service in `main.rs`

pub mod catalog;
pub mod config;
pub mod health;
pub mod identify;
pub mod models;
pub mod plants;
pub mod resolver;
pub mod routes;
pub mod schema;
pub mod similarity;
pub mod state;
pub mod store;

pub use catalog::{load_catalog, CareProfile, CatalogEntry, CatalogIndex};
pub use config::Config;
pub use health::{HealthAssessment, HealthHistory, HealthScorer, HealthStatus};
pub use models::{IdentificationResult, SensorSnapshot};
pub use plants::{PlantError, PlantRegistry, TrackedPlant};
pub use resolver::{ExactResolver, FuzzyResolver, Match, ResolutionOutcome, Resolver};
pub use state::AppState;
