//! Tracked plants.
//!
//! Each plant's latest reading and score history has exactly one owner,
//! the [`PlantRegistry`]. Callers that share a registry across requests
//! serialize access to it; the registry itself does no locking.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{normalize_name, CatalogIndex, EntryId};
use crate::health::{HealthAssessment, HealthHistory, HealthScorer, HealthStatus};
use crate::models::SensorSnapshot;

// ---

pub type PlantId = Uuid;

/// Why a plant could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlantError {
    #[error("Nickname is required")]
    BlankNickname,

    #[error("A plant named '{0}' is already tracked")]
    DuplicateNickname(String),

    #[error("'{0}' is not in the plant catalog")]
    UnknownCatalogName(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPlant {
    pub id: PlantId,
    pub nickname: String,
    /// Catalog entry supplying the care profile, if one was chosen.
    pub catalog_entry: Option<EntryId>,
    pub catalog_name: Option<String>,
    pub latest: Option<SensorSnapshot>,
    pub history: HealthHistory,
}

#[derive(Debug, Default)]
pub struct PlantRegistry {
    plants: HashMap<PlantId, TrackedPlant>,
}

impl PlantRegistry {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a plant, optionally tied to a catalog entry by any of
    /// its names.
    ///
    /// Nicknames are trimmed and must be non-blank and unique (compared
    /// exactly, so "Monty" and "monty" are different plants).
    pub fn add(
        &mut self,
        nickname: &str,
        catalog_name: Option<&str>,
        index: &CatalogIndex,
    ) -> Result<&TrackedPlant, PlantError> {
        // ---
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(PlantError::BlankNickname);
        }
        if self.plants.values().any(|p| p.nickname == nickname) {
            return Err(PlantError::DuplicateNickname(nickname.to_string()));
        }

        let (catalog_entry, catalog_name) = match catalog_name {
            Some(name) => {
                let (hit, entry) = index
                    .lookup_normalized(&normalize_name(name))
                    .ok_or_else(|| PlantError::UnknownCatalogName(name.to_string()))?;
                (Some(hit.entry), Some(entry.display_name().to_string()))
            }
            None => (None, None),
        };

        let plant = TrackedPlant {
            id: Uuid::new_v4(),
            nickname: nickname.to_string(),
            catalog_entry,
            catalog_name,
            latest: None,
            history: HealthHistory::new(),
        };
        tracing::info!("Tracking plant '{}' ({})", plant.nickname, plant.id);

        let id = plant.id;
        self.plants.insert(id, plant);
        Ok(&self.plants[&id])
    }

    /// Stop tracking a plant, dropping its reading and history.
    pub fn remove(&mut self, id: &PlantId) -> Option<TrackedPlant> {
        let plant = self.plants.remove(id)?;
        tracing::info!("Stopped tracking plant '{}' ({})", plant.nickname, plant.id);
        Some(plant)
    }

    /// All tracked plants, ordered by nickname.
    pub fn list(&self) -> Vec<&TrackedPlant> {
        // ---
        let mut plants: Vec<_> = self.plants.values().collect();
        plants.sort_by(|a, b| a.nickname.cmp(&b.nickname).then(a.id.cmp(&b.id)));
        plants
    }

    pub fn get(&self, id: &PlantId) -> Option<&TrackedPlant> {
        self.plants.get(id)
    }

    /// Replace the plant's latest reading.
    pub fn update_reading(&mut self, id: &PlantId, snapshot: SensorSnapshot) -> Option<&TrackedPlant> {
        let plant = self.plants.get_mut(id)?;
        plant.latest = Some(snapshot);
        Some(plant)
    }

    /// Append `score` to the plant's history under the repeat throttle.
    pub fn record(&mut self, id: &PlantId, score: u8, now: DateTime<Utc>) -> Option<&HealthHistory> {
        let plant = self.plants.get_mut(id)?;
        plant.history.record(score, now);
        Some(&plant.history)
    }

    /// Score the plant and record the result.
    ///
    /// `reading` overrides the in-memory latest reading (e.g. one fetched
    /// from the telemetry store). A plant without any reading is reported
    /// as no data and nothing is recorded.
    pub fn assess(
        &mut self,
        id: &PlantId,
        reading: Option<&SensorSnapshot>,
        scorer: &HealthScorer,
        index: &CatalogIndex,
        now: DateTime<Utc>,
    ) -> Option<(HealthAssessment, &HealthHistory)> {
        // ---
        let plant = self.plants.get_mut(id)?;
        let assessment = score_plant(plant, reading, scorer, index, now);

        if assessment.status != HealthStatus::NoData {
            plant.history.record(assessment.overall_score, now);
        }

        Some((assessment, &plant.history))
    }

    /// Score the plant's latest in-memory reading without recording it.
    pub fn current_assessment(
        &self,
        id: &PlantId,
        scorer: &HealthScorer,
        index: &CatalogIndex,
        now: DateTime<Utc>,
    ) -> Option<HealthAssessment> {
        let plant = self.plants.get(id)?;
        Some(score_plant(plant, None, scorer, index, now))
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

fn score_plant(
    plant: &TrackedPlant,
    reading: Option<&SensorSnapshot>,
    scorer: &HealthScorer,
    index: &CatalogIndex,
    now: DateTime<Utc>,
) -> HealthAssessment {
    // ---
    let care = plant
        .catalog_entry
        .and_then(|entry| index.entry(entry))
        .map(|entry| &entry.care);
    scorer.assess(reading.or(plant.latest.as_ref()), care, now)
}
