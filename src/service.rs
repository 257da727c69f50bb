//! Service façade
//!
//! Wires the stateless engine to its collaborators: where farms come from,
//! where the catalog comes from and where results are kept. The in-memory
//! implementations back the tests and the CLI; a web layer supplies its own.

use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engine::RecommendationEngine;
use crate::error::{EngineError, Result};
use crate::profiles::{FarmRecord, RequestParameters, SeedProfile};
use crate::recommendation::{recommendation_id, Recommendation, RecommendationSet};

// ============================================================================
// Collaborators
// ============================================================================

pub trait FarmDirectory: Send + Sync {
    fn farm(&self, farm_id: &str) -> Option<FarmRecord>;
}

pub trait SeedCatalog: Send + Sync {
    fn seeds(&self) -> Vec<SeedProfile>;
}

pub trait RecommendationStore: Send + Sync {
    /// Replace everything stored for the set's farm, season and year with
    /// the set's recommendations
    fn persist(&self, set: &RecommendationSet) -> Result<()>;

    fn find(&self, recommendation_id: &str) -> Result<Option<Recommendation>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFarmDirectory {
    farms: FxHashMap<String, FarmRecord>,
}

impl InMemoryFarmDirectory {
    pub fn new(records: impl IntoIterator<Item = FarmRecord>) -> Self {
        let mut directory = Self::default();
        for record in records {
            directory.insert(record);
        }
        directory
    }

    pub fn insert(&mut self, record: FarmRecord) {
        self.farms.insert(record.profile.id.clone(), record);
    }
}

impl FarmDirectory for InMemoryFarmDirectory {
    fn farm(&self, farm_id: &str) -> Option<FarmRecord> {
        self.farms.get(farm_id).cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    seeds: Vec<SeedProfile>,
}

impl InMemoryCatalog {
    pub fn new(seeds: Vec<SeedProfile>) -> Self {
        Self { seeds }
    }
}

impl SeedCatalog for InMemoryCatalog {
    fn seeds(&self) -> Vec<SeedProfile> {
        self.seeds.clone()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRecommendationStore {
    records: RwLock<FxHashMap<String, Recommendation>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecommendationStore for InMemoryRecommendationStore {
    fn persist(&self, set: &RecommendationSet) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| EngineError::Storage("recommendation store lock poisoned".into()))?;

        let prefix = recommendation_id(&set.farm_id, set.season, set.year, "");
        let before = records.len();
        records.retain(|id, _| !id.starts_with(&prefix));
        let dropped = before - records.len();
        if dropped > 0 {
            debug!(farm = %set.farm_id, dropped, "replaced stored recommendations");
        }

        for rec in &set.recommendations {
            records.insert(rec.id.clone(), rec.clone());
        }
        Ok(())
    }

    fn find(&self, recommendation_id: &str) -> Result<Option<Recommendation>> {
        let records = self
            .records
            .read()
            .map_err(|_| EngineError::Storage("recommendation store lock poisoned".into()))?;
        Ok(records.get(recommendation_id).cloned())
    }
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone)]
pub struct RecommendationService {
    farms: Arc<dyn FarmDirectory>,
    catalog: Arc<dyn SeedCatalog>,
    store: Arc<dyn RecommendationStore>,
    engine: RecommendationEngine,
}

impl RecommendationService {
    pub fn new(
        farms: Arc<dyn FarmDirectory>,
        catalog: Arc<dyn SeedCatalog>,
        store: Arc<dyn RecommendationStore>,
        config: EngineConfig,
    ) -> Result<Self> {
        Ok(Self { farms, catalog, store, engine: RecommendationEngine::new(config)? })
    }

    pub fn generate_recommendations(&self, farm_id: &str, params: &RequestParameters) -> Result<RecommendationSet> {
        let record = self.farms.farm(farm_id).ok_or_else(|| {
            warn!(farm = %farm_id, "recommendation requested for unknown farm");
            EngineError::UnknownFarm(farm_id.to_string())
        })?;

        let catalog = self.catalog.seeds();
        let set = self
            .engine
            .recommend(&record.profile, &record.climate_history, &catalog, params)?;
        self.store.persist(&set)?;

        info!(farm = %farm_id, stored = set.recommendations.len(), "recommendations persisted");
        Ok(set)
    }

    /// Stored reasoning for one recommendation
    pub fn explain_recommendation(&self, recommendation_id: &str) -> Result<Vec<String>> {
        self.store
            .find(recommendation_id)?
            .map(|rec| rec.reasoning)
            .ok_or_else(|| EngineError::UnknownRecommendation(recommendation_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{ClimateHistory, CropType, FarmProfile, GeoLocation, Season};

    fn service(seeds: Vec<SeedProfile>) -> RecommendationService {
        let farm = FarmProfile {
            id: "f1".into(),
            name: "Test farm".into(),
            location: Some(GeoLocation { latitude: 0.35, longitude: 32.6 }),
            soil: Default::default(),
            climate: Default::default(),
            infrastructure: Default::default(),
            size_ha: Some(1.0),
        };
        RecommendationService::new(
            Arc::new(InMemoryFarmDirectory::new([FarmRecord { profile: farm, climate_history: ClimateHistory::empty() }])),
            Arc::new(InMemoryCatalog::new(seeds)),
            Arc::new(InMemoryRecommendationStore::new()),
            EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_farm() {
        let svc = service(Vec::new());
        let err = svc.generate_recommendations("nope", &RequestParameters::new(Season::A, 2025)).unwrap_err();
        assert_eq!(err, EngineError::UnknownFarm("nope".into()));
    }

    #[test]
    fn test_generate_then_explain() {
        let svc = service(vec![SeedProfile::new("longe-5", "Longe 5", CropType::Maize)]);
        let set = svc.generate_recommendations("f1", &RequestParameters::new(Season::B, 2025)).unwrap();
        assert_eq!(set.recommendations.len(), 1);

        let id = &set.recommendations[0].id;
        assert_eq!(id, "f1:B-2025:longe-5");
        let reasoning = svc.explain_recommendation(id).unwrap();
        assert_eq!(reasoning, set.recommendations[0].reasoning);
    }

    #[test]
    fn test_explain_unknown_id() {
        let svc = service(Vec::new());
        let err = svc.explain_recommendation("f1:A-2025:missing").unwrap_err();
        assert!(matches!(err, EngineError::UnknownRecommendation(_)));
    }

    #[test]
    fn test_persist_replaces_previous_run() {
        let store = InMemoryRecommendationStore::new();
        let svc = service(vec![
            SeedProfile::new("s", "S", CropType::Beans),
            SeedProfile::new("t", "T", CropType::Beans),
        ]);
        let params = RequestParameters::new(Season::A, 2025)
            .with_risk_tolerance(crate::profiles::RiskTolerance::Aggressive);
        let mut set = svc.generate_recommendations("f1", &params).unwrap();
        store.persist(&set).unwrap();
        assert_eq!(store.len(), 2);

        // later run for the same farm and season returns only one seed
        set.recommendations.retain(|r| r.seed.id == "t");
        store.persist(&set).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.find("f1:A-2025:s").unwrap().is_none());
        assert!(store.find("f1:A-2025:t").unwrap().is_some());

        // other seasons are untouched
        let other = svc
            .generate_recommendations("f1", &RequestParameters::new(Season::B, 2025)
                .with_risk_tolerance(crate::profiles::RiskTolerance::Aggressive))
            .unwrap();
        store.persist(&other).unwrap();
        assert_eq!(store.len(), 1 + other.recommendations.len());
    }
}
