use std::sync::{Arc, Mutex};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    dataset::DatasetStore,
    error::{AppError, AppResult},
    services::clustering::ClusterModel,
};

/// Chooses one of several equally eligible candidates.
///
/// Injected into [`Recommender`] so selection can be pinned in tests or made
/// reproducible with a seed.
#[cfg_attr(test, mockall::automock)]
pub trait CandidatePicker: Send + Sync {
    /// Returns an index in `0..candidates`. Never called with zero candidates.
    fn pick(&self, candidates: usize) -> usize;
}

/// Uniform pick from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl CandidatePicker for ThreadRngPicker {
    fn pick(&self, candidates: usize) -> usize {
        rand::thread_rng().gen_range(0..candidates)
    }
}

/// Uniform pick from a seeded RNG shared across requests
#[derive(Debug)]
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CandidatePicker for SeededPicker {
    fn pick(&self, candidates: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..candidates)
    }
}

/// Recommends a city from the cluster a rating vector falls into.
///
/// The result is intentionally non-deterministic: identical ratings may yield
/// different cities from the same cluster unless the picker is seeded.
pub struct Recommender {
    model: ClusterModel,
    picker: Arc<dyn CandidatePicker>,
}

impl Recommender {
    pub fn new(model: ClusterModel, picker: Arc<dyn CandidatePicker>) -> Self {
        Self { model, picker }
    }

    pub fn model(&self) -> &ClusterModel {
        &self.model
    }

    /// Names of the cities chosen by users in `cluster`, deduplicated, in city id order.
    /// City ids absent from the City table are skipped.
    pub fn candidates<'a>(&self, store: &'a DatasetStore, cluster: usize) -> Vec<&'a str> {
        let mut names: Vec<&str> = Vec::new();
        for &city_id in self.model.cities_in(cluster) {
            match store.city_name(city_id) {
                Some(name) if !names.contains(&name) => names.push(name),
                Some(_) => {}
                None => {
                    tracing::debug!(city_id, cluster, "Cluster city missing from city table");
                }
            }
        }
        names
    }

    pub fn recommend(&self, store: &DatasetStore, ratings: &[f64]) -> AppResult<String> {
        let cluster = self.model.predict(ratings)?;
        let candidates = self.candidates(store, cluster);

        if candidates.is_empty() {
            tracing::warn!(cluster, "Cluster has no candidate cities");
            return Err(AppError::NoCandidateCities(cluster));
        }

        let index = self.picker.pick(candidates.len());
        let city = candidates.get(index).ok_or_else(|| {
            AppError::InternalLookup(format!(
                "picker returned index {} for {} candidates",
                index,
                candidates.len()
            ))
        })?;

        tracing::debug!(
            cluster,
            candidates = candidates.len(),
            city = %city,
            "Selected recommendation"
        );

        Ok(city.to_string())
    }
}
