use std::sync::Arc;

use crate::{
    config::Config,
    dataset::DatasetStore,
    error::AppResult,
    services::{
        CandidatePicker, ClusterModel, ClusterSettings, Recommender, SeededPicker, ThreadRngPicker,
    },
};

/// Shared application state, immutable once built
pub struct AppState {
    pub dataset: DatasetStore,
    pub recommender: Recommender,
}

impl AppState {
    /// Builds the cluster model over `dataset` and wires the recommender
    pub fn new(
        dataset: DatasetStore,
        settings: &ClusterSettings,
        picker: Arc<dyn CandidatePicker>,
    ) -> AppResult<Self> {
        let model = ClusterModel::build(&dataset, settings)?;
        let recommender = Recommender::new(model, picker);

        let model = recommender.model();
        tracing::info!(
            clusters = model.n_clusters(),
            dimensions = model.dimensions(),
            iterations = model.iterations(),
            inertia = model.inertia(),
            "Recommender ready"
        );

        Ok(Self {
            dataset,
            recommender,
        })
    }

    /// Loads the dataset from `config.data_dir` and builds everything the handlers need
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let dataset = DatasetStore::load(&config.data_dir)?;

        let picker: Arc<dyn CandidatePicker> = match config.recommendation_seed {
            Some(seed) => {
                tracing::info!(seed, "Using seeded recommendation picker");
                Arc::new(SeededPicker::new(seed))
            }
            None => Arc::new(ThreadRngPicker),
        };

        Self::new(dataset, &config.cluster_settings(), picker)
    }
}
