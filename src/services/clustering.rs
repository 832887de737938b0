//! Partition of historical users by rating vector.
//!
//! Lloyd's algorithm with k-means++ seeding. Seeding draws from a `StdRng`
//! built from [`ClusterSettings::seed`], so the same dataset and settings
//! always yield the same centroids and assignments.

use std::collections::BTreeSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    dataset::DatasetStore,
    error::{AppError, AppResult},
    models::CityId,
};

/// Parameters of the cluster model build
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    pub n_clusters: usize,
    pub seed: u64,
    pub max_iter: usize,
    /// Centroid movement (Euclidean) below which iteration stops
    pub tolerance: f64,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            n_clusters: 20,
            seed: 42,
            max_iter: 300,
            tolerance: 1e-4,
        }
    }
}

/// Result of fitting k-means to a set of points
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    /// Sum of squared distances from each point to its centroid
    pub inertia: f64,
    pub iterations: usize,
}

/// Fits `settings.n_clusters` centroids to `points`.
///
/// All points must share one dimensionality; the caller guarantees it.
pub fn fit(points: &[Vec<f64>], settings: &ClusterSettings) -> AppResult<KMeansFit> {
    let k = settings.n_clusters;
    if k == 0 {
        return Err(AppError::Model("cluster count must be positive".to_string()));
    }
    if points.len() < k {
        return Err(AppError::Model(format!(
            "{} users cannot form {} clusters",
            points.len(),
            k
        )));
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut centroids = init_centroids(points, k, &mut rng);
    let mut iterations = 0;
    let threshold = settings.tolerance * settings.tolerance;

    for iter in 0..settings.max_iter.max(1) {
        let labels = assign_labels(points, &centroids);
        let updated = update_centroids(points, &labels, &centroids);

        let shift = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .fold(0.0, f64::max);

        centroids = updated;
        iterations = iter + 1;

        if shift <= threshold {
            break;
        }
    }

    let labels = assign_labels(points, &centroids);
    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(point, &label)| squared_distance(point, &centroids[label]))
        .sum();

    Ok(KMeansFit {
        centroids,
        labels,
        inertia,
        iterations,
    })
}

/// k-means++: each new centroid is a point drawn with probability
/// proportional to its squared distance from the nearest chosen centroid.
fn init_centroids(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)].clone());

    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = None;
            for (i, &d) in closest.iter().enumerate() {
                if target < d {
                    chosen = Some(i);
                    break;
                }
                target -= d;
            }
            // Rounding can exhaust the loop; fall back to the last unchosen point
            chosen.unwrap_or_else(|| closest.iter().rposition(|&d| d > 0.0).unwrap_or(n - 1))
        } else {
            // Every point coincides with a centroid already
            rng.gen_range(0..n)
        };

        let centroid = points[next].clone();
        for (d, point) in closest.iter_mut().zip(points) {
            *d = d.min(squared_distance(point, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

fn assign_labels(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points.iter().map(|p| nearest(p, centroids).0).collect()
}

/// Mean of each cluster's points; a cluster left empty keeps its centroid
fn update_centroids(
    points: &[Vec<f64>],
    labels: &[usize],
    centroids: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let dims = centroids[0].len();
    let mut sums = vec![vec![0.0; dims]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (acc, value) in sums[label].iter_mut().zip(point) {
            *acc += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(centroids)
        .map(|((sum, count), previous)| {
            if count == 0 {
                previous.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

/// Index of and squared distance to the closest centroid; ties go to the lower index
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best.1 {
            best = (idx, dist);
        }
    }
    best
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Cluster model built once at startup from the user preference table
#[derive(Debug, Clone)]
pub struct ClusterModel {
    centroids: Vec<Vec<f64>>,
    /// Cluster of each user, in preference table order
    assignments: Vec<usize>,
    /// City ids chosen by the users of each cluster
    cluster_cities: Vec<BTreeSet<CityId>>,
    inertia: f64,
    iterations: usize,
}

impl ClusterModel {
    pub fn build(store: &DatasetStore, settings: &ClusterSettings) -> AppResult<Self> {
        let users = store.user_preferences();
        let points: Vec<Vec<f64>> = users.iter().map(|u| u.ratings.clone()).collect();

        let fitted = fit(&points, settings)?;

        let mut cluster_cities = vec![BTreeSet::new(); settings.n_clusters];
        for (user, &label) in users.iter().zip(&fitted.labels) {
            cluster_cities[label].insert(user.city_id);
        }

        let empty_clusters = cluster_cities.iter().filter(|c| c.is_empty()).count();
        tracing::info!(
            users = users.len(),
            clusters = settings.n_clusters,
            seed = settings.seed,
            iterations = fitted.iterations,
            inertia = fitted.inertia,
            empty_clusters,
            "Cluster model built"
        );

        Ok(Self {
            centroids: fitted.centroids,
            assignments: fitted.labels,
            cluster_cities,
            inertia: fitted.inertia,
            iterations: fitted.iterations,
        })
    }

    /// Assigns a rating vector to its nearest centroid
    pub fn predict(&self, ratings: &[f64]) -> AppResult<usize> {
        if ratings.is_empty() {
            return Err(AppError::InvalidInput("ratings must not be empty".to_string()));
        }
        if ratings.len() != self.dimensions() {
            return Err(AppError::InvalidInput(format!(
                "expected {} ratings, got {}",
                self.dimensions(),
                ratings.len()
            )));
        }
        if ratings.iter().any(|r| !r.is_finite()) {
            return Err(AppError::InvalidInput(
                "ratings must be finite numbers".to_string(),
            ));
        }

        Ok(nearest(ratings, &self.centroids).0)
    }

    /// City ids represented by users of `cluster`; empty for unknown clusters
    pub fn cities_in(&self, cluster: usize) -> &BTreeSet<CityId> {
        static NONE: BTreeSet<CityId> = BTreeSet::new();
        self.cluster_cities.get(cluster).unwrap_or(&NONE)
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    pub fn dimensions(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}
