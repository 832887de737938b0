//! Immutable in-memory snapshot of the seven reference tables.
//!
//! Built once at startup, either from a directory of CSV files
//! ([`DatasetStore::load`]) or from already-typed rows
//! ([`DatasetStore::from_tables`]). Every lookup afterwards is a read over
//! prebuilt indexes.

use std::collections::HashMap;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{Budget, City, CityId, Country, Listing, UserPreference},
};

mod loader;

pub use loader::load_tables;

/// Raw typed rows of every table, before indexing and validation
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub cities: Vec<City>,
    pub countries: Vec<Country>,
    pub hotels: Vec<Listing>,
    pub restaurants: Vec<Listing>,
    pub places: Vec<Listing>,
    /// Header names of the rating columns, in vector order
    pub rating_categories: Vec<String>,
    pub user_preferences: Vec<UserPreference>,
    pub budgets: Vec<Budget>,
}

/// Read-only dataset shared by every request handler
#[derive(Debug)]
pub struct DatasetStore {
    cities: Vec<City>,
    city_index: HashMap<CityId, usize>,
    city_ids_by_name: HashMap<String, CityId>,
    countries: HashMap<CityId, String>,
    hotels: HashMap<String, Vec<Listing>>,
    restaurants: HashMap<String, Vec<Listing>>,
    places: HashMap<String, Vec<Listing>>,
    rating_categories: Vec<String>,
    user_preferences: Vec<UserPreference>,
    budgets: HashMap<CityId, Budget>,
    budget_ids_by_name: HashMap<String, CityId>,
}

impl DatasetStore {
    /// Loads and validates every CSV table found under `dir`
    pub fn load(dir: &Path) -> AppResult<Self> {
        let tables = load_tables(dir)?;
        Self::from_tables(tables)
    }

    /// Validates typed rows and builds the lookup indexes
    pub fn from_tables(tables: Tables) -> AppResult<Self> {
        let Tables {
            cities,
            countries,
            hotels,
            restaurants,
            places,
            rating_categories,
            user_preferences,
            budgets,
        } = tables;

        let mut city_index = HashMap::with_capacity(cities.len());
        let mut city_ids_by_name = HashMap::with_capacity(cities.len());
        for (idx, city) in cities.iter().enumerate() {
            if city.name.trim().is_empty() {
                return Err(AppError::Dataset(format!(
                    "city {} has an empty name",
                    city.id
                )));
            }
            if city_index.insert(city.id, idx).is_some() {
                return Err(AppError::Dataset(format!(
                    "duplicate City_ID {} in cities",
                    city.id
                )));
            }
            if city_ids_by_name.contains_key(&city.name) {
                tracing::warn!(
                    city = %city.name,
                    city_id = city.id,
                    "Duplicate city name, keeping the first id"
                );
            } else {
                city_ids_by_name.insert(city.name.clone(), city.id);
            }
        }

        let mut country_map = HashMap::new();
        for country in countries {
            if !city_index.contains_key(&country.city_id) {
                tracing::warn!(city_id = country.city_id, "Country row references unknown city");
            }
            country_map
                .entry(country.city_id)
                .or_insert(country.country_name);
        }

        if rating_categories.is_empty() {
            return Err(AppError::Dataset(
                "user preferences define no rating columns".to_string(),
            ));
        }
        if user_preferences.is_empty() {
            return Err(AppError::Dataset(
                "user preferences table is empty".to_string(),
            ));
        }
        let dimensions = rating_categories.len();
        for user in &user_preferences {
            if user.ratings.len() != dimensions {
                return Err(AppError::Dataset(format!(
                    "user {} has {} ratings, expected {}",
                    user.user_id,
                    user.ratings.len(),
                    dimensions
                )));
            }
            if user.ratings.iter().any(|r| !r.is_finite()) {
                return Err(AppError::Dataset(format!(
                    "user {} has a non-finite rating",
                    user.user_id
                )));
            }
            if !city_index.contains_key(&user.city_id) {
                tracing::warn!(
                    user_id = %user.user_id,
                    city_id = user.city_id,
                    "User preference references unknown city"
                );
            }
        }

        let mut budget_map = HashMap::with_capacity(budgets.len());
        let mut budget_ids_by_name = HashMap::new();
        for budget in budgets {
            for (column, value) in [
                ("Solo_Budget", budget.solo),
                ("Couple_Budget", budget.couple),
                ("Child_Budget", budget.child),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(AppError::Dataset(format!(
                        "budget for city {} has invalid {} {}",
                        budget.city_id, column, value
                    )));
                }
            }

            match city_index.get(&budget.city_id) {
                Some(&idx) => {
                    if let Some(name) = &budget.city_name {
                        if *name != cities[idx].name {
                            return Err(AppError::Dataset(format!(
                                "budget row for City_ID {} names '{}' but the city table says '{}'",
                                budget.city_id, name, cities[idx].name
                            )));
                        }
                    }
                }
                None => {
                    tracing::warn!(city_id = budget.city_id, "Budget row references unknown city");
                }
            }

            if let Some(name) = &budget.city_name {
                if let Some(&known_id) = city_ids_by_name.get(name) {
                    if known_id != budget.city_id {
                        return Err(AppError::Dataset(format!(
                            "budget row for City_ID {} names '{}' but the city table gives it City_ID {}",
                            budget.city_id, name, known_id
                        )));
                    }
                }
                if let Some(previous) = budget_ids_by_name.insert(name.clone(), budget.city_id) {
                    if previous != budget.city_id {
                        return Err(AppError::Dataset(format!(
                            "budget name '{}' used by City_ID {} and {}",
                            name, previous, budget.city_id
                        )));
                    }
                }
            }
            let city_id = budget.city_id;
            if budget_map.insert(city_id, budget).is_some() {
                return Err(AppError::Dataset(format!(
                    "duplicate City_ID {} in budgets",
                    city_id
                )));
            }
        }

        Ok(Self {
            cities,
            city_index,
            city_ids_by_name,
            countries: country_map,
            hotels: group_by_city(hotels),
            restaurants: group_by_city(restaurants),
            places: group_by_city(places),
            rating_categories,
            user_preferences,
            budgets: budget_map,
            budget_ids_by_name,
        })
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Resolves a city id by exact name match
    pub fn city_id(&self, name: &str) -> Option<CityId> {
        self.city_ids_by_name.get(name).copied()
    }

    pub fn city_name(&self, id: CityId) -> Option<&str> {
        self.city_index
            .get(&id)
            .map(|&idx| self.cities[idx].name.as_str())
    }

    pub fn country_name(&self, city_id: CityId) -> Option<&str> {
        self.countries.get(&city_id).map(String::as_str)
    }

    pub fn hotels(&self, city_name: &str) -> &[Listing] {
        listings_for(&self.hotels, city_name)
    }

    pub fn restaurants(&self, city_name: &str) -> &[Listing] {
        listings_for(&self.restaurants, city_name)
    }

    pub fn places_to_visit(&self, city_name: &str) -> &[Listing] {
        listings_for(&self.places, city_name)
    }

    /// Rating column names; a rating vector must have exactly this many entries
    pub fn rating_categories(&self) -> &[String] {
        &self.rating_categories
    }

    pub fn user_preferences(&self) -> &[UserPreference] {
        &self.user_preferences
    }

    pub fn budget(&self, city_id: CityId) -> Option<&Budget> {
        self.budgets.get(&city_id)
    }

    /// Budget row keyed directly by the budget table's own city name column
    pub fn budget_by_name(&self, city_name: &str) -> Option<&Budget> {
        self.budget_ids_by_name
            .get(city_name)
            .and_then(|id| self.budgets.get(id))
    }
}

fn group_by_city(rows: Vec<Listing>) -> HashMap<String, Vec<Listing>> {
    let mut grouped: HashMap<String, Vec<Listing>> = HashMap::new();
    for row in rows {
        grouped.entry(row.city.clone()).or_default().push(row);
    }
    grouped
}

fn listings_for<'a>(map: &'a HashMap<String, Vec<Listing>>, city_name: &str) -> &'a [Listing] {
    map.get(city_name).map(Vec::as_slice).unwrap_or(&[])
}
