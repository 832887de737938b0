use serde::{Deserialize, Serialize};

mod tables;
mod vacation;

pub use tables::{Budget, City, CityId, Country, Listing, UserPreference};
pub use vacation::VacationType;

/// Request body for `POST /recommendations`
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    /// One score per rating category, in the column order of the preference table
    pub ratings: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub recommended_city: String,
}

/// Request body for `POST /cost`
///
/// Day and child counts are signed so out-of-range values reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRequest {
    pub city_name: String,
    pub vacation_type: String,
    pub num_days: i64,
    #[serde(default)]
    pub num_children: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostResponse {
    pub average_cost: f64,
}

/// Query parameters for `GET /city-info`
#[derive(Debug, Clone, Deserialize)]
pub struct CityInfoQuery {
    pub city_name: String,
    #[serde(default = "default_vacation_type")]
    pub vacation_type: String,
}

fn default_vacation_type() -> String {
    VacationType::Solo.to_string()
}

/// Composite view of one city and its listings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CityInfo {
    pub city: String,
    pub country: String,
    pub hotels: Vec<Listing>,
    pub restaurants: Vec<Listing>,
    pub places_to_visit: Vec<Listing>,
}
