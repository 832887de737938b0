use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the City table
pub type CityId = u32;

/// A row of the City table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct City {
    #[serde(rename = "City_ID")]
    pub id: CityId,
    #[serde(rename = "City")]
    pub name: String,
}

/// A row of the city → country join table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    #[serde(rename = "City_ID")]
    pub city_id: CityId,
    #[serde(rename = "Country_Name")]
    pub country_name: String,
}

/// Per-day cost figures for one city
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    #[serde(rename = "City_ID")]
    pub city_id: CityId,
    /// Name-keyed lookup path; must agree with the City table when present
    #[serde(rename = "City", default)]
    pub city_name: Option<String>,
    #[serde(rename = "Solo_Budget")]
    pub solo: f64,
    #[serde(rename = "Couple_Budget")]
    pub couple: f64,
    /// Extra cost per child, added on top of the couple figure
    #[serde(rename = "Child_Budget")]
    pub child: f64,
}

/// A historical user's ratings for each category, tied to the city they chose
#[derive(Debug, Clone, PartialEq)]
pub struct UserPreference {
    pub user_id: String,
    pub city_id: CityId,
    pub ratings: Vec<f64>,
}

/// A hotel, restaurant or attraction row.
///
/// Only the city name matters for lookups; every column of the source row is
/// kept verbatim in `fields` and serialized as-is.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    #[serde(skip)]
    pub city: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Listing {
    pub fn new(city: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            city: city.into(),
            fields,
        }
    }

    /// Looks up a descriptive column by header name
    #[cfg(test)]
    pub(crate) fn field(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}
