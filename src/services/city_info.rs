use crate::{
    dataset::DatasetStore,
    error::{AppError, AppResult},
    models::CityInfo,
};

/// Country reported when the join table has no row for a city
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Collects the country and listings of a city named exactly `city_name`
pub fn city_info(store: &DatasetStore, city_name: &str) -> AppResult<CityInfo> {
    let city_id = store
        .city_id(city_name)
        .ok_or_else(|| AppError::CityNotFound(city_name.to_string()))?;

    let country = store
        .country_name(city_id)
        .unwrap_or(UNKNOWN_COUNTRY)
        .to_string();

    Ok(CityInfo {
        city: city_name.to_string(),
        country,
        hotels: store.hotels(city_name).to_vec(),
        restaurants: store.restaurants(city_name).to_vec(),
        places_to_visit: store.places_to_visit(city_name).to_vec(),
    })
}
