use std::fmt::Display;
use std::fs::File;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::Tables;
use crate::{
    error::{AppError, AppResult},
    models::{Budget, City, CityId, Country, Listing, UserPreference},
};

pub const CITIES_FILE: &str = "cities.csv";
pub const COUNTRIES_FILE: &str = "countries.csv";
pub const HOTELS_FILE: &str = "hotels.csv";
pub const RESTAURANTS_FILE: &str = "restaurants.csv";
pub const PLACES_FILE: &str = "places.csv";
pub const USER_PREFERENCES_FILE: &str = "user_preferences.csv";
pub const BUDGETS_FILE: &str = "budgets.csv";

const CITY_COLUMN: &str = "City";
const USER_ID_COLUMN: &str = "User_ID";
const CITY_ID_COLUMN: &str = "City_ID";

/// Reads all seven tables from `dir`.
///
/// Any missing file, missing required column or unparseable required field
/// aborts the load with an error naming the file and record line.
pub fn load_tables(dir: &Path) -> AppResult<Tables> {
    let cities: Vec<City> = read_rows(&dir.join(CITIES_FILE))?;
    let countries: Vec<Country> = read_rows(&dir.join(COUNTRIES_FILE))?;
    let budgets: Vec<Budget> = read_rows(&dir.join(BUDGETS_FILE))?;
    let hotels = read_listings(&dir.join(HOTELS_FILE))?;
    let restaurants = read_listings(&dir.join(RESTAURANTS_FILE))?;
    let places = read_listings(&dir.join(PLACES_FILE))?;
    let (rating_categories, user_preferences) =
        read_user_preferences(&dir.join(USER_PREFERENCES_FILE))?;

    tracing::info!(
        data_dir = %dir.display(),
        cities = cities.len(),
        countries = countries.len(),
        hotels = hotels.len(),
        restaurants = restaurants.len(),
        places = places.len(),
        users = user_preferences.len(),
        rating_categories = rating_categories.len(),
        budgets = budgets.len(),
        "Loaded dataset tables"
    );

    Ok(Tables {
        cities,
        countries,
        hotels,
        restaurants,
        places,
        rating_categories,
        user_preferences,
        budgets,
    })
}

fn open(path: &Path) -> AppResult<Reader<File>> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| dataset_error(path, e))
}

fn dataset_error(path: &Path, err: impl Display) -> AppError {
    AppError::Dataset(format!("{}: {}", path.display(), err))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

fn read_headers(reader: &mut Reader<File>, path: &Path) -> AppResult<StringRecord> {
    reader
        .headers()
        .cloned()
        .map_err(|e| dataset_error(path, e))
}

fn column(headers: &StringRecord, name: &str, path: &Path) -> AppResult<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| dataset_error(path, format!("missing {} column", name)))
}

/// Deserializes a table with a fixed schema
fn read_rows<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    let mut reader = open(path)?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| dataset_error(path, e)))
        .collect()
}

/// Reads a descriptive table, keeping every column verbatim
fn read_listings(path: &Path) -> AppResult<Vec<Listing>> {
    let mut reader = open(path)?;
    let headers = read_headers(&mut reader, path)?;
    let city_col = column(&headers, CITY_COLUMN, path)?;

    let mut listings = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| dataset_error(path, e))?;
        let city = record.get(city_col).unwrap_or_default();
        if city.is_empty() {
            return Err(dataset_error(
                path,
                format!("line {}: empty {}", line_of(&record), CITY_COLUMN),
            ));
        }

        let fields: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| {
                let value = if value.is_empty() {
                    Value::Null
                } else {
                    Value::String(value.to_string())
                };
                (header.to_string(), value)
            })
            .collect();

        listings.push(Listing::new(city, fields));
    }

    Ok(listings)
}

/// Reads the preference table; every column other than the user and city ids
/// is a rating category.
fn read_user_preferences(path: &Path) -> AppResult<(Vec<String>, Vec<UserPreference>)> {
    let mut reader = open(path)?;
    let headers = read_headers(&mut reader, path)?;
    let user_col = column(&headers, USER_ID_COLUMN, path)?;
    let city_col = column(&headers, CITY_ID_COLUMN, path)?;

    let rating_cols: Vec<usize> = (0..headers.len())
        .filter(|&i| i != user_col && i != city_col)
        .collect();
    let categories = rating_cols
        .iter()
        .map(|&i| headers[i].to_string())
        .collect();

    let mut users = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| dataset_error(path, e))?;
        let line = line_of(&record);

        let user_id = record[user_col].to_string();
        if user_id.is_empty() {
            return Err(dataset_error(
                path,
                format!("line {}: empty {}", line, USER_ID_COLUMN),
            ));
        }

        let city_id: CityId = record[city_col].parse().map_err(|e| {
            dataset_error(path, format!("line {}: bad {}: {}", line, CITY_ID_COLUMN, e))
        })?;

        let ratings = rating_cols
            .iter()
            .map(|&i| {
                record[i].parse::<f64>().map_err(|e| {
                    dataset_error(path, format!("line {}: bad {}: {}", line, &headers[i], e))
                })
            })
            .collect::<AppResult<Vec<f64>>>()?;

        users.push(UserPreference {
            user_id,
            city_id,
            ratings,
        });
    }

    Ok((categories, users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_dataset(dir: &Path) {
        fs::write(dir.join(CITIES_FILE), "City_ID,City\n1,Paris\n2,Rome\n").unwrap();
        fs::write(
            dir.join(COUNTRIES_FILE),
            "City_ID,Country_Name\n1,France\n2,Italy\n",
        )
        .unwrap();
        fs::write(
            dir.join(HOTELS_FILE),
            "City,Hotel_Name,Rating\nParis,Le Meurice,4.8\nRome,Hotel Artemide,\n",
        )
        .unwrap();
        fs::write(
            dir.join(RESTAURANTS_FILE),
            "Restaurant_Name,City\nSeptime,Paris\n",
        )
        .unwrap();
        fs::write(dir.join(PLACES_FILE), "City,Place\nRome,Colosseum\n").unwrap();
        fs::write(
            dir.join(USER_PREFERENCES_FILE),
            "User_ID,City_ID,Museums,Beaches,Food\n1,1,5,1,4\n2,2,4,2,5\n",
        )
        .unwrap();
        fs::write(
            dir.join(BUDGETS_FILE),
            "City_ID,City,Solo_Budget,Couple_Budget,Child_Budget\n1,Paris,100,180,40\n2,,80.5,150,30\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_complete_directory() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());

        let tables = load_tables(dir.path()).unwrap();
        assert_eq!(tables.cities.len(), 2);
        assert_eq!(tables.countries[1].country_name, "Italy");
        assert_eq!(tables.rating_categories, vec!["Museums", "Beaches", "Food"]);
        assert_eq!(tables.user_preferences[1].ratings, vec![4.0, 2.0, 5.0]);
        assert_eq!(tables.budgets[0].city_name.as_deref(), Some("Paris"));
        assert_eq!(tables.budgets[1].city_name, None);
        assert_eq!(tables.budgets[1].solo, 80.5);
    }

    #[test]
    fn test_listing_columns_kept_verbatim() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());

        let tables = load_tables(dir.path()).unwrap();
        let paris = &tables.hotels[0];
        assert_eq!(paris.city, "Paris");
        assert_eq!(paris.field("Rating"), Some(&Value::String("4.8".into())));

        let rome = &tables.hotels[1];
        assert_eq!(rome.field("Rating"), Some(&Value::Null));

        // City column need not come first
        assert_eq!(tables.restaurants[0].city, "Paris");
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());
        fs::remove_file(dir.path().join(BUDGETS_FILE)).unwrap();

        let err = load_tables(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Dataset(ref m) if m.contains(BUDGETS_FILE)));
    }

    #[test]
    fn test_bad_rating_reports_line_and_column() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());
        fs::write(
            dir.path().join(USER_PREFERENCES_FILE),
            "User_ID,City_ID,Museums,Beaches\n1,1,5,1\n2,2,high,2\n",
        )
        .unwrap();

        let err = load_tables(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Dataset(ref m) if m.contains("line 3") && m.contains("Museums")));
    }

    #[test]
    fn test_missing_budget_field_rejected() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());
        fs::write(
            dir.path().join(BUDGETS_FILE),
            "City_ID,Solo_Budget,Couple_Budget,Child_Budget\n1,100,,40\n",
        )
        .unwrap();

        assert!(matches!(
            load_tables(dir.path()),
            Err(AppError::Dataset(_))
        ));
    }

    #[test]
    fn test_listing_without_city_column_rejected() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());
        fs::write(dir.path().join(PLACES_FILE), "Town,Place\nRome,Colosseum\n").unwrap();

        let err = load_tables(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::Dataset(ref m) if m.contains("missing City column")));
    }
}
