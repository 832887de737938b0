use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Map, Value};

use travel_advisor_api::{
    dataset::{DatasetStore, Tables},
    models::{Budget, City, Country, Listing, UserPreference},
    routes::{create_router, AppState},
    services::{ClusterSettings, SeededPicker},
};

fn listing(city: &str, name: &str) -> Listing {
    let mut fields = Map::new();
    fields.insert("City".to_string(), json!(city));
    fields.insert("Name".to_string(), json!(name));
    Listing::new(city, fields)
}

fn user(id: &str, city_id: u32, ratings: [f64; 3]) -> UserPreference {
    UserPreference {
        user_id: id.to_string(),
        city_id,
        ratings: ratings.to_vec(),
    }
}

fn fixture_tables() -> Tables {
    Tables {
        cities: vec![
            City { id: 1, name: "Paris".to_string() },
            City { id: 2, name: "Barcelona".to_string() },
            City { id: 3, name: "Reykjavik".to_string() },
        ],
        countries: vec![
            Country { city_id: 1, country_name: "France".to_string() },
            Country { city_id: 2, country_name: "Spain".to_string() },
        ],
        hotels: vec![listing("Paris", "Hotel Lutetia"), listing("Barcelona", "Hotel Arts")],
        restaurants: vec![listing("Paris", "Septime")],
        places: vec![listing("Paris", "Louvre"), listing("Paris", "Musee d'Orsay")],
        rating_categories: vec!["Museums".into(), "Beaches".into(), "Nature".into()],
        user_preferences: vec![
            user("1", 1, [5.0, 1.0, 2.0]),
            user("2", 1, [4.6, 1.2, 1.8]),
            user("3", 2, [2.0, 5.0, 2.0]),
            user("4", 2, [2.2, 4.7, 1.6]),
            user("5", 3, [1.0, 1.0, 5.0]),
            user("6", 3, [1.3, 1.1, 4.8]),
        ],
        budgets: vec![
            Budget {
                city_id: 1,
                city_name: Some("Paris".to_string()),
                solo: 100.0,
                couple: 170.0,
                child: 45.0,
            },
            Budget {
                city_id: 2,
                city_name: None,
                solo: 90.0,
                couple: 150.0,
                child: 35.5,
            },
        ],
    }
}

fn create_test_server() -> TestServer {
    let dataset = DatasetStore::from_tables(fixture_tables()).unwrap();
    let settings = ClusterSettings {
        n_clusters: 3,
        ..ClusterSettings::default()
    };
    let state = AppState::new(dataset, &settings, Arc::new(SeededPicker::new(1))).unwrap();
    TestServer::new(create_router(Arc::new(state))).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_recommendation_returns_city_from_cluster() {
    let server = create_test_server();

    let response = server
        .post("/recommendations")
        .json(&json!({ "ratings": [1.1, 0.9, 4.9] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommended_city"], "Reykjavik");
}

#[tokio::test]
async fn test_recommendation_always_known_city() {
    let server = create_test_server();
    let known = ["Paris", "Barcelona", "Reykjavik"];

    for ratings in [[5.0, 1.0, 1.0], [2.0, 5.0, 2.0], [3.0, 3.0, 3.0]] {
        let response = server
            .post("/recommendations")
            .json(&json!({ "ratings": ratings }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let city = body["recommended_city"].as_str().unwrap();
        assert!(known.contains(&city), "unexpected city {}", city);
    }
}

#[tokio::test]
async fn test_recommendation_wrong_dimensions() {
    let server = create_test_server();

    let response = server
        .post("/recommendations")
        .json(&json!({ "ratings": [1.0, 2.0] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("expected 3 ratings"));
}

#[tokio::test]
async fn test_recommendation_missing_ratings() {
    let server = create_test_server();

    let response = server.post("/recommendations").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_cost_solo() {
    let server = create_test_server();

    let response = server
        .post("/cost")
        .json(&json!({
            "city_name": "Paris",
            "vacation_type": "solo",
            "num_days": 5
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["average_cost"], 500.0);
}

#[tokio::test]
async fn test_cost_family_through_city_table() {
    let server = create_test_server();

    let response = server
        .post("/cost")
        .json(&json!({
            "city_name": "Barcelona",
            "vacation_type": "family",
            "num_days": 2,
            "num_children": 3
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    // (150 + 35.5 * 3) * 2
    assert_eq!(body["average_cost"], 513.0);
}

#[tokio::test]
async fn test_cost_failures_are_json_errors() {
    let server = create_test_server();

    let cases = [
        (
            json!({ "city_name": "Atlantis", "vacation_type": "solo", "num_days": 2 }),
            StatusCode::BAD_REQUEST,
            "City not found",
        ),
        (
            json!({ "city_name": "Paris", "vacation_type": "solo", "num_days": 0 }),
            StatusCode::BAD_REQUEST,
            "Invalid input",
        ),
        (
            json!({ "city_name": "Paris", "vacation_type": "cruise", "num_days": 2 }),
            StatusCode::BAD_REQUEST,
            "Invalid vacation type",
        ),
        (
            json!({ "city_name": "Reykjavik", "vacation_type": "solo", "num_days": 2 }),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal lookup error",
        ),
        (
            json!({ "vacation_type": "solo", "num_days": 2 }),
            StatusCode::BAD_REQUEST,
            "Invalid input",
        ),
    ];

    for (body, status, message) in cases {
        let response = server.post("/cost").json(&body).await;
        response.assert_status(status);
        let error: Value = response.json();
        assert!(
            error["error"].as_str().unwrap().starts_with(message),
            "{} for {}",
            error,
            body
        );
    }
}

#[tokio::test]
async fn test_city_info_collects_listings() {
    let server = create_test_server();

    let response = server
        .get("/city-info")
        .add_query_param("city_name", "Paris")
        .add_query_param("vacation_type", "family")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["city"], "Paris");
    assert_eq!(body["country"], "France");
    assert_eq!(body["hotels"][0]["Name"], "Hotel Lutetia");
    assert_eq!(body["restaurants"].as_array().unwrap().len(), 1);
    assert_eq!(body["places_to_visit"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_city_info_unknown_country() {
    let server = create_test_server();

    let response = server
        .get("/city-info")
        .add_query_param("city_name", "Reykjavik")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["country"], "Unknown");
    assert!(body["hotels"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_city_info_unknown_city() {
    let server = create_test_server();

    let response = server
        .get("/city-info")
        .add_query_param("city_name", "Atlantis")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "City not found: Atlantis");
}

#[tokio::test]
async fn test_city_info_requires_city_name() {
    let server = create_test_server();
    let response = server.get("/city-info").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let id = "7f1c1d2e-8d43-4a8e-9b59-3f0d9c7e1a22";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id);
}
