use crate::{
    dataset::DatasetStore,
    error::{AppError, AppResult},
    models::{Budget, CityId, CostRequest, VacationType},
};

/// Estimates the cost of a trip to a named city, rounded to cents.
///
/// The budget row is found through the budget table's own city name column
/// first, then through the City table's name → id mapping.
pub fn estimate_cost(store: &DatasetStore, request: &CostRequest) -> AppResult<f64> {
    let budget = budget_for_city_name(store, &request.city_name)?;
    priced(
        budget,
        &request.vacation_type,
        request.num_days,
        request.num_children,
    )
}

/// Same estimate keyed by city id
pub fn estimate_cost_for_city_id(
    store: &DatasetStore,
    city_id: CityId,
    vacation_type: &str,
    num_days: i64,
    num_children: i64,
) -> AppResult<f64> {
    let budget = store
        .budget(city_id)
        .ok_or_else(|| AppError::CityNotFound(format!("city id {}", city_id)))?;
    priced(budget, vacation_type, num_days, num_children)
}

/// Unrounded cost of `days` days for the given traveler mix
pub fn trip_cost(budget: &Budget, vacation_type: VacationType, days: u32, children: u32) -> f64 {
    let per_day = match vacation_type {
        VacationType::Solo => budget.solo,
        VacationType::Couple => budget.couple,
        VacationType::Family => budget.couple + budget.child * f64::from(children),
    };
    per_day * f64::from(days)
}

pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn budget_for_city_name<'a>(store: &'a DatasetStore, city_name: &str) -> AppResult<&'a Budget> {
    if let Some(budget) = store.budget_by_name(city_name) {
        return Ok(budget);
    }

    match store.city_id(city_name) {
        Some(city_id) => store.budget(city_id).ok_or_else(|| {
            AppError::InternalLookup(format!(
                "no budget row for city '{}' (id {})",
                city_name, city_id
            ))
        }),
        None => Err(AppError::CityNotFound(city_name.to_string())),
    }
}

fn priced(
    budget: &Budget,
    vacation_type: &str,
    num_days: i64,
    num_children: i64,
) -> AppResult<f64> {
    if num_days <= 0 {
        return Err(AppError::InvalidInput(format!(
            "num_days must be a positive integer, got {}",
            num_days
        )));
    }
    if num_children < 0 {
        return Err(AppError::InvalidInput(format!(
            "num_children must not be negative, got {}",
            num_children
        )));
    }
    let days = count_in_range("num_days", num_days)?;
    let children = count_in_range("num_children", num_children)?;
    let vacation_type: VacationType = vacation_type.parse()?;

    Ok(round_to_cents(trip_cost(
        budget,
        vacation_type,
        days,
        children,
    )))
}

fn count_in_range(field: &str, value: i64) -> AppResult<u32> {
    u32::try_from(value).map_err(|_| {
        AppError::InvalidInput(format!(
            "{} out of range, got {} (max {})",
            field,
            value,
            u32::MAX
        ))
    })
}
