use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Traveler category that selects which budget column applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VacationType {
    Solo,
    Couple,
    /// Two adults plus children
    Family,
}

impl FromStr for VacationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solo" => Ok(VacationType::Solo),
            "couple" => Ok(VacationType::Couple),
            "family" => Ok(VacationType::Family),
            other => Err(AppError::InvalidVacationType(other.to_string())),
        }
    }
}

impl Display for VacationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VacationType::Solo => write!(f, "solo"),
            VacationType::Couple => write!(f, "couple"),
            VacationType::Family => write!(f, "family"),
        }
    }
}
