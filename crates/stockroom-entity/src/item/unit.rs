//! Measurement unit enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit an item quantity is counted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "unit_type")]
pub enum UnitType {
    /// Discrete units.
    #[default]
    #[sqlx(rename = "und.")]
    #[serde(rename = "und.")]
    Unit,
    /// Kilograms.
    #[sqlx(rename = "kg")]
    #[serde(rename = "kg")]
    Kilogram,
    /// Liters.
    #[sqlx(rename = "l")]
    #[serde(rename = "l")]
    Liter,
    /// Meters.
    #[sqlx(rename = "m")]
    #[serde(rename = "m")]
    Meter,
}

impl UnitType {
    /// Return the unit as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "und.",
            Self::Kilogram => "kg",
            Self::Liter => "l",
            Self::Meter => "m",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = stockroom_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "und." | "und" => Ok(Self::Unit),
            "kg" => Ok(Self::Kilogram),
            "l" => Ok(Self::Liter),
            "m" => Ok(Self::Meter),
            _ => Err(stockroom_core::AppError::validation(format!(
                "Invalid unit: '{s}'. Expected one of: und., kg, l, m"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_round_trips_through_str() {
        assert_eq!("und.".parse::<UnitType>().unwrap(), UnitType::Unit);
        assert_eq!("KG".parse::<UnitType>().unwrap(), UnitType::Kilogram);
        assert!("ton".parse::<UnitType>().is_err());
        assert_eq!(serde_json::to_value(UnitType::Unit).unwrap(), "und.");
    }
}
