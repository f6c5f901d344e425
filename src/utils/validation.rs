//! Utilidades de validación
//!
//! Funciones helper usadas por las derivaciones de `validator` y por los
//! controllers para normalizar datos de entrada.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::utils::errors::{validation_error, AppResult};

lazy_static! {
    /// Letras, dígitos, espacios y guiones; el resto se rechaza
    static ref PLATE_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]*$")
        .expect("plate regex is valid");
}

/// Validar formato de matrícula de vehículo
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    let clean_plate = trimmed.replace([' ', '-'], "");

    if !PLATE_REGEX.is_match(trimmed) || clean_plate.len() < 2 || clean_plate.len() > 12 {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Normaliza una matrícula: sin espacios exteriores y en mayúsculas
pub fn normalize_plate(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Una manutención necesita al menos fecha de vencimiento o kilometraje de vencimiento
pub fn require_due_criterion(due_date: Option<NaiveDate>, due_km: Option<i64>) -> AppResult<()> {
    if due_date.is_none() && due_km.is_none() {
        return Err(validation_error(
            "due_date",
            "at least one of due_date or due_km must be set",
        ));
    }
    Ok(())
}
