use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{validate_license_plate, validate_not_blank};

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub brand: String,

    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub model: String,

    #[validate(custom = "validate_license_plate")]
    pub plate: String,

    #[validate(range(min = 1886, max = 2100))]
    pub year: Option<i32>,

    #[validate(range(min = 0))]
    pub current_km: Option<i64>,
}

// Request para actualizar un vehículo; los campos ausentes no cambian
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub model: Option<String>,

    #[validate(custom = "validate_license_plate")]
    pub plate: Option<String>,

    #[validate(range(min = 1886, max = 2100))]
    pub year: Option<i32>,

    #[validate(range(min = 0))]
    pub current_km: Option<i64>,
}

/// Request para actualizar el kilometraje; no admite retrocesos
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOdometerRequest {
    #[validate(range(min = 0))]
    pub current_km: i64,
}
