//! Submission-time structural checks for a transport request.

use std::{collections::BTreeMap, fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entities::TransportRequest;

/// Largest quantity a single request may carry, in any unit.
pub const MAX_QUANTITY: f64 = 1_000_000_000.0;

/// Request fields that can carry a validation error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestField {
    MaterialType,
    Quantity,
    QuantityUnit,
    PickupLocation,
    DropLocation,
    PreferredDate,
    Urgency,
    VehicleType,
    TemperatureControl,
    HazardousMaterial,
    InsuranceRequired,
    ContactPerson,
    ContactPhone,
    SpecialInstructions,
}

impl RequestField {
    pub fn key(&self) -> &'static str {
        match self {
            Self::MaterialType => "materialType",
            Self::Quantity => "quantity",
            Self::QuantityUnit => "quantityUnit",
            Self::PickupLocation => "pickupLocation",
            Self::DropLocation => "dropLocation",
            Self::PreferredDate => "preferredDate",
            Self::Urgency => "urgency",
            Self::VehicleType => "vehicleType",
            Self::TemperatureControl => "temperatureControl",
            Self::HazardousMaterial => "hazardousMaterial",
            Self::InsuranceRequired => "insuranceRequired",
            Self::ContactPerson => "contactPerson",
            Self::ContactPhone => "contactPhone",
            Self::SpecialInstructions => "specialInstructions",
        }
    }
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Field → message for every rule that failed. Empty means submittable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<RequestField, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: RequestField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: RequestField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RequestField, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    pub fn insert(&mut self, field: RequestField, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn clear_field(&mut self, field: RequestField) -> Option<String> {
        self.errors.remove(&field)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>();
        f.write_str(&parts.join("; "))
    }
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9\s+\-()]+$").expect("phone pattern compiles"))
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_pattern().is_match(phone)
}

/// Check every rule independently; a request may fail several at once.
pub fn validate(request: &TransportRequest) -> ValidationResult {
    let mut result = ValidationResult::default();

    if request.material_type.is_none() {
        result.insert(RequestField::MaterialType, "Material type is required");
    }

    let quantity_ok = request
        .quantity
        .map(|value| value.is_finite() && value > 0.0)
        .unwrap_or(false);
    if !quantity_ok {
        result.insert(RequestField::Quantity, "Quantity must be greater than 0");
    } else if request.quantity.is_some_and(|value| value > MAX_QUANTITY) {
        result.insert(RequestField::Quantity, "Quantity cannot exceed 1,000,000,000");
    }

    let pickup = request.pickup_location.trim();
    let drop = request.drop_location.trim();
    if pickup.is_empty() {
        result.insert(RequestField::PickupLocation, "Pickup location is required");
    }
    if drop.is_empty() {
        result.insert(RequestField::DropLocation, "Drop location is required");
    } else if !pickup.is_empty() && pickup.to_lowercase() == drop.to_lowercase() {
        result.insert(
            RequestField::DropLocation,
            "Pickup and drop locations cannot be the same",
        );
    }

    if request.preferred_date.is_none() {
        result.insert(RequestField::PreferredDate, "Preferred date is required");
    }

    if request.contact_person.trim().is_empty() {
        result.insert(RequestField::ContactPerson, "Contact person is required");
    }

    if request.contact_phone.trim().is_empty() {
        result.insert(RequestField::ContactPhone, "Contact phone is required");
    } else if !is_valid_phone(&request.contact_phone) {
        result.insert(RequestField::ContactPhone, "Please enter a valid phone number");
    }

    if request.vehicle_type.is_none() {
        result.insert(RequestField::VehicleType, "Vehicle type is required");
    }

    result
}
