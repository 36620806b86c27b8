use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::util::{generate_request_id, sha256_hex};

/// Materials a company can ship through the portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    #[serde(rename = "Crude Oil")]
    CrudeOil,
    Diesel,
    Petrol,
    Kerosene,
    #[serde(rename = "LPG")]
    Lpg,
    #[serde(rename = "Natural Gas")]
    NaturalGas,
    Lubricants,
    Bitumen,
    Chemicals,
    Other,
}

impl MaterialType {
    pub const ALL: [MaterialType; 10] = [
        MaterialType::CrudeOil,
        MaterialType::Diesel,
        MaterialType::Petrol,
        MaterialType::Kerosene,
        MaterialType::Lpg,
        MaterialType::NaturalGas,
        MaterialType::Lubricants,
        MaterialType::Bitumen,
        MaterialType::Chemicals,
        MaterialType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::CrudeOil => "Crude Oil",
            Self::Diesel => "Diesel",
            Self::Petrol => "Petrol",
            Self::Kerosene => "Kerosene",
            Self::Lpg => "LPG",
            Self::NaturalGas => "Natural Gas",
            Self::Lubricants => "Lubricants",
            Self::Bitumen => "Bitumen",
            Self::Chemicals => "Chemicals",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    #[default]
    Liters,
    Tons,
    Barrels,
}

impl QuantityUnit {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Liters => "liters",
            Self::Tons => "tons",
            Self::Barrels => "barrels",
        }
    }
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How soon delivery is required. Ordered from least to most urgent.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Urgency {
    pub const ALL: [Urgency; 4] = [Urgency::Low, Urgency::Medium, Urgency::High, Urgency::Urgent];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Vehicle classes offered by the fleet. Names outside the fleet list are
/// kept verbatim in `Other` so they round-trip unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VehicleType {
    StandardTruck,
    TankerTruck,
    HazardousMaterialTruck,
    RefrigeratedTruck,
    FlatbedTruck,
    ContainerTruck,
    Other(String),
}

impl VehicleType {
    pub const ALL: [VehicleType; 6] = [
        VehicleType::StandardTruck,
        VehicleType::TankerTruck,
        VehicleType::HazardousMaterialTruck,
        VehicleType::RefrigeratedTruck,
        VehicleType::FlatbedTruck,
        VehicleType::ContainerTruck,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::StandardTruck => "Standard Truck",
            Self::TankerTruck => "Tanker Truck",
            Self::HazardousMaterialTruck => "Hazardous Material Truck",
            Self::RefrigeratedTruck => "Refrigerated Truck",
            Self::FlatbedTruck => "Flatbed Truck",
            Self::ContainerTruck => "Container Truck",
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn from_label(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .iter()
            .find(|vehicle| vehicle.label() == name)
            .cloned()
            .unwrap_or_else(|| Self::Other(name.to_string()))
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for VehicleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for VehicleType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name.trim().is_empty() {
            return Err(de::Error::invalid_value(
                de::Unexpected::Str(&name),
                &"a vehicle type name",
            ));
        }
        Ok(Self::from_label(&name))
    }
}

/// Form fields arrive as strings; a blank one means the field was left empty.
mod blank {
    use serde::{de, de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;
    use time::{format_description::well_known::Rfc3339, OffsetDateTime};

    fn is_blank(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if is_blank(&value) {
            return Ok(None);
        }
        serde_json::from_value(value).map(Some).map_err(de::Error::custom)
    }

    /// Accepts a JSON number or a numeric string.
    pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if is_blank(&value) {
            return Ok(None);
        }
        match value {
            Value::Number(number) => Ok(number.as_f64()),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&text), &"a quantity")),
            other => Err(de::Error::custom(format!("expected a quantity, found {other}"))),
        }
    }

    pub fn rfc3339<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if is_blank(&value) {
            return Ok(None);
        }
        match value {
            Value::String(text) => OffsetDateTime::parse(text.trim(), &Rfc3339)
                .map(Some)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!("expected an RFC 3339 date, found {other}"))),
        }
    }
}

/// A transport request as typed into the request form.
///
/// Optional fields stay `None` until the user fills them in; completeness is
/// only checked at submission time by [`crate::domain::validate`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequest {
    #[serde(default, deserialize_with = "blank::as_none")]
    pub material_type: Option<MaterialType>,
    #[serde(default, deserialize_with = "blank::quantity")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub quantity_unit: QuantityUnit,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub drop_location: String,
    #[serde(
        default,
        serialize_with = "time::serde::rfc3339::option::serialize",
        deserialize_with = "blank::rfc3339"
    )]
    pub preferred_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default, deserialize_with = "blank::as_none")]
    pub vehicle_type: Option<VehicleType>,
    #[serde(default)]
    pub temperature_control: bool,
    #[serde(default)]
    pub hazardous_material: bool,
    #[serde(default)]
    pub insurance_required: bool,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// Lifecycle of a request once it reaches the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Assigned,
    InTransit,
    Delivered,
    Cancelled,
    Rejected,
}

impl RequestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Assigned => "Assigned",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Rejected => "Rejected",
        }
    }

    /// Statuses after which the request no longer changes.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Rejected)
    }
}

/// A request frozen at submission: the form contents plus the quoted price,
/// the creation stamp and a content fingerprint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRequest {
    pub id: String,
    #[serde(flatten)]
    pub request: TransportRequest,
    pub estimated_cost: u64,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub fingerprint: String,
}

impl SubmittedRequest {
    /// Stamp a validated request with a fresh id, `pending` status and the current time.
    pub fn stamp(
        request: TransportRequest,
        estimated_cost: u64,
    ) -> Result<Self, serde_json::Error> {
        let fingerprint = request_fingerprint(&request)?;
        Ok(Self {
            id: generate_request_id(),
            request,
            estimated_cost,
            status: RequestStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            fingerprint,
        })
    }
}

/// SHA-256 over the canonical JSON body of the request.
pub fn request_fingerprint(request: &TransportRequest) -> Result<String, serde_json::Error> {
    let body = serde_json::to_vec(request)?;
    Ok(sha256_hex(&body))
}
