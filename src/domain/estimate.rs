//! Rules-based price estimation for transport requests.
//!
//! The estimate is a pure function of the request: quantity times a unit base
//! rate (with a volume discount past a breakpoint), scaled by urgency, vehicle
//! class and each special-handling flag.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entities::{QuantityUnit, TransportRequest, Urgency, VehicleType};

/// Rounded costs must stay below this to fit in `estimated_cost`.
const MAX_COST: f64 = u64::MAX as f64;

/// Per-unit pricing with a single volume discount breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitRate {
    /// Applied when quantity is strictly above `breakpoint`.
    pub bulk_rate: f64,
    pub standard_rate: f64,
    pub breakpoint: f64,
}

impl UnitRate {
    pub const fn new(bulk_rate: f64, standard_rate: f64, breakpoint: f64) -> Self {
        Self {
            bulk_rate,
            standard_rate,
            breakpoint,
        }
    }

    pub fn rate_for(&self, quantity: f64) -> f64 {
        if quantity > self.breakpoint {
            self.bulk_rate
        } else {
            self.standard_rate
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UrgencyRates {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub urgent: f64,
}

/// The full rate table used by the estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingRules {
    pub liters: UnitRate,
    pub tons: UnitRate,
    pub barrels: UnitRate,
    pub urgency: UrgencyRates,
    pub hazardous_vehicle: f64,
    pub refrigerated_vehicle: f64,
    pub temperature_control: f64,
    pub hazardous_material: f64,
    pub insurance: f64,
}

impl PricingRules {
    pub const fn standard() -> Self {
        Self {
            liters: UnitRate::new(2.5, 3.0, 10_000.0),
            tons: UnitRate::new(150.0, 180.0, 20.0),
            barrels: UnitRate::new(25.0, 30.0, 100.0),
            urgency: UrgencyRates {
                low: 0.8,
                medium: 1.0,
                high: 1.3,
                urgent: 1.8,
            },
            hazardous_vehicle: 1.5,
            refrigerated_vehicle: 1.3,
            temperature_control: 1.2,
            hazardous_material: 1.4,
            insurance: 1.1,
        }
    }

    pub fn unit_rate(&self, unit: QuantityUnit) -> &UnitRate {
        match unit {
            QuantityUnit::Liters => &self.liters,
            QuantityUnit::Tons => &self.tons,
            QuantityUnit::Barrels => &self.barrels,
        }
    }

    pub fn base_rate(&self, unit: QuantityUnit, quantity: f64) -> f64 {
        self.unit_rate(unit).rate_for(quantity)
    }

    pub fn urgency_multiplier(&self, urgency: Urgency) -> f64 {
        match urgency {
            Urgency::Low => self.urgency.low,
            Urgency::Medium => self.urgency.medium,
            Urgency::High => self.urgency.high,
            Urgency::Urgent => self.urgency.urgent,
        }
    }

    pub fn vehicle_multiplier(&self, vehicle: Option<&VehicleType>) -> f64 {
        match vehicle {
            Some(VehicleType::HazardousMaterialTruck) => self.hazardous_vehicle,
            Some(VehicleType::RefrigeratedTruck) => self.refrigerated_vehicle,
            _ => 1.0,
        }
    }

    /// Product of the special-handling flags. Stacks with the vehicle multiplier.
    pub fn special_multiplier(&self, request: &TransportRequest) -> f64 {
        let mut multiplier = 1.0;
        if request.temperature_control {
            multiplier *= self.temperature_control;
        }
        if request.hazardous_material {
            multiplier *= self.hazardous_material;
        }
        if request.insurance_required {
            multiplier *= self.insurance;
        }
        multiplier
    }

    /// Returns `None` until a positive quantity has been entered, and for
    /// quantities so large the cost no longer fits in a `u64`.
    pub fn estimate(&self, request: &TransportRequest) -> Option<QuoteEstimate> {
        let quantity = request
            .quantity
            .filter(|value| value.is_finite() && *value > 0.0)?;
        let unit = request.quantity_unit;

        let base_rate = self.base_rate(unit, quantity);
        let urgency_multiplier = self.urgency_multiplier(request.urgency);
        let vehicle_multiplier = self.vehicle_multiplier(request.vehicle_type.as_ref());
        let special_multiplier = self.special_multiplier(request);

        let raw =
            quantity * base_rate * urgency_multiplier * vehicle_multiplier * special_multiplier;
        let rounded = raw.round();
        if !(0.0..MAX_COST).contains(&rounded) {
            debug!(quantity, raw, "estimate out of range");
            return None;
        }
        let estimated_cost = rounded as u64;

        debug!(
            quantity,
            unit = unit.label(),
            base_rate,
            urgency_multiplier,
            vehicle_multiplier,
            special_multiplier,
            estimated_cost,
            "computed quote estimate"
        );

        Some(QuoteEstimate {
            estimated_cost,
            quantity,
            quantity_unit: unit,
            urgency: request.urgency,
            vehicle_type: request.vehicle_type.clone(),
            temperature_control: request.temperature_control,
            hazardous_material: request.hazardous_material,
            insurance_required: request.insurance_required,
            base_rate,
            urgency_multiplier,
            vehicle_multiplier,
            special_multiplier,
        })
    }
}

impl Default for PricingRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// A computed quote together with every input that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEstimate {
    pub estimated_cost: u64,
    pub quantity: f64,
    pub quantity_unit: QuantityUnit,
    pub urgency: Urgency,
    pub vehicle_type: Option<VehicleType>,
    pub temperature_control: bool,
    pub hazardous_material: bool,
    pub insurance_required: bool,
    pub base_rate: f64,
    pub urgency_multiplier: f64,
    pub vehicle_multiplier: f64,
    pub special_multiplier: f64,
}

impl QuoteEstimate {
    /// Rounded cost divided by quantity.
    pub fn effective_unit_rate(&self) -> f64 {
        self.estimated_cost as f64 / self.quantity
    }

    pub fn rationale(&self) -> String {
        format!(
            "{} {} x {:.2} base x {:.2} urgency x {:.2} vehicle x {:.3} handling = {}",
            self.quantity,
            self.quantity_unit,
            self.base_rate,
            self.urgency_multiplier,
            self.vehicle_multiplier,
            self.special_multiplier,
            self.estimated_cost
        )
    }
}

/// Estimate with the standard rate table.
pub fn estimate_cost(request: &TransportRequest) -> Option<QuoteEstimate> {
    PricingRules::standard().estimate(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liters(quantity: f64) -> TransportRequest {
        TransportRequest {
            quantity: Some(quantity),
            quantity_unit: QuantityUnit::Liters,
            urgency: Urgency::Medium,
            vehicle_type: Some(VehicleType::StandardTruck),
            ..TransportRequest::default()
        }
    }

    fn cost(request: &TransportRequest) -> u64 {
        estimate_cost(request)
            .expect("estimate should be available")
            .estimated_cost
    }

    #[test]
    fn missing_or_non_positive_quantity_has_no_estimate() {
        let mut request = liters(0.0);
        assert!(estimate_cost(&request).is_none());

        request.quantity = Some(-5.0);
        assert!(estimate_cost(&request).is_none());

        request.quantity = None;
        assert!(estimate_cost(&request).is_none());

        request.quantity = Some(f64::NAN);
        assert!(estimate_cost(&request).is_none());
    }

    #[test]
    fn standard_liters_request() {
        assert_eq!(cost(&liters(5000.0)), 15_000);
    }

    #[test]
    fn hazardous_truck_and_flag_stack() {
        let request = TransportRequest {
            hazardous_material: true,
            vehicle_type: Some(VehicleType::HazardousMaterialTruck),
            ..liters(5000.0)
        };
        assert_eq!(cost(&request), 31_500);
    }

    #[test]
    fn estimate_is_deterministic() {
        let request = TransportRequest {
            temperature_control: true,
            insurance_required: true,
            urgency: Urgency::High,
            ..liters(7321.5)
        };
        assert_eq!(estimate_cost(&request), estimate_cost(&request));
    }

    #[test]
    fn urgency_strictly_increases_price() {
        let costs: Vec<u64> = Urgency::ALL
            .iter()
            .map(|urgency| {
                cost(&TransportRequest {
                    urgency: *urgency,
                    ..liters(5000.0)
                })
            })
            .collect();

        assert_eq!(costs, vec![12_000, 15_000, 19_500, 27_000]);
        assert!(costs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn liters_volume_discount_past_breakpoint() {
        let above = estimate_cost(&liters(10_001.0)).unwrap();
        let below = estimate_cost(&liters(9_999.0)).unwrap();

        assert_eq!(above.base_rate, 2.5);
        assert_eq!(below.base_rate, 3.0);
        assert!(above.effective_unit_rate() < below.effective_unit_rate());
        // the breakpoint itself is not discounted
        assert_eq!(estimate_cost(&liters(10_000.0)).unwrap().base_rate, 3.0);
    }

    #[test]
    fn tons_and_barrels_breakpoints() {
        let rules = PricingRules::standard();
        assert_eq!(rules.base_rate(QuantityUnit::Tons, 20.0), 180.0);
        assert_eq!(rules.base_rate(QuantityUnit::Tons, 21.0), 150.0);
        assert_eq!(rules.base_rate(QuantityUnit::Barrels, 100.0), 30.0);
        assert_eq!(rules.base_rate(QuantityUnit::Barrels, 100.5), 25.0);
    }

    #[test]
    fn every_multiplier_combines() {
        let request = TransportRequest {
            quantity: Some(3.0),
            quantity_unit: QuantityUnit::Tons,
            urgency: Urgency::Urgent,
            vehicle_type: Some(VehicleType::RefrigeratedTruck),
            temperature_control: true,
            insurance_required: true,
            ..TransportRequest::default()
        };
        // 3 * 180 * 1.8 * 1.3 * 1.2 * 1.1 = 1667.952
        assert_eq!(cost(&request), 1668);
    }

    #[test]
    fn unset_vehicle_is_neutral() {
        let request = TransportRequest {
            vehicle_type: None,
            ..liters(100.0)
        };
        let estimate = estimate_cost(&request).unwrap();
        assert_eq!(estimate.vehicle_multiplier, 1.0);
        assert_eq!(estimate.estimated_cost, 300);
    }

    #[test]
    fn unrepresentable_cost_gives_no_estimate() {
        assert!(estimate_cost(&liters(1e20)).is_none());
        assert!(estimate_cost(&liters(f64::MAX)).is_none());

        let large = estimate_cost(&liters(1e15)).unwrap();
        assert_eq!(large.estimated_cost, 2_500_000_000_000_000);
        assert_eq!(large.effective_unit_rate(), 2.5);
    }

    #[test]
    fn custom_rules_are_honoured() {
        let mut rules = PricingRules::standard();
        rules.liters = UnitRate::new(1.0, 2.0, 50.0);
        let estimate = rules.estimate(&liters(10.0)).unwrap();
        assert_eq!(estimate.estimated_cost, 20);
    }

    #[test]
    fn rationale_mentions_the_total() {
        let estimate = estimate_cost(&liters(5000.0)).unwrap();
        assert!(estimate.rationale().ends_with("= 15000"));
    }
}
