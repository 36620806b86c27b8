//! Filtering, ordering and summary figures for submitted requests.

use std::{cmp::Ordering, collections::HashMap};

use serde::Serialize;

use super::entities::{RequestStatus, SubmittedRequest, Urgency, VehicleType};

/// Sorting options for the request table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestSort {
    #[default]
    CreatedAt,
    EstimatedCost,
    Quantity,
    Urgency,
}

impl RequestSort {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreatedAt => "Created",
            Self::EstimatedCost => "Estimate",
            Self::Quantity => "Quantity",
            Self::Urgency => "Urgency",
        }
    }
}

/// Filter options for the request table. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub urgency: Option<Urgency>,
    pub vehicle_type: Option<VehicleType>,
    /// Case-insensitive match on material, pickup, drop or contact person.
    pub search: Option<String>,
    pub min_cost: Option<u64>,
    pub max_cost: Option<u64>,
}

impl RequestFilter {
    pub fn matches(&self, record: &SubmittedRequest) -> bool {
        let request = &record.request;

        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(urgency) = self.urgency {
            if request.urgency != urgency {
                return false;
            }
        }
        if let Some(vehicle) = &self.vehicle_type {
            if request.vehicle_type.as_ref() != Some(vehicle) {
                return false;
            }
        }
        if let Some(min) = self.min_cost {
            if record.estimated_cost < min {
                return false;
            }
        }
        if let Some(max) = self.max_cost {
            if record.estimated_cost > max {
                return false;
            }
        }
        if let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let needle = needle.to_lowercase();
            let material = request
                .material_type
                .map(|m| m.label())
                .unwrap_or_default();
            let hit = [
                material,
                request.pickup_location.as_str(),
                request.drop_location.as_str(),
                request.contact_person.as_str(),
            ]
            .iter()
            .any(|haystack| haystack.to_lowercase().contains(&needle));
            if !hit { return false; }
        }

        true
    }

    pub fn apply<'a>(&self, records: &'a [SubmittedRequest]) -> Vec<&'a SubmittedRequest> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

/// Sort requests in place by the given criteria.
pub fn sort_requests(records: &mut [SubmittedRequest], sort: RequestSort, descending: bool) {
    records.sort_by(|a, b| {
        let ord = match sort {
            RequestSort::CreatedAt => a.created_at.cmp(&b.created_at),
            RequestSort::EstimatedCost => a.estimated_cost.cmp(&b.estimated_cost),
            RequestSort::Quantity => {
                let a_qty = a.request.quantity.unwrap_or(0.0);
                let b_qty = b.request.quantity.unwrap_or(0.0);
                a_qty.partial_cmp(&b_qty).unwrap_or(Ordering::Equal)
            }
            RequestSort::Urgency => a.request.urgency.cmp(&b.request.urgency),
        };
        if descending { ord.reverse() } else { ord }
    });
}

/// Dashboard figures over a set of requests.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total: usize,
    pub by_status: HashMap<RequestStatus, usize>,
    pub total_estimated_cost: u64,
    pub average_estimated_cost: f64,
    pub pending_percent: f64,
    pub hazardous_percent: f64,
}

impl LedgerSummary {
    pub fn count(&self, status: RequestStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

pub fn summarize(records: &[SubmittedRequest]) -> LedgerSummary {
    if records.is_empty() {
        return LedgerSummary::default();
    }

    let total = records.len();
    let mut by_status = HashMap::new();
    let mut total_estimated_cost = 0_u64;
    let mut hazardous = 0_usize;

    for record in records {
        *by_status.entry(record.status).or_insert(0) += 1;
        total_estimated_cost = total_estimated_cost.saturating_add(record.estimated_cost);
        if record.request.hazardous_material {
            hazardous += 1;
        }
    }

    let pending = by_status.get(&RequestStatus::Pending).copied().unwrap_or(0);
    let percent = |part: usize| part as f64 / total as f64 * 100.0;

    LedgerSummary {
        total,
        total_estimated_cost,
        average_estimated_cost: total_estimated_cost as f64 / total as f64,
        pending_percent: percent(pending),
        hazardous_percent: percent(hazardous),
        by_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{MaterialType, TransportRequest};
    use time::{macros::datetime, OffsetDateTime};

    fn record(
        id: &str,
        cost: u64,
        status: RequestStatus,
        urgency: Urgency,
        created_at: OffsetDateTime,
    ) -> SubmittedRequest {
        SubmittedRequest {
            id: id.to_string(),
            request: TransportRequest {
                material_type: Some(MaterialType::Diesel),
                quantity: Some(cost as f64 / 3.0),
                pickup_location: "Chennai".into(),
                drop_location: "Bengaluru".into(),
                contact_person: format!("Contact {id}"),
                urgency,
                ..TransportRequest::default()
            },
            estimated_cost: cost,
            status,
            created_at,
            fingerprint: String::new(),
        }
    }

    fn sample() -> Vec<SubmittedRequest> {
        let mut hazardous = record(
            "c",
            9_000,
            RequestStatus::Delivered,
            Urgency::Low,
            datetime!(2024-03-03 0:00 UTC),
        );
        hazardous.request.hazardous_material = true;
        hazardous.request.material_type = Some(MaterialType::Chemicals);
        hazardous.request.vehicle_type = Some(VehicleType::HazardousMaterialTruck);

        vec![
            record(
                "a",
                3_000,
                RequestStatus::Pending,
                Urgency::High,
                datetime!(2024-03-01 0:00 UTC),
            ),
            record(
                "b",
                15_000,
                RequestStatus::Pending,
                Urgency::Urgent,
                datetime!(2024-03-02 0:00 UTC),
            ),
            hazardous,
            record(
                "d",
                1_000,
                RequestStatus::InTransit,
                Urgency::Medium,
                datetime!(2024-03-04 0:00 UTC),
            ),
        ]
    }

    fn ids(records: &[&SubmittedRequest]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let records = sample();
        assert_eq!(RequestFilter::default().apply(&records).len(), 4);
    }

    #[test]
    fn filters_combine() {
        let records = sample();
        let filter = RequestFilter {
            status: Some(RequestStatus::Pending),
            min_cost: Some(5_000),
            ..RequestFilter::default()
        };
        assert_eq!(ids(&filter.apply(&records)), vec!["b"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = sample();
        let by_material = RequestFilter {
            search: Some("chemi".into()),
            ..RequestFilter::default()
        };
        assert_eq!(ids(&by_material.apply(&records)), vec!["c"]);

        let by_contact = RequestFilter {
            search: Some("CONTACT d".into()),
            ..RequestFilter::default()
        };
        assert_eq!(ids(&by_contact.apply(&records)), vec!["d"]);

        let blank = RequestFilter {
            search: Some("   ".into()),
            ..RequestFilter::default()
        };
        assert_eq!(blank.apply(&records).len(), 4);
    }

    #[test]
    fn vehicle_filter_requires_a_match() {
        let records = sample();
        let filter = RequestFilter {
            vehicle_type: Some(VehicleType::HazardousMaterialTruck),
            ..RequestFilter::default()
        };
        assert_eq!(ids(&filter.apply(&records)), vec!["c"]);
    }

    #[test]
    fn sort_by_cost_and_urgency() {
        let mut records = sample();
        sort_requests(&mut records, RequestSort::EstimatedCost, true);
        let order: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);

        sort_requests(&mut records, RequestSort::Urgency, false);
        let order: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["c", "d", "a", "b"]);

        sort_requests(&mut records, RequestSort::CreatedAt, true);
        assert_eq!(records[0].id, "d");
    }

    #[test]
    fn summary_figures() {
        let summary = summarize(&sample());
        assert_eq!(summary.total, 4);
        assert_eq!(summary.count(RequestStatus::Pending), 2);
        assert_eq!(summary.count(RequestStatus::Cancelled), 0);
        assert_eq!(summary.total_estimated_cost, 28_000);
        assert_eq!(summary.average_estimated_cost, 7_000.0);
        assert_eq!(summary.pending_percent, 50.0);
        assert_eq!(summary.hazardous_percent, 25.0);
    }

    #[test]
    fn empty_summary_has_no_division_by_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.pending_percent, 0.0);
    }
}
