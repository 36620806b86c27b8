//! The transport-request form as an explicit value.
//!
//! Every transition borrows the current form and returns the next one, so the
//! caller owns exactly one `RequestForm` and swaps it on each event.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use super::entities::{
    MaterialType, QuantityUnit, SubmittedRequest, TransportRequest, Urgency, VehicleType,
};
use super::estimate::{estimate_cost, QuoteEstimate};
use super::validation::{validate, RequestField, ValidationResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    #[default]
    Editing,
    Submitting,
    Submitted,
}

impl FormPhase {
    pub fn label(&self) -> &'static str {
        match self {
            FormPhase::Editing => "editing",
            FormPhase::Submitting => "submitting",
            FormPhase::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("form is {} and cannot be edited", .0.label())]
    Frozen(FormPhase),
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("request has validation errors: {0}")]
    Invalid(ValidationResult),
    #[error("cannot {action} while the form is {}", .phase.label())]
    UnexpectedPhase {
        action: &'static str,
        phase: FormPhase,
    },
    #[error("no estimate available for this request")]
    NoEstimate,
    #[error("failed to stamp request: {0}")]
    Stamp(String),
}

/// A single field change coming from the UI.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldEdit {
    MaterialType(Option<MaterialType>),
    Quantity(Option<f64>),
    QuantityUnit(QuantityUnit),
    PickupLocation(String),
    DropLocation(String),
    PreferredDate(Option<OffsetDateTime>),
    Urgency(Urgency),
    VehicleType(Option<VehicleType>),
    TemperatureControl(bool),
    HazardousMaterial(bool),
    InsuranceRequired(bool),
    ContactPerson(String),
    ContactPhone(String),
    SpecialInstructions(Option<String>),
}

impl FieldEdit {
    pub fn field(&self) -> RequestField {
        match self {
            Self::MaterialType(_) => RequestField::MaterialType,
            Self::Quantity(_) => RequestField::Quantity,
            Self::QuantityUnit(_) => RequestField::QuantityUnit,
            Self::PickupLocation(_) => RequestField::PickupLocation,
            Self::DropLocation(_) => RequestField::DropLocation,
            Self::PreferredDate(_) => RequestField::PreferredDate,
            Self::Urgency(_) => RequestField::Urgency,
            Self::VehicleType(_) => RequestField::VehicleType,
            Self::TemperatureControl(_) => RequestField::TemperatureControl,
            Self::HazardousMaterial(_) => RequestField::HazardousMaterial,
            Self::InsuranceRequired(_) => RequestField::InsuranceRequired,
            Self::ContactPerson(_) => RequestField::ContactPerson,
            Self::ContactPhone(_) => RequestField::ContactPhone,
            Self::SpecialInstructions(_) => RequestField::SpecialInstructions,
        }
    }

    fn apply_to(self, request: &mut TransportRequest) {
        match self {
            Self::MaterialType(value) => request.material_type = value,
            Self::Quantity(value) => request.quantity = value,
            Self::QuantityUnit(value) => request.quantity_unit = value,
            Self::PickupLocation(value) => request.pickup_location = value,
            Self::DropLocation(value) => request.drop_location = value,
            Self::PreferredDate(value) => request.preferred_date = value,
            Self::Urgency(value) => request.urgency = value,
            Self::VehicleType(value) => request.vehicle_type = value,
            Self::TemperatureControl(value) => request.temperature_control = value,
            Self::HazardousMaterial(value) => request.hazardous_material = value,
            Self::InsuranceRequired(value) => request.insurance_required = value,
            Self::ContactPerson(value) => request.contact_person = value,
            Self::ContactPhone(value) => request.contact_phone = value,
            Self::SpecialInstructions(value) => {
                request.special_instructions = value.filter(|text| !text.trim().is_empty())
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestForm {
    pub request: TransportRequest,
    #[serde(default)]
    pub errors: ValidationResult,
    #[serde(default)]
    pub phase: FormPhase,
    /// Message from the last failed submission, cleared on the next attempt.
    #[serde(default)]
    pub submit_error: Option<String>,
    #[serde(default)]
    pub submitted: Option<SubmittedRequest>,
}

impl RequestForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume editing a previously saved draft.
    pub fn from_draft(request: TransportRequest) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    pub fn is_editable(&self) -> bool {
        self.phase == FormPhase::Editing
    }

    /// Recomputed from the current request on every call.
    pub fn estimate(&self) -> Option<QuoteEstimate> {
        estimate_cost(&self.request)
    }

    pub fn apply(&self, edit: FieldEdit) -> Result<Self, FormError> {
        if !self.is_editable() {
            return Err(FormError::Frozen(self.phase));
        }

        let field = edit.field();
        let mut next = self.clone();
        edit.apply_to(&mut next.request);
        next.errors.clear_field(field);
        if field == RequestField::PickupLocation {
            // the same-location error lives on the drop field
            next.errors.clear_field(RequestField::DropLocation);
        }
        Ok(next)
    }

    pub fn with_errors(&self, errors: ValidationResult) -> Self {
        Self {
            errors,
            ..self.clone()
        }
    }

    /// `Editing → Submitting`, only when the request validates cleanly.
    pub fn begin_submit(&self) -> Result<Self, FormError> {
        match self.phase {
            FormPhase::Editing => {}
            FormPhase::Submitting => return Err(FormError::AlreadySubmitting),
            FormPhase::Submitted => return Err(FormError::Frozen(self.phase)),
        }

        let errors = validate(&self.request);
        if !errors.is_valid() {
            debug!(errors = errors.len(), "submission blocked by validation");
            return Err(FormError::Invalid(errors));
        }

        Ok(Self {
            request: self.request.clone(),
            errors,
            phase: FormPhase::Submitting,
            submit_error: None,
            submitted: None,
        })
    }

    /// Freeze the request into the record handed to the backend.
    pub fn prepare_submission(&self) -> Result<SubmittedRequest, FormError> {
        self.expect_phase("prepare a submission", FormPhase::Submitting)?;
        let estimate = self.estimate().ok_or(FormError::NoEstimate)?;
        SubmittedRequest::stamp(self.request.clone(), estimate.estimated_cost)
            .map_err(|err| FormError::Stamp(err.to_string()))
    }

    /// `Submitting → Editing`, surfacing the failure to the user.
    pub fn submission_failed(&self, message: impl Into<String>) -> Result<Self, FormError> {
        self.expect_phase("record a failed submission", FormPhase::Submitting)?;
        Ok(Self {
            phase: FormPhase::Editing,
            submit_error: Some(message.into()),
            ..self.clone()
        })
    }

    /// `Submitting → Submitted`.
    pub fn submission_succeeded(&self, record: SubmittedRequest) -> Result<Self, FormError> {
        self.expect_phase("complete a submission", FormPhase::Submitting)?;
        Ok(Self {
            phase: FormPhase::Submitted,
            submitted: Some(record),
            ..self.clone()
        })
    }

    /// Back to a blank form once the confirmation has been shown.
    pub fn reset(&self) -> Result<Self, FormError> {
        self.expect_phase("reset", FormPhase::Submitted)?;
        Ok(Self::new())
    }

    fn expect_phase(&self, action: &'static str, phase: FormPhase) -> Result<(), FormError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(FormError::UnexpectedPhase {
                action,
                phase: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn filled() -> RequestForm {
        let edits = [
            FieldEdit::MaterialType(Some(MaterialType::CrudeOil)),
            FieldEdit::Quantity(Some(5000.0)),
            FieldEdit::PickupLocation("Mumbai".into()),
            FieldEdit::DropLocation("Surat".into()),
            FieldEdit::PreferredDate(Some(datetime!(2024-07-15 08:30 UTC))),
            FieldEdit::VehicleType(Some(VehicleType::TankerTruck)),
            FieldEdit::ContactPerson("Meera Shah".into()),
            FieldEdit::ContactPhone("+91 98200 12345".into()),
        ];
        edits
            .into_iter()
            .try_fold(RequestForm::new(), |form, edit| form.apply(edit))
            .unwrap()
    }

    #[test]
    fn estimate_tracks_every_edit() {
        let form = filled();
        assert_eq!(form.estimate().unwrap().estimated_cost, 15_000);

        let form = form.apply(FieldEdit::Urgency(Urgency::Urgent)).unwrap();
        assert_eq!(form.estimate().unwrap().estimated_cost, 27_000);

        let form = form.apply(FieldEdit::Quantity(None)).unwrap();
        assert!(form.estimate().is_none());
    }

    #[test]
    fn invalid_submit_stays_editing() {
        let form = RequestForm::new();
        let err = form.begin_submit().unwrap_err();
        let FormError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.len() >= 3);

        let form = form.with_errors(errors);
        assert_eq!(form.phase, FormPhase::Editing);
        assert!(form.errors.contains(RequestField::ContactPerson));
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        let form = RequestForm::new();
        let Err(FormError::Invalid(errors)) = form.begin_submit() else {
            panic!("expected validation failure");
        };
        let form = form
            .with_errors(errors)
            .apply(FieldEdit::ContactPerson("Anil".into()))
            .unwrap();

        assert!(!form.errors.contains(RequestField::ContactPerson));
        assert!(form.errors.contains(RequestField::ContactPhone));
    }

    #[test]
    fn pickup_edit_clears_same_location_error() {
        let form = filled()
            .apply(FieldEdit::DropLocation("MUMBAI".into()))
            .unwrap();
        let Err(FormError::Invalid(errors)) = form.begin_submit() else {
            panic!("expected validation failure");
        };
        let form = form
            .with_errors(errors)
            .apply(FieldEdit::PickupLocation("Nagpur".into()))
            .unwrap();
        assert!(form.errors.is_valid());
    }

    #[test]
    fn submitting_freezes_the_form() {
        let form = filled().begin_submit().unwrap();
        assert_eq!(form.phase, FormPhase::Submitting);

        assert_eq!(
            form.apply(FieldEdit::Quantity(Some(1.0))).unwrap_err(),
            FormError::Frozen(FormPhase::Submitting)
        );
        assert_eq!(form.begin_submit().unwrap_err(), FormError::AlreadySubmitting);
    }

    #[test]
    fn failed_submission_returns_to_editing() {
        let form = filled().begin_submit().unwrap();
        let form = form.submission_failed("Network error").unwrap();

        assert_eq!(form.phase, FormPhase::Editing);
        assert_eq!(form.submit_error.as_deref(), Some("Network error"));

        let retry = form.begin_submit().unwrap();
        assert!(retry.submit_error.is_none());
    }

    #[test]
    fn successful_submission_then_reset() {
        let form = filled().begin_submit().unwrap();
        let record = form.prepare_submission().unwrap();
        assert_eq!(record.estimated_cost, 15_000);
        assert_eq!(record.request, form.request);

        let done = form.submission_succeeded(record).unwrap();
        assert_eq!(done.phase, FormPhase::Submitted);
        assert!(matches!(done.begin_submit(), Err(FormError::Frozen(_))));
        assert!(done.apply(FieldEdit::TemperatureControl(true)).is_err());

        let fresh = done.reset().unwrap();
        assert_eq!(fresh, RequestForm::new());
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let form = filled();
        assert!(matches!(
            form.submission_failed("x"),
            Err(FormError::UnexpectedPhase { .. })
        ));
        assert!(form.prepare_submission().is_err());
        assert!(form.reset().is_err());
    }

    #[test]
    fn blank_instructions_are_dropped() {
        let form = filled()
            .apply(FieldEdit::SpecialInstructions(Some("   ".into())))
            .unwrap();
        assert!(form.request.special_instructions.is_none());
    }

    #[test]
    fn form_state_round_trips_through_json() {
        let form = filled().begin_submit().unwrap();
        let json = serde_json::to_string(&form).unwrap();
        let back: RequestForm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, form);
    }
}
