//! Transport request pricing, validation and form state live here.

pub mod entities;
pub mod estimate;
pub mod form;
pub mod ledger;
pub mod validation;

pub use entities::{
    request_fingerprint, MaterialType, QuantityUnit, RequestStatus, SubmittedRequest,
    TransportRequest, Urgency, VehicleType,
};
pub use estimate::{estimate_cost, PricingRules, QuoteEstimate, UnitRate, UrgencyRates};
pub use form::{FieldEdit, FormError, FormPhase, RequestForm};
pub use ledger::{sort_requests, summarize, LedgerSummary, RequestFilter, RequestSort};
pub use validation::{is_valid_phone, validate, RequestField, ValidationResult};
