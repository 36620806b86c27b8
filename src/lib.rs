//! Quote estimation, validation and submission workflow for company
//! transport requests.

pub mod app;
pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{estimate_cost, validate, QuoteEstimate, TransportRequest, ValidationResult};
