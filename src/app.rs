use std::time::Duration;

use tracing::{info, warn};

use crate::{
    domain::{FormError, FormPhase, RequestForm},
    infra::{
        api::RequestGateway,
        notifications::{Notification, NotificationBus},
    },
    util::{config::AppConfig, persistence::save_draft},
};

/// Shown when the backend call fails; the user may simply retry.
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit request. Please try again.";

/// Result of one press of the submit button.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Accepted by the backend; the form is now `Submitted`.
    Submitted(RequestForm),
    /// Blocked by validation; the form is still `Editing` with per-field errors.
    Invalid(RequestForm),
    /// The backend call failed; the form is back in `Editing` with `submit_error` set.
    Failed(RequestForm),
}

impl SubmitOutcome {
    pub fn form(&self) -> &RequestForm {
        match self {
            Self::Submitted(form) | Self::Invalid(form) | Self::Failed(form) => form,
        }
    }

    pub fn into_form(self) -> RequestForm {
        match self {
            Self::Submitted(form) | Self::Invalid(form) | Self::Failed(form) => form,
        }
    }
}

/// Drives a request form through submission against a gateway.
pub struct RequestWorkflow<G> {
    gateway: G,
    bus: NotificationBus,
    reset_delay: Duration,
}

impl<G: RequestGateway> RequestWorkflow<G> {
    pub fn new(gateway: G, bus: NotificationBus, config: &AppConfig) -> Self {
        Self {
            gateway,
            bus,
            reset_delay: config.reset_delay,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    /// Re-entrant calls while a submission is pending are rejected by the form.
    pub async fn submit(&self, form: &RequestForm) -> Result<SubmitOutcome, FormError> {
        let submitting = match form.begin_submit() {
            Ok(next) => next,
            Err(FormError::Invalid(errors)) => {
                return Ok(SubmitOutcome::Invalid(form.with_errors(errors)));
            }
            Err(err) => return Err(err),
        };

        let record = match submitting.prepare_submission() {
            Ok(record) => record,
            Err(err) => {
                warn!("could not prepare submission: {err}");
                return self.fail(&submitting, err.to_string());
            }
        };

        match self.gateway.submit(&record).await {
            Ok(stored) => {
                info!(id = %stored.id, cost = stored.estimated_cost, "transport request submitted");
                self.bus.publish(Notification::submitted(&stored));
                Ok(SubmitOutcome::Submitted(
                    submitting.submission_succeeded(stored)?,
                ))
            }
            Err(err) => {
                warn!(id = %record.id, "submission failed: {err}");
                self.fail(&submitting, SUBMIT_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Wait out the confirmation delay, then hand back a blank form.
    pub async fn reset_after_delay(&self, form: &RequestForm) -> Result<RequestForm, FormError> {
        if form.phase != FormPhase::Submitted {
            return form.reset();
        }
        tokio::time::sleep(self.reset_delay).await;
        form.reset()
    }

    fn fail(&self, form: &RequestForm, message: String) -> Result<SubmitOutcome, FormError> {
        self.bus.publish(Notification::submission_failed(message.clone()));
        Ok(SubmitOutcome::Failed(form.submission_failed(message)?))
    }
}

/// Save the in-progress request; failures are logged, not fatal.
pub fn persist_draft(form: &RequestForm) {
    if !form.is_editable() {
        return;
    }
    if let Err(err) = save_draft(&form.request) {
        warn!("Failed to persist draft request: {err}");
    }
}
