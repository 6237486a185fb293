//! Progress aggregation — the computed read model for the dashboard.
//!
//! Pure composition over the other components' current state; owns no
//! mutable state and is recomputed per request, never stored.

use serde::Serialize;

use crate::{
  payment::PaymentState, profile::Profile, verification::VerificationState,
};

/// The four sequential recruitment stages.
pub const TOTAL_STEPS: u8 = 4;

/// One entry in the fixed 4-item step list. Titles and descriptions are
/// display-only. Steps 2–3 also carry the raw stage state.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
  pub step:         u8,
  pub title:        &'static str,
  pub description:  &'static str,
  pub is_completed: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status:       Option<String>,
}

/// Position within the stage sequence.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Progress {
  pub current_step: u8,
  pub total_steps:  u8,
  /// Share of steps completed *before* the current one; tops out at 75.
  pub percentage:   u8,
}

/// The aggregated progress view.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
  pub progress: Progress,
  pub steps:    Vec<StepView>,
}

/// Derive the current step and step list by sequential gating: each stage
/// only counts once every earlier stage is complete.
pub fn compute(
  profile:      Option<&Profile>,
  verification: VerificationState,
  payment:      PaymentState,
) -> ProgressView {
  let profile_complete = profile.is_some_and(Profile::is_complete);
  let verification_approved = verification == VerificationState::Approved;
  let payment_paid = payment == PaymentState::Paid;

  let mut current_step = 1;
  if profile_complete {
    current_step = 2;
    if verification_approved {
      current_step = 3;
      if payment_paid {
        current_step = 4;
      }
    }
  }

  let verification_status = serde_plain_state(&verification);
  let payment_status = serde_plain_state(&payment);

  let steps = vec![
    StepView {
      step:         1,
      title:        "Complete your profile",
      description:  "Fill in your personal data and pick the sub-division you are interested in.",
      is_completed: profile_complete,
      status:       None,
    },
    StepView {
      step:         2,
      title:        "Document verification",
      description:  "Upload the documents required to verify your registration.",
      is_completed: verification_approved,
      status:       Some(verification_status),
    },
    StepView {
      step:         3,
      title:        "Payment",
      description:  "Pay the registration fee to move on to the exam stage.",
      is_completed: payment_paid,
      status:       Some(payment_status),
    },
    StepView {
      step:         4,
      title:        "Selection exam",
      description:  "Take the exam for the sub-division you chose.",
      // No completion signal until an exam module exists.
      is_completed: false,
      status:       None,
    },
  ];

  let percentage = (f64::from(current_step - 1) / f64::from(TOTAL_STEPS)
    * 100.0)
    .round() as u8;

  ProgressView {
    progress: Progress { current_step, total_steps: TOTAL_STEPS, percentage },
    steps,
  }
}

/// Render a stage state enum as its plain wire string (`NOT_STARTED`, …).
fn serde_plain_state<T: Serialize>(state: &T) -> String {
  match serde_json::to_value(state) {
    Ok(serde_json::Value::String(s)) => s,
    _ => String::new(),
  }
}
