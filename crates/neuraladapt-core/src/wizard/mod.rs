//! Multi-step intake wizard.
//!
//! A [`FormWizard`] walks an ordered list of [`WizardStep`]s over a shared
//! [`WorkoutDraft`]. It moves forward only when the current step's
//! validation passes, and hands the composed request to a
//! [`WizardCompletion`] after the last step.

mod draft;
mod steps;

pub use draft::{FieldKey, WorkoutDraft};
pub use steps::{BasicInfoStep, GoalsStep, TrainingDetailsStep, intake_steps};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::workout::WorkoutRequest;

// ---------------------------------------------------------------------------
// Step interface
// ---------------------------------------------------------------------------

/// How a field is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Select(&'static [&'static str]),
    Number {
        min: u32,
        max: u32,
        suffix: &'static str,
    },
}

/// One input on a step's render surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<&'static str>,
}

impl FieldSpec {
    pub fn new(key: FieldKey, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = Some(text);
        self
    }
}

/// Result of validating a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Pass,
    /// User-facing reason the step cannot be left yet.
    Fail(String),
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("step {step:?} failed: {message}")]
    Step { step: String, message: String },

    #[error("could not finish: {0:#}")]
    Completion(anyhow::Error),
}

/// One page of the wizard.
#[async_trait]
pub trait WizardStep: Send + Sync {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn fields(&self) -> Vec<FieldSpec>;

    /// Check this step's inputs and copy them into the draft. A failed
    /// check leaves the draft's typed fields untouched.
    async fn validate(&self, draft: &mut WorkoutDraft) -> Result<StepOutcome, WizardError>;
}

/// Receives the finished request.
#[async_trait]
pub trait WizardCompletion: Send + Sync {
    async fn complete(&self, request: WorkoutRequest) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// What [`FormWizard::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the step at this index.
    Moved(usize),
    /// Stayed put; see [`FormWizard::error`].
    Rejected,
    /// The last step passed and the completion accepted the request.
    Completed,
}

pub struct FormWizard<C> {
    steps: Vec<Box<dyn WizardStep>>,
    draft: WorkoutDraft,
    completion: C,
    index: usize,
    error: Option<String>,
    busy: Arc<AtomicBool>,
    finished: bool,
}

impl<C: WizardCompletion> FormWizard<C> {
    pub fn new(steps: Vec<Box<dyn WizardStep>>, completion: C) -> Self {
        Self {
            steps,
            draft: WorkoutDraft::new(),
            completion,
            index: 0,
            error: None,
            busy: Arc::new(AtomicBool::new(false)),
            finished: false,
        }
    }

    /// A wizard over the standard intake steps.
    pub fn intake(completion: C) -> Self {
        Self::new(intake_steps(), completion)
    }

    pub fn current_step(&self) -> Option<&dyn WizardStep> {
        self.steps.get(self.index).map(|s| s.as_ref())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Fraction of steps reached, counting the current one.
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        (self.index + 1) as f64 / self.steps.len() as f64
    }

    pub fn is_first_step(&self) -> bool {
        self.index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.index + 1 == self.steps.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Message from the last rejected advance, cleared on the next attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> &WorkoutDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut WorkoutDraft {
        &mut self.draft
    }

    /// Shared flag that reads `true` while a step validates or the
    /// completion runs.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// Validate the current step and move forward if it passes.
    pub async fn advance(&mut self) -> Advance {
        if self.finished {
            return Advance::Completed;
        }
        let Some(step) = self.steps.get(self.index) else {
            self.error = Some("wizard has no steps".to_owned());
            return Advance::Rejected;
        };

        self.error = None;
        self.busy.store(true, Ordering::SeqCst);

        let result = match step.validate(&mut self.draft).await {
            Ok(StepOutcome::Pass) if self.index + 1 == self.steps.len() => self
                .completion
                .complete(self.draft.compose())
                .await
                .map(|()| Advance::Completed)
                .map_err(|e| WizardError::Completion(e).to_string()),
            Ok(StepOutcome::Pass) => Ok(Advance::Moved(self.index + 1)),
            Ok(StepOutcome::Fail(message)) => Err(message),
            Err(e) => Err(e.to_string()),
        };

        self.busy.store(false, Ordering::SeqCst);

        match result {
            Ok(Advance::Moved(next)) => {
                debug!(from = self.index, to = next, "wizard advanced");
                self.index = next;
                Advance::Moved(next)
            }
            Ok(outcome) => {
                debug!("wizard completed");
                self.finished = true;
                outcome
            }
            Err(message) => {
                debug!(step = self.index, %message, "wizard step rejected");
                self.error = Some(message);
                Advance::Rejected
            }
        }
    }

    /// Step back one page. No-op on the first step.
    pub fn back(&mut self) {
        if !self.is_first_step() {
            self.index -= 1;
        }
        self.error = None;
    }
}
