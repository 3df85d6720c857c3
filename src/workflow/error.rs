use std::fmt::{Display, Formatter};

use rocket::{http::Status, response::Responder, serde::json::Json, Request};
use serde::Serialize;
use thiserror::Error;

use crate::form::{ValidationErrors, Violation};
use crate::form_host::FormHostError;
use crate::model::mongodb::Id;

/// Failure of the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
    #[error("{0}")]
    Unexpected(String),
}

/// The step a submission was on when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Validating,
    CreatingJob,
    CreatingForm,
    RollingBack,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validating => "Validating",
            Self::CreatingJob => "CreatingJob",
            Self::CreatingForm => "CreatingForm",
            Self::RollingBack => "RollingBack",
        };
        write!(f, "{name}")
    }
}

/// Terminal states of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Committed,
    ValidationFailed,
    JobCreateFailed,
    RolledBack,
    RollbackFailed,
}

/// Why a submission did not commit.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The form was rejected locally. Nothing was created.
    #[error("{0}")]
    Validation(ValidationErrors),
    /// The job could not be saved. Nothing was created.
    #[error("The job could not be saved: {0}")]
    JobCreate(StoreError),
    /// The form host failed and the job was removed again.
    #[error("The job was not created because its application form could not be set up: {cause}")]
    RolledBack { job_id: Id, cause: FormHostError },
    /// The form host failed and the job could not be removed. The job now
    /// exists without its form.
    #[error(
        "The job {job_id} was saved but its application form could not be set up ({cause}), \
         and removing the job failed ({rollback}). Ask an administrator to remove it manually."
    )]
    RollbackFailed {
        job_id: Id,
        cause: FormHostError,
        rollback: StoreError,
    },
}

impl SubmissionError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation(_) => Stage::Validating,
            Self::JobCreate(_) => Stage::CreatingJob,
            Self::RolledBack { .. } | Self::RollbackFailed { .. } => Stage::RollingBack,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Validation(_) => Outcome::ValidationFailed,
            Self::JobCreate(_) => Outcome::JobCreateFailed,
            Self::RolledBack { .. } => Outcome::RolledBack,
            Self::RollbackFailed { .. } => Outcome::RollbackFailed,
        }
    }

    /// Dotted path of the first violation, for validation failures.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Validation(errors) => Some(errors.primary().path.as_str()),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.primary().message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::UnprocessableEntity,
            Self::JobCreate(_) | Self::RollbackFailed { .. } => Status::InternalServerError,
            Self::RolledBack { .. } => Status::BadGateway,
        }
    }
}

/// The JSON body of a failed submission.
#[derive(Debug, Serialize)]
pub struct SubmissionErrorBody<'a> {
    pub stage: Stage,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a str>,
    pub message: String,
    pub violations: &'a [Violation],
}

impl<'r, 'o: 'r> Responder<'r, 'o> for SubmissionError {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        match self.outcome() {
            Outcome::ValidationFailed => warn!("Submission rejected: {self}"),
            _ => error!("Submission failed at {}: {self}", self.stage()),
        }
        let violations = match &self {
            Self::Validation(errors) => errors.violations(),
            _ => &[],
        };
        let body = SubmissionErrorBody {
            stage: self.stage(),
            outcome: self.outcome(),
            path: self.path(),
            message: self.message(),
            violations,
        };
        (self.status(), Json(&body)).respond_to(req)
    }
}
