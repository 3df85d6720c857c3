//! Creating a job together with its hosted application form.
//!
//! The job is saved first and the form created second. If the form cannot be
//! created, the job is deleted again, so that no advert is left without the
//! form it was meant to have. The job store and form host are reached through
//! the [`JobStore`] and [`FormHost`] traits.

mod alert;
mod error;
mod machine;

pub use alert::{InconsistencyAlert, LogAlert, ALERT_TARGET};
pub use error::{Outcome, Stage, StoreError, SubmissionError, SubmissionErrorBody};
pub use machine::Workflow;

use crate::form::{FormField, FormRequest, FormStatus};
use crate::form_host::FormHostError;
use crate::model::{common::HostedForm, db::job::NewJob, mongodb::Id};

/// Where jobs are saved.
#[rocket::async_trait]
pub trait JobStore: Send + Sync {
    /// Save a job. Either the job is durably visible afterwards or nothing
    /// was written.
    async fn create_job(&self, job: &NewJob) -> Result<Id, StoreError>;

    /// Remove a job. Either it is gone afterwards or it is fully present.
    async fn delete_job(&self, job_id: Id) -> Result<(), StoreError>;
}

/// Where application forms are hosted.
#[rocket::async_trait]
pub trait FormHost: Send + Sync {
    async fn create_form(
        &self,
        job_id: Id,
        name: &str,
        request: &FormRequest,
    ) -> Result<HostedForm, FormHostError>;
}

/// The form an author wants attached to their job.
#[derive(Debug, Clone)]
pub struct FormSpec {
    pub title: String,
    pub fields: Vec<FormField>,
    pub status: FormStatus,
}

/// A job and, optionally, its form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub job: NewJob,
    /// `None` if the author opted out of a hosted form.
    pub form: Option<FormSpec>,
}

/// A successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub job_id: Id,
    pub form: Option<HostedForm>,
}
