use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::{FormField, FormStatus};
use crate::model::{common::HostedForm, mongodb::Id};
use crate::workflow::{Committed, FormSpec, Submission};

use super::{id::ApiId, job::JobSpec};

/// A new job advert, with the application form to host for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub job: JobSpec,
    /// Heading of the form. Defaults to the job title.
    #[serde(default)]
    pub form_title: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    /// If false, the job is created without a form and `fields` are ignored.
    pub attach_form: bool,
    #[serde(default)]
    pub status: FormStatus,
}

impl JobSubmission {
    pub fn into_submission(self, publisher: Id, posted_at: DateTime<Utc>) -> Submission {
        let form = self.attach_form.then(|| FormSpec {
            title: self.form_title.unwrap_or_else(|| self.job.title.clone()),
            fields: self.fields,
            status: self.status,
        });
        Submission {
            job: self.job.into_new_job(publisher, posted_at),
            form,
        }
    }
}

/// The result of a committed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub job_id: ApiId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub form: Option<HostedForm>,
}

impl From<Committed> for SubmissionReceipt {
    fn from(committed: Committed) -> Self {
        Self {
            job_id: committed.job_id.into(),
            form: committed.form,
        }
    }
}

/// A form to translate and check without creating anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPreviewRequest {
    pub form_title: String,
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub status: FormStatus,
}

#[cfg(test)]
mod examples {
    use super::*;

    impl JobSubmission {
        pub fn example() -> Self {
            Self {
                job: JobSpec::example(),
                form_title: Some("Apply now".to_string()),
                fields: vec![FormField::example_name(), FormField::example_cover_letter()],
                attach_form: true,
                status: FormStatus::Published,
            }
        }

        pub fn example_without_form() -> Self {
            Self {
                attach_form: false,
                ..Self::example()
            }
        }
    }
}
