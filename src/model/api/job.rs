use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::HostedForm,
    db::job::{Job, NewJob},
    mongodb::Id,
};

use super::id::ApiId;

/// A job advert as written by its publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub title: String,
    pub specialisation: String,
    pub description: String,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub application_link: Option<String>,
    pub deadline: DateTime<Utc>,
}

impl JobSpec {
    pub fn into_new_job(self, publisher: Id, posted_at: DateTime<Utc>) -> NewJob {
        NewJob {
            title: self.title,
            specialisation: self.specialisation,
            description: self.description,
            salary: self.salary,
            application_link: self.application_link,
            deadline: self.deadline,
            posted_at,
            publisher,
        }
    }
}

/// A job as shown to users, with its application form if it has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    pub id: ApiId,
    pub title: String,
    pub specialisation: String,
    pub description: String,
    pub salary: Option<String>,
    pub application_link: Option<String>,
    pub deadline: DateTime<Utc>,
    pub posted_at: DateTime<Utc>,
    pub publisher: ApiId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub form: Option<HostedForm>,
}

impl JobDescription {
    pub fn new(job: Job, form: Option<HostedForm>) -> Self {
        Self {
            id: job.id.into(),
            title: job.job.title,
            specialisation: job.job.specialisation,
            description: job.job.description,
            salary: job.job.salary,
            application_link: job.job.application_link,
            deadline: job.job.deadline,
            posted_at: job.job.posted_at,
            publisher: job.job.publisher.into(),
            form,
        }
    }
}

impl From<Job> for JobDescription {
    fn from(job: Job) -> Self {
        Self::new(job, None)
    }
}
