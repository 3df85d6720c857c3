use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core job advert data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCore {
    pub title: String,
    /// Area of work, e.g. "Backend" or "Quantitative research".
    pub specialisation: String,
    pub description: String,
    pub salary: Option<String>,
    /// External application page, for adverts without a hosted form.
    pub application_link: Option<String>,
    /// Applications close at this time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub deadline: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub posted_at: DateTime<Utc>,
    /// The user who advertised the job.
    pub publisher: Id,
}

/// A job without an ID.
pub type NewJob = JobCore;

/// A job from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub job: JobCore,
}

impl Deref for Job {
    type Target = JobCore;

    fn deref(&self) -> &Self::Target {
        &self.job
    }
}

impl DerefMut for Job {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.job
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    use chrono::{Duration, Timelike};

    impl JobCore {
        pub fn example(publisher: Id) -> Self {
            // BSON datetimes only keep milliseconds.
            let posted_at = Utc::now().with_nanosecond(0).unwrap();
            Self {
                title: "Graduate Software Engineer".to_string(),
                specialisation: "Backend".to_string(),
                description: "Build and run the services behind our trading platform.".to_string(),
                salary: Some("£45,000".to_string()),
                application_link: None,
                deadline: posted_at + Duration::days(30),
                posted_at,
                publisher,
            }
        }
    }
}
