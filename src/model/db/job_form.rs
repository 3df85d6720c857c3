use serde::{Deserialize, Serialize};

use crate::model::{common::HostedForm, mongodb::Id};

/// Links a job to the hosted form that collects its applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobForm {
    pub job_id: Id,
    #[serde(flatten)]
    pub form: HostedForm,
}
