use crate::form_host::FormHostError;
use crate::model::mongodb::Id;

use super::StoreError;

/// Log target for states that need an operator.
pub const ALERT_TARGET: &str = "jobboard::alert";

/// Told when a job was left without its form and could not be removed.
pub trait InconsistencyAlert: Send + Sync {
    fn raise(&self, job_id: Id, cause: &FormHostError, rollback: &StoreError);
}

/// Writes the alert to the [`ALERT_TARGET`] log, which `log4rs.yaml` sends to
/// its own file.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlert;

impl InconsistencyAlert for LogAlert {
    fn raise(&self, job_id: Id, cause: &FormHostError, rollback: &StoreError) {
        log::error!(
            target: ALERT_TARGET,
            "Job {job_id} exists without its application form and must be removed by hand. \
             Form creation failed with: {cause}. Removal failed with: {rollback}"
        );
    }
}
