use std::fmt::{Display, Formatter};

use crate::form::{prepare, FormRequest, IdGenerator};
use crate::form_host::FormHostError;
use crate::model::{db::job::NewJob, mongodb::Id};

use super::{
    Committed, FormHost, FormSpec, InconsistencyAlert, JobStore, Stage, Submission,
    SubmissionError,
};

/// Progress of one submission.
enum State {
    Idle(Submission),
    Validating {
        job: NewJob,
        form: FormSpec,
    },
    CreatingJob {
        job: NewJob,
        form: Option<FormRequest>,
    },
    CreatingForm {
        job_id: Id,
        name: String,
        form: FormRequest,
    },
    RollingBack {
        job_id: Id,
        cause: FormHostError,
    },
    Committed(Committed),
    Failed(SubmissionError),
}

impl State {
    fn stage(&self) -> Option<Stage> {
        match self {
            Self::Validating { .. } => Some(Stage::Validating),
            Self::CreatingJob { .. } => Some(Stage::CreatingJob),
            Self::CreatingForm { .. } => Some(Stage::CreatingForm),
            Self::RollingBack { .. } => Some(Stage::RollingBack),
            Self::Idle(_) | Self::Committed(_) | Self::Failed(_) => None,
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(stage) = self.stage() {
            return write!(f, "{stage}");
        }
        match self {
            Self::Idle(_) => write!(f, "Idle"),
            Self::Committed(_) => write!(f, "Committed"),
            Self::Failed(err) => write!(f, "{:?}", err.outcome()),
            _ => Ok(()),
        }
    }
}

/// Runs one submission from start to finish.
///
/// Steps run strictly in order and nothing is retried. The only state shared
/// with other submissions is whatever the boundaries themselves share.
pub struct Workflow<'a, I> {
    store: &'a dyn JobStore,
    host: &'a dyn FormHost,
    alert: &'a dyn InconsistencyAlert,
    ids: I,
    label: String,
}

impl<'a, I: IdGenerator> Workflow<'a, I> {
    pub fn new(
        store: &'a dyn JobStore,
        host: &'a dyn FormHost,
        alert: &'a dyn InconsistencyAlert,
        ids: I,
    ) -> Self {
        Self {
            store,
            host,
            alert,
            ids,
            label: "submission".to_string(),
        }
    }

    /// Prefix log lines with `label`, e.g. the request ID.
    pub fn labelled(mut self, label: impl Display) -> Self {
        self.label = label.to_string();
        self
    }

    pub async fn run(mut self, submission: Submission) -> Result<Committed, SubmissionError> {
        let mut state = State::Idle(submission);
        loop {
            state = match state {
                State::Committed(committed) => {
                    info!("{}: committed job {}", self.label, committed.job_id);
                    return Ok(committed);
                }
                State::Failed(err) => return Err(err),
                state => {
                    let from = state.to_string();
                    let next = self.step(state).await;
                    debug!("{}: {from} -> {next}", self.label);
                    next
                }
            }
        }
    }

    async fn step(&mut self, state: State) -> State {
        match state {
            State::Idle(Submission {
                job,
                form: Some(form),
            }) => State::Validating { job, form },
            State::Idle(Submission { job, form: None }) => State::CreatingJob { job, form: None },

            State::Validating { job, form } => {
                match prepare(&form.title, &form.fields, form.status, &mut self.ids) {
                    Ok(request) => State::CreatingJob {
                        job,
                        form: Some(request),
                    },
                    Err(errors) => State::Failed(SubmissionError::Validation(errors)),
                }
            }

            State::CreatingJob { job, form } => match self.store.create_job(&job).await {
                Ok(job_id) => match form {
                    Some(form) => State::CreatingForm {
                        job_id,
                        name: job.title,
                        form,
                    },
                    None => State::Committed(Committed { job_id, form: None }),
                },
                Err(err) => State::Failed(SubmissionError::JobCreate(err)),
            },

            State::CreatingForm { job_id, name, form } => {
                match self.host.create_form(job_id, &name, &form).await {
                    Ok(hosted) => State::Committed(Committed {
                        job_id,
                        form: Some(hosted),
                    }),
                    Err(cause) => {
                        warn!("{}: form for job {job_id} failed, removing the job: {cause}", self.label);
                        State::RollingBack { job_id, cause }
                    }
                }
            }

            State::RollingBack { job_id, cause } => match self.store.delete_job(job_id).await {
                Ok(()) => State::Failed(SubmissionError::RolledBack { job_id, cause }),
                Err(rollback) => {
                    self.alert.raise(job_id, &cause, &rollback);
                    State::Failed(SubmissionError::RollbackFailed {
                        job_id,
                        cause,
                        rollback,
                    })
                }
            },

            terminal @ (State::Committed(_) | State::Failed(_)) => terminal,
        }
    }
}
