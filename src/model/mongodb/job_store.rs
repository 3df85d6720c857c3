use crate::model::db::job::NewJob;
use crate::workflow::{JobStore, StoreError};

use super::{Coll, Id};

/// Saves jobs in the `jobs` collection.
pub struct MongoJobStore {
    jobs: Coll<NewJob>,
}

impl MongoJobStore {
    pub fn new(jobs: Coll<NewJob>) -> Self {
        Self { jobs }
    }
}

#[rocket::async_trait]
impl JobStore for MongoJobStore {
    async fn create_job(&self, job: &NewJob) -> Result<Id, StoreError> {
        let inserted = self.jobs.insert_one(job, None).await?.inserted_id;
        let id = inserted.as_object_id().ok_or_else(|| {
            StoreError::Unexpected(format!("job was saved with a non-ObjectId ID: {inserted}"))
        })?;
        Ok(id.into())
    }

    async fn delete_job(&self, job_id: Id) -> Result<(), StoreError> {
        let result = self.jobs.delete_one(job_id.as_doc(), None).await?;
        if result.deleted_count == 0 {
            // Nothing to undo; the job is already absent.
            warn!("Job {job_id} was already gone when it was deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mongodb::Database;

    use super::*;
    use crate::model::db::job::Job;

    #[backend_test]
    async fn create_then_delete(db: Database, jobs: Coll<Job>) {
        let store = MongoJobStore::new(Coll::from_db(&db));
        let job = NewJob::example(Id::new());

        let id = store.create_job(&job).await.unwrap();
        let saved = jobs.find_one(id.as_doc(), None).await.unwrap().unwrap();
        assert_eq!(saved.job, job);

        store.delete_job(id).await.unwrap();
        assert!(jobs.find_one(id.as_doc(), None).await.unwrap().is_none());

        // Deleting again is not an error.
        store.delete_job(id).await.unwrap();
    }
}
