use chrono::Utc;
use mongodb::{bson::doc, options::FindOptions};
use rocket::{
    futures::TryStreamExt,
    http::Status,
    response::status::Created,
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    form::RandomIds,
    form_host::TallyFormHost,
    logging::RequestId,
    model::{
        api::{
            auth::{AnyUser, AuthToken, Poster},
            job::JobDescription,
            pagination::{Paginated, PaginationRequest},
            submission::{JobSubmission, SubmissionReceipt},
        },
        db::{
            job::{Job, NewJob},
            job_form::JobForm,
        },
        mongodb::{Coll, Id, MongoJobStore},
    },
    workflow::{LogAlert, SubmissionError, Workflow, ALERT_TARGET},
};

pub fn routes() -> Vec<Route> {
    routes![list_jobs, get_job, create_job, delete_job]
}

#[get("/jobs?<pagination..>")]
async fn list_jobs(
    _token: AuthToken<AnyUser>,
    pagination: PaginationRequest,
    jobs: Coll<Job>,
) -> Result<Json<Paginated<JobDescription>>> {
    let options = FindOptions::builder()
        .sort(doc! { "posted_at": -1 })
        .skip(pagination.skip())
        .limit(i64::from(pagination.page_size()))
        .build();

    let page = jobs
        .find(None, options)
        .await?
        .map_ok(JobDescription::from)
        .try_collect::<Vec<_>>()
        .await?;
    let total = jobs.count_documents(None, None).await?;

    Ok(Json(pagination.to_paginated(total, page)))
}

#[get("/jobs/<job_id>")]
async fn get_job(
    _token: AuthToken<AnyUser>,
    job_id: Id,
    jobs: Coll<Job>,
    forms: Coll<JobForm>,
) -> Result<Json<JobDescription>> {
    let job = jobs
        .find_one(job_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Job {job_id}")))?;
    let form = forms
        .find_one(doc! { "job_id": job_id }, None)
        .await?
        .map(|link| link.form);

    Ok(Json(JobDescription::new(job, form)))
}

#[post("/jobs", data = "<submission>", format = "json")]
async fn create_job(
    token: AuthToken<Poster>,
    submission: Json<JobSubmission>,
    jobs: Coll<NewJob>,
    forms: Coll<JobForm>,
    host: &State<TallyFormHost>,
    request_id: &RequestId,
) -> std::result::Result<Created<Json<SubmissionReceipt>>, SubmissionError> {
    let submission = submission.0.into_submission(token.id, Utc::now());
    let store = MongoJobStore::new(jobs);

    let committed = Workflow::new(&store, host.inner(), &LogAlert, RandomIds)
        .labelled(request_id)
        .run(submission)
        .await?;

    if let Some(form) = &committed.form {
        let link = JobForm {
            job_id: committed.job_id,
            form: form.clone(),
        };
        // Both the job and the form exist at this point; only the link is lost.
        if let Err(e) = forms.insert_one(link, None).await {
            log::error!(
                target: ALERT_TARGET,
                "Job {} has hosted form {} but the link could not be saved: {e}",
                committed.job_id,
                form.form_id
            );
        }
    }

    let location = uri!(get_job(committed.job_id)).to_string();
    Ok(Created::new(location).body(Json(committed.into())))
}

#[delete("/jobs/<job_id>")]
async fn delete_job(
    token: AuthToken<Poster>,
    job_id: Id,
    jobs: Coll<Job>,
    forms: Coll<JobForm>,
) -> Result<()> {
    let job = jobs
        .find_one(job_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Job {job_id}")))?;

    if job.publisher != token.id && !token.is_admin() {
        return Err(Error::Status(
            Status::Forbidden,
            "Only the publisher or an admin can remove this job".to_string(),
        ));
    }

    jobs.delete_one(job_id.as_doc(), None).await?;
    forms.delete_one(doc! { "job_id": job_id }, None).await?;
    info!("Removed job {job_id} ({})", job.title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::ContentType,
        local::asynchronous::Client,
        serde::json::{serde_json::json, Value},
    };

    use super::*;
    use crate::model::common::HostedForm;

    async fn insert_job(jobs: &Coll<NewJob>, job: NewJob) -> Id {
        jobs.insert_one(job, None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into()
    }

    #[backend_test(poster)]
    async fn create_without_form(client: Client, jobs: Coll<Job>) {
        let response = client
            .post(uri!(create_job))
            .header(ContentType::JSON)
            .body(json!(JobSubmission::example_without_form()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());

        let receipt: SubmissionReceipt = response.into_json().await.unwrap();
        assert_eq!(receipt.form, None);
        let job = jobs.find_one(receipt.job_id.as_doc(), None).await.unwrap().unwrap();
        assert_eq!(job.title, "Graduate Software Engineer");
    }

    #[backend_test(poster)]
    async fn invalid_form_creates_no_job(client: Client, jobs: Coll<Job>) {
        let mut submission = JobSubmission::example();
        submission.fields = vec![crate::form::FormField::new(
            "c1",
            crate::form::FieldType::Checkbox,
            "",
        )];
        let response = client
            .post(uri!(create_job))
            .header(ContentType::JSON)
            .body(json!(submission).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::UnprocessableEntity, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["stage"], "Validating");
        assert_eq!(body["outcome"], "ValidationFailed");
        assert_eq!(body["path"], "blocks.1.payload.text");
        assert_eq!(jobs.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test(poster)]
    async fn unreachable_host_rolls_back(client: Client, jobs: Coll<Job>) {
        // Tests point the form host at a closed port.
        let response = client
            .post(uri!(create_job))
            .header(ContentType::JSON)
            .body(json!(JobSubmission::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::BadGateway, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["stage"], "RollingBack");
        assert_eq!(body["outcome"], "RolledBack");
        assert_eq!(jobs.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test(poster)]
    async fn list_newest_first(client: Client, new_jobs: Coll<NewJob>) {
        let publisher = Id::new();
        let mut older = NewJob::example(publisher);
        older.title = "Older".to_string();
        older.posted_at = older.posted_at - chrono::Duration::days(1);
        insert_job(&new_jobs, older).await;
        insert_job(&new_jobs, NewJob::example(publisher)).await;

        let response = client.get("/jobs?page_num=1&page_size=1").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let page: Value = response.into_json().await.unwrap();
        assert_eq!(page["pagination"]["total"], 2);
        assert_eq!(page["items"][0]["title"], "Graduate Software Engineer");

        let response = client.get("/jobs?page_num=2&page_size=1").dispatch().await;
        let page: Value = response.into_json().await.unwrap();
        assert_eq!(page["items"][0]["title"], "Older");
    }

    #[backend_test(poster)]
    async fn get_with_form(client: Client, new_jobs: Coll<NewJob>, forms: Coll<JobForm>) {
        let job_id = insert_job(&new_jobs, NewJob::example(Id::new())).await;
        forms
            .insert_one(
                JobForm {
                    job_id,
                    form: HostedForm::example(),
                },
                None,
            )
            .await
            .unwrap();

        let response = client.get(uri!(get_job(job_id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let job: JobDescription = response.into_json().await.unwrap();
        assert_eq!(*job.id, job_id);
        assert_eq!(job.form, Some(HostedForm::example()));

        let response = client.get(uri!(get_job(Id::new()))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(poster)]
    async fn only_publisher_deletes(client: Client, new_jobs: Coll<NewJob>, forms: Coll<JobForm>) {
        let someone_else = insert_job(&new_jobs, NewJob::example(Id::new())).await;
        let response = client.delete(uri!(delete_job(someone_else))).dispatch().await;
        assert_eq!(Status::Forbidden, response.status());

        // Create one of our own through the API, then remove it.
        let response = client
            .post(uri!(create_job))
            .header(ContentType::JSON)
            .body(json!(JobSubmission::example_without_form()).to_string())
            .dispatch()
            .await;
        let receipt: SubmissionReceipt = response.into_json().await.unwrap();
        forms
            .insert_one(
                JobForm {
                    job_id: *receipt.job_id,
                    form: HostedForm::example(),
                },
                None,
            )
            .await
            .unwrap();

        let response = client.delete(uri!(delete_job(*receipt.job_id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(new_jobs.count_documents(None, None).await.unwrap(), 1);
        assert_eq!(forms.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test(admin)]
    async fn admin_deletes_any(client: Client, new_jobs: Coll<NewJob>) {
        let job_id = insert_job(&new_jobs, NewJob::example(Id::new())).await;
        let response = client.delete(uri!(delete_job(job_id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test]
    async fn listing_requires_login(client: Client) {
        let response = client.get("/jobs").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }
}
