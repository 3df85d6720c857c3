//! Client for the remote form host (Tally), which serves application forms
//! and collects the responses.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::{Block, FormRequest, FormStatus};
use crate::model::{common::HostedForm, mongodb::Id};
use crate::workflow::FormHost;

/// Ways a form creation call can fail. The workflow treats them all alike.
#[derive(Debug, Error)]
pub enum FormHostError {
    #[error("the form host did not respond in time")]
    Timeout,
    #[error("could not reach the form host: {0}")]
    Network(String),
    #[error("the form host rejected the form (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected response from the form host: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FormHostError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Connection settings for the form host.
#[derive(Debug, Clone, Deserialize)]
pub struct FormHostConfig {
    /// Base URL of the form host's API.
    pub form_host_url: String,
    pub form_host_api_key: String,
    /// Base URL that respondents and editors see.
    pub form_public_url: String,
    /// Seconds before a form host call is abandoned.
    #[serde(default = "default_timeout")]
    pub form_host_timeout: u64,
    /// Workspace to create forms in; the account default if absent.
    #[serde(default)]
    pub form_workspace_id: Option<String>,
}

fn default_timeout() -> u64 {
    15
}

/// Creates forms through the form host's REST API.
pub struct TallyFormHost {
    client: reqwest::Client,
    config: FormHostConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFormBody<'a> {
    name: String,
    status: FormStatus,
    blocks: &'a [Block],
    #[serde(skip_serializing_if = "Option::is_none")]
    workspace_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreatedForm {
    id: String,
}

impl TallyFormHost {
    pub fn new(config: FormHostConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.form_host_timeout))
            .build()?;
        Ok(Self { client, config })
    }

    /// Public links for the form with the given host ID.
    pub fn describe(&self, form_id: &str) -> HostedForm {
        let base = self.config.form_public_url.trim_end_matches('/');
        HostedForm {
            form_id: form_id.to_string(),
            edit_url: format!("{base}/forms/{form_id}/edit"),
            embed_code: format!(
                r#"<iframe data-tally-src="{base}/embed/{form_id}" width="100%" height="500" frameborder="0" title="Application form"></iframe>"#
            ),
            preview_url: format!("{base}/r/{form_id}"),
        }
    }
}

#[rocket::async_trait]
impl FormHost for TallyFormHost {
    async fn create_form(
        &self,
        job_id: Id,
        name: &str,
        request: &FormRequest,
    ) -> Result<HostedForm, FormHostError> {
        let url = format!("{}/forms", self.config.form_host_url.trim_end_matches('/'));
        let body = CreateFormBody {
            // The job ID in the name lets editors on the host find the advert.
            name: format!("{name} ({job_id})"),
            status: request.status,
            blocks: &request.blocks,
            workspace_id: self.config.form_workspace_id.as_deref(),
        };

        debug!("Creating hosted form for job {job_id} with {} blocks", request.blocks.len());
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.form_host_api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FormHostError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedForm = response.json().await?;
        info!("Created hosted form {} for job {job_id}", created.id);
        Ok(self.describe(&created.id))
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json::json;
    use wiremock::{
        matchers::{bearer_token, body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::form::{prepare, FormField, RandomIds};

    fn host_for(server: &MockServer, timeout: u64) -> TallyFormHost {
        TallyFormHost::new(FormHostConfig {
            form_host_url: server.uri(),
            form_host_api_key: "secret-key".to_string(),
            form_public_url: "https://tally.so/".to_string(),
            form_host_timeout: timeout,
            form_workspace_id: None,
        })
        .unwrap()
    }

    fn request() -> FormRequest {
        prepare(
            "Apply",
            &[FormField::example_name()],
            FormStatus::Published,
            &mut RandomIds,
        )
        .unwrap()
    }

    #[rocket::async_test]
    async fn creates_form() {
        let server = MockServer::start().await;
        let job_id = Id::new();
        Mock::given(method("POST"))
            .and(path("/forms"))
            .and(bearer_token("secret-key"))
            .and(body_partial_json(json!({
                "name": format!("Graduate engineer ({job_id})"),
                "status": "PUBLISHED"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "wA1bC2"})))
            .expect(1)
            .mount(&server)
            .await;

        let form = host_for(&server, 5)
            .create_form(job_id, "Graduate engineer", &request())
            .await
            .unwrap();

        assert_eq!(form.form_id, "wA1bC2");
        assert_eq!(form.edit_url, "https://tally.so/forms/wA1bC2/edit");
        assert_eq!(form.preview_url, "https://tally.so/r/wA1bC2");
        assert!(form.embed_code.contains("https://tally.so/embed/wA1bC2"));
    }

    #[rocket::async_test]
    async fn rejection_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("blocks.1 is invalid"))
            .mount(&server)
            .await;

        let err = host_for(&server, 5)
            .create_form(Id::new(), "Job", &request())
            .await
            .unwrap_err();

        match err {
            FormHostError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "blocks.1 is invalid");
            }
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[rocket::async_test]
    async fn slow_host_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"id": "late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = host_for(&server, 1)
            .create_form(Id::new(), "Job", &request())
            .await
            .unwrap_err();

        assert!(matches!(err, FormHostError::Timeout), "{err:?}");
    }

    #[rocket::async_test]
    async fn garbled_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = host_for(&server, 5)
            .create_form(Id::new(), "Job", &request())
            .await
            .unwrap_err();

        assert!(matches!(err, FormHostError::Malformed(_)), "{err:?}");
    }
}
