use rocket::{serde::json::Json, Route};

use crate::{
    form::{prepare, FormRequest, RandomIds},
    model::api::{
        auth::{AuthToken, Poster},
        submission::FormPreviewRequest,
    },
    workflow::SubmissionError,
};

pub fn routes() -> Vec<Route> {
    routes![preview_form]
}

/// Show the blocks a form would be sent as, or why it would be rejected.
/// Nothing is saved and the form host is not contacted.
#[post("/forms/preview", data = "<preview>", format = "json")]
async fn preview_form(
    _token: AuthToken<Poster>,
    preview: Json<FormPreviewRequest>,
) -> Result<Json<FormRequest>, SubmissionError> {
    let preview = preview.0;
    prepare(&preview.form_title, &preview.fields, preview.status, &mut RandomIds)
        .map(Json)
        .map_err(SubmissionError::Validation)
}
