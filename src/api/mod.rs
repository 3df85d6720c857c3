use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;

mod auth;
mod forms;
mod jobs;
mod profile;
mod users;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(profile::routes());
    routes.extend(users::routes());
    routes.extend(jobs::routes());
    routes.extend(forms::routes());
    routes
}

/// JSON bodies for errors that never reach a handler.
pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request<'_>) -> Json<ErrorBody> {
    let message = match status.code {
        // Routes behind a login forward when the token is missing or lacks
        // the required role, which ends here.
        404 => format!("Nothing found at {}, or you are not allowed to see it", req.uri()),
        _ => status.reason_lossy().to_string(),
    };
    Json(ErrorBody { message })
}
