use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::{bson::oid::Error as OidError, error::Error as DbError};
use rocket::{http::Status, response::Responder, serde::json::Json, Request};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    OidParse(#[from] OidError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::Status(Status::NotFound, format!("{} not found", what.into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::OidParse(_) => Status::BadRequest,
            Self::Status(status, _) => *status,
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let message = if status.code >= 500 {
            // Don't leak database internals to the client.
            error!("{self}");
            "Internal server error".to_string()
        } else {
            warn!("{self}");
            self.to_string()
        };
        (status, Json(ErrorBody { message })).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(Error::not_found("Job 1").status(), Status::NotFound);
        assert_eq!(Error::not_found("Job 1").to_string(), "Job 1 not found");
        assert_eq!(Error::bad_request("nope").status(), Status::BadRequest);

        let expired: Error = JwtError::from(JwtErrorKind::ExpiredSignature).into();
        assert_eq!(expired.status(), Status::Unauthorized);
        let garbled: Error = JwtError::from(JwtErrorKind::InvalidToken).into();
        assert_eq!(garbled.status(), Status::BadRequest);

        let oid: Error = "zzz".parse::<mongodb::bson::oid::ObjectId>().unwrap_err().into();
        assert_eq!(oid.status(), Status::BadRequest);
    }
}
