use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use mongodb::Database;
use rocket::{
    http::{Cookie, SameSite, Status},
    outcome::{try_outcome, IntoOutcome},
    request::{FromRequest, Outcome},
    time::Duration,
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::{
    common::Role,
    db::user::User,
    mongodb::{Coll, Id},
};

use super::scope::Scope;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Proof that the request comes from an activated user whose role is
/// admitted by the scope `S`.
#[derive(Serialize, Deserialize)]
pub struct AuthToken<S> {
    #[serde(rename = "uid")]
    pub id: Id,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(skip)]
    phantom: PhantomData<S>,
}

impl<S> AuthToken<S> {
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            phantom: PhantomData,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .expect("JWT encoding is infallible with default settings");

        Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish()
    }

    /// Deserialize a token from a cookie, checking its signature and expiry.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self, Error> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<S>>| claims.claims.token)?;
        Ok(token)
    }
}

#[derive(Serialize, Deserialize)]
struct Claims<S> {
    #[serde(flatten, bound = "")]
    token: AuthToken<S>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r, S: Scope> FromRequest<'r> for AuthToken<S> {
    type Error = Error;

    /// Read the cookie, then check the user still exists, is activated, and
    /// currently holds a role the scope admits.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        // Forward to any routes that do not require an authentication token.
        let cookie = try_outcome!(req.cookies().get(AUTH_TOKEN_COOKIE).or_forward(()));
        let token: Self = try_outcome!(Self::from_cookie(cookie, config).or_forward(()));

        // The role may have changed since the token was issued, so go by the database.
        let db = req.guard::<&State<Database>>().await.unwrap();
        let user = match Coll::<User>::from_db(db).find_one(token.id.as_doc(), None).await {
            Ok(Some(user)) => user,
            Ok(None) => return Outcome::Forward(()),
            Err(e) => return Outcome::Failure((Status::InternalServerError, e.into())),
        };

        if !user.activated {
            let message = "Your account has not been activated yet".to_string();
            return Outcome::Failure((Status::Forbidden, Error::Status(Status::Forbidden, message)));
        }
        if !S::permits(user.role) {
            return Outcome::Forward(());
        }

        Outcome::Success(Self::new(&user))
    }
}
