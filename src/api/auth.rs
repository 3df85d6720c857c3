use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{AnyUser, AuthToken, Credentials, Registration, AUTH_TOKEN_COOKIE},
            user::UserDescription,
        },
        db::user::{normalise_email, NewUser, User},
        mongodb::{is_duplicate_key_error, Coll},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![register, login, logout]
}

#[post("/auth/register", data = "<registration>", format = "json")]
pub async fn register(registration: Json<Registration>, users: Coll<NewUser>) -> Result<Status> {
    let user = NewUser::try_from(registration.0)?;

    match users.insert_one(&user, None).await {
        Ok(_) => {
            info!("Registered {} as {}, awaiting activation", user.email, user.role);
            Ok(Status::Created)
        }
        Err(e) if is_duplicate_key_error(&e) => Err(Error::Status(
            Status::Conflict,
            format!("An account already exists for {}", user.email),
        )),
        Err(e) => Err(e.into()),
    }
}

#[post("/auth/login", data = "<credentials>", format = "json")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<Credentials>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<Json<UserDescription>> {
    let with_email = doc! {
        "email": normalise_email(&credentials.email),
    };

    let user = users
        .find_one(with_email, None)
        .await?
        .filter(|user| user.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Status(
                Status::Unauthorized,
                "No account found with the provided email and password combination.".to_string(),
            )
        })?;

    // Deactivated users may still log in; the request guards turn them away.
    cookies.add(AuthToken::<AnyUser>::new(&user).into_cookie(config));

    Ok(Json(user.into()))
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::serde_json::json};

    use super::*;
    use crate::model::common::Role;

    #[backend_test]
    async fn register_then_login(client: Client, users: Coll<User>) {
        let response = client
            .post(uri!(register))
            .header(ContentType::JSON)
            .body(json!(Registration::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());

        let user = users
            .find_one(doc! { "email": "margaret@alumni.example" }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Role::Alumni);
        assert!(!user.activated);

        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!({"email": "MARGARET@alumni.example", "password": "apollo guidance"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let description: UserDescription = response.into_json().await.unwrap();
        assert!(!description.activated);
    }

    #[backend_test]
    async fn duplicate_registration(client: Client) {
        for expected in [Status::Created, Status::Conflict] {
            let response = client
                .post(uri!(register))
                .header(ContentType::JSON)
                .body(json!(Registration::example()).to_string())
                .dispatch()
                .await;
            assert_eq!(expected, response.status());
        }
    }

    #[backend_test]
    async fn cannot_register_admin(client: Client) {
        let mut registration = Registration::example();
        registration.role = Role::Admin;
        let response = client
            .post(uri!(register))
            .header(ContentType::JSON)
            .body(json!(registration).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
    }

    #[backend_test]
    async fn login_invalid(client: Client, users: Coll<NewUser>) {
        users.insert_one(NewUser::example_member(), None).await.unwrap();

        let mut credentials = Credentials::example_member();
        credentials.password = "not my password".to_string();
        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(credentials).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test(admin)]
    async fn logout_admin(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn logout_not_logged_in(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
    }
}
