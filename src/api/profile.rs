use rocket::{serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{AnyUser, AuthToken},
            user::{ProfileUpdate, UserDescription},
        },
        db::user::User,
        mongodb::Coll,
    },
};

pub fn routes() -> Vec<Route> {
    routes![get_profile, update_profile]
}

async fn current_user(token: &AuthToken<AnyUser>, users: &Coll<User>) -> Result<User> {
    users
        .find_one(token.id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("User {}", token.id)))
}

#[get("/profile")]
async fn get_profile(token: AuthToken<AnyUser>, users: Coll<User>) -> Result<Json<UserDescription>> {
    Ok(Json(current_user(&token, &users).await?.into()))
}

#[put("/profile", data = "<update>", format = "json")]
async fn update_profile(
    token: AuthToken<AnyUser>,
    update: Json<ProfileUpdate>,
    users: Coll<User>,
) -> Result<Json<UserDescription>> {
    let mut user = current_user(&token, &users).await?;
    if !update.0.apply_to(&mut user) {
        return Err(Error::bad_request("Name must not be empty"));
    }
    users.replace_one(user.id.as_doc(), &user, None).await?;
    Ok(Json(user.into()))
}
