use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{AdminOnly, AuthToken},
            pagination::{Paginated, PaginationRequest},
            user::UserDescription,
        },
        db::user::User,
        mongodb::{Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![list_users, activate_user, deactivate_user, delete_user]
}

#[get("/admin/users?<pagination..>")]
async fn list_users(
    _token: AuthToken<AdminOnly>,
    pagination: PaginationRequest,
    users: Coll<User>,
) -> Result<Json<Paginated<UserDescription>>> {
    // Accounts awaiting activation first, then alphabetical.
    let options = FindOptions::builder()
        .sort(doc! { "activated": 1, "email": 1 })
        .skip(pagination.skip())
        .limit(i64::from(pagination.page_size()))
        .build();

    let page = users
        .find(None, options)
        .await?
        .map_ok(UserDescription::from)
        .try_collect::<Vec<_>>()
        .await?;
    let total = users.count_documents(None, None).await?;

    Ok(Json(pagination.to_paginated(total, page)))
}

async fn set_activated(users: &Coll<User>, user_id: Id, activated: bool) -> Result<UserDescription> {
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let user = users
        .find_one_and_update(
            user_id.as_doc(),
            doc! { "$set": { "activated": activated } },
            options,
        )
        .await?
        .ok_or_else(|| Error::not_found(format!("User {user_id}")))?;

    info!(
        "{} account {} ({})",
        if activated { "Activated" } else { "Deactivated" },
        user.email,
        user.role
    );
    Ok(user.into())
}

#[post("/admin/users/<user_id>/activate")]
async fn activate_user(
    _token: AuthToken<AdminOnly>,
    user_id: Id,
    users: Coll<User>,
) -> Result<Json<UserDescription>> {
    Ok(Json(set_activated(&users, user_id, true).await?))
}

#[post("/admin/users/<user_id>/deactivate")]
async fn deactivate_user(
    token: AuthToken<AdminOnly>,
    user_id: Id,
    users: Coll<User>,
) -> Result<Json<UserDescription>> {
    if token.id == user_id {
        return Err(Error::Status(
            Status::UnprocessableEntity,
            "Cannot deactivate your own account".to_string(),
        ));
    }
    Ok(Json(set_activated(&users, user_id, false).await?))
}

#[delete("/admin/users/<user_id>")]
async fn delete_user(token: AuthToken<AdminOnly>, user_id: Id, users: Coll<User>) -> Result<()> {
    // The caller is an admin, so refusing self-deletion also keeps the last admin.
    if token.id == user_id {
        return Err(Error::Status(
            Status::UnprocessableEntity,
            "Cannot delete your own account".to_string(),
        ));
    }

    let user = users
        .find_one_and_delete(user_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("User {user_id}")))?;
    info!("Deleted account {} ({})", user.email, user.role);
    Ok(())
}

#[cfg(test)]
mod tests {
    use rocket::local::asynchronous::Client;

    use super::*;
    use crate::model::db::user::NewUser;

    async fn insert(users: &Coll<NewUser>, user: NewUser) -> Id {
        users
            .insert_one(user, None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into()
    }

    async fn admin_id(users: &Coll<User>) -> Id {
        let email = NewUser::example_admin().email;
        users
            .find_one(doc! { "email": email }, None)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[backend_test(admin)]
    async fn list_pending_first(client: Client, new_users: Coll<NewUser>) {
        insert(&new_users, NewUser::example_member()).await;
        insert(&new_users, NewUser::example_inactive_sponsor()).await;

        let response = client.get("/admin/users?page_size=2").dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let page: rocket::serde::json::Value = response.into_json().await.unwrap();
        assert_eq!(page["pagination"]["total"], 3);
        assert_eq!(page["items"].as_array().unwrap().len(), 2);
        assert_eq!(page["items"][0]["email"], "hr@sponsor.example");
        assert_eq!(page["items"][0]["activated"], false);
    }

    #[backend_test(admin)]
    async fn activate_and_deactivate(client: Client, new_users: Coll<NewUser>, users: Coll<User>) {
        let id = insert(&new_users, NewUser::example_inactive_sponsor()).await;

        let response = client.post(uri!(activate_user(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(users.find_one(id.as_doc(), None).await.unwrap().unwrap().activated);

        let response = client.post(uri!(deactivate_user(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(!users.find_one(id.as_doc(), None).await.unwrap().unwrap().activated);

        let response = client.post(uri!(activate_user(Id::new()))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn cannot_remove_self(client: Client, users: Coll<User>) {
        let me = admin_id(&users).await;

        let response = client.delete(uri!(delete_user(me))).dispatch().await;
        assert_eq!(Status::UnprocessableEntity, response.status());
        let response = client.post(uri!(deactivate_user(me))).dispatch().await;
        assert_eq!(Status::UnprocessableEntity, response.status());
    }

    #[backend_test(admin)]
    async fn delete_accounts(client: Client, new_users: Coll<NewUser>, users: Coll<User>) {
        let member = insert(&new_users, NewUser::example_member()).await;
        let response = client.delete(uri!(delete_user(member))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(users.find_one(member.as_doc(), None).await.unwrap().is_none());

        // A second admin can be deleted while this one remains.
        let mut other_admin = NewUser::example_admin();
        other_admin.email = "second@compsoc.example".to_string();
        let other_admin = insert(&new_users, other_admin).await;
        let response = client.delete(uri!(delete_user(other_admin))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test(poster)]
    async fn posters_are_not_admins(client: Client) {
        let response = client.get("/admin/users").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }
}
