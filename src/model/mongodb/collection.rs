use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{
    job::{Job, NewJob},
    job_form::JobForm,
    user::{NewUser, User},
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

// User collections
const USERS: &str = "users";
impl MongoCollection for User {
    const NAME: &'static str = USERS;
}
impl MongoCollection for NewUser {
    const NAME: &'static str = USERS;
}

// Job collections
const JOBS: &str = "jobs";
impl MongoCollection for Job {
    const NAME: &'static str = JOBS;
}
impl MongoCollection for NewJob {
    const NAME: &'static str = JOBS;
}

// Hosted application forms, one per job at most.
impl MongoCollection for JobForm {
    const NAME: &'static str = "job_forms";
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // User collection.
    let email_index = IndexModel::builder()
        .keys(doc! {"email": 1})
        .options(unique.clone())
        .build();
    Coll::<User>::from_db(db)
        .create_index(email_index, None)
        .await?;

    // Job collection: listings are newest first, and publishers look up their own.
    let posted_index = IndexModel::builder().keys(doc! {"posted_at": -1}).build();
    let publisher_index = IndexModel::builder().keys(doc! {"publisher": 1}).build();
    Coll::<Job>::from_db(db)
        .create_indexes([posted_index, publisher_index], None)
        .await?;

    // Job form collection.
    let job_index = IndexModel::builder()
        .keys(doc! {"job_id": 1})
        .options(unique)
        .build();
    Coll::<JobForm>::from_db(db)
        .create_index(job_index, None)
        .await?;

    Ok(())
}
