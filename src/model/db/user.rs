use std::ops::{Deref, DerefMut};

use argon2::Config as Argon2Config;
use mongodb::bson::doc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    common::{Profile, Role},
    mongodb::{Coll, Id},
};

/// Core user data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCore {
    /// Login name; unique across all users.
    pub email: String,
    /// Display name.
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    /// Accounts cannot do anything until an admin activates them.
    pub activated: bool,
    #[serde(flatten)]
    pub profile: Profile,
}

impl UserCore {
    /// Create a user with a freshly hashed password and an empty profile.
    pub fn new(email: &str, name: String, password: &str, role: Role, activated: bool) -> Self {
        Self {
            email: normalise_email(email),
            name,
            password_hash: hash_password(password),
            role,
            activated,
            profile: Profile::default(),
        }
    }

    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

/// A user without an ID.
pub type NewUser = UserCore;

/// A user from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub user: UserCore,
}

impl Deref for User {
    type Target = UserCore;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.user
    }
}

/// Emails are compared case-insensitively.
pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password with a random salt.
pub fn hash_password(password: &str) -> String {
    // 16 bytes is recommended for password hashing:
    //  https://en.wikipedia.org/wiki/Argon2
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill(&mut salt);
    argon2::hash_encoded(password.as_bytes(), &salt, &Argon2Config::default())
        .expect("the default argon2 config is valid")
}

/// If there are no admins at all, create one from the bootstrap credentials
/// so that somebody can log in and activate accounts.
pub async fn ensure_admin_exists(users: &Coll<NewUser>, email: &str, password: &str) -> Result<()> {
    let admin_filter = doc! { "role": Role::Admin.to_string() };
    if users.count_documents(admin_filter, None).await? > 0 {
        return Ok(());
    }

    warn!("No admin account found, creating bootstrap admin {email}");
    let admin = NewUser::new(email, "Administrator".to_string(), password, Role::Admin, true);
    users.insert_one(admin, None).await?;
    Ok(())
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    pub const EXAMPLE_PASSWORD: &str = "correct horse battery";

    impl UserCore {
        pub fn example_admin() -> Self {
            Self::new(
                "admin@compsoc.example",
                "Ada".to_string(),
                EXAMPLE_PASSWORD,
                Role::Admin,
                true,
            )
        }

        pub fn example_alumni() -> Self {
            let mut user = Self::new(
                "grace@alumni.example",
                "Grace".to_string(),
                EXAMPLE_PASSWORD,
                Role::Alumni,
                true,
            );
            user.profile.company = Some("Hopper Systems".to_string());
            user.profile.graduation_year = Some(2019);
            user
        }

        pub fn example_member() -> Self {
            Self::new(
                "linus@student.example",
                "Linus".to_string(),
                EXAMPLE_PASSWORD,
                Role::Member,
                true,
            )
        }

        pub fn example_inactive_sponsor() -> Self {
            Self::new(
                "hr@sponsor.example",
                "Sponsor HR".to_string(),
                EXAMPLE_PASSWORD,
                Role::Sponsor,
                false,
            )
        }
    }
}

#[cfg(test)]
pub use examples::EXAMPLE_PASSWORD;
