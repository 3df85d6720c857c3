use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{
    common::{Profile, Role},
    db::user::NewUser,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Login details, received from a user. Never stored, since the password is
/// in plaintext.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A request to open an account.
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    #[serde(flatten)]
    pub profile: Profile,
}

impl TryFrom<Registration> for NewUser {
    type Error = Error;

    /// New accounts start deactivated, and nobody can register themselves as
    /// an admin.
    fn try_from(registration: Registration) -> Result<Self, Self::Error> {
        if registration.role == Role::Admin {
            return Err(Error::bad_request("Cannot register as an admin"));
        }
        if registration.email.trim().is_empty() || registration.name.trim().is_empty() {
            return Err(Error::bad_request("Email and name must not be empty"));
        }
        if registration.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let mut user = NewUser::new(
            &registration.email,
            registration.name.trim().to_string(),
            &registration.password,
            registration.role,
            false,
        );
        user.profile = registration.profile;
        Ok(user)
    }
}

#[cfg(test)]
mod examples {
    use super::*;
    use crate::model::db::user::EXAMPLE_PASSWORD;

    impl Credentials {
        pub fn example_admin() -> Self {
            Self {
                email: NewUser::example_admin().email,
                password: EXAMPLE_PASSWORD.to_string(),
            }
        }

        pub fn example_alumni() -> Self {
            Self {
                email: NewUser::example_alumni().email,
                password: EXAMPLE_PASSWORD.to_string(),
            }
        }

        pub fn example_member() -> Self {
            Self {
                email: NewUser::example_member().email,
                password: EXAMPLE_PASSWORD.to_string(),
            }
        }
    }

    impl Registration {
        pub fn example() -> Self {
            Self {
                email: "Margaret@Alumni.Example".to_string(),
                name: "Margaret".to_string(),
                password: "apollo guidance".to_string(),
                role: Role::Alumni,
                profile: Profile {
                    company: Some("Hamilton Software".to_string()),
                    ..Profile::default()
                },
            }
        }
    }
}
