use serde::{Deserialize, Serialize};

use crate::model::{
    common::{Profile, Role},
    db::user::User,
};

use super::id::ApiId;

/// A user as shown to themselves and to admins. Never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDescription {
    pub id: ApiId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub activated: bool,
    #[serde(flatten)]
    pub profile: Profile,
}

impl From<User> for UserDescription {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into(),
            email: user.user.email,
            name: user.user.name,
            role: user.user.role,
            activated: user.user.activated,
            profile: user.user.profile,
        }
    }
}

/// New profile details. The profile is replaced wholesale; the name only if given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

impl ProfileUpdate {
    /// Apply this update, returning whether the name was acceptable.
    pub fn apply_to(self, user: &mut User) -> bool {
        if let Some(name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                return false;
            }
            user.name = name.to_string();
        }
        user.profile = self.profile;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{db::user::NewUser, mongodb::Id};

    #[test]
    fn description_hides_hash() {
        let user = User {
            id: Id::new(),
            user: NewUser::example_alumni(),
        };
        let json = serde_json::to_value(UserDescription::from(user.clone())).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["id"], user.id.to_hex());
        assert_eq!(json["role"], "alumni");
        assert_eq!(json["company"], "Hopper Systems");
    }

    #[test]
    fn profile_update() {
        let mut user = User {
            id: Id::new(),
            user: NewUser::example_alumni(),
        };

        let update = ProfileUpdate {
            name: None,
            profile: Profile {
                bio: Some("Compilers".to_string()),
                ..Profile::default()
            },
        };
        assert!(update.apply_to(&mut user));
        assert_eq!(user.name, "Grace");
        assert_eq!(user.profile.bio.as_deref(), Some("Compilers"));
        assert_eq!(user.profile.company, None);

        let blank = ProfileUpdate {
            name: Some(" ".to_string()),
            profile: Profile::default(),
        };
        assert!(!blank.apply_to(&mut user));
        assert_eq!(user.name, "Grace");
    }
}
