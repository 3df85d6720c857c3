use crate::model::common::Role;

/// Which roles an endpoint admits.
pub trait Scope: Send + Sync + 'static {
    fn permits(role: Role) -> bool;
}

/// Any activated account.
pub struct AnyUser;

/// Accounts that may advertise jobs.
pub struct Poster;

/// Administrators only.
pub struct AdminOnly;

impl Scope for AnyUser {
    fn permits(_role: Role) -> bool {
        true
    }
}

impl Scope for Poster {
    fn permits(role: Role) -> bool {
        role.can_post_jobs()
    }
}

impl Scope for AdminOnly {
    fn permits(role: Role) -> bool {
        role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_admit_roles() {
        let all = [Role::Member, Role::Alumni, Role::Sponsor, Role::Admin];
        let admitted = |permits: fn(Role) -> bool| -> Vec<Role> {
            all.iter().copied().filter(|role| permits(*role)).collect()
        };

        assert_eq!(admitted(AnyUser::permits), all);
        assert_eq!(
            admitted(Poster::permits),
            [Role::Alumni, Role::Sponsor, Role::Admin]
        );
        assert_eq!(admitted(AdminOnly::permits), [Role::Admin]);
    }
}
