use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// What kind of account a user holds.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Current society member: can browse jobs.
    Member,
    /// Former member: can browse and post jobs.
    Alumni,
    /// Sponsoring company: can browse and post jobs.
    Sponsor,
    /// Site administrator: everything, including account management.
    Admin,
}

impl Role {
    /// May this role advertise jobs?
    pub fn can_post_jobs(self) -> bool {
        !matches!(self, Self::Member)
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Member => "member",
                Self::Alumni => "alumni",
                Self::Sponsor => "sponsor",
                Self::Admin => "admin",
            }
        )
    }
}
