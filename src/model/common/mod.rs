//! Types shared between the database and API representations.

mod hosted_form;
mod profile;
mod role;

pub use hosted_form::HostedForm;
pub use profile::Profile;
pub use role::Role;
