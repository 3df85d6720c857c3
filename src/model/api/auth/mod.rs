mod credentials;
mod scope;
mod token;

pub use credentials::{Credentials, Registration, MIN_PASSWORD_LENGTH};
pub use scope::{AdminOnly, AnyUser, Poster, Scope};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
