#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod form_host;
pub mod logging;
pub mod model;
pub mod workflow;

pub use config::Config;

use config::{ConfigFairing, DatabaseFairing, FormHostFairing};
use logging::LoggerFairing;

/// Assemble the server from `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    mount(rocket::build()).attach(DatabaseFairing::default())
}

fn mount(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(FormHostFairing)
}

/// Connect to the database named by `db_uri`.
#[cfg(test)]
async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` must be set to run database tests");
    mongodb::Client::with_uri_str(&db_uri).await.unwrap()
}

/// A fresh database name, so that tests cannot see each other's data.
#[cfg(test)]
fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// A server using the given database. The bootstrap admin is the example
/// admin, and the form host is unreachable.
#[cfg(test)]
async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    use crate::model::db::user::{NewUser, EXAMPLE_PASSWORD};
    use rocket::figment::providers::Serialized;

    // Global, so these win over the `[debug]` profile in `Rocket.toml`.
    let figment = rocket::Config::figment()
        .merge(Serialized::global("bootstrap_admin_email", NewUser::example_admin().email))
        .merge(Serialized::global("bootstrap_admin_password", EXAMPLE_PASSWORD))
        .merge(Serialized::global("form_host_url", "http://127.0.0.1:9"))
        .merge(Serialized::global("form_host_timeout", 2));
    mount(rocket::custom(figment)).attach(DatabaseFairing::preconnected(client, db_name))
}
