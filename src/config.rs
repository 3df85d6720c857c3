use chrono::Duration;
use mongodb::{Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::form_host::{FormHostConfig, TallyFormHost};
use crate::model::{
    db::user::ensure_admin_exists,
    mongodb::{ensure_indexes_exist, Coll},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        Ok(rocket.manage(config))
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // non-secrets
    #[serde(default = "default_db_name")]
    db_name: String,
    bootstrap_admin_email: String,
    // secrets
    db_uri: String,
    bootstrap_admin_password: String,
}

fn default_db_name() -> String {
    "jobboard".to_string()
}

/// A fairing that connects to MongoDB, ensures indexes and an admin account
/// exist, and places both a `Client` and a `Database` into managed state.
#[derive(Default)]
pub struct DatabaseFairing {
    /// Use this client and database instead of connecting to `db_uri`.
    preconnected: Option<(MongoClient, String)>,
}

impl DatabaseFairing {
    pub fn preconnected(client: MongoClient, db_name: &str) -> Self {
        Self {
            preconnected: Some((client, db_name.to_string())),
        }
    }
}

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let (client, db_name) = match &self.preconnected {
            Some((client, db_name)) => (client.clone(), db_name.clone()),
            None => {
                info!("Loaded database config, connecting...");
                match MongoClient::with_uri_str(&config.db_uri).await {
                    Ok(client) => (client, config.db_name.clone()),
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                }
            }
        };
        let db = client.database(&db_name);

        if let Err(e) = prepare_database(&db, &config).await {
            error!("Failed to prepare database {db_name}: {e}");
            return Err(rocket);
        }
        info!("...database {db_name} online!");

        Ok(rocket.manage(client).manage(db))
    }
}

async fn prepare_database(db: &Database, config: &DbConfig) -> crate::error::Result<()> {
    ensure_indexes_exist(db).await?;
    ensure_admin_exists(
        &Coll::from_db(db),
        &config.bootstrap_admin_email,
        &config.bootstrap_admin_password,
    )
    .await
}

/// A fairing that loads the form host config and places a [`TallyFormHost`]
/// into managed state.
pub struct FormHostFairing;

#[rocket::async_trait]
impl Fairing for FormHostFairing {
    fn info(&self) -> Info {
        Info {
            name: "Form host",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<FormHostConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load form host config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let url = config.form_host_url.clone();
        let host = match TallyFormHost::new(config) {
            Ok(host) => host,
            Err(e) => {
                error!("Failed to build form host client: {e}");
                return Err(rocket);
            }
        };
        info!("Forms will be hosted by {url}");

        Ok(rocket.manage(host))
    }
}
