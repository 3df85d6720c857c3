mod bson;
mod collection;
mod errors;
mod job_store;

pub use bson::Id;
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use errors::is_duplicate_key_error;
pub use job_store::MongoJobStore;
