mod schema;
mod storage;

pub use storage::SqliteStorage;
