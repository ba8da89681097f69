// Database service module
// SQLite connection and schema for the persisted countdown slot

mod connection;
mod schema;

pub use connection::Database;
