pub mod backend;
pub mod database;
pub mod format;
pub mod live;
pub mod manager;
pub mod store;
