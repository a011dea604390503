//! Browser storage adapters.

pub mod pouch_db;
