pub mod db_utils;
pub mod models;
pub mod postgres;
pub mod store;

#[cfg(test)]
pub mod memory;
