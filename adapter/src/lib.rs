pub mod cleanup;
pub mod database;
pub mod repository;
