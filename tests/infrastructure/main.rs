#[path = "../common/mod.rs"]
#[macro_use]
pub mod common;

mod postgres_app;
mod postgres_repository;
