pub mod base;
pub mod todos;
pub mod users;
