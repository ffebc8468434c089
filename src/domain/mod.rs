pub mod auth;
pub mod base;
pub mod filter;
pub mod mailer;
pub mod password;
pub mod todos;
pub mod users;
