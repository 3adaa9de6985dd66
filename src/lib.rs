pub mod apis;
pub mod bot_service;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod session_store;
pub mod types;
pub mod utils;
