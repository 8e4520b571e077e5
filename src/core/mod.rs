pub mod attachment;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod gateway;
pub mod message;
pub mod session;
