pub mod command;
pub mod config;
pub mod governor;
pub mod messages;
pub mod motor;
pub mod runtime;
