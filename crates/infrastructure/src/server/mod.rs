pub mod connection;
pub mod listener;

pub use listener::PolicyServer;
