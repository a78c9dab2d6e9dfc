//! DANE Policy Daemon Infrastructure Layer
pub mod dns;
pub mod server;
