pub mod message_builder;
pub mod resolv_conf;
pub mod resolver;
pub mod response_parser;
pub mod transport;

pub use resolver::WireProber;
