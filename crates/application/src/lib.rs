//! DANE Policy Daemon Application Layer
pub mod ports;
pub mod use_cases;

pub use use_cases::{CheckDnssecUseCase, EvaluateDaneUseCase, HandlePolicyRequestUseCase};
