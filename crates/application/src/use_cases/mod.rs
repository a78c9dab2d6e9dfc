mod check_dnssec;
mod evaluate_dane;
mod handle_policy_request;

pub use check_dnssec::CheckDnssecUseCase;
pub use evaluate_dane::EvaluateDaneUseCase;
pub use handle_policy_request::HandlePolicyRequestUseCase;
