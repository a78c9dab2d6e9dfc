use crate::use_cases::EvaluateDaneUseCase;
use dane_policyd_domain::{PolicyRequest, PolicyResponse};
use std::sync::Arc;
use tracing::{error, info};

/// The per-line protocol state machine body.
///
/// Every inbound line maps to exactly one `PolicyResponse`; protocol
/// errors are answered, never escalated, and the connection stays open.
pub struct HandlePolicyRequestUseCase {
    evaluate: Arc<EvaluateDaneUseCase>,
}

impl HandlePolicyRequestUseCase {
    pub fn new(evaluate: Arc<EvaluateDaneUseCase>) -> Self {
        Self { evaluate }
    }

    pub async fn execute(&self, line: &str) -> PolicyResponse {
        let request = match PolicyRequest::parse(line) {
            Ok(request) => request,
            Err(_) => {
                error!(line = ?line, "Received malformed data");
                return PolicyResponse::MalformedData;
            }
        };

        if !request.is_get() {
            error!(command = %request.command, "Unknown command");
            return PolicyResponse::UnknownCommand;
        }

        if self.evaluate.execute(&request.domain).await {
            info!(domain = %request.domain, "Found TLSA record");
            PolicyResponse::DaneOnly
        } else {
            info!(domain = %request.domain, "No TLSA record found");
            PolicyResponse::NoDaneRecord
        }
    }
}
