use clap::Parser;
use dane_policyd_application::use_cases::{
    CheckDnssecUseCase, EvaluateDaneUseCase, HandlePolicyRequestUseCase,
};
use dane_policyd_application::ports::DnsProber;
use dane_policyd_domain::CliOverrides;
use dane_policyd_infrastructure::dns::{resolv_conf, WireProber};
use dane_policyd_infrastructure::server::PolicyServer;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod bootstrap;
mod notify;
mod shutdown;

#[derive(Parser)]
#[command(name = "dane-policyd")]
#[command(version = "0.1.0")]
#[command(about = "DANE policy daemon - per-domain TLS policy for MTAs")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Listen port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Comma-separated validating nameservers (ip or ip:port)
    #[arg(short = 'n', long)]
    nameservers: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        host: cli.host.clone(),
        port: cli.port,
        nameservers: cli.nameservers.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting dane-policyd v{}", env!("CARGO_PKG_VERSION"));

    let nameservers = if config.resolver.nameservers.is_empty() {
        resolv_conf::system_nameservers()
    } else {
        resolv_conf::parse_nameservers(&config.resolver.nameservers)?
    };
    info!(nameservers = ?nameservers, "Using validating nameservers");

    let prober: Arc<dyn DnsProber> = Arc::new(WireProber::new(nameservers));

    // A non-validating upstream would turn every answer into
    // "unauthenticated" and the daemon would deny DANE for everyone.
    // Refuse to start instead.
    let dnssec_check = CheckDnssecUseCase::new(prober.clone(), config.resolver.probe_timeout());
    if !dnssec_check.execute().await {
        anyhow::bail!(
            "Configured nameservers do not return DNSSEC-validated answers; \
             refusing to start"
        );
    }
    info!("DNSSEC validation confirmed");

    let evaluate = Arc::new(EvaluateDaneUseCase::new(
        prober.clone(),
        config.resolver.query_timeout(),
    ));
    let handler = Arc::new(HandlePolicyRequestUseCase::new(evaluate));

    let bind_addr = resolve_bind_addr(&config.server.host, config.server.port)?;

    let shutdown = CancellationToken::new();
    shutdown::spawn_signal_listener(shutdown.clone());

    let server = PolicyServer::bind(bind_addr, handler, shutdown)?;
    info!(bind_address = %server.local_addr()?, "dane-policyd ready");
    notify::ready();

    server.serve().await?;

    notify::stopping();
    info!("Server shutdown complete");
    Ok(())
}

fn resolve_bind_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow::anyhow!("Listen address '{}:{}' did not resolve", host, port))
}
