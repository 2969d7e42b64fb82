use clap::{Arg, Command};
use hostsnap_core::{
    config::CliConfig, reporter_for, Config, OutputFormat, Reporter, Scheduler, SnapshotAssembler,
    SysinfoHost, SystemCommandRunner, SAMPLE_INTERVAL,
};
use std::{io::stdout, path::PathBuf, process, sync::Arc};
use tracing::{info, warn};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostsnap=info,hostsnap_core=info".into()),
        )
        .init();

    // Parse command line arguments
    let matches = Command::new("hostsnap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Samples CPU, memory, disk, network and uptime every two seconds")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Report format")
                .value_parser(["text", "json"]),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_name("MS")
                .help("Timeout for each external command in milliseconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("ticks")
                .long("ticks")
                .value_name("N")
                .help("Stop after N samples")
                .value_parser(clap::value_parser!(u64))
                .conflicts_with("once"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Take a single sample and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let cli_config = CliConfig {
        command_timeout_ms: matches.get_one::<u64>("timeout-ms").copied(),
        format: matches.get_one::<String>("format").map(|f| match f.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }),
        max_ticks: if matches.get_flag("once") {
            Some(1)
        } else {
            matches.get_one::<u64>("ticks").copied()
        },
    };

    let config_path = matches.get_one::<PathBuf>("config");
    let config = Config::load(Some(&cli_config), config_path.map(PathBuf::as_path))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        timeout_ms = config.command_timeout_ms,
        format = ?config.format,
        "Starting hostsnap"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(sample(config))
}

async fn sample(config: Config) -> anyhow::Result<()> {
    let runner = Arc::new(SystemCommandRunner::new(config.command_timeout()));
    let assembler = Arc::new(SnapshotAssembler::new(runner, Arc::new(SysinfoHost::new())));
    let reporter: Arc<dyn Reporter> = Arc::from(reporter_for(config.format, stdout()));

    let scheduler =
        Scheduler::new(assembler, reporter, SAMPLE_INTERVAL).with_max_ticks(config.max_ticks);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let stats = scheduler.run(shutdown).await;
    info!(
        completed = stats.completed,
        failed = stats.failed,
        skipped = stats.skipped,
        "Stopped"
    );

    if stats.completed == 0 && stats.failed > 0 {
        anyhow::bail!("no sample succeeded");
    }
    Ok(())
}
