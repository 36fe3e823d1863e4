use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use colored::Colorize;
use std::process;

use moros::{
    config::ScanConfig,
    discovery::ArpDiscovery,
    output::{self, OutputFormat},
    scanner::ScanEngine,
    vuln::NvdClient,
};

fn build_cli() -> Command {
    Command::new("moros")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Network reconnaissance and vulnerability-correlation scanner")
        .arg(
            Arg::new("target")
                .help("Target IP address or CIDR range (e.g. 192.168.1.0/24)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("ports")
                .short('p')
                .long("ports")
                .value_parser(clap::value_parser!(u16).range(1..))
                .help("Upper port bound; ports 1..=N are scanned [default: 1024]"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_parser(clap::value_parser!(usize))
                .help("Worker-pool size for port scanning [default: 100]"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_parser(clap::value_parser!(u64))
                .help("Per-connection timeout in milliseconds [default: 500]"),
        )
        .arg(
            Arg::new("discovery-timeout")
                .long("discovery-timeout")
                .value_parser(clap::value_parser!(u64))
                .help("Host discovery round timeout in milliseconds [default: 2000]"),
        )
        .arg(
            Arg::new("banner-timeout")
                .long("banner-timeout")
                .value_parser(clap::value_parser!(u64))
                .help("Banner read timeout in milliseconds [default: 2000]"),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_parser(clap::value_parser!(usize))
                .help("Maximum advisories per fingerprint lookup [default: 5]"),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .help("NVD API key (also read from MOROS_NVD_API_KEY)"),
        )
        .arg(
            Arg::new("no-vuln")
                .long("no-vuln")
                .action(ArgAction::SetTrue)
                .help("Skip vulnerability correlation entirely"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Emit the report as JSON instead of text"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Load settings from a TOML file instead of ~/.moros.toml"),
        )
}

fn config_from_matches(matches: &clap::ArgMatches) -> anyhow::Result<ScanConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ScanConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path))?,
        None => ScanConfig::load_default_config(),
    };

    if let Some(target) = matches.get_one::<String>("target") {
        config.target = target.clone();
    }
    if let Some(&limit) = matches.get_one::<u16>("ports") {
        config = config.with_port_limit(limit);
    }
    if let Some(&workers) = matches.get_one::<usize>("workers") {
        config.workers = workers;
    }
    if let Some(&timeout) = matches.get_one::<u64>("timeout") {
        config.connect_timeout = timeout;
    }
    if let Some(&timeout) = matches.get_one::<u64>("discovery-timeout") {
        config.discovery_timeout = timeout;
    }
    if let Some(&timeout) = matches.get_one::<u64>("banner-timeout") {
        config.banner_timeout = timeout;
    }
    if let Some(&limit) = matches.get_one::<usize>("limit") {
        config.vuln_limit = limit;
    }
    if matches.get_flag("no-vuln") {
        config.lookup_vulns = false;
    }

    config.nvd_api_key = matches
        .get_one::<String>("api-key")
        .cloned()
        .or_else(|| std::env::var("MOROS_NVD_API_KEY").ok())
        .or(config.nvd_api_key);

    Ok(config)
}

async fn run() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    let config = config_from_matches(&matches)?;

    let format = if matches.get_flag("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let api_key = config.nvd_api_key.clone();
    let engine = ScanEngine::new(config, ArpDiscovery::new(), NvdClient::new(api_key))?;

    let report = engine.scan().await?;
    print!("{}", output::render(&report, format)?);

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("{} {:#}", "[!] Error:".red().bold(), e);
        process::exit(1);
    }
}
