use std::env;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::info;

use lldpmap::config_loader::load_oid_config;
use lldpmap::graph::render_dot;
use lldpmap::transport::{Snmp2cConnector, SnmpSettings, SnmpVersion};
use lldpmap::{CrawlMode, CrawlOptions, CrawlReport, Crawler, OidConfig};

/// Discover network topology through SNMP/LLDP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// SNMP community (default: $SNMPCOMMUNITY or "public")
    #[arg(short, long)]
    community: Option<String>,

    /// SNMP protocol version
    #[arg(long, default_value_t = 2)]
    snmp_version: u8,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    timeout_secs: u64,

    /// JSON or YAML file with identifier mappings
    /// (default: $OIDFILE or built-in MIB-II/LLDP-MIB identifiers)
    #[arg(short, long)]
    oid_file: Option<PathBuf>,

    /// Populate nodes with device information
    #[arg(short, long)]
    info: bool,

    /// Populate nodes with interface:neighbour mappings
    #[arg(short = 'p', long)]
    interfaces: bool,

    /// Reduce advertised neighbour names to their short host part
    #[arg(long)]
    strip_domain: bool,

    /// Keep unresolved identifiers as placeholder values
    #[arg(long)]
    keep_unresolved: bool,

    /// Log file (default is logging to STDERR)
    #[arg(short, long)]
    logfile: Option<PathBuf>,

    /// Do not display or log errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the flat list of discovered devices
    List {
        /// Hostname or IP address to start from
        host: String,
    },
    /// Print the nested topology tree
    Tree {
        /// Hostname or IP address to start from
        host: String,
    },
    /// Print a GraphViz DOT rendering of the topology
    Graph {
        /// Hostname or IP address to start from
        host: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    init_logging(args.quiet, args.logfile.as_deref())?;

    let oids = Arc::new(load_config(args.oid_file.clone())?);
    let connector = Snmp2cConnector::new(snmp_settings(&args)?);
    let options = CrawlOptions {
        include_info: args.info,
        include_interfaces: args.interfaces,
        strip_domain: args.strip_domain,
        keep_unresolved: args.keep_unresolved,
    };
    let crawler = Crawler::new(connector, oids, options);

    match args.command {
        Command::List { host } => {
            info!("Crawling topology from {}", host);
            let report = crawler.crawl(&host, CrawlMode::Flat);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Tree { host } => {
            info!("Crawling topology from {}", host);
            let report = crawler.crawl(&host, CrawlMode::Tree);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Graph { host } => {
            info!("Crawling topology from {}", host);
            let CrawlReport::Tree(root) = crawler.crawl(&host, CrawlMode::Tree) else {
                bail!("tree crawl produced a non-tree report");
            };
            println!("{}", render_dot(&root));
        }
    }

    Ok(())
}

fn init_logging(quiet: bool, logfile: Option<&std::path::Path>) -> Result<()> {
    let default_filter = if quiet { "off" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter));
    if let Some(path) = logfile {
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to open log file '{}'", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn load_config(oid_file: Option<PathBuf>) -> Result<OidConfig> {
    let path = oid_file.or_else(|| env::var_os("OIDFILE").map(PathBuf::from));
    match path {
        Some(path) => load_oid_config(&path),
        None => Ok(OidConfig::default()),
    }
}

fn snmp_settings(args: &Args) -> Result<SnmpSettings> {
    let version = match args.snmp_version {
        1 => SnmpVersion::V1,
        2 => SnmpVersion::V2c,
        other => bail!("unsupported SNMP version {}", other),
    };
    let community = args
        .community
        .clone()
        .or_else(|| env::var("SNMPCOMMUNITY").ok())
        .unwrap_or_else(|| "public".to_string());
    Ok(SnmpSettings {
        community,
        version,
        timeout: Duration::from_secs(args.timeout_secs),
        port: 161,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["lldpmap", "tree", "core01"]);

        assert!(matches!(args.command, Command::Tree { ref host } if host == "core01"));
        assert_eq!(args.snmp_version, 2);
        assert_eq!(args.timeout_secs, 5);
        assert!(!args.info);
    }

    #[test]
    fn test_cli_flags() {
        let args = Args::parse_from([
            "lldpmap",
            "--info",
            "-p",
            "--strip-domain",
            "-c",
            "internal",
            "list",
            "core01",
        ]);

        assert!(args.info);
        assert!(args.interfaces);
        assert!(args.strip_domain);
        assert_eq!(args.community.as_deref(), Some("internal"));
        assert!(matches!(args.command, Command::List { .. }));
    }

    #[test]
    fn test_snmp_settings_rejects_unknown_version() {
        let mut args = Args::parse_from(["lldpmap", "list", "core01"]);
        args.snmp_version = 3;
        assert!(snmp_settings(&args).is_err());
    }
}
