//! Batch device-information poller.
//!
//! Reads an independent list of hostnames from a file or stdin (a JSON
//! array, or failing that whitespace-separated names), polls them all on a
//! bounded worker pool, and prints one info record per host as a JSON
//! array in input order. Hosts that cannot be resolved or do not answer
//! still appear, as records carrying only their name.

use std::env;
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{debug, info};

use lldpmap::config_loader::load_oid_config;
use lldpmap::transport::{Snmp2cConnector, SnmpSettings, SnmpVersion};
use lldpmap::{poll_hosts, DeviceRecord, OidConfig, PollOptions};

/// Collect device information for a list of hosts over SNMP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to read the device list from (defaults to reading from stdin)
    #[arg(short = 'f', long)]
    input_file: Option<PathBuf>,

    /// Worker pool size
    #[arg(short, long, default_value_t = 8)]
    workers: usize,

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

    /// Query by short hostname, keeping full names in the output
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

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    init_logging(&args)?;

    let input = read_input(args.input_file.as_deref())?;
    let hosts = parse_hosts(&input);
    if hosts.is_empty() {
        bail!("no hostnames in input");
    }
    debug!("Read {} hostnames", hosts.len());

    let oids = Arc::new(load_config(args.oid_file.clone())?);
    let connector = Snmp2cConnector::new(snmp_settings(&args)?);
    let options = PollOptions {
        workers: args.workers,
        keep_unresolved: args.keep_unresolved,
        strip_domain: args.strip_domain,
    };

    let records = poll_hosts(&connector, &oids, &hosts, &options)?;
    info!("Polled {} hosts", records.len());

    // Input order, not map order.
    let ordered: Vec<&DeviceRecord> = hosts.iter().filter_map(|host| records.get(host)).collect();
    println!("{}", serde_json::to_string_pretty(&ordered)?);

    Ok(())
}

fn read_input(input_file: Option<&std::path::Path>) -> Result<String> {
    match input_file {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Could not read from file {}", path.display())),
        None => {
            if io::stdin().is_terminal() {
                eprintln!("Reading list of devices from STDIN. Press ^D when done, or ^C to quit.");
            }
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// A JSON array of names when the input parses as one, otherwise
/// whitespace-separated tokens.
fn parse_hosts(input: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(input) {
        Ok(hosts) => hosts,
        Err(_) => input.split_whitespace().map(str::to_string).collect(),
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let default_filter = if args.quiet { "off" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter));
    if let Some(path) = &args.logfile {
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
    fn test_parse_hosts_json_array() {
        let hosts = parse_hosts(r#"["sw1", "sw2.example.com"]"#);
        assert_eq!(hosts, vec!["sw1", "sw2.example.com"]);
    }

    #[test]
    fn test_parse_hosts_whitespace_fallback() {
        let hosts = parse_hosts("sw1 sw2\nsw3\t sw4");
        assert_eq!(hosts, vec!["sw1", "sw2", "sw3", "sw4"]);
    }

    #[test]
    fn test_parse_hosts_empty() {
        assert!(parse_hosts("").is_empty());
        assert!(parse_hosts("   \n").is_empty());
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["lldp-inventory"]);
        assert_eq!(args.workers, 8);
        assert!(args.input_file.is_none());
        assert!(!args.strip_domain);
    }
}
