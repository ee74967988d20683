//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use knob::kernel::PropertyEnum;
use knob_logger::LogLevel;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "knob")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect endpoint options and try endpoint URIs")]
pub struct Cli {
    /// Minimum level of log events written to stderr
    #[arg(long, global = true, default_value = "warn", value_parser = parse_level)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: AppCommands,
}

#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// List the options accepted by an endpoint scheme
    Options {
        /// Endpoint scheme (e.g. 'dns', 'openstack-glance')
        scheme: String,

        /// Print the options as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure an endpoint from its URI and print the resulting option values
    Configure {
        /// Endpoint URI (e.g. 'dns:lookup?lazyStartProducer=true')
        uri: String,

        /// Report unknown options instead of failing on them
        #[arg(long)]
        lenient: bool,
    },
    /// Bind the REST DSL configuration from a properties file
    Rest {
        /// Properties file (TOML, JSON or YAML)
        file: PathBuf,

        /// Prefix of the REST properties
        #[arg(long, default_value = knob::features::rest::PROPERTIES_PREFIX)]
        prefix: String,

        /// Report unknown options instead of failing on them
        #[arg(long)]
        lenient: bool,
    },
}

fn parse_level(text: &str) -> Result<LogLevel, String> {
    LogLevel::from_constant(&text.to_ascii_lowercase()).ok_or_else(|| {
        let expected = LogLevel::TYPE.constants.join(", ");
        format!("unknown level '{text}', expected one of: {expected}")
    })
}
