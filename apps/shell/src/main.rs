#![allow(clippy::print_stdout)]

pub mod args;

use crate::args::{AppCommands, Cli};
use anyhow::{Context, Result};
use clap::Parser;
use knob::ConfiguredEndpoint;
use knob::features::rest::{MapOptions, RestConfiguration};
use knob::kernel::{BindReport, MASK, NoReferences, OptionInfo, PropertyBinder, PropertyConfigurer};
use knob_logger::{Logger, LoggerSettings};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = Logger::from_settings(
        env!("CARGO_BIN_NAME"),
        LoggerSettings { level: cli.log_level, ..LoggerSettings::default() },
    )?;

    match cli.command {
        AppCommands::Options { scheme, json } => list_options(&scheme, json)?,
        AppCommands::Configure { uri, lenient } => configure_endpoint(&uri, lenient)?,
        AppCommands::Rest { file, prefix, lenient } => bind_rest(&file, &prefix, lenient)?,
    }

    Ok(())
}

fn binder(lenient: bool) -> PropertyBinder {
    PropertyBinder::new().fail_on_unknown(!lenient)
}

fn list_options(scheme: &str, json: bool) -> Result<()> {
    let options = knob::options(scheme)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&options).context("Failed to render options")?);
        return Ok(());
    }

    let width = options.iter().map(|o| o.name.len()).max().unwrap_or_default();
    for option in &options {
        println!("{}", option_line(option, width));
    }
    Ok(())
}

fn option_line(option: &OptionInfo, width: usize) -> String {
    let mut line = format!("{:width$}  {:<10}", option.name, option.ty.name());
    if let Some(default) = option.meta.default_value {
        line.push_str(&format!("  [default: {default}]"));
    }
    if option.meta.secret {
        line.push_str("  [secret]");
    }
    if !option.meta.description.is_empty() {
        line.push_str("  ");
        line.push_str(option.meta.description);
    }
    line
}

fn configure_endpoint(uri: &str, lenient: bool) -> Result<()> {
    let sanitized = knob::sanitize(uri)?;
    let (endpoint, report) = knob::configure(uri, &NoReferences, &binder(lenient))
        .with_context(|| format!("Cannot configure {sanitized}"))?;

    println!("{sanitized}");
    let secrets: Vec<&str> =
        knob::options(endpoint.scheme())?.into_iter().filter(|o| o.meta.secret).map(|o| o.name).collect();

    for (name, value) in endpoint.values()? {
        if secrets.contains(&name) {
            println!("  {name} = {MASK}");
        } else {
            println!("  {name} = {value}");
        }
    }
    print_unknown(&report);

    if let ConfiguredEndpoint::Dns(dns) = &endpoint {
        let missing = dns.missing_headers([]);
        if !missing.is_empty() {
            println!("required headers: {}", missing.join(", "));
        }
    }
    Ok(())
}

fn bind_rest(file: &Path, prefix: &str, lenient: bool) -> Result<()> {
    let (rest, report) = knob::load_rest(file, binder(lenient).with_prefix(prefix))?;
    let configurer = RestConfiguration::configurer()?;

    for option in configurer.options() {
        if let Some(value) = configurer.option_value(&rest, option.name, false) {
            println!("{} = {value}", option.name);
        }
    }
    for (name, value) in MapOptions::entries(&rest) {
        println!("{name} = {value}");
    }
    print_unknown(&report);
    Ok(())
}

fn print_unknown(report: &BindReport) {
    if !report.unknown.is_empty() {
        println!("ignored unknown options: {}", report.unknown.join(", "));
    }
}
