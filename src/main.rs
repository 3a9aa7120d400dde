mod cli;

use avs3probe::{config, report};
use avs3probe_core::PROBE_SCORE_MAX;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "avs3probe=debug,avs3probe_core=trace".to_string()
        } else {
            "avs3probe=warn,avs3probe_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Probe { file, json } => probe_file(&file, cli.config.as_deref(), json),
        Commands::Units { file, limit } => list_units(&file, limit),
        Commands::Demux { file } => demux_file(&file, cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("avs3probe {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let report = report::probe_path(file, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let c = &report.classification;
    println!("File: {}", report.file_path.display());
    println!("Size: {} bytes (sampled {})", report.file_size, report.sample_size);
    println!("Score: {}/{}", report.score, PROBE_SCORE_MAX);
    if report.score > 0 {
        println!("Format: raw AVS3 video");
    } else {
        println!("Format: not recognized");
    }
    println!("Sequence headers: {}", c.sequence_headers);
    println!("Pictures: {}", c.pictures);
    if let Some(profile) = c.profile {
        println!("Profile: {} ({} bit)", profile, profile.bit_depth());
    }
    if let Some(ref rejection) = c.rejection {
        println!("Rejected: {}", rejection);
    }

    Ok(())
}

fn list_units(file: &Path, limit: Option<usize>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let units = report::list_units(file, limit)?;
    for unit in &units {
        println!(
            "{:>10}  0x{:02X}  {}",
            unit.offset,
            u8::from(unit.code),
            unit.code
        );
    }
    println!("{} start codes", units.len());

    Ok(())
}

fn demux_file(file: &Path, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let report = report::demux_path(file, &config)?;

    println!("File: {}", report.file_path.display());
    println!("Codec: {}", report.stream.codec);
    println!(
        "Frame rate: {} ({:.3} fps)",
        report.stream.framerate,
        report.stream.framerate.as_f64()
    );
    println!("Time base: {}", report.stream.time_base);
    println!("Packets: {}", report.packets);
    println!("Bytes: {}", report.bytes);

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Probe sample size: {} bytes", config.probe.sample_size);
    println!("  Packet size: {} bytes", config.demux.packet_size);
    println!("  Frame rate: {}", config.demux.framerate);

    Ok(())
}
