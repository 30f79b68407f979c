use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use groute_common::util::generator::{self, GeneratorConfig};
use groute_common::util::RoutingParams;
use groute_router::steiner::HananMstOracle;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a synthetic benchmark generated from the config file.
    Route,
    /// Print the synthetic benchmark that would be routed, without routing it.
    Generate,
}

/// Top-level config file: routing parameters plus the synthetic-benchmark
/// generator settings (spec.md's input parsing/output formatting are
/// external collaborators this driver stands in for).
#[derive(Debug, Clone, Default, Deserialize)]
struct Config {
    #[serde(default)]
    routing: RoutingParams,
    #[serde(default)]
    generator: GeneratorConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config: Config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let raw = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("failed to read config file: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("failed to parse config TOML: {e}"))?
    } else {
        log::warn!(
            "configuration file {:?} not found, using internal defaults",
            args.config
        );
        Config::default()
    };

    match args.command.unwrap_or(Commands::Route) {
        Commands::Generate => {
            let (region, nets) = generator::generate_region_and_nets(&config.generator);
            println!(
                "region {}x{}x{}, {} nets",
                region.width,
                region.height,
                region.layers,
                nets.len()
            );
            for net in &nets {
                println!("net {:?}: {} pins, bbox {}", net.id, net.pin_count(), net.bbox_size());
            }
        }
        Commands::Route => {
            let (region, nets) = generator::generate_region_and_nets(&config.generator);
            log::info!("routing {} nets over a {}x{} grid", nets.len(), region.width, region.height);

            let oracle = HananMstOracle;
            let output = groute_router::route(&region, &nets, &oracle, &config.routing)
                .map_err(|e| anyhow::anyhow!("routing failed: {e}"))?;

            println!(
                "stage 2 ran {} iteration(s), final overflow {}",
                output.stage2_iterations, output.final_overflow
            );
            if output.final_overflow > 0 {
                // Non-fatal: the engine always returns a result, it's up to the
                // caller whether residual overflow is acceptable.
                let failure = groute_router::error::RoutingFailure::DidNotConverge {
                    iterations: output.stage2_iterations,
                    overflow: output.final_overflow,
                };
                log::warn!("{failure}");
            }
            for (net_id, segments) in &output.nets {
                println!("net {:?}: {} segment(s)", net_id, segments.len());
            }
        }
    }

    Ok(())
}
