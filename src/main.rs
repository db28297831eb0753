mod cli;
mod tables;

use clap::{Parser, crate_version};
use lifepo4_health::{AnalysisOutcome, Engine, HealthConfig, prelude::*};

use crate::{
    cli::{Args, Command},
    tables::{build_findings_table, build_predictions_table, build_summary_table},
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Analyze(args) => {
            let engine = Engine::new(args.config.load()?);
            let (battery, device_info, registers) = args.input.read()?;
            let result = engine.analyze_health(&battery, &device_info, &registers);
            if args.json {
                let outcome = AnalysisOutcome::from(result.clone());
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            let report = result.context("the analysis has failed")?;
            if !args.json {
                println!("{}", build_summary_table(&report));
                println!("{}", build_predictions_table(&report.predictions));
                println!(
                    "{}",
                    build_findings_table(&report.inconsistencies, &report.recommendations),
                );
            }
        }
        Command::Config(args) => {
            let config: HealthConfig = args.load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    info!("done!");
    Ok(())
}
