use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use lifepo4_health::{
    HealthConfig,
    api::{BatterySnapshot, DeviceInfo, RegisterSnapshot},
    prelude::*,
};
use serde::de::DeserializeOwned;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze the battery health from the dashboard snapshots.
    #[clap(name = "analyze")]
    Analyze(Box<AnalyzeArgs>),

    /// Print the effective configuration as TOML.
    #[clap(name = "config")]
    Config(ConfigArgs),
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Print the report as JSON instead of the tables.
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct InputArgs {
    /// Register snapshot, JSON.
    #[clap(long = "registers", env = "REGISTERS_PATH")]
    pub registers_path: PathBuf,

    /// Device electronic label, JSON.
    #[clap(long = "device-info", env = "DEVICE_INFO_PATH")]
    pub device_info_path: PathBuf,

    /// Live battery snapshot, JSON.
    #[clap(long = "battery", env = "BATTERY_PATH")]
    pub battery_path: PathBuf,
}

impl InputArgs {
    pub fn read(&self) -> Result<(BatterySnapshot, DeviceInfo, RegisterSnapshot)> {
        Ok((
            read_json(&self.battery_path)?,
            read_json(&self.device_info_path)?,
            read_json(&self.registers_path)?,
        ))
    }
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Reference battery parameters, TOML. Defaults are used for everything not set there.
    #[clap(long = "config", env = "HEALTH_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<HealthConfig> {
        match &self.config_path {
            Some(path) => HealthConfig::read_from(path),
            None => Ok(HealthConfig::default()),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse `{}`", path.display()))
}
