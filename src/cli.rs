use clap::{Parser, Subcommand};
use std::path::PathBuf;

use petrocalc::validation::{ConstantField, REQUIRED_EXTENSION};

#[derive(Parser, Debug)]
#[command(name = "petrocalc")]
#[command(about = "Petrophysical calculator client: upload a .las log, run the job, fetch the results", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $PETROCALC_CONFIG or config/petrocalc.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a log file, run the calculation and download both artifacts
    Run(RunArgs),
    /// Download the artifacts of a file that was already processed
    Download(DownloadArgs),
    /// Print the effective configuration
    Config,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// The .las file to process
    pub file: PathBuf,

    #[command(flatten)]
    pub constants: ConstantArgs,

    /// Directory for the downloaded artifacts (overrides download.output_dir)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Stop once the job has completed
    #[arg(long)]
    pub no_download: bool,
}

/// Values left unset keep the form defaults
#[derive(clap::Args, Debug, Default)]
pub struct ConstantArgs {
    #[arg(long)]
    pub matrix_density: Option<String>,
    #[arg(long)]
    pub fluid_density: Option<String>,
    #[arg(long)]
    pub water_resistivity: Option<String>,
    #[arg(long)]
    pub tortuosity: Option<String>,
    #[arg(long)]
    pub saturation_exponent: Option<String>,
    #[arg(long)]
    pub cementation_exponent: Option<String>,
}

impl ConstantArgs {
    /// Only the constants given on the command line
    pub fn provided(&self) -> Vec<(ConstantField, &str)> {
        [
            (ConstantField::MatrixDensity, &self.matrix_density),
            (ConstantField::FluidDensity, &self.fluid_density),
            (ConstantField::WaterResistivity, &self.water_resistivity),
            (ConstantField::Tortuosity, &self.tortuosity),
            (ConstantField::SaturationExponent, &self.saturation_exponent),
            (ConstantField::CementationExponent, &self.cementation_exponent),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Name of the processed .las file, e.g. well42.las
    #[arg(value_parser = parse_las_name)]
    pub file_name: String,

    /// Directory for the downloaded artifacts (overrides download.output_dir)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// A bare `.las` file name; artifact names are derived from it
fn parse_las_name(raw: &str) -> Result<String, String> {
    if raw.contains(['/', '\\']) || raw.starts_with("..") {
        return Err("expected a file name without directories, e.g. well42.las".to_string());
    }
    if !raw.ends_with(REQUIRED_EXTENSION) || raw.len() == REQUIRED_EXTENSION.len() {
        return Err(format!("expected a {} file name", REQUIRED_EXTENSION));
    }
    Ok(raw.to_string())
}
