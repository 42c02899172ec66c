use adc_core::{HvdcLayout, RunSettings};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "ANTARES data collection", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the links workbook from the NTC input tables
    Links(LinksArgs),
    /// Reference workbook utilities
    Reference {
        #[command(subcommand)]
        command: ReferenceCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Existing directory to install the script into instead of printing it
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct LinksArgs {
    /// TOML run file; flags given here override its values
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Directory holding "Transfer Links.csv", "NTCs Index.csv" and "NTCs.csv"
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub input_dir: Option<PathBuf>,
    /// Directory the workbook is written to
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub export_dir: Option<PathBuf>,
    /// Scenario name, used in the workbook name links_<scenario>.xlsx
    #[arg(long)]
    pub scenario: Option<String>,
    /// Reference workbook (PAYS, STUDY_SCENARIO, LINKS, PEAK_PARAMS)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub reference: Option<PathBuf>,
    /// Target calendar years (comma separated, default 2030,2060)
    #[arg(long = "year", value_delimiter = ',')]
    pub years: Vec<i32>,
    /// Replace an existing workbook
    #[arg(long)]
    pub overwrite: bool,
    /// Layout of the HVDC columns
    #[arg(long, value_enum)]
    pub hvdc_layout: Option<HvdcLayoutArg>,
    /// Hurdle cost written to the parameters sheet
    #[arg(long)]
    pub hurdle_cost: Option<f64>,
    /// Field separator of the input CSV files
    #[arg(long, default_value_t = ',')]
    pub separator: char,
    /// Output format for the run summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

impl LinksArgs {
    /// Values given on the command line; unset flags stay `None`.
    pub fn settings(&self) -> RunSettings {
        RunSettings {
            input_dir: self.input_dir.clone(),
            export_dir: self.export_dir.clone(),
            scenario_name: self.scenario.clone(),
            reference_path: self.reference.clone(),
            calendar_years: (!self.years.is_empty()).then(|| self.years.clone()),
            overwrite: self.overwrite.then_some(true),
            hvdc_layout: self.hvdc_layout.map(HvdcLayout::from),
            hurdle_cost: self.hurdle_cost,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ReferenceCommands {
    /// Load a reference workbook and report consistency issues
    Check {
        /// Reference workbook path
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Calendar years that must have exactly one scenario
        #[arg(long = "year", value_delimiter = ',', default_values_t = [2030, 2060])]
        years: Vec<i32>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum HvdcLayoutArg {
    Split,
    Single,
}

impl From<HvdcLayoutArg> for HvdcLayout {
    fn from(arg: HvdcLayoutArg) -> Self {
        match arg {
            HvdcLayoutArg::Split => HvdcLayout::Split,
            HvdcLayoutArg::Single => HvdcLayout::Single,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn unset_flags_do_not_override() {
        let cli = Cli::parse_from(["adc", "links", "--scenario", "eraa", "--year", "2030,2040"]);
        let Commands::Links(args) = cli.command else {
            panic!("expected links command");
        };
        let settings = args.settings();
        assert_eq!(settings.scenario_name.as_deref(), Some("eraa"));
        assert_eq!(settings.calendar_years, Some(vec![2030, 2040]));
        assert_eq!(settings.overwrite, None);
        assert!(settings.input_dir.is_none());
    }
}
