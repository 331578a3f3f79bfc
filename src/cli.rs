//! Command-line interface argument parsing.
use clap::Parser;
use std::path::PathBuf;

/// Aggregate tabular incident records and compose a printable report.
///
/// Reads a CSV whose header names one entity-identifier column (the
/// first) and any number of numeric category columns, renders a grouped
/// bar chart of the per-entity totals, and composes a multi-section PDF
/// report embedding the chart.
///
/// Examples:
///   incident_report crime_rates.csv
///   incident_report crime_rates.csv --chart out/chart.png --report out/report.pdf
///   incident_report demo.csv --sample
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV file of incident records
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output path for the chart image (PNG)
    #[arg(short, long, default_value = "incident_chart.png", value_name = "FILE")]
    pub chart: PathBuf,

    /// Output path for the report document (PDF)
    #[arg(short, long, default_value = "incident_report.pdf", value_name = "FILE")]
    pub report: PathBuf,

    /// Write the bundled sample dataset to INPUT if it does not exist yet
    #[arg(long)]
    pub sample: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (no console preview)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Cross-field checks clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.chart == self.report {
            return Err("chart and report outputs must be different paths".to_string());
        }
        if self.input == self.chart || self.input == self.report {
            return Err("output paths must differ from the input path".to_string());
        }
        Ok(())
    }

    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_paths_parse() {
        let args = Args::parse_from(["incident_report", "data.csv"]);
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.chart, PathBuf::from("incident_chart.png"));
        assert_eq!(args.report, PathBuf::from("incident_report.pdf"));
        assert!(!args.sample);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn colliding_outputs_fail_validation() {
        let args = Args::parse_from([
            "incident_report",
            "data.csv",
            "--chart",
            "same.bin",
            "--report",
            "same.bin",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["incident_report", "d.csv", "-q", "-v"]).is_err());
    }
}
