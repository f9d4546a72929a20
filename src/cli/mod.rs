//! Command-line interface for order-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and argument overrides
//! - Translating filter arguments into a [`RawFilter`]
//! - Choosing the output destination

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::filter::RawFilter;

/// Order summary export
#[derive(Parser, Debug)]
#[command(
    name = "order-export",
    version,
    about = "Export filtered order summaries to CSV",
    long_about = "Streams completed and processing orders matching a date range, billing
country/region and coupon code to a CSV report, one page of orders at a time."
)]
pub struct CliArgs {
    /// First day of the creation-date window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// Last day of the creation-date window, inclusive (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<String>,

    /// Billing country code (e.g. US)
    #[arg(long, value_name = "CODE")]
    pub country: Option<String>,

    /// Billing state/province code (e.g. CA)
    #[arg(long, value_name = "CODE")]
    pub region: Option<String>,

    /// Only orders that used this coupon code
    #[arg(long, value_name = "CODE")]
    pub coupon: Option<String>,

    /// Output file, `-` for stdout
    ///
    /// Defaults to order-summary-<timestamp>.csv in the configured output directory.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// MongoDB connection URI
    #[arg(long, value_name = "URI")]
    pub uri: Option<String>,

    /// Database holding the orders collection
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Orders collection name
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Orders fetched per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// Safety limit on pages fetched
    #[arg(long, value_name = "N")]
    pub max_pages: Option<u32>,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for order-export
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// Where the report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and apply argument overrides
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Override configuration values with arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_source_args(config, args);
        Self::apply_export_args(config, args);
        Self::apply_logging_args(config, args);
    }

    fn apply_source_args(config: &mut Config, args: &CliArgs) {
        if let Some(uri) = &args.uri {
            config.source.uri = uri.clone();
        }
        if let Some(database) = &args.database {
            config.source.database = database.clone();
        }
        if let Some(collection) = &args.collection {
            config.source.collection = collection.clone();
        }
    }

    fn apply_export_args(config: &mut Config, args: &CliArgs) {
        if let Some(page_size) = args.page_size {
            config.export.page_size = page_size;
        }
        if let Some(max_pages) = args.max_pages {
            config.export.max_pages = max_pages;
        }
        if args.no_progress {
            config.export.progress = false;
        }
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Filter arguments as entered, before validation
    pub fn raw_filter(&self) -> RawFilter {
        RawFilter {
            start_date: self.args.start_date.clone(),
            end_date: self.args.end_date.clone(),
            country: self.args.country.clone(),
            region: self.args.region.clone(),
            coupon_code: self.args.coupon.clone(),
        }
    }

    /// Resolve the output destination
    pub fn output_target(&self) -> OutputTarget {
        match &self.args.output {
            Some(path) if path.as_os_str() == "-" => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(path.clone()),
            None => OutputTarget::File(default_report_path(&self.config.export.output_dir)),
        }
    }

    /// Whether to draw a progress spinner
    pub fn show_progress(&self) -> bool {
        self.config.export.progress
            && !self.args.quiet
            && self.output_target() != OutputTarget::Stdout
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate the effective configuration
    fn validate_config_file(&self) {
        let path = self.config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist, defaults apply");
        }

        match self.config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => println!("Configuration validation failed: {}", e),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        println!("# Configuration file: {}", self.config_path().display());
        println!();
        print!("{}", self.config.to_toml_string()?);
        Ok(())
    }

    /// Path of the configuration file in use
    pub fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}

/// `order-summary-YYYYMMDD-HHMMSS.csv` in `dir`
pub fn default_report_path(dir: &Path) -> PathBuf {
    dir.join(format!(
        "order-summary-{}.csv",
        Local::now().format("%Y%m%d-%H%M%S")
    ))
}
