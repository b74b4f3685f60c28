//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{debug, info};

use siteport_core::{
    plan_group_import, plan_user_import, ConversionReport, GroupImportPlan, RoleMappingConverter,
    Settings, UserImportPlan, CONFIG_FILE_NAME,
};
use siteport_data::{open_source, Table};

/// Output format for command reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Parser)]
#[command(name = "siteport")]
#[command(author, version, about = "Tableau site role mapping and bulk admin", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a user export into the role-mapping import CSV
    Convert {
        /// Input CSV or Excel file
        input: PathBuf,

        /// Output CSV file (defaults to the configured output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worksheet to read (defaults to the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show which users an import file would add
    PlanUsers {
        /// Input CSV or Excel file
        input: PathBuf,

        /// Worksheet to read
        #[arg(long)]
        sheet: Option<String>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show which groups an import file would create
    PlanGroups {
        /// Input CSV or Excel file
        input: PathBuf,

        /// Worksheet to read
        #[arg(long)]
        sheet: Option<String>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config {
        /// Output format (text prints TOML)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            sheet,
            format,
        } => {
            let output = output.unwrap_or_else(|| settings.convert.output.clone());
            let sheet = sheet.or_else(|| settings.convert.sheet.clone());
            convert_command(&input, &output, sheet.as_deref(), format)?;
        }
        Commands::PlanUsers {
            input,
            sheet,
            format,
        } => {
            plan_users_command(&input, sheet.as_deref(), format)?;
        }
        Commands::PlanGroups {
            input,
            sheet,
            format,
        } => {
            plan_groups_command(&input, sheet.as_deref(), format)?;
        }
        Commands::Config { format } => {
            config_command(&settings, format)?;
        }
    }

    Ok(())
}

/// Execute the convert command
pub fn convert_command(
    input: &Path,
    output: &Path,
    sheet: Option<&str>,
    format: OutputFormat,
) -> Result<ConversionReport> {
    let source = open_source(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let report = RoleMappingConverter::convert_source(source.as_ref(), sheet)
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    let artifact = report.to_artifact().context("Failed to render CSV")?;
    fs::write(output, &artifact.body)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    info!(output = %output.display(), "wrote converted users");

    match format {
        OutputFormat::Json => {
            let summary = json!({
                "input": input.display().to_string(),
                "output": output.display().to_string(),
                "users": report.records.len(),
                "issues": report.issues,
            });
            let json = serde_json::to_string_pretty(&summary)
                .context("Failed to serialize conversion summary to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("siteport v{}", siteport_core::VERSION);
            println!("Converted: {}", input.display());
            println!("  Users: {}", report.records.len());
            println!("  Created: {}", output.display());
            if !report.issues.is_empty() {
                println!();
                println!("{} cell(s) were not text and were left empty:", report.issues.len());
                for issue in &report.issues {
                    println!("  {}", issue);
                }
            }
        }
    }

    Ok(report)
}

/// Execute the plan-users command
pub fn plan_users_command(
    input: &Path,
    sheet: Option<&str>,
    format: OutputFormat,
) -> Result<UserImportPlan> {
    let table = read_table(input, sheet)?;
    let plan = plan_user_import(&table);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan)
                .context("Failed to serialize user plan to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("Users to add: {}", plan.users.len());
            for user in &plan.users {
                match &user.email {
                    Some(email) => println!("  + {} <{}> ({})", user.name, email, user.site_role),
                    None => println!("  + {} ({})", user.name, user.site_role),
                }
            }
            print_skipped(plan.skipped.iter().map(|s| (s.row, s.reason.as_str())));
        }
    }

    Ok(plan)
}

/// Execute the plan-groups command
pub fn plan_groups_command(
    input: &Path,
    sheet: Option<&str>,
    format: OutputFormat,
) -> Result<GroupImportPlan> {
    let table = read_table(input, sheet)?;
    let plan = plan_group_import(&table);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan)
                .context("Failed to serialize group plan to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("Groups to create: {}", plan.groups.len());
            for name in &plan.groups {
                println!("  + {}", name);
            }
            print_skipped(plan.skipped.iter().map(|s| (s.row, s.reason.as_str())));
        }
    }

    Ok(plan)
}

/// Execute the config command
pub fn config_command(settings: &Settings, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(settings)
            .context("Failed to serialize settings to JSON")?,
        OutputFormat::Text => {
            toml::to_string_pretty(settings).context("Failed to serialize settings to TOML")?
        }
    };
    println!("{}", rendered);
    Ok(())
}

fn print_skipped<'a>(skipped: impl Iterator<Item = (usize, &'a str)>) {
    let mut header = false;
    for (row, reason) in skipped {
        if !header {
            println!("Skipped rows:");
            header = true;
        }
        println!("  - row {}: {}", row, reason);
    }
}

/// Read one sheet of an import file
fn read_table(input: &Path, sheet: Option<&str>) -> Result<Table> {
    let source = open_source(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    source
        .read_table(sheet)
        .with_context(|| format!("Failed to read table from: {}", input.display()))
}

/// Load settings from a config file or use defaults
fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Settings::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => {
            let candidates = [CONFIG_FILE_NAME, ".siteport.toml"];
            for candidate in candidates {
                let path = Path::new(candidate);
                if path.exists() {
                    debug!(config = candidate, "using config file");
                    return Settings::load(path)
                        .with_context(|| format!("Failed to load config: {}", candidate));
                }
            }
            Ok(Settings::default())
        }
    }
}
