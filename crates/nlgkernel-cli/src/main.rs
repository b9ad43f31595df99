//! NlgKernels CLI tool.
//!
//! Generates narrative reports from JSON-lines records and inspects the
//! kernel catalog and configuration.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use nlgkernels::catalog::{domains, enabled_domains, total_kernel_count};
use nlgkernels::core::{
    config::NarrativeConfig, domain::Domain, observability::LogLevel, registry::KernelRegistry,
};
use nlgkernels::narrative::{RecordReader, ReportGenerator};

#[derive(Parser)]
#[command(name = "nlgkernel")]
#[command(version, about = "Statistical narrative reports from topic analytics records", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML); NLG_* environment variables otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report for every record in a JSON-lines file
    Report {
        /// Input file, or `-` for stdin
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List registered kernels
    Kernels {
        /// Filter by domain (e.g., temporal, comparative, narrative)
        #[arg(short, long)]
        domain: Option<String>,
    },

    /// Show enabled features
    Features,

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to this path
        #[arg(short, long)]
        write: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Plain text, sections separated by blank lines
    Text,
    /// One JSON report per line
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let mut logging = config.logging.clone();
    if cli.json_logs {
        logging = logging.with_structured(true);
    }
    if cli.verbose {
        logging = logging.with_level(LogLevel::Debug);
    }
    logging.init()?;

    match cli.command {
        Commands::Report { input, format } => {
            cmd_report(config, &input, format)?;
        }

        Commands::Kernels { domain } => {
            cmd_kernels(domain)?;
        }

        Commands::Features => {
            cmd_features()?;
        }

        Commands::Config { write } => {
            cmd_config(&config, write.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<NarrativeConfig> {
    let config = match path {
        Some(path) => NarrativeConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => NarrativeConfig::from_env().context("reading NLG_* environment")?,
    };
    config.validate()?;
    Ok(config)
}

fn cmd_report(config: NarrativeConfig, input: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let generator = ReportGenerator::with_config(config)?;

    let source: Box<dyn BufRead> = if input == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
        Box::new(BufReader::new(file))
    };
    let mut reader = RecordReader::new(source);

    let mut written = 0usize;
    let mut failed = 0usize;
    while let Some(parsed) = reader.next() {
        let line = reader.line();
        let report = match parsed.and_then(|record| generator.generate(&record)) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(line, error = %e, "Skipping record");
                failed += 1;
                continue;
            }
        };

        match format {
            OutputFormat::Text => {
                if written > 0 {
                    println!("{}", "─".repeat(66));
                }
                print!("{}", report);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(&report)?);
            }
        }
        written += 1;
    }

    tracing::info!(written, failed, "Done");
    if failed > 0 {
        anyhow::bail!("{} of {} records could not be reported", failed, written + failed);
    }
    Ok(())
}

fn cmd_kernels(domain_filter: Option<String>) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              NlgKernels Kernel Catalogue                         ║");
    println!("╚══════════════════════════════════════════════════════════════════╝\n");

    let mut registry = KernelRegistry::new();
    nlgkernels::register_all(&mut registry)?;

    let filter = match domain_filter.as_deref() {
        Some(name) => match Domain::parse(name) {
            Some(domain) => Some(domain),
            None => {
                println!("Unknown domain. Available domains:");
                for d in domains() {
                    println!("  - {} (feature: {})", d.name, d.feature);
                }
                return Ok(());
            }
        },
        None => None,
    };

    for info in domains() {
        if filter.is_some_and(|d| d != info.domain) {
            continue;
        }
        let mut kernels = registry.by_domain(info.domain);
        kernels.sort_by(|a, b| a.id.cmp(&b.id));

        println!("┌─────────────────────────────────────────────────────────────────┐");
        println!("│ {} ({} kernels)", info.name, kernels.len());
        println!("│ {}", info.description);
        println!("├─────────────────────────────────────────────────────────────────┤");
        for kernel in &kernels {
            println!("│  {:<30} - {}", kernel.id, kernel.description);
        }
        println!("└─────────────────────────────────────────────────────────────────┘\n");
    }

    let stats = registry.stats();
    println!("Total: {} kernels registered", stats.total);

    Ok(())
}

fn cmd_features() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                     Enabled Features                             ║");
    println!("╚══════════════════════════════════════════════════════════════════╝\n");

    let enabled = enabled_domains();

    println!("Feature Status:");
    println!("──────────────────────────────────────────────────────────────────");

    let mut enabled_count = 0;
    for info in domains() {
        let on = enabled.contains(&info.feature);
        let status = if on { "✓" } else { "✗" };
        let kernels = if on {
            enabled_count += info.kernel_count;
            format!("{} kernels", info.kernel_count)
        } else {
            "disabled".to_string()
        };
        println!("  {} {:<15} {}", status, info.feature, kernels);
    }

    println!("──────────────────────────────────────────────────────────────────");
    println!(
        "  {} of {} kernels enabled",
        enabled_count,
        total_kernel_count()
    );

    Ok(())
}

fn cmd_config(config: &NarrativeConfig, write: Option<&Path>) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);

    if let Some(path) = write {
        config
            .to_file(path)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration written");
    }

    Ok(())
}
