use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jsonschema_payloads_core::{Candidate, GeneratorOptions, KeyTransform, PayloadGenerator};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "jsonschema-payloads")]
#[command(about = "Enumerate representative test payloads from a JSON Schema")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every payload candidate for a schema
    Generate {
        #[command(flatten)]
        target: TargetArgs,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Emit bare payload values instead of {id, value, parentId} records
        #[arg(long)]
        values_only: bool,

        /// Seed for numeric samples and fabricated strings
        #[arg(long)]
        seed: Option<u64>,

        /// How property names are turned into payload keys
        #[arg(long, value_enum, default_value_t = KeyTransformArg::CamelCase)]
        key_transform: KeyTransformArg,
    },

    /// Count payload candidates without materialising them
    Count {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Arguments shared by `generate` and `count`.
#[derive(Args)]
struct TargetArgs {
    /// Input JSON Schema file
    input: PathBuf,

    /// Definition key to use as the master object
    #[arg(short, long)]
    definition: Option<String>,

    /// Cap on the candidates of each array field
    #[arg(long)]
    max_array_combinations: Option<NonZeroUsize>,

    /// Cap on each property's candidates before object flattening
    #[arg(long)]
    max_property_combinations: Option<NonZeroUsize>,

    /// Cap on the candidates of each object field
    #[arg(long)]
    max_object_combinations: Option<NonZeroUsize>,

    /// Max traversal depth for ref resolution
    #[arg(long, default_value_t = 50)]
    max_depth: usize,

    /// Print progress reports to stderr
    #[arg(long)]
    progress: bool,
}

impl TargetArgs {
    fn options(&self) -> GeneratorOptions {
        let mut options = GeneratorOptions {
            silent: !self.progress,
            max_depth: self.max_depth,
            ..Default::default()
        };
        options.combinations.arrays.max_combinations = self.max_array_combinations;
        options.combinations.objects.max_properties_combinations = self.max_property_combinations;
        options.combinations.objects.max_object_payload_combinations = self.max_object_combinations;
        options
    }

    fn load(&self, options: GeneratorOptions) -> Result<PayloadGenerator> {
        // Reports go to stderr so stdout stays clean for JSON
        let mut generator = PayloadGenerator::new(options).with_report_sink(io::stderr());
        generator
            .load(self.input.as_path())
            .with_context(|| format!("Failed to load schema from: {}", self.input.display()))?;
        Ok(generator)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum KeyTransformArg {
    CamelCase,
    Identity,
}

impl From<KeyTransformArg> for KeyTransform {
    fn from(val: KeyTransformArg) -> Self {
        match val {
            KeyTransformArg::CamelCase => KeyTransform::CamelCase,
            KeyTransformArg::Identity => KeyTransform::Identity,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            target,
            output,
            format,
            values_only,
            seed,
            key_transform,
        } => {
            let options = GeneratorOptions {
                seed,
                key_transform: key_transform.into(),
                ..target.options()
            };
            let generator = target.load(options)?;

            let candidates = generator
                .generate(target.definition.as_deref())
                .map_err(|e| anyhow::Error::from(e).context("Generation failed"))?;

            if values_only {
                let values: Vec<&Value> = candidates.iter().map(|c| &c.value).collect();
                write_json(&values, output.as_ref(), format)?;
            } else {
                let records: Vec<&Candidate> = candidates.iter().map(|c| c.as_ref()).collect();
                write_json(&records, output.as_ref(), format)?;
            }
        }
        Commands::Count { target } => {
            let generator = target.load(target.options())?;

            let count = generator
                .count(target.definition.as_deref())
                .map_err(|e| anyhow::Error::from(e).context("Counting failed"))?;

            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{count}").context("Failed to write count")?;
        }
    }

    Ok(())
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
