use anyhow::Context;
use clap::{Parser, Subcommand};
use openehr::registry;
use rm_core::constants::{SCHEMA_CATALOG_ENV, WIRE_FORMAT_ENV};
use rm_core::{config, CatalogSource, CoreConfig, RecordService, WireFormat};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rm")]
#[command(about = "openEHR RM codec and structural validator")]
struct Cli {
    /// Schema catalog file (defaults to $RM_SCHEMA_CATALOG, then the embedded RM 1.1.0 catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against a schema
    Validate {
        /// Document to validate
        file: PathBuf,
        /// Schema name, e.g. EHR_STATUS or UID_BASED_ID
        #[arg(long)]
        schema: String,
        /// Input format: json or yaml (defaults to $RM_WIRE_FORMAT, then json)
        #[arg(long)]
        format: Option<WireFormat>,
    },
    /// Validate a document and decode it as a concrete model
    Check {
        /// Document to check
        file: PathBuf,
        /// Concrete model name
        #[arg(long)]
        model: String,
        /// Input format: json or yaml
        #[arg(long)]
        format: Option<WireFormat>,
    },
    /// Decode a document as a concrete model and re-encode it
    Transcode {
        /// Document to transcode
        file: PathBuf,
        /// Concrete model name
        #[arg(long)]
        model: String,
        /// Input format: json or yaml
        #[arg(long)]
        from: Option<WireFormat>,
        /// Output format: json or yaml
        #[arg(long)]
        to: Option<WireFormat>,
    },
    /// List registered concrete models and unions
    Models,
    /// List schemas in the catalog
    Schemas,
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("rm=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let schema_catalog = match cli.catalog {
        Some(path) => CatalogSource::File(path),
        None => config::catalog_source_from_env_value(std::env::var(SCHEMA_CATALOG_ENV).ok())?,
    };
    let wire_format = config::wire_format_from_env_value(std::env::var(WIRE_FORMAT_ENV).ok())?;
    let cfg = CoreConfig::new(schema_catalog, wire_format)?;

    match cli.command {
        Some(Commands::Validate {
            file,
            schema,
            format,
        }) => {
            let service = RecordService::new(&cfg)?;
            let input = read_document(&file)?;
            let errors = service.validate_document(
                &input,
                &schema,
                format.unwrap_or(service.wire_format()),
            )?;
            if errors.is_empty() {
                println!("{}: valid {schema}", file.display());
                return Ok(ExitCode::SUCCESS);
            }
            println!("{}", serde_json::to_string_pretty(&errors)?);
            Ok(ExitCode::FAILURE)
        }
        Some(Commands::Check {
            file,
            model,
            format,
        }) => {
            let service = RecordService::new(&cfg)?;
            let input = read_document(&file)?;
            let report =
                service.check_document(&input, &model, format.unwrap_or(service.wire_format()))?;
            if !report.validation.is_empty() {
                println!("{}", serde_json::to_string_pretty(&report.validation)?);
            }
            match &report.decoded {
                Ok(_) => println!("{}: decodes as {model}", file.display()),
                Err(err) => eprintln!("{}: does not decode as {model}: {err}", file.display()),
            }
            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Some(Commands::Transcode {
            file,
            model,
            from,
            to,
        }) => {
            let input = read_document(&file)?;
            let from = from.unwrap_or(cfg.wire_format());
            let to = to.unwrap_or(cfg.wire_format());
            match registry::transcode(&model, &input, from, to) {
                Ok(output) => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&output)?;
                    if to == WireFormat::Json {
                        writeln!(stdout)?;
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("Error transcoding {}: {err}", file.display());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Some(Commands::Models) => {
            for model in registry::MODELS {
                println!("{model}");
            }
            for (union, variants) in registry::UNIONS {
                println!("{union} = {}", variants.join(" | "));
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Schemas) => {
            let service = RecordService::new(&cfg)?;
            for schema in service.catalog().schemas() {
                let kind = if schema.is_abstract { "abstract" } else { "concrete" };
                if schema.parents.is_empty() {
                    println!("{} ({kind})", schema.name);
                } else {
                    println!("{} ({kind}) < {}", schema.name, schema.parents.join(", "));
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("Use 'rm --help' for commands");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_document(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
