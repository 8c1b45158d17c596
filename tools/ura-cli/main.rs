use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use ura::config::ConsoleConfig;
use ura::prelude::*;
use ura::telemetry::init_tracing;

/// Validate, compile, store and publish IVR call flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a JSON console config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a flow document and list its diagnostics
    Validate {
        /// Path to the flow JSON document
        flow: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compile a flow document into a routing plan
    Compile {
        /// Path to the flow JSON document
        flow: PathBuf,
        /// How to print the plan
        #[arg(short, long, value_enum, default_value_t = PlanFormat::Text)]
        format: PlanFormat,
        /// Also write the binary plan artifact to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a binary plan artifact
    Inspect {
        /// Path to a `.plan` file
        plan: PathBuf,
    },
    /// Create a new stored flow with a single entry node
    Create {
        #[arg(short, long)]
        tenant: String,
        #[arg(short, long)]
        name: String,
        /// Kind of the entry node
        #[arg(long, default_value = "menu")]
        entry_kind: String,
    },
    /// Save a flow document over its stored version
    Save {
        /// Path to the flow JSON document
        flow: PathBuf,
    },
    /// Print a stored flow as JSON
    Load {
        #[arg(short, long)]
        tenant: String,
        #[arg(short, long)]
        name: String,
    },
    /// Delete a stored flow
    Delete {
        #[arg(short, long)]
        tenant: String,
        #[arg(short, long)]
        name: String,
    },
    /// List a tenant's stored flows
    List {
        #[arg(short, long)]
        tenant: String,
    },
    /// Compile a stored flow and write its plan to the plan directory
    Publish {
        #[arg(short, long)]
        tenant: String,
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlanFormat {
    Text,
    Json,
}

type Service = FlowService<JsonFileStore, DirectoryPublisher>;
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match ConsoleConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return exit_with_error(&e.to_string()),
    };
    if let Err(e) = init_tracing(&config.log) {
        eprintln!("Warning: {}", e);
    }
    debug!(?config, "Loaded console config");

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => exit_with_error(&e.to_string()),
    }
}

fn run(command: Command, config: &ConsoleConfig) -> Result<ExitCode> {
    match command {
        Command::Validate { flow, json } => {
            let flow = read_flow(&flow)?;
            let report = validate(&flow);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(if report.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Compile {
            flow,
            format,
            output,
        } => {
            let flow = read_flow(&flow)?;
            let report = validate(&flow);
            if !report.is_valid() {
                print_report(&report);
                return Ok(ExitCode::FAILURE);
            }
            let plan = compile(&flow, &report)?;
            match format {
                PlanFormat::Text => println!("{}", visualize_plan(&plan)),
                PlanFormat::Json => println!("{}", plan.to_json_pretty()),
            }
            if let Some(path) = output {
                PlanArtifact::new(plan).save(&path)?;
                eprintln!("Plan artifact written to '{}'", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Inspect { plan } => {
            let artifact = PlanArtifact::from_file(&plan)?;
            println!("{}", visualize_plan(&artifact.plan));
            Ok(ExitCode::SUCCESS)
        }
        Command::Create {
            tenant,
            name,
            entry_kind,
        } => {
            let kind: NodeKind = entry_kind.parse()?;
            let flow = service(config).create(&TenantId::new(tenant), FlowDraft::new(name, kind))?;
            println!(
                "Created '{}' (id {}, version {})",
                flow.name, flow.id, flow.version
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Save { flow } => {
            let flow = read_flow(&flow)?;
            match service(config).save(&flow) {
                Ok(outcome) => {
                    print_report(&outcome.report);
                    println!(
                        "Saved '{}' at version {}",
                        outcome.flow.name, outcome.flow.version
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(ServiceError::Invalid { report, .. }) => {
                    print_report(&report);
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::Load { tenant, name } => {
            let flow = service(config).load(&TenantId::new(tenant), &name)?;
            println!("{}", flow.to_json_pretty());
            Ok(ExitCode::SUCCESS)
        }
        Command::Delete { tenant, name } => {
            service(config).delete(&TenantId::new(tenant), &name)?;
            println!("Deleted '{}'", name);
            Ok(ExitCode::SUCCESS)
        }
        Command::List { tenant } => {
            for name in service(config).list(&TenantId::new(tenant))? {
                println!("{}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Publish { tenant, name } => {
            match service(config).publish(&TenantId::new(tenant), &name) {
                Ok(outcome) => {
                    print_report(&outcome.report);
                    println!(
                        "Published '{}' ({} steps) to {}",
                        name,
                        outcome.plan.steps.len(),
                        outcome.ack.reference
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(ServiceError::Invalid { report, .. })
                | Err(ServiceError::WarningsRejected { report, .. }) => {
                    print_report(&report);
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn service(config: &ConsoleConfig) -> Service {
    FlowService::new(
        JsonFileStore::new(&config.store_root),
        DirectoryPublisher::new(&config.plan_dir),
    )
    .with_policy(config.publish_policy)
}

fn read_flow(path: &Path) -> Result<Flow> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read flow file '{}': {}", path.display(), e))?;
    Ok(Flow::from_json(&json)?)
}

fn print_report(report: &ValidationReport) {
    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("No problems found.");
        return;
    }
    for diagnostic in report.diagnostics() {
        let label = match diagnostic.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!(
            "{:<8} {:<22} {}",
            label,
            diagnostic.kind.to_string(),
            diagnostic.message
        );
    }
    println!(
        "\n{} error(s), {} warning(s)",
        report.errors.len(),
        report.warnings.len()
    );
}

fn exit_with_error(message: &str) -> ExitCode {
    eprintln!("\nError: {}", message);
    ExitCode::FAILURE
}
