use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use logweave_pipeline::{
    BuildContext, BuilderRegistry, Diagnostic, DirectedPipeline, Operator, OperatorKind,
    PipelineError, StageOperator, builtin_registry,
};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT_ID: &str = "$.default_output";

#[derive(Parser, Debug)]
#[command(name = "logweave-cli")]
#[command(about = "Assemble and validate logweave operator pipelines")]
struct Cli {
    /// Log at debug level. Overrides RUST_LOG.
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Assemble(AssembleArgs),
    Validate(ValidateArgs),
    Types(TypesArgs),
}

#[derive(clap::Args, Debug)]
struct ConfigArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    config_source: Option<String>,
    #[arg(long)]
    plugin_dir: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = DefaultOutput::Stdout)]
    default_output: DefaultOutput,
}

#[derive(clap::Args, Debug)]
struct AssembleArgs {
    #[command(flatten)]
    config: ConfigArgs,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    config: ConfigArgs,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct TypesArgs {
    #[arg(long)]
    plugin_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DefaultOutput {
    Stdout,
    Drop,
    None,
}

#[derive(Serialize)]
struct OperatorSummary<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    operator_type: &'a str,
    kind: OperatorKind,
    outputs: &'a [String],
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Assemble(args) => assemble_command(args),
        Commands::Validate(args) => validate_command(args),
        Commands::Types(args) => types_command(args),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

fn assemble_command(args: AssembleArgs) -> Result<ExitCode, String> {
    let pipeline = match build_directed(&args.config)? {
        Ok(pipeline) => pipeline,
        Err(diagnostics) => {
            print_diagnostics(&diagnostics);
            return Ok(ExitCode::from(2));
        }
    };

    if args.json {
        let summaries: Vec<OperatorSummary<'_>> = pipeline
            .operators()
            .iter()
            .map(|op| summarize(op.as_ref()))
            .collect();
        let json = serde_json::to_string_pretty(&summaries).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        for op in pipeline.operators() {
            println!("{}", describe(op.as_ref()));
        }
    }
    print_diagnostics(pipeline.diagnostics());
    Ok(ExitCode::SUCCESS)
}

fn validate_command(args: ValidateArgs) -> Result<ExitCode, String> {
    let (code, diagnostics) = match build_directed(&args.config)? {
        Ok(pipeline) => (ExitCode::SUCCESS, pipeline.diagnostics().to_vec()),
        Err(diagnostics) => (ExitCode::from(2), diagnostics),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&diagnostics).map_err(|e| e.to_string())?;
        println!("{json}");
    } else if diagnostics.iter().any(Diagnostic::is_error) {
        print_diagnostics(&diagnostics);
    } else {
        println!("pipeline is valid");
        print_diagnostics(&diagnostics);
    }
    Ok(code)
}

fn types_command(args: TypesArgs) -> Result<ExitCode, String> {
    let registry = load_registry(args.plugin_dir.as_deref())?;
    for operator_type in registry.types() {
        let origin = if registry.plugin_template(operator_type).is_some() {
            "plugin"
        } else {
            "builtin"
        };
        println!("{operator_type} ({origin})");
    }
    Ok(ExitCode::SUCCESS)
}

/// Outer `Err` is a usage or build failure, inner `Err` carries the
/// diagnostics of a pipeline that failed validation.
fn build_directed(args: &ConfigArgs) -> Result<Result<DirectedPipeline, Vec<Diagnostic>>, String> {
    let source = load_config_source(args.config.as_deref(), args.config_source.as_deref())?;
    let registry = load_registry(args.plugin_dir.as_deref())?;
    let config = registry
        .parse_pipeline(&source)
        .map_err(|e| e.to_string())?;
    debug!(specs = config.len(), "parsed pipeline config");

    match config.build_pipeline(&BuildContext::new(), default_operator(args.default_output)) {
        Ok(pipeline) => Ok(Ok(pipeline)),
        Err(PipelineError::Validation(validation)) => Ok(Err(validation.diagnostics)),
        Err(error) => Err(error.to_string()),
    }
}

fn default_operator(mode: DefaultOutput) -> Option<Box<dyn Operator>> {
    let operator_type = match mode {
        DefaultOutput::Stdout => "stdout",
        DefaultOutput::Drop => "drop_output",
        DefaultOutput::None => return None,
    };
    Some(Box::new(StageOperator::new(
        DEFAULT_OUTPUT_ID,
        operator_type,
        OperatorKind::Output,
    )))
}

fn load_config_source(config: Option<&Path>, config_source: Option<&str>) -> Result<String, String> {
    match (config, config_source) {
        (Some(_), Some(_)) => Err("provide only one of --config or --config-source".to_string()),
        (None, None) => Err("one of --config or --config-source is required".to_string()),
        (Some(path), None) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed reading config file '{}': {e}", path.display())),
        (None, Some(source)) => Ok(source.to_string()),
    }
}

fn load_registry(plugin_dir: Option<&Path>) -> Result<BuilderRegistry, String> {
    let mut registry = builtin_registry();
    let Some(dir) = plugin_dir else {
        return Ok(registry);
    };

    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("failed reading plugin dir '{}': {e}", dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let source = std::fs::read_to_string(&path)
            .map_err(|e| format!("failed reading plugin '{}': {e}", path.display()))?;
        registry
            .register_plugin_source(name, &source)
            .map_err(|e| format!("invalid plugin '{}': {e}", path.display()))?;
        info!(plugin = name, path = %path.display(), "registered plugin");
    }
    Ok(registry)
}

fn summarize(op: &dyn Operator) -> OperatorSummary<'_> {
    OperatorSummary {
        id: op.id(),
        operator_type: op.operator_type(),
        kind: op.kind(),
        outputs: op.output_ids(),
    }
}

fn describe(op: &dyn Operator) -> String {
    let targets = if op.output_ids().is_empty() {
        "<none>".to_string()
    } else {
        op.output_ids().join(", ")
    };
    format!("{} [{}] -> {}", op.id(), op.operator_type(), targets)
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}
