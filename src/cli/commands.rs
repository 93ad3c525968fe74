use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// LLM-driven work breakdown structure generator
#[derive(Parser, Debug)]
#[command(
    name = "premisia-wbs",
    about = "Generate a work breakdown structure from business analysis",
    version,
    author,
    long_about = "premisia-wbs turns business-analysis insights and a business context into a \
                  validated work breakdown structure: weighted workstreams with deliverables and \
                  dependencies. It supports multiple AI backends (Ollama, OpenAI, Claude, Gemini, \
                  Grok, Groq) and JSON, YAML or human-readable output."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress progress and non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build a work breakdown structure",
        long_about = "Runs the full pipeline: classify the initiative, pick a workstream pattern, \
                      generate workstreams with deliverables and dependencies, then validate them \
                      against the business objective.\n\n\
                      Examples:\n  \
                      premisia-wbs build --insights insights.json --context business.yaml\n  \
                      premisia-wbs build -i notes.txt -c business.json --format json -o wbs.json\n  \
                      premisia-wbs build -i insights.json -c business.json --strategy-profile profile.json\n  \
                      premisia-wbs build -i insights.json -c business.json --backend claude --fast-model claude-3-5-haiku-latest"
    )]
    Build(BuildArgs),

    #[command(
        about = "List registered workstream patterns",
        long_about = "Shows every built-in pattern plugin with its category weights.\n\n\
                      Examples:\n  \
                      premisia-wbs patterns\n  \
                      premisia-wbs patterns --format json"
    )]
    Patterns(PatternsArgs),

    #[command(
        about = "Check backend availability",
        long_about = "Checks which AI backends are reachable or have credentials configured.\n\n\
                      Examples:\n  \
                      premisia-wbs health\n  \
                      premisia-wbs health --backend ollama"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        short = 'i',
        long,
        value_name = "FILE",
        help = "Business analysis insights (JSON, YAML or plain text)"
    )]
    pub insights: PathBuf,

    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "Business context (JSON or YAML)"
    )]
    pub context: PathBuf,

    #[arg(
        long,
        value_name = "FILE",
        help = "Strategy profile used to reweight the pattern (JSON or YAML)"
    )]
    pub strategy_profile: Option<PathBuf>,

    #[arg(
        long,
        value_name = "TEXT",
        help = "Objective to validate against (defaults to the business description)"
    )]
    pub objective: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'b',
        long,
        value_parser = parse_backend,
        help = "AI backend provider (defaults to PREMISIA_PROVIDER, then a local Ollama)"
    )]
    pub backend: Option<AdapterKind>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Model name to use")]
    pub model: Option<String>,

    #[arg(
        long,
        value_name = "MODEL",
        help = "Faster model used for dependency linking"
    )]
    pub fast_model: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Append every LLM exchange to this JSONL file"
    )]
    pub heuristics_log: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct PatternsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'b',
        long,
        value_parser = parse_backend,
        help = "Specific backend to check (omit to check all)"
    )]
    pub backend: Option<AdapterKind>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_backend(s: &str) -> Result<AdapterKind, String> {
    crate::config::parse_provider(s).map_err(|e| e.to_string())
}
