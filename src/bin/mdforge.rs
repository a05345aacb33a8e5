use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use mdforge::{GenerateOpts, article_schema, load_config, validate};

#[derive(Parser, Debug)]
#[command(name = "mdforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate article files from a JSON configuration.
    Generate(GenerateArgs),
    /// Validate a JSON configuration against the article schema.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input configuration JSON.
    config: PathBuf,

    /// Output file path (default: <output-dir>/<config-name>.<format>).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output formats, comma separated (md, html, pdf).
    #[arg(long, value_delimiter = ',', default_value = "md")]
    formats: Vec<String>,

    /// Directory containing named templates.
    #[arg(long, default_value = mdforge::DEFAULT_TEMPLATES_DIR)]
    templates_dir: PathBuf,

    /// Directory for default output paths.
    #[arg(long, default_value = mdforge::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input configuration JSON.
    config: PathBuf,

    /// Emit the validation report as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut opts = GenerateOpts::new(args.config);
    opts.output = args.output;
    opts.formats = args.formats;
    opts.templates_dir = args.templates_dir;
    opts.output_dir = args.output_dir;

    let report = mdforge::generate(&opts)?;

    for note in &report.advisories {
        eprintln!("warning: {note}");
    }
    for path in &report.written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let doc = load_config(&args.config)?;
    let report = validate(&doc, &article_schema());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if report.is_valid() {
            return Ok(());
        }
        anyhow::bail!("configuration has {} schema error(s)", report.errors.len());
    }

    if !report.errors.is_empty() {
        println!("errors:");
        for (i, error) in report.errors.iter().enumerate() {
            println!("  {}. {error}", i + 1);
        }
    }
    if !report.warnings.is_empty() {
        println!("warnings:");
        for (i, warning) in report.warnings.iter().enumerate() {
            println!("  {}. {warning}", i + 1);
        }
    }

    if report.is_valid() {
        print_summary(&doc);
        println!("configuration is valid");
        Ok(())
    } else {
        anyhow::bail!("configuration has {} schema error(s)", report.errors.len())
    }
}

fn print_summary(doc: &Value) {
    if let Some(title) = doc.pointer("/meta/title").and_then(Value::as_str) {
        println!("title:    {title}");
    }
    if let Some(template) = doc.pointer("/meta/template").and_then(Value::as_str) {
        println!("template: {template}");
    }
    if let Some(cases) = doc.pointer("/use_cases").and_then(Value::as_array) {
        println!("use cases: {}", cases.len());
    }
    if let Some(steps) = doc.pointer("/installation/steps").and_then(Value::as_array) {
        println!("installation steps: {}", steps.len());
    }
    if let Some(benefits) = doc.pointer("/cta/benefits").and_then(Value::as_array) {
        println!("cta benefits: {}", benefits.len());
    }
}
