use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{
    config::{self, TemplateStore},
    error::{ForgeError, ForgeResult},
    html,
    schema::{self, article_schema},
    template::Template,
};

/// The supported output format tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Html,
    Pdf,
}

impl OutputFormat {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "md" => Some(OutputFormat::Markdown),
            "html" => Some(OutputFormat::Html),
            "pdf" => Some(OutputFormat::Pdf),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenerateOpts {
    pub config_path: PathBuf,
    /// Explicit output path; its extension is stripped and replaced per format.
    pub output: Option<PathBuf>,
    /// Requested format tags, in order. Unknown tags are advisory, not fatal.
    pub formats: Vec<String>,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl GenerateOpts {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            output: None,
            formats: vec!["md".to_string()],
            templates_dir: PathBuf::from(config::DEFAULT_TEMPLATES_DIR),
            output_dir: PathBuf::from(config::DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GenerateReport {
    pub template: String,
    pub written: Vec<PathBuf>,
    /// Non-fatal conditions surfaced to the user (unsupported formats, lints).
    pub advisories: Vec<String>,
}

/// Runs the full generation pipeline: load config, validation gate, load and
/// compile the named template, render once, then fan out per requested format.
#[tracing::instrument(skip(opts), fields(config = %opts.config_path.display()))]
pub fn generate(opts: &GenerateOpts) -> ForgeResult<GenerateReport> {
    let doc = config::load_config(&opts.config_path)?;

    let mut report = GenerateReport::default();

    // Schema errors block rendering; a malformed document would otherwise
    // degrade to garbage output. Warnings pass through as advisories.
    let validation = schema::validate(&doc, &article_schema());
    for warning in &validation.warnings {
        tracing::warn!(%warning, "config lint");
        report.advisories.push(warning.clone());
    }
    if !validation.is_valid() {
        return Err(ForgeError::schema(format!(
            "configuration has {} error(s):\n  {}",
            validation.errors.len(),
            validation.errors.join("\n  ")
        )));
    }

    let template_name = doc
        .pointer("/meta/template")
        .and_then(Value::as_str)
        .ok_or_else(|| ForgeError::config("meta.template must name a template"))?;
    report.template = template_name.to_string();

    let store = TemplateStore::new(&opts.templates_dir);
    let source = store.load(template_name)?;
    let template = Template::compile(&source)?;

    // Rendered exactly once; every format reuses this string.
    let rendered = template.render(&doc);

    let base = base_output_path(opts)?;
    for tag in &opts.formats {
        match OutputFormat::from_tag(tag) {
            Some(format @ OutputFormat::Markdown) => {
                let path = with_format_extension(&base, format.extension());
                write_output(&path, &rendered)?;
                report.written.push(path);
            }
            Some(format @ OutputFormat::Html) => {
                let path = with_format_extension(&base, format.extension());
                write_output(&path, &html::to_document(&rendered))?;
                report.written.push(path);
            }
            Some(OutputFormat::Pdf) => {
                let note = "pdf output is not supported yet; skipping".to_string();
                tracing::warn!("{note}");
                report.advisories.push(note);
            }
            None => {
                let note = format!("unknown format '{tag}'; skipping");
                tracing::warn!("{note}");
                report.advisories.push(note);
            }
        }
    }

    Ok(report)
}

fn base_output_path(opts: &GenerateOpts) -> ForgeResult<PathBuf> {
    if let Some(output) = &opts.output {
        // Strip only the final extension; the format extension replaces it.
        return Ok(output.with_extension(""));
    }
    let stem = opts
        .config_path
        .file_stem()
        .ok_or_else(|| ForgeError::config("config path has no file name"))?;
    Ok(opts.output_dir.join(stem))
}

// `Path::with_extension` would clobber dots inside the stem, so the format
// extension is appended textually.
fn with_format_extension(base: &Path, ext: &str) -> PathBuf {
    let mut os = base.as_os_str().to_os_string();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

fn write_output(path: &Path, content: &str) -> ForgeResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                ForgeError::output(format!(
                    "cannot create directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
    }
    fs::write(path, content)
        .map_err(|e| ForgeError::output(format!("cannot write '{}': {e}", path.display())))
}
