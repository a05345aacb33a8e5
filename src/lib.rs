#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod html;
pub mod pipeline;
pub mod schema;
pub mod template;

pub use config::{DEFAULT_OUTPUT_DIR, DEFAULT_TEMPLATES_DIR, TemplateStore, load_config};
pub use error::{ForgeError, ForgeResult};
pub use pipeline::{GenerateOpts, GenerateReport, OutputFormat, generate};
pub use schema::{Schema, ValidationReport, article_schema, validate};
pub use template::Template;
