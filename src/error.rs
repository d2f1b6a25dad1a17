use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SiteError>;

/// Errors produced by the transform pipeline and page rendering.
///
/// Library code returns `SiteError`; `main` converts to `anyhow` at the CLI
/// boundary. Per-instance render failures are not represented here — they are
/// collected as `pages::RenderFailure` records and never abort a batch.
#[derive(Error, Debug)]
pub enum SiteError {
    /// Malformed attribute-schema row. Fatal at load time.
    #[error("attribute schema row {line}: {message}")]
    Schema { line: u64, message: String },

    /// A raw attribute key with no entry in the attribute catalog,
    /// hit on the strict mapping path.
    #[error("no attribute descriptor for raw key '{key}'")]
    MissingDescriptor { key: String },

    /// The region catalog could not be read. The process cannot continue
    /// without it.
    #[error("region catalog {path}: {message}")]
    RegionCatalog { path: PathBuf, message: String },

    /// Template interpolation failed for one page.
    #[error("render failed for '{page}': {source}")]
    Render {
        page: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SiteError {
    pub fn schema(line: u64, message: impl Into<String>) -> Self {
        SiteError::Schema {
            line,
            message: message.into(),
        }
    }

    pub fn render(page: impl Into<String>, source: handlebars::RenderError) -> Self {
        SiteError::Render {
            page: page.into(),
            source: Box::new(source),
        }
    }
}
