use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum L3Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("L3 cannot handle numeric inputs: column '{0}' holds numbers, use categorical values only")]
    NonCategorical(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Unsupported platform: binaries for {0} are not available")]
    UnsupportedPlatform(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Malformed rule on line {line}: {message}")]
    RuleFormat { line: usize, message: String },

    #[error("Malformed artifact {path} at line {line}: {message}")]
    ArtifactFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Unknown class id: {0}")]
    UnknownClass(i64),

    #[error("Unknown item id: {0}")]
    UnknownItem(i64),

    #[error("External tool error: {tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Download error: {0}")]
    Download(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<reqwest::Error> for L3Error {
    fn from(err: reqwest::Error) -> Self {
        L3Error::Download(err.to_string())
    }
}

impl From<csv::Error> for L3Error {
    fn from(err: csv::Error) -> Self {
        L3Error::Csv(err.to_string())
    }
}

impl From<zip::result::ZipError> for L3Error {
    fn from(err: zip::result::ZipError) -> Self {
        L3Error::Archive(err.to_string())
    }
}

impl L3Error {
    /// Whether the error was raised before any file or subprocess work.
    pub fn is_config(&self) -> bool {
        matches!(self, L3Error::Config(_) | L3Error::NonCategorical(_))
    }
}

pub type Result<T> = std::result::Result<T, L3Error>;

/// Reads an artifact produced by the external binaries, reporting a missing
/// file as `FileNotFound` with its path.
pub(crate) fn read_artifact(path: &std::path::Path) -> Result<String> {
    log::debug!("Reading artifact {}", path.display());
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => L3Error::FileNotFound(path.to_path_buf()),
        _ => L3Error::Io(e),
    })
}
