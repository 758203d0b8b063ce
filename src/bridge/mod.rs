//! Alternate extraction path that delegates to an external script.
//!
//! Each conversion gets its own [`Workspace`]; the upload is written there,
//! the script is run against it with a bounded wait, and the spreadsheet the
//! script leaves behind is returned. The workspace is removed whatever the
//! outcome.

pub mod script;
pub mod workspace;

pub use script::ScriptOutput;
pub use workspace::Workspace;

use crate::document::UploadedDocument;
use crate::export::Download;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_SCRIPT: &str = "extract.py";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Suffix of the suggested download name, appended to the upload's stem.
pub const DOWNLOAD_SUFFIX: &str = "_extracted.xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Program used to run the script; resolved through `PATH`.
    pub interpreter: String,
    pub script: PathBuf,
    /// Parent directory for workspaces; the OS temp dir when `None`.
    pub temp_root: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_owned(),
            script: PathBuf::from(DEFAULT_SCRIPT),
            temp_root: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to create temporary workspace: {0}")]
    Workspace(#[source] io::Error),

    #[error("failed to {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Extraction script not found at: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("failed to launch '{interpreter}': {source}")]
    Launch {
        interpreter: String,
        #[source]
        source: io::Error,
    },

    #[error("Spreadsheet not created by extraction script")]
    ConversionFailed { stdout: String },

    #[error("Extraction script did not finish within {}s", .0.as_secs())]
    Timeout(Duration),
}

impl BridgeError {
    /// Diagnostic detail for development responses.
    pub fn details(&self) -> Option<String> {
        match self {
            BridgeError::Workspace(source) => Some(source.to_string()),
            BridgeError::Io { source, .. } => Some(source.to_string()),
            BridgeError::ScriptNotFound(path) => Some(path.display().to_string()),
            BridgeError::Launch { source, .. } => Some(source.to_string()),
            BridgeError::ConversionFailed { stdout } => Some(stdout.clone()),
            BridgeError::Timeout(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bridge {
    config: BridgeConfig,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Convert an upload to a spreadsheet through the external script.
    pub async fn convert(&self, upload: &UploadedDocument) -> Result<Download, BridgeError> {
        let workspace =
            Workspace::create(self.config.temp_root.as_deref()).map_err(BridgeError::Workspace)?;
        info!(
            request_id = %workspace.request_id(),
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "starting script conversion"
        );

        let outcome = self.convert_in(&workspace, upload).await;
        workspace.cleanup();
        outcome
    }

    async fn convert_in(
        &self,
        workspace: &Workspace,
        upload: &UploadedDocument,
    ) -> Result<Download, BridgeError> {
        let input = workspace.input_path(&upload.file_name);
        tokio::fs::write(&input, &upload.bytes)
            .await
            .map_err(|source| BridgeError::Io {
                action: "write uploaded file",
                source,
            })?;
        debug!(request_id = %workspace.request_id(), path = %input.display(), "saved upload");

        if !is_file(&self.config.script).await {
            return Err(BridgeError::ScriptNotFound(self.config.script.clone()));
        }

        let output = script::run(&self.config, workspace, &input).await?;
        debug!(request_id = %workspace.request_id(), stdout = %output.stdout, "script stdout");
        if !output.stderr.trim().is_empty() {
            warn!(request_id = %workspace.request_id(), stderr = %output.stderr, "script stderr");
        }

        // The exit code is not authoritative; only the output file is.
        let spreadsheet = workspace.spreadsheet_path();
        if !is_file(&spreadsheet).await {
            return Err(BridgeError::ConversionFailed {
                stdout: output.stdout,
            });
        }

        let bytes = tokio::fs::read(&spreadsheet)
            .await
            .map_err(|source| BridgeError::Io {
                action: "read converted spreadsheet",
                source,
            })?;
        info!(
            request_id = %workspace.request_id(),
            bytes = bytes.len(),
            "script conversion produced spreadsheet"
        );

        Ok(Download::xlsx(bytes, download_name(upload)).quoted())
    }
}

/// `<stem>_extracted.xlsx` for the upload's declared name.
pub fn download_name(upload: &UploadedDocument) -> String {
    format!("{}{DOWNLOAD_SUFFIX}", upload.stem())
}

async fn is_file(path: &Path) -> bool {
    matches!(tokio::fs::metadata(path).await, Ok(metadata) if metadata.is_file())
}
