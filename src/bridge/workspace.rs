use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, error};
use uuid::Uuid;

pub const WORKSPACE_PREFIX: &str = "doc2sheet_";
pub const MARKDOWN_FILE: &str = "output.md";
pub const SPREADSHEET_FILE: &str = "output.xlsx";

/// Per-request scratch directory for the subprocess path.
///
/// The directory name combines a fresh UUID with the random suffix chosen by
/// `tempfile`, so concurrent requests never share a workspace.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    request_id: Uuid,
}

impl Workspace {
    /// Create a workspace under `root`, or under the OS temp dir when `None`.
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let request_id = Uuid::new_v4();
        let prefix = format!("{WORKSPACE_PREFIX}{}_", request_id.simple());
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!(%request_id, path = %dir.path().display(), "created workspace");
        Ok(Self { dir, request_id })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the uploaded file is stored, under its original name.
    pub fn input_path(&self, file_name: &str) -> PathBuf {
        self.path().join(input_file_name(file_name))
    }

    pub fn markdown_path(&self) -> PathBuf {
        self.path().join(MARKDOWN_FILE)
    }

    pub fn spreadsheet_path(&self) -> PathBuf {
        self.path().join(SPREADSHEET_FILE)
    }

    /// Remove the workspace and everything in it. Failures are logged only.
    pub fn cleanup(self) {
        let request_id = self.request_id;
        let path = self.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(%request_id, path = %path.display(), "removed workspace"),
            Err(cleanup_error) => error!(
                %request_id,
                path = %path.display(),
                "failed to remove workspace: {cleanup_error}"
            ),
        }
    }
}

/// Final path component of a client-declared file name.
///
/// Directory parts are discarded so the file stays inside the workspace, and
/// names that would shadow the script's outputs are prefixed.
pub fn input_file_name(declared: &str) -> String {
    let base = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => "upload".to_owned(),
        MARKDOWN_FILE | SPREADSHEET_FILE => format!("input_{base}"),
        name => name.to_owned(),
    }
}
