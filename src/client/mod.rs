//! Client-side controller for the extraction service.
//!
//! [`Controller`] keeps the selected file, the extracted text, the last error
//! and one in-flight flag per action. Results are saved into a download
//! directory the way a browser saves a blob.

pub mod api;

pub use api::{ApiClient, ClientError, DEFAULT_SERVER};

use crate::document::DocumentFormat;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "This file type is not supported for text extraction";

/// A file chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub async fn read(path: &Path) -> io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    /// Name up to the first `.`, used to derive download names.
    pub fn download_stem(&self) -> &str {
        self.name.split('.').next().unwrap_or_default()
    }

    pub fn text_download_name(&self) -> String {
        format!("{}_extracted.txt", self.download_stem())
    }

    pub fn excel_download_name(&self) -> String {
        format!("{}_extracted.xlsx", self.download_stem())
    }
}

/// Actions that carry their own in-flight flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Extract,
    Export,
    SubprocessExtract,
}

/// Observable controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Extracting,
    Extracted,
    Exporting,
    SubprocessExtracting,
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("This file type is not supported for text extraction")]
    UnsupportedType,

    #[error("no file selected")]
    NoFile,

    #[error("no extracted text")]
    NoText,

    #[error("{0:?} already in progress")]
    Busy(Action),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Default)]
struct ControllerState {
    file: Option<SelectedFile>,
    text: Option<String>,
    error: Option<String>,
    extracting: bool,
    exporting: bool,
    subprocess_extracting: bool,
}

impl ControllerState {
    fn flag(&mut self, action: Action) -> &mut bool {
        match action {
            Action::Extract => &mut self.extracting,
            Action::Export => &mut self.exporting,
            Action::SubprocessExtract => &mut self.subprocess_extracting,
        }
    }
}

/// Clears an action's in-flight flag when the action ends, however it ends.
struct InFlight<'a> {
    controller: &'a Controller,
    action: Action,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.controller.lock().flag(self.action) = false;
    }
}

pub struct Controller {
    api: ApiClient,
    downloads: PathBuf,
    state: Mutex<ControllerState>,
}

impl Controller {
    pub fn new(api: ApiClient, downloads: impl Into<PathBuf>) -> Self {
        Self {
            api,
            downloads: downloads.into(),
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn phase(&self) -> Phase {
        let state = self.lock();
        if state.extracting {
            Phase::Extracting
        } else if state.subprocess_extracting {
            Phase::SubprocessExtracting
        } else if state.exporting {
            Phase::Exporting
        } else if let Some(message) = &state.error {
            Phase::Error(message.clone())
        } else if state.text.is_some() {
            Phase::Extracted
        } else if state.file.is_some() {
            Phase::FileSelected
        } else {
            Phase::Idle
        }
    }

    pub fn is_busy(&self, action: Action) -> bool {
        *self.lock().flag(action)
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.lock().file.clone()
    }

    pub fn extracted_text(&self) -> Option<String> {
        self.lock().text.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Choose a file. Unsupported types clear any previous selection.
    pub fn select_file(&self, file: SelectedFile) -> Result<(), ControllerError> {
        let mut state = self.lock();
        if DocumentFormat::from_file_name(&file.name).is_some() {
            info!(file = %file.name, "file selected");
            state.file = Some(file);
            state.error = None;
            Ok(())
        } else {
            warn!(file = %file.name, "rejected unsupported file type");
            state.file = None;
            state.error = Some(UNSUPPORTED_TYPE_MESSAGE.to_owned());
            Err(ControllerError::UnsupportedType)
        }
    }

    /// Extract the selected file's text on the server.
    pub async fn extract(&self) -> Result<String, ControllerError> {
        let (_in_flight, file) = self.begin(Action::Extract, |state| {
            let file = state.file.clone().ok_or(ControllerError::NoFile)?;
            state.error = None;
            state.text = None;
            Ok(file)
        })?;

        match self.api.extract(&file).await {
            Ok(text) => {
                info!(file = %file.name, chars = text.chars().count(), "text extracted");
                self.lock().text = Some(text.clone());
                Ok(text)
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// Save the extracted text locally; no server call.
    pub async fn download_text(&self) -> Result<PathBuf, ControllerError> {
        let (text, name) = {
            let state = self.lock();
            let text = state
                .text
                .clone()
                .filter(|text| !text.is_empty())
                .ok_or(ControllerError::NoText)?;
            let name = derived_name(state.file.as_ref(), SelectedFile::text_download_name);
            (text, name)
        };
        save(&self.downloads, &name, text.into_bytes()).await
    }

    /// Convert the extracted text to a spreadsheet on the server and save it.
    pub async fn download_excel(&self) -> Result<PathBuf, ControllerError> {
        let (_in_flight, (text, name)) = self.begin(Action::Export, |state| {
            let text = state
                .text
                .clone()
                .filter(|text| !text.is_empty())
                .ok_or(ControllerError::NoText)?;
            let name = derived_name(state.file.as_ref(), SelectedFile::excel_download_name);
            Ok((text, name))
        })?;

        let bytes = match self.api.convert_to_excel(&text).await {
            Ok(bytes) => bytes,
            Err(error) => return Err(self.fail(error.into())),
        };
        save(&self.downloads, &name, bytes)
            .await
            .map_err(|error| self.fail(error))
    }

    /// Convert the selected file through the server's script path and save
    /// the spreadsheet.
    pub async fn python_extract(&self) -> Result<PathBuf, ControllerError> {
        let (_in_flight, file) = self.begin(Action::SubprocessExtract, |state| {
            let file = state.file.clone().ok_or(ControllerError::NoFile)?;
            state.error = None;
            Ok(file)
        })?;

        let bytes = match self.api.python_extract(&file).await {
            Ok(bytes) => bytes,
            Err(error) => return Err(self.fail(error.into())),
        };
        save(&self.downloads, &file.excel_download_name(), bytes)
            .await
            .map_err(|error| self.fail(error))
    }

    /// Check preconditions and raise `action`'s flag under one lock.
    fn begin<T>(
        &self,
        action: Action,
        precondition: impl FnOnce(&mut ControllerState) -> Result<T, ControllerError>,
    ) -> Result<(InFlight<'_>, T), ControllerError> {
        let mut state = self.lock();
        if *state.flag(action) {
            return Err(ControllerError::Busy(action));
        }
        let value = precondition(&mut state)?;
        *state.flag(action) = true;
        drop(state);

        Ok((
            InFlight {
                controller: self,
                action,
            },
            value,
        ))
    }

    fn fail(&self, error: ControllerError) -> ControllerError {
        warn!("{error}");
        self.lock().error = Some(error.to_string());
        error
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn derived_name(file: Option<&SelectedFile>, name: fn(&SelectedFile) -> String) -> String {
    match file {
        Some(file) => name(file),
        None => name(&SelectedFile::new("document", Vec::new())),
    }
}

/// Write `bytes` to `dir/name` atomically, so a failed save never leaves a
/// partial file behind.
async fn save(dir: &Path, name: &str, bytes: Vec<u8>) -> Result<PathBuf, ControllerError> {
    let dir = dir.to_path_buf();
    let path = dir.join(name);
    let target = path.clone();

    let written = tokio::task::spawn_blocking(move || -> io::Result<()> {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new_in(&dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        file.persist(&target).map_err(|error| error.error)?;
        Ok(())
    })
    .await
    .map_err(io::Error::other)
    .and_then(|result| result);

    match written {
        Ok(()) => {
            info!(path = %path.display(), "saved download");
            Ok(path)
        }
        Err(source) => Err(ControllerError::Save { path, source }),
    }
}
