use crate::bridge::{BridgeConfig, DEFAULT_INTERPRETER, DEFAULT_SCRIPT};
use crate::client::DEFAULT_SERVER;
use crate::server::{DEFAULT_ADDR, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "doc2sheet", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print a JSON description of the service and exit
    #[arg(long)]
    pub describe: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP extraction server
    Serve(ServeArgs),
    /// Extract a document's text through a running server
    Extract {
        /// Document to extract (pdf, docx, html, txt)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        client: ClientArgs,

        /// Save the text as <name>_extracted.txt instead of printing it
        #[arg(long)]
        save_text: bool,

        /// Also convert the text to <name>_extracted.xlsx
        #[arg(long)]
        excel: bool,
    },
    /// Convert a document with the server's extraction script
    PythonExtract {
        /// Document to convert
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        client: ClientArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "DOC2SHEET_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Program that runs the extraction script (looked up on PATH)
    #[arg(long, env = "DOC2SHEET_INTERPRETER", default_value = DEFAULT_INTERPRETER)]
    pub interpreter: String,

    /// Extraction script, relative to the working directory
    #[arg(long, env = "DOC2SHEET_SCRIPT", default_value = DEFAULT_SCRIPT)]
    pub script: PathBuf,

    /// Directory for per-request workspaces (default: OS temp dir)
    #[arg(long, env = "DOC2SHEET_TEMP_ROOT")]
    pub temp_root: Option<PathBuf>,

    /// Seconds the extraction script may run before it is killed
    #[arg(long, env = "DOC2SHEET_SCRIPT_TIMEOUT", default_value_t = 300)]
    pub script_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[arg(long, env = "DOC2SHEET_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Include diagnostic details in error responses (development only)
    #[arg(long, env = "DOC2SHEET_EXPOSE_DETAILS")]
    pub expose_details: bool,
}

impl ServeArgs {
    pub fn to_config(&self) -> ServerConfig {
        ServerConfig {
            addr: self.addr.clone(),
            bridge: BridgeConfig {
                interpreter: self.interpreter.clone(),
                script: self.script.clone(),
                temp_root: self.temp_root.clone(),
                timeout: Duration::from_secs(self.script_timeout_secs),
            },
            max_upload_bytes: self.max_upload_bytes,
            expose_details: self.expose_details,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Base URL of the extraction server
    #[arg(long, env = "DOC2SHEET_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Directory downloads are saved into
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,
}
