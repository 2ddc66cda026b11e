use crate::config::AppConfig;
use crate::error::AppError;
use crate::metadata::RawMetadata;
use serde_json::{Map, Value};
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::Runtime;

pub trait MetadataBackend: Send + Sync {
    fn extract(&self, path: &Path) -> Result<RawMetadata, AppError>;
}

pub struct ExifTool {
    program: String,
    version: String,
    timeout: Duration,
    runtime: Runtime,
}

impl ExifTool {
    // Any failure here is fatal for the session.
    pub fn probe(config: &AppConfig) -> Result<Self, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("exiftool-io")
            .enable_all()
            .build()?;
        let program = config.exiftool_path.clone();
        log::debug!("Probing metadata backend at {}", program);

        let probe = runtime.block_on(run_with_timeout(
            Command::new(&program).arg("-ver"),
            config.probe_timeout(),
        ));

        let output = match probe {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::BackendUnavailable(format!(
                    "ExifTool not found at '{}'. Install it:\n  \
                     Windows: download from https://exiftool.org/ and add it to PATH\n  \
                     Linux: sudo apt install libimage-exiftool-perl\n  \
                     macOS: brew install exiftool",
                    program
                )))
            }
            Ok(Err(e)) => return Err(AppError::BackendUnavailable(format!("{}: {}", program, e))),
            Err(_) => {
                return Err(AppError::BackendUnavailable(format!(
                    "ExifTool did not respond within {}s",
                    config.probe_timeout_secs
                )))
            }
        };

        if !output.status.success() {
            return Err(AppError::BackendUnavailable(format!(
                "ExifTool returned error: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        log::info!("Using ExifTool {} ({})", version, program);
        Ok(Self {
            program,
            version,
            timeout: config.extract_timeout(),
            runtime,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl MetadataBackend for ExifTool {
    fn extract(&self, path: &Path) -> Result<RawMetadata, AppError> {
        log::trace!("Running ExifTool on {:?}", path);
        // -j JSON, -G group names, -a duplicates, -u unknown tags, -n numeric values
        let result = self.runtime.block_on(run_with_timeout(
            Command::new(&self.program)
                .args(["-j", "-G", "-a", "-u", "-n"])
                .arg(path),
            self.timeout,
        ));

        match result {
            Err(_) => Err(AppError::Timeout {
                path: path.display().to_string(),
                secs: self.timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(AppError::Extraction(format!("ExifTool could not be run: {}", e))),
            Ok(Ok(output)) => parse_output(&output),
        }
    }
}

async fn run_with_timeout(
    command: &mut Command,
    limit: Duration,
) -> Result<std::io::Result<Output>, tokio::time::error::Elapsed> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    tokio::time::timeout(limit, command.output()).await
}

// ExifTool exits non-zero on minor warnings while still emitting JSON.
pub fn parse_output(output: &Output) -> Result<RawMetadata, AppError> {
    parse_json_payload(output.status.success(), &output.stdout, &output.stderr)
}

pub(crate) fn parse_json_payload(
    success: bool,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<RawMetadata, AppError> {
    let stdout = String::from_utf8_lossy(stdout);
    if !success && stdout.trim().is_empty() {
        return Err(AppError::Extraction(format!(
            "ExifTool error: {}",
            String::from_utf8_lossy(stderr).trim()
        )));
    }

    let records: Vec<Map<String, Value>> = serde_json::from_str(&stdout)
        .map_err(|e| AppError::Extraction(format!("Failed to parse ExifTool JSON: {}", e)))?;

    Ok(records.into_iter().next().map(RawMetadata::from).unwrap_or_default())
}
