use crate::error::AppError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn start_walking(
    directory: &Path,
    allowed_extensions: &HashSet<String>,
    paths_tx: crossbeam_channel::Sender<PathBuf>,
) -> Result<(), AppError> {
    log::info!("Starting file discovery in {:?}", directory);
    log::debug!("Configured allowed extensions: {:?}", allowed_extensions);

    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {:?}: {}", directory, e);
                continue;
            }
        };
        if entry.file_type().is_file() {
            let path = entry.path();
            if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                if allowed_extensions.contains(&ext.to_lowercase()) {
                    log::debug!("Queueing file for analysis: {:?}", path);
                    paths_tx.send(path.to_path_buf())?;
                } else {
                    log::trace!("Skipping file due to unsupported extension: {:?}", path);
                }
            } else {
                log::trace!("Skipping file with no extension: {:?}", path);
            }
        } else {
            log::trace!("Skipping non-file entry: {:?}", entry.path());
        }
    }

    log::info!("File discovery complete.");
    Ok(())
}
