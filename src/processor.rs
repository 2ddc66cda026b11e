use crate::backend::MetadataBackend;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::metadata::{value_as_count, value_as_text, FileAnalysis, RawMetadata, ShutterData};
use crate::shutter::{file_number_from_name, find_shutter_count};
use crate::tags::{expected_types, resolve_field, TagField, KNOWN_EDITORS};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SHUTTER_ABSENT_NOTE: &str = "Shutter count not present in metadata; it cannot be determined from this file. \
     This is common for Canon bodies (EOS 200D, 600D, 700D and others).";

const RESIZE_NOTE: &str = "Image dimensions differ from the original; the file was probably exported or resized";

pub struct Analyzer {
    config: Arc<AppConfig>,
    backend: Arc<dyn MetadataBackend>,
    pool: ThreadPool,
}

impl Analyzer {
    pub fn new(config: Arc<AppConfig>, backend: Arc<dyn MetadataBackend>) -> Result<Self, AppError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.num_workers.max(1))
            .thread_name(|i| format!("analyzer-{}", i))
            .build()
            .map_err(|e| AppError::Generic(format!("Failed to build worker pool: {}", e)))?;
        log::debug!("Analyzer ready with {} workers", config.num_workers.max(1));
        Ok(Self { config, backend, pool })
    }

    // Never fails: problems land in the record's `errors`.
    pub fn analyze_file(&self, path: &Path, include_raw_metadata: bool) -> FileAnalysis {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_path = std::path::absolute(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .to_string_lossy()
            .to_string();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let mut analysis = FileAnalysis::new(file_name, file_path, extension, size);

        if !self.config.is_supported(path) {
            let shown = if analysis.file_type.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", analysis.file_type)
            };
            log::debug!("Rejecting {:?}: unsupported extension", path);
            analysis.errors.push(AppError::UnsupportedFileType(shown).to_string());
            return analysis;
        }

        let metadata = match self.backend.extract(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Failed to read metadata for {:?}: {}", path, e);
                analysis.errors.push(format!("Failed to read metadata: {}", e));
                return analysis;
            }
        };
        log::trace!("{} tags extracted from {:?}", metadata.len(), path);

        populate(&mut analysis, &metadata);

        if include_raw_metadata {
            analysis.raw_metadata = Some(metadata);
        }
        analysis
    }

    pub fn analyze_directory(
        &self,
        directory: &Path,
        include_raw_metadata: bool,
    ) -> Result<Vec<FileAnalysis>, AppError> {
        let (paths_tx, paths_rx) = crossbeam_channel::unbounded();

        let paths: Vec<PathBuf> = std::thread::scope(|s| {
            let walker = s.spawn(|| {
                crate::walker::start_walking(directory, &self.config.supported_extensions, paths_tx)
            });
            let paths: Vec<PathBuf> = paths_rx.iter().collect();
            walker
                .join()
                .map_err(|_| AppError::Generic("File discovery thread panicked".to_string()))?
                .map(|_| paths)
        })?;
        log::info!("Analyzing {} files from {:?}", paths.len(), directory);

        let mut results: Vec<FileAnalysis> = self.pool.install(|| {
            paths
                .par_iter()
                .map(|path| self.analyze_file(path, include_raw_metadata))
                .collect()
        });

        sort_by_capture_time(&mut results);
        log::info!("All files analyzed.");
        Ok(results)
    }
}

// Missing timestamps sort as ""; file name breaks ties.
pub fn sort_by_capture_time(results: &mut [FileAnalysis]) {
    results.sort_by(|a, b| {
        let ta = a.timing.datetime_original.as_deref().unwrap_or("");
        let tb = b.timing.datetime_original.as_deref().unwrap_or("");
        ta.cmp(tb).then_with(|| a.file_name.cmp(&b.file_name))
    });
}

fn text(metadata: &RawMetadata, field: TagField) -> Option<String> {
    resolve_field(metadata, field).and_then(value_as_text)
}

fn count(metadata: &RawMetadata, field: TagField) -> Option<u64> {
    resolve_field(metadata, field).and_then(value_as_count)
}

fn populate(analysis: &mut FileAnalysis, metadata: &RawMetadata) {
    check_content_type(analysis, metadata);

    let camera = &mut analysis.camera;
    camera.make = text(metadata, TagField::Make);
    camera.model = text(metadata, TagField::Model);
    camera.lens_model = text(metadata, TagField::LensModel);
    camera.serial_number = text(metadata, TagField::SerialNumber);
    camera.internal_serial = text(metadata, TagField::InternalSerial);
    camera.firmware = text(metadata, TagField::Firmware);

    let timing = &mut analysis.timing;
    timing.datetime_original = text(metadata, TagField::DateTimeOriginal);
    timing.datetime_digitized = text(metadata, TagField::DateTimeDigitized);
    timing.file_modify_date = text(metadata, TagField::FileModifyDate);

    analysis.shutter = match find_shutter_count(metadata) {
        (Some(n), source) => ShutterData::found(n, source),
        (None, _) => {
            analysis.integrity_notes.push(SHUTTER_ABSENT_NOTE.to_string());
            ShutterData::default()
        }
    };

    // A metadata counter outranks whatever the filename suggests.
    let numbering = &mut analysis.numbering;
    numbering.file_number_hint = file_number_from_name(&analysis.file_name);
    if let Some(n) = resolve_field(metadata, TagField::FileNumber).and_then(numeric_counter) {
        numbering.file_number_hint = Some(n);
    }
    numbering.directory_number = count(metadata, TagField::DirectoryNumber);
    numbering.image_unique_id = text(metadata, TagField::ImageUniqueId);

    let processing = &mut analysis.processing;
    processing.software = text(metadata, TagField::Software);
    processing.processing_software = text(metadata, TagField::ProcessingSoftware);
    if let Some(warning) = detect_editor(
        processing.software.as_deref(),
        processing.processing_software.as_deref(),
    ) {
        processing.not_out_of_camera = true;
        processing.editing_detected_warning = Some(warning.clone());
        analysis.integrity_notes.push(warning);
    }

    let shooting = &mut analysis.shooting;
    shooting.iso = count(metadata, TagField::Iso);
    shooting.aperture = text(metadata, TagField::Aperture);
    shooting.shutter_speed = text(metadata, TagField::ShutterSpeed);
    shooting.focal_length = text(metadata, TagField::FocalLength);
    shooting.image_width = count(metadata, TagField::ImageWidth);
    shooting.image_height = count(metadata, TagField::ImageHeight);

    let original_width = count(metadata, TagField::OriginalImageWidth).filter(|n| *n > 0);
    let original_height = count(metadata, TagField::OriginalImageHeight).filter(|n| *n > 0);
    if let (Some(ow), Some(oh)) = (original_width, original_height) {
        let width = analysis.shooting.image_width.filter(|n| *n > 0);
        if width.is_some() && (width != Some(ow) || analysis.shooting.image_height != Some(oh)) {
            analysis.integrity_notes.push(RESIZE_NOTE.to_string());
        }
    }

    if let Some(tool) = text(metadata, TagField::CreatorTool) {
        analysis.integrity_notes.push(format!("XMP CreatorTool: {}", tool));
    }
}

fn check_content_type(analysis: &mut FileAnalysis, metadata: &RawMetadata) {
    let content = &mut analysis.content;
    content.real_file_type = text(metadata, TagField::FileType);
    content.mime_type = text(metadata, TagField::MimeType);

    let (Some(expected), Some(real)) = (expected_types(&analysis.file_type), content.real_file_type.as_deref())
    else {
        return;
    };
    if expected.iter().any(|t| t.eq_ignore_ascii_case(real)) {
        return;
    }

    let declared = analysis.file_type.to_uppercase();
    log::warn!("{}: extension {} but content is {}", analysis.file_name, declared, real);
    content.file_type_mismatch = true;
    analysis.errors.push(format!(
        "File extension ({}) does NOT match the real file type ({})! This is not a genuine {} file.",
        declared, real, declared
    ));
    analysis.integrity_notes.push(format!(
        "File has extension .{} but is actually {} ({})",
        analysis.file_type,
        real,
        content.mime_type.as_deref().unwrap_or("unknown MIME type")
    ));
}

fn numeric_counter(value: &Value) -> Option<u64> {
    match value {
        Value::Number(_) => value_as_count(value).filter(|n| *n > 0),
        _ => None,
    }
}

pub fn detect_editor(software: Option<&str>, processing: Option<&str>) -> Option<String> {
    let combined = [software, processing]
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    KNOWN_EDITORS
        .iter()
        .find(|editor| combined.contains(*editor))
        .map(|editor| {
            format!(
                "Detected editor/platform: {}. Metadata may have been altered or stripped.",
                title_case(editor)
            )
        })
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_detection_names_first_match() {
        let warning = detect_editor(Some("Adobe Photoshop Lightroom Classic 13.1"), None).unwrap();
        assert!(warning.contains("Lightroom"));
    }

    #[test]
    fn editor_detection_reads_processing_software() {
        let warning = detect_editor(Some("Firmware Version 1.0.1"), Some("Capture One 23")).unwrap();
        assert!(warning.contains("Capture One"));
    }

    #[test]
    fn camera_firmware_is_not_an_editor() {
        assert_eq!(detect_editor(Some("Firmware Version 1.1.0"), None), None);
        assert_eq!(detect_editor(None, None), None);
    }

    #[test]
    fn sort_puts_missing_timestamps_first() {
        let mut records = vec![
            FileAnalysis::new("b.jpg".into(), "/b.jpg".into(), "jpg".into(), 0),
            FileAnalysis::new("a.jpg".into(), "/a.jpg".into(), "jpg".into(), 0),
            FileAnalysis::new("c.jpg".into(), "/c.jpg".into(), "jpg".into(), 0),
        ];
        records[0].timing.datetime_original = Some("2024:01:15 14:35:00".into());
        records[2].timing.datetime_original = Some("2024:01:15 14:30:00".into());
        sort_by_capture_time(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg", "b.jpg"]);
    }
}
