mod common;

use common::{analyzer, FixtureBackend};
use serde_json::json;
use shutter_inspector::metadata::FILE_NUMBER_WARNING;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn canon_raw() -> serde_json::Value {
    json!({
        "SourceFile": "IMG_1234.CR2",
        "File:FileType": "CR2",
        "File:MIMEType": "image/x-canon-cr2",
        "File:FileModifyDate": "2024:01:20 10:00:00+03:00",
        "EXIF:Make": "Canon",
        "EXIF:Model": "Canon EOS 5D Mark IV",
        "EXIF:Software": "Firmware Version 1.3.2",
        "EXIF:SerialNumber": "012345678901",
        "EXIF:LensModel": "EF24-70mm f/2.8L II USM",
        "EXIF:DateTimeOriginal": "2024:01:15 14:30:00",
        "EXIF:ISO": 400,
        "EXIF:FNumber": 5.6,
        "EXIF:ExposureTime": 0.004,
        "EXIF:FocalLength": 50,
        "EXIF:ImageWidth": 6720,
        "EXIF:ImageHeight": 4480,
        "MakerNotes:FirmwareVersion": "1.3.2",
        "MakerNotes:ShutterCount": 48211,
        "MakerNotes:FileNumber": 1299,
        "MakerNotes:DirectoryIndex": 100,
        "EXIF:ImageUniqueID": "abcdef0123456789"
    })
}

#[test]
fn canon_raw_is_fully_resolved() {
    let backend = Arc::new(FixtureBackend::default().with("IMG_1234.CR2", canon_raw()));
    let a = analyzer(backend).analyze_file(Path::new("IMG_1234.CR2"), false);

    assert!(a.errors.is_empty(), "{:?}", a.errors);
    assert_eq!(a.file_type, "cr2");
    assert_eq!(a.file_size_bytes, 0);
    assert!(!a.content.file_type_mismatch);
    assert_eq!(a.camera.make.as_deref(), Some("Canon"));
    assert_eq!(a.camera.model.as_deref(), Some("Canon EOS 5D Mark IV"));
    assert_eq!(a.camera.serial_number.as_deref(), Some("012345678901"));
    assert_eq!(a.camera.firmware.as_deref(), Some("1.3.2"));
    assert_eq!(a.timing.datetime_original.as_deref(), Some("2024:01:15 14:30:00"));
    assert_eq!(a.shutter.count, Some(48211));
    assert!(a.shutter.present);
    assert_eq!(a.shutter.source, "MakerNotes:ShutterCount");
    assert_eq!(a.numbering.file_number_hint, Some(1299));
    assert_eq!(a.numbering.file_number_warning, FILE_NUMBER_WARNING);
    assert_eq!(a.numbering.directory_number, Some(100));
    assert_eq!(a.shooting.iso, Some(400));
    assert_eq!(a.shooting.aperture.as_deref(), Some("5.6"));
    assert_eq!(a.shooting.image_width, Some(6720));
    assert!(!a.processing.not_out_of_camera);
    assert!(a.integrity_notes.is_empty(), "{:?}", a.integrity_notes);
    assert!(a.raw_metadata.is_none());
}

#[test]
fn raw_metadata_is_attached_on_request() {
    let backend = Arc::new(FixtureBackend::default().with("IMG_1234.CR2", canon_raw()));
    let a = analyzer(backend).analyze_file(Path::new("IMG_1234.CR2"), true);
    let raw = a.raw_metadata.expect("raw metadata requested");
    assert_eq!(raw.get("MakerNotes:ShutterCount"), Some(&json!(48211)));
}

#[test]
fn renamed_jpeg_is_flagged_as_mismatch() {
    let backend = Arc::new(FixtureBackend::default().with(
        "photo.cr2",
        json!({"File:FileType": "JPEG", "File:MIMEType": "image/jpeg", "EXIF:Make": "Canon"}),
    ));
    let a = analyzer(backend).analyze_file(Path::new("photo.cr2"), false);

    assert!(a.content.file_type_mismatch);
    assert_eq!(a.content.real_file_type.as_deref(), Some("JPEG"));
    assert!(a.errors.iter().any(|e| e.contains("CR2") && e.contains("JPEG")));
    assert!(a.integrity_notes.iter().any(|n| n.contains(".cr2") && n.contains("image/jpeg")));
    assert_eq!(a.camera.make.as_deref(), Some("Canon"));
}

#[test]
fn detected_type_comparison_ignores_case() {
    let backend = Arc::new(FixtureBackend::default().with("a.jpeg", json!({"File:FileType": "jpeg"})));
    let a = analyzer(backend).analyze_file(Path::new("a.jpeg"), false);
    assert!(!a.content.file_type_mismatch);
}

#[test]
fn unsupported_extension_skips_backend() {
    let backend = Arc::new(FixtureBackend::default());
    let a = analyzer(backend.clone()).analyze_file(Path::new("notes.txt"), false);
    assert_eq!(a.errors, vec!["Unsupported file type: .txt".to_string()]);
    assert_eq!(backend.calls(), 0);
    assert_eq!(a.shutter.source, "none");
}

#[test]
fn backend_failure_is_captured_in_record() {
    let backend = Arc::new(FixtureBackend::default().failing("IMG_0001.NEF", "ExifTool error: boom"));
    let a = analyzer(backend).analyze_file(Path::new("IMG_0001.NEF"), false);
    assert_eq!(a.errors.len(), 1);
    assert!(a.errors[0].contains("boom"));
    assert!(a.is_partial());
    assert!(a.camera.make.is_none());
}

#[test]
fn missing_shutter_count_adds_note() {
    let backend = Arc::new(FixtureBackend::default().with(
        "IMG_0042.JPG",
        json!({"File:FileType": "JPEG", "EXIF:Make": "Canon", "MakerNotes:ShutterCount": 0}),
    ));
    let a = analyzer(backend).analyze_file(Path::new("IMG_0042.JPG"), false);
    assert_eq!(a.shutter.count, None);
    assert!(!a.shutter.present);
    assert_eq!(a.shutter.source, "none");
    assert!(a.integrity_notes.iter().any(|n| n.contains("Shutter count not present") && n.contains("Canon")));
    assert_eq!(a.numbering.file_number_hint, Some(42));
}

#[test]
fn file_number_never_feeds_shutter_count() {
    let backend = Arc::new(FixtureBackend::default().with(
        "DSC_0007.JPG",
        json!({"File:FileType": "JPEG", "MakerNotes:FileNumber": 7007}),
    ));
    let a = analyzer(backend).analyze_file(Path::new("DSC_0007.JPG"), false);
    assert_eq!(a.numbering.file_number_hint, Some(7007));
    assert_eq!(a.shutter.count, None);
}

#[test]
fn editor_and_xmp_notes() {
    let backend = Arc::new(FixtureBackend::default().with(
        "export.jpg",
        json!({
            "File:FileType": "JPEG",
            "EXIF:Software": "Adobe Photoshop Lightroom Classic 13.1 (Windows)",
            "XMP:CreatorTool": "Adobe Photoshop Lightroom Classic 13.1 (Windows)",
            "EXIF:ExifImageWidth": 2048,
            "EXIF:ExifImageHeight": 1365,
            "MakerNotes:OriginalImageWidth": 6000,
            "MakerNotes:OriginalImageHeight": 4000
        }),
    ));
    let a = analyzer(backend).analyze_file(Path::new("export.jpg"), false);

    assert!(a.processing.not_out_of_camera);
    let warning = a.processing.editing_detected_warning.clone().unwrap();
    assert!(warning.contains("Lightroom"));
    assert_eq!(a.integrity_notes.iter().filter(|n| **n == warning).count(), 1);
    assert!(a.integrity_notes.iter().any(|n| n.contains("exported or resized")));
    assert!(a
        .integrity_notes
        .contains(&"XMP CreatorTool: Adobe Photoshop Lightroom Classic 13.1 (Windows)".to_string()));
    assert_eq!(a.numbering.file_number_hint, None);
}

#[test]
fn analysis_is_idempotent() {
    let backend = Arc::new(FixtureBackend::default().with("IMG_1234.CR2", canon_raw()));
    let analyzer = analyzer(backend);
    let first = analyzer.analyze_file(Path::new("IMG_1234.CR2"), true);
    let second = analyzer.analyze_file(Path::new("IMG_1234.CR2"), true);
    assert_eq!(first, second);
}

#[test]
fn directory_returns_supported_files_sorted_by_capture_time() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["IMG_0003.CR2", "IMG_0001.CR2", "IMG_0002.JPG", "notes.txt", "clip.mov"] {
        fs::write(dir.path().join(name), b"data").unwrap();
    }
    let backend = Arc::new(
        FixtureBackend::default()
            .with("IMG_0001.CR2", json!({"File:FileType": "CR2", "EXIF:DateTimeOriginal": "2024:01:15 14:35:00"}))
            .with("IMG_0003.CR2", json!({"File:FileType": "CR2", "EXIF:DateTimeOriginal": "2024:01:15 14:30:00"}))
            .failing("IMG_0002.JPG", "ExifTool timeout"),
    );

    let results = analyzer(backend.clone())
        .analyze_directory(dir.path(), false)
        .unwrap();

    let names: Vec<&str> = results.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["IMG_0002.JPG", "IMG_0003.CR2", "IMG_0001.CR2"]);
    assert_eq!(backend.calls(), 3);
    assert!(results[0].is_partial());
    assert_eq!(results[1].file_size_bytes, 4);
}

#[test]
fn missing_directory_is_reported_not_empty() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(FixtureBackend::default());
    let result = analyzer(backend).analyze_directory(&dir.path().join("gone"), false);
    assert!(matches!(result, Err(shutter_inspector::AppError::Walkdir(_))));
}
