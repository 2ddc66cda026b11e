// src/metadata.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FILE_NUMBER_WARNING: &str =
    "File number is NOT the shutter count; it may reset and depends on the card and camera settings";

pub const NO_SHUTTER_SOURCE: &str = "none";

// Key order is the backend's output order; first-match lookups depend on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMetadata(Map<String, Value>);

impl RawMetadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawMetadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for RawMetadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers truncate toward zero; strings must be all ASCII digits.
pub fn value_as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentCheck {
    pub real_file_type: Option<String>,
    pub mime_type: Option<String>,
    pub file_type_mismatch: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraIdentity {
    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub serial_number: Option<String>,
    pub internal_serial: Option<String>,
    pub firmware: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureTimes {
    pub datetime_original: Option<String>,
    pub datetime_digitized: Option<String>,
    pub file_modify_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutterData {
    pub count: Option<u64>,
    pub source: String,
    pub present: bool,
}

impl Default for ShutterData {
    fn default() -> Self {
        Self {
            count: None,
            source: NO_SHUTTER_SOURCE.to_string(),
            present: false,
        }
    }
}

impl ShutterData {
    pub fn found(count: u64, source: impl Into<String>) -> Self {
        Self {
            count: Some(count),
            source: source.into(),
            present: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNumbering {
    pub file_number_hint: Option<u64>,
    pub file_number_warning: String,
    pub directory_number: Option<u64>,
    pub image_unique_id: Option<String>,
}

impl Default for FileNumbering {
    fn default() -> Self {
        Self {
            file_number_hint: None,
            file_number_warning: FILE_NUMBER_WARNING.to_string(),
            directory_number: None,
            image_unique_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingFlags {
    pub software: Option<String>,
    pub processing_software: Option<String>,
    pub not_out_of_camera: bool,
    pub editing_detected_warning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShootingParams {
    pub iso: Option<u64>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub focal_length: Option<String>,
    pub image_width: Option<u64>,
    pub image_height: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size_bytes: u64,
    pub content: ContentCheck,
    pub camera: CameraIdentity,
    pub timing: CaptureTimes,
    pub shutter: ShutterData,
    pub numbering: FileNumbering,
    pub processing: ProcessingFlags,
    pub shooting: ShootingParams,
    pub integrity_notes: Vec<String>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_metadata: Option<RawMetadata>,
}

impl FileAnalysis {
    pub fn new(file_name: String, file_path: String, file_type: String, file_size_bytes: u64) -> Self {
        Self {
            file_name,
            file_path,
            file_type,
            file_size_bytes,
            content: ContentCheck::default(),
            camera: CameraIdentity::default(),
            timing: CaptureTimes::default(),
            shutter: ShutterData::default(),
            numbering: FileNumbering::default(),
            processing: ProcessingFlags::default(),
            shooting: ShootingParams::default(),
            integrity_notes: Vec::new(),
            errors: Vec::new(),
            raw_metadata: None,
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    LikelySameCamera,
    Inconclusive,
    Suspicious,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::LikelySameCamera => "LIKELY_SAME_CAMERA",
            Verdict::Inconclusive => "INCONCLUSIVE",
            Verdict::Suspicious => "SUSPICIOUS",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub file1: String,
    pub file2: String,
    pub verdict: Verdict,
    pub reasons: Vec<String>,
    pub same_camera_model: bool,
    pub same_serial_number: Option<bool>,
    pub same_firmware: Option<bool>,
    pub time_sequence_valid: Option<bool>,
    pub file_number_sequence_valid: Option<bool>,
    pub time_difference_seconds: Option<f64>,
}
