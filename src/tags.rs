use crate::metadata::RawMetadata;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    FileType,
    MimeType,
    Make,
    Model,
    LensModel,
    SerialNumber,
    InternalSerial,
    Firmware,
    DateTimeOriginal,
    DateTimeDigitized,
    FileModifyDate,
    FileNumber,
    DirectoryNumber,
    ImageUniqueId,
    Software,
    ProcessingSoftware,
    Iso,
    Aperture,
    ShutterSpeed,
    FocalLength,
    ImageWidth,
    ImageHeight,
    OriginalImageWidth,
    OriginalImageHeight,
    CreatorTool,
}

impl TagField {
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            TagField::FileType => &["FileType", "File:FileType"],
            TagField::MimeType => &["MIMEType", "File:MIMEType"],
            TagField::Make => &["Make", "EXIF:Make"],
            TagField::Model => &["Model", "EXIF:Model", "Camera Model Name"],
            TagField::LensModel => &["LensModel", "Lens", "LensType", "EXIF:LensModel"],
            TagField::SerialNumber => &[
                "SerialNumber",
                "CameraSerialNumber",
                "InternalSerialNumber",
                "Canon:SerialNumber",
                "EXIF:SerialNumber",
            ],
            TagField::InternalSerial => &["InternalSerialNumber", "Canon:InternalSerialNumber"],
            TagField::Firmware => &["Firmware", "FirmwareVersion", "Software"],
            TagField::DateTimeOriginal => &["DateTimeOriginal", "EXIF:DateTimeOriginal", "CreateDate"],
            TagField::DateTimeDigitized => &["DateTimeDigitized", "EXIF:DateTimeDigitized"],
            TagField::FileModifyDate => &["FileModifyDate", "File:FileModifyDate"],
            TagField::FileNumber => &["FileNumber", "Canon:FileNumber", "FileIndex"],
            TagField::DirectoryNumber => &["DirectoryIndex", "Canon:DirectoryIndex"],
            TagField::ImageUniqueId => &["ImageUniqueID", "EXIF:ImageUniqueID"],
            TagField::Software => &["Software", "EXIF:Software"],
            TagField::ProcessingSoftware => &["ProcessingSoftware", "EXIF:ProcessingSoftware"],
            TagField::Iso => &["ISO", "EXIF:ISO"],
            TagField::Aperture => &["FNumber", "Aperture", "ApertureValue"],
            TagField::ShutterSpeed => &["ExposureTime", "ShutterSpeed", "ShutterSpeedValue"],
            TagField::FocalLength => &["FocalLength", "EXIF:FocalLength"],
            TagField::ImageWidth => &["ImageWidth", "ExifImageWidth"],
            TagField::ImageHeight => &["ImageHeight", "ExifImageHeight"],
            TagField::OriginalImageWidth => &["OriginalImageWidth"],
            TagField::OriginalImageHeight => &["OriginalImageHeight"],
            TagField::CreatorTool => &["XMP:CreatorTool", "CreatorTool"],
        }
    }
}

// Tie-break order: Canon first, generic last.
pub const SHUTTER_COUNT_TAGS: &[&str] = &[
    // Canon
    "ShutterCount",
    "ImageCount",
    "ShutterCounter",
    "Canon:ShutterCount",
    "Canon:ImageCount",
    "MakerNotes:ShutterCount",
    "MakerNotes:ImageCount",
    // Nikon
    "ShutterCount",
    "Nikon:ShutterCount",
    // Sony
    "ImageCount",
    "ReleaseMode2",
    "Sony:ImageCount",
    // Pentax
    "ShutterCount",
    "Pentax:ShutterCount",
    // Generic
    "ActuationCount",
    "ImageNumber",
];

pub const KNOWN_EDITORS: &[&str] = &[
    "lightroom", "photoshop", "adobe", "camera raw",
    "capture one", "dxo", "luminar", "affinity",
    "gimp", "darktable", "rawtherapee",
    "snapseed", "vsco", "instagram", "telegram",
    "whatsapp", "facebook", "vkontakte", "vk",
    "messenger", "viber", "signal",
];

pub fn expected_types(extension: &str) -> Option<&'static [&'static str]> {
    let types: &'static [&'static str] = match extension.to_lowercase().as_str() {
        "cr2" => &["CR2"],
        "cr3" => &["CR3"],
        "jpg" | "jpeg" => &["JPEG", "JPG"],
        "nef" => &["NEF"],
        "arw" => &["ARW"],
        "orf" => &["ORF"],
        "rw2" => &["RW2"],
        "dng" => &["DNG"],
        _ => return None,
    };
    Some(types)
}

/// First candidate present, as an exact key or a case-insensitive `Group:<candidate>` suffix.
pub fn resolve<'a>(metadata: &'a RawMetadata, candidates: &[&str]) -> Option<&'a Value> {
    for candidate in candidates {
        if let Some(value) = metadata.get(candidate) {
            log::trace!("Resolved {} by exact key", candidate);
            return Some(value);
        }
        let suffix = format!(":{}", candidate.to_lowercase());
        let found = metadata
            .iter()
            .find(|(key, _)| key.as_str() == *candidate || key.to_lowercase().ends_with(&suffix));
        if let Some((key, value)) = found {
            log::trace!("Resolved {} via qualified key {}", candidate, key);
            return Some(value);
        }
    }
    None
}

pub fn resolve_field(metadata: &RawMetadata, field: TagField) -> Option<&Value> {
    resolve(metadata, field.candidates())
}
