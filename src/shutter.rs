use crate::metadata::{value_as_count, RawMetadata, NO_SHUTTER_SOURCE};
use crate::tags::SHUTTER_COUNT_TAGS;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref CAMERA_PREFIX_NUMBER: Regex =
        Regex::new(r"(?i)(?:IMG|DSC|_MG|_DSC)_?(\d+)").expect("valid camera prefix pattern");
    static ref BARE_NUMBER_BEFORE_EXT: Regex =
        Regex::new(r"(?i)(\d{4,})\.(?:jpg|jpeg|cr2|cr3|nef|arw|orf|rw2|dng)")
            .expect("valid bare number pattern");
}

/// Returns the count and the key it came from, or `(None, "none")`.
pub fn find_shutter_count(metadata: &RawMetadata) -> (Option<u64>, String) {
    for tag in SHUTTER_COUNT_TAGS {
        let tag_lower = tag.to_lowercase();
        let tag_leaf = tag_lower.rsplit(':').next().unwrap_or(&tag_lower);
        let leaf_suffix = format!(":{}", tag_leaf);

        for (key, value) in metadata.iter() {
            let key_lower = key.to_lowercase();
            if !key_lower.contains(&tag_lower) && !key_lower.ends_with(&leaf_suffix) {
                continue;
            }
            if let Some(count) = positive_count(value) {
                log::debug!("Shutter count {} accepted from {} (pattern {})", count, key, tag);
                return (Some(count), key.clone());
            }
            log::trace!("Ignoring {} = {} for pattern {}", key, value, tag);
        }
    }
    (None, NO_SHUTTER_SOURCE.to_string())
}

fn positive_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(_) | Value::String(_) => value_as_count(value).filter(|n| *n > 0),
        _ => None,
    }
}

/// Extracts a sequence number from camera-style filenames (`IMG_1234.CR2` -> 1234).
pub fn file_number_from_name(file_name: &str) -> Option<u64> {
    [&*CAMERA_PREFIX_NUMBER, &*BARE_NUMBER_BEFORE_EXT]
        .iter()
        .find_map(|re| re.captures(file_name))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
