use crate::metadata::{ComparisonResult, FileAnalysis, Verdict};
use crate::processor::Analyzer;
use chrono::NaiveDateTime;
use std::path::Path;

const EXIF_TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMatch {
    Same,
    Different,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub model: ModelMatch,
    pub same_serial: Option<bool>,
    pub time_sequence_valid: Option<bool>,
    pub file_number_sequence_valid: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub reduced_confidence: bool,
}

// First matching rule wins; mismatches always beat positive evidence.
pub fn decide(signals: &Signals) -> Decision {
    let decided = |verdict, reduced_confidence| Decision { verdict, reduced_confidence };

    if signals.model == ModelMatch::Different || signals.same_serial == Some(false) {
        return decided(Verdict::Suspicious, false);
    }
    let same_model = signals.model == ModelMatch::Same;
    if same_model && signals.same_serial == Some(true) {
        return decided(Verdict::LikelySameCamera, false);
    }
    if same_model
        && signals.time_sequence_valid == Some(true)
        && signals.file_number_sequence_valid == Some(true)
    {
        return decided(Verdict::LikelySameCamera, true);
    }
    decided(Verdict::Inconclusive, false)
}

pub fn compare_files(analyzer: &Analyzer, first: &Path, second: &Path) -> ComparisonResult {
    log::info!("Comparing {:?} against {:?}", first, second);
    let a = analyzer.analyze_file(first, false);
    let b = analyzer.analyze_file(second, false);
    compare(&a, &b)
}

/// `b` is expected to be the later shot.
pub fn compare(a: &FileAnalysis, b: &FileAnalysis) -> ComparisonResult {
    let mut reasons = Vec::new();

    let same_model = a.camera.make == b.camera.make
        && a.camera.model == b.camera.model
        && a.camera.make.is_some();
    let model = if same_model {
        reasons.push(format!(
            "✓ Same camera model: {} {}",
            a.camera.make.as_deref().unwrap_or_default(),
            a.camera.model.as_deref().unwrap_or_default()
        ));
        ModelMatch::Same
    } else if let (Some(ma), Some(mb)) = (&a.camera.model, &b.camera.model) {
        if ma != mb {
            reasons.push(format!("✗ DIFFERENT camera models: {} vs {}", ma, mb));
            ModelMatch::Different
        } else {
            ModelMatch::Unknown
        }
    } else {
        ModelMatch::Unknown
    };

    let same_serial = match (&a.camera.serial_number, &b.camera.serial_number) {
        (Some(sa), Some(sb)) if sa == sb => {
            reasons.push(format!("✓ Same serial number: {}", sa));
            Some(true)
        }
        (Some(sa), Some(sb)) => {
            reasons.push(format!("✗ DIFFERENT serial numbers: {} vs {}", sa, sb));
            Some(false)
        }
        _ => {
            reasons.push("⚠ Serial number not found in one or both files".to_string());
            None
        }
    };

    let same_firmware = match (&a.camera.firmware, &b.camera.firmware) {
        (Some(fa), Some(fb)) if fa == fb => {
            reasons.push(format!("✓ Same firmware: {}", fa));
            Some(true)
        }
        (Some(fa), Some(fb)) => {
            reasons.push(format!("⚠ Different firmware: {} vs {} (possibly updated)", fa, fb));
            Some(false)
        }
        _ => None,
    };

    let mut time_difference_seconds = None;
    let mut time_sequence_valid = None;
    if let (Some(ta), Some(tb)) = (&a.timing.datetime_original, &b.timing.datetime_original) {
        match (parse_capture_time(ta), parse_capture_time(tb)) {
            (Some(da), Some(db)) => {
                let delta = (db - da).num_milliseconds() as f64 / 1000.0;
                time_difference_seconds = Some(delta);
                if delta >= 0.0 {
                    reasons.push(format!(
                        "✓ Valid time sequence: file 2 was taken {:.0}s later",
                        delta.abs()
                    ));
                    time_sequence_valid = Some(true);
                } else {
                    reasons.push(format!(
                        "⚠ Reverse order: file 2 was taken {:.0}s EARLIER",
                        delta.abs()
                    ));
                    time_sequence_valid = Some(false);
                }
            }
            _ => reasons.push("⚠ Could not parse the capture date".to_string()),
        }
    }

    let mut file_number_sequence_valid = None;
    let hint_a = a.numbering.file_number_hint.filter(|n| *n > 0);
    let hint_b = b.numbering.file_number_hint.filter(|n| *n > 0);
    if let (Some(na), Some(nb)) = (hint_a, hint_b) {
        if nb > na {
            reasons.push(format!("✓ File number increases: {} → {}", na, nb));
            file_number_sequence_valid = Some(true);
        } else if nb == na {
            reasons.push(format!("⚠ Identical file numbers: {}", na));
        } else {
            reasons.push(format!(
                "⚠ File number decreases: {} → {} (counter may have been reset)",
                na, nb
            ));
            file_number_sequence_valid = Some(false);
        }
    }

    if a.processing.not_out_of_camera || b.processing.not_out_of_camera {
        reasons.push("⚠ One or both files were processed; metadata may be incomplete".to_string());
    }

    let decision = decide(&Signals {
        model,
        same_serial,
        time_sequence_valid,
        file_number_sequence_valid,
    });
    if decision.reduced_confidence {
        reasons.push("Note: no serial number to confirm; this conclusion is less reliable".to_string());
    }
    log::debug!("Comparison verdict: {}", decision.verdict);

    ComparisonResult {
        file1: a.file_name.clone(),
        file2: b.file_name.clone(),
        verdict: decision.verdict,
        reasons,
        same_camera_model: same_model,
        same_serial_number: same_serial,
        same_firmware,
        time_sequence_valid,
        file_number_sequence_valid,
        time_difference_seconds,
    }
}

/// Parses `YYYY:MM:DD HH:MM:SS`, ignoring fractional seconds and any zone suffix.
pub fn parse_capture_time(raw: &str) -> Option<NaiveDateTime> {
    let mut base = raw.trim().split(['.', '+', 'Z']).next().unwrap_or("");
    // A '-' past the date part starts a negative UTC offset.
    if let Some(pos) = base.get(10..).and_then(|rest| rest.find('-')) {
        base = &base[..10 + pos];
    }
    NaiveDateTime::parse_from_str(base.trim(), EXIF_TIMESTAMP_FORMAT).ok()
}
