use crate::error::AppError;
use crate::metadata::{ComparisonResult, FileAnalysis, Verdict};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const RULE_HEAVY: &str = "======================================================================";
const RULE_LIGHT: &str = "----------------------------------------------------------------------";

const CSV_COLUMNS: [&str; 16] = [
    "file_name",
    "file_type",
    "camera_make",
    "camera_model",
    "serial_number",
    "firmware",
    "lens_model",
    "datetime_original",
    "shutter_count",
    "shutter_count_present",
    "shutter_count_source",
    "file_number_hint",
    "not_out_of_camera",
    "iso",
    "aperture",
    "shutter_speed",
];

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("n/a")
}

pub fn format_analysis_pretty(analysis: &FileAnalysis) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    write_analysis(&mut out, analysis).ok();
    out
}

fn write_analysis(out: &mut String, a: &FileAnalysis) -> std::fmt::Result {
    writeln!(out, "{}", RULE_HEAVY)?;
    writeln!(out, "FILE: {}", a.file_name)?;
    writeln!(out, "   Path: {}", a.file_path)?;
    writeln!(
        out,
        "   Extension: {} | Size: {:.2} MB",
        a.file_type.to_uppercase(),
        a.file_size_bytes as f64 / 1024.0 / 1024.0
    )?;
    if let Some(real) = &a.content.real_file_type {
        writeln!(out, "   Detected type: {} ({})", real, or_na(&a.content.mime_type))?;
    }
    if a.content.file_type_mismatch {
        writeln!(out)?;
        writeln!(out, "   !!! WARNING: FILE IS NOT WHAT IT CLAIMS TO BE !!!")?;
        writeln!(
            out,
            "   Extension .{} does NOT match the content ({})",
            a.file_type,
            or_na(&a.content.real_file_type)
        )?;
        writeln!(out, "   This is NOT a genuine camera original!")?;
        writeln!(out)?;
    }

    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "CAMERA:")?;
    writeln!(out, "   Make: {}", or_na(&a.camera.make))?;
    writeln!(out, "   Model: {}", or_na(&a.camera.model))?;
    writeln!(
        out,
        "   Serial number: {}",
        a.camera.serial_number.as_deref().unwrap_or("not recorded in file")
    )?;
    writeln!(out, "   Firmware: {}", or_na(&a.camera.firmware))?;
    writeln!(out, "   Lens: {}", or_na(&a.camera.lens_model))?;

    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "SHUTTER COUNT:")?;
    match (a.shutter.present, a.shutter.count) {
        (true, Some(count)) => {
            writeln!(out, "   FOUND: {} actuations", group_thousands(count))?;
            writeln!(out, "   Source: {}", a.shutter.source)?;
        }
        _ => {
            writeln!(out, "   NOT FOUND IN FILE")?;
            writeln!(out, "   The shutter count is absent from the metadata; the exact")?;
            writeln!(out, "   actuation count cannot be determined from this file.")?;
            writeln!(out, "   For many Canon bodies (200D, 600D, 700D, ...) this is normal.")?;
            writeln!(out, "   To read it, connect the camera over USB with a vendor tool")?;
            writeln!(out, "   or ask an authorized service center.")?;
        }
    }

    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "INDIRECT DATA (NOT a shutter count!):")?;
    match a.numbering.file_number_hint {
        Some(n) => {
            writeln!(out, "   File number: {}", n)?;
            writeln!(out, "   {}", a.numbering.file_number_warning)?;
        }
        None => writeln!(out, "   File number: unknown")?,
    }
    if let Some(dir) = a.numbering.directory_number {
        writeln!(out, "   Directory number: {}", dir)?;
    }
    if let Some(id) = &a.numbering.image_unique_id {
        writeln!(out, "   ImageUniqueID: {}", id)?;
    }

    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "CAPTURE DATE:")?;
    writeln!(out, "   Original: {}", or_na(&a.timing.datetime_original))?;
    writeln!(out, "   File modified: {}", or_na(&a.timing.file_modify_date))?;

    writeln!(out, "{}", RULE_LIGHT)?;
    writeln!(out, "SHOOTING PARAMETERS:")?;
    match a.shooting.iso {
        Some(iso) => writeln!(out, "   ISO: {}", iso)?,
        None => writeln!(out, "   ISO: n/a")?,
    }
    match &a.shooting.aperture {
        Some(f) => writeln!(out, "   Aperture: f/{}", f)?,
        None => writeln!(out, "   Aperture: n/a")?,
    }
    writeln!(out, "   Shutter speed: {}", or_na(&a.shooting.shutter_speed))?;
    writeln!(out, "   Focal length: {}", or_na(&a.shooting.focal_length))?;
    match (a.shooting.image_width, a.shooting.image_height) {
        (Some(w), Some(h)) => writeln!(out, "   Dimensions: {}x{}", w, h)?,
        _ => writeln!(out, "   Dimensions: n/a")?,
    }

    if a.processing.not_out_of_camera || !a.integrity_notes.is_empty() {
        writeln!(out, "{}", RULE_LIGHT)?;
        writeln!(out, "WARNINGS:")?;
        if let Some(warning) = &a.processing.editing_detected_warning {
            writeln!(out, "   [!] {}", warning)?;
        }
        for note in &a.integrity_notes {
            if Some(note) != a.processing.editing_detected_warning.as_ref() {
                writeln!(out, "   - {}", note)?;
            }
        }
    }

    if !a.errors.is_empty() {
        writeln!(out, "{}", RULE_LIGHT)?;
        writeln!(out, "ERRORS:")?;
        for err in &a.errors {
            writeln!(out, "   {}", err)?;
        }
    }
    write!(out, "{}", RULE_HEAVY)
}

pub fn format_comparison_pretty(result: &ComparisonResult) -> String {
    let (mark, text) = match result.verdict {
        Verdict::LikelySameCamera => ("[OK]", "LIKELY THE SAME CAMERA"),
        Verdict::Inconclusive => ("[??]", "NOT ENOUGH DATA"),
        Verdict::Suspicious => ("[!!]", "SUSPICIOUS / DIFFERENT CAMERAS"),
    };

    let mut lines = vec![
        RULE_HEAVY.to_string(),
        "COMPARISON OF TWO FILES (seller check)".to_string(),
        RULE_HEAVY.to_string(),
        format!("File 1: {}", result.file1),
        format!("File 2: {}", result.file2),
        RULE_LIGHT.to_string(),
        String::new(),
        format!("{} VERDICT: {}", mark, text),
        String::new(),
        RULE_LIGHT.to_string(),
        "DETAILS:".to_string(),
    ];
    lines.extend(result.reasons.iter().map(|r| format!("   {}", r)));
    lines.push(RULE_HEAVY.to_string());
    lines.join("\n")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn save_json(analyses: &[FileAnalysis], output_path: &Path) -> Result<(), AppError> {
    write_json(analyses, output_path)
}

pub fn save_comparison_json(result: &ComparisonResult, output_path: &Path) -> Result<(), AppError> {
    write_json(result, output_path)
}

fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<(), AppError> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    log::info!("Saved JSON to {:?}", output_path);
    Ok(())
}

// UTF-8 with BOM so spreadsheet apps pick the right encoding.
pub fn save_csv(analyses: &[FileAnalysis], output_path: &Path) -> Result<(), AppError> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all("\u{feff}".as_bytes())?;
    write_csv(&mut writer, analyses)?;
    writer.flush()?;
    log::info!("Saved CSV to {:?}", output_path);
    Ok(())
}

pub fn write_csv<W: Write>(writer: &mut W, analyses: &[FileAnalysis]) -> Result<(), AppError> {
    writeln!(writer, "{}", CSV_COLUMNS.join(","))?;
    for a in analyses {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let num = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_default();
        let row = [
            a.file_name.clone(),
            a.file_type.clone(),
            opt(&a.camera.make),
            opt(&a.camera.model),
            opt(&a.camera.serial_number),
            opt(&a.camera.firmware),
            opt(&a.camera.lens_model),
            opt(&a.timing.datetime_original),
            num(a.shutter.count),
            a.shutter.present.to_string(),
            a.shutter.source.clone(),
            num(a.numbering.file_number_hint),
            a.processing.not_out_of_camera.to_string(),
            num(a.shooting.iso),
            opt(&a.shooting.aperture),
            opt(&a.shooting.shutter_speed),
        ];
        let line: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        writeln!(writer, "{}", line.join(","))?;
    }
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub with_shutter_count: usize,
    pub without_shutter_count: usize,
    pub edited: usize,
}

impl Summary {
    pub fn from_analyses(analyses: &[FileAnalysis]) -> Self {
        let with_shutter_count = analyses.iter().filter(|a| a.shutter.present).count();
        Self {
            total: analyses.len(),
            with_shutter_count,
            without_shutter_count: analyses.len() - with_shutter_count,
            edited: analyses.iter().filter(|a| a.processing.not_out_of_camera).count(),
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", RULE_LIGHT)?;
        writeln!(f, "TOTAL: {} files", self.total)?;
        writeln!(f, "   With shutter count: {}", self.with_shutter_count)?;
        writeln!(f, "   Without shutter count (not determinable from file): {}", self.without_shutter_count)?;
        write!(f, "   Processed/exported: {}", self.edited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ShutterData;

    fn sample() -> FileAnalysis {
        let mut a = FileAnalysis::new("IMG_0001.CR2".into(), "/tmp/IMG_0001.CR2".into(), "cr2".into(), 1024);
        a.camera.make = Some("Canon".into());
        a.camera.model = Some("Canon EOS 200D".into());
        a.camera.lens_model = Some("EF-S 18-55mm f/4-5.6, IS STM".into());
        a.shutter = ShutterData::found(12345, "MakerNotes:ShutterCount");
        a
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[sample()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap().split(',').count(), CSV_COLUMNS.len());
        let row = lines.next().unwrap();
        assert!(row.starts_with("IMG_0001.CR2,cr2,Canon,Canon EOS 200D,,,\"EF-S 18-55mm f/4-5.6, IS STM\""));
        assert!(row.contains(",12345,true,MakerNotes:ShutterCount,"));
    }

    #[test]
    fn pretty_report_groups_shutter_count() {
        let text = format_analysis_pretty(&sample());
        assert!(text.contains("FOUND: 12,345 actuations"));
        assert!(text.contains("Serial number: not recorded in file"));
    }

    #[test]
    fn summary_counts_files() {
        let mut edited = sample();
        edited.shutter = ShutterData::default();
        edited.processing.not_out_of_camera = true;
        let summary = Summary::from_analyses(&[sample(), edited]);
        assert_eq!(
            summary,
            Summary { total: 2, with_shutter_count: 1, without_shutter_count: 1, edited: 1 }
        );
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(7), "7");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
