//! Bulk CSV scoring with one designated model.
//!
//! The bulk contract differs from the single-record panel path: values are
//! already numeric (no string categories), and the whole batch stands or
//! falls together. A schema mismatch scores zero rows.

use std::collections::HashSet;

use crate::errors::{CardioError, CardioResult};
use crate::features::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::model::ModelArtifact;
use crate::predictor::risk_score;

/// Result of scoring one uploaded table
#[derive(Debug)]
pub struct BulkOutput {
    /// Input rows in canonical column order plus `Prediction` and
    /// `Risk Score (%)`
    pub csv: String,
    pub rows: usize,
}

/// Validate, reorder, and score an uploaded CSV against `model`.
///
/// The header's column-name set (whitespace-trimmed, order-insensitive) must
/// equal the 11 expected columns exactly; extra or missing columns reject
/// the whole upload with a [`CardioError::Schema`].
pub fn score_csv(model: &ModelArtifact, data: &[u8]) -> CardioResult<BulkOutput> {
    let mut reader = csv::Reader::from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CardioError::schema(format!("cannot read CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let expected: HashSet<&str> = FEATURE_COLUMNS.into_iter().collect();
    let present: HashSet<&str> = headers.iter().map(String::as_str).collect();

    let missing: Vec<&str> = FEATURE_COLUMNS
        .into_iter()
        .filter(|c| !present.contains(c))
        .collect();
    let unexpected: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|c| !expected.contains(c))
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("missing columns: {}", missing.join(", ")));
        }
        if !unexpected.is_empty() {
            parts.push(format!("unexpected columns: {}", unexpected.join(", ")));
        }
        return Err(CardioError::schema(parts.join("; ")));
    }
    if headers.len() != FEATURE_COUNT {
        return Err(CardioError::schema("duplicate columns in header"));
    }

    // Map canonical position -> position in the uploaded header.
    let reorder: Vec<usize> = FEATURE_COLUMNS
        .iter()
        .map(|c| headers.iter().position(|h| h == c).unwrap_or_default())
        .collect();

    let mut vectors: Vec<FeatureVector> = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| CardioError::schema(format!("row {}: {e}", row_index + 1)))?;
        if record.len() != FEATURE_COUNT {
            return Err(CardioError::schema(format!(
                "row {}: expected {FEATURE_COUNT} values, got {}",
                row_index + 1,
                record.len()
            )));
        }

        let mut vector = [0.0; FEATURE_COUNT];
        for (canonical, &source) in reorder.iter().enumerate() {
            let cell = record[source].trim();
            vector[canonical] = cell.parse::<f64>().map_err(|_| {
                CardioError::schema(format!(
                    "row {}, column {}: '{}' is not numeric",
                    row_index + 1,
                    FEATURE_COLUMNS[canonical],
                    cell
                ))
            })?;
        }
        vectors.push(vector);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut out_header: Vec<&str> = FEATURE_COLUMNS.to_vec();
    out_header.push("Prediction");
    out_header.push("Risk Score (%)");
    writer
        .write_record(&out_header)
        .map_err(|e| CardioError::schema(format!("cannot write output: {e}")))?;

    for vector in &vectors {
        let label = model.predict(vector)?;
        let score = risk_score(model.predict_proba(vector)?);

        let mut row: Vec<String> = vector.iter().map(|v| format_cell(*v)).collect();
        row.push(label.to_string());
        row.push(format!("{score:.2}"));
        writer
            .write_record(&row)
            .map_err(|e| CardioError::schema(format!("cannot write output: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CardioError::schema(format!("cannot finish output: {e}")))?;
    let csv = String::from_utf8(bytes)
        .map_err(|e| CardioError::schema(format!("output not utf-8: {e}")))?;

    Ok(BulkOutput {
        csv,
        rows: vectors.len(),
    })
}

/// Render integral values without a trailing `.0` so pass-through columns
/// look like the upload
fn format_cell(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
