//! CSV document codec.
//!
//! # Responsibility
//! - Flatten the document into one row per comment across all scenes.
//! - Parse CSV text back into a validated staging document.
//!
//! # Invariants
//! - Every exported field is wrapped in quotes, with internal quotes
//!   doubled, unconditionally.
//! - Coordinates are serialized with fixed 6-decimal precision.
//! - A payload needs a header row plus at least one data row.
//! - The parser splits on commas only while outside quotes, using an
//!   explicit in-quotes flag.

use super::{CodecError, CodecResult};
use crate::model::comment::{Comment, Document};
use std::fmt::Write as _;

/// Fixed interchange header. Column order is part of the contract.
pub const CSV_HEADER: &str =
    "Szene,Kommentar,Position_X,Position_Y,Position_Z,Feature,Datum,ID,Benutzer";

const COLUMN_COUNT: usize = 9;

/// Serializes all comments of all scenes, one quoted row per comment.
pub fn encode_document(document: &Document) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for list in document.comments.values() {
        for comment in list {
            let row = [
                comment.scene_key.clone(),
                comment.text.clone(),
                format!("{:.6}", comment.position_x),
                format!("{:.6}", comment.position_y),
                format!("{:.6}", comment.position_z),
                comment.feature_name.clone().unwrap_or_default(),
                comment.created_at.clone(),
                comment.id.clone(),
                comment.author.clone(),
            ];
            let mut first = true;
            for field in row {
                if !first {
                    out.push(',');
                }
                first = false;
                let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
            }
            out.push('\n');
        }
    }
    out
}

/// Parses CSV text into a staging document.
///
/// The result contains only what the CSV contains; committing it to a live
/// store replaces the whole document. That destructive-replace contract
/// belongs to the caller; this function is pure.
pub fn decode_document(text: &str) -> CodecResult<Document> {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(CodecError::InvalidFormat(
            "CSV needs a header row and at least one data row".to_string(),
        ));
    }

    let header_columns = split_row(lines[0]).len();
    if header_columns != COLUMN_COUNT {
        return Err(CodecError::InvalidFormat(format!(
            "header has {header_columns} columns, expected {COLUMN_COUNT}"
        )));
    }

    let mut document = Document::empty();
    for (index, line) in lines.iter().enumerate().skip(1) {
        let fields = split_row(line);
        if fields.len() != COLUMN_COUNT {
            return Err(CodecError::InvalidFormat(format!(
                "row {} has {} columns, expected {COLUMN_COUNT}",
                index + 1,
                fields.len()
            )));
        }

        let comment = row_to_comment(&fields, index + 1)?;
        document
            .comments
            .entry(comment.scene_key.clone())
            .or_default()
            .push(comment);
    }

    document
        .validate()
        .map_err(|err| CodecError::InvalidFormat(err.to_string()))?;
    Ok(document)
}

fn row_to_comment(fields: &[String], row: usize) -> CodecResult<Comment> {
    let position_x = parse_coordinate(&fields[2], "Position_X", row)?;
    let position_y = parse_coordinate(&fields[3], "Position_Y", row)?;
    let position_z = parse_coordinate(&fields[4], "Position_Z", row)?;

    let feature_name = if fields[5].is_empty() {
        None
    } else {
        Some(fields[5].clone())
    };

    Ok(Comment {
        id: fields[7].clone(),
        scene_key: fields[0].clone(),
        text: fields[1].clone(),
        position_x,
        position_y,
        position_z,
        feature_name,
        author: fields[8].clone(),
        created_at: fields[6].clone(),
        updated_at: fields[6].clone(),
    })
}

fn parse_coordinate(raw: &str, column: &str, row: usize) -> CodecResult<f64> {
    let value: f64 = raw.parse().map_err(|_| {
        CodecError::InvalidFormat(format!("row {row}: `{raw}` is not a number in {column}"))
    })?;
    if !value.is_finite() {
        return Err(CodecError::InvalidFormat(format!(
            "row {row}: non-finite value in {column}"
        )));
    }
    Ok(value)
}

/// Splits one row into unquoted fields.
///
/// A quote character toggles the in-quotes flag; commas split fields only
/// while the flag is off. Surrounding quotes are stripped afterwards and
/// doubled quotes collapse back to one.
fn split_row(line: &str) -> Vec<String> {
    let mut raw_fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => {
                raw_fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    raw_fields.push(current);

    raw_fields.iter().map(|field| unquote(field)).collect()
}

fn unquote(field: &str) -> String {
    let trimmed = field.trim();
    let inner = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    inner.replace("\"\"", "\"")
}
