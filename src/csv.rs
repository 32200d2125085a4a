//! A small hand-rolled CSV reader for the coordinate cache. This crate does
//! not reach for the `csv` crate for such a narrow, comma-only, header-having
//! format — a few dozen lines of direct parsing is both simpler and keeps
//! column access named rather than positional.

use crate::error::EngineError;
use regex::Regex;
use std::collections::HashMap;

/// One parsed, header-indexed row of a coordinate cache CSV file.
#[derive(Clone, Debug)]
pub struct CsvLine {
    fields: HashMap<String, String>,
}

impl CsvLine {
    /// Look up a column by exact (case-sensitive) name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// The column names present in this row, in no particular order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Parse a column into `T`, failing with a [`EngineError::CollaboratorFailure`]
    /// if the column is absent or does not parse.
    pub fn parse<T: std::str::FromStr>(&self, column: &str) -> Result<T, EngineError> {
        self.get(column)
            .ok_or_else(|| EngineError::CollaboratorFailure {
                message: format!("missing column {column:?} in coordinate cache row"),
                source: None,
            })?
            .parse::<T>()
            .map_err(|_| EngineError::CollaboratorFailure {
                message: format!("could not parse column {column:?}"),
                source: None,
            })
    }
}

fn split_csv_line(line: &str) -> Vec<String> {
    line.split(',').map(|field| field.trim().to_string()).collect()
}

/// Parse a full coordinate cache CSV document into header-indexed rows.
///
/// # Errors
/// Returns [`EngineError::CollaboratorFailure`] if the document has no
/// header row.
pub fn parse(contents: &str) -> Result<Vec<CsvLine>, EngineError> {
    let mut lines = contents.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| EngineError::CollaboratorFailure {
            message: "coordinate cache file is empty".to_string(),
            source: None,
        })?;
    let headers = split_csv_line(header);

    Ok(lines
        .map(|line| {
            let values = split_csv_line(line);
            let fields = headers
                .iter()
                .cloned()
                .zip(values.into_iter().chain(std::iter::repeat(String::new())))
                .collect();
            CsvLine { fields }
        })
        .collect())
}

/// The x/y/z column-naming patterns recognised, in priority order: mmCIF-standard `Cartn_x/y/z`, lower-case `x/y/z`, upper-case
/// `X/Y/Z`, and `coord_x/y/z`.
pub const XYZ_PATTERNS: [(&str, &str, &str); 4] = [
    ("Cartn_x", "Cartn_y", "Cartn_z"),
    ("x", "y", "z"),
    ("X", "Y", "Z"),
    ("coord_x", "coord_y", "coord_z"),
];

/// Resolve which x/y/z column triple a coordinate cache file uses, by
/// pattern matching against its header.
#[must_use]
pub fn resolve_xyz_columns(headers: &[String]) -> Option<(String, String, String)> {
    let available: std::collections::HashSet<&str> =
        headers.iter().map(String::as_str).collect();
    for (x, y, z) in XYZ_PATTERNS {
        if available.contains(x) && available.contains(y) && available.contains(z) {
            return Some((x.to_string(), y.to_string(), z.to_string()));
        }
    }
    None
}

/// Whether a column name looks like a residue-number column (`residue_number`,
/// `resnum`, `residue number`, ...), used when a cache file does not use the
/// exact canonical name.
#[must_use]
pub fn looks_like_residue_number_column(name: &str) -> bool {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"(?i)^res(idue)?[_ ]?(num(ber)?)?$").unwrap());
    re.is_match(name)
}
