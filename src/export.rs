//! CSV export of the loaded page of requirements.
//!
//! The export covers only the records currently held by the dashboard (one
//! page), not the whole filtered result set.

use std::{fmt::Write as _, io, path::Path};

use crate::domain::Requirement;

/// File name offered for downloaded exports.
pub const EXPORT_FILE_NAME: &str = "requirements_export.csv";

/// Column headings, in output order.
pub const HEADER: [&str; 8] = [
    "ID",
    "Requirement",
    "Status",
    "Priority",
    "Complexity",
    "Author",
    "Date",
    "Estimated Hours",
];

/// Render requirements as CSV.
///
/// Produces the header row followed by one row per requirement, in order,
/// each terminated by `\n`. The requirement text is always quoted with
/// embedded quotes doubled; every other field is written as-is. Dates are
/// calendar dates in UTC.
#[must_use]
pub fn to_csv(requirements: &[Requirement]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');

    for requirement in requirements {
        // writing to a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            requirement.id(),
            quote(requirement.text()),
            requirement.status(),
            requirement.priority(),
            requirement.complexity(),
            requirement.author(),
            requirement.date().format("%Y-%m-%d"),
            requirement.estimated_time(),
        );
    }

    out
}

/// Write the CSV export to `path` as UTF-8 (`text/csv;charset=utf-8`).
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_csv(path: &Path, requirements: &[Requirement]) -> io::Result<()> {
    std::fs::write(path, to_csv(requirements))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
