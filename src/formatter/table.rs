//! Table output formatter.
//!
//! Columns are aligned like a tab writer with a padding of 3: every cell but
//! the last on a line is padded to the widest cell of its column plus 3.

use crate::formatter::NO_RESULT;
use crate::result::ResultList;

const PADDING: usize = 3;
const HEADER: [&str; 4] = ["NAME", "STATUS", "PASSES", "FAILS"];

/// Format results as an aligned table.
pub fn format(results: &ResultList) -> String {
    if results.results.is_empty() {
        return NO_RESULT.to_string();
    }

    let mut rows: Vec<[&str; 4]> = vec![HEADER];
    for result in &results.results {
        let lines = result.passes.len().max(result.failures.len()).max(1);
        for i in 0..lines {
            let pass = result.passes.get(i).map(String::as_str).unwrap_or("");
            let fail = result.failures.get(i).map(String::as_str).unwrap_or("");
            if i == 0 {
                rows.push([result.name.as_str(), result.status.as_str(), pass, fail]);
            } else {
                rows.push(["", "", pass, fail]);
            }
        }
    }

    let mut widths = [0usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    for row in &rows {
        for (width, cell) in widths.iter().zip(row.iter()) {
            output.push_str(cell);
            let pad = width + PADDING - cell.chars().count();
            output.extend(std::iter::repeat_n(' ', pad));
        }
        output.push_str(row[3]);
        output.push('\n');
    }
    output
}
