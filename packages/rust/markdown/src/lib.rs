//! Markdown rendering for results tables.
//!
//! Produces GitHub-flavored markdown tables in the exact shape downstream
//! tooling already parses: a `| a | b |` header, a `|--- | ---|` separator
//! and one `| ... |` line per row. Absent values render as empty cells.

use tracing::{debug, instrument};

use benchtable_shared::ResultRow;

// ---------------------------------------------------------------------------
// Results table
// ---------------------------------------------------------------------------

/// Render result rows as a markdown table, one line per row in slice order.
#[instrument(skip_all, fields(rows = rows.len()))]
pub fn render_results_table(rows: &[ResultRow]) -> String {
    let header = ResultRow::column_names();
    let cells: Vec<Vec<String>> = rows.iter().map(row_cells).collect();
    let md = render_table(&header, &cells);
    debug!(bytes = md.len(), "results table rendered");
    md
}

/// Cells for one row, in [`ResultRow::column_names`] order.
pub fn row_cells(row: &ResultRow) -> Vec<String> {
    let mut cells = Vec::with_capacity(ResultRow::column_names().len());
    cells.push(escape_cell(&row.exp_name));
    cells.push(row.uia_value.to_string());
    cells.push(escape_cell(&row.som_origin));
    cells.push(escape_cell(&row.model));
    cells.extend(row.scores.iter().map(|(_, score)| format_score(score)));
    cells.push(row.errors.to_string());
    cells
}

/// Format a domain percentage with the shortest text that round-trips.
///
/// Decimal exponents from -4 to 15 print positionally, integral values with
/// one decimal (`75.0`). Anything further out uses exponent form with a sign
/// and at least two exponent digits (`1e+20`, `1.5e-07`).
pub fn format_score(score: Option<f64>) -> String {
    match score {
        None => String::new(),
        Some(v) if v.is_nan() => "nan".to_string(),
        Some(v) if v == f64::INFINITY => "inf".to_string(),
        Some(v) if v == f64::NEG_INFINITY => "-inf".to_string(),
        Some(v) => {
            let sci = format!("{v:e}");
            let Some((mantissa, exp)) = sci.split_once('e') else {
                return sci;
            };
            let exp: i32 = exp.parse().unwrap_or(0);

            if (-4..16).contains(&exp) {
                let s = v.to_string();
                if s.contains('.') { s } else { format!("{s}.0") }
            } else {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Generic table
// ---------------------------------------------------------------------------

/// Render a header and rows as a markdown table.
///
/// Rows shorter than the header are padded with empty cells; longer rows are
/// kept as-is.
pub fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let col_count = header.len();
    let mut md = String::new();

    md.push_str("| ");
    md.push_str(&header.join(" | "));
    md.push_str(" |\n");

    md.push('|');
    md.push_str(&vec!["---"; col_count].join(" | "));
    md.push_str("|\n");

    for row in rows {
        let mut cells: Vec<&str> = row.iter().map(String::as_str).collect();
        while cells.len() < col_count {
            cells.push("");
        }
        md.push_str("| ");
        md.push_str(&cells.join(" | "));
        md.push_str(" |\n");
    }

    md
}

/// Keep free-form text from breaking the table structure.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
