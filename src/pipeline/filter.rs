use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::debug;

use crate::config::FilterOptions;
use crate::table::Table;

/// Column inspected by the comment filter.
pub const COMMENT_COLUMN: &str = "Comment";
/// Column inspected by the flight-code filter.
pub const FLIGHT_COLUMN: &str = "MSG Flight";

/// Apply both exclusion filters in place: first the comment-substring
/// filter, then the flight-code filter. A row survives only if it matches
/// neither. Every non-empty cell is matched on its textual content; only
/// empty/missing cells are exempt.
///
/// Fails if a filter is non-empty but its column is missing from the schema.
pub fn apply_filters(table: &mut Table, opts: &FilterOptions) -> Result<()> {
    if !opts.exclude_comment.is_empty() {
        let idx = require_column(table, COMMENT_COLUMN)?;
        let needle = opts.exclude_comment.as_str();
        let before = table.num_rows();
        table.retain_rows(|row| match row[idx].text() {
            Some(text) => !text.contains(needle),
            None => true,
        });
        debug!(
            removed = before - table.num_rows(),
            "comment filter applied"
        );
    }

    if !opts.exclude_codes.is_empty() {
        let idx = require_column(table, FLIGHT_COLUMN)?;
        let pattern = code_pattern(&opts.exclude_codes)?;
        let before = table.num_rows();
        table.retain_rows(|row| match row[idx].text() {
            Some(text) => !pattern.is_match(&text),
            None => true,
        });
        debug!(
            removed = before - table.num_rows(),
            "flight-code filter applied"
        );
    }

    Ok(())
}

fn require_column(table: &Table, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| anyhow!("required column '{}' not found in input data", name))
}

/// One unanchored alternation over the literal codes: a row matches if its
/// flight field contains any code as a substring.
fn code_pattern(codes: &[String]) -> Result<Regex> {
    let escaped: Vec<String> = codes.iter().map(|c| regex::escape(c)).collect();
    Regex::new(&escaped.join("|")).map_err(|e| anyhow!("invalid exclusion code pattern: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn sample(rows: &[(&str, &str)]) -> Table {
        let mut t = Table::new(vec![FLIGHT_COLUMN.into(), COMMENT_COLUMN.into()]);
        for (flight, comment) in rows {
            t.push_row(vec![Value::parse(flight), Value::parse(comment)]);
        }
        t
    }

    fn opts(codes: &[&str], comment: &str) -> FilterOptions {
        FilterOptions {
            exclude_codes: codes.iter().map(|s| s.to_string()).collect(),
            exclude_comment: comment.to_string(),
            strict_parsing: false,
        }
    }

    #[test]
    fn code_filter_matches_substring_not_exact() {
        let mut t = sample(&[("PRE-SKL-POST", "x"), ("AB123", "y")]);
        apply_filters(&mut t, &opts(&["SKL", "LFT"], "")).unwrap();
        assert_eq!(t.num_rows(), 1);
        assert_eq!(t.rows()[0][0], Value::Text("AB123".into()));
    }

    #[test]
    fn comment_filter_is_literal_and_case_sensitive() {
        let mut t = sample(&[
            ("A1", "Matching flight found here"),
            ("B2", "matching flight found here"),
            ("C3", "ok"),
        ]);
        apply_filters(&mut t, &opts(&[], "Matching flight found")).unwrap();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.rows()[0][0], Value::Text("B2".into()));
    }

    #[test]
    fn empty_cells_never_match() {
        let mut t = sample(&[("", "kept despite empty flight"), ("AB1", "")]);
        apply_filters(&mut t, &opts(&["AB9"], "x")).unwrap();
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn numeric_cells_match_on_their_text() {
        let mut t = sample(&[("AB1", "12345"), ("123", "fine"), ("CD2", "fine")]);
        // "12345" contains "234"; flight "123" contains "23"
        apply_filters(&mut t, &opts(&["23"], "234")).unwrap();
        assert_eq!(t.num_rows(), 1);
        assert_eq!(t.rows()[0][0], Value::Text("CD2".into()));
    }

    #[test]
    fn regex_metacharacters_in_codes_are_literal() {
        let mut t = sample(&[("N.7", "a"), ("NX7", "b")]);
        apply_filters(&mut t, &opts(&["N.7"], "")).unwrap();
        assert_eq!(t.num_rows(), 1);
        assert_eq!(t.rows()[0][0], Value::Text("NX7".into()));
    }

    #[test]
    fn missing_required_column_is_fatal_only_when_filter_active() {
        let mut t = Table::new(vec!["Other".into()]);
        t.push_row(vec![Value::parse("x")]);

        let mut inert = t.clone();
        apply_filters(&mut inert, &opts(&[], "")).unwrap();
        assert_eq!(inert.num_rows(), 1);

        let err = apply_filters(&mut t, &opts(&["SKL"], "")).unwrap_err();
        assert!(err.to_string().contains("MSG Flight"));
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut t = sample(&[("SKL1", "a"), ("AB1", "Sendback"), ("CD2", "fine")]);
        let o = opts(&["SKL"], "Sendback");
        apply_filters(&mut t, &o).unwrap();
        let once = t.clone();
        apply_filters(&mut t, &o).unwrap();
        assert_eq!(t, once);
    }
}
