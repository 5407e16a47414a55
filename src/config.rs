/// Flight codes excluded by default, matched as substrings of `MSG Flight`.
pub const DEFAULT_EXCLUDE_CODES: &str = "SKL,LFT,ZKZ,ZKI,ZKV,ZKN,MDK,FDC,N87,N96,N72,N81,N14,ZKR,N11,VHO,VHX,VHA,ZKX,ZKJ,ZKT,GIS,VHC,XFX,N43";

/// Default phrase excluded from the `Comment` column.
pub const DEFAULT_COMMENT_FILTER: &str = "Matching flight found, Sendback";

/// Everything the pipeline needs besides the input files. Built once by the
/// caller; the pipeline holds no other state.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Rows whose `MSG Flight` contains any of these codes are dropped.
    /// Empty list disables the filter.
    pub exclude_codes: Vec<String>,
    /// Rows whose `Comment` contains this substring are dropped. Empty
    /// string disables the filter.
    pub exclude_comment: String,
    /// When true, a file that fails to parse aborts the whole run instead
    /// of being skipped with a warning.
    pub strict_parsing: bool,
}

/// Split a comma-separated code list into trimmed, non-empty entries.
pub fn parse_code_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_code_list_trims_and_drops_empties() {
        assert_eq!(parse_code_list("SKL, LFT ,ZKZ"), vec!["SKL", "LFT", "ZKZ"]);
        assert_eq!(parse_code_list("SKL,,LFT,"), vec!["SKL", "LFT"]);
        assert!(parse_code_list("").is_empty());
        assert!(parse_code_list("  ,  ").is_empty());
    }

    #[test]
    fn default_code_list_parses() {
        let codes = parse_code_list(DEFAULT_EXCLUDE_CODES);
        assert_eq!(codes.len(), 25);
        assert!(codes.iter().all(|c| !c.is_empty()));
    }
}
