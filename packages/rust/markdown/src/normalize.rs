//! Input normalization applied before parsing stored notes.
//!
//! Each pass is a function `&str -> String` applied in sequence. Notes arrive from
//! editors and hosting APIs with stray BOMs, CRLF endings and trailing blanks.

/// Run the full normalization pipeline on raw note text.
pub fn run_pipeline(md: &str) -> String {
    let mut result = strip_bom(md).to_string();

    result = normalize_line_endings(&result);
    result = normalize_whitespace(&result);

    result
}

/// Drop a leading UTF-8 byte order mark.
fn strip_bom(md: &str) -> &str {
    md.strip_prefix('\u{feff}').unwrap_or(md)
}

/// Convert CRLF and lone CR line endings to LF.
fn normalize_line_endings(md: &str) -> String {
    md.replace("\r\n", "\n").replace('\r', "\n")
}

/// Clean up trailing whitespace on lines.
fn normalize_whitespace(md: &str) -> String {
    md.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_bom_removes_marker() {
        assert_eq!(strip_bom("\u{feff}# Title"), "# Title");
        assert_eq!(strip_bom("# Title"), "# Title");
    }

    #[test]
    fn normalize_line_endings_converts_crlf() {
        assert_eq!(normalize_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn normalize_whitespace_trims_trailing() {
        let input = "Line 1   \nLine 2\t\nLine 3";
        assert_eq!(normalize_whitespace(input), "Line 1\nLine 2\nLine 3");
    }

    #[test]
    fn full_pipeline_normalizes_note() {
        let input = "\u{feff}# Redis  \r\n\r\n## 核心概念\r\n\r\n- **机制**：单线程 \r\n";
        let result = run_pipeline(input);
        assert_eq!(result, "# Redis\n\n## 核心概念\n\n- **机制**：单线程");
    }
}
