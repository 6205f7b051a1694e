//! Note parser: raw markdown back into the [`Document`] model.
//!
//! The grammar is deliberately small:
//! - `# Title` (first one before any section)
//! - `## Heading` starts a section, body runs until the next `## ` or end of text
//! - fenced code blocks are opaque, headings inside them are body text
//! - a trailing `---` / `*最后更新：date*` footer is stripped and its date kept
//!
//! Parsing never fails. Text with no `## ` headings yields a document without
//! sections; callers decide how to treat such foreign text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use notecraft_shared::{Document, SectionKind};

use crate::normalize;
use crate::sections::toggles_fence;

/// Matches the `*最后更新：date*` footer line.
static FOOTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*最后更新[：:]\s*(.*?)\s*\*$").expect("footer regex")
});

/// A `## ` section as it appeared in the source.
struct RawSection<'a> {
    heading: &'a str,
    lines: Vec<&'a str>,
}

/// Parse note markdown into a [`Document`].
pub fn parse(text: &str) -> Document {
    let text = normalize::run_pipeline(text);

    let mut title: Option<&str> = None;
    let mut sections: Vec<RawSection<'_>> = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        let is_fence = toggles_fence(line);

        if !in_fence && !is_fence {
            if let Some(heading) = line.strip_prefix("## ") {
                sections.push(RawSection {
                    heading: heading.trim(),
                    lines: Vec::new(),
                });
                continue;
            }
            if sections.is_empty() {
                if title.is_none() {
                    title = line.strip_prefix("# ").map(str::trim);
                }
                continue;
            }
        }

        if is_fence {
            in_fence = !in_fence;
        }
        if let Some(section) = sections.last_mut() {
            section.lines.push(line);
        }
    }

    let mut doc = Document::new(title.unwrap_or_default());

    if let Some(last) = sections.last_mut() {
        doc.updated_on = strip_footer(&mut last.lines);
    }

    for section in sections {
        let body = section.lines.join("\n").trim().to_string();
        match SectionKind::from_heading(section.heading) {
            Some(kind) => {
                let merged = match doc.sections.remove(&kind) {
                    Some(previous) if !previous.is_empty() && !body.is_empty() => {
                        format!("{previous}\n\n{body}")
                    }
                    Some(previous) if body.is_empty() => previous,
                    _ => body,
                };
                doc.sections.insert(kind, merged);
            }
            None => doc.extra.push((section.heading.to_string(), body)),
        }
    }

    debug!(
        title = %doc.title,
        sections = doc.sections.len(),
        extra = doc.extra.len(),
        "parsed note"
    );

    doc
}

/// Remove a trailing footer from the last section's lines, returning its date.
fn strip_footer(lines: &mut Vec<&str>) -> Option<String> {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let date = FOOTER_RE
        .captures(lines.last()?.trim())
        .map(|caps| caps[1].to_string())?;
    lines.pop();

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.last().is_some_and(|l| l.trim() == "---") {
        lines.pop();
    }

    Some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_title_and_sections() {
        let md = "# JVM 垃圾回收\n\nintro to drop\n\n## 核心概念\n\n- **原理**：分代收集\n\n## 易错点\n\n1. 避免频繁 Full GC。\n";
        let doc = parse(md);
        assert_eq!(doc.title, "JVM 垃圾回收");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.section(SectionKind::CoreConcepts), Some("- **原理**：分代收集"));
        assert_eq!(doc.section(SectionKind::Pitfalls), Some("1. 避免频繁 Full GC。"));
        assert!(doc.updated_on.is_none());
    }

    #[test]
    fn only_first_title_counts() {
        let doc = parse("# First\n# Second\n## 要点总结\n\n1. **a**");
        assert_eq!(doc.title, "First");
    }

    #[test]
    fn footer_is_stripped() {
        let md = "# T\n\n## 面试要点\n\n- 理解T的基本原理\n\n---\n*最后更新：2024/3/9*\n";
        let doc = parse(md);
        assert_eq!(doc.updated_on.as_deref(), Some("2024/3/9"));
        assert_eq!(
            doc.section(SectionKind::InterviewTakeaways),
            Some("- 理解T的基本原理")
        );
    }

    #[test]
    fn horizontal_rule_without_footer_is_kept() {
        let doc = parse("# T\n\n## 核心概念\n\nabove\n\n---\n\nbelow");
        assert_eq!(
            doc.section(SectionKind::CoreConcepts),
            Some("above\n\n---\n\nbelow")
        );
    }

    #[test]
    fn headings_inside_fences_are_body() {
        let md = "# T\n\n## 代码示例\n\n### 示例 1\n\n```markdown\n## 核心概念\n# not a title\n```\n";
        let doc = parse(md);
        assert_eq!(doc.sections.len(), 1);
        assert!(doc.section(SectionKind::CodeSamples).unwrap().contains("## 核心概念"));
    }

    #[test]
    fn inline_fence_does_not_hide_later_sections() {
        let md = "# T\n\n## 代码示例\n\n### 示例 1\n\n```ls```\n\n## 易错点\n\n1. 注意权限。\n";
        let doc = parse(md);
        assert_eq!(doc.section(SectionKind::CodeSamples), Some("### 示例 1\n\n```ls```"));
        assert_eq!(doc.section(SectionKind::Pitfalls), Some("1. 注意权限。"));
    }

    #[test]
    fn unknown_sections_go_to_extra() {
        let doc = parse("# T\n\n## 参考资料\n\n- https://example.com\n\n## 核心概念\n\n- **模型**：x");
        assert_eq!(doc.extra, vec![("参考资料".to_string(), "- https://example.com".to_string())]);
        assert!(doc.section(SectionKind::CoreConcepts).is_some());
    }

    #[test]
    fn foreign_text_has_no_sections() {
        let doc = parse("just some notes\nwritten by hand\n");
        assert!(!doc.has_sections());
        assert_eq!(doc.title, "");
    }

    #[test]
    fn duplicate_canonical_headings_are_joined() {
        let doc = parse("# T\n## 易错点\n1. a。\n## 易错点\n1. b。");
        assert_eq!(doc.section(SectionKind::Pitfalls), Some("1. a。\n\n1. b。"));
    }

    #[test]
    fn crlf_input_parses() {
        let doc = parse("# T\r\n\r\n## 核心概念\r\n\r\n- **原理**：x\r\n");
        assert_eq!(doc.section(SectionKind::CoreConcepts), Some("- **原理**：x"));
    }

    #[test]
    fn parse_note_fixture() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/notes/jvm-gc.md");
        let content = std::fs::read_to_string(path).expect("read fixture");
        let doc = parse(&content);

        assert_eq!(doc.title, "JVM垃圾回收");
        assert_eq!(doc.sections.len(), 5);
        assert_eq!(doc.updated_on.as_deref(), Some("2024/11/2"));
        assert_eq!(doc.extra.len(), 1);
    }
}
