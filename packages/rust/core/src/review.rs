//! Deterministic structural lint over finished note markdown.

use tracing::{debug, instrument};

use notecraft_shared::{ReviewConfig, ReviewIssue, ReviewReport, SectionKind, Severity};

/// Summary text of a clean review.
pub const PASSED: &str = "✅ passed";

/// Review note markdown. Never fails; problems are reported as issues.
#[instrument(skip_all, fields(chars = markdown.chars().count()))]
pub fn review(markdown: &str, config: &ReviewConfig) -> ReviewReport {
    let mut issues = Vec::new();
    let mut flag = |severity, issue: &str| {
        issues.push(ReviewIssue {
            severity,
            issue: issue.to_string(),
        });
    };

    if markdown.chars().count() < config.min_length {
        flag(Severity::Critical, "content too short");
    }

    let core_heading = format!("## {}", SectionKind::CoreConcepts.heading());
    if !markdown.lines().any(|line| line.trim_end() == core_heading) {
        flag(Severity::Warning, "missing core-concepts section");
    }

    if config
        .placeholder_markers
        .iter()
        .any(|marker| !marker.is_empty() && markdown.contains(marker.as_str()))
    {
        flag(Severity::Suggestion, "unresolved placeholder present");
    }

    if markdown.matches("```").count() % 2 == 1 {
        flag(Severity::Critical, "unbalanced code fence");
    }

    let summary = summarize(&issues);
    debug!(issues = issues.len(), %summary, "review complete");

    ReviewReport { summary, issues }
}

/// `✅ passed`, or a count-by-severity phrase such as `found 1 critical, 2 warnings`.
fn summarize(issues: &[ReviewIssue]) -> String {
    if issues.is_empty() {
        return PASSED.to_string();
    }

    let count = |severity| issues.iter().filter(|i| i.severity == severity).count();
    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{n} {word}")
        } else {
            format!("{n} {word}s")
        }
    };

    let mut parts = Vec::new();
    let critical = count(Severity::Critical);
    if critical > 0 {
        parts.push(format!("{critical} critical"));
    }
    let warnings = count(Severity::Warning);
    if warnings > 0 {
        parts.push(plural(warnings, "warning"));
    }
    let suggestions = count(Severity::Suggestion);
    if suggestions > 0 {
        parts.push(plural(suggestions, "suggestion"));
    }

    format!("found {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_note() -> String {
        let mut md = String::from("# JVM垃圾回收\n\n## 核心概念\n\n");
        md.push_str("- **原理**：分代收集，新生代复制算法，老年代标记整理。\n");
        md.push_str("\n## 代码示例\n\n```java\nSystem.gc();\n```\n\n");
        md.push_str(&"GC 调优需要结合停顿时间与吞吐量目标。".repeat(5));
        md
    }

    #[test]
    fn scenario_d_short_content_is_critical() {
        let report = review("short", &ReviewConfig::default());
        assert_eq!(report.count(Severity::Critical), 1);
        assert_eq!(report.issues[0].issue, "content too short");
        assert!(report.summary.starts_with("found 1 critical"));
    }

    #[test]
    fn scenario_d_clean_note_passes() {
        let md = clean_note();
        assert!(md.chars().count() >= 100);

        let report = review(&md, &ReviewConfig::default());
        assert!(report.passed(), "unexpected issues: {:?}", report.issues);
        assert_eq!(report.summary, PASSED);
    }

    #[test]
    fn scenario_e_unbalanced_fence() {
        let md = format!("{}\n```\nunclosed", clean_note());
        let report = review(&md, &ReviewConfig::default());
        assert_eq!(report.summary, "found 1 critical");
        assert_eq!(
            report.issues,
            vec![ReviewIssue {
                severity: Severity::Critical,
                issue: "unbalanced code fence".into(),
            }]
        );
    }

    #[test]
    fn missing_core_section_is_warning() {
        let md = clean_note().replace("## 核心概念", "## Core");
        let report = review(&md, &ReviewConfig::default());
        assert_eq!(report.summary, "found 1 warning");
        assert_eq!(report.issues[0].severity, Severity::Warning);
    }

    #[test]
    fn placeholder_is_suggestion() {
        let md = format!("{}\n- 待补充核心概念", clean_note());
        let report = review(&md, &ReviewConfig::default());
        assert_eq!(report.issues[0].issue, "unresolved placeholder present");
        assert_eq!(report.summary, "found 1 suggestion");
    }

    #[test]
    fn summary_counts_every_severity() {
        let report = review("TODO ```", &ReviewConfig::default());
        assert_eq!(report.summary, "found 2 critical, 1 warning, 1 suggestion");
        let order: Vec<_> = report.issues.iter().map(|i| i.severity).collect();
        assert_eq!(
            order,
            vec![
                Severity::Critical,
                Severity::Warning,
                Severity::Suggestion,
                Severity::Critical
            ]
        );
    }

    #[test]
    fn custom_thresholds() {
        let config = ReviewConfig {
            min_length: 5,
            placeholder_markers: vec![],
        };
        let report = review("## 核心概念\n\nTODO", &config);
        assert!(report.passed());
    }
}
