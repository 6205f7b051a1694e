//! Grammars for the bodies of the canonical note sections.
//!
//! Each section has a `parse_*` function turning a body into entries and a
//! `render_*` function producing the exact body text. Rendering then parsing yields
//! the same entries, which is what keeps merges idempotent.

use std::sync::LazyLock;

use regex::Regex;

use notecraft_shared::{CodeSample, Concept, ConceptEntry, KeyPoint};

/// Body rendered for an empty core-concepts section.
pub const CONCEPTS_PLACEHOLDER: &str = "- 待补充核心概念";

/// Body rendered for an empty key-points section.
pub const KEY_POINTS_PLACEHOLDER: &str = "- 待补充要点";

/// Label prefix of code-sample subheadings.
pub const SAMPLE_LABEL: &str = "示例";

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `- **name**：description` (full-width or ASCII colon).
static CONCEPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^- \*\*(.+?)\*\*[：:]\s*(.*)$").expect("concept regex")
});

/// Matches `N. **title**`.
static KEY_POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\s+\*\*(.+)\*\*$").expect("key point regex")
});

/// Matches a `### ` subheading.
static SUBHEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^###\s+").expect("subheading regex")
});

/// Matches a list marker (`N.`, `-`, `*`) in front of a pitfall line.
static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+\.|[-*])\s+").expect("list marker regex")
});

/// Whether `line` opens or closes a fenced block. A line carrying both fences of
/// an inline block (```` ```ls``` ````) leaves the fence state unchanged.
pub(crate) fn toggles_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") && trimmed.matches("```").count() % 2 == 1
}

// ---------------------------------------------------------------------------
// Core concepts
// ---------------------------------------------------------------------------

/// Parse a core-concepts body. Runs of non-concept text become opaque notes.
pub fn parse_concepts(body: &str) -> Vec<ConceptEntry> {
    let mut entries = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for line in body.lines() {
        let trimmed = line.trim();

        if let Some(caps) = CONCEPT_RE.captures(trimmed) {
            flush_note(&mut pending, &mut entries);
            entries.push(ConceptEntry::Concept(Concept {
                name: caps[1].trim().to_string(),
                description: caps[2].trim().to_string(),
            }));
            continue;
        }

        if trimmed == CONCEPTS_PLACEHOLDER {
            flush_note(&mut pending, &mut entries);
            continue;
        }

        pending.push(line);
    }
    flush_note(&mut pending, &mut entries);

    entries
}

fn flush_note(pending: &mut Vec<&str>, entries: &mut Vec<ConceptEntry>) {
    let text = pending.join("\n").trim().to_string();
    pending.clear();
    if !text.is_empty() {
        entries.push(ConceptEntry::Note { text });
    }
}

/// Render core-concept entries; consecutive concepts share a line block, notes
/// are set off by blank lines.
pub fn render_concepts(entries: &[ConceptEntry]) -> String {
    if entries.is_empty() {
        return CONCEPTS_PLACEHOLDER.to_string();
    }

    let mut out = String::new();
    let mut previous_was_concept = false;

    for (i, entry) in entries.iter().enumerate() {
        let is_concept = matches!(entry, ConceptEntry::Concept(_));
        if i > 0 {
            out.push_str(if is_concept && previous_was_concept {
                "\n"
            } else {
                "\n\n"
            });
        }
        match entry {
            ConceptEntry::Concept(c) => {
                out.push_str(&format!("- **{}**：{}", c.name, c.description));
            }
            ConceptEntry::Note { text } => out.push_str(text),
        }
        previous_was_concept = is_concept;
    }

    out
}

// ---------------------------------------------------------------------------
// Key points
// ---------------------------------------------------------------------------

/// Parse a key-points body. Text before the first numbered item is dropped.
///
/// Only an unindented `N. **title**` line starts an item; indented lines belong to
/// the current item's body even when they look like a numbered list themselves.
pub fn parse_key_points(body: &str) -> Vec<KeyPoint> {
    let mut points: Vec<(String, Vec<&str>)> = Vec::new();

    for line in body.lines() {
        if let Some(caps) = KEY_POINT_RE.captures(line.trim_end()) {
            points.push((caps[1].trim().to_string(), Vec::new()));
        } else if let Some((_, lines)) = points.last_mut() {
            lines.push(line.trim());
        }
    }

    points
        .into_iter()
        .map(|(title, lines)| KeyPoint {
            title,
            body: lines.join("\n").trim().to_string(),
        })
        .collect()
}

/// Render key points numbered from 1, bodies indented by three spaces.
pub fn render_key_points(points: &[KeyPoint]) -> String {
    if points.is_empty() {
        return KEY_POINTS_PLACEHOLDER.to_string();
    }

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut item = format!("{}. **{}**", i + 1, point.title);
            if !point.body.is_empty() {
                let indented = point
                    .body
                    .lines()
                    .map(|l| if l.is_empty() { String::new() } else { format!("   {l}") })
                    .collect::<Vec<_>>()
                    .join("\n");
                item.push('\n');
                item.push_str(&indented);
            }
            item
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ---------------------------------------------------------------------------
// Code samples
// ---------------------------------------------------------------------------

/// Parse a code-samples body into blocks, one per `### ` subheading.
///
/// Subheadings inside fences are content, and loose content before the first
/// subheading is kept as a sample of its own.
pub fn parse_code_samples(body: &str) -> Vec<CodeSample> {
    let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];
    let mut in_fence = false;

    for line in body.lines() {
        if toggles_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence && SUBHEADING_RE.is_match(line) {
            blocks.push(Vec::new());
            continue;
        }
        if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    blocks
        .into_iter()
        .map(|lines| lines.join("\n").trim().to_string())
        .filter(|block| !block.is_empty())
        .map(CodeSample)
        .collect()
}

/// Render code samples relabeled `### 示例 1..N`.
pub fn render_code_samples(samples: &[CodeSample]) -> String {
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| format!("### {SAMPLE_LABEL} {}\n\n{}", i + 1, sample.0))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ---------------------------------------------------------------------------
// Pitfalls
// ---------------------------------------------------------------------------

/// Parse a pitfalls body: one entry per non-blank line, list markers removed.
pub fn parse_pitfalls(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| LIST_MARKER_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Render pitfalls as a numbered list.
pub fn render_pitfalls(pitfalls: &[String]) -> String {
    pitfalls
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {text}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Dedup key of a pitfall: trimmed, trailing sentence period removed.
pub fn pitfall_key(text: &str) -> &str {
    text.trim().trim_end_matches(['。', '.']).trim_end()
}
