//! Transcript → note synthesis.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use notecraft_markdown::sections::{render_code_samples, render_concepts, render_key_points, render_pitfalls};
use notecraft_markdown::{normalize_text, render, today_label};
use notecraft_shared::{
    CodeSample, ConceptEntry, Document, ExtractionConfig, KeyPoint, Message, QaPair, SectionKind,
};

use crate::extract::{extract_concepts, extract_pitfalls};

/// Key-point titles longer than this many characters are truncated.
const MAX_TITLE_CHARS: usize = 50;

/// Key-point bodies longer than this many characters are truncated.
const MAX_BODY_CHARS: usize = 150;

/// Title used when a question is empty after prefix stripping.
const FALLBACK_TITLE: &str = "相关问题";

/// Stands in for code blocks inside key-point bodies.
const CODE_PLACEHOLDER: &str = "[代码]";

/// Matches a fenced code block (non-greedy, across lines).
static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```.*?```").expect("code block regex")
});

/// Matches a leading `/interview` or `/review` command token.
static COMMAND_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^/(?:interview|review)\s*").expect("command prefix regex")
});

/// Matches a leading `保存` (save) command word.
static SAVE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^保存\s*").expect("save prefix regex")
});

/// Synthesize note markdown for `topic` from a transcript.
pub fn synthesize(topic: &str, messages: &[Message], config: &ExtractionConfig) -> String {
    render(&synthesize_document(topic, messages, config))
}

/// Build the note [`Document`] for `topic` from a transcript.
///
/// An empty transcript yields a minimal note with placeholder sections.
#[instrument(skip_all, fields(topic = %topic, messages = messages.len()))]
pub fn synthesize_document(topic: &str, messages: &[Message], config: &ExtractionConfig) -> Document {
    let pairs: Vec<QaPair> = QaPair::from_messages(messages)
        .into_iter()
        .map(|pair| QaPair {
            question: pair.question,
            answer: normalize_text(&pair.answer),
        })
        .collect();

    let concepts: Vec<ConceptEntry> = extract_concepts(&pairs, config)
        .into_iter()
        .map(ConceptEntry::Concept)
        .collect();
    let pitfalls = extract_pitfalls(&pairs, config);
    let samples = collect_code_samples(&pairs, config.max_code_samples);
    let key_points = build_key_points(&pairs, config.max_key_points);

    debug!(
        pairs = pairs.len(),
        concepts = concepts.len(),
        key_points = key_points.len(),
        code_samples = samples.len(),
        pitfalls = pitfalls.len(),
        "synthesized note"
    );

    let mut doc = Document::new(topic);
    doc.set_section(SectionKind::CoreConcepts, render_concepts(&concepts));
    doc.set_section(SectionKind::KeyPoints, render_key_points(&key_points));
    doc.set_section(SectionKind::CodeSamples, render_code_samples(&samples));
    doc.set_section(SectionKind::Pitfalls, render_pitfalls(&pitfalls));
    doc.set_section(SectionKind::InterviewTakeaways, interview_takeaways(topic));
    doc.updated_on = Some(today_label());
    doc
}

/// The fixed review-focus bullets for a topic.
pub fn interview_takeaways(topic: &str) -> String {
    format!("- 理解{topic}的基本原理\n- 能够结合实际场景分析\n- 了解常见问题和优化方案")
}

/// Fenced code blocks from all answers, in answer order.
fn collect_code_samples(pairs: &[QaPair], limit: usize) -> Vec<CodeSample> {
    pairs
        .iter()
        .flat_map(|pair| CODE_BLOCK_RE.find_iter(&pair.answer))
        .take(limit)
        .map(|m| CodeSample(m.as_str().to_string()))
        .collect()
}

/// One key point per pair, unique by title, in pair order.
fn build_key_points(pairs: &[QaPair], limit: usize) -> Vec<KeyPoint> {
    let mut seen = HashSet::new();

    pairs
        .iter()
        .map(|pair| KeyPoint {
            title: simplify_question(&pair.question),
            body: summarize_answer(&pair.answer),
        })
        .filter(|point| seen.insert(point.title.clone()))
        .take(limit)
        .collect()
}

/// Strip command prefixes, collapse whitespace, and truncate a question to a title.
pub(crate) fn simplify_question(question: &str) -> String {
    let stripped = COMMAND_PREFIX_RE.replace(question.trim(), "");
    let stripped = SAVE_PREFIX_RE.replace(&stripped, "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        return FALLBACK_TITLE.to_string();
    }
    truncate_chars(&collapsed, MAX_TITLE_CHARS)
}

/// First paragraph of an answer with code replaced by a placeholder, truncated.
pub(crate) fn summarize_answer(answer: &str) -> String {
    // An unclosed fence would swallow the rest of the note once rendered.
    let without_code = CODE_BLOCK_RE
        .replace_all(answer, CODE_PLACEHOLDER)
        .replace("```", CODE_PLACEHOLDER);
    let without_code = without_code.trim();
    let first_paragraph = without_code.split("\n\n").next().unwrap_or_default();

    let truncated = truncate_chars(first_paragraph, MAX_BODY_CHARS);
    truncated
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head.trim_end())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notecraft_markdown::{parse, sections};

    fn scenario_a() -> Vec<Message> {
        vec![
            Message::user("JVM垃圾回收原理是什么"),
            Message::assistant("其原理是分代收集，注意避免频繁Full GC"),
        ]
    }

    fn load_transcript(name: &str) -> Vec<Message> {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/transcripts")
            .join(name);
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"));
        serde_json::from_str(&content).expect("valid transcript json")
    }

    #[test]
    fn scenario_a_concept_and_pitfall() {
        let md = synthesize("JVM垃圾回收", &scenario_a(), &ExtractionConfig::default());
        let doc = parse(&md);

        let concepts = sections::parse_concepts(doc.section(SectionKind::CoreConcepts).unwrap());
        assert!(concepts
            .iter()
            .any(|e| matches!(e, ConceptEntry::Concept(c) if c.name == "原理")));

        let pitfalls = sections::parse_pitfalls(doc.section(SectionKind::Pitfalls).unwrap());
        assert!(pitfalls.iter().any(|p| p.contains("避免")));
    }

    #[test]
    fn scenario_a_exact_layout() {
        let mut doc = synthesize_document("JVM垃圾回收", &scenario_a(), &ExtractionConfig::default());
        doc.updated_on = Some("2024/11/2".into());

        assert_eq!(
            render(&doc),
            "# JVM垃圾回收\n\n\
             ## 核心概念\n\n- **原理**：其原理是分代收集，注意避免频繁Full GC...\n\n\
             ## 要点总结\n\n1. **JVM垃圾回收原理是什么**\n   其原理是分代收集，注意避免频繁Full GC\n\n\
             ## 易错点\n\n1. 其原理是分代收集，注意避免频繁Full GC。\n\n\
             ## 面试要点\n\n- 理解JVM垃圾回收的基本原理\n- 能够结合实际场景分析\n- 了解常见问题和优化方案\n\n\
             ---\n*最后更新：2024/11/2*\n"
        );
    }

    #[test]
    fn empty_transcript_yields_minimal_note() {
        let doc = synthesize_document("Kafka", &[], &ExtractionConfig::default());
        let md = render(&doc);

        assert!(md.contains("## 核心概念\n\n- 待补充核心概念"));
        assert!(md.contains("## 要点总结\n\n- 待补充要点"));
        assert!(!md.contains("## 代码示例"));
        assert!(!md.contains("## 易错点"));
        assert!(md.contains("- 理解Kafka的基本原理"));
    }

    #[test]
    fn key_points_are_capped() {
        let messages: Vec<Message> = (0..50)
            .flat_map(|i| {
                [
                    Message::user(format!("问题 {i}")),
                    Message::assistant(format!("回答 {i}")),
                ]
            })
            .collect();
        let doc = synthesize_document("T", &messages, &ExtractionConfig::default());
        let points = sections::parse_key_points(doc.section(SectionKind::KeyPoints).unwrap());

        assert_eq!(points.len(), 5);
        assert_eq!(points[4].title, "问题 4");
    }

    #[test]
    fn list_shaped_answers_do_not_inflate_key_points() {
        let messages: Vec<Message> = (0..6)
            .flat_map(|i| {
                [
                    Message::user(format!("步骤 {i}")),
                    Message::assistant("分两步：\n1. **准备**\n2. **执行**"),
                ]
            })
            .collect();
        let doc = synthesize_document("T", &messages, &ExtractionConfig::default());

        let stats = notecraft_markdown::stats(&doc);
        assert_eq!(stats.key_points, 5);
        assert_eq!(stats, notecraft_markdown::stats(&parse(&render(&doc))));
    }

    #[test]
    fn answers_are_normalized_before_extraction() {
        let messages = vec![
            Message::user("q"),
            Message::assistant("写法：```sh\r\nls -la   \r\n```"),
        ];
        let doc = synthesize_document("T", &messages, &ExtractionConfig::default());
        assert_eq!(
            doc.section(SectionKind::CodeSamples),
            Some("### 示例 1\n\n```sh\nls -la\n```")
        );
    }

    #[test]
    fn code_samples_are_collected_and_capped() {
        let answer = "```a\n1\n```\n\n```b\n2\n```";
        let messages = vec![
            Message::user("q1"),
            Message::assistant(answer),
            Message::user("q2"),
            Message::assistant(answer),
        ];
        let doc = synthesize_document("T", &messages, &ExtractionConfig::default());
        let samples = sections::parse_code_samples(doc.section(SectionKind::CodeSamples).unwrap());

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[2].0, "```a\n1\n```");
        assert!(doc.section(SectionKind::CodeSamples).unwrap().starts_with("### 示例 1\n\n```a"));
    }

    #[test]
    fn simplify_question_strips_prefixes() {
        assert_eq!(simplify_question("/interview  JVM垃圾回收"), "JVM垃圾回收");
        assert_eq!(simplify_question("/REVIEW redis"), "redis");
        assert_eq!(simplify_question("保存"), FALLBACK_TITLE);
        assert_eq!(simplify_question("   "), FALLBACK_TITLE);
        assert_eq!(simplify_question("多行\n问题"), "多行 问题");
    }

    #[test]
    fn simplify_question_truncates_by_chars() {
        let title = simplify_question(&"问".repeat(60));
        assert_eq!(title, format!("{}...", "问".repeat(50)));
    }

    #[test]
    fn summarize_answer_uses_first_paragraph() {
        let answer = "可以这样写：```rust\nfn main() {}\n```\n\n第二段不会出现";
        assert_eq!(summarize_answer(answer), "可以这样写：[代码]");

        assert_eq!(summarize_answer("先写 ```python 然后"), "先写 [代码]python 然后");

        let long = "长".repeat(200);
        assert_eq!(summarize_answer(&long), format!("{}...", "长".repeat(150)));
    }

    #[test]
    fn fixture_transcript_synthesizes() {
        let messages = load_transcript("jvm-gc.json");
        let doc = synthesize_document("JVM垃圾回收", &messages, &ExtractionConfig::default());
        let stats = notecraft_markdown::stats(&doc);

        // The trailing question has no answer and is dropped.
        assert_eq!(stats.key_points, 3);
        assert_eq!(stats.code_samples, 1);
        assert_eq!(stats.pitfalls, 2);
        assert!(stats.concepts >= 1);

        let points = sections::parse_key_points(doc.section(SectionKind::KeyPoints).unwrap());
        assert_eq!(points[0].title, "JVM垃圾回收");
        assert_eq!(points[2].body, "可以调用：");
    }
}
