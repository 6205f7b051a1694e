//! Concept and pitfall extraction from question/answer pairs.
//!
//! Both extractors scan each answer for the first configured keyword and keep at
//! most one entry per pair. Output depends only on pair order and keyword order.

use std::collections::HashSet;

use tracing::debug;

use notecraft_markdown::sections::pitfall_key;
use notecraft_shared::{Concept, ExtractionConfig, QaPair};

use crate::scanner::KeywordScanner;

/// Context windows at or below this many characters are not worth a concept.
const MIN_CONCEPT_CONTEXT: usize = 10;

/// Pitfall sentences must be strictly between these character lengths.
const PITFALL_MIN_CHARS: usize = 10;
const PITFALL_MAX_CHARS: usize = 100;

/// Sentence terminators used when cutting pitfall sentences.
const SENTENCE_BREAKS: [char; 4] = ['。', '！', '；', '\n'];

/// Extract up to `max_concepts` concepts, unique by name (first occurrence wins).
pub fn extract_concepts(pairs: &[QaPair], config: &ExtractionConfig) -> Vec<Concept> {
    let scanner = KeywordScanner::new(&config.concept_keywords);
    let mut seen = HashSet::new();

    let concepts: Vec<Concept> = pairs
        .iter()
        .filter_map(|pair| scanner.scan(&pair.answer))
        .filter(|window| window.text.chars().count() > MIN_CONCEPT_CONTEXT)
        .filter(|window| seen.insert(window.keyword))
        .take(config.max_concepts)
        .map(|window| {
            let mut description = window.display().trim().to_string();
            if !description.ends_with("...") {
                description.push_str("...");
            }
            Concept {
                name: window.keyword.to_string(),
                description,
            }
        })
        .collect();

    debug!(pairs = pairs.len(), concepts = concepts.len(), "extracted concepts");
    concepts
}

/// Extract up to `max_pitfalls` pitfall sentences, unique by normalized text.
pub fn extract_pitfalls(pairs: &[QaPair], config: &ExtractionConfig) -> Vec<String> {
    let scanner = KeywordScanner::new(&config.pitfall_keywords);
    let mut seen = HashSet::new();
    let mut pitfalls = Vec::new();

    for pair in pairs {
        if pitfalls.len() >= config.max_pitfalls {
            break;
        }
        let Some((keyword, _)) = scanner.find(&pair.answer) else {
            continue;
        };
        let Some(sentence) = pitfall_sentence(&pair.answer, keyword) else {
            continue;
        };
        if seen.insert(pitfall_key(&sentence).to_string()) {
            pitfalls.push(sentence);
        }
    }

    debug!(pairs = pairs.len(), pitfalls = pitfalls.len(), "extracted pitfalls");
    pitfalls
}

/// The first sentence of `answer` that mentions `keyword` and has a sensible length,
/// normalized to end with a single `。`.
fn pitfall_sentence(answer: &str, keyword: &str) -> Option<String> {
    answer
        .split(SENTENCE_BREAKS)
        .find(|sentence| {
            let len = sentence.chars().count();
            sentence.contains(keyword) && len > PITFALL_MIN_CHARS && len < PITFALL_MAX_CHARS
        })
        .map(|sentence| format!("{}。", pitfall_key(sentence)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(question: &str, answer: &str) -> QaPair {
        QaPair {
            question: question.into(),
            answer: answer.into(),
        }
    }

    #[test]
    fn concept_from_scenario_answer() {
        let pairs = vec![pair("JVM垃圾回收原理是什么", "其原理是分代收集，注意避免频繁Full GC")];
        let concepts = extract_concepts(&pairs, &ExtractionConfig::default());

        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].name, "原理");
        assert_eq!(concepts[0].description, "其原理是分代收集，注意避免频繁Full GC...");
    }

    #[test]
    fn concept_description_has_no_edge_whitespace() {
        let pairs = vec![pair("q", "\n其原理是分代收集，新生代使用复制算法\n")];
        let concepts = extract_concepts(&pairs, &ExtractionConfig::default());
        assert_eq!(concepts[0].description, "其原理是分代收集，新生代使用复制算法...");
    }

    #[test]
    fn concept_needs_enough_context() {
        let pairs = vec![pair("q", "原理很简单")];
        assert!(extract_concepts(&pairs, &ExtractionConfig::default()).is_empty());
    }

    #[test]
    fn only_first_keyword_per_pair_counts() {
        // "原理" comes before "架构" in the keyword list, so the answer only yields 原理.
        let pairs = vec![pair("q", "整体架构分为三层，其原理是请求先经过网关再路由")];
        let concepts = extract_concepts(&pairs, &ExtractionConfig::default());
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].name, "原理");
    }

    #[test]
    fn concepts_are_unique_and_capped() {
        let config = ExtractionConfig::default();
        let mut pairs = vec![
            pair("a", "第一个回答讲的是原理，内容足够长足够长"),
            pair("b", "第二个回答也讲原理，但是会被去重丢掉的"),
        ];
        for kw in ["机制", "算法", "模型", "架构", "设计", "模式"] {
            pairs.push(pair("q", &format!("这个回答的重点在于{kw}，内容足够长")));
        }

        let concepts = extract_concepts(&pairs, &config);
        assert_eq!(concepts.len(), 5);
        assert_eq!(concepts[0].name, "原理");
        assert!(concepts[0].description.contains("第一个回答"));
        let names: HashSet<_> = concepts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), concepts.len());
    }

    #[test]
    fn pitfall_from_scenario_answer() {
        let pairs = vec![pair("JVM垃圾回收原理是什么", "其原理是分代收集，注意避免频繁Full GC")];
        let pitfalls = extract_pitfalls(&pairs, &ExtractionConfig::default());
        assert_eq!(pitfalls, vec!["其原理是分代收集，注意避免频繁Full GC。"]);
        assert!(pitfalls[0].contains("避免"));
    }

    #[test]
    fn pitfall_sentence_length_bounds() {
        // The first sentence mentioning the keyword is too short, the second fits.
        let answer = "注意索引。写 SQL 时注意不要在索引列上做函数运算！其他";
        let pitfalls = extract_pitfalls(&[pair("q", answer)], &ExtractionConfig::default());
        assert_eq!(pitfalls, vec!["写 SQL 时注意不要在索引列上做函数运算。"]);
    }

    #[test]
    fn pitfalls_dedup_by_normalized_text() {
        let pairs = vec![
            pair("a", "生产环境中不要随意调用 System.gc()"),
            pair("b", "生产环境中不要随意调用 System.gc()。"),
        ];
        let pitfalls = extract_pitfalls(&pairs, &ExtractionConfig::default());
        assert_eq!(pitfalls.len(), 1);
    }

    #[test]
    fn pitfalls_are_capped() {
        let pairs: Vec<QaPair> = (0..12)
            .map(|i| pair("q", &format!("第{i}条：千万注意这个容易踩的坑编号{i}")))
            .collect();
        let pitfalls = extract_pitfalls(&pairs, &ExtractionConfig::default());
        assert_eq!(pitfalls.len(), 5);
    }

    #[test]
    fn custom_keywords_are_honored() {
        let config = ExtractionConfig {
            concept_keywords: vec!["mechanism".into()],
            pitfall_keywords: vec!["avoid".into()],
            ..ExtractionConfig::default()
        };
        let pairs = vec![pair(
            "How does the borrow checker work?",
            "The core mechanism is lifetimes.\nAvoid fighting it; avoid cloning everything to silence errors",
        )];

        let concepts = extract_concepts(&pairs, &config);
        assert_eq!(concepts[0].name, "mechanism");
        assert_eq!(
            concepts[0].description,
            "The core mechanism is lifetimes. Avoid fighting it; avoid cloning everything to silence errors..."
        );

        let pitfalls = extract_pitfalls(&pairs, &config);
        assert_eq!(
            pitfalls,
            vec!["Avoid fighting it; avoid cloning everything to silence errors。"]
        );
    }
}
