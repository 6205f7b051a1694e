//! Note markdown: parsing, rendering and section grammars.
//!
//! A note is a `# Title` followed by fixed `## ` sections (see
//! [`SectionKind`](notecraft_shared::SectionKind)) and a `最后更新` footer. This crate
//! converts between that text and the [`Document`] model, and parses section bodies
//! into entries for the merger and for statistics.

mod normalize;
mod parser;
mod render;
pub mod sections;

pub use normalize::run_pipeline as normalize_text;
pub use parser::parse;
pub use render::{date_label, render, today_label};

use notecraft_shared::{ConceptEntry, Document, DocumentStats, SectionKind};

/// Count the entries of each structured section.
pub fn stats(doc: &Document) -> DocumentStats {
    let body = move |kind: SectionKind| doc.section(kind).unwrap_or_default();

    DocumentStats {
        concepts: sections::parse_concepts(body(SectionKind::CoreConcepts))
            .iter()
            .filter(|e| matches!(e, ConceptEntry::Concept(_)))
            .count(),
        key_points: sections::parse_key_points(body(SectionKind::KeyPoints)).len(),
        code_samples: sections::parse_code_samples(body(SectionKind::CodeSamples)).len(),
        pitfalls: sections::parse_pitfalls(body(SectionKind::Pitfalls)).len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/notes")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    #[test]
    fn fixture_roundtrips_exactly() {
        let content = fixture("jvm-gc.md");
        assert_eq!(render(&parse(&content)), content);
    }

    #[test]
    fn fixture_stats() {
        let doc = parse(&fixture("jvm-gc.md"));
        assert_eq!(
            stats(&doc),
            DocumentStats {
                concepts: 2,
                key_points: 2,
                code_samples: 1,
                pitfalls: 2,
            }
        );
    }

    #[test]
    fn stats_of_foreign_text_are_zero() {
        assert_eq!(stats(&parse("hello")), DocumentStats::default());
    }
}
