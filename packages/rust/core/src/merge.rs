//! Structural merge of a stored note with a freshly synthesized one.
//!
//! Entries are matched by key (concept name, key-point title, pitfall text), never by
//! line position. Existing entries always win and come first; numbering and sample
//! labels are regenerated. Merging a canonical note with itself reproduces it.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use notecraft_markdown::sections::{
    parse_code_samples, parse_concepts, parse_key_points, parse_pitfalls, pitfall_key,
    render_code_samples, render_concepts, render_key_points, render_pitfalls,
};
use notecraft_markdown::{parse, render, today_label};
use notecraft_shared::{CodeSample, ConceptEntry, Document, KeyPoint, SectionKind};

use crate::synthesize::interview_takeaways;

/// Merge stored note text (if any) with new note text under `topic`.
#[instrument(skip_all, fields(topic = %topic, has_existing = existing.is_some()))]
pub fn merge(existing: Option<&str>, new: &str, topic: &str) -> String {
    let existing = existing.map(load_document);
    let new = load_document(new);
    render(&merge_documents(existing.as_ref(), &new, topic))
}

/// Parse note text, treating text without any `## ` section as an opaque
/// core-concepts body so that nothing is lost.
pub fn load_document(text: &str) -> Document {
    let doc = parse(text);
    if doc.has_sections() || text.trim().is_empty() {
        return doc;
    }

    warn!(
        chars = text.chars().count(),
        "note has no recognizable sections, keeping it as an opaque concepts body"
    );

    let mut title_dropped = false;
    let blob = text
        .lines()
        .filter(|line| {
            if !title_dropped && line.starts_with("# ") {
                title_dropped = true;
                return false;
            }
            true
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut fallback = Document::new(doc.title);
    fallback.set_section(SectionKind::CoreConcepts, blob.trim());
    fallback.updated_on = doc.updated_on;
    fallback
}

/// Merge two documents section by section. The title is always `topic`.
pub fn merge_documents(existing: Option<&Document>, new: &Document, topic: &str) -> Document {
    let body = |doc: Option<&Document>, kind: SectionKind| -> String {
        doc.and_then(|d| d.section(kind)).unwrap_or_default().to_string()
    };
    let old_body = |kind| body(existing, kind);
    let new_body = |kind| body(Some(new), kind);

    let concepts = merge_concepts(
        parse_concepts(&old_body(SectionKind::CoreConcepts)),
        parse_concepts(&new_body(SectionKind::CoreConcepts)),
    );
    let key_points = merge_key_points(
        parse_key_points(&old_body(SectionKind::KeyPoints)),
        parse_key_points(&new_body(SectionKind::KeyPoints)),
    );
    let samples = merge_code_samples(
        parse_code_samples(&old_body(SectionKind::CodeSamples)),
        parse_code_samples(&new_body(SectionKind::CodeSamples)),
    );
    let pitfalls = merge_pitfalls(
        parse_pitfalls(&old_body(SectionKind::Pitfalls)),
        parse_pitfalls(&new_body(SectionKind::Pitfalls)),
    );

    debug!(
        concepts = concepts.len(),
        key_points = key_points.len(),
        code_samples = samples.len(),
        pitfalls = pitfalls.len(),
        "merged sections"
    );

    let mut merged = Document::new(topic);
    merged.set_section(SectionKind::CoreConcepts, render_concepts(&concepts));
    merged.set_section(SectionKind::KeyPoints, render_key_points(&key_points));
    merged.set_section(SectionKind::CodeSamples, render_code_samples(&samples));
    merged.set_section(SectionKind::Pitfalls, render_pitfalls(&pitfalls));
    merged.set_section(SectionKind::InterviewTakeaways, interview_takeaways(topic));

    let mut headings = HashSet::new();
    merged.extra = existing
        .into_iter()
        .flat_map(|d| d.extra.iter())
        .chain(new.extra.iter())
        .filter(|(heading, _)| headings.insert(heading.clone()))
        .cloned()
        .collect();

    merged.updated_on = Some(today_label());
    merged
}

/// Union of concept entries: concepts unique by name, notes unique by text.
fn merge_concepts(existing: Vec<ConceptEntry>, new: Vec<ConceptEntry>) -> Vec<ConceptEntry> {
    let mut names = HashSet::new();
    let mut notes = HashSet::new();

    existing
        .into_iter()
        .chain(new)
        .filter(|entry| match entry {
            ConceptEntry::Concept(c) => names.insert(c.name.clone()),
            ConceptEntry::Note { text } => notes.insert(text.clone()),
        })
        .collect()
}

fn merge_key_points(existing: Vec<KeyPoint>, new: Vec<KeyPoint>) -> Vec<KeyPoint> {
    let mut titles = HashSet::new();
    existing
        .into_iter()
        .chain(new)
        .filter(|point| titles.insert(point.title.clone()))
        .collect()
}

/// Keep every existing sample, then append the new samples whose block does not
/// already occur in the existing note.
fn merge_code_samples(existing: Vec<CodeSample>, new: Vec<CodeSample>) -> Vec<CodeSample> {
    let known: HashSet<String> = existing.iter().map(|sample| sample.0.clone()).collect();
    let fresh: Vec<CodeSample> = new
        .into_iter()
        .filter(|sample| !known.contains(&sample.0))
        .collect();

    existing.into_iter().chain(fresh).collect()
}

fn merge_pitfalls(existing: Vec<String>, new: Vec<String>) -> Vec<String> {
    let mut keys = HashSet::new();
    existing
        .into_iter()
        .chain(new)
        .filter(|text| keys.insert(pitfall_key(text).to_string()))
        .collect()
}
