//! Note serializer: the exact inverse of the parser for canonical documents.

use chrono::{Datelike, Local, NaiveDate};

use notecraft_shared::{Document, SectionKind};

use crate::sections::{CONCEPTS_PLACEHOLDER, KEY_POINTS_PLACEHOLDER};

/// Render a document as note markdown.
///
/// Sections come out in canonical order; empty code-sample, pitfall and takeaway
/// sections are omitted, empty core-concept and key-point sections get a
/// placeholder. Non-canonical sections follow, then the `最后更新` footer using the
/// document's date or today's.
pub fn render(doc: &Document) -> String {
    let mut out = format!("# {}\n\n", doc.title);

    for kind in SectionKind::ALL {
        let body = doc.section(kind).map(str::trim).unwrap_or_default();
        let body = match (body.is_empty(), kind) {
            (false, _) => body,
            (true, SectionKind::CoreConcepts) => CONCEPTS_PLACEHOLDER,
            (true, SectionKind::KeyPoints) => KEY_POINTS_PLACEHOLDER,
            (true, _) => continue,
        };
        out.push_str(&format!("## {}\n\n{body}\n\n", kind.heading()));
    }

    for (heading, body) in &doc.extra {
        let body = body.trim();
        if body.is_empty() {
            out.push_str(&format!("## {heading}\n\n"));
        } else {
            out.push_str(&format!("## {heading}\n\n{body}\n\n"));
        }
    }

    let date = doc.updated_on.clone().unwrap_or_else(today_label);
    out.push_str(&format!("---\n*最后更新：{date}*\n"));

    out
}

/// Format a date the way `zh-CN` short dates read: `YYYY/M/D`, no zero padding.
pub fn date_label(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

/// Today's local date as a footer label.
pub fn today_label() -> String {
    date_label(Local::now().date_naive())
}
