//! Core domain types for notecraft notes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NotecraftError, Result};

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a topic transcript. Ordering is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now", alias = "time")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Decode a transcript: a JSON array of `{role, content, timestamp}`.
    pub fn parse_transcript(json: &str) -> Result<Vec<Message>> {
        serde_json::from_str(json)
            .map_err(|e| NotecraftError::parse(format!("invalid transcript JSON: {e}")))
    }
}

/// A question immediately answered by the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    /// Pair each user message with the next assistant message.
    ///
    /// A later user message replaces a still-unanswered earlier one, and assistant
    /// messages with no pending question are ignored.
    pub fn from_messages(messages: &[Message]) -> Vec<QaPair> {
        let mut pairs = Vec::new();
        let mut pending: Option<&str> = None;

        for msg in messages {
            match msg.role {
                Role::User => pending = Some(msg.content.as_str()),
                Role::Assistant => {
                    if let Some(question) = pending.take() {
                        pairs.push(QaPair {
                            question: question.to_string(),
                            answer: msg.content.clone(),
                        });
                    }
                }
            }
        }

        pairs
    }
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for topic session identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Note entries
// ---------------------------------------------------------------------------

/// A named concept; `name` is the keyword that matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub name: String,
    pub description: String,
}

/// One entry of the core-concepts section.
///
/// Text that is not a concept line is carried through merges as an opaque note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConceptEntry {
    Concept(Concept),
    Note { text: String },
}

/// A numbered key point; `title` is the merge key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub title: String,
    pub body: String,
}

/// A verbatim fenced code block. Labels are assigned on render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeSample(pub String);

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The fixed sections of a note. Declaration order is the canonical render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    CoreConcepts,
    KeyPoints,
    CodeSamples,
    Pitfalls,
    InterviewTakeaways,
}

impl SectionKind {
    /// All sections, in canonical order.
    pub const ALL: [SectionKind; 5] = [
        SectionKind::CoreConcepts,
        SectionKind::KeyPoints,
        SectionKind::CodeSamples,
        SectionKind::Pitfalls,
        SectionKind::InterviewTakeaways,
    ];

    /// The literal `## ` header text.
    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::CoreConcepts => "核心概念",
            SectionKind::KeyPoints => "要点总结",
            SectionKind::CodeSamples => "代码示例",
            SectionKind::Pitfalls => "易错点",
            SectionKind::InterviewTakeaways => "面试要点",
        }
    }

    pub fn from_heading(heading: &str) -> Option<Self> {
        let heading = heading.trim();
        Self::ALL.into_iter().find(|kind| kind.heading() == heading)
    }
}

/// The canonical note model: a title plus section bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    /// Canonical sections; the `BTreeMap` keeps them in canonical order.
    pub sections: BTreeMap<SectionKind, String>,
    /// Non-canonical `## ` sections in source order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,
    /// Date string from the `最后更新` footer, if one was parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Body of a canonical section, if present.
    pub fn section(&self, kind: SectionKind) -> Option<&str> {
        self.sections.get(&kind).map(String::as_str)
    }

    /// Set a section body. A blank body removes the section.
    pub fn set_section(&mut self, kind: SectionKind, body: impl Into<String>) {
        let body = body.into();
        if body.trim().is_empty() {
            self.sections.remove(&kind);
        } else {
            self.sections.insert(kind, body);
        }
    }

    /// Whether any `## ` section was recognized at all.
    pub fn has_sections(&self) -> bool {
        !self.sections.is_empty() || !self.extra.is_empty()
    }
}

/// Entry counts of a parsed note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub concepts: usize,
    pub key_points: usize,
    pub code_samples: usize,
    pub pitfalls: usize,
}

// ---------------------------------------------------------------------------
// Review report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIssue {
    pub severity: Severity,
    pub issue: String,
}

/// Outcome of the structural lint pass over a finished note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub summary: String,
    pub issues: Vec<ReviewIssue>,
}

impl ReviewReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_critical(&self) -> bool {
        self.count(Severity::Critical) > 0
    }

    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}
