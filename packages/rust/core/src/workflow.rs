//! Save workflow: synthesize → merge with the stored note → review → persist.
//!
//! The engine functions are pure; this module is the one place that talks to a
//! [`NoteStore`] collaborator. Both save flavours share one code path and differ
//! only in what happens once the final note is ready (see [`SaveMode`]).

use std::collections::BTreeMap;
use std::future::Future;

use chrono::Local;
use serde::Serialize;
use tracing::{info, instrument, warn};

use notecraft_markdown::{parse, stats, today_label};
use notecraft_shared::{
    AppConfig, DocumentStats, Message, NotecraftError, Result, ReviewReport, SaveMode, SessionId,
};

use crate::merge::merge;
use crate::review::review;
use crate::session::SessionStore;
use crate::synthesize::synthesize;
use crate::topic::{category_for, note_path, topic_filename};

// ---------------------------------------------------------------------------
// Collaborator
// ---------------------------------------------------------------------------

/// Storage of note files by store-relative path (a local checkout, a hosting API...).
pub trait NoteStore {
    /// Read a note. `Ok(None)` when it does not exist.
    fn read_note(&self, path: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Create or replace a note, recording `message` as the change description.
    fn write_note(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// All note paths (`*.md`) in the store.
    fn list_notes(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}

// ---------------------------------------------------------------------------
// Options & outcome
// ---------------------------------------------------------------------------

/// Per-call switches for [`save_topic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    pub mode: SaveMode,
    /// Persist even when the review reports critical issues.
    pub allow_critical: bool,
}

/// A proposed change for callers that publish through review branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRequest {
    pub branch: String,
    pub commit_message: String,
    pub title: String,
    pub body: String,
}

/// Result of a save.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub topic: String,
    /// Store-relative note path.
    pub path: String,
    /// Whether the note did not exist before.
    pub created: bool,
    /// Whether the note was written to the store.
    pub committed: bool,
    /// The final note markdown.
    pub content: String,
    pub review: ReviewReport,
    pub stats: DocumentStats,
    /// Present in [`SaveMode::SummaryThenSave`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_request: Option<ChangeRequest>,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Build the note for `topic` from `messages`, merge it with the stored copy and
/// persist or propose it according to `options.mode`.
#[instrument(skip_all, fields(topic = %topic, messages = messages.len(), mode = ?options.mode))]
pub async fn save_topic<S: NoteStore>(
    store: &S,
    topic: &str,
    messages: &[Message],
    config: &AppConfig,
    options: SaveOptions,
) -> Result<SaveOutcome> {
    if messages.is_empty() {
        return Err(NotecraftError::validation(format!(
            "topic '{topic}' has no discussion to save"
        )));
    }

    let path = note_path(topic, &config.categories);
    let existing = store.read_note(&path).await?;
    let created = existing.is_none();

    let synthesized = synthesize(topic, messages, &config.extraction);
    let content = merge(existing.as_deref(), &synthesized, topic);
    let report = review(&content, &config.review);
    let note_stats = stats(&parse(&content));

    info!(
        %path,
        created,
        summary = %report.summary,
        key_points = note_stats.key_points,
        "note prepared"
    );

    let date = today_label();
    let verb = if created { "Add" } else { "Update" };
    let commit_message = format!("{verb}: {topic} - {date}");

    let mut outcome = SaveOutcome {
        topic: topic.to_string(),
        path,
        created,
        committed: false,
        content,
        review: report,
        stats: note_stats,
        change_request: None,
    };

    match options.mode {
        SaveMode::DirectCommit => {
            if outcome.review.has_critical() && !options.allow_critical {
                warn!(summary = %outcome.review.summary, "refusing to save note with critical issues");
                return Err(NotecraftError::validation(format!(
                    "self-review blocked the save: {}",
                    outcome.review.summary
                )));
            }
            store
                .write_note(&outcome.path, &outcome.content, &commit_message)
                .await?;
            outcome.committed = true;
        }
        SaveMode::SummaryThenSave => {
            outcome.change_request = Some(change_request(
                &outcome,
                messages.len(),
                category_for(topic, &config.categories),
                commit_message,
            ));
        }
    }

    Ok(outcome)
}

/// Save the note of a stored session and close the session on success.
pub async fn save_session<S: NoteStore>(
    store: &S,
    sessions: &mut SessionStore,
    id: SessionId,
    config: &AppConfig,
    options: SaveOptions,
) -> Result<SaveOutcome> {
    let session = sessions
        .get(id)
        .ok_or_else(|| NotecraftError::session("no active session; start a topic first"))?;

    let outcome = save_topic(store, &session.topic, &session.messages, config, options).await?;
    sessions.finish(id)?;
    Ok(outcome)
}

/// Stored notes grouped by their top-level category directory, names without the
/// `.md` suffix. Deeper paths keep their subdirectories in the name.
pub async fn list_topics<S: NoteStore>(store: &S) -> Result<BTreeMap<String, Vec<String>>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for path in store.list_notes().await? {
        let (category, file) = path.split_once('/').unwrap_or((".", path.as_str()));
        let name = file.strip_suffix(".md").unwrap_or(file);
        groups
            .entry(category.to_string())
            .or_default()
            .push(name.to_string());
    }

    for names in groups.values_mut() {
        names.sort();
    }
    Ok(groups)
}

fn change_request(
    outcome: &SaveOutcome,
    message_count: usize,
    category: &str,
    commit_message: String,
) -> ChangeRequest {
    let now = Local::now();
    let (verb, verb_zh, action_zh) = if outcome.created {
        ("Add", "添加", "新增")
    } else {
        ("Update", "更新", "更新")
    };

    ChangeRequest {
        branch: format!(
            "note-{}-{}",
            topic_filename(&outcome.topic),
            now.format("%Y%m%d")
        ),
        commit_message,
        title: format!("{verb}：{}-{}", outcome.topic, now.format("%Y%-m%-d")),
        body: format!(
            "## {verb_zh}笔记：{topic}\n\n\
             ### 变更内容\n\
             - {action_zh} {path}\n\
             - 基于 {message_count} 条对话记录整理\n\n\
             ### 笔记摘要\n\
             - 主题：{topic}\n\
             - 分类：{category}\n\
             - 时间：{time}\n\
             - 自检：{summary}",
            topic = outcome.topic,
            path = outcome.path,
            time = now.format("%Y/%-m/%-d %H:%M:%S"),
            summary = outcome.review.summary,
        ),
    }
}
