//! Keyword-context scanner shared by concept and pitfall extraction.

/// Characters of context kept before a keyword match.
pub const CONTEXT_BEFORE: usize = 20;

/// Characters of context kept from the match start onward.
pub const CONTEXT_AFTER: usize = 100;

/// The context around the first keyword found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow<'k> {
    /// The keyword that matched.
    pub keyword: &'k str,
    /// Character offset of the match in the scanned text.
    pub position: usize,
    /// Window text with newlines collapsed to spaces.
    pub text: String,
    /// Whether the window cut off text on either side.
    pub truncated: bool,
}

impl ContextWindow<'_> {
    /// Window text, with `...` appended when it was truncated.
    pub fn display(&self) -> String {
        if self.truncated {
            format!("{}...", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Finds the highest-priority keyword in a text and cuts a window around it.
///
/// Priority follows keyword-list order, not position in the text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordScanner<'k> {
    keywords: &'k [String],
}

impl<'k> KeywordScanner<'k> {
    pub fn new(keywords: &'k [String]) -> Self {
        Self { keywords }
    }

    /// The first keyword (in list order) occurring in `text`, with its character offset.
    pub fn find(&self, text: &str) -> Option<(&'k str, usize)> {
        self.keywords
            .iter()
            .filter(|k| !k.is_empty())
            .find_map(|k| {
                text.find(k.as_str())
                    .map(|byte_idx| (k.as_str(), text[..byte_idx].chars().count()))
            })
    }

    /// Scan `text` and return the context window around the first keyword.
    pub fn scan(&self, text: &str) -> Option<ContextWindow<'k>> {
        let (keyword, position) = self.find(text)?;

        let chars: Vec<char> = text.chars().collect();
        let start = position.saturating_sub(CONTEXT_BEFORE);
        let end = (position + CONTEXT_AFTER).min(chars.len());

        let text = chars[start..end]
            .iter()
            .map(|&c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();

        Some(ContextWindow {
            keyword,
            position,
            text,
            truncated: start > 0 || end < chars.len(),
        })
    }
}
