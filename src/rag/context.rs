//! Context assembly from ranked matches
//!
//! All lengths are counted in `char`s. The assembled [`Context`] never
//! exceeds its total limit, and no fragment exceeds the per-match limit.

use serde::Serialize;

use crate::models::Match;

/// A truncated passage tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub document_id: String,
    /// 1-based position in the ranked match list
    pub rank: usize,
    pub source: Option<String>,
    pub text: String,
}

impl Fragment {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Bounded block of retrieved text handed to generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    fragments: Vec<Fragment>,
    total_chars: usize,
    per_match_limit: usize,
    total_limit: usize,
}

impl Context {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn per_match_limit(&self) -> usize {
        self.per_match_limit
    }

    pub fn total_limit(&self) -> usize {
        self.total_limit
    }

    /// Distinct source URLs in rank order
    pub fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for source in self.fragments.iter().filter_map(|f| f.source.as_ref()) {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
        sources
    }

    /// Re-assemble this context under half its current size.
    ///
    /// The new ceiling is `total_chars / 2`, so the result is always strictly
    /// smaller; lowest-ranked content goes first. `None` once the ceiling
    /// reaches zero.
    #[must_use]
    pub fn shrunk(&self) -> Option<Self> {
        let ceiling = self.total_chars.min(self.total_limit) / 2;
        if ceiling == 0 {
            return None;
        }
        let assembler = ContextAssembler::new(self.per_match_limit.min(ceiling), ceiling);
        Some(assembler.assemble_fragments(self.fragments.iter().cloned()))
    }
}

/// Builds a [`Context`] from ranked matches under two size limits
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    per_match_limit: usize,
    total_limit: usize,
}

impl ContextAssembler {
    #[must_use]
    pub const fn new(per_match_limit: usize, total_limit: usize) -> Self {
        Self {
            per_match_limit,
            total_limit,
        }
    }

    /// Assemble matches in ranked order.
    ///
    /// A fragment that would overflow the total is hard-cut to exactly the
    /// remaining budget and ends assembly. Matches with empty text are
    /// skipped.
    #[must_use]
    pub fn assemble(&self, matches: &[Match]) -> Context {
        self.assemble_fragments(matches.iter().enumerate().map(|(idx, m)| Fragment {
            document_id: m.document.id.clone(),
            rank: idx + 1,
            source: m.document.source_url().map(str::to_string),
            text: m.document.text.clone(),
        }))
    }

    fn assemble_fragments(&self, candidates: impl IntoIterator<Item = Fragment>) -> Context {
        let mut fragments = Vec::new();
        let mut total_chars = 0;

        for mut candidate in candidates {
            let text = truncate_at_word(&candidate.text, self.per_match_limit);
            if text.is_empty() {
                continue;
            }

            let remaining = self.total_limit.saturating_sub(total_chars);
            let len = text.chars().count();
            if len <= remaining {
                total_chars += len;
                candidate.text = text;
                fragments.push(candidate);
                continue;
            }

            // The overflow cut fills the budget exactly, ignoring word boundaries
            let text: String = text.chars().take(remaining).collect();
            if !text.trim().is_empty() {
                total_chars += text.chars().count();
                candidate.text = text;
                fragments.push(candidate);
            }
            break;
        }

        Context {
            fragments,
            total_chars,
            per_match_limit: self.per_match_limit,
            total_limit: self.total_limit,
        }
    }
}

/// Trim `text` and cut it to at most `limit` chars.
///
/// A cut that would split a word backs up to the last whitespace in the
/// window, provided that whitespace sits in the window's second half;
/// otherwise the cut is hard. Trailing whitespace is removed.
pub fn truncate_at_word(text: &str, limit: usize) -> String {
    let text = text.trim();
    if limit == 0 {
        return String::new();
    }

    let Some((cut, next)) = text.char_indices().nth(limit) else {
        return text.to_string();
    };
    let window = &text[..cut];

    let splits_word = !next.is_whitespace() && !window.ends_with(char::is_whitespace);
    if splits_word {
        if let Some((idx, _)) = window.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
            if window[..idx].chars().count() >= limit / 2 {
                return window[..idx].trim_end().to_string();
            }
        }
    }

    window.trim_end().to_string()
}
