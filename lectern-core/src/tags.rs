use thiserror::Error;

use crate::config::TagsSection;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("tags cannot be longer than {limit} characters")]
    TooLong { limit: usize },
    #[error("tag already added: {tag}")]
    Duplicate { tag: String },
    #[error("you can add up to {limit} tags")]
    LimitReached { limit: usize },
}

pub type TagResult<T> = std::result::Result<T, TagError>;

/// Token-input state for the course tag field.
///
/// Typed characters accumulate in a single pending buffer; space and comma
/// commit it, as do an explicit submit and losing focus. The buffer is only
/// cleared when a commit succeeds, so rejected input stays editable.
#[derive(Debug, Clone)]
pub struct TagEditor {
    tags: Vec<String>,
    buffer: String,
    max_count: usize,
    max_length: usize,
}

impl TagEditor {
    pub fn new(max_count: usize, max_length: usize) -> Self {
        Self {
            tags: Vec::new(),
            buffer: String::new(),
            max_count,
            max_length,
        }
    }

    pub fn from_section(section: &TagsSection) -> Self {
        Self::new(section.max_count, section.max_length)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn set_buffer(&mut self, value: impl Into<String>) {
        self.buffer = value.into();
    }

    pub fn push_char(&mut self, ch: char) -> TagResult<()> {
        if ch == ' ' || ch == ',' {
            self.commit_buffer()
        } else {
            self.buffer.push(ch);
            Ok(())
        }
    }

    pub fn push_str(&mut self, input: &str) -> TagResult<()> {
        for ch in input.chars() {
            self.push_char(ch)?;
        }
        Ok(())
    }

    /// Enter key.
    pub fn submit(&mut self) -> TagResult<()> {
        self.commit_buffer()
    }

    /// Focus leaving the field commits whatever is pending.
    pub fn blur(&mut self) -> TagResult<()> {
        self.commit_buffer()
    }

    /// Removes the last typed character, or pops and returns the most
    /// recent tag when the buffer is already empty.
    pub fn backspace(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            self.tags.pop()
        } else {
            self.buffer.pop();
            None
        }
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        self.tags.len() != before
    }

    fn commit_buffer(&mut self) -> TagResult<()> {
        let candidate = self.buffer.trim();
        if candidate.is_empty() {
            return Ok(());
        }
        if candidate.chars().count() > self.max_length {
            return Err(TagError::TooLong {
                limit: self.max_length,
            });
        }
        if self.tags.iter().any(|existing| existing == candidate) {
            return Err(TagError::Duplicate {
                tag: candidate.to_string(),
            });
        }
        if self.tags.len() >= self.max_count {
            return Err(TagError::LimitReached {
                limit: self.max_count,
            });
        }
        self.tags.push(candidate.to_string());
        self.buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> TagEditor {
        TagEditor::from_section(&TagsSection::default())
    }

    #[test]
    fn space_comma_submit_and_blur_all_commit() {
        let mut tags = editor();
        tags.push_str("rust ").unwrap();
        tags.push_str("tokio,").unwrap();
        tags.set_buffer("async");
        tags.submit().unwrap();
        tags.set_buffer("testing");
        tags.blur().unwrap();
        assert_eq!(tags.tags(), ["rust", "tokio", "async", "testing"]);
        assert_eq!(tags.buffer(), "");
    }

    #[test]
    fn duplicates_are_case_sensitive() {
        let mut tags = editor();
        tags.set_buffer("Rust");
        tags.submit().unwrap();
        tags.set_buffer("rust");
        tags.submit().unwrap();
        assert_eq!(tags.len(), 2);

        tags.set_buffer("Rust");
        assert_eq!(
            tags.submit(),
            Err(TagError::Duplicate {
                tag: "Rust".into()
            })
        );
        assert_eq!(tags.buffer(), "Rust");
    }

    #[test]
    fn eleventh_tag_is_rejected_and_buffer_survives() {
        let mut tags = editor();
        for index in 0..10 {
            tags.set_buffer(format!("tag-{index}"));
            tags.submit().unwrap();
        }
        tags.set_buffer("one-more");
        assert_eq!(tags.submit(), Err(TagError::LimitReached { limit: 10 }));
        assert_eq!(tags.len(), 10);
        assert_eq!(tags.buffer(), "one-more");
    }

    #[test]
    fn overlong_tags_are_rejected() {
        let mut tags = editor();
        tags.set_buffer("x".repeat(51));
        assert_eq!(tags.submit(), Err(TagError::TooLong { limit: 50 }));
        tags.set_buffer("x".repeat(50));
        tags.submit().unwrap();
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn committing_whitespace_is_a_no_op() {
        let mut tags = editor();
        tags.set_buffer("   ");
        tags.submit().unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn backspace_pops_last_tag_only_when_buffer_empty() {
        let mut tags = editor();
        tags.push_str("first second ").unwrap();
        tags.set_buffer("pend");
        assert_eq!(tags.backspace(), None);
        assert_eq!(tags.buffer(), "pen");

        tags.set_buffer("");
        assert_eq!(tags.backspace(), Some("second".into()));
        assert_eq!(tags.tags(), ["first"]);
    }

    #[test]
    fn remove_deletes_exact_match() {
        let mut tags = editor();
        tags.push_str("alpha beta ").unwrap();
        assert!(tags.remove("alpha"));
        assert!(!tags.remove("alpha"));
        assert_eq!(tags.tags(), ["beta"]);
    }
}
