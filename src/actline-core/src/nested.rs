//! External completion providers that parameters can delegate to.

use std::fs;
use std::path::Path;

use crate::tree::{Text, expand_user};

/// One completion produced by a [`NestedCompleter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedCompletion {
    /// Text inserted at `start_position`.
    pub text: String,
    /// Offset relative to the end of the document; zero or negative.
    pub start_position: isize,
    pub style: Option<String>,
    pub selected_style: Option<String>,
    pub display: Option<Text>,
    pub display_meta: Option<Text>,
}

impl NestedCompletion {
    pub fn new(text: impl Into<String>, start_position: isize) -> Self {
        Self {
            text: text.into(),
            start_position,
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<Text>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_display_meta(mut self, display_meta: impl Into<Text>) -> Self {
        self.display_meta = Some(display_meta.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// A completion provider queried with the fragment being typed.
pub trait NestedCompleter: Send + Sync {
    /// Returns completions for `document`, the decoded current fragment.
    fn get_completions(&self, document: &str) -> Vec<NestedCompletion>;
}

impl<F> NestedCompleter for F
where
    F: Fn(&str) -> Vec<NestedCompletion> + Send + Sync,
{
    fn get_completions(&self, document: &str) -> Vec<NestedCompletion> {
        self(document)
    }
}

// ============================================================
// PATH COMPLETER
// ============================================================

/// Completes filesystem paths.
///
/// Entries of the directory named by the document whose names start with the
/// document's last component are offered. Each completion inserts the rest of
/// the entry name (start position 0) and displays the full name, with a
/// trailing `/` for directories.
#[derive(Debug, Clone, Default)]
pub struct PathCompleter {
    /// Only offer directories.
    pub only_directories: bool,
    /// Expand a leading `~` before listing.
    pub expand_user: bool,
}

impl PathCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only_directories(mut self, only_directories: bool) -> Self {
        self.only_directories = only_directories;
        self
    }

    pub fn expand_user(mut self, expand_user: bool) -> Self {
        self.expand_user = expand_user;
        self
    }

    fn split_document<'a>(&self, document: &'a str) -> (String, &'a str) {
        let (directory, prefix) = match document.rfind('/') {
            Some(index) => (&document[..=index], &document[index + 1..]),
            None => ("", document),
        };
        let directory = if self.expand_user {
            expand_user(directory).display().to_string()
        } else {
            directory.to_string()
        };
        (directory, prefix)
    }
}

impl NestedCompleter for PathCompleter {
    fn get_completions(&self, document: &str) -> Vec<NestedCompletion> {
        let (directory, prefix) = self.split_document(document);
        let listing = if directory.is_empty() {
            Path::new(".")
        } else {
            Path::new(&directory)
        };

        let entries = match fs::read_dir(listing) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::trace!(directory = %listing.display(), error = %e, "path listing failed");
                return Vec::new();
            }
        };

        let mut names: Vec<(String, bool)> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let is_dir = entry.path().is_dir();
                (name.starts_with(prefix) && (is_dir || !self.only_directories))
                    .then_some((name, is_dir))
            })
            .collect();
        names.sort();

        names
            .into_iter()
            .map(|(name, is_dir)| {
                let display = if is_dir {
                    format!("{}/", name)
                } else {
                    name.clone()
                };
                NestedCompletion::new(&name[prefix.len()..], 0).with_display(display)
            })
            .collect()
    }
}
