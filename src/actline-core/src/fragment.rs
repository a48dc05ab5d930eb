//! Fragment codec for whitespace-delimited input lines.
//!
//! A line is split into fragments on runs of unescaped whitespace. A space
//! that belongs inside a single fragment is written as `\ ` (backslash,
//! space); every other character passes through untouched.
//!
//! - `hello world` → `["hello", "world"]`
//! - `cat my\ file.txt` → `["cat", "my\ file.txt"]`
//! - `hello ` → `["hello", ""]` (the fragment being typed)

/// The escaped form of a literal space inside a fragment.
pub const ESCAPED_SPACE: &str = "\\ ";

// ============================================================
// SPLITTING
// ============================================================

/// Splits a raw input line into fragments.
///
/// Whitespace preceded by a backslash does not start a separator. Leading
/// and trailing separators produce empty fragments, so the result always has
/// at least one element, even for an empty line.
pub fn split(line: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut previous: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() && previous != Some('\\') {
            // Swallow the rest of the separator run
            while chars.peek().is_some_and(|next| next.is_whitespace()) {
                chars.next();
            }
            fragments.push(std::mem::take(&mut current));
            previous = Some(' ');
            continue;
        }

        current.push(c);
        previous = Some(c);
    }

    fragments.push(current);
    fragments
}

/// Joins fragments back into a line using single spaces.
pub fn join<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================
// ESCAPING
// ============================================================

/// Escapes literal spaces so the text can be inserted as a single fragment.
pub fn encode(text: &str) -> String {
    text.replace(' ', ESCAPED_SPACE)
}

/// Reverses [`encode`].
pub fn decode(text: &str) -> String {
    text.replace(ESCAPED_SPACE, " ")
}
