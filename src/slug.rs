//! Heading text to URL-safe identifier conversion.
//!
//! Heading text as rendered may carry embedded markup (`<code>`, `<em>`),
//! numbering prefixes ("1. Meta Tags"), and arbitrary punctuation. [`slugify`]
//! reduces all of that to a lowercase hyphenated stem suitable for an `id`
//! attribute and a `#fragment` link target:
//!
//! ```text
//! "1. Meta Tags (index.html)"  →  "meta-tags-index-html"
//! "Using <code>rsync</code>"   →  "using-rsync"
//! ```
//!
//! The output alphabet is `[a-z0-9-]` with no leading or trailing hyphen and
//! no hyphen runs. The result may be empty when nothing survives filtering;
//! uniqueness across a document is the indexer's job, not this module's.

/// Convert heading text to a URL-friendly identifier stem.
///
/// Steps, in order:
/// 1. Strip markup tags.
/// 2. Lowercase.
/// 3. Trim leading numerals, list punctuation, and whitespace, so numbered
///    headings slug the same as unnumbered ones.
/// 4. Map every character outside `[a-z0-9]` to a hyphen, collapse runs,
///    and trim hyphens at both ends.
///
/// Deterministic, no error conditions. Degenerate input degrades to a
/// shortened or empty string.
pub fn slugify(text: &str) -> String {
    let text = strip_markup_tags(text).to_lowercase();
    let text = text.trim_start_matches(|c: char| {
        c.is_ascii_digit() || matches!(c, '.' | ')' | ']' | '}') || c.is_whitespace()
    });

    let mut slug = String::with_capacity(text.len());
    let mut prev_hyphen = true; // suppresses a leading hyphen
    for c in text.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Drop `<...>` tag spans, keeping the text between them.
fn strip_markup_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}
