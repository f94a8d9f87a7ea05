//! Artifact naming.

use chrono::Utc;

const MAX_SLUG_LEN: usize = 64;

/// Lowercase, collapse runs of anything outside `[a-z0-9]` into `-`, trim
/// dashes from both ends and cap at 64 characters.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    // Output is ASCII, so byte truncation is safe.
    slug.truncate(MAX_SLUG_LEN);
    slug
}

/// `{millis}-{slug}`, slugging `program_name` or `fallback_name` when the
/// former is blank.
pub fn artifact_id_at(millis: i64, program_name: &str, fallback_name: &str) -> String {
    let source = if program_name.trim().is_empty() {
        fallback_name
    } else {
        program_name
    };
    format!("{millis}-{}", slugify(source))
}

/// [`artifact_id_at`] stamped with the current time.
pub fn artifact_id(program_name: &str, fallback_name: &str) -> String {
    artifact_id_at(Utc::now().timestamp_millis(), program_name, fallback_name)
}
