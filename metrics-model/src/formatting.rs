//! Helpers for rendering names, labels and help text in the Prometheus [exposition format].
//!
//! [exposition format]: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#text-format-details
use std::collections::HashSet;

/// Sanitizes a metric name to be valid under the Prometheus [data model].
///
/// [data model]: https://prometheus.io/docs/concepts/data_model/#metric-names-and-labels
pub fn sanitize_metric_name(name: &str) -> String {
    // The first character must be [a-zA-Z_:], and all subsequent characters must be [a-zA-Z0-9_:].
    name.chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 && valid_metric_name_start_character(c)
                || i != 0 && valid_metric_name_character(c)
            {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitizes a label key to be valid under the Prometheus [data model].
///
/// [data model]: https://prometheus.io/docs/concepts/data_model/#metric-names-and-labels
pub fn sanitize_label_key(key: &str) -> String {
    // The first character must be [a-zA-Z_], and all subsequent characters must be [a-zA-Z0-9_].
    key.chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 && valid_label_key_start_character(c)
                || i != 0 && valid_label_key_character(c)
            {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Escapes a label value so it can sit between double quotes.
///
/// Backslashes, double quotes and line feeds are escaped. Every other character is kept.
pub fn escape_label_value(value: &str) -> String {
    escape(value, true)
}

/// Escapes help text for a `# HELP` line.
///
/// Only backslashes and line feeds are escaped; double quotes are legal in help text.
pub fn escape_help(value: &str) -> String {
    escape(value, false)
}

fn escape(value: &str, quotes: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '"' if quotes => escaped.push_str("\\\""),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Writes `key="value"` pairs separated by commas, without surrounding braces.
///
/// Keys are sanitized first.  When two keys sanitize to the same label name, only the first pair
/// is written, so a label name never appears twice.
pub(crate) fn write_text_labels<'a, I>(buffer: &mut String, labels: I)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut written = HashSet::new();
    for (key, value) in labels {
        let key = sanitize_label_key(key);
        if written.contains(&key) {
            continue;
        }
        if !written.is_empty() {
            buffer.push(',');
        }
        buffer.push_str(&key);
        written.insert(key);
        buffer.push_str("=\"");
        buffer.push_str(&escape_label_value(value));
        buffer.push('"');
    }
}

#[inline]
fn valid_metric_name_start_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z_:].
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

#[inline]
fn valid_metric_name_character(c: char) -> bool {
    // Essentially, needs to match the regex pattern of [a-zA-Z0-9_:].
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

#[inline]
fn valid_label_key_start_character(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn valid_label_key_character(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
