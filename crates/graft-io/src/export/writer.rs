//! Incremental JSON emission.
//!
//! [`JsonWriter`] is a structured writer with an explicit object/array scope
//! stack; each scope counts its emitted items, which is what decides comma
//! placement. Output is a flat single-line string; [`pretty_print_json`]
//! re-indents it as a separate pass.

use std::fmt::Write as _;

#[derive(Clone, Copy)]
struct Scope {
    array: bool,
    items: usize,
}

/// A growable JSON string with scope-stack punctuation bookkeeping.
pub(crate) struct JsonWriter {
    out: String,
    stack: Vec<Scope>,
    /// Set between a key and its value so the value does not separate again.
    pending_value: bool,
}

impl JsonWriter {
    pub(crate) fn new() -> Self {
        Self {
            out: String::new(),
            stack: Vec::new(),
            pending_value: false,
        }
    }

    /// Emit a comma when the current scope already holds items.
    fn separate(&mut self) {
        if self.pending_value {
            self.pending_value = false;
            return;
        }
        if let Some(scope) = self.stack.last_mut() {
            if scope.items > 0 {
                self.out.push(',');
            }
            scope.items += 1;
        }
    }

    /// Emit an object key. The next value belongs to it.
    pub(crate) fn key(&mut self, key: &str) {
        debug_assert!(self.stack.last().map_or(false, |scope| !scope.array));
        self.separate();
        self.out.push('"');
        self.out.push_str(key);
        self.out.push_str("\":");
        self.pending_value = true;
    }

    pub(crate) fn begin_object(&mut self) {
        self.separate();
        self.out.push('{');
        self.stack.push(Scope {
            array: false,
            items: 0,
        });
    }

    pub(crate) fn end_object(&mut self) {
        debug_assert!(self.stack.last().map_or(false, |scope| !scope.array));
        self.stack.pop();
        self.out.push('}');
    }

    pub(crate) fn begin_array(&mut self) {
        self.separate();
        self.out.push('[');
        self.stack.push(Scope {
            array: true,
            items: 0,
        });
    }

    pub(crate) fn end_array(&mut self) {
        debug_assert!(self.stack.last().map_or(false, |scope| scope.array));
        self.stack.pop();
        self.out.push(']');
    }

    /// Emit pre-rendered JSON, e.g. a number or a caller-supplied extras
    /// payload.
    pub(crate) fn raw(&mut self, rendered: &str) {
        self.separate();
        self.out.push_str(rendered);
    }

    pub(crate) fn string(&mut self, text: &str) {
        self.separate();
        self.out.push('"');
        escape_into(&mut self.out, text);
        self.out.push('"');
    }

    pub(crate) fn usize(&mut self, value: usize) {
        self.separate();
        let _ = write!(self.out, "{value}");
    }

    pub(crate) fn u64(&mut self, value: u64) {
        self.separate();
        let _ = write!(self.out, "{value}");
    }

    pub(crate) fn f32(&mut self, value: f32) {
        self.separate();
        let _ = write!(self.out, "{value}");
    }

    pub(crate) fn f64(&mut self, value: f64) {
        self.separate();
        let _ = write!(self.out, "{value}");
    }

    pub(crate) fn i64(&mut self, value: i64) {
        self.separate();
        let _ = write!(self.out, "{value}");
    }

    pub(crate) fn bool(&mut self, value: bool) {
        self.separate();
        self.out.push_str(if value { "true" } else { "false" });
    }

    // Key/value shorthands.

    pub(crate) fn string_field(&mut self, key: &str, value: &str) {
        self.key(key);
        self.string(value);
    }

    pub(crate) fn usize_field(&mut self, key: &str, value: usize) {
        self.key(key);
        self.usize(value);
    }

    pub(crate) fn u64_field(&mut self, key: &str, value: u64) {
        self.key(key);
        self.u64(value);
    }

    pub(crate) fn f32_field(&mut self, key: &str, value: f32) {
        self.key(key);
        self.f32(value);
    }

    pub(crate) fn bool_field(&mut self, key: &str, value: bool) {
        self.key(key);
        self.bool(value);
    }

    pub(crate) fn begin_object_field(&mut self, key: &str) {
        self.key(key);
        self.begin_object();
    }

    pub(crate) fn begin_array_field(&mut self, key: &str) {
        self.key(key);
        self.begin_array();
    }

    pub(crate) fn f32_array_field(&mut self, key: &str, values: &[f32]) {
        self.begin_array_field(key);
        for &value in values {
            self.f32(value);
        }
        self.end_array();
    }

    pub(crate) fn finish(self) -> String {
        debug_assert!(self.stack.is_empty(), "unbalanced writer scopes");
        self.out
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
}

/// Re-indent a flat JSON string: newline plus one tab per depth level after
/// every opening brace and comma, and before every closing brace. String
/// literals are copied verbatim.
pub fn pretty_print_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut depth = 0usize;
    let mut chars = json.chars();

    let indent = |out: &mut String, depth: usize| {
        out.push('\n');
        for _ in 0..depth {
            out.push('\t');
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push('"');
                let mut escaped = false;
                for c in chars.by_ref() {
                    out.push(c);
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
            }
            '{' | '[' => {
                out.push(c);
                depth += 1;
                indent(&mut out, depth);
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                indent(&mut out, depth);
                out.push(c);
            }
            ',' => {
                out.push(',');
                indent(&mut out, depth);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_scopes_and_commas() {
        let mut writer = JsonWriter::new();
        writer.begin_object();
        writer.string_field("version", "2.0");
        writer.begin_array_field("values");
        writer.usize(1);
        writer.usize(2);
        writer.begin_object();
        writer.bool_field("nested", true);
        writer.end_object();
        writer.end_array();
        writer.f32_field("cutoff", 0.5);
        writer.end_object();

        assert_eq!(
            writer.finish(),
            r#"{"version":"2.0","values":[1,2,{"nested":true}],"cutoff":0.5}"#
        );
    }

    #[test]
    fn strings_are_escaped() {
        let mut writer = JsonWriter::new();
        writer.begin_object();
        writer.string_field("name", "a \"b\"\\c\n");
        writer.end_object();
        assert_eq!(writer.finish(), "{\"name\":\"a \\\"b\\\"\\\\c\\n\"}");
    }

    #[test]
    fn whole_floats_stay_numbers() {
        let mut writer = JsonWriter::new();
        writer.begin_object();
        writer.f32_field("metallicFactor", 1.0);
        writer.f32_field("roughnessFactor", 0.25);
        writer.end_object();
        assert_eq!(
            writer.finish(),
            r#"{"metallicFactor":1,"roughnessFactor":0.25}"#
        );
    }

    #[test]
    fn pretty_printing_is_string_aware() {
        let flat = r#"{"a":[1,2],"s":"b{r,a}ce"}"#;
        let pretty = pretty_print_json(flat);
        assert!(pretty.contains("\n\t\"a\":["));
        // Braces and commas inside string literals are untouched.
        assert!(pretty.contains(r#""b{r,a}ce""#));
        // Round-trips through a JSON tokenizer unchanged.
        let reparsed: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed, serde_json::from_str::<serde_json::Value>(flat).unwrap());
    }
}
