// src/packages/control.rs

//! Debian control stanza parsing
//!
//! A control stanza is a sequence of `Key: value` lines. Lines starting with
//! whitespace continue the previous field and are kept verbatim, so the
//! stanza can be rendered back without reflowing descriptions.

use std::fmt::Write as _;

/// Ordered control fields of a single stanza
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFields {
    fields: Vec<(String, String)>,
}

impl ControlFields {
    /// Parse control text into ordered fields
    ///
    /// Empty lines are skipped, lines without a colon are ignored, and
    /// duplicate keys are preserved in order.
    pub fn parse(content: &str) -> Self {
        let mut fields: Vec<(String, String)> = Vec::new();

        for line in content.lines() {
            if line.is_empty() {
                continue;
            }

            // Continuation lines keep their leading whitespace
            if line.starts_with(char::is_whitespace) {
                if let Some((_, value)) = fields.last_mut() {
                    value.push('\n');
                    value.push_str(line);
                    continue;
                }
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            fields.push((key.trim().to_string(), value.trim().to_string()));
        }

        Self { fields }
    }

    /// Parse a file of blank-line separated stanzas, such as `Packages`
    pub fn parse_stanzas(content: &str) -> Vec<Self> {
        let mut stanzas = Vec::new();
        let mut current = String::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    stanzas.push(Self::parse(&current));
                    current.clear();
                }
                continue;
            }
            current.push_str(line);
            current.push('\n');
        }
        if !current.is_empty() {
            stanzas.push(Self::parse(&current));
        }

        stanzas.retain(|stanza| !stanza.is_empty());
        stanzas
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of these fields with every occurrence of `keys` removed
    pub fn without(&self, keys: &[&str]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn push<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.fields.push((key.into(), value.into()));
    }

    /// Render the stanza, one `Key: value` line per field
    ///
    /// Multi-line values put their first line after the key and emit the
    /// remaining lines unchanged. No blank separator line is appended.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.fields {
            let mut lines = value.split('\n');
            let first = lines.next().unwrap_or_default();
            writeln!(out, "{}: {}", key, first).ok();
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROL: &str = "Package: test-package
Version: 1.0.0-1
Architecture: amd64
Maintainer: Test User <test@example.com>
Depends: libc6 (>= 2.34), zlib1g
Description: A test package
 This is a longer description
 .
 that spans multiple lines.
";

    #[test]
    fn test_control_parsing() {
        let control = ControlFields::parse(CONTROL);
        assert_eq!(control.len(), 6);
        assert_eq!(control.get("Package"), Some("test-package"));
        assert_eq!(control.get("Version"), Some("1.0.0-1"));
        assert_eq!(control.get("Depends"), Some("libc6 (>= 2.34), zlib1g"));
        assert_eq!(
            control.get("Description"),
            Some("A test package\n This is a longer description\n .\n that spans multiple lines.")
        );
        assert_eq!(control.get("Homepage"), None);
    }

    #[test]
    fn test_field_order_is_preserved() {
        let control = ControlFields::parse(CONTROL);
        let keys: Vec<&str> = control.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["Package", "Version", "Architecture", "Maintainer", "Depends", "Description"]
        );
    }

    #[test]
    fn test_keys_and_values_are_trimmed() {
        let control = ControlFields::parse("Package :  spaced  \nVersion:1\n");
        assert_eq!(control.get("Package"), Some("spaced"));
        assert_eq!(control.get("Version"), Some("1"));
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let control = ControlFields::parse("Homepage: https://example.com:8080/x\n");
        assert_eq!(control.get("Homepage"), Some("https://example.com:8080/x"));
    }

    #[test]
    fn test_lines_without_colon_are_ignored() {
        let control = ControlFields::parse("garbage line\nPackage: foo\n\n\nalso garbage\n");
        assert_eq!(control.len(), 1);
        assert_eq!(control.get("Package"), Some("foo"));
    }

    #[test]
    fn test_leading_continuation_without_field() {
        // Nothing to continue, so the line is treated as a regular field
        let control = ControlFields::parse("  Package: foo\n  orphan\n");
        assert_eq!(control.len(), 1);
        assert_eq!(control.get("Package"), Some("foo\n  orphan"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let control = ControlFields::parse("Package: foo\r\nVersion: 2\r\n");
        assert_eq!(control.get("Package"), Some("foo"));
        assert_eq!(control.get("Version"), Some("2"));
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let control = ControlFields::parse("Tag: a\nTag: b\n");
        assert_eq!(control.len(), 2);
        assert_eq!(control.get("Tag"), Some("a"));
    }

    #[test]
    fn test_without_removes_all_occurrences() {
        let control = ControlFields::parse("Package: foo\nSize: 1\nMD5sum: x\nSize: 2\n");
        let filtered = control.without(&["Size", "MD5sum"]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get("Package"), Some("foo"));
    }

    #[test]
    fn test_render_round_trips_stanza() {
        let control = ControlFields::parse(CONTROL);
        assert_eq!(control.render(), CONTROL);
    }

    #[test]
    fn test_parse_stanzas() {
        let content = format!("{}\nPackage: other\nVersion: 2\nVersion: 3\n\n\n", CONTROL);
        let stanzas = ControlFields::parse_stanzas(&content);
        assert_eq!(stanzas.len(), 2);
        assert_eq!(
            stanzas[0].get("Description"),
            Some("A test package\n This is a longer description\n .\n that spans multiple lines.")
        );
        assert_eq!(stanzas[1].get("Version"), Some("2"));
        assert_eq!(stanzas[1].len(), 3);
    }

    #[test]
    fn test_parse_stanzas_empty() {
        assert!(ControlFields::parse_stanzas("").is_empty());
        assert!(ControlFields::parse_stanzas("\n\n  \n").is_empty());
    }

    #[test]
    fn test_render_empty_value() {
        let mut control = ControlFields::default();
        control.push("Essential", "");
        assert_eq!(control.render(), "Essential: \n");
    }
}
