//! Semantic validation over the parsed request model.
//!
//! Validation is total and pure: every rule runs, every failure appends a
//! human-readable line to the diagnostics buffer, and the model is never
//! mutated (canonicalization already happened in the parser). The `//`
//! prefix on each line keeps the diagnostics embeddable in dot output.

use crate::parser::RequestModel;

/// Outcome of validating one request model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Number of failed checks.
    pub warnings: usize,
    /// Human-readable diagnostic lines, one or more per failed check.
    pub messages: String,
}

impl Validation {
    /// True when every check passed.
    pub fn is_clean(&self) -> bool {
        self.warnings == 0
    }

    fn fail(&mut self, message: String) {
        self.warnings += 1;
        self.messages.push_str(&message);
        self.messages.push('\n');
    }

    /// Parse a raw attribute value as an integer, reporting non-numeric
    /// values, out-of-range values, and trailing garbage.
    fn check_integer(&mut self, raw: &str, what: &str) -> Option<i64> {
        let digits_end = {
            let bytes = raw.as_bytes();
            let mut end = 0;
            if bytes.first() == Some(&b'-') {
                end = 1;
            }
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            end
        };
        let prefix = &raw[..digits_end];
        if prefix.is_empty() || prefix == "-" {
            self.fail(format!("// {} is not a valid integer\n//  {}", what, raw));
            return None;
        }
        let number: i64 = match prefix.parse() {
            Ok(n) => n,
            Err(_) => {
                self.fail(format!("// {} is out of range\n//  {}", what, raw));
                return None;
            }
        };
        let remains = &raw[digits_end..];
        if !remains.is_empty() {
            self.fail(format!(
                "// {} contains trailing garbage\n//  {}  {}",
                what, number, remains
            ));
            return None;
        }
        Some(number)
    }
}

/// Attributes whose values must be clean integers when present.
const NUMERIC_TOP_ATTRIBUTES: &[(&str, &str)] = &[
    ("predelay", "Request pre-delay"),
    ("postdelay", "Request post-delay"),
    ("timeout_sec", "Request timeout whole seconds"),
    ("memory", "Request memory amount"),
    ("size", "Request size amount"),
    ("unresponsive_for_sec", "Request unresponsive whole seconds"),
];

/// Microsecond-valued attributes, additionally bounded to [0, 1e6).
const MICROSECOND_TOP_ATTRIBUTES: &[(&str, &str)] = &[
    ("timeout_usec", "Request timeout fractional microseconds"),
    (
        "unresponsive_for_usec",
        "Request unresponsive fractional microseconds",
    ),
];

/// Run every semantic check over the model.
pub fn validate(model: &RequestModel) -> Validation {
    let mut v = Validation::default();

    for (name, attrs) in &model.nodes {
        if !attrs.contains_key("url")
            && (!attrs.contains_key("hostname") || !attrs.contains_key("port"))
        {
            v.fail(format!(
                "// Node definition for {} must contain either\n// a url or both hostname and port attributes",
                name
            ));
        }
        if let Some(port) = attrs.get("port") {
            v.check_integer(port, "Port definition");
        }
        if let Some(hostname) = attrs.get("hostname") {
            if hostname.contains('"') {
                v.fail(format!(
                    "// hostname should not contain double quotes\n// {}",
                    hostname
                ));
            }
        }
    }

    for name in &model.destinations {
        if !model.nodes.contains_key(name) {
            v.fail(format!("// Destination node {} not defined", name));
        }
    }

    match model.top_attr("response") {
        Some(raw) => {
            if let Some(code) = v.check_integer(raw, "Request response code specification") {
                if code <= 0 || code >= 600 {
                    v.fail(format!(
                        "// Request response code specification {}\n// does not seem like an HTTP response code",
                        code
                    ));
                }
            }
        }
        None => v.fail("// Request response code specification missing".to_string()),
    }

    for (key, what) in NUMERIC_TOP_ATTRIBUTES {
        if let Some(raw) = model.top_attr(key) {
            v.check_integer(raw, what);
        }
    }

    for (key, what) in MICROSECOND_TOP_ATTRIBUTES {
        if let Some(raw) = model.top_attr(key) {
            if let Some(usec) = v.check_integer(raw, what) {
                if !(0..1_000_000).contains(&usec) {
                    v.fail(format!(
                        "// {} should be in [0, 1000000): {}",
                        what, usec
                    ));
                }
            }
        }
    }

    if let Some(healthy) = model.top_attr("healthy") {
        if healthy != "true" && healthy != "false" {
            v.fail(format!(
                "// healthy must be true or false, found {}",
                healthy
            ));
        }
    }

    for edge in &model.edges {
        if edge.repeat < 1 {
            v.fail(format!(
                "// Call to {} has repeat count {}, expected at least 1",
                edge.destination, edge.repeat
            ));
        }
        if edge.sequence < 1 {
            v.fail(format!(
                "// Call to {} has sequence number {}, expected at least 1",
                edge.destination, edge.sequence
            ));
        }
    }

    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn validate_source(source: &str) -> Validation {
        let (model, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
        validate(&model)
    }

    #[test]
    fn test_minimal_request_is_clean() {
        let v = validate_source("[ response = 204 ]");
        assert!(v.is_clean(), "{}", v.messages);
    }

    #[test]
    fn test_undefined_destination() {
        let v = validate_source("[ response = 200, -> ghost sequence = 1 [ response = 200 ] ]");
        assert_eq!(v.warnings, 1);
        assert!(v.messages.contains("Destination node ghost not defined"));
    }

    #[test]
    fn test_node_needs_url_or_hostname_and_port() {
        let v = validate_source("[ response = 200, .a [ hostname = \"h\" ] ]");
        assert_eq!(v.warnings, 1);
        assert!(v.messages.contains("url or both hostname and port"));

        let v = validate_source("[ response = 200, .a [ url = \"http://h:1/fidi\" ] ]");
        assert!(v.is_clean());

        let v = validate_source("[ response = 200, .a [ hostname = \"h\", port = 1 ] ]");
        assert!(v.is_clean());
    }

    #[test]
    fn test_response_code_range() {
        assert!(validate_source("[ response = 599 ]").is_clean());
        assert!(!validate_source("[ response = 0 ]").is_clean());
        assert!(!validate_source("[ response = 600 ]").is_clean());
        assert!(!validate_source("[ response = -1 ]").is_clean());
    }

    #[test]
    fn test_response_code_missing() {
        let v = validate_source("[ predelay = 10 ]");
        assert_eq!(v.warnings, 1);
        assert!(v.messages.contains("response code specification missing"));
    }

    #[test]
    fn test_trailing_garbage_in_quoted_number() {
        let v = validate_source("[ response = 200, predelay = \"10\" ]");
        assert_eq!(v.warnings, 1);
        assert!(v.messages.contains("not a valid integer"));
    }

    #[test]
    fn test_microsecond_bounds() {
        assert!(validate_source("[ response = 200, timeout_usec = 999999 ]").is_clean());
        assert!(!validate_source("[ response = 200, timeout_usec = 1000000 ]").is_clean());
        assert!(!validate_source("[ response = 200, unresponsive_for_usec = -1 ]").is_clean());
    }

    #[test]
    fn test_healthy_values() {
        assert!(validate_source("[ response = 200, healthy = true ]").is_clean());
        assert!(validate_source("[ response = 200, healthy = false ]").is_clean());
        assert!(!validate_source("[ response = 200, healthy = maybe ]").is_clean());
    }

    #[test]
    fn test_repeat_and_sequence_bounds() {
        let v = validate_source(
            "[ response = 200, .a [ hostname = \"h\", port = 1 ], -> a repeat = 0 [ x = 1 ] ]",
        );
        assert_eq!(v.warnings, 1);
        assert!(v.messages.contains("repeat count 0"));

        let v = validate_source(
            "[ response = 200, .a [ hostname = \"h\", port = 1 ], -> a sequence = -2 [ x = 1 ] ]",
        );
        assert_eq!(v.warnings, 1);
        assert!(v.messages.contains("sequence number -2"));
    }

    #[test]
    fn test_hostname_with_embedded_quote() {
        // The parser strips hostname quotes; a value that still carries one
        // can only come from a hand-built model, and must be flagged.
        use crate::parser::{Attributes, RequestModel};
        let mut model = RequestModel::default();
        let mut attrs = Attributes::new();
        attrs.insert("hostname".to_string(), "bad\"host".to_string());
        attrs.insert("port".to_string(), "1".to_string());
        model.nodes.insert("a".to_string(), attrs);
        model
            .top_attributes
            .insert("response".to_string(), "200".to_string());

        let v = validate(&model);
        assert_eq!(v.warnings, 1);
        assert!(v.messages.contains("double quotes"));
    }

    #[test]
    fn test_validation_is_total() {
        // Several problems at once: all of them are reported.
        let v = validate_source("[ predelay = \"x\", healthy = nah, -> ghost [ y = 1 ] ]");
        assert_eq!(v.warnings, 4);
    }
}
