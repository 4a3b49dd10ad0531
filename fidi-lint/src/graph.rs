//! Dot graph emission.
//!
//! The linter runs the same parse and validation path as the server, but
//! instead of calling peers it recursively parses every edge payload
//! (prepended with the caller's node blob, exactly as the server would
//! forward it) and emits a dot(1) digraph of the whole call cascade. Each
//! edge label is the dotted path of sequence numbers from the root down to
//! that call.

use fidi_dsl::{parse, validate};

/// Aggregated result of linting one document and all its nested payloads.
#[derive(Debug, Default)]
pub struct LintReport {
    /// The emitted digraph.
    pub dot: String,
    /// Syntax error count across every nesting level.
    pub parse_errors: usize,
    /// Syntax error messages, one per line.
    pub error_messages: String,
    /// Validation warning count across every nesting level.
    pub warnings: usize,
    /// Validation diagnostics.
    pub warning_messages: String,
}

impl LintReport {
    /// True when no level produced an error or warning.
    pub fn is_clean(&self) -> bool {
        self.parse_errors == 0 && self.warnings == 0
    }
}

/// Lint a request document and emit its graph.
pub fn lint(source: &str) -> LintReport {
    let mut report = LintReport::default();
    let mut dot = String::new();
    walk("Source", "TopNode", "1", source, &mut dot, &mut report);
    report.dot = dot;
    report
}

/// Emit the graph fragment for one request and recurse into its payloads.
///
/// Each recursion level builds a fresh parser over the payload text; the
/// only state threaded through is the caller name, the destination name,
/// and the dotted sequence prefix. The digraph preamble and the node
/// records are emitted at the root level only.
fn walk(
    caller: &str,
    name: &str,
    sequence_prefix: &str,
    source: &str,
    out: &mut String,
    report: &mut LintReport,
) {
    let (model, errors) = parse(source);
    report.parse_errors += errors.len();
    for err in &errors {
        report.error_messages.push_str(&err.to_string());
        report.error_messages.push('\n');
    }

    let validation = validate(&model);
    report.warnings += validation.warnings;
    report.warning_messages.push_str(&validation.messages);

    if caller == "Source" {
        out.push_str("digraph fidi {\n  node [shape=record];\n");
        for (node, attrs) in &model.nodes {
            out.push_str("  ");
            out.push_str(node);
            out.push_str(" [ label=\"{");
            for (key, value) in attrs {
                out.push_str(key);
                out.push('=');
                // Quotes would end the record label early.
                out.push_str(&value.replace('"', "'"));
                out.push('|');
            }
            out.push_str(node);
            out.push_str("}\" ];\n");
        }
    }

    out.push_str(&format!(
        "\n  {} -> {} [ label=\"{}\" ]\n",
        caller, name, sequence_prefix
    ));
    for (key, value) in &model.top_attributes {
        out.push_str(&format!("     // {} = {},\n", key, value));
    }
    out.push('\n');

    for (sequence, group) in model.edges_by_sequence() {
        for edge in group {
            let next_prefix = format!("{}.{}", sequence_prefix, sequence);
            walk(
                name,
                &edge.destination,
                &next_prefix,
                &model.forward_payload(edge),
                out,
                report,
            );
        }
    }

    if caller == "Source" {
        out.push_str("\n}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_graph() {
        let report = lint("[ response = 204 ]");
        assert!(report.is_clean(), "{}", report.warning_messages);
        assert!(report.dot.starts_with("digraph fidi {"));
        assert!(report.dot.contains("Source -> TopNode [ label=\"1\" ]"));
        assert!(report.dot.contains("// response = 204,"));
        assert!(report.dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_nested_calls_get_dotted_labels() {
        let source = r#"
            [ response = 200,
              .a [ hostname = "a.local", port = 1 ],
              .b [ hostname = "b.local", port = 2 ],
              -> a sequence = 1 [ response = 200, -> b sequence = 2 [ response = 200 ] ]
            ]
        "#;
        let report = lint(source);
        assert!(report.is_clean(), "{}", report.warning_messages);
        assert!(report.dot.contains("TopNode -> a [ label=\"1.1\" ]"));
        assert!(report.dot.contains("a -> b [ label=\"1.1.2\" ]"));
    }

    #[test]
    fn test_preamble_and_node_records_only_at_root() {
        let source = r#"
            [ response = 200,
              .a [ hostname = "a.local", port = 1 ],
              -> a [ response = 200 ]
            ]
        "#;
        let report = lint(source);
        assert_eq!(report.dot.matches("digraph fidi {").count(), 1);
        assert_eq!(report.dot.matches("node [shape=record]").count(), 1);
        // The node record appears once even though the node blob is
        // re-parsed at the nested level.
        assert_eq!(report.dot.matches("a [ label=\"{").count(), 1);
    }

    #[test]
    fn test_node_record_sanitizes_quotes() {
        let report = lint("[ response = 200, .a [ url = \"http://a/fidi\" ], -> a [ response = 200 ] ]");
        assert!(report.dot.contains("url='http://a/fidi'"));
    }

    #[test]
    fn test_warnings_aggregate_across_levels() {
        // The nested payload calls a node the parent never declared.
        let source = r#"
            [ response = 200,
              .a [ hostname = "a.local", port = 1 ],
              -> a [ response = 200, -> ghost [ response = 200 ] ]
            ]
        "#;
        let report = lint(source);
        assert_eq!(report.parse_errors, 0);
        assert!(report.warnings >= 1);
        assert!(report
            .warning_messages
            .contains("Destination node ghost not defined"));
    }

    #[test]
    fn test_syntax_errors_do_not_stop_the_graph() {
        let report = lint("[ response = 200, predelay = ]");
        assert_eq!(report.parse_errors, 1);
        assert!(report.dot.contains("Source -> TopNode"));
    }
}
