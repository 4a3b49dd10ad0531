//! Request model types

use std::collections::{BTreeMap, BTreeSet};

/// Attribute mapping: key to raw string value. Values keep the form they
/// had in the source (quoted strings keep their quotes) except where the
/// parser canonicalizes, which today is hostname quote stripping only.
pub type Attributes = BTreeMap<String, String>;

/// A single downstream call parsed from an edge declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDescriptor {
    /// Name of the destination node.
    pub destination: String,
    /// Number of concurrent invocations within the sequence group.
    pub repeat: i64,
    /// Sequence group this call belongs to.
    pub sequence: i64,
    /// Verbatim inner text of the bracketed payload, opaque to this node.
    pub payload: String,
}

/// Everything a single request describes: how this node responds, the peer
/// table, and the downstream calls to make.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestModel {
    /// Attributes applying to this request at this node.
    pub top_attributes: Attributes,
    /// Node name to connection attributes.
    pub nodes: BTreeMap<String, Attributes>,
    /// Downstream calls, in declaration order.
    pub edges: Vec<EdgeDescriptor>,
    /// Node names referenced by edges.
    pub destinations: BTreeSet<String>,
}

impl RequestModel {
    /// Look up a top-level attribute value.
    pub fn top_attr(&self, key: &str) -> Option<&str> {
        self.top_attributes.get(key).map(String::as_str)
    }

    /// Look up a top-level attribute and parse it as an integer. Only
    /// meaningful after validation has vouched for the value.
    pub fn top_attr_i64(&self, key: &str) -> Option<i64> {
        self.top_attr(key).and_then(|v| v.parse().ok())
    }

    /// Canonical re-serialization of the node table.
    ///
    /// This text is prepended to every forwarded payload so peers inherit
    /// the topology without depending on the original source formatting.
    /// Nodes are emitted in name order, each as a complete declaration with
    /// a trailing comma, so the blob can be dropped in front of any
    /// attribute list inside a request's brackets.
    pub fn node_blob(&self) -> String {
        let mut blob = String::new();
        for (name, attrs) in &self.nodes {
            blob.push_str("  .");
            blob.push_str(name);
            blob.push_str(" [ ");
            let mut first = true;
            for (key, value) in attrs {
                if !first {
                    blob.push_str(", ");
                }
                first = false;
                blob.push_str(key);
                blob.push_str(" = ");
                blob.push_str(&serialize_value(value));
            }
            blob.push_str(" ],\n");
        }
        blob
    }

    /// Build the complete request body forwarded to a peer for one edge:
    /// the canonical node blob followed by the edge's verbatim payload,
    /// wrapped in one pair of brackets.
    pub fn forward_payload(&self, edge: &EdgeDescriptor) -> String {
        let mut body = String::from("[\n");
        body.push_str(&self.node_blob());
        body.push_str(&edge.payload);
        body.push_str("\n]");
        body
    }

    /// Group edges by sequence number, ascending.
    pub fn edges_by_sequence(&self) -> BTreeMap<i64, Vec<&EdgeDescriptor>> {
        let mut groups: BTreeMap<i64, Vec<&EdgeDescriptor>> = BTreeMap::new();
        for edge in &self.edges {
            groups.entry(edge.sequence).or_default().push(edge);
        }
        groups
    }

    /// The call target for a node: the `url` attribute when given,
    /// otherwise `http://<hostname>:<port>` plus `path` or `/fidi`.
    ///
    /// Returns `None` for an unknown node or one missing its connection
    /// attributes; validation rejects such models before execution.
    pub fn url_for(&self, node_name: &str) -> Option<String> {
        let attrs = self.nodes.get(node_name)?;
        if let Some(url) = attrs.get("url") {
            return Some(unquote(url).to_string());
        }
        let hostname = attrs.get("hostname")?;
        let port = attrs.get("port")?;
        let mut url = format!("http://{}:{}", unquote(hostname), unquote(port));
        match attrs.get("path") {
            Some(path) => url.push_str(unquote(path)),
            None => url.push_str("/fidi"),
        }
        Some(url)
    }
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"' {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Render an attribute value so it scans back to a single token: values
/// that are already quoted, bare identifiers, or bare integers pass
/// through; anything else (a canonicalized hostname, say) gets quoted.
fn serialize_value(value: &str) -> String {
    if is_quoted(value) || is_bare(value) {
        value.to_string()
    } else {
        format!("\"{}\"", value)
    }
}

fn is_quoted(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"'
}

fn is_bare(value: &str) -> bool {
    let ident = |v: &str| {
        let mut chars = v.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let integer = |v: &str| {
        let digits = v.strip_prefix('-').unwrap_or(v);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    };
    ident(value) || integer(value)
}
