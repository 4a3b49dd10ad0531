//! End-to-end language tests: parse, validate, and re-serialize whole
//! request documents the way the server and the lint tool do.

use fidi_dsl::{parse, validate};

#[test]
fn clean_document_parses_and_validates() {
    let source = r#"
        // two peers, three calls over two sequence points
        [ response = 200, predelay = 10, postdelay = 5,
          .frontend [ hostname = "10.0.0.1", port = 8080 ],
          .cache    [ url = "http://cache.local/fidi" ],
          -> frontend sequence = 1 repeat = 2 [ response = 200 ],
          -> cache    sequence = 1            [ response = 200 ],
          -> frontend sequence = 2            [ response = 500, log_error = "boom" ]
        ]
    "#;
    let (model, errors) = parse(source);
    assert!(errors.is_empty());
    assert!(validate(&model).is_clean());

    let groups = model.edges_by_sequence();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[&1].len(), 2);
    assert_eq!(groups[&2].len(), 1);
}

#[test]
fn forwarded_payload_is_valid_for_the_peer() {
    let source = r#"
        [ response = 200,
          .a [ hostname = "a.local", port = 9001 ],
          .b [ hostname = "b.local", port = 9002 ],
          -> a sequence = 1 [ response = 201, -> b sequence = 1 [ response = 202 ] ]
        ]
    "#;
    let (model, errors) = parse(source);
    assert!(errors.is_empty());
    assert!(validate(&model).is_clean());

    // The peer receives the parent's node table plus the verbatim payload,
    // so its own nested call to b validates without redeclaring anything.
    let (peer_model, peer_errors) = parse(&model.forward_payload(&model.edges[0]));
    assert!(peer_errors.is_empty());
    assert!(validate(&peer_model).is_clean());
    assert_eq!(peer_model.edges.len(), 1);
    assert_eq!(peer_model.edges[0].destination, "b");
    assert_eq!(peer_model.url_for("b").as_deref(), Some("http://b.local:9002/fidi"));
}

#[test]
fn syntax_and_semantic_problems_are_reported_together() {
    let source = "[ response = 700, predelay = , -> ghost [ x = 1 ] ]";
    let (model, errors) = parse(source);
    assert_eq!(errors.len(), 1, "{:?}", errors);

    let validation = validate(&model);
    assert!(validation.warnings >= 2);
    assert!(validation.messages.contains("Destination node ghost not defined"));
    assert!(validation
        .messages
        .contains("does not seem like an HTTP response code"));
}

#[test]
fn model_survives_its_own_serialization() {
    let source = r#"
        [ response = 200,
          .edge_proxy [ hostname = "10.1.2.3", port = 443, path = "/mock" ],
          -> edge_proxy [ response = 200 ]
        ]
    "#;
    let (model, errors) = parse(source);
    assert!(errors.is_empty());

    let reparsed_source = format!("[ {} response = 200 ]", model.node_blob());
    let (reparsed, reparse_errors) = parse(&reparsed_source);
    assert!(reparse_errors.is_empty());
    assert_eq!(reparsed.nodes, model.nodes);
}
