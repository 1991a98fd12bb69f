// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Data model tests: ids, document decoding and the build state machine

use proptest::prelude::*;
use teamgraph_core::{
    parse_documents, stable_id, BuildEvent, BuildState, DocumentError, DocumentKind, EntityKind,
    Graph,
};

fn kind_strategy() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ALL.to_vec())
}

proptest! {
    /// Ids depend only on kind and key, and always carry the kind prefix
    #[test]
    fn prop_stable_id_shape(kind in kind_strategy(), key in ".{0,64}") {
        let id = stable_id(kind, &key);
        prop_assert_eq!(&id, &stable_id(kind, &key));

        let prefix = format!("{}-", kind.as_str());
        prop_assert!(id.as_str().starts_with(&prefix));
        let hash = &id.as_str()[prefix.len()..];
        prop_assert_eq!(hash.len(), 16);
        prop_assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    /// Different kinds never share an id for the same key
    #[test]
    fn prop_stable_id_kind_separation(key in "[a-z0-9]{1,20}") {
        let commit = stable_id(EntityKind::Commit, &key);
        let author = stable_id(EntityKind::Author, &key);
        prop_assert_ne!(commit, author);
    }

    /// Every record is either decoded or reported, never both, never lost
    #[test]
    fn prop_batch_accounts_for_every_record(valid in prop::collection::vec(any::<bool>(), 0..30)) {
        let lines: Vec<String> = valid
            .iter()
            .enumerate()
            .map(|(i, ok)| {
                if *ok {
                    format!(r#"{{"id":"m{i}","kind":"message","timestamp":"2025-03-01T12:00:00Z","text":"hi"}}"#)
                } else {
                    format!(r#"{{"id":"m{i}","kind":"carrier-pigeon"}}"#)
                }
            })
            .collect();

        let batch = parse_documents(&lines.join("\n")).unwrap();
        let expected_ok = valid.iter().filter(|ok| **ok).count();
        prop_assert_eq!(batch.documents.len(), expected_ok);
        prop_assert_eq!(batch.failures.len(), valid.len() - expected_ok);
    }
}

#[test]
fn test_parse_array_and_lines_agree() {
    let array = r#"[
        {"id": "c1", "kind": "code-change", "sha": "abc123", "timestamp": "2025-03-01T12:00:00Z", "text": "fix"},
        {"id": "p1", "kind": "page-edit", "timestamp": "2025-03-01T13:00:00Z", "text": "notes"}
    ]"#;
    let lines = concat!(
        r#"{"id": "c1", "kind": "code-change", "sha": "abc123", "timestamp": "2025-03-01T12:00:00Z", "text": "fix"}"#,
        "\n\n",
        r#"{"id": "p1", "kind": "page-edit", "timestamp": "2025-03-01T13:00:00Z", "text": "notes"}"#,
        "\n",
    );

    let from_array = parse_documents(array).unwrap();
    let from_lines = parse_documents(lines).unwrap();
    assert_eq!(from_array.documents, from_lines.documents);
    assert_eq!(from_array.documents[1].kind(), DocumentKind::PageEdit);
}

#[test]
fn test_malformed_record_keeps_its_id() {
    let batch = parse_documents(r#"[{"id": "bad_1", "kind": "code-change"}]"#).unwrap();
    assert!(batch.documents.is_empty());
    match &batch.failures[0] {
        DocumentError::Malformed { index, document_id, .. } => {
            assert_eq!(*index, 0);
            assert_eq!(document_id.as_deref(), Some("bad_1"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }
}

#[test]
fn test_garbage_payload_is_an_error() {
    assert!(parse_documents("not json at all").is_err());
    assert!(parse_documents("").unwrap().documents.is_empty());
}

#[test]
fn test_build_lifecycle() {
    let mut state = BuildState::Idle;
    for event in [
        BuildEvent::DocumentsFetched,
        BuildEvent::CandidatesExtracted,
        BuildEvent::EntitiesResolved,
        BuildEvent::EdgesInferred,
        BuildEvent::GraphAssembled,
    ] {
        state = state.transition(event).unwrap();
    }
    assert_eq!(state, BuildState::Done);
    assert!(state.transition(BuildEvent::CollaboratorFault).is_err());

    let failed = BuildState::Resolving
        .transition(BuildEvent::CollaboratorFault)
        .unwrap();
    assert_eq!(failed, BuildState::Failed);
}

#[test]
fn test_empty_graph_json() {
    assert_eq!(
        Graph::empty().to_json().unwrap(),
        r#"{"nodes":[],"links":[],"stats":{}}"#
    );
}
