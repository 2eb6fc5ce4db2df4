//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary menu forests,
//! sessions and inbound bodies.

use super::state::*;
use super::transition::*;
use crate::db::{MenuNode, NodeKind};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_kind() -> impl Strategy<Value = NodeKind> {
    prop_oneof![Just(NodeKind::Menu), Just(NodeKind::Leaf)]
}

fn arb_trigger() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("1".to_string())),
        Just(Some("2".to_string())),
        Just(Some("Info".to_string())),
    ]
}

/// Nodes whose parents always point at an earlier node, so the forest is
/// well formed
fn arb_nodes() -> impl Strategy<Value = Vec<MenuNode>> {
    proptest::collection::vec(
        (any::<Option<prop::sample::Index>>(), arb_kind(), arb_trigger(), any::<bool>()),
        1..10,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (parent, kind, trigger, finish_lane))| MenuNode {
                id: format!("n{i}"),
                tenant_id: "acme".to_string(),
                parent_id: parent
                    .filter(|_| i > 0)
                    .map(|idx| format!("n{}", idx.index(i))),
                body: format!("body {i}"),
                kind,
                trigger,
                order: i64::try_from(i).unwrap_or(i64::MAX),
                finish_lane,
            })
            .collect()
    })
}

fn arb_state(len: usize) -> impl Strategy<Value = SessionState> {
    (
        prop_oneof![
            Just(None),
            (0..len).prop_map(|i| Some(format!("n{i}"))),
            Just(Some("ghost".to_string())),
        ],
        0..=len,
        any::<bool>(),
    )
        .prop_map(|(cursor_node_id, traversal_index, awaiting_selection)| SessionState {
            cursor_node_id,
            traversal_index,
            awaiting_selection,
            ..SessionState::new("sender")
        })
}

fn arb_body() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]".prop_map(String::from),
        "[a-zA-Z]{1,6}".prop_map(String::from),
        Just("info".to_string()),
        Just(" 2 ".to_string()),
    ]
}

fn arb_case() -> impl Strategy<Value = (Vec<MenuNode>, SessionState, String)> {
    arb_nodes().prop_flat_map(|nodes| {
        let len = nodes.len();
        (Just(nodes), arb_state(len), arb_body())
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_transition_is_deterministic((nodes, state, body) in arb_case()) {
        prop_assert_eq!(
            transition(&nodes, &state, &body),
            transition(&nodes, &state, &body)
        );
    }

    #[test]
    fn prop_one_or_two_replies((nodes, state, body) in arb_case()) {
        let result = transition(&nodes, &state, &body);
        prop_assert!(matches!(result.replies.len(), 1 | 2));
        if result.replies.len() == 2 {
            // Only a rejected selection re-shows the menu
            prop_assert!(state.awaiting_selection);
            prop_assert_eq!(&result.new_state, &state);
        }
    }

    #[test]
    fn prop_malformed_selection_never_moves_cursor(
        (nodes, mut state, _body) in arb_case(),
        garbage in "[a-z]{1,5}",
    ) {
        state.awaiting_selection = true;
        let result = transition(&nodes, &state, &garbage);

        prop_assert_eq!(&result.new_state.cursor_node_id, &state.cursor_node_id);
        prop_assert_eq!(result.new_state.traversal_index, state.traversal_index);
        prop_assert_eq!(&result.replies[0], &invalid_option_reply(
            nodes.iter().filter(|n| n.is_child_of(state.cursor_node_id.as_deref())).count()
        ));
    }

    #[test]
    fn prop_traversal_index_stays_in_bounds((nodes, state, body) in arb_case()) {
        let result = transition(&nodes, &state, &body);
        prop_assert!(result.new_state.traversal_index <= nodes.len());
    }

    #[test]
    fn prop_fresh_session_on_root_menu_enters_it(
        (mut nodes, _state, body) in arb_case(),
    ) {
        nodes[0].parent_id = None;
        nodes[0].kind = NodeKind::Menu;

        let result = transition(&nodes, &SessionState::new("sender"), &body);

        prop_assert_eq!(result.replies, vec![nodes[0].body.clone()]);
        prop_assert!(result.new_state.awaiting_selection);
        prop_assert_eq!(result.new_state.cursor_node_id, Some(nodes[0].id.clone()));
    }

    #[test]
    fn prop_last_node_fallback_resets_traversal((nodes, state, body) in arb_case()) {
        let result = transition(&nodes, &state, &body);
        let last = &nodes[nodes.len() - 1];

        // A reply with the last node that did not select it is the fallback
        let selected_last = last.is_root_menu()
            || result.new_state.cursor_node_id.as_deref() == Some(last.id.as_str());
        if result.replies == vec![last.body.clone()] && !selected_last {
            prop_assert_eq!(result.new_state.traversal_index, 0);
            prop_assert!(!result.new_state.awaiting_selection);
        }
    }
}
