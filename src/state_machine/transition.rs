//! Pure state transition function
//!
//! Given the tenant's nodes in scan order, the sender's session and the
//! inbound body, decide the replies and the session that follows. No I/O
//! happens here; pacing and delivery belong to the runtime.

use super::SessionState;
use crate::db::{MenuNode, NodeKind};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: SessionState,
    /// Replies to send, in order
    pub replies: Vec<String>,
    /// Recoverable inconsistencies met along the way, for the caller to log
    pub anomalies: Vec<Anomaly>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            replies: vec![],
            anomalies: vec![],
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.replies.push(reply.into());
        self
    }

    pub fn with_anomaly(mut self, anomaly: Anomaly) -> Self {
        self.anomalies.push(anomaly);
        self
    }
}

/// Data inconsistencies the engine recovers from on its own
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("tenant has no menu nodes")]
    EmptyNodeSet,
    #[error("cursor node not found: {}", .0.as_deref().unwrap_or("<none>"))]
    DanglingCursor(Option<String>),
    #[error("traversal index {index} is past the end of {len} nodes")]
    TraversalOutOfRange { index: usize, len: usize },
}

/// Guidance sent when a menu selection is not one of the offered numbers
pub fn invalid_option_reply(child_count: usize) -> String {
    format!("Invalid option. Please choose a number between 1 and {child_count}.")
}

/// Pure transition function
///
/// Branch precedence during the scan: root menu, child menu by trigger,
/// child by trigger, last-node fallback, then the greeting that only fires
/// when the scan started from the top.
pub fn transition(nodes: &[MenuNode], state: &SessionState, body: &str) -> TransitionResult {
    let body = body.trim();

    let Some(last) = nodes.len().checked_sub(1) else {
        return TransitionResult::new(state.clone()).with_anomaly(Anomaly::EmptyNodeSet);
    };

    let mut next = state.clone();

    if state.awaiting_selection {
        let cursor = state.cursor_node_id.as_deref();
        let child_count = nodes.iter().filter(|n| n.is_child_of(cursor)).count();

        match parse_selection(body, child_count) {
            Some(selection) => {
                next.pending_advance = selection;
                next.traversal_index += selection;
                next.awaiting_selection = false;
            }
            None => return reject_selection(nodes, state, child_count),
        }
    }

    let scanned = nodes
        .iter()
        .enumerate()
        .skip(next.traversal_index)
        .find_map(|(i, node)| step(node, i, i == last, &next, body));

    // Only reachable when the index already points past the last node
    scanned.unwrap_or_else(|| {
        let index = next.traversal_index;
        fallback(&nodes[last], next).with_anomaly(Anomaly::TraversalOutOfRange {
            index,
            len: nodes.len(),
        })
    })
}

/// Evaluate one scan position; `None` moves on to the next node
fn step(
    node: &MenuNode,
    index: usize,
    is_last: bool,
    state: &SessionState,
    body: &str,
) -> Option<TransitionResult> {
    if node.is_root_menu() {
        return Some(enter_menu(node, state.clone()));
    }

    if node.is_child_of(state.cursor_node_id.as_deref()) && node.matches_trigger(body) {
        return Some(match node.kind {
            NodeKind::Menu => enter_menu(node, state.clone()),
            NodeKind::Leaf => select_child(node, state.clone()),
        });
    }

    if is_last {
        return Some(fallback(node, state.clone()));
    }

    if state.traversal_index == 0 {
        return Some(greet(node, index, state.clone()));
    }

    None
}

fn enter_menu(node: &MenuNode, mut state: SessionState) -> TransitionResult {
    state.awaiting_selection = true;
    state.cursor_node_id = Some(node.id.clone());
    TransitionResult::new(state).with_reply(node.body.clone())
}

fn select_child(node: &MenuNode, mut state: SessionState) -> TransitionResult {
    state.awaiting_selection = false;
    state.cursor_node_id = Some(node.id.clone());
    if node.finish_lane {
        state.traversal_index = 0;
    }
    TransitionResult::new(state).with_reply(node.body.clone())
}

fn fallback(node: &MenuNode, mut state: SessionState) -> TransitionResult {
    state.traversal_index = 0;
    state.awaiting_selection = false;
    TransitionResult::new(state).with_reply(node.body.clone())
}

fn greet(node: &MenuNode, index: usize, mut state: SessionState) -> TransitionResult {
    state.awaiting_selection = false;
    state.traversal_index = index + 1;
    TransitionResult::new(state).with_reply(node.body.clone())
}

/// A selection is the leading run of digits, in `1..=child_count`.
///
/// Anything after the digits is ignored, so `"2abc"` and `"1 please"` select
/// 2 and 1. A leading `+` is accepted, a leading `-` is not.
fn parse_selection(body: &str, child_count: usize) -> Option<usize> {
    let unsigned = body.strip_prefix('+').unwrap_or(body);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    unsigned
        .get(..end)?
        .parse::<usize>()
        .ok()
        .filter(|selection| (1..=child_count).contains(selection))
}

/// Keep the session where it is and show the current menu again
fn reject_selection(nodes: &[MenuNode], state: &SessionState, child_count: usize) -> TransitionResult {
    let result = TransitionResult::new(state.clone()).with_reply(invalid_option_reply(child_count));

    let cursor_node = state
        .cursor_node_id
        .as_deref()
        .and_then(|id| nodes.iter().find(|n| n.id == id));

    match cursor_node {
        Some(node) => result.with_reply(node.body.clone()),
        None => result.with_anomaly(Anomaly::DanglingCursor(state.cursor_node_id.clone())),
    }
}
