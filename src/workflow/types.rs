/// Core graph and state type definitions
///
/// Defines the declarative graph structures (nodes, edges, start node) and the
/// shared run state that step functions read from and write partial updates into.
/// All types round-trip through JSON so the transport layer can accept them as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Partial state update returned by a tool: keys to overwrite in the run state
pub type StateUpdate = Map<String, Value>;

/// A complete graph definition containing nodes, edges and an entry point
///
/// Graphs are immutable once registered. Edge order is significant: outgoing
/// edges of a node are evaluated in declaration order and the first match wins.
/// Node order carries no meaning and is only preserved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Declared nodes
    pub nodes: Vec<NodeDefinition>,
    /// Declared transitions, in evaluation order
    pub edges: Vec<EdgeDefinition>,
    /// Node id where every run begins
    pub start_node: String,
}

/// A single step in the graph, bound to a named tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique node identifier within the graph (e.g., "extract")
    pub id: String,
    /// Name of the tool in the tool registry invoked when this node is visited
    pub function_name: String,
}

/// Directed transition between two nodes, optionally guarded by a state condition
///
/// - No `condition_key`: unconditional edge, taken if nothing earlier matched.
/// - `condition_key` with `condition_value`: taken iff `state[key] == value`.
/// - `condition_key` without `condition_value`: taken iff `state[key]` is truthy.
///
/// A JSON `null` condition value is treated the same as an absent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    /// Source node ID
    pub from_node: String,
    /// Target node ID
    pub to_node: String,
    /// State key inspected by the guard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_key: Option<String>,
    /// Exact value the state key must equal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_value: Option<Value>,
}

impl GraphDefinition {
    /// Create a graph with the given entry point and no nodes or edges
    pub fn new(start_node: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            start_node: start_node.into(),
        }
    }

    /// Add a node bound to a tool name
    pub fn node(mut self, id: impl Into<String>, function_name: impl Into<String>) -> Self {
        self.nodes.push(NodeDefinition {
            id: id.into(),
            function_name: function_name.into(),
        });
        self
    }

    /// Add an edge
    pub fn edge(mut self, edge: EdgeDefinition) -> Self {
        self.edges.push(edge);
        self
    }
}

impl EdgeDefinition {
    /// Create an unconditional (default) edge
    pub fn always(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_node: from.into(),
            to_node: to.into(),
            condition_key: None,
            condition_value: None,
        }
    }

    /// Create an edge taken when `state[key]` is truthy
    pub fn when_truthy(
        from: impl Into<String>,
        to: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            condition_key: Some(key.into()),
            ..Self::always(from, to)
        }
    }

    /// Create an edge taken when `state[key]` equals `value`
    pub fn when_equals(
        from: impl Into<String>,
        to: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            condition_key: Some(key.into()),
            condition_value: Some(value.into()),
            ..Self::always(from, to)
        }
    }

    /// Whether this edge carries no guard
    pub fn is_unconditional(&self) -> bool {
        self.condition_key.is_none()
    }

    /// Evaluate this edge's guard against the current state
    ///
    /// Unconditional edges always report a match; the caller decides whether
    /// an earlier edge already won.
    pub fn matches(&self, state: &RunState) -> bool {
        let Some(key) = self.condition_key.as_deref() else {
            return true;
        };

        match self.condition_value.as_ref().filter(|v| !v.is_null()) {
            Some(expected) => state.get(key).is_some_and(|actual| values_equal(actual, expected)),
            None => state.is_truthy(key),
        }
    }
}

/// Shared mutable state of a single run
///
/// An insertion-ordered JSON object. Tools only ever see it by shared reference;
/// the engine applies their partial updates with [`RunState::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunState(Map<String, Value>);

impl RunState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the key is present and its value is truthy
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// Shallow merge: every key in `update` overwrites the existing value,
    /// untouched keys are preserved and nested objects are replaced wholesale
    pub fn merge(&mut self, update: StateUpdate) {
        for (key, value) in update {
            self.0.insert(key, value);
        }
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying map
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the state has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RunState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RunState {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(anyhow::anyhow!("Run state must be a JSON object, got: {}", other)),
        }
    }
}

impl From<RunState> for Value {
    fn from(state: RunState) -> Self {
        Value::Object(state.into_inner())
    }
}

/// JSON equality used by equality edges
///
/// Numbers compare by value, so `1`, `1.0` and `1u64` are all equal. Arrays and
/// objects compare element-wise with the same rule.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, x)| y.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// JSON truthiness used by conditional edges
///
/// `null`, `false`, zero, the empty string, the empty array and the empty
/// object are falsy; every other value is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> RunState {
        RunState::try_from(value).unwrap()
    }

    #[test]
    fn test_merge_is_shallow_overwrite() {
        let mut s = state(json!({"a": 0, "b": 2, "nested": {"x": 1, "y": 2}}));
        let update = json!({"a": 1, "nested": {"x": 9}});
        s.merge(update.as_object().unwrap().clone());

        assert_eq!(s.get("a"), Some(&json!(1)));
        assert_eq!(s.get("b"), Some(&json!(2)));
        assert_eq!(s.get("nested"), Some(&json!({"x": 9})));
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!(-2.5), json!("x"), json!([0]), json!({"k": null})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn test_missing_key_is_falsy() {
        assert!(!RunState::new().is_truthy("flag"));
    }

    #[test]
    fn test_equality_edge() {
        let edge = EdgeDefinition::when_equals("X", "Y", "flag", "go");

        assert!(edge.matches(&state(json!({"flag": "go"}))));
        assert!(!edge.matches(&state(json!({"flag": "stop"}))));
        assert!(!edge.matches(&state(json!({"flag": true}))));
        assert!(!edge.matches(&state(json!({}))));
    }

    #[test]
    fn test_equality_edge_does_not_compare_ordering() {
        let edge = EdgeDefinition::when_equals("X", "Y", "score", 5);

        assert!(edge.matches(&state(json!({"score": 5}))));
        assert!(!edge.matches(&state(json!({"score": 6}))));
    }

    #[test]
    fn test_equality_edge_compares_numbers_by_value() {
        let edge: EdgeDefinition = serde_json::from_value(json!({
            "from_node": "a",
            "to_node": "b",
            "condition_key": "score",
            "condition_value": 1.0
        }))
        .unwrap();

        assert!(edge.matches(&state(json!({"score": 1}))));
        assert!(edge.matches(&state(json!({"score": 1.0}))));
        assert!(!edge.matches(&state(json!({"score": 1.5}))));
        assert!(!edge.matches(&state(json!({"score": "1"}))));
    }

    #[test]
    fn test_values_equal_nested() {
        assert!(values_equal(&json!([1, {"x": 2.0}]), &json!([1.0, {"x": 2}])));
        assert!(values_equal(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!values_equal(&json!(-1), &json!(u64::MAX)));
        assert!(!values_equal(&json!({"x": 1}), &json!({"x": 1, "y": 2})));
        assert!(!values_equal(&json!([1, 2]), &json!([1])));
        assert!(!values_equal(&json!(0), &json!(false)));
    }

    #[test]
    fn test_truthy_edge() {
        let edge = EdgeDefinition::when_truthy("X", "Y", "flag");

        assert!(edge.matches(&state(json!({"flag": 3}))));
        for value in [json!(0), json!(""), json!(null), json!(false)] {
            assert!(!edge.matches(&state(json!({"flag": value}))));
        }
        assert!(!edge.matches(&state(json!({}))));
    }

    #[test]
    fn test_null_condition_value_means_truthiness() {
        let edge: EdgeDefinition = serde_json::from_value(json!({
            "from_node": "a",
            "to_node": "b",
            "condition_key": "issue_count",
            "condition_value": null
        }))
        .unwrap();

        assert!(edge.matches(&state(json!({"issue_count": 2}))));
        assert!(!edge.matches(&state(json!({"issue_count": 0}))));
    }

    #[test]
    fn test_graph_deserializes_from_wire_format() {
        let graph: GraphDefinition = serde_json::from_value(json!({
            "start_node": "a",
            "nodes": [{"id": "a", "function_name": "f"}],
            "edges": [{"from_node": "a", "to_node": "a"}]
        }))
        .unwrap();

        assert_eq!(graph.start_node, "a");
        assert_eq!(graph.nodes[0].function_name, "f");
        assert!(graph.edges[0].is_unconditional());
    }

    #[test]
    fn test_non_object_state_rejected() {
        assert!(RunState::try_from(json!([1, 2])).is_err());
    }
}
