/// Structural analysis of graph definitions using petgraph
///
/// Registration never validates a graph, so this report is purely diagnostic:
/// the API returns it as warnings and the engine keeps its lenient run-time
/// policy for dangling references.

use crate::workflow::types::{EdgeDefinition, GraphDefinition};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Findings for a single graph definition
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphReport {
    /// The start node is not a declared node
    pub missing_start: bool,
    /// Edges whose `from_node` or `to_node` is not declared
    pub dangling_edges: Vec<EdgeDefinition>,
    /// Declared nodes that can never be visited from the start node
    pub unreachable_nodes: Vec<String>,
    /// Tool names referenced by nodes but absent from the registry
    pub missing_tools: Vec<String>,
    /// Whether the graph contains a loop (runs may hit the step ceiling)
    pub has_cycles: bool,
}

impl GraphReport {
    /// Human-readable warnings, empty when the graph looks sound
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.missing_start {
            warnings.push("start node is not a declared node".to_string());
        }
        for edge in &self.dangling_edges {
            warnings.push(format!(
                "edge '{}' -> '{}' references an undeclared node",
                edge.from_node, edge.to_node
            ));
        }
        for node in &self.unreachable_nodes {
            warnings.push(format!("node '{}' is unreachable from the start node", node));
        }
        for tool in &self.missing_tools {
            warnings.push(format!("tool '{}' is not registered", tool));
        }
        warnings
    }
}

/// Analyze a graph definition against the set of registered tool names
pub fn analyze<S: AsRef<str>>(definition: &GraphDefinition, tool_names: &[S]) -> GraphReport {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();

    for node in &definition.nodes {
        index_of
            .entry(node.id.as_str())
            .or_insert_with(|| graph.add_node(node.id.as_str()));
    }

    let mut dangling_edges = Vec::new();
    for edge in &definition.edges {
        match (
            index_of.get(edge.from_node.as_str()),
            index_of.get(edge.to_node.as_str()),
        ) {
            (Some(&from), Some(&to)) => {
                graph.add_edge(from, to, ());
            }
            _ => dangling_edges.push(edge.clone()),
        }
    }

    let start = index_of.get(definition.start_node.as_str()).copied();
    let reachable = start
        .map(|start| find_reachable_nodes(&graph, start))
        .unwrap_or_default();

    let mut unreachable_nodes: Vec<String> = graph
        .node_indices()
        .filter(|idx| !reachable.contains(idx))
        .map(|idx| graph[idx].to_string())
        .collect();
    unreachable_nodes.sort();

    let known: HashSet<&str> = tool_names.iter().map(|name| AsRef::<str>::as_ref(name)).collect();
    let mut missing_tools: Vec<String> = definition
        .nodes
        .iter()
        .map(|n| n.function_name.as_str())
        .filter(|name| !known.contains(name))
        .map(str::to_string)
        .collect();
    missing_tools.sort();
    missing_tools.dedup();

    GraphReport {
        missing_start: start.is_none(),
        dangling_edges,
        unreachable_nodes,
        missing_tools,
        has_cycles: is_cyclic_directed(&graph),
    }
}

/// Find all nodes reachable from the starting node using BFS
fn find_reachable_nodes(graph: &DiGraph<&str, ()>, start: NodeIndex) -> HashSet<NodeIndex> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::new();

    queue.push_back(start);
    reachable.insert(start);

    while let Some(current) = queue.pop_front() {
        for target in graph.neighbors(current) {
            if reachable.insert(target) {
                queue.push_back(target);
            }
        }
    }

    reachable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_graph() -> GraphDefinition {
        GraphDefinition::new("extract")
            .node("extract", "extract_functions")
            .node("complexity", "check_complexity")
            .node("issues", "detect_issues")
            .node("improve", "suggest_improvements")
            .edge(EdgeDefinition::always("extract", "complexity"))
            .edge(EdgeDefinition::always("complexity", "issues"))
            .edge(EdgeDefinition::when_truthy("issues", "improve", "issue_count"))
            .edge(EdgeDefinition::always("improve", "complexity"))
    }

    #[test]
    fn test_sound_cyclic_graph() {
        let tools = ["extract_functions", "check_complexity", "detect_issues", "suggest_improvements"];
        let report = analyze(&review_graph(), &tools);

        assert!(!report.missing_start);
        assert!(report.dangling_edges.is_empty());
        assert!(report.unreachable_nodes.is_empty());
        assert!(report.missing_tools.is_empty());
        assert!(report.has_cycles);
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_dangling_and_unreachable() {
        let graph = GraphDefinition::new("a")
            .node("a", "f")
            .node("orphan", "g")
            .edge(EdgeDefinition::always("a", "ghost"));

        let report = analyze(&graph, &["f"]);

        assert_eq!(report.dangling_edges.len(), 1);
        assert_eq!(report.unreachable_nodes, vec!["orphan"]);
        assert_eq!(report.missing_tools, vec!["g"]);
        assert!(!report.has_cycles);
        assert_eq!(report.warnings().len(), 3);
    }

    #[test]
    fn test_missing_start() {
        let graph = GraphDefinition::new("nowhere").node("a", "f");
        let report = analyze(&graph, &["f"]);

        assert!(report.missing_start);
        assert_eq!(report.unreachable_nodes, vec!["a"]);
    }
}
