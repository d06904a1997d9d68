//! GraphViz DOT rendering of a crawled topology.
//!
//! Text output only; layout and rasterization are graphviz's job. Edges
//! follow the tree's parent→child adjacencies and pick up an interface
//! name/speed label when the crawl collected interface summaries.

use crate::crawler::TopologyNode;
use crate::device::short_hostname;

/// Render the adjacency of a topology tree as an undirected DOT graph.
pub fn render_dot(root: &TopologyNode) -> String {
    let mut dot = String::new();
    dot.push_str("graph topology {\n");
    dot.push_str("    rankdir=LR;\n");
    dot.push_str("    node [shape=box];\n\n");
    emit(root, &mut dot);
    dot.push_str("}\n");
    dot
}

fn emit(node: &TopologyNode, dot: &mut String) {
    dot.push_str(&format!("    \"{}\";\n", node.id));
    for child in &node.children {
        match edge_label(node, &child.id) {
            Some(label) => dot.push_str(&format!(
                "    \"{}\" -- \"{}\" [label=\"{}\"];\n",
                node.id, child.id, label
            )),
            None => dot.push_str(&format!("    \"{}\" -- \"{}\";\n", node.id, child.id)),
        }
        emit(child, dot);
    }
}

/// Label for the edge to `child`: the local interface that carries the
/// adjacency, when the node has interface summaries to search.
fn edge_label(node: &TopologyNode, child_id: &str) -> Option<String> {
    let entry = node.interfaces.iter().find(|entry| {
        entry.neighbour == child_id || short_hostname(&entry.neighbour) == child_id
    })?;
    match entry.speed {
        Some(speed) => Some(format!("{} ({})", entry.name, speed)),
        None => Some(entry.name.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::NeighbourInterface;
    use std::collections::BTreeMap;

    fn node(id: &str, children: Vec<TopologyNode>) -> TopologyNode {
        TopologyNode {
            id: id.to_string(),
            attributes: BTreeMap::new(),
            interfaces: Vec::new(),
            children,
        }
    }

    #[test]
    fn test_render_plain_edges() {
        let tree = node("a", vec![node("b", vec![node("c", vec![])]), node("d", vec![])]);
        let dot = render_dot(&tree);
        assert!(dot.starts_with("graph topology {"));
        assert!(dot.contains("\"a\" -- \"b\";"));
        assert!(dot.contains("\"b\" -- \"c\";"));
        assert!(dot.contains("\"a\" -- \"d\";"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_render_labels_edges_from_interface_summary() {
        let mut tree = node("a", vec![node("b", vec![])]);
        tree.interfaces.push(NeighbourInterface {
            index: 2,
            name: "eth1".to_string(),
            speed: Some(1000.0),
            neighbour: "b.example.com".to_string(),
        });
        let dot = render_dot(&tree);
        assert!(dot.contains("\"a\" -- \"b\" [label=\"eth1 (1000)\"];"));
    }
}
