use pt_core::{EdgeData, GraphElement, LabelMetrics, NodeData, TreeNode, format_percent};

/// Emit the flat element list for a resolved tree.
///
/// Ids are assigned by pre-order traversal index (`n0, n1, …` for nodes,
/// `e0, e1, …` for edges in emission order), so textually identical input
/// compiles to byte-identical output. Each node is emitted first, then the
/// edge connecting it to its parent, then its children in source order; the
/// order is part of the output contract.
pub(crate) fn compile(root: &TreeNode, metrics: &LabelMetrics) -> Vec<GraphElement> {
    let node_count = root.node_count();
    let mut elements = Vec::with_capacity(node_count * 2 - 1);
    let mut counters = Counters::default();
    emit(root, None, metrics, &mut counters, &mut elements);
    elements
}

#[derive(Default)]
struct Counters {
    nodes: usize,
    edges: usize,
}

fn emit(
    node: &TreeNode,
    parent_id: Option<&str>,
    metrics: &LabelMetrics,
    counters: &mut Counters,
    out: &mut Vec<GraphElement>,
) {
    let id = format!("n{}", counters.nodes);
    counters.nodes += 1;

    let (width, height) = metrics.measure(&node.label);
    let prob = node.probability.map(format_percent).unwrap_or_default();

    out.push(GraphElement::Node {
        data: NodeData {
            id: id.clone(),
            label: node.label.clone(),
            prob: prob.clone(),
            width,
            height,
        },
    });

    if let Some(source) = parent_id {
        let edge_id = format!("e{}", counters.edges);
        counters.edges += 1;
        out.push(GraphElement::Edge {
            data: EdgeData {
                id: edge_id,
                source: source.to_string(),
                target: id.clone(),
                label: prob,
            },
        });
    }

    for child in &node.children {
        emit(child, Some(&id), metrics, counters, out);
    }
}
