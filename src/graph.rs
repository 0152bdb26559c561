//! Correspondence graph between ground-truth and rendered regions, and its
//! partition into connected components.
//!
//! Nodes live in a flat table: ground-truth regions first, rendered regions
//! after them. Edges only ever join a ground-truth node to a rendered node.

use std::collections::VecDeque;

use tracing::instrument;

use crate::{overlap::RegionShape, Region};

pub const DEFAULT_IOU_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    GroundTruth,
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub side: Side,
    pub index: usize,
}

impl NodeId {
    pub fn gt(index: usize) -> Self {
        Self {
            side: Side::GroundTruth,
            index,
        }
    }

    pub fn render(index: usize) -> Self {
        Self {
            side: Side::Render,
            index,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorrespondenceGraph {
    nodes: Vec<NodeId>,
    adjacency: Vec<Vec<usize>>,
}

impl CorrespondenceGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut visited = vec![false; self.nodes.len()];
        let mut components = Vec::new();
        let mut queue = VecDeque::new();

        for start in 0..self.nodes.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            queue.push_back(start);
            let mut component = Vec::new();

            while let Some(slot) = queue.pop_front() {
                component.push(self.nodes[slot]);
                for &next in &self.adjacency[slot] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
            components.push(component);
        }
        components
    }
}

/// Links every ground-truth/rendered pair whose IoU reaches `iou_threshold`.
#[instrument(level = "trace", skip(gt, render))]
pub fn build_graph(gt: &[Region], render: &[Region], iou_threshold: f64) -> CorrespondenceGraph {
    let gt_shapes = gt
        .iter()
        .map(|it| RegionShape::new(&it.polygon))
        .collect::<Vec<_>>();
    let render_shapes = render
        .iter()
        .map(|it| RegionShape::new(&it.polygon))
        .collect::<Vec<_>>();

    let num_gt = gt.len();
    let nodes = (0..num_gt)
        .map(NodeId::gt)
        .chain((0..render.len()).map(NodeId::render))
        .collect::<Vec<_>>();
    let mut adjacency = vec![Vec::new(); nodes.len()];

    for (i, gt_shape) in gt_shapes.iter().enumerate() {
        for (j, render_shape) in render_shapes.iter().enumerate() {
            let iou = gt_shape.iou(render_shape);
            if iou >= iou_threshold {
                log::trace!("gt {i} <-> render {j} (iou {iou:.3})");
                adjacency[i].push(num_gt + j);
                adjacency[num_gt + j].push(i);
            }
        }
    }

    CorrespondenceGraph { nodes, adjacency }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn boxed(text: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        Region::new(text, vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
    }

    #[test]
    fn isolated_regions_are_nodes() {
        let gt = [boxed("a", 0.0, 0.0, 10.0, 10.0)];
        let render = [boxed("b", 50.0, 50.0, 60.0, 60.0)];
        let graph = build_graph(&gt, &render, DEFAULT_IOU_THRESHOLD);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.connected_components().len(), 2);
    }

    #[test]
    fn edges_are_symmetric_and_bipartite() {
        let gt = [boxed("a", 0.0, 0.0, 10.0, 10.0), boxed("b", 1.0, 1.0, 9.0, 9.0)];
        let render = [boxed("ab", 0.0, 0.0, 10.0, 10.0)];
        let graph = build_graph(&gt, &render, DEFAULT_IOU_THRESHOLD);
        assert_eq!(graph.edge_count(), 2);
        // render 0 sits right after the two ground-truth nodes
        assert_eq!(graph.nodes[2], NodeId::render(0));
        assert_eq!(graph.adjacency[2], vec![0, 1]);
        for (slot, neighbors) in graph.adjacency.iter().enumerate() {
            for &next in neighbors {
                assert_ne!(graph.nodes[slot].side, graph.nodes[next].side);
                assert!(graph.adjacency[next].contains(&slot));
            }
        }
    }

    #[test]
    fn threshold_is_inclusive_and_overridable() {
        // IoU of these two is 25 / 175
        let gt = [boxed("a", 0.0, 0.0, 10.0, 10.0)];
        let render = [boxed("a", 5.0, 5.0, 15.0, 15.0)];
        assert_eq!(build_graph(&gt, &render, 0.1).edge_count(), 1);
        assert_eq!(build_graph(&gt, &render, 0.5).edge_count(), 0);
        assert_eq!(build_graph(&gt, &render, 0.0).edge_count(), 1);
    }

    #[test]
    fn components_partition_nodes() {
        // chain gt0 - r0 - gt1, plus a lone gt2 and lone r1
        let gt = [
            boxed("a", 0.0, 0.0, 10.0, 10.0),
            boxed("b", 10.0, 0.0, 20.0, 10.0),
            boxed("c", 100.0, 100.0, 110.0, 110.0),
        ];
        let render = [
            boxed("ab", 5.0, 0.0, 15.0, 10.0),
            boxed("z", 300.0, 300.0, 310.0, 310.0),
        ];
        let graph = build_graph(&gt, &render, DEFAULT_IOU_THRESHOLD);
        let components = graph.connected_components();
        assert_eq!(components.len(), 3);

        let mut seen = BTreeSet::new();
        for component in &components {
            for node in component {
                assert!(seen.insert(*node), "{node:?} in two components");
            }
        }
        assert_eq!(seen, graph.nodes.iter().copied().collect());

        let first: BTreeSet<_> = components[0].iter().copied().collect();
        assert_eq!(
            first,
            BTreeSet::from([NodeId::gt(0), NodeId::gt(1), NodeId::render(0)])
        );
    }

    #[test]
    fn empty_inputs() {
        let graph = build_graph(&[], &[], DEFAULT_IOU_THRESHOLD);
        assert_eq!(graph.node_count(), 0);
        assert!(graph.connected_components().is_empty());
    }
}
