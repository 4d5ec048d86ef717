//! [`petgraph`] views of an [`LPO`]
use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::lpo_struct::{Arc, ArcID, EventID, LPO};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Which arcs of an [`LPO`] to include in a graph view
pub enum ArcSelection {
    /// Every arc
    #[default]
    All,
    /// Only arcs of the generating relation
    Generating,
    /// Only skeleton arcs (i.e., the Hasse diagram)
    Skeleton,
}

impl ArcSelection {
    /// Check if the passed [`Arc`] is part of this selection
    pub fn includes(self, arc: &Arc) -> bool {
        match self {
            ArcSelection::All => true,
            ArcSelection::Generating => arc.generating,
            ArcSelection::Skeleton => arc.skeleton,
        }
    }
}

impl LPO {
    fn graph_with_index(
        &self,
        selection: ArcSelection,
    ) -> (DiGraph<String, ArcID>, HashMap<&EventID, NodeIndex>) {
        let mut graph = DiGraph::with_capacity(self.event_count(), self.arcs().len());
        let node_of: HashMap<&EventID, NodeIndex> = self
            .events()
            .map(|event| (&event.id, graph.add_node(event.label.clone())))
            .collect();
        for arc in self.arcs().iter().filter(|arc| selection.includes(arc)) {
            if let (Some(from), Some(to)) = (node_of.get(&arc.source), node_of.get(&arc.target)) {
                graph.add_edge(*from, *to, arc.id.clone());
            }
        }
        (graph, node_of)
    }

    /// Creates a [`DiGraph`] from the [`LPO`]
    ///
    /// Nodes are weighted with event labels (in [`LPO::events`] order), edges with arc ids.
    pub fn to_graph(&self, selection: ArcSelection) -> DiGraph<String, ArcID> {
        self.graph_with_index(selection).0
    }

    /// Compare two [`LPO`]s for structural equality
    ///
    /// True if the graphs of the selected arcs are isomorphic with matching event labels.
    /// Event ids, positions and arc ids are ignored.
    pub fn is_isomorphic(&self, other: &LPO, selection: ArcSelection) -> bool {
        let graph = self.to_graph(selection);
        let other_graph = other.to_graph(selection);
        petgraph::algo::is_isomorphic_matching(
            &graph,
            &other_graph,
            |a: &String, b: &String| a == b,
            |_: &ArcID, _: &ArcID| true,
        )
    }

    /// Check whether `before` strictly precedes `after` via the current arcs
    ///
    /// Follows paths of any length, so this works both before and after the closure was computed.
    /// Always false for `before == after` or unknown events.
    pub fn precedes(&self, before: &EventID, after: &EventID) -> bool {
        if before == after {
            return false;
        }
        let (graph, node_of) = self.graph_with_index(ArcSelection::All);
        match (node_of.get(before), node_of.get(after)) {
            (Some(from), Some(to)) => petgraph::algo::has_path_connecting(&graph, *from, *to, None),
            _ => false,
        }
    }
}
