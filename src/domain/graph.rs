//! Include graph for resolved headers
//!
//! A petgraph view of the local include edges in an [`OrderedHeaders`] set.
//! Edges point from the included header to the header that includes it, so
//! a topological sort lists dependencies first.

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use thiserror::Error;

use super::id::HeaderId;
use super::resolver::OrderedHeaders;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Include graph has a cycle through {0}")]
    CycleDetected(HeaderId),

    #[error("Header not found in graph: {0}")]
    HeaderNotFound(HeaderId),
}

/// Directed include graph
#[derive(Debug, Default)]
pub struct IncludeGraph {
    /// The underlying directed graph
    graph: DiGraph<HeaderId, ()>,

    /// Map from HeaderId to node index
    node_map: HashMap<HeaderId, NodeIndex>,
}

impl IncludeGraph {
    /// Creates an empty include graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds the graph for a resolved header set
    pub fn from_headers(headers: &OrderedHeaders) -> Result<Self, GraphError> {
        let mut graph = Self::new();

        for id in headers.ids() {
            graph.add_header(id.clone());
        }

        for record in headers.iter() {
            for include in record.dependencies() {
                graph.add_include(&record.id, include)?;
            }
        }

        Ok(graph)
    }

    /// Adds a header node
    pub fn add_header(&mut self, id: HeaderId) {
        if !self.node_map.contains_key(&id) {
            let idx = self.graph.add_node(id.clone());
            self.node_map.insert(id, idx);
        }
    }

    /// Adds an edge: `includer` includes `included`
    pub fn add_include(&mut self, includer: &HeaderId, included: &HeaderId) -> Result<(), GraphError> {
        let includer_idx = self.index(includer)?;
        let included_idx = self.index(included)?;

        if self.graph.find_edge(included_idx, includer_idx).is_none() {
            self.graph.add_edge(included_idx, includer_idx, ());
        }
        Ok(())
    }

    fn index(&self, id: &HeaderId) -> Result<NodeIndex, GraphError> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::HeaderNotFound(id.clone()))
    }

    /// Headers directly included by `id`
    pub fn dependencies(&self, id: &HeaderId) -> Vec<HeaderId> {
        self.neighbors(id, petgraph::Direction::Incoming)
    }

    /// Headers that directly include `id`
    pub fn dependents(&self, id: &HeaderId) -> Vec<HeaderId> {
        self.neighbors(id, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, id: &HeaderId, direction: petgraph::Direction) -> Vec<HeaderId> {
        let Some(&idx) = self.node_map.get(id) else {
            return vec![];
        };

        let mut ids: Vec<HeaderId> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        ids.sort();
        ids
    }

    /// Returns true if no include cycle exists
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Returns some topological order of the headers
    pub fn topological_order(&self) -> Result<Vec<HeaderId>, GraphError> {
        toposort(&self.graph, None)
            .map(|order| {
                order
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect()
            })
            .map_err(|cycle| {
                let id = self.graph[cycle.node_id()].clone();
                GraphError::CycleDetected(id)
            })
    }

    /// Returns true if every header in `order` comes after all it includes
    ///
    /// Headers missing from `order` make the check fail.
    pub fn respects<'a>(&self, order: impl IntoIterator<Item = &'a HeaderId>) -> bool {
        let position: HashMap<&HeaderId, usize> =
            order.into_iter().enumerate().map(|(i, id)| (id, i)).collect();

        self.graph.edge_indices().all(|edge| {
            let Some((from, to)) = self.graph.edge_endpoints(edge) else {
                return false;
            };
            match (position.get(&self.graph[from]), position.get(&self.graph[to])) {
                (Some(included), Some(includer)) => included < includer,
                _ => false,
            }
        })
    }

    /// Returns true if the graph contains the header
    pub fn contains(&self, id: &HeaderId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Number of include edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}
