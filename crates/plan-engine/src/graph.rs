//! The plan graph: stages and handled edges as plain data.
//!
//! The graph is deliberately a serializable value rather than a registry of
//! callbacks, so a host can inspect the wiring (and its conditional edges)
//! without executing anything. Stage behavior is bound separately through the
//! executor's stage registry.

use serde::{Deserialize, Serialize};

use crate::error::{PlanEngineError, Result};

/// Unique identifier for a stage node.
pub type StageId = String;

/// The role a node plays in the control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Entry point. Exactly one per graph.
    Start,
    /// A regular stage with a registered [`crate::Stage`] implementation.
    Stage,
    /// Runs the named branch stages concurrently, then follows its own
    /// `next` edge once all branches completed. Branch stages keep their own
    /// outgoing edges for conditional re-entry.
    FanOut { branches: Vec<StageId> },
    /// Synchronization point where branch paths converge. Pass-through.
    Barrier,
    /// Conditional routing through a registered [`crate::Router`]; the
    /// chosen handle selects the outgoing edge.
    Router,
    /// Terminal node. Can have multiple.
    End,
}

/// A node in the plan graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageNode {
    pub id: StageId,
    pub kind: StageKind,
}

impl StageNode {
    pub fn new(id: impl Into<String>, kind: StageKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// A directed edge between two stages, labeled with a source handle.
///
/// Plain stages emit the `next` handle; routers emit one handle per verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEdge {
    pub source: StageId,
    pub handle: String,
    pub target: StageId,
}

impl StageEdge {
    pub fn new(
        source: impl Into<String>,
        handle: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            handle: handle.into(),
            target: target.into(),
        }
    }

    /// Convenience for the default `next` handle.
    pub fn next(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, "next", target)
    }
}

/// The directed stage graph for one workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanGraph {
    pub id: String,
    pub name: String,
    pub nodes: Vec<StageNode>,
    pub edges: Vec<StageEdge>,
}

impl PlanGraph {
    /// Create a new empty graph.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a node, builder style.
    pub fn with_node(mut self, id: impl Into<String>, kind: StageKind) -> Self {
        self.nodes.push(StageNode::new(id, kind));
        self
    }

    /// Add an edge, builder style.
    pub fn with_edge(mut self, edge: StageEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Find a node by its ID.
    pub fn find_node(&self, id: &str) -> Option<&StageNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find the single Start node.
    pub fn find_start(&self) -> Option<&StageNode> {
        self.nodes.iter().find(|n| n.kind == StageKind::Start)
    }

    /// All edges leaving a node.
    pub fn outgoing_edges(&self, id: &str) -> Vec<&StageEdge> {
        self.edges.iter().filter(|e| e.source == id).collect()
    }

    /// The target reached by following a handle out of a node.
    pub fn follow(&self, source: &str, handle: &str) -> Option<&StageId> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.handle == handle)
            .map(|e| &e.target)
    }

    /// Check structural invariants before execution.
    ///
    /// Verifies there is exactly one Start node, every edge endpoint exists,
    /// every non-End node has at least one outgoing edge, and fan-out
    /// branches are declared nodes.
    pub fn validate(&self) -> Result<()> {
        let starts = self
            .nodes
            .iter()
            .filter(|n| n.kind == StageKind::Start)
            .count();
        if starts != 1 {
            return Err(PlanEngineError::InvalidGraph(format!(
                "expected exactly one start node, found {}",
                starts
            )));
        }

        for edge in &self.edges {
            if self.find_node(&edge.source).is_none() {
                return Err(PlanEngineError::InvalidGraph(format!(
                    "edge source '{}' is not a node",
                    edge.source
                )));
            }
            if self.find_node(&edge.target).is_none() {
                return Err(PlanEngineError::InvalidGraph(format!(
                    "edge target '{}' is not a node",
                    edge.target
                )));
            }
        }

        for node in &self.nodes {
            match &node.kind {
                StageKind::End => {}
                StageKind::FanOut { branches } => {
                    if branches.is_empty() {
                        return Err(PlanEngineError::InvalidGraph(format!(
                            "fan-out '{}' has no branches",
                            node.id
                        )));
                    }
                    for branch in branches {
                        match self.find_node(branch).map(|n| &n.kind) {
                            Some(StageKind::Stage) => {}
                            Some(_) => {
                                return Err(PlanEngineError::InvalidGraph(format!(
                                    "fan-out branch '{}' is not a plain stage",
                                    branch
                                )))
                            }
                            None => {
                                return Err(PlanEngineError::InvalidGraph(format!(
                                    "fan-out branch '{}' is not a node",
                                    branch
                                )))
                            }
                        }
                    }
                    if self.follow(&node.id, "next").is_none() {
                        return Err(PlanEngineError::InvalidGraph(format!(
                            "fan-out '{}' has no next edge",
                            node.id
                        )));
                    }
                }
                _ => {
                    if self.outgoing_edges(&node.id).is_empty() {
                        return Err(PlanEngineError::InvalidGraph(format!(
                            "node '{}' has no outgoing edge",
                            node.id
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_graph() -> PlanGraph {
        PlanGraph::new("g", "Test")
            .with_node("start", StageKind::Start)
            .with_node("work", StageKind::Stage)
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "work"))
            .with_edge(StageEdge::next("work", "end"))
    }

    #[test]
    fn test_validate_accepts_linear_graph() {
        assert!(linear_graph().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_edge() {
        let graph = linear_graph().with_edge(StageEdge::next("work", "ghost"));
        assert!(matches!(
            graph.validate(),
            Err(PlanEngineError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_validate_requires_single_start() {
        let graph = linear_graph().with_node("start2", StageKind::Start);
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_undeclared_fanout_branch() {
        let graph = PlanGraph::new("g", "Test")
            .with_node("start", StageKind::Start)
            .with_node(
                "fan",
                StageKind::FanOut {
                    branches: vec!["missing".to_string()],
                },
            )
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "fan"))
            .with_edge(StageEdge::next("fan", "end"));
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_follow_handles() {
        let graph = PlanGraph::new("g", "Test")
            .with_node("start", StageKind::Start)
            .with_node("router", StageKind::Router)
            .with_node("a", StageKind::End)
            .with_node("b", StageKind::End)
            .with_edge(StageEdge::next("start", "router"))
            .with_edge(StageEdge::new("router", "left", "a"))
            .with_edge(StageEdge::new("router", "right", "b"));

        assert_eq!(graph.follow("router", "left").unwrap(), "a");
        assert_eq!(graph.follow("router", "right").unwrap(), "b");
        assert!(graph.follow("router", "up").is_none());
    }

    #[test]
    fn test_graph_is_serializable() {
        let json = serde_json::to_string(&linear_graph()).unwrap();
        assert!(json.contains("\"kind\":\"start\""));
        let back: PlanGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, linear_graph());
    }
}
