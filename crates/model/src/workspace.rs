//! Workspace registry
//!
//! A `Workspace` records which blocks of a `BlockGraph` are live in it.
//! Whole trees are added and removed at once, and a block id can be
//! registered only once.

use crate::graph::BlockGraph;
use blockly_core::{
    BlockId, EngineError, EngineResult, Identifiable, Named, Timestamped, Validatable, WorkspaceId,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

// ============================================================================
// Workspace
// ============================================================================

/// Registry of the block trees active in one editing surface
#[derive(Debug)]
pub struct Workspace {
    id: WorkspaceId,

    /// Display name
    pub name: String,

    /// Registered ids, for identity lookups
    members: HashSet<BlockId>,

    /// Registered ids in registration order
    order: Vec<BlockId>,

    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl Workspace {
    /// Create an empty workspace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members: HashSet::new(),
            order: Vec::new(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register `root` and every block below it
    ///
    /// Fails with `DuplicateBlock` if any block in the tree is already
    /// registered, here or in another workspace; nothing is registered in
    /// that case. The root must not hang from a block outside this
    /// workspace. Returns the registered ids in traversal order.
    pub fn add_block_tree(
        &mut self,
        graph: &mut BlockGraph,
        root: BlockId,
    ) -> EngineResult<Vec<BlockId>> {
        let ids = graph.tree_ids(root)?;

        for &id in &ids {
            if self.members.contains(&id) || graph.get(id)?.workspace().is_some() {
                return Err(EngineError::DuplicateBlock(id));
            }
        }
        if let Some(parent) = graph.parent_of(root) {
            return Err(EngineError::validation(format!(
                "Block {} is attached to {}, which is not in workspace '{}'",
                root, parent, self.name
            )));
        }

        for &id in &ids {
            graph.get_mut(id)?.workspace = Some(self.id);
            self.members.insert(id);
            self.order.push(id);
        }
        self.touch();

        tracing::debug!(
            "Registered {} block(s) under {} in workspace '{}'",
            ids.len(),
            root,
            self.name
        );
        Ok(ids)
    }

    /// Unregister `root` and every block below it
    ///
    /// The root is first disconnected from its parent, so the rest of the
    /// workspace never points at an unregistered block. Fails with
    /// `BlockNotFound` if `root` isn't registered here.
    pub fn remove_block_tree(
        &mut self,
        graph: &mut BlockGraph,
        root: BlockId,
    ) -> EngineResult<Vec<BlockId>> {
        if !self.members.contains(&root) {
            return Err(EngineError::BlockNotFound(root));
        }
        let ids = graph.tree_ids(root)?;
        graph.unplug(root)?;

        for &id in &ids {
            self.members.remove(&id);
            graph.get_mut(id)?.workspace = None;
        }
        self.order.retain(|id| self.members.contains(id));
        self.touch();

        tracing::debug!(
            "Unregistered {} block(s) under {} from workspace '{}'",
            ids.len(),
            root,
            self.name
        );
        Ok(ids)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Check if a block is registered
    pub fn contains(&self, id: BlockId) -> bool {
        self.members.contains(&id)
    }

    /// Get the number of registered blocks
    pub fn block_count(&self) -> usize {
        self.members.len()
    }

    /// Get the registered ids in registration order
    pub fn block_ids(&self) -> &[BlockId] {
        &self.order
    }

    /// Registered blocks that have no parent
    pub fn top_blocks(&self, graph: &BlockGraph) -> Vec<BlockId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| graph.parent_of(id).is_none())
            .collect()
    }

    /// Check the registry against the graph
    ///
    /// Every member exists and points back here, the graph's edges are
    /// consistent, and the trees under the top blocks cover exactly the
    /// members, each block once. Typed graph errors pass through as is;
    /// only internal edge failures gain the workspace name.
    pub fn validate_with(&self, graph: &BlockGraph) -> EngineResult<()> {
        self.validate()?;
        graph.validate().map_err(|err| match err {
            EngineError::Internal(message) => {
                EngineError::with_context(format!("Workspace '{}'", self.name), message)
            }
            other => other,
        })?;

        for &id in &self.order {
            if graph.get(id)?.workspace() != Some(self.id) {
                return Err(EngineError::internal(format!(
                    "Block {} is registered in '{}' but points elsewhere",
                    id, self.name
                )));
            }
        }

        let mut reached = HashSet::new();
        for top in self.top_blocks(graph) {
            for id in graph.tree_ids(top)? {
                if !reached.insert(id) {
                    return Err(EngineError::DuplicateBlock(id));
                }
            }
        }
        if reached != self.members {
            return Err(EngineError::internal(format!(
                "Workspace '{}' trees reach {} block(s) but {} are registered",
                self.name,
                reached.len(),
                self.members.len()
            )));
        }
        Ok(())
    }
}

impl Identifiable for Workspace {
    fn id(&self) -> WorkspaceId {
        self.id
    }
}

impl Named for Workspace {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Timestamped for Workspace {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

impl Validatable for Workspace {
    fn validate(&self) -> EngineResult<()> {
        if self.order.len() != self.members.len()
            || self.order.iter().any(|id| !self.members.contains(id))
        {
            return Err(EngineError::internal(format!(
                "Workspace '{}' registry is out of sync",
                self.name
            )));
        }
        Ok(())
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new("Workspace")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BlockBuilder;
    use crate::connection::{ConnectionRef, ConnectionSlot};
    use crate::input::{InputBuilder, InputType};
    use pretty_assertions::assert_eq;

    fn statement(graph: &mut BlockGraph, name: &str) -> BlockId {
        let mut builder =
            BlockBuilder::new(name).with_input(InputBuilder::new(InputType::Statement, "DO"));
        builder.set_previous_connection(true, None).unwrap();
        builder.set_next_connection(true, None).unwrap();
        builder.make_block_in(graph).unwrap()
    }

    /// a -> b, with c inside a's statement input
    fn small_tree(graph: &mut BlockGraph) -> (BlockId, BlockId, BlockId) {
        let a = statement(graph, "a");
        let b = statement(graph, "b");
        let c = statement(graph, "c");
        graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(b))
            .unwrap();
        graph
            .connect(ConnectionRef::input(a, 0), ConnectionRef::previous(c))
            .unwrap();
        (a, b, c)
    }

    #[test]
    fn test_add_block_tree_registers_everything() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let (a, b, c) = small_tree(&mut graph);

        let ids = workspace.add_block_tree(&mut graph, a).unwrap();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(workspace.block_count(), 3);
        assert_eq!(workspace.top_blocks(&graph), vec![a]);
        for id in [a, b, c] {
            assert!(workspace.contains(id));
            assert_eq!(graph.get(id).unwrap().workspace(), Some(workspace.id()));
        }
        workspace.validate_with(&graph).unwrap();
    }

    #[test]
    fn test_add_twice_is_duplicate() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let (a, b, _) = small_tree(&mut graph);
        workspace.add_block_tree(&mut graph, a).unwrap();
        let before = workspace.block_ids().to_vec();

        let err = workspace.add_block_tree(&mut graph, a).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateBlock(id) if id == a));

        // Sub-tree of an already registered tree
        let err = workspace.add_block_tree(&mut graph, b).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateBlock(id) if id == b));

        assert_eq!(workspace.block_ids(), &before[..]);
        workspace.validate_with(&graph).unwrap();
    }

    #[test]
    fn test_block_in_other_workspace_is_duplicate() {
        let mut graph = BlockGraph::new();
        let mut first = Workspace::new("first");
        let mut second = Workspace::new("second");
        let a = statement(&mut graph, "a");

        first.add_block_tree(&mut graph, a).unwrap();
        let err = second.add_block_tree(&mut graph, a).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateBlock(_)));
        assert_eq!(second.block_count(), 0);
        assert_eq!(graph.get(a).unwrap().workspace(), Some(first.id()));
    }

    #[test]
    fn test_add_missing_root() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::default();
        let err = workspace
            .add_block_tree(&mut graph, Uuid::new_v4())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_connect_across_workspace_boundary_rejected() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let a = statement(&mut graph, "a");
        let loose = statement(&mut graph, "loose");
        workspace.add_block_tree(&mut graph, a).unwrap();

        let err = graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(loose))
            .unwrap_err();
        assert!(matches!(err, EngineError::IncompatibleConnection(_)));
    }

    #[test]
    fn test_remove_block_tree() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let (a, b, c) = small_tree(&mut graph);
        workspace.add_block_tree(&mut graph, a).unwrap();

        let removed = workspace.remove_block_tree(&mut graph, b).unwrap();
        assert_eq!(removed, vec![b]);
        assert_eq!(graph.next_block(a), None);
        assert!(graph.get(b).unwrap().workspace().is_none());
        assert_eq!(workspace.block_ids(), &[a, c][..]);
        workspace.validate_with(&graph).unwrap();

        let removed = workspace.remove_block_tree(&mut graph, a).unwrap();
        assert_eq!(removed, vec![a, c]);
        assert_eq!(workspace.block_count(), 0);
        // The removed tree keeps its own internal edges
        assert_eq!(graph.input_child(a, 0), Some(c));
    }

    #[test]
    fn test_remove_unknown_block() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let a = statement(&mut graph, "a");

        let err = workspace.remove_block_tree(&mut graph, a).unwrap_err();
        assert!(matches!(err, EngineError::BlockNotFound(id) if id == a));
    }

    #[test]
    fn test_removed_tree_can_be_added_again() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let (a, _, _) = small_tree(&mut graph);

        workspace.add_block_tree(&mut graph, a).unwrap();
        workspace.remove_block_tree(&mut graph, a).unwrap();
        assert_eq!(workspace.add_block_tree(&mut graph, a).unwrap().len(), 3);
    }

    #[test]
    fn test_validate_with_keeps_error_variants() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let (a, b, _) = small_tree(&mut graph);
        workspace.add_block_tree(&mut graph, a).unwrap();

        graph.get_mut(b).unwrap().name.clear();
        let err = workspace.validate_with(&graph).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_with_names_workspace_on_broken_edge() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let (a, _, _) = small_tree(&mut graph);
        workspace.add_block_tree(&mut graph, a).unwrap();

        graph
            .get_mut(a)
            .unwrap()
            .connection_mut(ConnectionSlot::Next)
            .unwrap()
            .clear_target();

        let err = workspace.validate_with(&graph).unwrap_err();
        assert!(matches!(
            err,
            EngineError::WithContext { ref context, .. } if context == "Workspace 'main'"
        ));
    }

    #[test]
    fn test_validate_with_missing_member_is_not_found() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let a = statement(&mut graph, "a");
        workspace.add_block_tree(&mut graph, a).unwrap();

        let ghost = Uuid::new_v4();
        workspace.members.insert(ghost);
        workspace.order.push(ghost);

        let err = workspace.validate_with(&graph).unwrap_err();
        assert!(matches!(err, EngineError::BlockNotFound(id) if id == ghost));
    }

    #[test]
    fn test_touch_on_mutation() {
        let mut graph = BlockGraph::new();
        let mut workspace = Workspace::new("main");
        let before = workspace.modified_at();
        let a = statement(&mut graph, "a");
        workspace.add_block_tree(&mut graph, a).unwrap();
        assert!(workspace.modified_at() >= before);
        assert!(workspace.created_at() <= workspace.modified_at());
    }
}
