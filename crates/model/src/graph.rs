//! The block arena and its edges
//!
//! `BlockGraph` owns every block by id. Connection targets are
//! `ConnectionRef`s into the arena, so joining two blocks never creates
//! shared pointers. All edge mutation goes through `connect` and
//! `disconnect`, which check everything first and then update both
//! endpoints together.

use crate::block::Block;
use crate::connection::{Connection, ConnectionRef};
use blockly_core::{BlockId, EngineError, EngineResult, Named, Validatable};
use std::collections::{HashMap, HashSet};

// ============================================================================
// BlockGraph
// ============================================================================

/// Arena of blocks and the connections between them
#[derive(Debug, Default)]
pub struct BlockGraph {
    blocks: HashMap<BlockId, Block>,
}

impl BlockGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Block Management
    // ========================================================================

    /// Take ownership of a block
    pub fn insert(&mut self, block: Block) -> BlockId {
        let id = block.id;
        self.blocks.insert(id, block);
        id
    }

    /// Remove a block and hand it back
    ///
    /// The block must be disconnected from every neighbor and not
    /// registered in a workspace.
    pub fn remove(&mut self, id: BlockId) -> EngineResult<Block> {
        let block = self.get(id)?;
        if block.workspace().is_some() {
            return Err(EngineError::validation(format!(
                "Block '{}' ({}) is still registered in a workspace",
                block.name(),
                id
            )));
        }
        if !block.is_disconnected() {
            return Err(EngineError::in_use(format!(
                "Block '{}' ({}) is still connected",
                block.name(),
                id
            )));
        }
        self.blocks
            .remove(&id)
            .ok_or(EngineError::BlockNotFound(id))
    }

    /// Get a block by ID
    pub fn get(&self, id: BlockId) -> EngineResult<&Block> {
        self.blocks.get(&id).ok_or(EngineError::BlockNotFound(id))
    }

    /// Get a mutable block by ID
    pub fn get_mut(&mut self, id: BlockId) -> EngineResult<&mut Block> {
        self.blocks.get_mut(&id).ok_or(EngineError::BlockNotFound(id))
    }

    /// Check if a block is in the graph
    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    /// Get all blocks
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Get the number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the graph has no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Get the connection a reference points at
    pub fn connection(&self, at: ConnectionRef) -> EngineResult<&Connection> {
        self.get(at.block)?.require_connection(at.slot)
    }

    fn connection_mut(&mut self, at: ConnectionRef) -> EngineResult<&mut Connection> {
        self.get_mut(at.block)?
            .connection_mut(at.slot)
            .ok_or_else(|| EngineError::ConnectionNotFound {
                block: at.block,
                slot: at.slot.to_string(),
            })
    }

    /// Get the endpoint `at` is joined to
    pub fn target_of(&self, at: ConnectionRef) -> Option<ConnectionRef> {
        self.connection(at).ok()?.target()
    }

    /// Join two connections
    ///
    /// Fails without changing anything if the kinds don't complement each
    /// other, the type checks are disjoint, both endpoints are on the same
    /// block, the join would close a cycle, the blocks belong to different
    /// workspaces, or either endpoint is already joined.
    pub fn connect(&mut self, a: ConnectionRef, b: ConnectionRef) -> EngineResult<()> {
        let conn_a = self.connection(a)?;
        let conn_b = self.connection(b)?;

        conn_a.check_compatible(conn_b)?;

        if a.block == b.block {
            return Err(EngineError::incompatible(format!(
                "{} and {} are on the same block",
                a.slot, b.slot
            )));
        }

        if self.get(a.block)?.workspace() != self.get(b.block)?.workspace() {
            return Err(EngineError::incompatible(format!(
                "blocks {} and {} belong to different workspaces",
                a.block, b.block
            )));
        }

        if conn_a.is_connected() || conn_b.is_connected() {
            let busy = if conn_a.is_connected() { a } else { b };
            return Err(EngineError::in_use(format!("{} is already connected", busy)));
        }

        let (parent, child) = if conn_a.kind().is_parent_side() {
            (a.block, b.block)
        } else {
            (b.block, a.block)
        };
        if self.is_ancestor(child, parent) {
            return Err(EngineError::incompatible(format!(
                "connecting {} under {} would create a cycle",
                child, parent
            )));
        }

        self.connection_mut(a)?.set_target(b);
        self.connection_mut(b)?.set_target(a);

        tracing::debug!("Connected {} to {}", a, b);
        Ok(())
    }

    /// Separate a connection from its target
    ///
    /// Returns the former partner; disconnecting an unjoined connection is
    /// a no-op.
    pub fn disconnect(&mut self, at: ConnectionRef) -> EngineResult<Option<ConnectionRef>> {
        let Some(target) = self.connection(at)?.target() else {
            return Ok(None);
        };
        // Resolve the partner before touching either side
        self.connection(target)?;

        self.connection_mut(at)?.clear_target();
        self.connection_mut(target)?.clear_target();

        tracing::debug!("Disconnected {} from {}", at, target);
        Ok(Some(target))
    }

    /// Disconnect a block from its parent, if it has one
    pub fn unplug(&mut self, id: BlockId) -> EngineResult<Option<ConnectionRef>> {
        let slot = self.get(id)?.parent_connection().map(|(slot, _)| slot);
        match slot {
            Some(slot) => self.disconnect(ConnectionRef::new(id, slot)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Tree queries
    // ========================================================================

    /// Block this one hangs from (through previous or output)
    pub fn parent_of(&self, id: BlockId) -> Option<BlockId> {
        let (_, parent) = self.blocks.get(&id)?.parent_connection()?;
        parent.target().map(|t| t.block)
    }

    /// Block attached below this one's next connection
    pub fn next_block(&self, id: BlockId) -> Option<BlockId> {
        self.target_of(ConnectionRef::next(id)).map(|t| t.block)
    }

    /// Child of a specific input
    pub fn input_child(&self, id: BlockId, index: usize) -> Option<BlockId> {
        self.target_of(ConnectionRef::input(id, index)).map(|t| t.block)
    }

    /// Directly attached children, next block first, then input children
    pub fn children_of(&self, id: BlockId) -> Vec<BlockId> {
        let Some(block) = self.blocks.get(&id) else {
            return Vec::new();
        };
        block
            .child_connection_slots()
            .into_iter()
            .filter_map(|slot| block.connection(slot)?.target())
            .map(|t| t.block)
            .collect()
    }

    /// Parent chain from the immediate parent up to the root
    pub fn ancestors(&self, id: BlockId) -> Vec<BlockId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Check if `ancestor` is `id` itself or sits above it
    ///
    /// Stops as soon as `ancestor` is found.
    fn is_ancestor(&self, ancestor: BlockId, id: BlockId) -> bool {
        let mut seen = HashSet::from([id]);
        let mut current = id;
        loop {
            if current == ancestor {
                return true;
            }
            match self.parent_of(current) {
                Some(parent) if seen.insert(parent) => current = parent,
                _ => return false,
            }
        }
    }

    /// Top of the tree containing `id`
    pub fn root_of(&self, id: BlockId) -> BlockId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// Every block in the tree rooted at `root`
    ///
    /// Order: the statement chain from `root` first, then for each block of
    /// that chain, depth-first into each input's child.
    pub fn tree_ids(&self, root: BlockId) -> EngineResult<Vec<BlockId>> {
        self.get(root)?;
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_tree(root, &mut out, &mut seen)?;
        Ok(out)
    }

    fn collect_tree(
        &self,
        root: BlockId,
        out: &mut Vec<BlockId>,
        seen: &mut HashSet<BlockId>,
    ) -> EngineResult<()> {
        let mut chain = Vec::new();
        let mut current = Some(root);
        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(EngineError::internal(format!(
                    "block {} is reachable twice from {}",
                    id, root
                )));
            }
            chain.push(id);
            current = self.next_block(id);
        }
        out.extend(&chain);

        for id in chain {
            let block = self.get(id)?;
            for index in 0..block.inputs().len() {
                if let Some(child) = self.input_child(id, index) {
                    self.collect_tree(child, out, seen)?;
                }
            }
        }
        Ok(())
    }
}

impl Validatable for BlockGraph {
    /// Every block is well-formed and every edge is symmetric and points
    /// at a complementary connection
    fn validate(&self) -> EngineResult<()> {
        for block in self.blocks.values() {
            block.validate()?;

            for (slot, connection) in block.connections() {
                let Some(target) = connection.target() else {
                    continue;
                };
                let here = ConnectionRef::new(block.id, slot);
                let other = self.connection(target)?;
                if other.target() != Some(here) {
                    return Err(EngineError::internal(format!(
                        "{} points at {} but not the other way round",
                        here, target
                    )));
                }
                if !connection.kind().complements(other.kind()) {
                    return Err(EngineError::internal(format!(
                        "{} and {} are joined but not complementary",
                        here, target
                    )));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BlockBuilder;
    use crate::field::Field;
    use crate::input::{InputBuilder, InputType};
    use pretty_assertions::assert_eq;

    fn statement(graph: &mut BlockGraph, name: &str) -> BlockId {
        let mut builder = BlockBuilder::new(name)
            .with_input(InputBuilder::new(InputType::Value, "VALUE"))
            .with_input(InputBuilder::new(InputType::Statement, "DO"));
        builder.set_previous_connection(true, None).unwrap();
        builder.set_next_connection(true, None).unwrap();
        builder.make_block_in(graph).unwrap()
    }

    fn expression(graph: &mut BlockGraph, name: &str, checks: Option<&[&str]>) -> BlockId {
        let mut builder = BlockBuilder::new(name);
        builder
            .set_output_connection(
                true,
                checks.map(|c| c.iter().map(|s| s.to_string()).collect()),
            )
            .unwrap();
        builder.make_block_in(graph).unwrap()
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let b = statement(&mut graph, "b");

        graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(b))
            .unwrap();

        assert_eq!(
            graph.target_of(ConnectionRef::next(a)),
            Some(ConnectionRef::previous(b))
        );
        assert_eq!(
            graph.target_of(ConnectionRef::previous(b)),
            Some(ConnectionRef::next(a))
        );
        assert_eq!(graph.parent_of(b), Some(a));
        assert_eq!(graph.next_block(a), Some(b));
        assert!(graph.is_valid());
    }

    #[test]
    fn test_connect_incompatible_kinds() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let b = statement(&mut graph, "b");

        let err = graph
            .connect(ConnectionRef::next(a), ConnectionRef::next(b))
            .unwrap_err();
        assert!(matches!(err, EngineError::IncompatibleConnection(_)));
        assert!(graph.get(a).unwrap().is_disconnected());
        assert!(graph.get(b).unwrap().is_disconnected());
    }

    #[test]
    fn test_connect_type_checks() {
        let mut graph = BlockGraph::new();
        let host = statement(&mut graph, "host");
        let number = expression(&mut graph, "number", Some(&["Number"]));
        let boolean = expression(&mut graph, "boolean", Some(&["Boolean"]));

        let mut builder = BlockBuilder::new("typed_host");
        let mut input = InputBuilder::new(InputType::Value, "IF");
        input.set_connection_type_check("Boolean");
        builder.input_builders.push(input);
        let typed = builder.make_block_in(&mut graph).unwrap();

        // Unrestricted input accepts anything
        graph
            .connect(ConnectionRef::input(host, 0), ConnectionRef::output(number))
            .unwrap();

        let err = graph
            .connect(ConnectionRef::input(typed, 0), ConnectionRef::output(number))
            .unwrap_err();
        assert!(matches!(err, EngineError::IncompatibleConnection(_)));

        graph
            .connect(ConnectionRef::output(boolean), ConnectionRef::input(typed, 0))
            .unwrap();
        assert_eq!(graph.input_child(typed, 0), Some(boolean));
    }

    #[test]
    fn test_connect_in_use() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let b = statement(&mut graph, "b");
        let c = statement(&mut graph, "c");

        graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(b))
            .unwrap();

        let err = graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(c))
            .unwrap_err();
        assert!(matches!(err, EngineError::ConnectionInUse(_)));

        let err = graph
            .connect(ConnectionRef::next(c), ConnectionRef::previous(b))
            .unwrap_err();
        assert!(matches!(err, EngineError::ConnectionInUse(_)));

        assert_eq!(graph.next_block(a), Some(b));
        assert_eq!(graph.target_of(ConnectionRef::next(c)), None);
        assert_eq!(graph.target_of(ConnectionRef::previous(c)), None);
    }

    #[test]
    fn test_connect_same_block_rejected() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let err = graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(a))
            .unwrap_err();
        assert!(matches!(err, EngineError::IncompatibleConnection(_)));
    }

    #[test]
    fn test_connect_cycle_rejected() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let b = statement(&mut graph, "b");
        let c = statement(&mut graph, "c");

        graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(b))
            .unwrap();
        graph
            .connect(ConnectionRef::input(b, 1), ConnectionRef::previous(c))
            .unwrap();

        let err = graph
            .connect(ConnectionRef::next(c), ConnectionRef::previous(a))
            .unwrap_err();
        assert!(matches!(err, EngineError::IncompatibleConnection(_)));
        assert_eq!(graph.target_of(ConnectionRef::previous(a)), None);
    }

    #[test]
    fn test_connect_missing_endpoints() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let e = expression(&mut graph, "e", None);

        let err = graph
            .connect(ConnectionRef::next(e), ConnectionRef::previous(a))
            .unwrap_err();
        assert!(matches!(err, EngineError::ConnectionNotFound { .. }));

        let ghost = uuid::Uuid::new_v4();
        let err = graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(ghost))
            .unwrap_err();
        assert!(matches!(err, EngineError::BlockNotFound(id) if id == ghost));
    }

    #[test]
    fn test_disconnect_and_reconnect() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let b = statement(&mut graph, "b");
        let next_a = ConnectionRef::next(a);
        let prev_b = ConnectionRef::previous(b);

        graph.connect(next_a, prev_b).unwrap();
        assert_eq!(graph.disconnect(prev_b).unwrap(), Some(next_a));
        assert_eq!(graph.target_of(next_a), None);
        assert_eq!(graph.target_of(prev_b), None);

        // Second disconnect is a no-op
        assert_eq!(graph.disconnect(next_a).unwrap(), None);

        graph.connect(next_a, prev_b).unwrap();
        assert_eq!(graph.target_of(next_a), Some(prev_b));
        assert_eq!(graph.target_of(prev_b), Some(next_a));
    }

    #[test]
    fn test_tree_order() {
        let mut graph = BlockGraph::new();
        let root = statement(&mut graph, "root");
        let second = statement(&mut graph, "second");
        let root_value = expression(&mut graph, "root_value", None);
        let body = statement(&mut graph, "body");
        let body_next = statement(&mut graph, "body_next");
        let second_value = expression(&mut graph, "second_value", None);

        graph
            .connect(ConnectionRef::next(root), ConnectionRef::previous(second))
            .unwrap();
        graph
            .connect(ConnectionRef::input(root, 0), ConnectionRef::output(root_value))
            .unwrap();
        graph
            .connect(ConnectionRef::input(root, 1), ConnectionRef::previous(body))
            .unwrap();
        graph
            .connect(ConnectionRef::next(body), ConnectionRef::previous(body_next))
            .unwrap();
        graph
            .connect(ConnectionRef::input(second, 0), ConnectionRef::output(second_value))
            .unwrap();

        assert_eq!(
            graph.tree_ids(root).unwrap(),
            vec![root, second, root_value, body, body_next, second_value]
        );
        assert_eq!(graph.children_of(root), vec![second, root_value, body]);
        assert_eq!(graph.ancestors(body_next), vec![body, root]);
        assert_eq!(graph.root_of(second_value), root);
    }

    #[test]
    fn test_long_chain() {
        let mut graph = BlockGraph::new();
        let ids: Vec<BlockId> = (0..2000)
            .map(|i| statement(&mut graph, &format!("s{}", i)))
            .collect();
        for pair in ids.windows(2) {
            graph
                .connect(ConnectionRef::next(pair[0]), ConnectionRef::previous(pair[1]))
                .unwrap();
        }

        let first = ids[0];
        let last = ids[ids.len() - 1];
        assert_eq!(graph.ancestors(last).len(), ids.len() - 1);
        assert_eq!(graph.root_of(last), first);
        assert_eq!(graph.tree_ids(first).unwrap(), ids);

        let err = graph
            .connect(ConnectionRef::next(last), ConnectionRef::previous(first))
            .unwrap_err();
        assert!(matches!(err, EngineError::IncompatibleConnection(_)));
        graph.validate().unwrap();
    }

    #[test]
    fn test_field_edits_keep_input_edges() {
        let mut graph = BlockGraph::new();
        let mut first = InputBuilder::new(InputType::Value, "A");
        first.append_field(Field::text_input("label", "x"));
        let host = BlockBuilder::new("host")
            .with_input(first)
            .with_input(InputBuilder::new(InputType::Value, "B"))
            .make_block_in(&mut graph)
            .unwrap();
        let e = expression(&mut graph, "e", None);
        graph
            .connect(ConnectionRef::input(host, 0), ConnectionRef::output(e))
            .unwrap();

        graph
            .get_mut(host)
            .unwrap()
            .field_named_mut("label")
            .unwrap()
            .set_text("y")
            .unwrap();

        graph.validate().unwrap();
        assert_eq!(graph.get(host).unwrap().field_named("label").unwrap().text(), "y");
        assert_eq!(graph.input_child(host, 0), Some(e));
        assert_eq!(graph.input_child(host, 1), None);
        assert_eq!(graph.parent_of(e), Some(host));
    }

    #[test]
    fn test_unplug() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let b = statement(&mut graph, "b");
        graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(b))
            .unwrap();

        assert_eq!(graph.unplug(b).unwrap(), Some(ConnectionRef::next(a)));
        assert_eq!(graph.parent_of(b), None);
        assert_eq!(graph.unplug(a).unwrap(), None);
    }

    #[test]
    fn test_remove_requires_disconnected() {
        let mut graph = BlockGraph::new();
        let a = statement(&mut graph, "a");
        let b = statement(&mut graph, "b");
        graph
            .connect(ConnectionRef::next(a), ConnectionRef::previous(b))
            .unwrap();

        let err = graph.remove(b).unwrap_err();
        assert!(matches!(err, EngineError::ConnectionInUse(_)));
        assert!(graph.contains(b));

        graph.unplug(b).unwrap();
        let removed = graph.remove(b).unwrap();
        assert_eq!(removed.name(), "b");
        assert!(!graph.contains(b));
        assert_eq!(graph.len(), 1);
    }
}
