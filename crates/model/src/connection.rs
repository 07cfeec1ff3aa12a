//! Typed connection endpoints between blocks
//!
//! Every block exposes up to three connections of its own (previous, next,
//! output) plus one per value/statement input. Two connections may be joined
//! when their kinds complement each other and their type checks overlap.
//! Joining and separating is done through `BlockGraph`, which can reach both
//! endpoints at once; this module only holds the endpoint state and the pure
//! compatibility rules.

use blockly_core::{BlockId, EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// ConnectionKind
// ============================================================================

/// Kind of a connection endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    /// Top of a statement block
    Previous,
    /// Bottom of a statement block, or a statement input
    Next,
    /// Value input slot
    Input,
    /// Left edge of an expression block
    Output,
}

impl ConnectionKind {
    /// Get the only kind this one can join
    pub fn opposite(&self) -> Self {
        match self {
            ConnectionKind::Previous => ConnectionKind::Next,
            ConnectionKind::Next => ConnectionKind::Previous,
            ConnectionKind::Input => ConnectionKind::Output,
            ConnectionKind::Output => ConnectionKind::Input,
        }
    }

    /// Check if this kind hosts a child block (next and input slots)
    pub fn is_parent_side(&self) -> bool {
        matches!(self, ConnectionKind::Next | ConnectionKind::Input)
    }

    /// Check if two kinds complement each other
    pub fn complements(&self, other: ConnectionKind) -> bool {
        self.opposite() == other
    }
}

impl std::fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionKind::Previous => write!(f, "previous"),
            ConnectionKind::Next => write!(f, "next"),
            ConnectionKind::Input => write!(f, "input"),
            ConnectionKind::Output => write!(f, "output"),
        }
    }
}

// ============================================================================
// ConnectionSlot / ConnectionRef
// ============================================================================

/// Where a connection sits on its block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionSlot {
    Previous,
    Next,
    Output,
    /// Connection of the input at this index
    Input(usize),
}

impl std::fmt::Display for ConnectionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionSlot::Previous => write!(f, "previous"),
            ConnectionSlot::Next => write!(f, "next"),
            ConnectionSlot::Output => write!(f, "output"),
            ConnectionSlot::Input(index) => write!(f, "input[{}]", index),
        }
    }
}

/// Address of a connection inside a `BlockGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionRef {
    pub block: BlockId,
    pub slot: ConnectionSlot,
}

impl ConnectionRef {
    /// Create a new connection reference
    pub fn new(block: BlockId, slot: ConnectionSlot) -> Self {
        Self { block, slot }
    }

    /// Previous connection of `block`
    pub fn previous(block: BlockId) -> Self {
        Self::new(block, ConnectionSlot::Previous)
    }

    /// Next connection of `block`
    pub fn next(block: BlockId) -> Self {
        Self::new(block, ConnectionSlot::Next)
    }

    /// Output connection of `block`
    pub fn output(block: BlockId) -> Self {
        Self::new(block, ConnectionSlot::Output)
    }

    /// Connection of the input at `index` on `block`
    pub fn input(block: BlockId, index: usize) -> Self {
        Self::new(block, ConnectionSlot::Input(index))
    }
}

impl std::fmt::Display for ConnectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.block, self.slot)
    }
}

// ============================================================================
// Connection
// ============================================================================

/// A connection endpoint owned by a block
///
/// Not `Clone`: a cloned endpoint would carry a live target. Copies of a
/// block are made through `BlockBuilder::from_block`, which rebuilds the
/// connections empty.
#[derive(Debug, PartialEq, Serialize)]
pub struct Connection {
    kind: ConnectionKind,
    source_block: BlockId,
    type_checks: Option<Vec<String>>,
    target: Option<ConnectionRef>,
}

impl Connection {
    /// Create a disconnected endpoint on `source_block`
    pub(crate) fn new(
        kind: ConnectionKind,
        source_block: BlockId,
        type_checks: Option<Vec<String>>,
    ) -> Self {
        Self {
            kind,
            source_block,
            type_checks,
            target: None,
        }
    }

    /// Get the connection kind
    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }

    /// Get the block that owns this connection
    pub fn source_block(&self) -> BlockId {
        self.source_block
    }

    /// Get the type checks; `None` means unrestricted
    pub fn type_checks(&self) -> Option<&[String]> {
        self.type_checks.as_deref()
    }

    /// Get the connection this one is joined to
    pub fn target(&self) -> Option<ConnectionRef> {
        self.target
    }

    /// Check whether this connection is joined
    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }

    /// Check whether any type is accepted
    pub fn accepts_any(&self) -> bool {
        self.type_checks.as_ref().is_none_or(|checks| checks.is_empty())
    }

    pub(crate) fn set_target(&mut self, target: ConnectionRef) {
        self.target = Some(target);
    }

    pub(crate) fn clear_target(&mut self) {
        self.target = None;
    }

    // ========================================================================
    // Compatibility
    // ========================================================================

    /// Check whether two type-check sets overlap
    ///
    /// A missing or empty set accepts anything.
    pub fn type_checks_intersect(a: Option<&[String]>, b: Option<&[String]>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
                a.iter().any(|check| b.contains(check))
            }
            _ => true,
        }
    }

    /// Decide whether two endpoints may join, from their kinds and checks alone
    pub fn can_connect(
        kind_a: ConnectionKind,
        kind_b: ConnectionKind,
        checks_a: Option<&[String]>,
        checks_b: Option<&[String]>,
    ) -> bool {
        kind_a.complements(kind_b) && Self::type_checks_intersect(checks_a, checks_b)
    }

    /// Same rules as `can_connect`, with a reason on failure
    pub fn check_compatible(&self, other: &Connection) -> EngineResult<()> {
        if !self.kind.complements(other.kind) {
            return Err(EngineError::incompatible(format!(
                "{} connection cannot join a {} connection",
                self.kind, other.kind
            )));
        }
        if !Self::type_checks_intersect(self.type_checks(), other.type_checks()) {
            return Err(EngineError::incompatible(format!(
                "type checks {:?} and {:?} share no tag",
                self.type_checks().unwrap_or_default(),
                other.type_checks().unwrap_or_default()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
