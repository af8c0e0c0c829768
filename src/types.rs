//! Core id types for merge tree computation.

use std::fmt;

/// Dense index of a mesh vertex (index into the scalar array).
pub type VertexId = u32;

/// Index of a tree node.
pub type NodeId = u32;

/// Index of a super-arc.
pub type ArcId = u32;

/// Sentinel for "no vertex".
pub const NULL_VERTEX: VertexId = VertexId::MAX;

/// Sentinel for "no node".
pub const NULL_NODE: NodeId = NodeId::MAX;

/// Sentinel for "no arc".
pub const NULL_ARC: ArcId = ArcId::MAX;

/// Which merge tree to build.
///
/// `Join` sweeps the scalar field upward and grows sublevel sets (leaves are
/// local minima); `Split` sweeps downward and grows superlevel sets (leaves
/// are local maxima). `Contour` identifies the combined tree assembled by a
/// downstream caller from one join and one split tree; it is not buildable
/// by this crate directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeType {
    Join,
    Split,
    Contour,
}

impl fmt::Display for TreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeType::Join => write!(f, "join"),
            TreeType::Split => write!(f, "split"),
            TreeType::Contour => write!(f, "contour"),
        }
    }
}

/// What a mesh vertex corresponds to in the tree.
///
/// Packed in a single signed integer per vertex: zero for `Nil`, positive for
/// arcs, negative for nodes. Entries only move forward during a build
/// (nil to arc to node, or nil straight to node).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corresponding {
    /// Not yet attributed.
    Nil,
    /// Vertex sits on a tree node.
    Node(NodeId),
    /// Vertex belongs to the region of a super-arc.
    Arc(ArcId),
}

impl Corresponding {
    #[inline]
    pub(crate) fn encode(self) -> i64 {
        match self {
            Corresponding::Nil => 0,
            Corresponding::Arc(a) => i64::from(a) + 1,
            Corresponding::Node(n) => -(i64::from(n) + 1),
        }
    }

    #[inline]
    pub(crate) fn decode(raw: i64) -> Self {
        if raw == 0 {
            Corresponding::Nil
        } else if raw > 0 {
            Corresponding::Arc((raw - 1) as ArcId)
        } else {
            Corresponding::Node((-raw - 1) as NodeId)
        }
    }

    /// True for `Nil`.
    #[inline]
    pub fn is_nil(self) -> bool {
        matches!(self, Corresponding::Nil)
    }

    /// True when the vertex sits on a node.
    #[inline]
    pub fn is_node(self) -> bool {
        matches!(self, Corresponding::Node(_))
    }

    /// True when the vertex belongs to an arc region.
    #[inline]
    pub fn is_arc(self) -> bool {
        matches!(self, Corresponding::Arc(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corresponding_roundtrip() {
        for c in [
            Corresponding::Nil,
            Corresponding::Node(0),
            Corresponding::Node(17),
            Corresponding::Arc(0),
            Corresponding::Arc(u32::MAX - 1),
        ] {
            assert_eq!(Corresponding::decode(c.encode()), c);
        }
    }

    #[test]
    fn test_corresponding_states_disjoint() {
        let encodings = [
            Corresponding::Nil.encode(),
            Corresponding::Node(0).encode(),
            Corresponding::Arc(0).encode(),
        ];
        assert_ne!(encodings[0], encodings[1]);
        assert_ne!(encodings[0], encodings[2]);
        assert_ne!(encodings[1], encodings[2]);
    }
}
