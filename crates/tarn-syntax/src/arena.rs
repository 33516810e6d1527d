//! Arena storage for syntax nodes.

use crate::node::{Node, NodeIndex};
use tarn_common::{FileId, SourceElement, SyntaxNodeHandle};

/// Arena-based storage for one file's syntax tree. Nodes are stored
/// contiguously and referenced by index; indices are only meaningful within
/// the arena that produced them.
#[derive(Debug, Default)]
pub struct NodeArena {
    pub file: FileId,
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new(file: FileId) -> NodeArena {
        NodeArena {
            file,
            nodes: Vec::new(),
        }
    }

    pub fn add(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeIndex(index)
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stable handle for cross-arena references (source elements).
    pub fn handle(&self, index: NodeIndex) -> SyntaxNodeHandle {
        SyntaxNodeHandle {
            file: self.file,
            index: index.0,
        }
    }

    /// Real source element anchored at `index`.
    pub fn source(&self, index: NodeIndex) -> SourceElement {
        let node = self.get(index).expect("source() of a node outside this arena");
        SourceElement::real(self.handle(index), node.range)
    }
}
