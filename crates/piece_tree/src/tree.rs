//! Red-black tree of pieces, addressed by char position.
//!
//! Pieces live in the leaves, in document order. Internal nodes always have
//! two children and cache the length and line-feed count of their subtree, so
//! locating the leaf under a position is a single descent. Leaves carry no
//! color and count as black; only internal nodes are recolored or rotated.
//!
//! Nodes are stored in an arena and linked by index. Child links own, parent
//! links are plain back-references used while rebalancing.

use crate::error::InvariantViolation;
use crate::store::{Piece, TextStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeColor {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Leaf(Piece),
    Internal {
        left: NodeId,
        right: NodeId,
        color: NodeColor,
    },
}

#[derive(Debug, Clone)]
struct TreeNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    length: usize,
    line_feeds: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PieceTree {
    nodes: Vec<TreeNode>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
}

impl PieceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.root.map_or(0, |root| self.node(root).length)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of `'\n'` in the whole document.
    pub fn line_feeds(&self) -> usize {
        self.root.map_or(0, |root| self.node(root).line_feeds)
    }

    /// In-order traversal of the leaves. Each call starts from the first piece.
    pub fn pieces(&self) -> Pieces<'_> {
        Pieces {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let NodeKind::Internal { left, right, .. } = self.node(id).kind {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }

    /// Inserts `piece` so that its first char lands at `position`, clamped to
    /// `[0, len]`.
    pub fn insert(&mut self, store: &TextStore, position: usize, piece: Piece) {
        if piece.is_empty() {
            return;
        }
        let Some(root) = self.root else {
            let leaf = self.alloc_leaf(piece);
            self.root = Some(leaf);
            return;
        };

        let (leaf, offset) = self.descend(root, position.min(self.len()));
        let leaf_len = self.node(leaf).length;
        if offset == 0 {
            self.attach_sibling(leaf, piece, Side::Left);
        } else if offset >= leaf_len {
            self.attach_sibling(leaf, piece, Side::Right);
        } else {
            let Some(&old) = self.piece(leaf) else {
                return;
            };
            let (head, tail) = store.split_piece(&old, offset);
            self.set_piece(leaf, head);
            let tail_leaf = self.attach_sibling(leaf, tail, Side::Right);
            self.attach_sibling(tail_leaf, piece, Side::Left);
        }
    }

    /// Removes `length` chars starting at `position`. The range is clamped to
    /// the document; an empty or out-of-bounds range is ignored.
    pub fn remove(&mut self, store: &TextStore, position: usize, length: usize) {
        let total = self.len();
        if length == 0 || position >= total {
            return;
        }
        let end = position.saturating_add(length).min(total);
        let Some((first, first_offset)) = self.locate(position) else {
            return;
        };
        let Some((last, last_offset)) = self.locate(end - 1) else {
            return;
        };

        if first == last {
            self.cut_leaf(store, first, first_offset, last_offset + 1);
            return;
        }

        let mut between = Vec::new();
        let mut cursor = self.next_leaf(first);
        while let Some(leaf) = cursor {
            if leaf == last {
                break;
            }
            between.push(leaf);
            cursor = self.next_leaf(leaf);
        }

        // Trimming the boundary leaves keeps at most one remainder each, so no
        // node is allocated while `between` is being drained.
        let first_len = self.node(first).length;
        self.cut_leaf(store, first, first_offset, first_len);
        self.cut_leaf(store, last, 0, last_offset + 1);
        for leaf in between {
            self.delete_leaf(leaf);
        }
    }

    /// The leaf holding the char at `position` and the char's offset inside it.
    pub(crate) fn locate(&self, position: usize) -> Option<(NodeId, usize)> {
        let root = self.root?;
        if position >= self.len() {
            return None;
        }
        Some(self.descend(root, position))
    }

    pub(crate) fn piece(&self, leaf: NodeId) -> Option<&Piece> {
        match &self.node(leaf).kind {
            NodeKind::Leaf(piece) => Some(piece),
            NodeKind::Internal { .. } => None,
        }
    }

    /// The leaf right after `leaf` in document order.
    pub(crate) fn next_leaf(&self, leaf: NodeId) -> Option<NodeId> {
        let mut current = leaf;
        while let Some(parent) = self.node(current).parent {
            match self.node(parent).kind {
                NodeKind::Internal { left, right, .. } if left == current => {
                    return Some(self.leftmost(right));
                }
                _ => current = parent,
            }
        }
        None
    }

    /// Checks every red-black, length and parent-link invariant.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return Ok(());
        };
        if self.node(root).parent.is_some() {
            return Err(InvariantViolation::BrokenParentLink { node: root.0 });
        }
        if self.is_red(root) {
            return Err(InvariantViolation::RedRoot);
        }
        self.validate_subtree(root).map(|_| ())
    }

    fn validate_subtree(&self, id: NodeId) -> Result<usize, InvariantViolation> {
        let node = self.node(id);
        match node.kind {
            NodeKind::Leaf(ref piece) => {
                if piece.is_empty() {
                    return Err(InvariantViolation::EmptyPiece { node: id.0 });
                }
                if node.length != piece.len() {
                    return Err(InvariantViolation::LengthMismatch {
                        node: id.0,
                        cached: node.length,
                        actual: piece.len(),
                    });
                }
                if node.line_feeds != piece.line_feeds() {
                    return Err(InvariantViolation::LineFeedMismatch {
                        node: id.0,
                        cached: node.line_feeds,
                        actual: piece.line_feeds(),
                    });
                }
                Ok(1)
            }
            NodeKind::Internal { left, right, color } => {
                for child in [left, right] {
                    if self.node(child).parent != Some(id) {
                        return Err(InvariantViolation::BrokenParentLink { node: child.0 });
                    }
                    if color == NodeColor::Red && self.is_red(child) {
                        return Err(InvariantViolation::RedRed { node: id.0 });
                    }
                }

                let left_height = self.validate_subtree(left)?;
                let right_height = self.validate_subtree(right)?;
                if left_height != right_height {
                    return Err(InvariantViolation::BlackHeightMismatch {
                        node: id.0,
                        left: left_height,
                        right: right_height,
                    });
                }

                let (l, r) = (self.node(left), self.node(right));
                if node.length != l.length + r.length {
                    return Err(InvariantViolation::LengthMismatch {
                        node: id.0,
                        cached: node.length,
                        actual: l.length + r.length,
                    });
                }
                if node.line_feeds != l.line_feeds + r.line_feeds {
                    return Err(InvariantViolation::LineFeedMismatch {
                        node: id.0,
                        cached: node.line_feeds,
                        actual: l.line_feeds + r.line_feeds,
                    });
                }
                Ok(left_height + usize::from(color == NodeColor::Black))
            }
        }
    }

    // ---------- arena ----------

    fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.free.push(id);
    }

    fn alloc_leaf(&mut self, piece: Piece) -> NodeId {
        self.alloc(TreeNode {
            kind: NodeKind::Leaf(piece),
            parent: None,
            length: piece.len(),
            line_feeds: piece.line_feeds(),
        })
    }

    fn alloc_internal(&mut self, left: NodeId, right: NodeId, color: NodeColor) -> NodeId {
        let id = self.alloc(TreeNode {
            kind: NodeKind::Internal { left, right, color },
            parent: None,
            length: 0,
            line_feeds: 0,
        });
        self.node_mut(left).parent = Some(id);
        self.node_mut(right).parent = Some(id);
        self.refresh(id);
        id
    }

    // ---------- links and colors ----------

    fn left(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).kind {
            NodeKind::Internal { left, .. } => Some(left),
            NodeKind::Leaf(_) => None,
        }
    }

    fn right(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id).kind {
            NodeKind::Internal { right, .. } => Some(right),
            NodeKind::Leaf(_) => None,
        }
    }

    fn set_left(&mut self, id: NodeId, child: NodeId) {
        if let NodeKind::Internal { left, .. } = &mut self.node_mut(id).kind {
            *left = child;
        }
        self.node_mut(child).parent = Some(id);
    }

    fn set_right(&mut self, id: NodeId, child: NodeId) {
        if let NodeKind::Internal { right, .. } = &mut self.node_mut(id).kind {
            *right = child;
        }
        self.node_mut(child).parent = Some(id);
    }

    fn sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        match self.node(parent).kind {
            NodeKind::Internal { left, right, .. } => Some(if left == id { right } else { left }),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Puts `new` where `old` hangs under `parent`, or at the root.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                if let NodeKind::Internal { left, right, .. } = &mut self.node_mut(p).kind {
                    if *left == old {
                        *left = new;
                    } else if *right == old {
                        *right = new;
                    }
                }
            }
        }
        self.node_mut(new).parent = parent;
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.left(id) {
            id = left;
        }
        id
    }

    fn color(&self, id: NodeId) -> NodeColor {
        match self.node(id).kind {
            NodeKind::Internal { color, .. } => color,
            NodeKind::Leaf(_) => NodeColor::Black,
        }
    }

    fn is_red(&self, id: NodeId) -> bool {
        self.color(id) == NodeColor::Red
    }

    // Leaves are always black.
    fn set_color(&mut self, id: NodeId, new_color: NodeColor) {
        if let NodeKind::Internal { color, .. } = &mut self.node_mut(id).kind {
            *color = new_color;
        }
    }

    // ---------- cached metadata ----------

    fn refresh(&mut self, id: NodeId) {
        let (length, line_feeds) = match self.node(id).kind {
            NodeKind::Leaf(ref piece) => (piece.len(), piece.line_feeds()),
            NodeKind::Internal { left, right, .. } => {
                let (l, r) = (self.node(left), self.node(right));
                (l.length + r.length, l.line_feeds + r.line_feeds)
            }
        };
        let node = self.node_mut(id);
        node.length = length;
        node.line_feeds = line_feeds;
    }

    fn refresh_upwards(&mut self, from: Option<NodeId>) {
        let mut current = from;
        while let Some(id) = current {
            self.refresh(id);
            current = self.node(id).parent;
        }
    }

    // ---------- structural edits ----------

    fn descend(&self, mut id: NodeId, mut position: usize) -> (NodeId, usize) {
        while let NodeKind::Internal { left, right, .. } = self.node(id).kind {
            let left_len = self.node(left).length;
            if position < left_len {
                id = left;
            } else {
                position -= left_len;
                id = right;
            }
        }
        (id, position)
    }

    fn set_piece(&mut self, leaf: NodeId, piece: Piece) {
        if let NodeKind::Leaf(slot) = &mut self.node_mut(leaf).kind {
            *slot = piece;
        }
        self.refresh_upwards(Some(leaf));
    }

    /// Hangs a new leaf next to `leaf` under a fresh red internal node that
    /// takes `leaf`'s place, then rebalances. Returns the new leaf.
    fn attach_sibling(&mut self, leaf: NodeId, piece: Piece, side: Side) -> NodeId {
        let parent = self.node(leaf).parent;
        let new_leaf = self.alloc_leaf(piece);
        let (left, right) = match side {
            Side::Left => (new_leaf, leaf),
            Side::Right => (leaf, new_leaf),
        };
        let joint = self.alloc_internal(left, right, NodeColor::Red);
        self.replace_child(parent, leaf, joint);
        self.refresh_upwards(parent);
        self.insert_fixup(joint);
        new_leaf
    }

    /// Removes the chars `from..to` (offsets inside the leaf) from `leaf`,
    /// leaving zero, one or two remainder leaves.
    fn cut_leaf(&mut self, store: &TextStore, leaf: NodeId, from: usize, to: usize) {
        let Some(&piece) = self.piece(leaf) else {
            return;
        };
        let len = piece.len();
        if from >= to {
            return;
        }
        let head = (from > 0).then(|| store.slice_piece(&piece, 0..from));
        let tail = (to < len).then(|| store.slice_piece(&piece, to..len));
        match (head, tail) {
            (Some(head), Some(tail)) => {
                self.set_piece(leaf, head);
                self.attach_sibling(leaf, tail, Side::Right);
            }
            (Some(rest), None) | (None, Some(rest)) => self.set_piece(leaf, rest),
            (None, None) => self.delete_leaf(leaf),
        }
    }

    /// Unlinks `leaf` together with its parent; the sibling moves up into the
    /// parent's slot.
    fn delete_leaf(&mut self, leaf: NodeId) {
        let Some(parent) = self.node(leaf).parent else {
            self.root = None;
            self.nodes.clear();
            self.free.clear();
            return;
        };
        let Some(sibling) = self.sibling(leaf) else {
            return;
        };
        let grandparent = self.node(parent).parent;
        let removed_color = self.color(parent);

        self.replace_child(grandparent, parent, sibling);
        self.release(leaf);
        self.release(parent);
        self.refresh_upwards(grandparent);

        if removed_color == NodeColor::Black {
            if self.is_red(sibling) {
                self.set_color(sibling, NodeColor::Black);
            } else {
                self.delete_fixup(sibling);
            }
        }
    }

    // ---------- rebalancing ----------

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.right(x) else {
            return;
        };
        let Some(y_left) = self.left(y) else {
            return;
        };
        let parent = self.node(x).parent;

        self.set_right(x, y_left);
        self.replace_child(parent, x, y);
        self.set_left(y, x);

        self.refresh(x);
        self.refresh(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.left(x) else {
            return;
        };
        let Some(y_right) = self.right(y) else {
            return;
        };
        let parent = self.node(x).parent;

        self.set_left(x, y_right);
        self.replace_child(parent, x, y);
        self.set_right(y, x);

        self.refresh(x);
        self.refresh(y);
    }

    fn insert_fixup(&mut self, mut node: NodeId) {
        while let Some(parent) = self.node(node).parent {
            if !self.is_red(parent) {
                break;
            }
            // A red node is never the root, so the grandparent exists.
            let Some(grandparent) = self.node(parent).parent else {
                break;
            };

            if self.left(grandparent) == Some(parent) {
                let uncle = self.right(grandparent).filter(|&u| self.is_red(u));
                if let Some(uncle) = uncle {
                    self.set_color(parent, NodeColor::Black);
                    self.set_color(uncle, NodeColor::Black);
                    self.set_color(grandparent, NodeColor::Red);
                    node = grandparent;
                    continue;
                }
                if self.right(parent) == Some(node) {
                    node = parent;
                    self.rotate_left(node);
                }
                let Some(parent) = self.node(node).parent else {
                    break;
                };
                let Some(grandparent) = self.node(parent).parent else {
                    break;
                };
                self.set_color(parent, NodeColor::Black);
                self.set_color(grandparent, NodeColor::Red);
                self.rotate_right(grandparent);
            } else {
                let uncle = self.left(grandparent).filter(|&u| self.is_red(u));
                if let Some(uncle) = uncle {
                    self.set_color(parent, NodeColor::Black);
                    self.set_color(uncle, NodeColor::Black);
                    self.set_color(grandparent, NodeColor::Red);
                    node = grandparent;
                    continue;
                }
                if self.left(parent) == Some(node) {
                    node = parent;
                    self.rotate_right(node);
                }
                let Some(parent) = self.node(node).parent else {
                    break;
                };
                let Some(grandparent) = self.node(parent).parent else {
                    break;
                };
                self.set_color(parent, NodeColor::Black);
                self.set_color(grandparent, NodeColor::Red);
                self.rotate_left(grandparent);
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, NodeColor::Black);
        }
    }

    /// `node` took the place of a removed black node and its paths are one
    /// black short.
    fn delete_fixup(&mut self, mut node: NodeId) {
        while Some(node) != self.root && !self.is_red(node) {
            let Some(parent) = self.node(node).parent else {
                break;
            };

            if self.left(parent) == Some(node) {
                let Some(mut sibling) = self.right(parent) else {
                    break;
                };
                if self.is_red(sibling) {
                    self.set_color(sibling, NodeColor::Black);
                    self.set_color(parent, NodeColor::Red);
                    self.rotate_left(parent);
                    let Some(next) = self.right(parent) else {
                        break;
                    };
                    sibling = next;
                }

                let near_red = self.left(sibling).is_some_and(|n| self.is_red(n));
                let far_red = self.right(sibling).is_some_and(|n| self.is_red(n));
                if !near_red && !far_red {
                    self.set_color(sibling, NodeColor::Red);
                    node = parent;
                    continue;
                }
                if !far_red {
                    if let Some(near) = self.left(sibling) {
                        self.set_color(near, NodeColor::Black);
                    }
                    self.set_color(sibling, NodeColor::Red);
                    self.rotate_right(sibling);
                    let Some(next) = self.right(parent) else {
                        break;
                    };
                    sibling = next;
                }
                self.set_color(sibling, self.color(parent));
                self.set_color(parent, NodeColor::Black);
                if let Some(far) = self.right(sibling) {
                    self.set_color(far, NodeColor::Black);
                }
                self.rotate_left(parent);
            } else {
                let Some(mut sibling) = self.left(parent) else {
                    break;
                };
                if self.is_red(sibling) {
                    self.set_color(sibling, NodeColor::Black);
                    self.set_color(parent, NodeColor::Red);
                    self.rotate_right(parent);
                    let Some(next) = self.left(parent) else {
                        break;
                    };
                    sibling = next;
                }

                let near_red = self.right(sibling).is_some_and(|n| self.is_red(n));
                let far_red = self.left(sibling).is_some_and(|n| self.is_red(n));
                if !near_red && !far_red {
                    self.set_color(sibling, NodeColor::Red);
                    node = parent;
                    continue;
                }
                if !far_red {
                    if let Some(near) = self.right(sibling) {
                        self.set_color(near, NodeColor::Black);
                    }
                    self.set_color(sibling, NodeColor::Red);
                    self.rotate_left(sibling);
                    let Some(next) = self.left(parent) else {
                        break;
                    };
                    sibling = next;
                }
                self.set_color(sibling, self.color(parent));
                self.set_color(parent, NodeColor::Black);
                if let Some(far) = self.left(sibling) {
                    self.set_color(far, NodeColor::Black);
                }
                self.rotate_right(parent);
            }

            // The black height is restored once the sibling's red child has
            // been rotated over.
            match self.root {
                Some(root) => node = root,
                None => return,
            }
        }

        self.set_color(node, NodeColor::Black);
    }
}

/// Lazy in-order walk over the pieces of a [`PieceTree`].
#[derive(Debug, Clone)]
pub struct Pieces<'a> {
    tree: &'a PieceTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a Piece;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            match &self.tree.node(id).kind {
                NodeKind::Leaf(piece) => return Some(piece),
                NodeKind::Internal { left, right, .. } => {
                    self.stack.push(*right);
                    self.stack.push(*left);
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Pieces<'_> {}
