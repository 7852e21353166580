//! Property tree arena
//!
//! A [`PropertyTree`] owns every node; nodes refer to their owning group by
//! [`NodeId`], so there are no ownership cycles and dropping the tree drops
//! every node at once.
//!
//! ## Table of Contents
//! 1. NodeId / Node
//! 2. PropertyTree construction (add, add_group, graft)
//! 3. Navigation (items, at, full_path, depth, descendants)

use crate::error::{PropertyError, Result};
use crate::property::{Leaf, Property};
use std::fmt;
use std::ops::Index;

// ============================================================================
// 1. NodeId / Node
// ============================================================================

/// Handle of a node inside one [`PropertyTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is: a group of children or a leaf property
#[derive(Debug)]
pub enum NodeKind {
    Group(Vec<NodeId>),
    Leaf(Property),
}

/// One element of the tree (group or leaf)
#[derive(Debug)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning group, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    /// Children in insertion order; empty for leaves
    pub fn items(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Group(items) => items,
            NodeKind::Leaf(_) => &[],
        }
    }

    pub fn property(&self) -> Option<&Property> {
        match &self.kind {
            NodeKind::Leaf(property) => Some(property),
            NodeKind::Group(_) => None,
        }
    }

    pub fn property_mut(&mut self) -> Option<&mut Property> {
        match &mut self.kind {
            NodeKind::Leaf(property) => Some(property),
            NodeKind::Group(_) => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Group(_) => "group",
            NodeKind::Leaf(property) => property.kind_name(),
        }
    }
}

// ============================================================================
// 2. PropertyTree construction
// ============================================================================

/// Arena-backed tree of property groups and leaves. Node 0 is the root group.
#[derive(Debug)]
pub struct PropertyTree {
    nodes: Vec<Node>,
}

impl PropertyTree {
    /// Empty tree whose root group is called `root_name`
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                name: root_name.into(),
                parent: None,
                kind: NodeKind::Group(Vec::new()),
            }],
        }
    }

    /// Tree whose root group starts with the given leaves
    pub fn with_items<I, S>(root_name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = (S, Property)>,
        S: Into<String>,
    {
        let mut tree = Self::new(root_name);
        let root = tree.root();
        for (name, property) in items {
            tree.push(root, name.into(), NodeKind::Leaf(property));
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has its root, so this is true only for a root without children
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Append a leaf to `group`
    pub fn add(
        &mut self,
        group: NodeId,
        name: impl Into<String>,
        property: impl Into<Property>,
    ) -> Result<NodeId> {
        self.check_group(group)?;
        Ok(self.push(group, name.into(), NodeKind::Leaf(property.into())))
    }

    /// Append an empty nested group to `group`
    pub fn add_group(&mut self, group: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.check_group(group)?;
        Ok(self.push(group, name.into(), NodeKind::Group(Vec::new())))
    }

    /// Move every node of `subtree` under `group`; the subtree's root becomes a
    /// child of `group`. Returns the new id of the subtree's root.
    pub fn graft(&mut self, group: NodeId, subtree: PropertyTree) -> Result<NodeId> {
        self.check_group(group)?;
        let offset = self.nodes.len();
        let remap = |id: NodeId| NodeId(id.0 + offset);

        for mut node in subtree.nodes {
            node.parent = Some(node.parent.map_or(group, remap));
            if let NodeKind::Group(items) = &mut node.kind {
                for item in items.iter_mut() {
                    *item = remap(*item);
                }
            }
            self.nodes.push(node);
        }

        let grafted = NodeId(offset);
        if let NodeKind::Group(items) = &mut self.nodes[group.0].kind {
            items.push(grafted);
        }
        Ok(grafted)
    }

    fn push(&mut self, group: NodeId, name: String, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            parent: Some(group),
            kind,
        });
        if let NodeKind::Group(items) = &mut self.nodes[group.0].kind {
            items.push(id);
        }
        id
    }

    fn check_group(&self, group: NodeId) -> Result<()> {
        match self.get(group) {
            Some(node) if node.is_group() => Ok(()),
            Some(_) => Err(PropertyError::NotAGroup(group)),
            None => Err(PropertyError::UnknownNode(group)),
        }
    }

    // ========================================================================
    // 3. Navigation
    // ========================================================================

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Children of `group` in insertion order
    pub fn items(&self, group: NodeId) -> Result<&[NodeId]> {
        self.check_group(group)?;
        Ok(self.nodes[group.0].items())
    }

    /// Child at `index` of `group`, whatever its kind
    pub fn child(&self, group: NodeId, index: usize) -> Result<NodeId> {
        let items = self.items(group)?;
        items.get(index).copied().ok_or(PropertyError::IndexOutOfRange {
            index,
            len: items.len(),
        })
    }

    /// Child at `index` narrowed to leaf type `T`
    pub fn at<T: Leaf>(&self, group: NodeId, index: usize) -> Result<&T> {
        let child = &self.nodes[self.child(group, index)?.0];
        child
            .property()
            .and_then(T::narrow)
            .ok_or(PropertyError::TypeMismatch {
                index,
                expected: T::KIND,
                actual: child.kind_name(),
            })
    }

    /// Mutable twin of [`at`](Self::at)
    pub fn at_mut<T: Leaf>(&mut self, group: NodeId, index: usize) -> Result<&mut T> {
        let id = self.child(group, index)?;
        let child = &mut self.nodes[id.0];
        let actual = child.kind_name();
        child
            .property_mut()
            .and_then(T::narrow_mut)
            .ok_or(PropertyError::TypeMismatch {
                index,
                expected: T::KIND,
                actual,
            })
    }

    /// Child at `index` narrowed to a nested group
    pub fn group_at(&self, group: NodeId, index: usize) -> Result<NodeId> {
        let id = self.child(group, index)?;
        let child = &self.nodes[id.0];
        if child.is_group() {
            Ok(id)
        } else {
            Err(PropertyError::TypeMismatch {
                index,
                expected: "group",
                actual: child.kind_name(),
            })
        }
    }

    /// Leaf at `id` narrowed to `T`, `None` for groups and other leaf kinds
    pub fn leaf<T: Leaf>(&self, id: NodeId) -> Option<&T> {
        self.get(id)?.property().and_then(T::narrow)
    }

    pub fn leaf_mut<T: Leaf>(&mut self, id: NodeId) -> Option<&mut T> {
        self.get_mut(id)?.property_mut().and_then(T::narrow_mut)
    }

    /// Ancestor names from the root down to `id`, joined by `.`
    ///
    /// # Panics
    /// If `id` was not issued by this tree.
    pub fn full_path(&self, id: NodeId) -> String {
        let mut names = vec![self[id].name.as_str()];
        let mut current = self[id].parent;
        while let Some(parent) = current {
            names.push(self[parent].name.as_str());
            current = self[parent].parent;
        }
        names.reverse();
        names.join(".")
    }

    /// Number of ancestors; the root has depth 0
    ///
    /// # Panics
    /// If `id` was not issued by this tree.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self[id].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self[parent].parent;
        }
        depth
    }

    /// Every node below `id`, depth-first in insertion order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let Some(node) = self.get(id) else {
            return result;
        };
        let mut stack: Vec<NodeId> = node.items().iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.nodes[current.0].items().iter().rev().copied());
        }

        result
    }
}

impl Index<NodeId> for PropertyTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}
