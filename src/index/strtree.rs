//! A static, bulk loaded R-tree built with the Sort-Tile-Recursive algorithm.

use std::{cmp::Ordering, sync::OnceLock};

use crate::{
    error::{GeometryError, Result},
    geom::Envelope,
};

/// The default maximum number of children per node.
pub const DEFAULT_NODE_CAPACITY: usize = 10;

/// A reference to the child of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    /// The position of an item.
    Leaf(usize),
    /// The position of an internal node.
    Node(usize),
}

#[derive(Debug, Clone)]
struct Node {
    envelope: Envelope,
    children: Vec<Child>,
}

/// The immutable node hierarchy.
#[derive(Debug, Clone, Default)]
struct Tree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

/// A query-only spatial index over items with an envelope.
///
/// Items are inserted first; the tree is built on the first query (or an explicit call
/// to [`StrTree::build`]) and is immutable afterwards, except for [`StrTree::remove`].
/// Once built, queries only need a shared reference and may run concurrently.
#[derive(Debug, Clone)]
pub struct StrTree<T> {
    capacity: usize,
    envelopes: Vec<Envelope>,
    items: Vec<Option<T>>,
    tree: OnceLock<Tree>,
}

impl<T> Default for StrTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects unbuilt items, skipping null envelopes as [`StrTree::insert`] does.
impl<T> FromIterator<(Envelope, T)> for StrTree<T> {
    fn from_iter<I: IntoIterator<Item = (Envelope, T)>>(iter: I) -> Self {
        let mut tree = Self::new();
        for (envelope, item) in iter.into_iter().filter(|(envelope, _)| !envelope.is_null()) {
            tree.envelopes.push(envelope);
            tree.items.push(Some(item));
        }
        tree
    }
}

impl<T> StrTree<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_NODE_CAPACITY)
    }

    /// Returns an empty tree whose nodes hold at most `capacity` children.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            envelopes: Vec::new(),
            items: Vec::new(),
            tree: OnceLock::new(),
        }
    }

    /// Returns true once the node hierarchy has been built.
    pub fn is_built(&self) -> bool {
        self.tree.get().is_some()
    }

    /// Adds an item. Fails once the tree has been built.
    pub fn insert(&mut self, envelope: Envelope, item: T) -> Result<()> {
        if self.is_built() {
            return Err(GeometryError::illegal(
                "cannot insert items into an STR packed R-tree after it has been built",
            ));
        }
        if envelope.is_null() {
            return Ok(());
        }

        self.envelopes.push(envelope);
        self.items.push(Some(item));
        Ok(())
    }

    /// Returns the number of items still in the tree.
    pub fn len(&self) -> usize {
        self.items.iter().filter(|item| item.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the node hierarchy, if not built yet.
    pub fn build(&self) {
        self.tree();
    }

    fn tree(&self) -> &Tree {
        self.tree.get_or_init(|| {
            let leaves = (0..self.envelopes.len())
                .map(|index| (Child::Leaf(index), self.envelopes[index]))
                .collect();
            let mut tree = Tree::default();
            tree.root = Self::create_higher_levels(&mut tree, leaves, self.capacity);
            tree
        })
    }

    fn create_higher_levels(
        tree: &mut Tree,
        children: Vec<(Child, Envelope)>,
        capacity: usize,
    ) -> Option<usize> {
        if children.is_empty() {
            return None;
        }

        let parents = Self::create_parents(tree, children, capacity);
        if parents.len() == 1 {
            return match parents[0].0 {
                Child::Node(index) => Some(index),
                Child::Leaf(_) => None,
            };
        }

        Self::create_higher_levels(tree, parents, capacity)
    }

    fn create_parents(
        tree: &mut Tree,
        mut children: Vec<(Child, Envelope)>,
        capacity: usize,
    ) -> Vec<(Child, Envelope)> {
        let min_leaf_count = children.len().div_ceil(capacity);
        let slice_count = (min_leaf_count as f64).sqrt().ceil() as usize;
        let slice_capacity = children.len().div_ceil(slice_count.max(1));

        children.sort_by(|a, b| compare_centre(&a.1, &b.1, |e| e.min_x + e.max_x));

        let mut parents = Vec::with_capacity(min_leaf_count);
        for slice in children.chunks(slice_capacity) {
            let mut slice = slice.to_vec();
            slice.sort_by(|a, b| compare_centre(&a.1, &b.1, |e| e.min_y + e.max_y));

            for group in slice.chunks(capacity) {
                let envelope = group
                    .iter()
                    .fold(Envelope::null(), |env, (_, child)| env.union(child));
                tree.nodes.push(Node {
                    envelope,
                    children: group.iter().map(|(child, _)| *child).collect(),
                });
                parents.push((Child::Node(tree.nodes.len() - 1), envelope));
            }
        }

        parents
    }

    /// Visits every item whose envelope intersects the query envelope.
    ///
    /// False positives are possible if the caller's geometry is smaller than its envelope;
    /// the caller must re-check exactly.
    pub fn query_visit<'a>(&'a self, query: &Envelope, mut visitor: impl FnMut(&'a T)) {
        self.query_until(query, |item| {
            visitor(item);
            true
        });
    }

    /// Visits intersecting items until the visitor returns false.
    pub fn query_until<'a>(&'a self, query: &Envelope, mut visitor: impl FnMut(&'a T) -> bool) {
        let tree = self.tree();
        let Some(root) = tree.root else {
            return;
        };

        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = &tree.nodes[index];
            if !node.envelope.intersects(query) {
                continue;
            }

            for child in &node.children {
                match *child {
                    Child::Node(index) => stack.push(index),
                    Child::Leaf(index) => {
                        if let Some(item) = &self.items[index]
                            && self.envelopes[index].intersects(query)
                            && !visitor(item)
                        {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Returns every item whose envelope intersects the query envelope.
    pub fn query(&self, query: &Envelope) -> Vec<&T> {
        let mut found = Vec::new();
        self.query_visit(query, |item| found.push(item));
        found
    }

    /// Returns every item along with its envelope.
    pub fn items(&self) -> impl Iterator<Item = (&Envelope, &T)> {
        self.envelopes
            .iter()
            .zip(self.items.iter())
            .filter_map(|(env, item)| item.as_ref().map(|item| (env, item)))
    }

    /// Returns the envelope of every item in the tree.
    pub fn envelope(&self) -> Envelope {
        self.items()
            .fold(Envelope::null(), |env, (item_env, _)| env.union(item_env))
    }

    /// Returns the number of levels in the tree, 0 if empty.
    pub fn depth(&self) -> usize {
        fn depth_of(tree: &Tree, index: usize) -> usize {
            1 + tree.nodes[index]
                .children
                .iter()
                .filter_map(|child| match child {
                    Child::Node(index) => Some(depth_of(tree, *index)),
                    Child::Leaf(_) => None,
                })
                .max()
                .unwrap_or(0)
        }

        let tree = self.tree();
        tree.root.map(|root| depth_of(tree, root)).unwrap_or(0)
    }
}

impl<T> StrTree<T>
where
    T: PartialEq,
{
    /// Removes one item equal to the given one under the given envelope, pruning nodes left
    /// without children. Returns true if an item was removed.
    pub fn remove(&mut self, envelope: &Envelope, item: &T) -> bool {
        self.build();
        let Some(tree) = self.tree.get_mut() else {
            return false;
        };
        let Some(root) = tree.root else {
            return false;
        };

        let found = Self::remove_from(tree, root, envelope, item, &self.envelopes, &mut self.items);
        if found && tree.nodes[root].children.is_empty() {
            tree.root = None;
        }
        found
    }

    fn remove_from(
        tree: &mut Tree,
        index: usize,
        envelope: &Envelope,
        item: &T,
        envelopes: &[Envelope],
        items: &mut [Option<T>],
    ) -> bool {
        if !tree.nodes[index].envelope.intersects(envelope) {
            return false;
        }

        let children = tree.nodes[index].children.clone();
        for (position, child) in children.into_iter().enumerate() {
            match child {
                Child::Leaf(leaf) => {
                    if items[leaf].as_ref() == Some(item) {
                        items[leaf] = None;
                        tree.nodes[index].children.remove(position);
                        return true;
                    }
                }
                Child::Node(node) => {
                    if Self::remove_from(tree, node, envelope, item, envelopes, items) {
                        if tree.nodes[node].children.is_empty() {
                            tree.nodes[index].children.remove(position);
                        }
                        return true;
                    }
                }
            }
        }

        false
    }
}

fn compare_centre(a: &Envelope, b: &Envelope, centre: impl Fn(&Envelope) -> f64) -> Ordering {
    centre(a).total_cmp(&centre(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: usize) -> StrTree<usize> {
        let mut tree = StrTree::with_capacity(4);
        for i in 0..size {
            for j in 0..size {
                let (x, y) = (i as f64, j as f64);
                tree.insert(Envelope::new(x, x + 0.5, y, y + 0.5), i * size + j)
                    .unwrap();
            }
        }
        tree
    }

    #[test]
    fn query_finds_intersecting_items() {
        let tree = grid(10);
        let mut found: Vec<usize> = tree
            .query(&Envelope::new(2.2, 3.2, 5.2, 5.4))
            .into_iter()
            .copied()
            .collect();
        found.sort();
        assert_eq!(found, vec![25, 35]);
    }

    #[test]
    fn collect_from_items() {
        let tree: StrTree<usize> = vec![
            (Envelope::new(0., 1., 0., 1.), 0),
            (Envelope::null(), 1),
            (Envelope::new(5., 6., 5., 6.), 2),
        ]
        .into_iter()
        .collect();

        assert!(!tree.is_built());
        assert_eq!(tree.len(), 2);
        let found: Vec<usize> = tree
            .query(&Envelope::new(0.5, 5.5, 0.5, 5.5))
            .into_iter()
            .copied()
            .collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&0) && found.contains(&2));
    }

    #[test]
    fn empty_tree() {
        let tree = StrTree::<usize>::new();
        assert!(tree.query(&Envelope::new(0., 1., 0., 1.)).is_empty());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn insert_after_build_fails() {
        let mut tree = grid(3);
        tree.build();
        assert!(tree.insert(Envelope::new(0., 1., 0., 1.), 100).is_err());
    }

    #[test]
    fn remove_item() {
        let mut tree = grid(5);
        let env = Envelope::new(1., 1.5, 1., 1.5);
        assert_eq!(tree.query(&env), vec![&6]);
        assert!(tree.remove(&env, &6));
        assert!(tree.query(&env).is_empty());
        assert!(!tree.remove(&env, &6));
        assert_eq!(tree.len(), 24);
    }

    #[test]
    fn tree_is_balanced() {
        let tree = grid(10);
        // 100 items with capacity 4: 25 leaves' parents, 7, 2 and the root.
        assert!(tree.depth() <= 5, "depth = {}", tree.depth());
    }
}
