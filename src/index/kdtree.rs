//! A 2D KD-tree of points, optionally snapping inserted points to existing ones within a
//! tolerance.

use crate::geom::{Coordinate, Envelope};

/// A point of the tree and the data attached to it.
#[derive(Debug, Clone)]
pub struct KdNode<T> {
    coord: Coordinate,
    pub data: T,
    left: Option<usize>,
    right: Option<usize>,
    count: usize,
}

impl<T> KdNode<T> {
    pub fn coordinate(&self) -> &Coordinate {
        &self.coord
    }

    /// Returns how many insertions landed on this node.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns true if more than one insertion landed on this node.
    pub fn is_repeated(&self) -> bool {
        self.count > 1
    }
}

/// The outcome of an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    /// The position of the node holding the point.
    pub node: usize,
    /// Whether a new node was created.
    pub is_new: bool,
}

/// An unbalanced KD-tree whose levels alternate between splitting by x and by y.
///
/// Nodes are stored in insertion order and referenced by position.
#[derive(Debug, Clone)]
pub struct KdTree<T> {
    nodes: Vec<KdNode<T>>,
    root: Option<usize>,
    tolerance: f64,
}

impl<T> Default for KdTree<T> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<T> KdTree<T> {
    /// Returns an empty tree; points within the tolerance of an existing node are merged
    /// into it.
    pub fn new(tolerance: f64) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            tolerance,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &KdNode<T> {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut KdNode<T> {
        &mut self.nodes[index]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &KdNode<T>> {
        self.nodes.iter()
    }

    /// Inserts a point, or returns the existing node it snaps to.
    ///
    /// The data of a point merged into an existing node is dropped.
    pub fn insert(&mut self, p: Coordinate, data: T) -> Inserted {
        if self.tolerance > 0.0
            && let Some(node) = self.find_best_match(&p)
        {
            self.nodes[node].count += 1;
            return Inserted {
                node,
                is_new: false,
            };
        }

        self.insert_exact(p, data)
    }

    fn find_best_match(&self, p: &Coordinate) -> Option<usize> {
        let mut query = Envelope::of_point(p);
        query.expand_by(self.tolerance);

        let mut best: Option<(usize, f64)> = None;
        self.query_visit(&query, |index, node| {
            let distance = p.distance(&node.coord);
            if distance > self.tolerance {
                return;
            }
            let is_better = match best {
                None => true,
                Some((best_index, best_distance)) => {
                    distance < best_distance
                        || (distance == best_distance
                            && node.coord < self.nodes[best_index].coord)
                }
            };
            if is_better {
                best = Some((index, distance));
            }
        });

        best.map(|(index, _)| index)
    }

    fn insert_exact(&mut self, p: Coordinate, data: T) -> Inserted {
        let mut current = self.root;
        let mut parent: Option<(usize, bool)> = None;
        let mut split_x = true;

        while let Some(index) = current {
            let node = &self.nodes[index];
            if node.coord.equals_2d(&p) {
                self.nodes[index].count += 1;
                return Inserted {
                    node: index,
                    is_new: false,
                };
            }

            let is_less = if split_x {
                p.x < node.coord.x
            } else {
                p.y < node.coord.y
            };
            parent = Some((index, is_less));
            current = if is_less { node.left } else { node.right };
            split_x = !split_x;
        }

        self.nodes.push(KdNode {
            coord: p,
            data,
            left: None,
            right: None,
            count: 1,
        });
        let index = self.nodes.len() - 1;

        match parent {
            None => self.root = Some(index),
            Some((parent, true)) => self.nodes[parent].left = Some(index),
            Some((parent, false)) => self.nodes[parent].right = Some(index),
        }

        Inserted {
            node: index,
            is_new: true,
        }
    }

    /// Visits the position and node of every point inside the query envelope.
    pub fn query_visit<'a>(&'a self, query: &Envelope, mut visitor: impl FnMut(usize, &'a KdNode<T>)) {
        let Some(root) = self.root else {
            return;
        };

        let mut stack = vec![(root, true)];
        while let Some((index, split_x)) = stack.pop() {
            let node = &self.nodes[index];
            let (min, max, discriminant) = if split_x {
                (query.min_x, query.max_x, node.coord.x)
            } else {
                (query.min_y, query.max_y, node.coord.y)
            };

            if let Some(left) = node.left
                && min < discriminant
            {
                stack.push((left, !split_x));
            }
            if let Some(right) = node.right
                && discriminant <= max
            {
                stack.push((right, !split_x));
            }
            if query.covers_point(&node.coord) {
                visitor(index, node);
            }
        }
    }

    /// Returns the positions of every point inside the query envelope.
    pub fn query(&self, query: &Envelope) -> Vec<usize> {
        let mut found = Vec::new();
        self.query_visit(query, |index, _| found.push(index));
        found
    }

    /// Returns the position of the node at exactly the given point, if any.
    pub fn query_point(&self, p: &Coordinate) -> Option<usize> {
        let mut current = self.root;
        let mut split_x = true;

        while let Some(index) = current {
            let node = &self.nodes[index];
            if node.coord.equals_2d(p) {
                return Some(index);
            }

            let is_less = if split_x {
                p.x < node.coord.x
            } else {
                p.y < node.coord.y
            };
            current = if is_less { node.left } else { node.right };
            split_x = !split_x;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn exact_insertion() {
        let mut tree = KdTree::new(0.0);
        assert!(tree.insert(coord!(1, 1), 'a').is_new);
        assert!(tree.insert(coord!(2, 0), 'b').is_new);
        let repeated = tree.insert(coord!(1, 1), 'c');
        assert!(!repeated.is_new);
        assert_eq!(tree.node(repeated.node).data, 'a');
        assert!(tree.node(repeated.node).is_repeated());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn snapping_insertion() {
        let mut tree = KdTree::new(0.5);
        tree.insert(coord!(0, 0), 0);
        tree.insert(coord!(10, 10), 1);
        let snapped = tree.insert(coord!(0.3, 0.3), 2);
        assert!(!snapped.is_new);
        assert_eq!(*tree.node(snapped.node).coordinate(), coord!(0, 0));
        assert!(tree.insert(coord!(1, 1), 3).is_new);
    }

    #[test]
    fn range_query() {
        let mut tree = KdTree::new(0.0);
        for i in 0..10 {
            for j in 0..10 {
                tree.insert(coord!(i, j), (i, j));
            }
        }
        let mut found: Vec<(i32, i32)> = tree
            .query(&Envelope::new(2.5, 4., 7., 8.))
            .into_iter()
            .map(|index| tree.node(index).data)
            .collect();
        found.sort();
        assert_eq!(found, vec![(3, 7), (3, 8), (4, 7), (4, 8)]);
        assert_eq!(tree.query_point(&coord!(4, 4)).map(|i| tree.node(i).data), Some((4, 4)));
        assert_eq!(tree.query_point(&coord!(4.5, 4)), None);
    }
}
