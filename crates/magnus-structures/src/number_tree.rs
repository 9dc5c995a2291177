//! Ordered binary trees over unbounded integers.
//!
//! [`OrderedTree`] is the contract callers program against. Two
//! implementations ship:
//!
//! - [`NumberTree`]: a plain binary search tree, not self-balancing.
//!   Adversarial (sorted) insertion degrades it to a list with O(n)
//!   operations. Every algorithm on it is iterative, so even a list-shaped
//!   tree never exhausts the native stack.
//! - [`AvlTree`]: height-balanced, O(log n) worst case.
//!
//! Equal values are inserted into the right subtree, so traversal order is
//! deterministic.

use std::cmp::Ordering;

use magnus_integers::Integer;

/// Read access to a node, shared by the traversals.
pub trait TreeNode {
    /// The stored value.
    fn value(&self) -> &Integer;
    /// The left child.
    fn left(&self) -> Option<&Self>;
    /// The right child.
    fn right(&self) -> Option<&Self>;
}

/// An ordered multiset of integers.
pub trait OrderedTree {
    /// The node type exposed to traversals.
    type Node: TreeNode;

    /// The root node.
    fn root(&self) -> Option<&Self::Node>;

    /// Inserts a value. Duplicates are kept.
    fn insert(&mut self, value: Integer);

    /// Removes one occurrence of `value`, returning whether one existed.
    fn remove(&mut self, value: &Integer) -> bool;

    /// Number of stored values, duplicates included.
    fn len(&self) -> usize;

    /// Returns true when the tree is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `value` is stored.
    fn contains(&self, value: &Integer) -> bool {
        let mut current = self.root();
        while let Some(node) = current {
            current = match value.cmp(node.value()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// The smallest value.
    fn min(&self) -> Option<&Integer> {
        let mut node = self.root()?;
        while let Some(left) = node.left() {
            node = left;
        }
        Some(node.value())
    }

    /// The largest value.
    fn max(&self) -> Option<&Integer> {
        let mut node = self.root()?;
        while let Some(right) = node.right() {
            node = right;
        }
        Some(node.value())
    }

    /// Number of nodes on the longest root-to-leaf path.
    fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Self::Node, usize)> = self.root().map(|r| (r, 1)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.left().map(|n| (n, depth + 1)));
            stack.extend(node.right().map(|n| (n, depth + 1)));
        }
        deepest
    }

    /// Values in non-decreasing order.
    fn in_order(&self) -> InOrder<'_, Self::Node> {
        InOrder {
            stack: Vec::new(),
            current: self.root(),
        }
    }

    /// Values in node, left, right order.
    fn pre_order(&self) -> PreOrder<'_, Self::Node> {
        PreOrder {
            stack: self.root().into_iter().collect(),
        }
    }

    /// Values in left, right, node order.
    fn post_order(&self) -> PostOrder<'_, Self::Node> {
        PostOrder {
            stack: self.root().map(|r| (r, false)).into_iter().collect(),
        }
    }
}

/// Lazy in-order traversal.
pub struct InOrder<'a, N> {
    stack: Vec<&'a N>,
    current: Option<&'a N>,
}

impl<'a, N: TreeNode> Iterator for InOrder<'a, N> {
    type Item = &'a Integer;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.current {
            self.stack.push(node);
            self.current = node.left();
        }
        let node = self.stack.pop()?;
        self.current = node.right();
        Some(node.value())
    }
}

/// Lazy pre-order traversal.
pub struct PreOrder<'a, N> {
    stack: Vec<&'a N>,
}

impl<'a, N: TreeNode> Iterator for PreOrder<'a, N> {
    type Item = &'a Integer;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.right());
        self.stack.extend(node.left());
        Some(node.value())
    }
}

/// Lazy post-order traversal.
pub struct PostOrder<'a, N> {
    // (node, children already scheduled)
    stack: Vec<(&'a N, bool)>,
}

impl<'a, N: TreeNode> Iterator for PostOrder<'a, N> {
    type Item = &'a Integer;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, expanded) = self.stack.pop()?;
            if expanded {
                return Some(node.value());
            }
            self.stack.push((node, true));
            self.stack.extend(node.right().map(|n| (n, false)));
            self.stack.extend(node.left().map(|n| (n, false)));
        }
    }
}

// ============================================================================
// Unbalanced tree
// ============================================================================

type Link = Option<Box<BstNode>>;

/// A node of a [`NumberTree`].
#[derive(Debug)]
pub struct BstNode {
    value: Integer,
    left: Link,
    right: Link,
}

impl TreeNode for BstNode {
    fn value(&self) -> &Integer {
        &self.value
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

/// An unbalanced binary search tree.
#[derive(Debug, Default)]
pub struct NumberTree {
    root: Link,
    len: usize,
}

impl NumberTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Walks from `link` to the link holding `value`, or to the empty link
/// where it would be inserted.
fn locate<'a>(mut link: &'a mut Link, value: &Integer) -> &'a mut Link {
    loop {
        let descend = matches!(link.as_deref(), Some(node) if node.value != *value);
        if !descend {
            return link;
        }
        if let Some(node) = link {
            link = if *value < node.value {
                &mut node.left
            } else {
                &mut node.right
            };
        }
    }
}

/// Detaches the minimum of the subtree at `link`.
fn take_min(mut link: &mut Link) -> Option<Integer> {
    loop {
        let has_left = matches!(link.as_deref(), Some(node) if node.left.is_some());
        if !has_left {
            break;
        }
        if let Some(node) = link {
            link = &mut node.left;
        }
    }
    let node = link.take()?;
    let BstNode { value, right, .. } = *node;
    *link = right;
    Some(value)
}

impl OrderedTree for NumberTree {
    type Node = BstNode;

    fn root(&self) -> Option<&BstNode> {
        self.root.as_deref()
    }

    fn insert(&mut self, value: Integer) {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = if value < node.value {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *link = Some(Box::new(BstNode {
            value,
            left: None,
            right: None,
        }));
        self.len += 1;
    }

    fn remove(&mut self, value: &Integer) -> bool {
        let link = locate(&mut self.root, value);
        let Some(node) = link.as_mut() else {
            return false;
        };
        if node.left.is_some() && node.right.is_some() {
            // Promote the in-order successor.
            if let Some(successor) = take_min(&mut node.right) {
                node.value = successor;
            }
        } else if let Some(mut detached) = link.take() {
            *link = detached.left.take().or_else(|| detached.right.take());
        }
        self.len -= 1;
        true
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl Clone for NumberTree {
    /// Copies the shape bottom-up in post-order, without recursion.
    fn clone(&self) -> Self {
        let mut built: Vec<Box<BstNode>> = Vec::new();
        let mut stack: Vec<(&BstNode, bool)> = self.root().map(|r| (r, false)).into_iter().collect();
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                // Children were finished left first, so the right one is on top.
                let right = if node.right.is_some() { built.pop() } else { None };
                let left = if node.left.is_some() { built.pop() } else { None };
                built.push(Box::new(BstNode {
                    value: node.value.clone(),
                    left,
                    right,
                }));
            } else {
                stack.push((node, true));
                stack.extend(node.right().map(|n| (n, false)));
                stack.extend(node.left().map(|n| (n, false)));
            }
        }
        Self {
            root: built.pop(),
            len: self.len,
        }
    }
}

impl Drop for NumberTree {
    fn drop(&mut self) {
        let mut stack: Vec<Box<BstNode>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl FromIterator<Integer> for NumberTree {
    fn from_iter<I: IntoIterator<Item = Integer>>(iter: I) -> Self {
        let mut tree = Self::new();
        for value in iter {
            tree.insert(value);
        }
        tree
    }
}

// ============================================================================
// AVL tree
// ============================================================================

type AvlLink = Option<Box<AvlNode>>;

/// A node of an [`AvlTree`].
#[derive(Clone, Debug)]
pub struct AvlNode {
    value: Integer,
    height: u32,
    left: AvlLink,
    right: AvlLink,
}

impl TreeNode for AvlNode {
    fn value(&self) -> &Integer {
        &self.value
    }

    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

/// A height-balanced binary search tree.
///
/// Recursion depth is bounded by the height, which stays logarithmic.
#[derive(Clone, Debug, Default)]
pub struct AvlTree {
    root: AvlLink,
    len: usize,
}

impl AvlTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn avl_height(link: &AvlLink) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn balance_factor(node: &AvlNode) -> i64 {
    i64::from(avl_height(&node.left)) - i64::from(avl_height(&node.right))
}

fn refresh(node: &mut AvlNode) {
    node.height = 1 + avl_height(&node.left).max(avl_height(&node.right));
}

fn rotate_right(mut node: Box<AvlNode>) -> Box<AvlNode> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    refresh(&mut node);
    pivot.right = Some(node);
    refresh(&mut pivot);
    pivot
}

fn rotate_left(mut node: Box<AvlNode>) -> Box<AvlNode> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    refresh(&mut node);
    pivot.left = Some(node);
    refresh(&mut pivot);
    pivot
}

fn rebalance(mut node: Box<AvlNode>) -> Box<AvlNode> {
    refresh(&mut node);
    let factor = balance_factor(&node);
    if factor > 1 {
        if node.left.as_deref().is_some_and(|l| balance_factor(l) < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if factor < -1 {
        if node.right.as_deref().is_some_and(|r| balance_factor(r) > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn avl_insert(link: AvlLink, value: Integer) -> Box<AvlNode> {
    let Some(mut node) = link else {
        return Box::new(AvlNode {
            value,
            height: 1,
            left: None,
            right: None,
        });
    };
    if value < node.value {
        node.left = Some(avl_insert(node.left.take(), value));
    } else {
        node.right = Some(avl_insert(node.right.take(), value));
    }
    rebalance(node)
}

fn avl_remove_min(mut node: Box<AvlNode>) -> (AvlLink, Integer) {
    match node.left.take() {
        None => {
            let AvlNode { value, right, .. } = *node;
            (right, value)
        }
        Some(left) => {
            let (rest, min) = avl_remove_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn avl_remove(link: AvlLink, value: &Integer) -> (AvlLink, bool) {
    let Some(mut node) = link else {
        return (None, false);
    };
    let removed = match value.cmp(&node.value) {
        Ordering::Less => {
            let (rest, removed) = avl_remove(node.left.take(), value);
            node.left = rest;
            removed
        }
        Ordering::Greater => {
            let (rest, removed) = avl_remove(node.right.take(), value);
            node.right = rest;
            removed
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, child) | (child, None) => return (child, true),
            (Some(left), Some(right)) => {
                let (rest, successor) = avl_remove_min(right);
                node.value = successor;
                node.left = Some(left);
                node.right = rest;
                true
            }
        },
    };
    (Some(rebalance(node)), removed)
}

impl OrderedTree for AvlTree {
    type Node = AvlNode;

    fn root(&self) -> Option<&AvlNode> {
        self.root.as_deref()
    }

    fn insert(&mut self, value: Integer) {
        self.root = Some(avl_insert(self.root.take(), value));
        self.len += 1;
    }

    fn remove(&mut self, value: &Integer) -> bool {
        let (root, removed) = avl_remove(self.root.take(), value);
        self.root = root;
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn len(&self) -> usize {
        self.len
    }

    fn height(&self) -> usize {
        avl_height(&self.root) as usize
    }
}

impl FromIterator<Integer> for AvlTree {
    fn from_iter<I: IntoIterator<Item = Integer>>(iter: I) -> Self {
        let mut tree = Self::new();
        for value in iter {
            tree.insert(value);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree<T: OrderedTree + FromIterator<Integer>>(values: &[i64]) -> T {
        values.iter().copied().map(Integer::new).collect()
    }

    fn collect<'a>(iter: impl Iterator<Item = &'a Integer>) -> Vec<i64> {
        iter.map(|v| v.to_i64().unwrap()).collect()
    }

    #[test]
    fn test_traversals() {
        //        5
        //      /   \
        //     3     8
        //    / \     \
        //   1   4     9
        let t: NumberTree = tree(&[5, 3, 8, 1, 4, 9]);
        assert_eq!(collect(t.in_order()), vec![1, 3, 4, 5, 8, 9]);
        assert_eq!(collect(t.pre_order()), vec![5, 3, 1, 4, 8, 9]);
        assert_eq!(collect(t.post_order()), vec![1, 4, 3, 9, 8, 5]);
        assert_eq!(t.height(), 3);
    }

    #[test]
    fn test_traversals_restart() {
        let t: NumberTree = tree(&[2, 1, 3]);
        let mut first = t.in_order();
        assert_eq!(first.next(), Some(&Integer::new(1)));
        assert_eq!(collect(t.in_order()), vec![1, 2, 3]);
        assert_eq!(collect(first), vec![2, 3]);
    }

    #[test]
    fn test_duplicates_go_right() {
        let t: NumberTree = tree(&[5, 5, 5]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.height(), 3);
        assert_eq!(collect(t.pre_order()), vec![5, 5, 5]);
        let root = t.root().unwrap();
        assert!(root.left().is_none());
    }

    #[test]
    fn test_remove_cases() {
        let mut t: NumberTree = tree(&[50, 30, 70, 20, 40, 60, 80, 65]);
        // leaf
        assert!(t.remove(&Integer::new(20)));
        // one child
        assert!(t.remove(&Integer::new(60)));
        // two children, successor promoted
        assert!(t.remove(&Integer::new(50)));
        assert_eq!(t.root().unwrap().value(), &Integer::new(65));
        assert_eq!(collect(t.in_order()), vec![30, 40, 65, 70, 80]);
        assert!(!t.remove(&Integer::new(50)));
        assert_eq!(t.len(), 5);
        assert!(t.contains(&Integer::new(40)));
        assert!(!t.contains(&Integer::new(60)));
    }

    #[test]
    fn test_remove_one_duplicate_at_a_time() {
        let mut t: NumberTree = tree(&[7, 3, 7, 9, 7]);
        assert!(t.remove(&Integer::new(7)));
        assert!(t.contains(&Integer::new(7)));
        assert!(t.remove(&Integer::new(7)));
        assert!(t.remove(&Integer::new(7)));
        assert!(!t.contains(&Integer::new(7)));
        assert_eq!(collect(t.in_order()), vec![3, 9]);
    }

    #[test]
    fn test_min_max_empty() {
        let mut t = NumberTree::new();
        assert!(t.is_empty());
        assert_eq!(t.min(), None);
        assert_eq!(t.height(), 0);
        assert!(!t.remove(&Integer::new(1)));
        t.insert(Integer::new(-4));
        t.insert(Integer::ten_pow(40));
        assert_eq!(t.min(), Some(&Integer::new(-4)));
        assert_eq!(t.max(), Some(&Integer::ten_pow(40)));
    }

    #[test]
    fn test_degenerate_tree_does_not_overflow_the_stack() {
        let n = 100_000;
        let t: NumberTree = (0..n).map(Integer::new).collect();
        assert_eq!(t.height(), usize::try_from(n).unwrap());
        assert_eq!(t.in_order().count(), 100_000);
        assert_eq!(t.post_order().next(), Some(&Integer::new(n - 1)));
        let copy = t.clone();
        assert_eq!(copy.len(), t.len());
        drop(t);
    }

    #[test]
    fn test_clone_preserves_shape() {
        let t: NumberTree = tree(&[4, 2, 6, 2, 5, 7]);
        let c = t.clone();
        assert_eq!(collect(c.pre_order()), collect(t.pre_order()));
    }

    #[test]
    fn test_avl_stays_balanced() {
        let t: AvlTree = (0..1024).map(Integer::new).collect();
        assert_eq!(t.len(), 1024);
        assert!(t.height() <= 14);
        assert_eq!(collect(t.in_order()), (0..1024).collect::<Vec<_>>());
    }

    #[test]
    fn test_avl_remove() {
        let mut t: AvlTree = tree(&[10, 20, 30, 40, 50, 25, 25]);
        assert!(t.remove(&Integer::new(30)));
        assert!(t.remove(&Integer::new(25)));
        assert!(t.contains(&Integer::new(25)));
        assert!(!t.remove(&Integer::new(99)));
        assert_eq!(collect(t.in_order()), vec![10, 20, 25, 40, 50]);
        for v in [10, 20, 25, 40, 50] {
            assert!(t.remove(&Integer::new(v)));
        }
        assert!(t.is_empty());
        assert_eq!(t.height(), 0);
    }

    #[test]
    fn test_trees_are_interchangeable() {
        fn exercise<T: OrderedTree>(t: &mut T) -> Vec<i64> {
            for v in [3, 1, 4, 1, 5, 9, 2, 6] {
                t.insert(Integer::new(v));
            }
            t.remove(&Integer::new(1));
            collect(t.in_order())
        }
        assert_eq!(exercise(&mut NumberTree::new()), exercise(&mut AvlTree::new()));
    }
}
