//! Property-based tests for the data structures.

#[cfg(test)]
mod tests {
    use magnus_integers::Integer;
    use proptest::prelude::*;

    use crate::{Aggregate, AvlTree, BigArray, BigArrayConfig, NumberTree, OrderedTree};

    #[derive(Clone, Debug)]
    enum ArrayOp {
        Push(i64),
        Pop,
        Set(usize, i64),
    }

    fn array_op() -> impl Strategy<Value = ArrayOp> {
        prop_oneof![
            3 => (-100i64..100).prop_map(ArrayOp::Push),
            1 => Just(ArrayOp::Pop),
            2 => (0usize..64, -100i64..100).prop_map(|(i, v)| ArrayOp::Set(i, v)),
        ]
    }

    #[derive(Clone, Debug)]
    enum TreeOp {
        Insert(i64),
        Remove(i64),
    }

    fn tree_op() -> impl Strategy<Value = TreeOp> {
        prop_oneof![
            2 => (-20i64..20).prop_map(TreeOp::Insert),
            1 => (-20i64..20).prop_map(TreeOp::Remove),
        ]
    }

    fn check_tree<T: OrderedTree>(tree: &mut T, ops: &[TreeOp]) -> Result<(), TestCaseError> {
        let mut reference: Vec<i64> = Vec::new();
        for op in ops {
            match *op {
                TreeOp::Insert(v) => {
                    tree.insert(Integer::new(v));
                    reference.push(v);
                }
                TreeOp::Remove(v) => {
                    let position = reference.iter().position(|&x| x == v);
                    prop_assert_eq!(tree.remove(&Integer::new(v)), position.is_some());
                    if let Some(p) = position {
                        reference.swap_remove(p);
                    }
                }
            }
        }
        reference.sort_unstable();
        let in_order: Vec<Integer> = tree.in_order().cloned().collect();
        prop_assert!(in_order.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(in_order, reference.iter().copied().map(Integer::new).collect::<Vec<_>>());
        prop_assert_eq!(tree.len(), reference.len());
        for v in -20i64..20 {
            prop_assert_eq!(tree.contains(&Integer::new(v)), reference.contains(&v));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn big_array_matches_linear_scan(
            ops in prop::collection::vec(array_op(), 0..80),
            max in any::<bool>(),
            initial_capacity in 1usize..6,
        ) {
            let aggregate = if max { Aggregate::Max } else { Aggregate::Min };
            let config = BigArrayConfig { initial_capacity, growth_factor: 1.5, aggregate };
            let mut array = BigArray::new(config).unwrap();
            let mut reference: Vec<i64> = Vec::new();

            for op in ops {
                match op {
                    ArrayOp::Push(v) => {
                        array.push(v).unwrap();
                        reference.push(v);
                    }
                    ArrayOp::Pop => {
                        prop_assert_eq!(array.pop(), reference.pop().map(Integer::new));
                    }
                    ArrayOp::Set(i, v) => {
                        let result = array.set(i, v);
                        prop_assert_eq!(result.is_ok(), i < reference.len());
                        if i < reference.len() {
                            reference[i] = v;
                        }
                    }
                }
            }

            prop_assert_eq!(array.len(), reference.len());
            for lo in 0..reference.len() {
                for hi in lo..reference.len() {
                    let slice = &reference[lo..=hi];
                    let expected = if max { slice.iter().max() } else { slice.iter().min() };
                    let expected = expected.copied().map(Integer::new);
                    prop_assert_eq!(array.query_range(lo, hi).ok().cloned(), expected);
                }
            }
        }

        #[test]
        fn heap_drains_in_sorted_order(values in prop::collection::vec(-1000i64..1000, 0..50)) {
            let array = BigArray::from_values(values.clone(), BigArrayConfig::default()).unwrap();
            prop_assert_eq!(array.to_heap(true).into_sorted_vec(), array.to_sorted(true));
            prop_assert_eq!(array.to_heap(false).into_sorted_vec(), array.to_sorted(false));
        }

        #[test]
        fn number_tree_tracks_a_multiset(ops in prop::collection::vec(tree_op(), 0..120)) {
            check_tree(&mut NumberTree::new(), &ops)?;
        }

        #[test]
        fn avl_tree_tracks_a_multiset(ops in prop::collection::vec(tree_op(), 0..120)) {
            let mut tree = AvlTree::new();
            check_tree(&mut tree, &ops)?;
            // 1.45 log2(n + 2) bounds an AVL tree's height.
            let bound = 1.45 * ((tree.len() + 2) as f64).log2();
            prop_assert!((tree.height() as f64) <= bound);
        }
    }
}
