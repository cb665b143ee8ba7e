use quickcheck_macros::quickcheck;
use stack_bst::{IntOps, Parity, Tree};

use std::collections::{BTreeSet, HashSet};

use crate::Op;

fn ops() -> IntOps {
    IntOps::new(0)
}

fn tree_of(xs: &[i8]) -> Tree<i64> {
    let ops = ops();
    let mut tree = Tree::new();
    for x in xs {
        tree.insert(&i64::from(*x), &ops).unwrap();
    }
    tree
}

fn flatten(tree: &Tree<i64>) -> Vec<i64> {
    let mut out = Vec::new();
    let written = tree.flatten_inorder(&ops(), &mut out).unwrap();
    assert_eq!(written, tree.count_nodes());
    out
}

/// Applies a set of operations to a tree and a set.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same set of keys in both.
fn do_ops(ops: &[Op<i8>], mut bst: Tree<i64>, set: &mut BTreeSet<i64>) -> Tree<i64> {
    let key_ops = self::ops();
    for op in ops {
        match op {
            Op::Insert(k) => {
                bst.insert(&i64::from(*k), &key_ops).unwrap();
                set.insert(i64::from(*k));
            }
            Op::Remove(k) => {
                bst.delete(&i64::from(*k), &key_ops);
                set.remove(&i64::from(*k));
            }
        }
    }

    bst
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut set = BTreeSet::new();

    let tree = do_ops(&ops, Tree::new(), &mut set);
    flatten(&tree) == set.into_iter().collect::<Vec<_>>()
}

#[quickcheck]
fn inorder_is_strictly_ascending(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let key_ops = ops();
    let mut tree = tree_of(&xs);
    for delete in &deletes {
        tree.delete(&i64::from(*delete), &key_ops);
    }

    flatten(&tree).windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn insert_is_idempotent(xs: Vec<i8>, k: i8) -> bool {
    let key_ops = ops();
    let mut once = tree_of(&xs);
    once.insert(&i64::from(k), &key_ops).unwrap();
    let mut twice = tree_of(&xs);
    twice.insert(&i64::from(k), &key_ops).unwrap();
    let added_again = twice.insert(&i64::from(k), &key_ops).unwrap();

    !added_again && once.equal(&twice, &key_ops)
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let key_ops = ops();
    let tree = tree_of(&xs);

    xs.iter().all(|x| {
        let x = i64::from(*x);
        tree.search(&x, &key_ops).map(|n| *n.key()) == Some(x)
    })
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let key_ops = ops();
    let tree = tree_of(&xs);
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.search(&i64::from(*x), &key_ops).is_none())
}

#[quickcheck]
fn delete_then_search(xs: Vec<i8>, pick: usize) -> bool {
    if xs.is_empty() {
        return true;
    }
    let key_ops = ops();
    let mut tree = tree_of(&xs);
    let before = tree.count_nodes();
    let k = i64::from(xs[pick % xs.len()]);

    tree.delete(&k, &key_ops)
        && tree.search(&k, &key_ops).is_none()
        && tree.count_nodes() == before - 1
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let key_ops = ops();
    let mut tree = tree_of(&xs);
    for delete in &deletes {
        tree.delete(&i64::from(*delete), &key_ops);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes
        .iter()
        .all(|x| tree.search(&i64::from(*x), &key_ops).is_none())
        && still_present
            .iter()
            .all(|x| tree.search(&i64::from(*x), &key_ops).is_some())
}

#[quickcheck]
fn duplicate_round_trips(xs: Vec<i8>) -> bool {
    let key_ops = ops();
    let tree = tree_of(&xs);
    let copy = tree.duplicate(&key_ops).unwrap();

    let distinct = match (tree.root(), copy.root()) {
        (Some(a), Some(b)) => !std::ptr::eq(a, b),
        (None, None) => true,
        _ => false,
    };
    distinct && tree.equal(&copy, &key_ops) && copy.height() == tree.height()
}

#[quickcheck]
fn build_balanced_round_trips(xs: Vec<i16>) -> bool {
    let key_ops = ops();
    let values: Vec<i64> = xs
        .into_iter()
        .map(i64::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let tree = Tree::build_balanced(&values, &key_ops).unwrap();

    let n = values.len();
    let expected_height = (usize::BITS - n.leading_zeros()) as usize;
    tree.height() == expected_height && flatten(&tree) == values
}

#[quickcheck]
fn delete_range_matches_filter(xs: Vec<i8>, a: i8, b: i8, even: bool) -> bool {
    let key_ops = ops();
    let mut tree = tree_of(&xs);
    let (low, high) = (i64::from(a.min(b)), i64::from(a.max(b)));
    let parity = if even { Parity::Even } else { Parity::Odd };

    let expected: Vec<i64> = flatten(&tree)
        .into_iter()
        .filter(|k| !(low <= *k && *k <= high && (k % 2 == 0) == even))
        .collect();
    let removed = tree.delete_range(&low, &high, parity, &key_ops).unwrap();

    let kept = flatten(&tree);
    removed + kept.len() == tree_of(&xs).count_nodes() && kept == expected
}
