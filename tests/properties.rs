mod common;

use common::{pair_strategy, reference_strategy};
use isrlz::bins::binary_search_predecessor;
use isrlz::{
    access, access_range, access_range_with, decompress, factorize, BinIndex, BinarySearch,
    Predecessor, SuffixTree,
};
use proptest::prelude::*;

fn sorted_keys() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(1usize..50, 1..64).prop_map(|gaps| {
        let mut keys = vec![0];
        for gap in gaps {
            let next = keys[keys.len() - 1] + gap;
            keys.push(next);
        }
        keys
    })
}

proptest! {
    #[test]
    fn decompression_restores_source(
        (reference, source) in pair_strategy(48),
        bin_factor in 1usize..6,
    ) {
        let tree = SuffixTree::build(&reference).expect("tree builds");
        let compressed = factorize(&tree, &source, bin_factor).expect("source factorizes");
        prop_assert_eq!(compressed.source_len(), source.len());
        prop_assert_eq!(decompress(&reference, &compressed).expect("decompresses"), source);
    }

    #[test]
    fn every_position_matches_source(
        (reference, source) in pair_strategy(32),
        bin_factor in 1usize..4,
    ) {
        let tree = SuffixTree::build(&reference).expect("tree builds");
        let compressed = factorize(&tree, &source, bin_factor).expect("source factorizes");
        for (pos, &expected) in source.iter().enumerate() {
            prop_assert_eq!(access(&reference, &compressed, pos).expect("in bounds"), expected);
        }
    }

    #[test]
    fn ranges_match_source_slices(
        (reference, source) in pair_strategy(32),
        start in 0usize..64,
        len in 0usize..64,
    ) {
        let tree = SuffixTree::build(&reference).expect("tree builds");
        let compressed = factorize(&tree, &source, 1).expect("source factorizes");
        let pos = start % source.len();
        let len = len % (source.len() - pos + 1);
        let expected = &source[pos..pos + len];
        prop_assert_eq!(
            access_range(&reference, &compressed, pos, len).expect("in bounds"),
            expected
        );
        prop_assert_eq!(
            access_range_with(&compressed.boundaries_binary(), &reference, &compressed, pos, len)
                .expect("in bounds"),
            expected
        );
    }

    #[test]
    fn phrases_are_maximal_reference_matches(reference in reference_strategy(32)) {
        // Compressing the reference against itself yields a single phrase.
        let tree = SuffixTree::build(&reference).expect("tree builds");
        let compressed = factorize(&tree, &reference, 1).expect("source factorizes");
        prop_assert_eq!(compressed.phrase_count(), 1);
        prop_assert_eq!(compressed.phrase(1).mismatch, b'$');
    }

    #[test]
    fn predecessor_is_largest_key_not_above_query(keys in sorted_keys(), query in 0usize..4000) {
        let expected = keys.iter().rposition(|&k| k <= query).unwrap_or(0);
        prop_assert_eq!(binary_search_predecessor(&keys, query), expected);
    }

    #[test]
    fn bins_cover_every_key(keys in sorted_keys(), bin_factor in 1usize..8) {
        let bins = BinIndex::with_bin_factor(&keys, bin_factor).expect("bins build");
        prop_assert_eq!(bins.num_bins(), keys.len().div_ceil(bin_factor));
        prop_assert_eq!(bins.starts()[0], 0);
        for pair in bins.starts().windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        // Each key is found inside the span of the bucket it interpolates to.
        let first = keys[0];
        let last = keys[keys.len() - 1];
        for (i, &key) in keys.iter().enumerate() {
            let bin = isrlz::bins::bin_index(first, last, key, bins.num_bins());
            let (low, high) = bins.span(bin, keys.len());
            prop_assert!(low <= i && i <= high, "key {} at {} outside [{}, {}]", key, i, low, high);
        }
    }

    #[test]
    fn delta_is_one_for_uniform_spacing(gap in 1usize..100, count in 2usize..50) {
        let keys: Vec<usize> = (0..count).map(|i| i * gap).collect();
        prop_assert_eq!(BinIndex::delta(&keys), 1.0);
    }
}

proptest! {
    // Every key in range is checked against every bin count.
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn bins_agree_with_binary_search(keys in sorted_keys()) {
        let binary = BinarySearch::new(&keys);
        let last = keys[keys.len() - 1];
        for num_bins in 1..=keys.len() {
            let bins = BinIndex::build(&keys, num_bins).expect("bins build");
            let view = bins.view(&keys);
            for key in 0..=last + 1 {
                prop_assert_eq!(
                    view.predecessor(key),
                    binary.predecessor(key),
                    "key {} with {} bins",
                    key,
                    num_bins
                );
            }
        }
    }
}
