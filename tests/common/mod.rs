#![allow(dead_code)]

use std::path::PathBuf;

use proptest::prelude::*;

pub const REFERENCE: &[u8] = b"CATTAGA$";
pub const SOURCE: &[u8] = b"CATTACATTAGAGACATTAGAGA$";

/// DNA reference closed by a unique terminator.
pub fn reference_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')],
        1..max_len,
    )
    .prop_map(|mut bases| {
        bases.push(b'$');
        bases
    })
}

/// Reference plus a source built from its bases: a copy with point edits
/// followed by an arbitrary run of reference bases.
pub fn pair_strategy(max_len: usize) -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    reference_strategy(max_len).prop_flat_map(move |reference| {
        let body = reference.len() - 1;
        let edits = proptest::collection::vec((0..body, 0..body), 0..8);
        let extra = proptest::collection::vec(0..body, 0..body.max(1));
        (Just(reference), edits, extra).prop_map(|(reference, edits, extra)| {
            let mut source: Vec<u8> = reference[..reference.len() - 1].to_vec();
            source.extend(extra.iter().map(|&i| reference[i]));
            for (pos, from) in edits {
                source[pos] = reference[from];
            }
            source.push(b'$');
            (reference, source)
        })
    })
}

/// Per-test scratch file under the system temp directory.
pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("isrlz-{}-{}", std::process::id(), name))
}
