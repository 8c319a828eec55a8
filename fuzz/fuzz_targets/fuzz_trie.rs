#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Vec<String>, String)| {
    // Fuzz tree construction and lookup with arbitrary keys, including
    // empty strings and multi-byte UTF-8. Inserted keys must remain
    // findable by exact and prefix lookup, and no input may panic.
    let (keys, probe) = input;

    let mut index = eidx::index::PrefixIndex::new();
    for (value, key) in keys.iter().enumerate() {
        index.insert(key.clone(), value);
    }

    for key in &keys {
        assert!(index.exact_lookup(key).is_some());
        assert!(
            index
                .prefix_search(key, usize::MAX)
                .iter()
                .any(|(k, _)| *k == key.as_str())
        );
    }

    let _ = index.exact_lookup(&probe);
    let _ = index.prefix_search(&probe, 100);
    let _ = index.fuzzy_search(&probe, 100);
    index.bump(&probe, 1);
});
