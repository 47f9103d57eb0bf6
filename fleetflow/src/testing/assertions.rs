//! Test assertions for stage outputs and context records.

use crate::context::ContextRecord;
use crate::core::{StageOutput, StageStatus};

/// Asserts that the output indicates success.
pub fn assert_output_succeeded(output: &StageOutput) {
    assert!(
        output.is_success(),
        "Expected success, got status {:?} with error {:?}",
        output.status,
        output.error
    );
}

/// Asserts that the output indicates failure.
pub fn assert_output_failed(output: &StageOutput) {
    assert_eq!(
        output.status,
        StageStatus::Fail,
        "Expected failure, got data {:?}",
        output.data
    );
}

/// Asserts that the output contains a specific key.
pub fn assert_output_contains(output: &StageOutput, key: &str) {
    assert!(
        output.get(key).is_some(),
        "Expected output to contain key '{}'. Keys: {:?}",
        key,
        output.data.keys().collect::<Vec<_>>()
    );
}

/// Asserts that a record holds a non-null value for every key.
pub fn assert_record_has_fields<'a>(
    record: &ContextRecord,
    keys: impl IntoIterator<Item = &'a str>,
) {
    let missing: Vec<&str> = keys.into_iter().filter(|key| !record.contains(key)).collect();
    assert!(
        missing.is_empty(),
        "Record is missing {:?}. Keys: {:?}",
        missing,
        record.keys().collect::<Vec<_>>()
    );
}

/// Asserts that `record` holds every field of `expected` with the same value.
pub fn assert_record_superset(record: &ContextRecord, expected: &ContextRecord) {
    for (key, value) in expected.clone() {
        assert_eq!(
            record.get(&key),
            Some(&value),
            "Field '{}' differs",
            key
        );
    }
}
