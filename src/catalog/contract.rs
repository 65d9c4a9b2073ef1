//! Key contract validation.

use std::collections::HashSet;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::SchemaMismatch;

/// How strictly candidate key sets are compared with the key contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// Exact match: same count, no missing keys, no extra keys.
    #[default]
    Strict,
    /// Superset allowed: no missing keys, extra keys are ignored.
    Lenient,
}

/// Checks a candidate against the contract keys.
///
/// `candidate_keys` are the keys the provider discovers in the source;
/// `candidate_count` is the key count of the built translation set.
/// Checks run in order: count, missing keys, extra keys (strict only).
pub fn check_key_contract(
    contract_keys: &[String],
    candidate_keys: &[String],
    candidate_count: usize,
    policy: KeyPolicy,
) -> Result<(), SchemaMismatch> {
    let expected = contract_keys.len();
    let count_mismatch = match policy {
        KeyPolicy::Strict => candidate_count != expected,
        KeyPolicy::Lenient => candidate_count < expected,
    };
    if count_mismatch {
        return Err(SchemaMismatch::CountMismatch { expected, actual: candidate_count });
    }

    let discovered: HashSet<&str> = candidate_keys.iter().map(String::as_str).collect();
    let missing: Vec<String> =
        contract_keys.iter().filter(|key| !discovered.contains(key.as_str())).cloned().collect();
    if !missing.is_empty() {
        return Err(SchemaMismatch::MissingKeys { keys: missing });
    }

    if policy == KeyPolicy::Strict {
        let contract: HashSet<&str> = contract_keys.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let extra: Vec<String> = candidate_keys
            .iter()
            .filter(|key| !contract.contains(key.as_str()) && seen.insert(key.as_str()))
            .cloned()
            .collect();
        if !extra.is_empty() {
            return Err(SchemaMismatch::ExtraKeys { keys: extra });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    #[case::strict(KeyPolicy::Strict)]
    #[case::lenient(KeyPolicy::Lenient)]
    fn identical_keys_pass(#[case] policy: KeyPolicy) {
        let contract = keys(&["A", "B", "C"]);

        let result = check_key_contract(&contract, &keys(&["C", "A", "B"]), 3, policy);

        assert_that!(result, ok(anything()));
    }

    #[rstest]
    fn strict_rejects_count_mismatch_first() {
        let result =
            check_key_contract(&keys(&["A", "B"]), &keys(&["A", "B", "C"]), 3, KeyPolicy::Strict);

        assert_eq!(result, Err(SchemaMismatch::CountMismatch { expected: 2, actual: 3 }));
    }

    #[rstest]
    #[case::strict(KeyPolicy::Strict)]
    #[case::lenient(KeyPolicy::Lenient)]
    fn fewer_keys_is_count_mismatch(#[case] policy: KeyPolicy) {
        let result = check_key_contract(&keys(&["A", "B"]), &keys(&["A"]), 1, policy);

        assert_eq!(result, Err(SchemaMismatch::CountMismatch { expected: 2, actual: 1 }));
    }

    #[rstest]
    #[case::strict(KeyPolicy::Strict)]
    #[case::lenient(KeyPolicy::Lenient)]
    fn missing_keys_are_listed(#[case] policy: KeyPolicy) {
        let result =
            check_key_contract(&keys(&["A", "B", "C"]), &keys(&["A", "X", "Y"]), 3, policy);

        assert_eq!(result, Err(SchemaMismatch::MissingKeys { keys: keys(&["B", "C"]) }));
    }

    #[rstest]
    fn strict_rejects_extra_discovered_keys() {
        // The built set matched on count, but the source exposes an extra key.
        let result =
            check_key_contract(&keys(&["A", "B"]), &keys(&["A", "B", "Z", "Z"]), 2, KeyPolicy::Strict);

        assert_eq!(result, Err(SchemaMismatch::ExtraKeys { keys: keys(&["Z"]) }));
    }

    #[rstest]
    fn lenient_ignores_extra_keys() {
        let result =
            check_key_contract(&keys(&["A", "B"]), &keys(&["A", "B", "Z"]), 3, KeyPolicy::Lenient);

        assert_that!(result, ok(anything()));
    }

    #[rstest]
    #[case("\"strict\"", KeyPolicy::Strict)]
    #[case("\"lenient\"", KeyPolicy::Lenient)]
    fn deserialize_policy(#[case] json: &str, #[case] expected: KeyPolicy) {
        let policy: KeyPolicy = serde_json::from_str(json).unwrap_or_default();

        assert_that!(policy, eq(expected));
    }
}
