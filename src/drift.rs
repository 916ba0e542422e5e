//! # Drift
//!
//! Finds local variables the secret store does not manage.

use crate::reconciler::{ExistingAssignments, SecretMap};

/// Keys present in the existing file but absent from the store, in file order
pub fn unmanaged_keys(existing: &ExistingAssignments, secrets: &SecretMap) -> Vec<String> {
    existing
        .keys()
        .filter(|key| !secrets.contains_key(*key))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_env_content;

    fn store(keys: &[&str]) -> SecretMap {
        keys.iter().map(|k| ((*k).to_string(), "v".to_string())).collect()
    }

    #[test]
    fn test_unmanaged_keys_reported() {
        let existing = ExistingAssignments::from_lines(&parse_env_content("A=1\nB=2\nC=3\n"));
        assert_eq!(unmanaged_keys(&existing, &store(&["B", "C", "D"])), vec!["A"]);
    }

    #[test]
    fn test_unmanaged_keys_keep_file_order() {
        let existing =
            ExistingAssignments::from_lines(&parse_env_content("Z=1\n# note\nM=2\nA=3\n"));
        assert_eq!(unmanaged_keys(&existing, &SecretMap::new()), vec!["Z", "M", "A"]);
    }

    #[test]
    fn test_no_drift_when_store_covers_everything() {
        let existing = ExistingAssignments::from_lines(&parse_env_content("A=1\n"));
        assert!(unmanaged_keys(&existing, &store(&["A"])).is_empty());
    }
}
