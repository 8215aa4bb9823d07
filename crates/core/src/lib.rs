//! Flock core: the leader-worker group naming convention and shared vocabulary.
//!
//! Everything downstream (inspection, reconciliation) agrees on member names,
//! label keys, and the leader address format through this crate.

#![forbid(unsafe_code)]

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Label carrying the owning set's name on every member pod.
pub const SET_NAME_LABEL_KEY: &str = "flock.dev/name";

/// Label carrying the group index (which leader-worker group within the set).
pub const GROUP_INDEX_LABEL_KEY: &str = "flock.dev/group-index";

/// Environment variable holding the leader's address, injected into members.
pub const LEADER_ADDRESS_ENV_KEY: &str = "FLOCK_LEADER_ADDRESS";

/// Errors surfaced to the caller. Only pod mutation can fail; every other
/// operation reports absence in-band (`Option`, `false`) rather than erroring.
#[derive(Debug, thiserror::Error)]
pub enum FlockError {
    #[error("configuration: {0}")]
    Configuration(String),
}

pub type FlockResult<T> = Result<T, FlockError>;

/// Identity recovered from an ordinal-suffixed member name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberIdentity {
    /// Name of the parent object the member was generated from.
    pub parent: String,
    /// Trailing ordinal; -1 when the digit run does not fit in an i32.
    pub ordinal: i32,
}

// Matches the trailing ordinal only; the parent may itself contain hyphens
// and digits ("a-b-12" parses as parent "a-b", ordinal 12).
static MEMBER_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)-([0-9]+)$").unwrap());

/// Recover the parent name and ordinal from a generated member name.
///
/// Returns `None` for names that do not follow the `<parent>-<ordinal>`
/// convention; in a heterogeneous cluster that is a common, expected outcome,
/// not an error. Parent and ordinal are decided independently: a structural
/// match whose ordinal overflows keeps the parent and reports ordinal -1.
pub fn parse_member_name(name: &str) -> Option<MemberIdentity> {
    let caps = MEMBER_NAME_RE.captures(name)?;
    let parent = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
    let ordinal = caps
        .get(2)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(-1);
    Some(MemberIdentity { parent, ordinal })
}

/// Name of the leader pod for a group: `<set>-<group-index>`.
///
/// The leader is always the ordinal-0 member at the leader-selection level,
/// so this holds regardless of any worker's own ordinal.
pub fn leader_pod_name(set_name: &str, group_index: &str) -> String {
    format!("{}-{}", set_name, group_index)
}

/// Stable DNS address of a group's leader inside the set's headless service:
/// `<set>-<group-index>.<set>.<namespace>`.
pub fn leader_address(set_name: &str, group_index: &str, namespace: &str) -> String {
    format!(
        "{}.{}.{}",
        leader_pod_name(set_name, group_index),
        set_name,
        namespace
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_member_names() {
        assert_eq!(
            parse_member_name("set-0"),
            Some(MemberIdentity { parent: "set".into(), ordinal: 0 })
        );
        assert_eq!(
            parse_member_name("set-101"),
            Some(MemberIdentity { parent: "set".into(), ordinal: 101 })
        );
    }

    #[test]
    fn parent_keeps_interior_hyphens_and_digits() {
        assert_eq!(
            parse_member_name("a-b-12"),
            Some(MemberIdentity { parent: "a-b".into(), ordinal: 12 })
        );
        assert_eq!(
            parse_member_name("web-2-0"),
            Some(MemberIdentity { parent: "web-2".into(), ordinal: 0 })
        );
    }

    #[test]
    fn non_conforming_names_yield_none() {
        assert_eq!(parse_member_name("noordinal"), None);
        assert_eq!(parse_member_name("trailing-"), None);
        assert_eq!(parse_member_name("set-0a"), None);
        assert_eq!(parse_member_name(""), None);
    }

    #[test]
    fn empty_parent_is_structurally_valid() {
        // "-0" matches the pattern with an empty prefix capture.
        assert_eq!(
            parse_member_name("-0"),
            Some(MemberIdentity { parent: "".into(), ordinal: 0 })
        );
    }

    #[test]
    fn ordinal_overflow_keeps_parent() {
        assert_eq!(
            parse_member_name("set-99999999999999999999"),
            Some(MemberIdentity { parent: "set".into(), ordinal: -1 })
        );
    }

    #[test]
    fn leading_zeros_parse_as_base10() {
        assert_eq!(
            parse_member_name("set-007"),
            Some(MemberIdentity { parent: "set".into(), ordinal: 7 })
        );
    }

    #[test]
    fn leader_address_formats_headless_service_dns() {
        assert_eq!(leader_pod_name("g", "3"), "g-3");
        assert_eq!(leader_address("g", "3", "ns"), "g-3.g.ns");
        assert_eq!(
            leader_address("test-sample", "0", "default"),
            "test-sample-0.test-sample.default"
        );
    }
}
