//! Flock inspect: derived health and addressing facts over Pod and
//! StatefulSet snapshots.
//!
//! Every function here is a pure derivation (or a single-object mutation)
//! over snapshots the caller already fetched; no I/O, no API calls. The
//! reconciler owns retries, requeues, and any stability window.

#![forbid(unsafe_code)]

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::{Container, ContainerStatus, EnvVar, Pod};
use kube::ResourceExt;
use tracing::debug;

use flock_core::{
    leader_address, FlockError, FlockResult, GROUP_INDEX_LABEL_KEY, LEADER_ADDRESS_ENV_KEY,
    SET_NAME_LABEL_KEY,
};

pub use flock_core::MemberIdentity; // Re-export the parsed identity type

/// Whether a replica group has converged to its desired state: every desired
/// replica observed and no rollout in flight.
///
/// The caller hands in a fully populated snapshot; one without
/// `spec.replicas` or a status is reported as not converged.
pub fn statefulset_ready(sts: &StatefulSet) -> bool {
    let status = match sts.status.as_ref() {
        Some(s) => s,
        None => return false,
    };
    let desired = sts.spec.as_ref().and_then(|s| s.replicas);
    desired == Some(status.replicas) && status.current_revision == status.update_revision
}

/// Whether any container (init or regular) in a live pod has restarted.
///
/// Failed pods always report false: their restart history feeds a separate
/// failure path, not this liveness signal. A pod with no status yet also
/// reports false; absence of status is not evidence of restart.
pub fn container_restarted(pod: &Pod) -> bool {
    let status = match pod.status.as_ref() {
        Some(s) => s,
        None => return false,
    };
    if status.phase.as_deref() == Some("Failed") {
        return false;
    }
    let any_restart = |statuses: Option<&Vec<ContainerStatus>>| {
        statuses
            .map(|list| list.iter().any(|s| s.restart_count > 0))
            .unwrap_or(false)
    };
    any_restart(status.init_container_statuses.as_ref())
        || any_restart(status.container_statuses.as_ref())
}

/// Upsert the leader address onto the first container of `pod` as the
/// `FLOCK_LEADER_ADDRESS` environment variable.
///
/// The address is derived from the pod's own set-name/group-index labels and
/// namespace, so it is identical for the leader and every worker in the same
/// group. Missing labels degrade to empty address segments; the one hard
/// failure is a pod template with no containers to attach the variable to.
pub fn inject_leader_address(pod: &mut Pod) -> FlockResult<()> {
    let pod_name = pod.name_any();
    let set_name = pod.labels().get(SET_NAME_LABEL_KEY).cloned().unwrap_or_default();
    let group_index = pod.labels().get(GROUP_INDEX_LABEL_KEY).cloned().unwrap_or_default();
    let namespace = pod.namespace().unwrap_or_default();
    let address = leader_address(&set_name, &group_index, &namespace);

    let first = pod
        .spec
        .as_mut()
        .and_then(|spec| spec.containers.first_mut())
        .ok_or_else(|| {
            FlockError::Configuration(format!("pod {} has no containers", pod_name))
        })?;
    upsert_env(first, LEADER_ADDRESS_ENV_KEY, &address);
    debug!(pod = %pod_name, address = %address, "leader address injected");
    Ok(())
}

/// Set `name` to `value` on the container, keeping at most one entry.
/// A fresh variable is prepended so the address lands first in the list;
/// an existing one is rewritten in place.
fn upsert_env(container: &mut Container, name: &str, value: &str) {
    let env = container.env.get_or_insert_with(Vec::new);
    match env.iter_mut().find(|e| e.name == name) {
        Some(existing) => {
            existing.value = Some(value.to_string());
            existing.value_from = None;
        }
        None => env.insert(
            0,
            EnvVar {
                name: name.to_string(),
                value: Some(value.to_string()),
                ..Default::default()
            },
        ),
    }
}
