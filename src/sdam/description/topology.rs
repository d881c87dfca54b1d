
use serde::{Deserialize, Serialize};

use crate::{cmap::Command, operation::OperationKind, read_preference::ReadPreference};

/// The possible types for a topology.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize, derive_more::Display)]
#[non_exhaustive]
pub enum TopologyType {
    /// A single mongod server.
    Standalone,

    /// A replica set.
    ReplicaSet,

    /// A sharded topology, reached through one or more mongos routers.
    Sharded,
}

/// The role of the server that was selected to run an operation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize, derive_more::Display)]
#[non_exhaustive]
pub enum ServerRole {
    /// The primary of a replica set, or a standalone server.
    Primary,

    /// A secondary of a replica set.
    Secondary,

    /// A mongos router of a sharded cluster.
    Mongos,

    /// Any other kind of server (arbiters, hidden members, servers of unknown type).
    Other,
}

/// A point-in-time classification of the deployment, taken when an operation is dispatched.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize, derive_more::Display)]
#[display("{{ Type: {topology_type}, Selected Server: {selected_role} }}")]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct TopologySnapshot {
    /// The current type of the topology.
    pub topology_type: TopologyType,

    /// The role of the server chosen for the operation.
    pub selected_role: ServerRole,
}

impl TopologySnapshot {
    /// Constructs a new snapshot.
    pub fn new(topology_type: TopologyType, selected_role: ServerRole) -> Self {
        Self {
            topology_type,
            selected_role,
        }
    }

    /// Decides whether `$readPreference` should be embedded in `command`, and embeds it if so.
    ///
    /// Writes (including aggregations ending in `$out` or `$merge`) and commands sent to a
    /// standalone never carry a read preference. A replica set only receives one when the mode is
    /// not primary, since primary is the server's default. Commands sent to a sharded cluster
    /// always carry the read preference so that mongos can route them.
    pub(crate) fn update_command_with_read_pref(
        &self,
        command: &mut Command,
        read_pref: Option<&ReadPreference>,
        kind: OperationKind,
    ) {
        if kind == OperationKind::Write {
            command.clear_read_preference();
            return;
        }

        let read_pref = read_pref.cloned().unwrap_or_default();
        match self.topology_type {
            TopologyType::Standalone => {}
            TopologyType::ReplicaSet => {
                if read_pref != ReadPreference::Primary {
                    command.set_read_preference(read_pref)
                }
            }
            TopologyType::Sharded => command.set_read_preference(read_pref),
        }
    }
}

/// Supplies the current classification of the deployment. Implemented by whatever component
/// performs server discovery and selection.
pub trait TopologyClassifier: Send + Sync {
    /// Returns the topology type and the role of the server selected for the next operation.
    fn current_topology(&self) -> TopologySnapshot;
}

impl TopologyClassifier for TopologySnapshot {
    fn current_topology(&self) -> TopologySnapshot {
        *self
    }
}
