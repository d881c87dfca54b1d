mod description;

pub use self::description::topology::{
    ServerRole,
    TopologyClassifier,
    TopologySnapshot,
    TopologyType,
};
