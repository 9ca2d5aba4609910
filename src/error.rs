use thiserror::Error;

use crate::simulation::{Direction, IntersectionId};

/// Domain errors raised by the road network and the vehicle agents.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid turn request at intersection {intersection}: {entry:?} -> {exit:?}")]
    InvalidTurnRequest {
        intersection: IntersectionId,
        entry: Direction,
        exit: Direction,
    },

    #[error("dead end at intersection {intersection}: no exit other than {entry:?}")]
    DeadEnd {
        intersection: IntersectionId,
        entry: Direction,
    },

    #[error("waypoint path is empty")]
    EmptyPath,

    #[error("unknown intersection {0}")]
    UnknownIntersection(IntersectionId),

    #[error("intersection {intersection} is isolated and cannot host a vehicle")]
    IsolatedIntersection { intersection: IntersectionId },

    #[error("no road enters intersection {intersection} from {entry:?}")]
    UnconnectedEntry {
        intersection: IntersectionId,
        entry: Direction,
    },

    #[error("conflicting link at intersection {intersection} towards {direction:?}")]
    LinkConflict {
        intersection: IntersectionId,
        direction: Direction,
    },

    #[error("invalid grid layout: {0}")]
    Layout(String),
}

pub type SimResult<T> = std::result::Result<T, SimError>;
