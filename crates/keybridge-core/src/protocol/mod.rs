//! Protocol module: JSON wire messages, sequence ids, and acknowledgment
//! correlation.

pub mod correlator;
pub mod messages;
pub mod sequence;

pub use correlator::{Abandoned, AckCorrelator, CorrelationError, Resolved};
pub use messages::*;
pub use sequence::{SequenceCounter, SequenceId};
