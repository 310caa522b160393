//! Pure time rules consulted by the lifecycle engine.

pub mod deadline;
