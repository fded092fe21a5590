//! Core type definitions for the fog model.
//!
//! This module defines the fundamental types used throughout the crate.

/// Unique identifier for a device (topology node).
///
/// Ids are handed out by [`TopologyBuilder`](crate::topology::TopologyBuilder)
/// from a monotonic counter and are collision-free within one topology.
pub type DeviceId = u64;

/// Compute demand or capacity, in millions of instructions per second.
pub type Mips = f64;

/// Network or sensor latency, in simulated milliseconds.
pub type Latency = f64;

/// Fraction of input tuples a module forwards as a given output type.
///
/// Valid values lie in `[0.0, 1.0]`.
pub type Selectivity = f64;

/// Application identifier type.
pub type AppId = String;

/// Tuple type identifier.
///
/// Names a class of message flowing along application edges
/// (e.g. `"PPG_STREAM"`, `"PREDICTION_TASK"`).
pub type TupleType = String;
