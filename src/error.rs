//! Error taxonomy for model construction and validation.
//!
//! Two families of errors exist, with different reporting policies:
//!
//! - [`BuildError`]: structural errors detectable at the call that caused
//!   them (duplicate names, negative resources, bad selectivity, cycles).
//!   These are returned immediately by the builders — never accepted
//!   silently.
//! - [`Violation`]: cross-entity consistency errors (dangling edges, tuple
//!   mismatches, missing mappings, unplaced modules, invalid loops). These
//!   are only detectable once the whole graph, topology, and placement
//!   exist, so they are deferred to finalization, which aggregates *all*
//!   of them into a [`ValidationReport`] rather than stopping at the
//!   first.
//!
//! None of these are transient faults; there is no retry path. A model
//! that produces any violation fails closed and is never handed to the
//! execution engine.

use std::fmt;

use thiserror::Error;

use crate::types::{DeviceId, Latency, Selectivity, TupleType};

/// Structural errors reported immediately by the builders.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BuildError {
    /// A module, sensor, or actuator name is already taken within the
    /// application.
    #[error("duplicate name `{name}`: already declared as a {existing}")]
    DuplicateName {
        /// The contested name
        name: String,
        /// What the name is already bound to ("module", "sensor", "actuator", "device")
        existing: &'static str,
    },

    /// A capacity, bandwidth, demand, or latency value is out of range.
    #[error("invalid resource value for `{entity}`: {field} = {value}")]
    InvalidResource {
        /// The entity being configured
        entity: String,
        /// The offending field name
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A tuple-mapping selectivity outside `[0, 1]`.
    #[error("invalid selectivity {value} for ({module}, {input_type}): must be within [0, 1]")]
    InvalidSelectivity {
        /// The module owning the mapping
        module: String,
        /// The mapped input tuple type
        input_type: TupleType,
        /// The rejected selectivity
        value: Selectivity,
    },

    /// An edge or mapping references a name the builder has never seen.
    #[error("unknown endpoint `{name}` referenced by {context}")]
    UnknownEndpoint {
        /// The unresolved name
        name: String,
        /// Where the reference occurred
        context: String,
    },

    /// Re-parenting a device would close a cycle in the device tree.
    #[error("setting parent of device {child} to {parent} would create a cycle")]
    Cycle {
        /// The device being re-parented
        child: DeviceId,
        /// The proposed parent
        parent: DeviceId,
    },

    /// A device id is not present in the topology.
    #[error("unknown device id {id}")]
    UnknownDeviceId {
        /// The unresolved id
        id: DeviceId,
    },

    /// A module has no entry in the module-to-device mapping.
    #[error("module `{module}` has no device mapping")]
    UnmappedModule {
        /// The unmapped module name
        module: String,
    },

    /// A module-to-device mapping names a device the topology does not contain.
    #[error("module `{module}` is mapped to unknown device `{device}`")]
    UnknownDevice {
        /// The module whose mapping is broken
        module: String,
        /// The unresolved device name
        device: String,
    },

    /// A sensor or actuator binding carries a negative latency.
    #[error("negative latency {latency} on binding `{binding}`")]
    NegativeLatency {
        /// The binding name
        binding: String,
        /// The rejected latency
        latency: Latency,
    },
}

/// A single cross-entity consistency violation.
///
/// Produced by [`validate_model`](crate::validate::validate_model); an
/// empty violation list means the model is consistent. Validation is pure
/// and idempotent — re-running it on an unmodified model yields the same
/// list.
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    /// An edge endpoint resolves to no declared module, sensor, or actuator.
    DanglingEdge {
        /// Edge source name
        source: String,
        /// Edge destination name
        dest: String,
        /// Which endpoint failed and why
        detail: String,
    },

    /// A SENSOR edge and the sensor binding of the same name disagree on
    /// tuple type, or a sensor binding is wired to no edge at all.
    SensorTupleMismatch {
        /// The sensor name
        sensor: String,
        /// The tuple type declared on the binding
        bound_type: TupleType,
        /// The disagreeing edge type, or an explanation
        detail: String,
    },

    /// An ACTUATOR edge and the actuator binding of the same name disagree
    /// on tuple type, or an actuator binding is wired to no edge at all.
    ActuatorTupleMismatch {
        /// The actuator name
        actuator: String,
        /// The tuple type declared on the binding
        bound_type: TupleType,
        /// The disagreeing edge type, or an explanation
        detail: String,
    },

    /// A module receives a tuple type it has no mapping for; tuples of
    /// that type would be silently dropped by the execution engine.
    MissingTupleMapping {
        /// The receiving module (the blamed side)
        module: String,
        /// The unmapped incoming tuple type
        input_type: TupleType,
    },

    /// A declared module is absent from the placement.
    UnplacedModule {
        /// The unplaced module name
        module: String,
    },

    /// A module is mapped to a device name the topology does not contain.
    UnknownDevice {
        /// The module whose placement is broken
        module: String,
        /// The unresolved device name
        device: String,
    },

    /// A consecutive pair in a latency loop has no corresponding edge.
    InvalidLoop {
        /// Index of the loop in the application's loop list
        index: usize,
        /// Step source name
        from: String,
        /// Step destination name
        to: String,
    },
}

// `Display` and `Error` are implemented by hand rather than derived:
// thiserror would treat the `DanglingEdge::source` field (an edge
// endpoint name, not a cause) as the error source and fail to compile.
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DanglingEdge { source, dest, detail } => {
                write!(f, "dangling edge `{source}` -> `{dest}`: {detail}")
            }
            Violation::SensorTupleMismatch { sensor, bound_type, detail } => {
                write!(f, "sensor `{sensor}` tuple mismatch: binding carries `{bound_type}`, {detail}")
            }
            Violation::ActuatorTupleMismatch { actuator, bound_type, detail } => {
                write!(f, "actuator `{actuator}` tuple mismatch: binding carries `{bound_type}`, {detail}")
            }
            Violation::MissingTupleMapping { module, input_type } => {
                write!(f, "module `{module}` has no tuple mapping for incoming type `{input_type}`")
            }
            Violation::UnplacedModule { module } => {
                write!(f, "module `{module}` has no placement")
            }
            Violation::UnknownDevice { module, device } => {
                write!(f, "module `{module}` is placed on unknown device `{device}`")
            }
            Violation::InvalidLoop { index, from, to } => {
                write!(f, "loop {index} step `{from}` -> `{to}` has no corresponding edge")
            }
        }
    }
}

impl std::error::Error for Violation {}

/// Aggregated result of a failed finalization.
///
/// Carries every violation found in one pass so the whole model can be
/// fixed at once instead of error-by-error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Wraps a list of violations into a report.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the violations in detection order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if the report holds no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consumes the report, returning the violation list.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model validation failed with {} violation(s)", self.violations.len())?;
        for v in &self.violations {
            write!(f, "\n  - {v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}
