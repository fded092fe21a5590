//! Assembled fog model: attachment, placement, and finalization.
//!
//! [`FogModelBuilder`] collects a frozen application graph, a frozen
//! device tree, the sensor/actuator bindings, and the requested module
//! placement, then finalizes the whole into a [`FogModel`]. Finalization
//! fails closed: a `FogModel` value exists only for a model that passed
//! every consistency check, so the execution engine can treat it as
//! immutable and trusted for the duration of a run.
//!
//! # Example
//!
//! ```
//! use fogsim::application::{Application, Direction, EdgeKind};
//! use fogsim::binding::SensorBinding;
//! use fogsim::model::FogModelBuilder;
//! use fogsim::topology::{DeviceProfile, TopologyBuilder};
//!
//! let mut topo = TopologyBuilder::new();
//! let cloud = topo.add_device("cloud", DeviceProfile::new(44800.0, 40000, 100.0, 10000.0)).unwrap();
//!
//! let app = Application::builder("demo")
//!     .module("Reader", 100.0).unwrap()
//!     .sensor_edge("S", "Reader", 1000.0, 200.0, 5.0, "X", Direction::Up)
//!     .tuple_mapping("Reader", "X", "OUT", 1.0).unwrap()
//!     .build();
//!
//! let model = FogModelBuilder::new(app, topo.freeze())
//!     .attach_sensor(SensorBinding::new("S", "X", cloud, 1.0).unwrap()).unwrap()
//!     .map_module("Reader", "cloud")
//!     .finalize()
//!     .unwrap();
//!
//! assert!(model.validate().is_empty());
//! ```

use crate::application::Application;
use crate::binding::{ActuatorBinding, SensorBinding};
use crate::error::{BuildError, ValidationReport};
use crate::placement::{ModuleMapping, Placement};
use crate::topology::Topology;
use crate::validate::validate_model;

/// Collects the parts of a fog model and finalizes them.
#[derive(Debug)]
pub struct FogModelBuilder {
    application: Application,
    topology: Topology,
    mapping: ModuleMapping,
    sensors: Vec<SensorBinding>,
    actuators: Vec<ActuatorBinding>,
}

impl FogModelBuilder {
    /// Starts assembling a model from a frozen application and topology.
    pub fn new(application: Application, topology: Topology) -> Self {
        Self {
            application,
            topology,
            mapping: ModuleMapping::new(),
            sensors: Vec::new(),
            actuators: Vec::new(),
        }
    }

    /// Attaches a sensor binding.
    ///
    /// The gateway device must exist and the name must not collide with
    /// any module or other binding. The tuple-type/edge match is checked
    /// at finalization, not here, so attachment order is unconstrained.
    pub fn attach_sensor(mut self, binding: SensorBinding) -> Result<Self, BuildError> {
        self.check_binding_name(&binding.name)?;
        if self.topology.get(binding.gateway).is_none() {
            return Err(BuildError::UnknownDeviceId {
                id: binding.gateway,
            });
        }
        self.sensors.push(binding);
        Ok(self)
    }

    /// Attaches an actuator binding; same rules as
    /// [`attach_sensor`](Self::attach_sensor).
    pub fn attach_actuator(mut self, binding: ActuatorBinding) -> Result<Self, BuildError> {
        self.check_binding_name(&binding.name)?;
        if self.topology.get(binding.gateway).is_none() {
            return Err(BuildError::UnknownDeviceId {
                id: binding.gateway,
            });
        }
        self.actuators.push(binding);
        Ok(self)
    }

    /// Requests placing a module on a device, by name.
    pub fn map_module(mut self, module: impl Into<String>, device: impl Into<String>) -> Self {
        self.mapping = self.mapping.add_module_to_device(module, device);
        self
    }

    /// Replaces the whole module mapping.
    pub fn with_mapping(mut self, mapping: ModuleMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Runs the full consistency check and freezes the model.
    ///
    /// Placement is resolved leniently first so that unplaced modules
    /// surface as aggregated violations rather than aborting on the first.
    /// Returns the ready model, or a [`ValidationReport`] carrying every
    /// violation found. A partial or inconsistent model is never returned.
    pub fn finalize(self) -> Result<FogModel, ValidationReport> {
        let placement = Placement::resolve_lenient(&self.application, &self.mapping);
        let violations = validate_model(
            &self.application,
            &self.topology,
            &placement,
            &self.sensors,
            &self.actuators,
        );
        if !violations.is_empty() {
            tracing::warn!(
                app_id = %self.application.app_id(),
                count = violations.len(),
                "model rejected by validation"
            );
            return Err(ValidationReport::new(violations));
        }
        tracing::debug!(app_id = %self.application.app_id(), "model finalized");
        Ok(FogModel {
            application: self.application,
            topology: self.topology,
            placement,
            sensors: self.sensors,
            actuators: self.actuators,
        })
    }

    fn check_binding_name(&self, name: &str) -> Result<(), BuildError> {
        let existing = if self.application.module(name).is_some() {
            Some("module")
        } else if self.sensors.iter().any(|s| s.name == name) {
            Some("sensor")
        } else if self.actuators.iter().any(|a| a.name == name) {
            Some("actuator")
        } else {
            None
        };
        match existing {
            Some(existing) => Err(BuildError::DuplicateName {
                name: name.to_string(),
                existing,
            }),
            None => Ok(()),
        }
    }
}

/// A finalized, validated fog model.
///
/// The read-only handoff surface for the execution engine: application
/// graph, device tree, placement, and binding lists. No mutation API is
/// exposed once finalization succeeds.
#[derive(Clone, Debug)]
pub struct FogModel {
    application: Application,
    topology: Topology,
    placement: Placement,
    sensors: Vec<SensorBinding>,
    actuators: Vec<ActuatorBinding>,
}

impl FogModel {
    /// The application graph view.
    pub fn application(&self) -> &Application {
        &self.application
    }

    /// The device tree view.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The module-to-device placement view.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// The sensor bindings.
    pub fn sensors(&self) -> &[SensorBinding] {
        &self.sensors
    }

    /// The actuator bindings.
    pub fn actuators(&self) -> &[ActuatorBinding] {
        &self.actuators
    }

    /// Re-runs the consistency check over the frozen model.
    ///
    /// Always empty for a model produced by
    /// [`FogModelBuilder::finalize`]; exposed for report-style callers and
    /// for the idempotency guarantee.
    pub fn validate(&self) -> Vec<crate::error::Violation> {
        validate_model(
            &self.application,
            &self.topology,
            &self.placement,
            &self.sensors,
            &self.actuators,
        )
    }
}
