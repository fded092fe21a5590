//! Module-to-device placement.
//!
//! Placement is purely data: a name-keyed table from module names to the
//! devices hosting them. It references the application and topology but
//! owns neither, so it can be rebuilt independently of both. Resource
//! allocation against the placement is the execution engine's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::Application;
use crate::error::BuildError;
use crate::topology::Topology;

/// Requested module-to-device assignments, by name.
///
/// The table supports one-to-many assignment per module name; typical
/// deployments use one-to-one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleMapping {
    assignments: BTreeMap<String, Vec<String>>,
}

impl ModuleMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a module to a device, appending to any prior assignment.
    pub fn add_module_to_device(
        mut self,
        module: impl Into<String>,
        device: impl Into<String>,
    ) -> Self {
        self.assignments
            .entry(module.into())
            .or_default()
            .push(device.into());
        self
    }

    /// Returns the devices requested for a module.
    pub fn devices_for(&self, module: &str) -> Option<&[String]> {
        self.assignments.get(module).map(Vec::as_slice)
    }

    /// Returns the assignments, ordered by module name.
    pub fn assignments(&self) -> &BTreeMap<String, Vec<String>> {
        &self.assignments
    }

    /// Returns the number of assigned module names.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns true if no module has been assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// A resolved, total placement of application modules onto devices.
///
/// Produced by [`Placement::resolve`]; guaranteed total over the
/// application's module set at resolution time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    table: BTreeMap<String, Vec<String>>,
}

impl Placement {
    /// Resolves a mapping against an application and topology.
    ///
    /// Fails fast with [`BuildError::UnmappedModule`] for the first module
    /// missing from the mapping, or [`BuildError::UnknownDevice`] for the
    /// first assignment naming a device the topology does not contain.
    /// On success the placement is defined for every module.
    pub fn resolve(
        application: &Application,
        topology: &Topology,
        mapping: &ModuleMapping,
    ) -> Result<Self, BuildError> {
        let mut table = BTreeMap::new();
        for module in application.modules() {
            let devices = mapping
                .devices_for(&module.name)
                .ok_or_else(|| BuildError::UnmappedModule {
                    module: module.name.clone(),
                })?;
            for device in devices {
                if !topology.contains_name(device) {
                    return Err(BuildError::UnknownDevice {
                        module: module.name.clone(),
                        device: device.clone(),
                    });
                }
            }
            table.insert(module.name.clone(), devices.to_vec());
        }
        Ok(Self { table })
    }

    /// Resolves leniently: modules without a usable assignment are skipped
    /// so that validation can report them as violations instead of
    /// aborting on the first.
    ///
    /// Assignments naming unknown devices are kept in the table — the
    /// validator turns them into `UnknownDevice` violations.
    pub fn resolve_lenient(application: &Application, mapping: &ModuleMapping) -> Self {
        let mut table = BTreeMap::new();
        for module in application.modules() {
            match mapping.devices_for(&module.name) {
                Some(devices) => {
                    table.insert(module.name.clone(), devices.to_vec());
                }
                None => {
                    tracing::debug!(module = %module.name, "module left unplaced");
                }
            }
        }
        Self { table }
    }

    /// Returns the devices hosting a module.
    pub fn devices_for(&self, module: &str) -> Option<&[String]> {
        self.table.get(module).map(Vec::as_slice)
    }

    /// Returns true if the module appears in the placement.
    pub fn contains(&self, module: &str) -> bool {
        self.table.contains_key(module)
    }

    /// Returns the placement table, ordered by module name.
    pub fn table(&self) -> &BTreeMap<String, Vec<String>> {
        &self.table
    }

    /// Returns the number of placed modules.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no module is placed.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
