//! Model persistence: a flat, schema-versioned document.
//!
//! The in-memory model can be exported to (and rebuilt from) a structured
//! document with top-level keys `modules`, `edges`, `tuple_mappings`,
//! `loops`, `topology`, `placement`, `sensors`, and `actuators`, suitable
//! for replay or cross-process handoff. YAML and JSON are supported, with
//! format auto-detection by file extension.
//!
//! # Document structure
//!
//! ```yaml
//! schema_version: 1
//! app_id: smart_health
//!
//! modules:
//!   - name: SensorReader
//!     mips: 100.0
//!
//! edges:
//!   - source: PPG_Sensor
//!     dest: SensorReader
//!     tuple_type: PPG_STREAM
//!     cpu_length: 1000.0
//!     network_length: 200.0
//!     direction: up
//!     kind: sensor
//!     periodicity: 5.0
//!
//! topology:
//!   - name: cloud
//!     mips: 44800.0
//!     ram: 40000
//!     uplink_bw: 100.0
//!     downlink_bw: 10000.0
//!   - name: edge
//!     mips: 2800.0
//!     ram: 4000
//!     uplink_bw: 100.0
//!     downlink_bw: 10000.0
//!     level: 1
//!     parent: cloud
//!     uplink_latency: 100.0
//!
//! placement:
//!   - module: SensorReader
//!     device: edge
//!
//! sensors:
//!   - name: PPG_Sensor
//!     tuple_type: PPG_STREAM
//!     gateway: edge
//!     latency: 1.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{AppEdge, AppLoop, AppModule, Application, EdgeKind, TupleMapping};
use crate::binding::{ActuatorBinding, EmissionDistribution, SensorBinding};
use crate::error::{BuildError, ValidationReport};
use crate::model::{FogModel, FogModelBuilder};
use crate::topology::{DeviceProfile, TopologyBuilder};
use crate::types::Latency;

/// The schema version this crate reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors that can occur while loading, saving, or building a model
/// document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema version {0} (expected {SCHEMA_VERSION})")]
    SchemaVersion(u32),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error(transparent)]
    Invalid(#[from] ValidationReport),

    #[error("document error: {0}")]
    Document(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for document operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One device row in the document.
///
/// Parent links are by device *name*; absence of a parent marks a root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name
    pub name: String,

    /// Resource/billing/power attributes
    #[serde(flatten)]
    pub profile: DeviceProfile,

    /// Parent device name, absent for a root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Network delay to the parent
    #[serde(default)]
    pub uplink_latency: Latency,
}

/// One placement row in the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Module name
    pub module: String,
    /// Hosting device name
    pub device: String,
}

/// One sensor or actuator row in the document.
///
/// The gateway is referenced by device *name* and resolved to an id when
/// the document is built into a model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Binding name
    pub name: String,
    /// Tuple type emitted or consumed
    pub tuple_type: String,
    /// Gateway device name
    pub gateway: String,
    /// Latency of the last hop
    #[serde(default)]
    pub latency: Latency,
    /// Emission distribution (sensors only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission: Option<EmissionDistribution>,
}

/// Complete serialized model document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Document schema version
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Application identifier
    #[serde(default)]
    pub app_id: String,

    /// Processing modules
    #[serde(default)]
    pub modules: Vec<AppModule>,

    /// Application edges
    #[serde(default)]
    pub edges: Vec<AppEdge>,

    /// Selectivity transforms
    #[serde(default)]
    pub tuple_mappings: Vec<TupleMapping>,

    /// Latency-tracked loops
    #[serde(default)]
    pub loops: Vec<AppLoop>,

    /// Device tree rows
    #[serde(default)]
    pub topology: Vec<DeviceConfig>,

    /// Module placement rows
    #[serde(default)]
    pub placement: Vec<PlacementConfig>,

    /// Sensor bindings
    #[serde(default)]
    pub sensors: Vec<BindingConfig>,

    /// Actuator bindings
    #[serde(default)]
    pub actuators: Vec<BindingConfig>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ModelConfig {
    /// Creates an empty document at the current schema version.
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ..Self::default()
        }
    }

    /// Loads a document from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads a document from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: ModelConfig = serde_yaml::from_str(yaml)?;
        config.check_schema()?;
        Ok(config)
    }

    /// Loads a document from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads a document from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.check_schema()?;
        Ok(config)
    }

    /// Loads a document from a file, auto-detecting the format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Saves the document to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Saves the document to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Serializes the document to YAML.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serializes the document to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Exports a finalized model into a document.
    pub fn from_model(model: &FogModel) -> Self {
        let app = model.application();
        let topology = model.topology();

        let device_name = |id| {
            topology
                .get(id)
                .map(|d| d.name.clone())
                .unwrap_or_default()
        };

        let mut placement = Vec::new();
        for (module, devices) in model.placement().table() {
            for device in devices {
                placement.push(PlacementConfig {
                    module: module.clone(),
                    device: device.clone(),
                });
            }
        }

        Self {
            schema_version: SCHEMA_VERSION,
            app_id: app.app_id().to_string(),
            modules: app.modules().to_vec(),
            edges: app.edges().to_vec(),
            tuple_mappings: app.tuple_mappings().to_vec(),
            loops: app.loops().to_vec(),
            topology: topology
                .devices()
                .iter()
                .map(|d| DeviceConfig {
                    name: d.name.clone(),
                    profile: d.profile.clone(),
                    parent: d.parent.map(&device_name),
                    uplink_latency: d.uplink_latency,
                })
                .collect(),
            placement,
            sensors: model
                .sensors()
                .iter()
                .map(|s| BindingConfig {
                    name: s.name.clone(),
                    tuple_type: s.tuple_type.clone(),
                    gateway: device_name(s.gateway),
                    latency: s.latency,
                    emission: s.emission.clone(),
                })
                .collect(),
            actuators: model
                .actuators()
                .iter()
                .map(|a| BindingConfig {
                    name: a.name.clone(),
                    tuple_type: a.tuple_type.clone(),
                    gateway: device_name(a.gateway),
                    latency: a.latency,
                    emission: None,
                })
                .collect(),
        }
    }

    /// Builds the document into a finalized, validated [`FogModel`].
    ///
    /// Structural errors surface as [`ConfigError::Build`] or
    /// [`ConfigError::Document`]; aggregated consistency violations as
    /// [`ConfigError::Invalid`].
    pub fn build(&self) -> ConfigResult<FogModel> {
        self.check_schema()?;

        // Topology: devices first, parent links second, so row order in
        // the document does not matter.
        let mut topo = TopologyBuilder::new();
        for row in &self.topology {
            topo.add_device(row.name.clone(), row.profile.clone())?;
        }
        for row in &self.topology {
            if let Some(parent_name) = &row.parent {
                let child = topo.device_id(&row.name).ok_or_else(|| {
                    ConfigError::Document(format!("device `{}` vanished", row.name))
                })?;
                let parent = topo.device_id(parent_name).ok_or_else(|| {
                    ConfigError::Document(format!(
                        "device `{}` references unknown parent `{parent_name}`",
                        row.name
                    ))
                })?;
                topo.set_parent(child, Some(parent), row.uplink_latency)?;
            }
        }

        let mut app = Application::builder(self.app_id.clone());
        for module in &self.modules {
            app = app.module(module.name.clone(), module.mips)?;
        }
        for edge in &self.edges {
            app = match (edge.kind, edge.periodicity) {
                (EdgeKind::Sensor, Some(periodicity)) => app.sensor_edge(
                    edge.source.clone(),
                    edge.dest.clone(),
                    edge.cpu_length,
                    edge.network_length,
                    periodicity,
                    edge.tuple_type.clone(),
                    edge.direction,
                ),
                _ => app.edge(
                    edge.source.clone(),
                    edge.dest.clone(),
                    edge.cpu_length,
                    edge.network_length,
                    edge.tuple_type.clone(),
                    edge.direction,
                    edge.kind,
                ),
            };
        }
        for mapping in &self.tuple_mappings {
            app = app.tuple_mapping(
                mapping.module.clone(),
                mapping.input_type.clone(),
                mapping.output_type.clone(),
                mapping.selectivity,
            )?;
        }
        let application = app.loops(self.loops.clone()).build();

        let topology = topo.freeze();
        let gateway_id = |name: &str| {
            topology.by_name(name).map(|d| d.id).ok_or_else(|| {
                ConfigError::Document(format!("binding references unknown gateway `{name}`"))
            })
        };

        let mut builder = FogModelBuilder::new(application, topology.clone());
        for row in &self.sensors {
            let mut binding =
                SensorBinding::new(row.name.clone(), row.tuple_type.clone(), gateway_id(&row.gateway)?, row.latency)?;
            binding.emission = row.emission.clone();
            builder = builder.attach_sensor(binding)?;
        }
        for row in &self.actuators {
            let binding = ActuatorBinding::new(
                row.name.clone(),
                row.tuple_type.clone(),
                gateway_id(&row.gateway)?,
                row.latency,
            )?;
            builder = builder.attach_actuator(binding)?;
        }
        for row in &self.placement {
            builder = builder.map_module(row.module.clone(), row.device.clone());
        }

        Ok(builder.finalize()?)
    }

    fn check_schema(&self) -> ConfigResult<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ConfigError::SchemaVersion(self.schema_version));
        }
        Ok(())
    }
}
