//! Application graph construction.
//!
//! An application is a directed graph of processing modules connected by
//! typed edges, plus per-module tuple transforms (selectivity) and named
//! latency loops. The graph is assembled through [`ApplicationBuilder`]
//! and frozen into a read-only [`Application`]; cross-entity checks
//! (dangling endpoints, mapping closure, loop validity) are deferred to
//! validation because sensors and actuators may be declared after the
//! edges that reference them.
//!
//! # Example
//!
//! ```
//! use fogsim::application::{Application, Direction, EdgeKind};
//!
//! let app = Application::builder("smart_health")
//!     .module("SensorReader", 100.0).unwrap()
//!     .module("Predictor", 100.0).unwrap()
//!     .edge("PPG_Sensor", "SensorReader", 1000.0, 200.0, "PPG_STREAM", Direction::Up, EdgeKind::Sensor)
//!     .edge("SensorReader", "Predictor", 2000.0, 500.0, "PREDICTION_TASK", Direction::Up, EdgeKind::Module)
//!     .tuple_mapping("SensorReader", "PPG_STREAM", "PREDICTION_TASK", 1.0).unwrap()
//!     .build();
//!
//! assert_eq!(app.modules().len(), 2);
//! assert_eq!(app.edges().len(), 2);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::types::{AppId, Latency, Mips, Selectivity, TupleType};

/// A named processing stage with a compute demand.
///
/// Immutable after creation; owned by the application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppModule {
    /// Unique name within the application
    pub name: String,
    /// Resource demand in MIPS (strictly positive)
    pub mips: Mips,
}

/// The kind of an application edge: what its endpoints are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Originates at a sensor
    Sensor,
    /// Connects two modules
    Module,
    /// Terminates at an actuator
    Actuator,
}

/// The flow direction of an edge: toward the cloud or toward an actuator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward the cloud (up the device tree)
    Up,
    /// Toward an actuator (down the device tree)
    Down,
}

/// A directed, typed edge between two named graph vertices.
///
/// Edges are never deduplicated: adding the same (source, dest) pair
/// twice yields two coexisting edges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppEdge {
    /// Source vertex name (module or sensor)
    pub source: String,
    /// Destination vertex name (module or actuator)
    pub dest: String,
    /// Tuple type carried by this edge
    pub tuple_type: TupleType,
    /// Processing cost attributable to one tuple, in MI
    pub cpu_length: f64,
    /// Network payload per tuple, in bytes
    pub network_length: f64,
    /// Flow direction
    pub direction: Direction,
    /// Edge kind
    pub kind: EdgeKind,
    /// Per-period deadline hint; present on SENSOR edges only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodicity: Option<Latency>,
}

/// A selectivity transform: (module, input type) → (output type, fraction).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TupleMapping {
    /// The module owning the transform
    pub module: String,
    /// Incoming tuple type
    pub input_type: TupleType,
    /// Outgoing tuple type
    pub output_type: TupleType,
    /// Fraction of input tuples forwarded, in `[0, 1]`
    pub selectivity: Selectivity,
}

/// An ordered module-name path tracked for end-to-end latency.
///
/// Loops are observational only — they never affect routing. The first
/// element may name the originating sensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppLoop {
    /// Vertex names in flow order
    pub path: Vec<String>,
}

impl AppLoop {
    /// Creates a loop from a sequence of vertex names.
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }
}

/// Consuming builder for [`Application`].
///
/// Structural errors (duplicate module names, non-positive demand, bad
/// selectivity) are reported at the call that caused them; endpoint
/// existence is deliberately *not* checked here since sensors and
/// actuators may be bound after the edges referencing them.
#[derive(Debug)]
pub struct ApplicationBuilder {
    app_id: AppId,
    modules: Vec<AppModule>,
    edges: Vec<AppEdge>,
    mappings: Vec<TupleMapping>,
    mapping_index: HashMap<(String, TupleType), usize>,
    loops: Vec<AppLoop>,
}

impl ApplicationBuilder {
    fn new(app_id: impl Into<AppId>) -> Self {
        Self {
            app_id: app_id.into(),
            modules: Vec::new(),
            edges: Vec::new(),
            mappings: Vec::new(),
            mapping_index: HashMap::new(),
            loops: Vec::new(),
        }
    }

    /// Adds a processing module with the given MIPS demand.
    ///
    /// Fails with [`BuildError::DuplicateName`] if the name is taken and
    /// with [`BuildError::InvalidResource`] if the demand is not strictly
    /// positive.
    pub fn module(mut self, name: impl Into<String>, mips: Mips) -> Result<Self, BuildError> {
        let name = name.into();
        if mips <= 0.0 || !mips.is_finite() {
            return Err(BuildError::InvalidResource {
                entity: name,
                field: "mips",
                value: mips,
            });
        }
        if self.modules.iter().any(|m| m.name == name) {
            return Err(BuildError::DuplicateName {
                name,
                existing: "module",
            });
        }
        self.modules.push(AppModule { name, mips });
        Ok(self)
    }

    /// Adds a MODULE or ACTUATOR edge.
    ///
    /// Use [`sensor_edge`](Self::sensor_edge) for SENSOR edges, which
    /// carry an extra periodicity hint.
    #[allow(clippy::too_many_arguments)]
    pub fn edge(
        mut self,
        source: impl Into<String>,
        dest: impl Into<String>,
        cpu_length: f64,
        network_length: f64,
        tuple_type: impl Into<TupleType>,
        direction: Direction,
        kind: EdgeKind,
    ) -> Self {
        self.edges.push(AppEdge {
            source: source.into(),
            dest: dest.into(),
            tuple_type: tuple_type.into(),
            cpu_length,
            network_length,
            direction,
            kind,
            periodicity: None,
        });
        self
    }

    /// Adds a SENSOR edge with its per-period deadline hint.
    #[allow(clippy::too_many_arguments)]
    pub fn sensor_edge(
        mut self,
        source: impl Into<String>,
        dest: impl Into<String>,
        cpu_length: f64,
        network_length: f64,
        periodicity: Latency,
        tuple_type: impl Into<TupleType>,
        direction: Direction,
    ) -> Self {
        self.edges.push(AppEdge {
            source: source.into(),
            dest: dest.into(),
            tuple_type: tuple_type.into(),
            cpu_length,
            network_length,
            direction,
            kind: EdgeKind::Sensor,
            periodicity: Some(periodicity),
        });
        self
    }

    /// Adds a selectivity transform for (module, input type).
    ///
    /// The module must already be declared. A second mapping for the same
    /// key overwrites the first — last write wins.
    pub fn tuple_mapping(
        mut self,
        module: impl Into<String>,
        input_type: impl Into<TupleType>,
        output_type: impl Into<TupleType>,
        selectivity: Selectivity,
    ) -> Result<Self, BuildError> {
        let module = module.into();
        let input_type = input_type.into();
        if !(0.0..=1.0).contains(&selectivity) {
            return Err(BuildError::InvalidSelectivity {
                module,
                input_type,
                value: selectivity,
            });
        }
        if !self.modules.iter().any(|m| m.name == module) {
            return Err(BuildError::UnknownEndpoint {
                name: module,
                context: format!("tuple mapping for input `{input_type}`"),
            });
        }

        let mapping = TupleMapping {
            module: module.clone(),
            input_type: input_type.clone(),
            output_type: output_type.into(),
            selectivity,
        };
        match self.mapping_index.get(&(module.clone(), input_type.clone())) {
            Some(&i) => {
                tracing::warn!(
                    "overwriting tuple mapping for ({module}, {input_type}); last write wins"
                );
                self.mappings[i] = mapping;
            }
            None => {
                self.mapping_index
                    .insert((module, input_type), self.mappings.len());
                self.mappings.push(mapping);
            }
        }
        Ok(self)
    }

    /// Stores the latency loops verbatim; they are validated lazily.
    pub fn loops(mut self, loops: Vec<AppLoop>) -> Self {
        self.loops = loops;
        self
    }

    /// Freezes the graph into a read-only [`Application`].
    pub fn build(self) -> Application {
        Application {
            app_id: self.app_id,
            modules: self.modules,
            edges: self.edges,
            mappings: self.mappings,
            mapping_index: self.mapping_index,
            loops: self.loops,
        }
    }
}

/// Read-only, frozen application graph.
///
/// Exposes the module set, edge list, tuple-mapping table, and loop list
/// the execution engine consumes. No mutation API exists once built.
#[derive(Clone, Debug, Default)]
pub struct Application {
    app_id: AppId,
    modules: Vec<AppModule>,
    edges: Vec<AppEdge>,
    mappings: Vec<TupleMapping>,
    mapping_index: HashMap<(String, TupleType), usize>,
    loops: Vec<AppLoop>,
}

impl Application {
    /// Starts building an application with the given id.
    pub fn builder(app_id: impl Into<AppId>) -> ApplicationBuilder {
        ApplicationBuilder::new(app_id)
    }

    /// Returns the application id.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the modules in declaration order.
    pub fn modules(&self) -> &[AppModule] {
        &self.modules
    }

    /// Looks up a module by name.
    pub fn module(&self, name: &str) -> Option<&AppModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Returns the edges in declaration order, duplicates included.
    pub fn edges(&self) -> &[AppEdge] {
        &self.edges
    }

    /// Returns all edges arriving at the given vertex name.
    pub fn edges_into<'a>(&'a self, dest: &'a str) -> impl Iterator<Item = &'a AppEdge> {
        self.edges.iter().filter(move |e| e.dest == dest)
    }

    /// Returns all edges leaving the given vertex name.
    pub fn edges_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a AppEdge> {
        self.edges.iter().filter(move |e| e.source == source)
    }

    /// Returns true if any edge connects `source` to `dest`.
    pub fn has_edge(&self, source: &str, dest: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.dest == dest)
    }

    /// Returns the tuple mappings in declaration order.
    pub fn tuple_mappings(&self) -> &[TupleMapping] {
        &self.mappings
    }

    /// Looks up the transform for (module, input type).
    pub fn tuple_mapping(&self, module: &str, input_type: &str) -> Option<&TupleMapping> {
        self.mapping_index
            .get(&(module.to_string(), input_type.to_string()))
            .map(|&i| &self.mappings[i])
    }

    /// Returns the latency loops.
    pub fn loops(&self) -> &[AppLoop] {
        &self.loops
    }
}
