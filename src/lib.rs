//! # Fogsim Model Core
//!
//! Data model for latency- and resource-aware applications deployed over a
//! tiered fog-computing topology: a tree of compute devices (cloud, edge,
//! mobile) hosting a pipeline of processing modules that consume sensor
//! streams and drive actuators.
//!
//! The crate covers model *construction* only:
//!
//! - **Application graph**: processing modules with MIPS demands, typed
//!   edges carrying named tuple types, per-edge selectivity transforms,
//!   and latency-tracked loops ([`application`]).
//! - **Device tree**: tiered devices with resource, latency, billing, and
//!   power attributes, linked by parent back-references ([`topology`]).
//! - **Placement**: a name-keyed table binding every module to the devices
//!   hosting it ([`placement`]).
//! - **Bindings**: sensors and actuators attached to gateway devices
//!   ([`binding`]).
//! - **Validation**: a pure cross-entity consistency pass; finalization
//!   fails closed, so the execution engine only ever sees a model with an
//!   empty violation list ([`validate`], [`model`]).
//!
//! The discrete-event engine, resource scheduler, energy model, and
//! transport simulation are external collaborators that consume the
//! finalized [`FogModel`] read-only.
//!
//! ## Quick Start
//!
//! ```rust
//! use fogsim::{
//!     Application, Direction, DeviceProfile, EdgeKind, FogModelBuilder, SensorBinding,
//!     TopologyBuilder,
//! };
//!
//! // Three-tier device tree: cloud -> edge -> mobile.
//! let mut topo = TopologyBuilder::new();
//! let cloud = topo.add_device("cloud", DeviceProfile::new(44800.0, 40000, 100.0, 10000.0)).unwrap();
//! let edge = topo.add_device("edge", DeviceProfile::new(2800.0, 4000, 100.0, 10000.0).with_level(1)).unwrap();
//! topo.set_parent(edge, Some(cloud), 100.0).unwrap();
//!
//! // Two-stage pipeline fed by one sensor stream.
//! let app = Application::builder("demo")
//!     .module("Reader", 100.0).unwrap()
//!     .module("Predictor", 100.0).unwrap()
//!     .sensor_edge("PPG_Sensor", "Reader", 1000.0, 200.0, 5.0, "PPG_STREAM", Direction::Up)
//!     .edge("Reader", "Predictor", 2000.0, 500.0, "TASK", Direction::Up, EdgeKind::Module)
//!     .tuple_mapping("Reader", "PPG_STREAM", "TASK", 1.0).unwrap()
//!     .tuple_mapping("Predictor", "TASK", "RESULT", 1.0).unwrap()
//!     .build();
//!
//! // Bind, place, and finalize; validation failures fail closed.
//! let model = FogModelBuilder::new(app, topo.freeze())
//!     .attach_sensor(SensorBinding::new("PPG_Sensor", "PPG_STREAM", edge, 1.0).unwrap()).unwrap()
//!     .map_module("Reader", "edge")
//!     .map_module("Predictor", "cloud")
//!     .finalize()
//!     .unwrap();
//!
//! assert!(model.validate().is_empty());
//! ```
//!
//! ## Persistence
//!
//! ```rust,ignore
//! use fogsim::config::ModelConfig;
//!
//! let model = ModelConfig::from_file("smart_health.yaml")?.build()?;
//! ```

pub mod application;
pub mod binding;
pub mod config;
pub mod error;
pub mod model;
pub mod placement;
pub mod topology;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use application::{
    AppEdge, AppLoop, AppModule, Application, ApplicationBuilder, Direction, EdgeKind, TupleMapping,
};
pub use binding::{ActuatorBinding, EmissionDistribution, SensorBinding};
pub use config::{ConfigError, ConfigResult, ModelConfig};
pub use error::{BuildError, ValidationReport, Violation};
pub use model::{FogModel, FogModelBuilder};
pub use placement::{ModuleMapping, Placement};
pub use topology::{Device, DeviceProfile, Topology, TopologyBuilder};
pub use types::{AppId, DeviceId, Latency, Mips, Selectivity, TupleType};
pub use validate::validate_model;

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// fogsim::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
