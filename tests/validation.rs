//! Integration tests for cross-entity validation and finalization.
//!
//! Covers the failure scenarios the model must catch before a simulation
//! ever runs: missing tuple mappings, sensor/actuator tuple mismatches,
//! incomplete placements, coexisting duplicate edges, and idempotency of
//! the validation pass.

use fogsim::application::{AppLoop, Application, Direction, EdgeKind};
use fogsim::binding::{ActuatorBinding, SensorBinding};
use fogsim::model::FogModelBuilder;
use fogsim::topology::{DeviceProfile, Topology, TopologyBuilder};
use fogsim::{DeviceId, Violation};

fn single_cloud() -> (Topology, DeviceId) {
    let mut builder = TopologyBuilder::new();
    let cloud = builder
        .add_device("cloud", DeviceProfile::new(44800.0, 40000, 100.0, 10000.0))
        .unwrap();
    (builder.freeze(), cloud)
}

fn count_kind(violations: &[Violation], pred: impl Fn(&Violation) -> bool) -> usize {
    violations.iter().filter(|v| pred(v)).count()
}

#[test]
fn missing_tuple_mapping_blames_receiving_module() {
    // Modules {A, B}, edge A -> B carrying "T", no mapping anywhere.
    let app = Application::builder("app")
        .module("A", 100.0)
        .unwrap()
        .module("B", 100.0)
        .unwrap()
        .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
        .build();
    let (topology, _) = single_cloud();

    let report = FogModelBuilder::new(app, topology)
        .map_module("A", "cloud")
        .map_module("B", "cloud")
        .finalize()
        .unwrap_err();

    assert_eq!(
        report.violations(),
        &[Violation::MissingTupleMapping {
            module: "B".to_string(),
            input_type: "T".to_string(),
        }]
    );
}

#[test]
fn sensor_tuple_mismatch_reported_exactly_once() {
    // Sensor "S" bound with tuple type "X"; the edge from "S" carries "Y".
    let app = Application::builder("app")
        .module("Reader", 100.0)
        .unwrap()
        .sensor_edge("S", "Reader", 1000.0, 200.0, 5.0, "Y", Direction::Up)
        .tuple_mapping("Reader", "Y", "OUT", 1.0)
        .unwrap()
        .build();
    let (topology, cloud) = single_cloud();

    let report = FogModelBuilder::new(app, topology)
        .attach_sensor(SensorBinding::new("S", "X", cloud, 1.0).unwrap())
        .unwrap()
        .map_module("Reader", "cloud")
        .finalize()
        .unwrap_err();

    let mismatches = count_kind(report.violations(), |v| {
        matches!(v, Violation::SensorTupleMismatch { sensor, .. } if sensor == "S")
    });
    assert_eq!(mismatches, 1, "report: {report}");
    assert_eq!(report.len(), 1);
}

#[test]
fn actuator_tuple_mismatch_reported() {
    let app = Application::builder("app")
        .module("Driver", 100.0)
        .unwrap()
        .edge(
            "Driver",
            "motor",
            10.0,
            1.0,
            "CMD",
            Direction::Down,
            EdgeKind::Actuator,
        )
        .build();
    let (topology, cloud) = single_cloud();

    let report = FogModelBuilder::new(app, topology)
        .attach_actuator(ActuatorBinding::new("motor", "OTHER_CMD", cloud, 1.0).unwrap())
        .unwrap()
        .map_module("Driver", "cloud")
        .finalize()
        .unwrap_err();

    assert_eq!(
        count_kind(report.violations(), |v| matches!(
            v,
            Violation::ActuatorTupleMismatch { actuator, .. } if actuator == "motor"
        )),
        1
    );
}

#[test]
fn unplaced_module_named_in_report() {
    // Place only A of {A, B}: exactly one violation, naming B.
    let app = Application::builder("app")
        .module("A", 100.0)
        .unwrap()
        .module("B", 100.0)
        .unwrap()
        .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
        .tuple_mapping("B", "T", "OUT", 1.0)
        .unwrap()
        .build();
    let (topology, _) = single_cloud();

    let report = FogModelBuilder::new(app, topology)
        .map_module("A", "cloud")
        .finalize()
        .unwrap_err();

    assert_eq!(
        report.violations(),
        &[Violation::UnplacedModule {
            module: "B".to_string(),
        }]
    );
}

#[test]
fn duplicate_edges_coexist() {
    // The same (source, dest) pair added twice: both edges stay.
    let app = Application::builder("app")
        .module("A", 100.0)
        .unwrap()
        .module("B", 100.0)
        .unwrap()
        .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
        .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
        .tuple_mapping("B", "T", "OUT", 1.0)
        .unwrap()
        .build();

    assert_eq!(app.edges().len(), 2);
    assert_eq!(
        app.edges()
            .iter()
            .filter(|e| e.source == "A" && e.dest == "B")
            .count(),
        2
    );

    // And the duplicated pair does not confuse validation.
    let (topology, _) = single_cloud();
    let model = FogModelBuilder::new(app, topology)
        .map_module("A", "cloud")
        .map_module("B", "cloud")
        .finalize()
        .unwrap();
    assert!(model.validate().is_empty());
}

#[test]
fn loop_including_sensor_name_is_valid() {
    // Loops may start at the originating sensor; each consecutive pair
    // still needs a real edge.
    let app = Application::builder("app")
        .module("Reader", 100.0)
        .unwrap()
        .module("Predictor", 100.0)
        .unwrap()
        .sensor_edge("S", "Reader", 1000.0, 200.0, 5.0, "X", Direction::Up)
        .edge(
            "Reader",
            "Predictor",
            2000.0,
            500.0,
            "TASK",
            Direction::Up,
            EdgeKind::Module,
        )
        .tuple_mapping("Reader", "X", "TASK", 1.0)
        .unwrap()
        .tuple_mapping("Predictor", "TASK", "RESULT", 1.0)
        .unwrap()
        .loops(vec![AppLoop::new(["S", "Reader", "Predictor"])])
        .build();
    let (topology, cloud) = single_cloud();

    let model = FogModelBuilder::new(app, topology)
        .attach_sensor(SensorBinding::new("S", "X", cloud, 1.0).unwrap())
        .unwrap()
        .map_module("Reader", "cloud")
        .map_module("Predictor", "cloud")
        .finalize()
        .unwrap();
    assert!(model.validate().is_empty());
}

#[test]
fn loop_over_nonexistent_edge_rejected() {
    let app = Application::builder("app")
        .module("A", 100.0)
        .unwrap()
        .module("B", 100.0)
        .unwrap()
        .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
        .tuple_mapping("B", "T", "OUT", 1.0)
        .unwrap()
        .loops(vec![AppLoop::new(["B", "A"])])
        .build();
    let (topology, _) = single_cloud();

    let report = FogModelBuilder::new(app, topology)
        .map_module("A", "cloud")
        .map_module("B", "cloud")
        .finalize()
        .unwrap_err();

    assert_eq!(
        report.violations(),
        &[Violation::InvalidLoop {
            index: 0,
            from: "B".to_string(),
            to: "A".to_string(),
        }]
    );
}

#[test]
fn validation_idempotent_on_valid_model() {
    let app = Application::builder("app")
        .module("A", 100.0)
        .unwrap()
        .build();
    let (topology, _) = single_cloud();

    let model = FogModelBuilder::new(app, topology)
        .map_module("A", "cloud")
        .finalize()
        .unwrap();

    assert_eq!(model.validate(), model.validate());
    assert!(model.validate().is_empty());
}

#[test]
fn all_violations_aggregated_in_one_report() {
    // A model broken in four independent ways yields one report carrying
    // all four, not a fail-fast on the first.
    let app = Application::builder("app")
        .module("A", 100.0)
        .unwrap()
        .module("B", 100.0)
        .unwrap()
        .edge("A", "Ghost", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
        .loops(vec![AppLoop::new(["B", "A"])])
        .build();
    let (topology, cloud) = single_cloud();

    let report = FogModelBuilder::new(app, topology)
        .attach_sensor(SensorBinding::new("Unwired", "X", cloud, 1.0).unwrap())
        .unwrap()
        .map_module("A", "cloud")
        .finalize()
        .unwrap_err();

    let violations = report.violations();
    assert_eq!(count_kind(violations, |v| matches!(v, Violation::DanglingEdge { .. })), 1);
    assert_eq!(
        count_kind(violations, |v| matches!(v, Violation::SensorTupleMismatch { .. })),
        1
    );
    assert_eq!(
        count_kind(violations, |v| matches!(v, Violation::UnplacedModule { .. })),
        1
    );
    assert_eq!(count_kind(violations, |v| matches!(v, Violation::InvalidLoop { .. })), 1);
}

#[test]
fn placement_on_unknown_device_rejected() {
    let app = Application::builder("app")
        .module("A", 100.0)
        .unwrap()
        .build();
    let (topology, _) = single_cloud();

    let report = FogModelBuilder::new(app, topology)
        .map_module("A", "fog9")
        .finalize()
        .unwrap_err();

    assert_eq!(
        report.violations(),
        &[Violation::UnknownDevice {
            module: "A".to_string(),
            device: "fog9".to_string(),
        }]
    );
}
