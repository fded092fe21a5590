//! Cross-entity consistency validation.
//!
//! Runs after all builders have been invoked, before the model is handed
//! to the execution engine. Validation is pure — it mutates nothing and
//! returns a sequence of [`Violation`]s; an empty list means the model is
//! consistent. Running it twice on an unmodified model yields the same
//! list. The caller decides what a non-empty list means;
//! [`FogModelBuilder::finalize`](crate::model::FogModelBuilder::finalize)
//! treats any violation as fatal (fail closed), because undetected
//! mismatches surface later as silent data loss deep inside the engine.
//!
//! The checks, in detection order:
//!
//! 1. Every edge endpoint resolves to a declared module, sensor, or
//!    actuator, and endpoint roles match the edge kind (`DanglingEdge`).
//! 2. Every SENSOR edge agrees with the sensor binding of the same name
//!    on tuple type; a sensor bound to no edge at all is also flagged
//!    (`SensorTupleMismatch`).
//! 3. The actuator analogue of (2) (`ActuatorTupleMismatch`).
//! 4. Every module receiving a tuple type owns a mapping for it — the
//!    *receiver* is blamed (`MissingTupleMapping`).
//! 5. Every module appears in the placement, on known devices
//!    (`UnplacedModule`, `UnknownDevice`).
//! 6. Every consecutive pair in every loop has a corresponding edge
//!    (`InvalidLoop`).

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::application::{Application, EdgeKind};
use crate::binding::{ActuatorBinding, SensorBinding};
use crate::error::Violation;
use crate::placement::Placement;
use crate::topology::Topology;

/// Validates a complete model, returning every violation found.
pub fn validate_model(
    application: &Application,
    topology: &Topology,
    placement: &Placement,
    sensors: &[SensorBinding],
    actuators: &[ActuatorBinding],
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let module_names: HashSet<&str> = application
        .modules()
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    let sensor_by_name: HashMap<&str, &SensorBinding> =
        sensors.iter().map(|s| (s.name.as_str(), s)).collect();
    let actuator_by_name: HashMap<&str, &ActuatorBinding> =
        actuators.iter().map(|a| (a.name.as_str(), a)).collect();

    let known = |name: &str| {
        module_names.contains(name)
            || sensor_by_name.contains_key(name)
            || actuator_by_name.contains_key(name)
    };

    // 1. Dangling endpoints and kind/role mismatches.
    for edge in application.edges() {
        let mut dangling = |detail: String| {
            violations.push(Violation::DanglingEdge {
                source: edge.source.clone(),
                dest: edge.dest.clone(),
                detail,
            });
        };

        if !known(&edge.source) {
            dangling(format!(
                "source `{}` is not a declared module, sensor, or actuator",
                edge.source
            ));
        } else if edge.kind == EdgeKind::Sensor && !sensor_by_name.contains_key(edge.source.as_str())
        {
            dangling(format!(
                "SENSOR edge source `{}` is not a bound sensor",
                edge.source
            ));
        }

        if !known(&edge.dest) {
            dangling(format!(
                "destination `{}` is not a declared module, sensor, or actuator",
                edge.dest
            ));
        } else if edge.kind == EdgeKind::Actuator
            && !actuator_by_name.contains_key(edge.dest.as_str())
        {
            dangling(format!(
                "ACTUATOR edge destination `{}` is not a bound actuator",
                edge.dest
            ));
        }
    }

    // 2. Sensor bindings and SENSOR edges must agree on tuple type.
    let mut wired_sensors: HashSet<&str> = HashSet::new();
    for edge in application.edges() {
        if edge.kind != EdgeKind::Sensor {
            continue;
        }
        if let Some(binding) = sensor_by_name.get(edge.source.as_str()) {
            wired_sensors.insert(edge.source.as_str());
            if binding.tuple_type != edge.tuple_type {
                violations.push(Violation::SensorTupleMismatch {
                    sensor: binding.name.clone(),
                    bound_type: binding.tuple_type.clone(),
                    detail: format!("edge carries `{}`", edge.tuple_type),
                });
            }
        }
    }
    // A sensor bound to no edge at all would generate tuples nothing
    // routes; only flagged when no edge-side mismatch covered the name.
    for binding in sensors {
        if !wired_sensors.contains(binding.name.as_str()) {
            violations.push(Violation::SensorTupleMismatch {
                sensor: binding.name.clone(),
                bound_type: binding.tuple_type.clone(),
                detail: "no sensor edge is wired to this sensor".to_string(),
            });
        }
    }

    // 3. Actuator analogue of (2).
    let mut wired_actuators: HashSet<&str> = HashSet::new();
    for edge in application.edges() {
        if edge.kind != EdgeKind::Actuator {
            continue;
        }
        if let Some(binding) = actuator_by_name.get(edge.dest.as_str()) {
            wired_actuators.insert(edge.dest.as_str());
            if binding.tuple_type != edge.tuple_type {
                violations.push(Violation::ActuatorTupleMismatch {
                    actuator: binding.name.clone(),
                    bound_type: binding.tuple_type.clone(),
                    detail: format!("edge carries `{}`", edge.tuple_type),
                });
            }
        }
    }
    for binding in actuators {
        if !wired_actuators.contains(binding.name.as_str()) {
            violations.push(Violation::ActuatorTupleMismatch {
                actuator: binding.name.clone(),
                bound_type: binding.tuple_type.clone(),
                detail: "no actuator edge is wired to this actuator".to_string(),
            });
        }
    }

    // 4. Tuple-mapping closure at the receiving module. Without the
    // mapping, tuples of that type arrive and are silently dropped.
    let mut reported: BTreeSet<(&str, &str)> = BTreeSet::new();
    for edge in application.edges() {
        if edge.kind == EdgeKind::Actuator {
            continue;
        }
        if !module_names.contains(edge.dest.as_str()) {
            continue; // already a dangling edge
        }
        if application
            .tuple_mapping(&edge.dest, &edge.tuple_type)
            .is_none()
            && reported.insert((edge.dest.as_str(), edge.tuple_type.as_str()))
        {
            violations.push(Violation::MissingTupleMapping {
                module: edge.dest.clone(),
                input_type: edge.tuple_type.clone(),
            });
        }
    }

    // 5. Placement totality over known devices.
    for module in application.modules() {
        match placement.devices_for(&module.name) {
            None => violations.push(Violation::UnplacedModule {
                module: module.name.clone(),
            }),
            Some(devices) => {
                for device in devices {
                    if !topology.contains_name(device) {
                        violations.push(Violation::UnknownDevice {
                            module: module.name.clone(),
                            device: device.clone(),
                        });
                    }
                }
            }
        }
    }

    // 6. Loop steps must follow existing edges.
    for (index, app_loop) in application.loops().iter().enumerate() {
        for pair in app_loop.path.windows(2) {
            if !application.has_edge(&pair[0], &pair[1]) {
                violations.push(Violation::InvalidLoop {
                    index,
                    from: pair[0].clone(),
                    to: pair[1].clone(),
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{AppLoop, Direction};
    use crate::placement::ModuleMapping;
    use crate::topology::{DeviceProfile, TopologyBuilder};

    fn topology() -> Topology {
        let mut builder = TopologyBuilder::new();
        builder
            .add_device("cloud", DeviceProfile::new(44800.0, 40000, 100.0, 10000.0))
            .unwrap();
        builder.freeze()
    }

    fn place_all(app: &Application) -> Placement {
        let mut mapping = ModuleMapping::new();
        for module in app.modules() {
            mapping = mapping.add_module_to_device(module.name.clone(), "cloud");
        }
        Placement::resolve_lenient(app, &mapping)
    }

    #[test]
    fn test_clean_model_has_no_violations() {
        let app = Application::builder("app")
            .module("A", 100.0)
            .unwrap()
            .module("B", 100.0)
            .unwrap()
            .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
            .tuple_mapping("B", "T", "OUT", 1.0)
            .unwrap()
            .build();
        let topology = topology();
        let placement = place_all(&app);

        let violations = validate_model(&app, &topology, &placement, &[], &[]);
        assert!(violations.is_empty(), "unexpected: {violations:?}");
    }

    #[test]
    fn test_dangling_source_reported() {
        let app = Application::builder("app")
            .module("B", 100.0)
            .unwrap()
            .edge("Ghost", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
            .tuple_mapping("B", "T", "OUT", 1.0)
            .unwrap()
            .build();
        let topology = topology();
        let placement = place_all(&app);

        let violations = validate_model(&app, &topology, &placement, &[], &[]);
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], Violation::DanglingEdge { source, .. } if source == "Ghost"));
    }

    #[test]
    fn test_sensor_edge_from_module_is_dangling() {
        // "A" exists but is a module, so a SENSOR edge may not start there.
        let app = Application::builder("app")
            .module("A", 100.0)
            .unwrap()
            .module("B", 100.0)
            .unwrap()
            .sensor_edge("A", "B", 10.0, 1.0, 5.0, "T", Direction::Up)
            .tuple_mapping("B", "T", "OUT", 1.0)
            .unwrap()
            .build();
        let topology = topology();
        let placement = place_all(&app);

        let violations = validate_model(&app, &topology, &placement, &[], &[]);
        assert_eq!(violations.len(), 1);
        assert!(matches!(&violations[0], Violation::DanglingEdge { .. }));
    }

    #[test]
    fn test_missing_mapping_blames_receiver() {
        let app = Application::builder("app")
            .module("A", 100.0)
            .unwrap()
            .module("B", 100.0)
            .unwrap()
            .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
            .build();
        let topology = topology();
        let placement = place_all(&app);

        let violations = validate_model(&app, &topology, &placement, &[], &[]);
        assert_eq!(
            violations,
            vec![Violation::MissingTupleMapping {
                module: "B".to_string(),
                input_type: "T".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_mapping_deduplicated_across_parallel_edges() {
        let app = Application::builder("app")
            .module("A", 100.0)
            .unwrap()
            .module("B", 100.0)
            .unwrap()
            .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
            .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
            .build();
        let topology = topology();
        let placement = place_all(&app);

        let violations = validate_model(&app, &topology, &placement, &[], &[]);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_unwired_sensor_reported_once() {
        let app = Application::builder("app")
            .module("A", 100.0)
            .unwrap()
            .build();
        let topology = topology();
        let placement = place_all(&app);
        let sensor = SensorBinding::new("S", "X", 0, 1.0).unwrap();

        let violations = validate_model(&app, &topology, &placement, &[sensor], &[]);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0],
            Violation::SensorTupleMismatch { sensor, .. } if sensor == "S"
        ));
    }

    #[test]
    fn test_loop_over_missing_edge_reported() {
        let app = Application::builder("app")
            .module("A", 100.0)
            .unwrap()
            .module("B", 100.0)
            .unwrap()
            .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
            .tuple_mapping("B", "T", "OUT", 1.0)
            .unwrap()
            .loops(vec![AppLoop::new(["A", "B", "A"])])
            .build();
        let topology = topology();
        let placement = place_all(&app);

        let violations = validate_model(&app, &topology, &placement, &[], &[]);
        assert_eq!(
            violations,
            vec![Violation::InvalidLoop {
                index: 0,
                from: "B".to_string(),
                to: "A".to_string(),
            }]
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let app = Application::builder("app")
            .module("A", 100.0)
            .unwrap()
            .module("B", 100.0)
            .unwrap()
            .edge("A", "B", 10.0, 1.0, "T", Direction::Up, EdgeKind::Module)
            .build();
        let topology = topology();
        let placement = place_all(&app);

        let first = validate_model(&app, &topology, &placement, &[], &[]);
        let second = validate_model(&app, &topology, &placement, &[], &[]);
        assert_eq!(first, second);
    }
}
