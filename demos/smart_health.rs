//! Smart-health monitoring deployment.
//!
//! Builds the full model — a cloud/edge/mobile device chain, a five-stage
//! prediction pipeline fed by six wearable bio-signal streams, and a
//! display actuator — validates it, and prints the document form.
//!
//! Run with: `cargo run --example smart_health`

use fogsim::application::{AppLoop, Application, Direction, EdgeKind};
use fogsim::binding::{ActuatorBinding, EmissionDistribution, SensorBinding};
use fogsim::config::ModelConfig;
use fogsim::model::FogModelBuilder;
use fogsim::topology::{DeviceProfile, TopologyBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fogsim::init_logging("info");

    let mut topo = TopologyBuilder::new();
    let cloud = topo.add_device(
        "cloud",
        DeviceProfile::new(44800.0, 40000, 100.0, 10000.0)
            .with_rate_per_mips(0.01)
            .with_power(1650.0, 1332.0),
    )?;
    let edge = topo.add_device(
        "edge",
        DeviceProfile::new(2800.0, 4000, 100.0, 10000.0)
            .with_level(1)
            .with_power(107.339, 83.4333),
    )?;
    let mobile = topo.add_device(
        "mobile",
        DeviceProfile::new(1200.0, 1000, 100.0, 270.0)
            .with_level(2)
            .with_rate_per_mips(2.5)
            .with_power(87.53, 82.44),
    )?;
    topo.set_parent(edge, Some(cloud), 100.0)?;
    topo.set_parent(mobile, Some(edge), 50.0)?;

    let streams = [
        ("PPG_Sensor", "PPG_STREAM"),
        ("HeartRate_Sensor", "HEART_RATE_STREAM"),
        ("SystolicPeak_Sensor", "SYSTOLIC_PEAK_STREAM"),
        ("DiastolicPeak_Sensor", "DIASTOLIC_PEAK_STREAM"),
        ("PulseArea_Sensor", "PULSE_AREA_STREAM"),
        ("WeightGender_Sensor", "WEIGHT_GENDER_STREAM"),
    ];

    let mut app = Application::builder("smart_health")
        .module("SensorReader", 100.0)?
        .module("Predictor", 100.0)?
        .module("DataStorage", 100.0)?
        .module("DisplayModule", 100.0)?
        .module("DisplayActuatorModule", 100.0)?;

    for (sensor, stream) in streams {
        app = app
            .sensor_edge(sensor, "SensorReader", 1000.0, 200.0, 5.0, stream, Direction::Up)
            .tuple_mapping("SensorReader", stream, "PREDICTION_TASK", 1.0)?;
    }

    let app = app
        .edge("SensorReader", "Predictor", 2000.0, 500.0, "PREDICTION_TASK", Direction::Up, EdgeKind::Module)
        .edge("Predictor", "DataStorage", 1000.0, 100.0, "PREDICTION_RESULT", Direction::Up, EdgeKind::Module)
        .edge("DataStorage", "DisplayModule", 500.0, 50.0, "DISPLAY_RESULT", Direction::Up, EdgeKind::Module)
        .edge("DisplayModule", "DisplayActuatorModule", 100.0, 20.0, "DISPLAY_RESULT_FINAL", Direction::Up, EdgeKind::Module)
        .edge("DisplayActuatorModule", "actuator", 10.0, 5.0, "ACTUATOR_TRIGGER", Direction::Down, EdgeKind::Actuator)
        .tuple_mapping("Predictor", "PREDICTION_TASK", "PREDICTION_RESULT", 1.0)?
        .tuple_mapping("DataStorage", "PREDICTION_RESULT", "DISPLAY_RESULT", 1.0)?
        .tuple_mapping("DisplayModule", "DISPLAY_RESULT", "DISPLAY_RESULT_FINAL", 1.0)?
        .tuple_mapping("DisplayActuatorModule", "DISPLAY_RESULT_FINAL", "ACTUATOR_TRIGGER", 1.0)?
        .loops(vec![AppLoop::new([
            "SensorReader",
            "Predictor",
            "DataStorage",
            "DisplayModule",
        ])])
        .build();

    let mut builder = FogModelBuilder::new(app, topo.freeze())
        .map_module("SensorReader", "mobile")
        .map_module("Predictor", "edge")
        .map_module("DataStorage", "cloud")
        .map_module("DisplayModule", "cloud")
        .map_module("DisplayActuatorModule", "mobile");

    for (sensor, stream) in streams {
        builder = builder.attach_sensor(
            SensorBinding::new(sensor, stream, mobile, 1.0)?
                .with_emission(EmissionDistribution::Deterministic { value: 1.0 }),
        )?;
    }

    let model = builder
        .attach_actuator(ActuatorBinding::new("actuator", "ACTUATOR_TRIGGER", mobile, 1.0)?)?
        .finalize()?;

    println!(
        "model `{}` validated: {} modules, {} edges, {} sensors, {} devices",
        model.application().app_id(),
        model.application().modules().len(),
        model.application().edges().len(),
        model.sensors().len(),
        model.topology().len(),
    );

    println!("\n{}", ModelConfig::from_model(&model).to_yaml()?);
    Ok(())
}
