//! Sensor and actuator bindings.
//!
//! A binding attaches an external data source or sink to the model: it
//! names the entity, the tuple type it emits or consumes, the gateway
//! device it hangs off, and the network latency of that last hop. The
//! tuple-type/edge match is deliberately *not* checked at attachment time
//! so that attachment order is unconstrained; validation performs that
//! check over the finished model.

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::types::{DeviceId, Latency, TupleType};

/// Transmit-time distribution of a sensor.
///
/// The core does not simulate emission; the descriptor is carried for the
/// external data-generation collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionDistribution {
    /// Fixed inter-arrival time
    Deterministic {
        /// The fixed interval
        value: f64,
    },
    /// Uniformly distributed inter-arrival time
    Uniform {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Normally distributed inter-arrival time
    Normal {
        /// Mean interval
        mean: f64,
        /// Standard deviation
        std_dev: f64,
    },
}

/// Attachment of an external sensor to a gateway device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorBinding {
    /// Sensor name (unique among modules, sensors, and actuators)
    pub name: String,
    /// Tuple type the sensor emits
    pub tuple_type: TupleType,
    /// Gateway device the sensor hangs off
    pub gateway: DeviceId,
    /// Network latency of the sensor-to-gateway hop
    pub latency: Latency,
    /// Optional emission distribution for the data-generation collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission: Option<EmissionDistribution>,
}

impl SensorBinding {
    /// Creates a binding; fails if the latency is negative.
    pub fn new(
        name: impl Into<String>,
        tuple_type: impl Into<TupleType>,
        gateway: DeviceId,
        latency: Latency,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        check_latency(&name, latency)?;
        Ok(Self {
            name,
            tuple_type: tuple_type.into(),
            gateway,
            latency,
            emission: None,
        })
    }

    /// Sets the emission distribution.
    pub fn with_emission(mut self, emission: EmissionDistribution) -> Self {
        self.emission = Some(emission);
        self
    }
}

/// Attachment of an external actuator to a gateway device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActuatorBinding {
    /// Actuator name (unique among modules, sensors, and actuators)
    pub name: String,
    /// Tuple type that drives the actuator
    pub tuple_type: TupleType,
    /// Gateway device the actuator hangs off
    pub gateway: DeviceId,
    /// Network latency of the gateway-to-actuator hop
    pub latency: Latency,
}

impl ActuatorBinding {
    /// Creates a binding; fails if the latency is negative.
    pub fn new(
        name: impl Into<String>,
        tuple_type: impl Into<TupleType>,
        gateway: DeviceId,
        latency: Latency,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        check_latency(&name, latency)?;
        Ok(Self {
            name,
            tuple_type: tuple_type.into(),
            gateway,
            latency,
        })
    }
}

fn check_latency(binding: &str, latency: Latency) -> Result<(), BuildError> {
    if latency < 0.0 || !latency.is_finite() {
        return Err(BuildError::NegativeLatency {
            binding: binding.to_string(),
            latency,
        });
    }
    Ok(())
}
