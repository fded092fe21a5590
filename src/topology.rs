//! Device tree construction and traversal.
//!
//! A fog topology is a tree of tiered compute devices (cloud at the root,
//! edge gateways below it, mobiles at the leaves). Each device carries a
//! resource profile and a latency edge to its parent. The tree is built
//! mutably through [`TopologyBuilder`], then frozen into a read-only
//! [`Topology`] whose children index is derived once from the parent
//! back-references.
//!
//! # Example
//!
//! ```
//! use fogsim::topology::{DeviceProfile, TopologyBuilder};
//!
//! let mut builder = TopologyBuilder::new();
//! let cloud = builder.add_device("cloud", DeviceProfile::new(44800.0, 40000, 100.0, 10000.0)).unwrap();
//! let edge = builder.add_device("edge", DeviceProfile::new(2800.0, 4000, 100.0, 10000.0)).unwrap();
//! builder.set_parent(edge, Some(cloud), 100.0).unwrap();
//!
//! let topology = builder.freeze();
//! assert_eq!(topology.root_of(edge), Some(cloud));
//! assert_eq!(topology.children_of(cloud), &[edge]);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::types::{DeviceId, Latency, Mips};

/// Resource, billing, and power attributes of one device.
///
/// Billing (`rate_per_mips`) and power draw (`busy_power`/`idle_power`)
/// are carried for the external energy/cost model; the core only stores
/// and validates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Compute capacity in MIPS
    pub mips: Mips,
    /// Memory in MB
    pub ram: u64,
    /// Uplink bandwidth toward the parent
    pub uplink_bw: f64,
    /// Downlink bandwidth toward the children
    pub downlink_bw: f64,
    /// Distance from the root (root = 0)
    #[serde(default)]
    pub level: u32,
    /// Billing rate per unit of compute
    #[serde(default)]
    pub rate_per_mips: f64,
    /// Power draw while executing, in watts
    #[serde(default)]
    pub busy_power: f64,
    /// Power draw while idle, in watts
    #[serde(default)]
    pub idle_power: f64,
}

impl DeviceProfile {
    /// Creates a profile with the given capacity and bandwidth, level 0,
    /// and zeroed billing/power attributes.
    pub fn new(mips: Mips, ram: u64, uplink_bw: f64, downlink_bw: f64) -> Self {
        Self {
            mips,
            ram,
            uplink_bw,
            downlink_bw,
            level: 0,
            rate_per_mips: 0.0,
            busy_power: 0.0,
            idle_power: 0.0,
        }
    }

    /// Sets the tree level (distance from root).
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Sets the billing rate per unit compute.
    pub fn with_rate_per_mips(mut self, rate: f64) -> Self {
        self.rate_per_mips = rate;
        self
    }

    /// Sets busy and idle power draw.
    pub fn with_power(mut self, busy: f64, idle: f64) -> Self {
        self.busy_power = busy;
        self.idle_power = idle;
        self
    }

    fn check(&self, name: &str) -> Result<(), BuildError> {
        let fields: [(&'static str, f64); 4] = [
            ("mips", self.mips),
            ("uplink_bw", self.uplink_bw),
            ("downlink_bw", self.downlink_bw),
            ("rate_per_mips", self.rate_per_mips),
        ];
        for (field, value) in fields {
            if value < 0.0 || !value.is_finite() {
                return Err(BuildError::InvalidResource {
                    entity: name.to_string(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// One device in the tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Unique id within the topology
    pub id: DeviceId,
    /// Device name (unique within the topology)
    pub name: String,
    /// Resource/billing/power attributes
    pub profile: DeviceProfile,
    /// Parent device, `None` for a root
    pub parent: Option<DeviceId>,
    /// Network delay to the parent
    pub uplink_latency: Latency,
}

impl Device {
    /// Returns true if this device has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Mutable device-tree builder.
///
/// Devices may be inserted in any order; parent links are settable after
/// construction but must be finalized (via [`freeze`](Self::freeze))
/// before placement resolution. Ids come from a monotonic counter owned
/// by the builder.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    devices: Vec<Device>,
    by_name: HashMap<String, usize>,
    next_id: DeviceId,
}

impl TopologyBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device with a fresh unique id and no parent.
    ///
    /// Fails with [`BuildError::InvalidResource`] if any capacity or
    /// bandwidth in the profile is negative, and with
    /// [`BuildError::DuplicateName`] if the name is taken.
    pub fn add_device(
        &mut self,
        name: impl Into<String>,
        profile: DeviceProfile,
    ) -> Result<DeviceId, BuildError> {
        let name = name.into();
        profile.check(&name)?;
        if self.by_name.contains_key(&name) {
            return Err(BuildError::DuplicateName {
                name,
                existing: "device",
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.by_name.insert(name.clone(), self.devices.len());
        self.devices.push(Device {
            id,
            name,
            profile,
            parent: None,
            uplink_latency: 0.0,
        });
        tracing::debug!(id, "added device");
        Ok(id)
    }

    /// Sets (or clears) the parent of a device along with the uplink latency.
    ///
    /// Fails with [`BuildError::Cycle`] if the link would close a cycle.
    /// The check walks ancestors from the proposed parent and must reach a
    /// root within `device count` steps.
    pub fn set_parent(
        &mut self,
        child: DeviceId,
        parent: Option<DeviceId>,
        uplink_latency: Latency,
    ) -> Result<(), BuildError> {
        if uplink_latency < 0.0 || !uplink_latency.is_finite() {
            let name = self.device(child)?.name.clone();
            return Err(BuildError::InvalidResource {
                entity: name,
                field: "uplink_latency",
                value: uplink_latency,
            });
        }
        let child_idx = self.index_of(child)?;

        if let Some(parent_id) = parent {
            self.index_of(parent_id)?;
            // Walk up from the proposed parent; meeting `child` means the
            // new link would close a cycle. Bounded by the device count so
            // a pre-existing malformed chain cannot loop forever.
            let mut cursor = Some(parent_id);
            for _ in 0..=self.devices.len() {
                match cursor {
                    Some(id) if id == child => {
                        return Err(BuildError::Cycle {
                            child,
                            parent: parent_id,
                        });
                    }
                    Some(id) => cursor = self.device(id)?.parent,
                    None => break,
                }
            }
        }

        let device = &mut self.devices[child_idx];
        device.parent = parent;
        device.uplink_latency = uplink_latency;
        Ok(())
    }

    /// Looks up a device by id.
    pub fn device(&self, id: DeviceId) -> Result<&Device, BuildError> {
        self.devices
            .iter()
            .find(|d| d.id == id)
            .ok_or(BuildError::UnknownDeviceId { id })
    }

    /// Looks up a device id by name.
    pub fn device_id(&self, name: &str) -> Option<DeviceId> {
        self.by_name.get(name).map(|&i| self.devices[i].id)
    }

    /// Returns the number of devices added so far.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if no device has been added.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn index_of(&self, id: DeviceId) -> Result<usize, BuildError> {
        self.devices
            .iter()
            .position(|d| d.id == id)
            .ok_or(BuildError::UnknownDeviceId { id })
    }

    /// Freezes the tree into a read-only [`Topology`].
    ///
    /// The children index is derived here, once, by scanning parent ids.
    pub fn freeze(self) -> Topology {
        let mut children: HashMap<DeviceId, Vec<DeviceId>> = HashMap::new();
        for device in &self.devices {
            if let Some(parent) = device.parent {
                children.entry(parent).or_default().push(device.id);
            }
        }
        Topology {
            devices: self.devices,
            by_name: self.by_name,
            children,
        }
    }
}

/// Read-only, frozen device tree.
///
/// Exposes the tree traversal the execution engine needs: children,
/// ancestors, and root lookup. No mutation API exists once frozen.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    devices: Vec<Device>,
    by_name: HashMap<String, usize>,
    children: HashMap<DeviceId, Vec<DeviceId>>,
}

impl Topology {
    /// Returns all devices in insertion order.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Looks up a device by id.
    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Looks up a device by name.
    pub fn by_name(&self, name: &str) -> Option<&Device> {
        self.by_name.get(name).map(|&i| &self.devices[i])
    }

    /// Returns true if a device with the given name exists.
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns the number of devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if the topology holds no devices.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns the direct children of a device, in insertion order.
    pub fn children_of(&self, id: DeviceId) -> &[DeviceId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the ancestors of a device, nearest first.
    ///
    /// The walk is bounded by the device count, so a malformed parent
    /// chain cannot loop forever.
    pub fn ancestors_of(&self, id: DeviceId) -> Vec<DeviceId> {
        let mut ancestors = Vec::new();
        let mut cursor = self.get(id).and_then(|d| d.parent);
        while let Some(parent) = cursor {
            if ancestors.len() >= self.devices.len() {
                break;
            }
            ancestors.push(parent);
            cursor = self.get(parent).and_then(|d| d.parent);
        }
        ancestors
    }

    /// Returns the root of the subtree containing the device.
    ///
    /// A device with no parent is its own root.
    pub fn root_of(&self, id: DeviceId) -> Option<DeviceId> {
        let mut current = self.get(id)?.id;
        for _ in 0..self.devices.len() {
            match self.get(current).and_then(|d| d.parent) {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DeviceProfile {
        DeviceProfile::new(1000.0, 1000, 100.0, 270.0)
    }

    #[test]
    fn test_add_device_assigns_fresh_ids() {
        let mut builder = TopologyBuilder::new();
        let a = builder.add_device("a", profile()).unwrap();
        let b = builder.add_device("b", profile()).unwrap();
        assert_ne!(a, b);
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let mut builder = TopologyBuilder::new();
        let bad = DeviceProfile::new(-1.0, 1000, 100.0, 270.0);
        let err = builder.add_device("bad", bad).unwrap_err();
        assert!(matches!(err, BuildError::InvalidResource { field: "mips", .. }));
    }

    #[test]
    fn test_negative_bandwidth_rejected() {
        let mut builder = TopologyBuilder::new();
        let bad = DeviceProfile::new(1.0, 1000, 100.0, -270.0);
        let err = builder.add_device("bad", bad).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidResource {
                field: "downlink_bw",
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_device_name_rejected() {
        let mut builder = TopologyBuilder::new();
        builder.add_device("cloud", profile()).unwrap();
        let err = builder.add_device("cloud", profile()).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateName { .. }));
    }

    #[test]
    fn test_negative_uplink_latency_rejected() {
        let mut builder = TopologyBuilder::new();
        let a = builder.add_device("a", profile()).unwrap();
        let b = builder.add_device("b", profile()).unwrap();
        let err = builder.set_parent(b, Some(a), -1.0).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidResource {
                field: "uplink_latency",
                ..
            }
        ));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let mut builder = TopologyBuilder::new();
        let a = builder.add_device("a", profile()).unwrap();
        let err = builder.set_parent(a, Some(a), 0.0).unwrap_err();
        assert!(matches!(err, BuildError::Cycle { .. }));
    }

    #[test]
    fn test_two_node_cycle_rejected() {
        let mut builder = TopologyBuilder::new();
        let a = builder.add_device("a", profile()).unwrap();
        let b = builder.add_device("b", profile()).unwrap();
        builder.set_parent(b, Some(a), 1.0).unwrap();
        let err = builder.set_parent(a, Some(b), 1.0).unwrap_err();
        assert_eq!(err, BuildError::Cycle { child: a, parent: b });
    }

    #[test]
    fn test_reparenting_allowed() {
        let mut builder = TopologyBuilder::new();
        let a = builder.add_device("a", profile()).unwrap();
        let b = builder.add_device("b", profile()).unwrap();
        let c = builder.add_device("c", profile()).unwrap();
        builder.set_parent(c, Some(a), 1.0).unwrap();
        builder.set_parent(c, Some(b), 2.0).unwrap();

        let topology = builder.freeze();
        assert_eq!(topology.get(c).unwrap().parent, Some(b));
        assert_eq!(topology.get(c).unwrap().uplink_latency, 2.0);
        assert!(topology.children_of(a).is_empty());
        assert_eq!(topology.children_of(b), &[c]);
    }

    #[test]
    fn test_chain_traversal() {
        // cloud -> edge -> mobile, as in a three-tier deployment
        let mut builder = TopologyBuilder::new();
        let cloud = builder.add_device("cloud", profile()).unwrap();
        let edge = builder.add_device("edge", profile().with_level(1)).unwrap();
        let mobile = builder
            .add_device("mobile", profile().with_level(2))
            .unwrap();
        builder.set_parent(edge, Some(cloud), 100.0).unwrap();
        builder.set_parent(mobile, Some(edge), 50.0).unwrap();

        let topology = builder.freeze();
        assert_eq!(topology.ancestors_of(mobile), vec![edge, cloud]);
        assert_eq!(topology.root_of(mobile), Some(cloud));
        assert_eq!(topology.root_of(cloud), Some(cloud));
        assert!(topology.ancestors_of(cloud).is_empty());
        assert_eq!(topology.children_of(cloud), &[edge]);
    }

    #[test]
    fn test_insertion_order_independent() {
        // Children added before their parent; links set afterwards.
        let mut builder = TopologyBuilder::new();
        let mobile = builder.add_device("mobile", profile()).unwrap();
        let edge = builder.add_device("edge", profile()).unwrap();
        let cloud = builder.add_device("cloud", profile()).unwrap();
        builder.set_parent(mobile, Some(edge), 50.0).unwrap();
        builder.set_parent(edge, Some(cloud), 100.0).unwrap();

        let topology = builder.freeze();
        assert_eq!(topology.ancestors_of(mobile), vec![edge, cloud]);
        assert_eq!(topology.root_of(mobile), Some(cloud));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut builder = TopologyBuilder::new();
        let cloud = builder.add_device("cloud", profile()).unwrap();
        let topology = builder.freeze();

        assert_eq!(topology.by_name("cloud").unwrap().id, cloud);
        assert!(topology.contains_name("cloud"));
        assert!(!topology.contains_name("edge"));
        assert!(topology.by_name("edge").is_none());
    }
}
