//! ManageDevices: registry of mounted HID interfaces.
//!
//! The USB host stack identifies each HID interface by a device address and
//! an interface instance.  The `DeviceRegistry` maps that pair to the state
//! the bridge keeps for it:
//!
//! - a keyboard owns its own [`ReportDiffer`], so two keyboards never see
//!   each other's retained report;
//! - a mouse keeps the button byte of its last report, used to detect newly
//!   pressed buttons for display.
//!
//! # Device lifecycle (for beginners)
//!
//! ```text
//! Mounted ──► reports flow ──► Unmounted
//!    │
//!    └─ protocol None: logged and ignored, never registered
//! ```
//!
//! Mounting a handle that is already registered replaces its state, which
//! also discards the retained keyboard report.

use std::collections::HashMap;
use std::fmt;

use hid_bridge_core::{InterfaceProtocol, Membership, ReportDiffer};
use tracing::{debug, info};

/// Identifies one HID interface on the USB bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    pub address: u8,
    pub instance: u8,
}

impl DeviceHandle {
    pub fn new(address: u8, instance: u8) -> Self {
        Self { address, instance }
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "address {}, instance {}", self.address, self.instance)
    }
}

/// Per-mouse display state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    pub previous_buttons: u8,
}

/// State kept for one mounted interface.
#[derive(Debug, Clone)]
pub enum DeviceState {
    Keyboard(ReportDiffer),
    Mouse(MouseState),
}

impl DeviceState {
    pub fn protocol(&self) -> InterfaceProtocol {
        match self {
            DeviceState::Keyboard(_) => InterfaceProtocol::Keyboard,
            DeviceState::Mouse(_) => InterfaceProtocol::Mouse,
        }
    }
}

/// In-memory registry of mounted keyboards and mice.
///
/// New keyboards get a differ configured with the registry's [`Membership`].
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<DeviceHandle, DeviceState>,
    membership: Membership,
}

impl DeviceRegistry {
    pub fn new(membership: Membership) -> Self {
        Self {
            devices: HashMap::new(),
            membership,
        }
    }

    /// Registers the interface behind `handle`.
    ///
    /// Returns `false` when `protocol` is [`InterfaceProtocol::None`]; such
    /// interfaces are logged and not tracked.
    pub fn mount(&mut self, handle: DeviceHandle, protocol: InterfaceProtocol) -> bool {
        let state = match protocol {
            InterfaceProtocol::Keyboard => {
                DeviceState::Keyboard(ReportDiffer::new().with_membership(self.membership))
            }
            InterfaceProtocol::Mouse => DeviceState::Mouse(MouseState::default()),
            InterfaceProtocol::None => {
                info!("device with {handle} is not a keyboard or mouse");
                return false;
            }
        };

        info!("device with {handle} is a {protocol}");
        if self.devices.insert(handle, state).is_some() {
            debug!("device with {handle} was already mounted; state reset");
        }
        true
    }

    /// Forgets the interface behind `handle`, returning its last state.
    pub fn unmount(&mut self, handle: DeviceHandle) -> Option<DeviceState> {
        let removed = self.devices.remove(&handle);
        match removed {
            Some(_) => info!("device with {handle} was unmounted"),
            None => debug!("unmount for unknown device with {handle}"),
        }
        removed
    }

    pub fn get(&self, handle: DeviceHandle) -> Option<&DeviceState> {
        self.devices.get(&handle)
    }

    pub fn get_mut(&mut self, handle: DeviceHandle) -> Option<&mut DeviceState> {
        self.devices.get_mut(&handle)
    }

    /// Number of registered interfaces.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hid_bridge_core::KeyboardReport;

    fn keyboard_differ(registry: &mut DeviceRegistry, handle: DeviceHandle) -> &mut ReportDiffer {
        match registry.get_mut(handle) {
            Some(DeviceState::Keyboard(differ)) => differ,
            other => panic!("expected keyboard state, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = DeviceRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.membership(), Membership::Presence);
    }

    #[test]
    fn test_mount_keyboard_registers_fresh_differ() {
        // Arrange
        let mut registry = DeviceRegistry::new(Membership::Counted);
        let handle = DeviceHandle::new(1, 0);

        // Act
        let registered = registry.mount(handle, InterfaceProtocol::Keyboard);

        // Assert
        assert!(registered);
        let differ = keyboard_differ(&mut registry, handle);
        assert_eq!(*differ.retained(), KeyboardReport::default());
        assert_eq!(differ.membership(), Membership::Counted);
    }

    #[test]
    fn test_mount_mouse_registers_mouse_state() {
        let mut registry = DeviceRegistry::default();
        let handle = DeviceHandle::new(2, 1);

        assert!(registry.mount(handle, InterfaceProtocol::Mouse));

        assert_eq!(
            registry.get(handle).map(DeviceState::protocol),
            Some(InterfaceProtocol::Mouse)
        );
    }

    #[test]
    fn test_mount_with_no_protocol_is_not_registered() {
        let mut registry = DeviceRegistry::default();
        let handle = DeviceHandle::new(3, 0);

        assert!(!registry.mount(handle, InterfaceProtocol::None));

        assert!(registry.get(handle).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remount_replaces_retained_report() {
        // Arrange
        let mut registry = DeviceRegistry::default();
        let handle = DeviceHandle::new(1, 0);
        registry.mount(handle, InterfaceProtocol::Keyboard);
        keyboard_differ(&mut registry, handle).observe(KeyboardReport::new(0, [0x04, 0, 0, 0, 0, 0]));

        // Act
        registry.mount(handle, InterfaceProtocol::Keyboard);

        // Assert
        assert_eq!(
            *keyboard_differ(&mut registry, handle).retained(),
            KeyboardReport::default()
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unmount_removes_device() {
        let mut registry = DeviceRegistry::default();
        let handle = DeviceHandle::new(1, 0);
        registry.mount(handle, InterfaceProtocol::Keyboard);

        let removed = registry.unmount(handle);

        assert!(matches!(removed, Some(DeviceState::Keyboard(_))));
        assert!(registry.get(handle).is_none());
    }

    #[test]
    fn test_unmount_unknown_device_is_noop() {
        let mut registry = DeviceRegistry::default();
        assert!(registry.unmount(DeviceHandle::new(9, 9)).is_none());
    }

    #[test]
    fn test_keyboards_on_different_instances_are_independent() {
        let mut registry = DeviceRegistry::default();
        let left = DeviceHandle::new(1, 0);
        let right = DeviceHandle::new(1, 1);
        registry.mount(left, InterfaceProtocol::Keyboard);
        registry.mount(right, InterfaceProtocol::Keyboard);
        let report = KeyboardReport::new(0, [0x04, 0, 0, 0, 0, 0]);

        keyboard_differ(&mut registry, left).observe(report);
        let events = keyboard_differ(&mut registry, right).observe(report);

        assert_eq!(events.len(), 1, "right keyboard must not see left's retained report");
    }

    #[test]
    fn test_device_handle_display() {
        assert_eq!(DeviceHandle::new(1, 2).to_string(), "address 1, instance 2");
    }
}
