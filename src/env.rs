/*!
`Environment` replaces the process-global controller registry and event
pool the original keeps as process-scoped singletons (§9 design notes:
"abstract as an explicit `Environment` handle passed to every core
operation; tests can instantiate independent environments"). Each
`Environment` owns one `ControllerRegistry` and one `FineControllerSet`
per device; nothing here is shared across threads or instances.
!*/

use crate::registry::{ControllerRegistry, FineControllerSet};

/// How many output devices an `Environment` tracks fine-controller
/// configuration for. Mirrors `DEFAULT_MAXNDEVS` in the original.
pub const MAX_DEVICES: usize = 16;

/// The construction-time handle bundling everything the converter and
/// frame operations need about controller semantics: the registry of
/// names/defaults, and which controllers are configured fine per device.
pub struct Environment {
    registry: ControllerRegistry,
    fine_by_device: Vec<FineControllerSet>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// A fresh environment: every controller unconfigured, no fine
    /// controllers on any device.
    pub fn new() -> Self {
        Environment {
            registry: ControllerRegistry::new(),
            fine_by_device: vec![FineControllerSet::new(); MAX_DEVICES],
        }
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ControllerRegistry {
        &mut self.registry
    }

    /// The fine-controller bitmap for `device`. Panics via `bug!` if
    /// `device` is out of range -- callers are expected to have validated
    /// device numbers against `MAX_DEVICES` already (see §6, the command
    /// interpreter's job).
    pub fn fine_controllers(&self, device: u8) -> &FineControllerSet {
        self.fine_by_device
            .get(device as usize)
            .unwrap_or_else(|| bug!("device {} out of range", device))
    }

    pub fn fine_controllers_mut(&mut self, device: u8) -> &mut FineControllerSet {
        if device as usize >= MAX_DEVICES {
            bug!("device {} out of range", device);
        }
        &mut self.fine_by_device[device as usize]
    }
}
