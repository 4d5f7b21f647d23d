/*!
The controller registry: a fixed 128-entry table describing, for each MIDI
controller number, its symbolic name (if any) and default "rest" value. A
controller with no default is *parametric* -- its exact value must always
be emitted, since there is no implicit value to fall back to. A controller
with a default is a *frame* controller -- it participates in phase
classification (§4.2) because returning to its default value closes a
frame.

Names are reference-counted (`Rc<str>`), matching the original's
string-pool note in spec.md §5 ("The controller name strings are owned by
the registry and reference-counted"). The crate is single-threaded (§5),
so `Rc` rather than `Arc` is the right choice -- no atomic overhead for
something that's never shared across threads.
!*/

use crate::event::UNDEF;
use std::rc::Rc;

/// High byte of bank select.
pub const BANK_HI: u8 = 0;
/// Low byte of bank select.
pub const BANK_LO: u8 = 32;
/// High byte of data entry.
pub const DATAENT_HI: u8 = 6;
/// Low byte of data entry.
pub const DATAENT_LO: u8 = 38;
/// Low byte of RPN select.
pub const RPN_LO: u8 = 100;
/// High byte of RPN select.
pub const RPN_HI: u8 = 101;
/// Low byte of NRPN select.
pub const NRPN_LO: u8 = 98;
/// High byte of NRPN select.
pub const NRPN_HI: u8 = 99;

/// True if `num` never carries user-defined controller meaning: bank
/// select, RPN/NRPN select, data entry, or any fine-controller low-byte
/// companion (32..64). Mirrors `evctl_isreserved`.
pub fn is_reserved(num: u8) -> bool {
    num == BANK_HI
        || num == DATAENT_HI
        || (32..64).contains(&num)
        || num == RPN_HI
        || num == RPN_LO
        || num == NRPN_HI
        || num == NRPN_LO
}

#[derive(Clone, Debug, Default)]
struct ControllerEntry {
    name: Option<Rc<str>>,
    default: u16,
}

/// The 128-entry controller metadata table.
#[derive(Debug)]
pub struct ControllerRegistry {
    table: Vec<ControllerEntry>,
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerRegistry {
    /// A registry with every controller unconfigured (no name, parametric).
    pub fn new() -> Self {
        ControllerRegistry {
            table: vec![
                ControllerEntry {
                    name: None,
                    default: UNDEF
                };
                128
            ],
        }
    }

    /// Configure a controller's symbolic name (optional) and default
    /// value. Passing `UNDEF` as the default makes the controller
    /// parametric.
    pub fn configure(&mut self, num: u8, name: Option<&str>, default: u16) {
        let entry = &mut self.table[num as usize];
        if let Some(name) = name {
            entry.name = Some(Rc::from(name));
        }
        entry.default = default;
    }

    /// Clear a controller's name and reset its default to `UNDEF`
    /// (parametric).
    pub fn unconfigure(&mut self, num: u8) {
        let entry = &mut self.table[num as usize];
        entry.name = None;
        entry.default = UNDEF;
    }

    /// Find a controller number by its configured name.
    pub fn lookup_by_name(&self, name: &str) -> Option<u8> {
        self.table
            .iter()
            .position(|e| e.name.as_deref() == Some(name))
            .map(|i| i as u8)
    }

    /// The controller's configured name, if any.
    pub fn name(&self, num: u8) -> Option<&str> {
        self.table[num as usize].name.as_deref()
    }

    /// The controller's default value, or `UNDEF` if parametric.
    pub fn default_value(&self, num: u8) -> u16 {
        self.table[num as usize].default
    }

    /// A controller is parametric iff its default is `UNDEF`: its exact
    /// value must always be emitted, there is no implicit rest state.
    pub fn is_parametric(&self, num: u8) -> bool {
        self.default_value(num) == UNDEF
    }

    /// A controller is a frame controller iff it has a default value.
    pub fn is_frame(&self, num: u8) -> bool {
        !self.is_parametric(num)
    }
}

/// A per-device bitmap of which controller numbers 0..32 are fine
/// (14-bit, paired with number+32 as the low byte). Corresponds to the
/// `xctlset` bitmap threaded through `conv_packev`/`conv_unpackev` in the
/// original.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FineControllerSet(u32);

impl FineControllerSet {
    pub fn new() -> Self {
        FineControllerSet(0)
    }

    /// Mark controller `num` (must be < 32) as fine or coarse.
    pub fn set_fine(&mut self, num: u8, fine: bool) {
        debug_assert!(num < 32, "fine-controller bitmap only covers 0..32");
        if fine {
            self.0 |= 1 << num;
        } else {
            self.0 &= !(1 << num);
        }
    }

    /// True iff controller `num` (expected < 32) is configured fine.
    pub fn is_fine(&self, num: u8) -> bool {
        num < 32 && (self.0 & (1 << num)) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_controllers_cover_spec_list() {
        for n in [0u8, 32, 6, 38, 101, 100, 99, 98] {
            assert!(is_reserved(n), "{n} should be reserved");
        }
        for n in 32u8..64 {
            assert!(is_reserved(n));
        }
        assert!(!is_reserved(1));
        assert!(!is_reserved(7));
        assert!(!is_reserved(64));
    }

    #[test]
    fn fresh_registry_is_fully_parametric() {
        let reg = ControllerRegistry::new();
        assert!(reg.is_parametric(7));
        assert!(!reg.is_frame(7));
    }

    #[test]
    fn configure_then_unconfigure_round_trips() {
        let mut reg = ControllerRegistry::new();
        reg.configure(1, Some("mod"), 0);
        assert_eq!(reg.name(1), Some("mod"));
        assert!(reg.is_frame(1));
        assert_eq!(reg.lookup_by_name("mod"), Some(1));

        reg.unconfigure(1);
        assert_eq!(reg.name(1), None);
        assert!(reg.is_parametric(1));
        assert_eq!(reg.lookup_by_name("mod"), None);
    }

    #[test]
    fn fine_controller_set_tracks_bits() {
        let mut set = FineControllerSet::new();
        assert!(!set.is_fine(1));
        set.set_fine(1, true);
        assert!(set.is_fine(1));
        set.set_fine(1, false);
        assert!(!set.is_fine(1));
    }
}
