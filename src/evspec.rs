/*!
`EvSpec` describes an inclusive range of events: a named class plus
device/channel/byte-range bounds. It answers one question, "does this
event fall within this range?" -- used by the (out-of-scope) command
interpreter to select events for an operation, and internally wherever a
frame operation needs to test "is this a note" or "is this any voice
event."

The named classes mirror `evspec_cmdstr` in the original `ev.c`; spec.md's
§4 only says `cmd` "may be `ANY`", this closed set is carried in from the
original source (see SPEC_FULL.md §B).
!*/

use crate::event::{Ev, EvKind};

/// Named event classes an `EvSpec` can restrict to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SpecKind {
    Any,
    Note,
    Ctl,
    Pc,
    Cat,
    Bend,
    Nrpn,
    Rpn,
    Xctl,
    Xpc,
}

impl SpecKind {
    fn matches(self, kind: EvKind) -> bool {
        match self {
            SpecKind::Any => true,
            SpecKind::Note => kind.is_note(),
            SpecKind::Ctl => kind == EvKind::Ctl,
            SpecKind::Pc => kind == EvKind::Pc,
            SpecKind::Cat => kind == EvKind::Cat,
            SpecKind::Bend => kind == EvKind::Bend,
            SpecKind::Nrpn => kind == EvKind::Nrpn,
            SpecKind::Rpn => kind == EvKind::Rpn,
            SpecKind::Xctl => kind == EvKind::Xctl,
            SpecKind::Xpc => kind == EvKind::Xpc,
        }
    }
}

/// The largest device number this crate recognizes.
pub const MAX_DEV: u16 = 15;
/// The largest channel number.
pub const MAX_CH: u16 = 15;
/// The largest plain (7-bit) byte value.
pub const MAX_COARSE: u16 = 0x7f;
/// The largest 14-bit value.
pub const MAX_FINE: u16 = 0x3fff;

/// An inclusive range-match predicate over events.
#[derive(Clone, Copy, Debug)]
pub struct EvSpec {
    pub cmd: SpecKind,
    pub dev_min: u16,
    pub dev_max: u16,
    pub ch_min: u16,
    pub ch_max: u16,
    pub b0_min: u16,
    pub b0_max: u16,
    pub b1_min: u16,
    pub b1_max: u16,
}

impl EvSpec {
    /// Matches every event on every device and channel. Mirrors
    /// `evspec_reset`.
    pub fn any() -> Self {
        EvSpec {
            cmd: SpecKind::Any,
            dev_min: 0,
            dev_max: MAX_DEV,
            ch_min: 0,
            ch_max: MAX_CH,
            b0_min: 0,
            b0_max: MAX_FINE,
            b1_min: 0,
            b1_max: MAX_FINE,
        }
    }

    /// Matches exactly one (device, channel) pair, any event class.
    pub fn for_chan(device: u8, channel: u8) -> Self {
        EvSpec {
            dev_min: device as u16,
            dev_max: device as u16,
            ch_min: channel as u16,
            ch_max: channel as u16,
            ..Self::any()
        }
    }

    /// True iff `ev` falls within this spec's every dimension.
    pub fn matches(&self, ev: &Ev) -> bool {
        if !self.cmd.matches(ev.kind) {
            return false;
        }
        let dev = ev.device as u16;
        let ch = ev.channel as u16;
        if dev < self.dev_min || dev > self.dev_max {
            return false;
        }
        if ch < self.ch_min || ch > self.ch_max {
            return false;
        }
        if ev.v0 != crate::event::UNDEF as u32
            && (ev.v0 < self.b0_min as u32 || ev.v0 > self.b0_max as u32)
        {
            return false;
        }
        if ev.v1 != crate::event::UNDEF as u32
            && (ev.v1 < self.b1_min as u32 || ev.v1 > self.b1_max as u32)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_everything() {
        let spec = EvSpec::any();
        assert!(spec.matches(&Ev::note_on(0, 0, 60, 100)));
        assert!(spec.matches(&Ev::ctl(3, 9, 7, 20)));
    }

    #[test]
    fn note_class_excludes_controllers() {
        let spec = EvSpec {
            cmd: SpecKind::Note,
            ..EvSpec::any()
        };
        assert!(spec.matches(&Ev::note_on(0, 0, 60, 100)));
        assert!(!spec.matches(&Ev::ctl(0, 0, 7, 20)));
    }

    #[test]
    fn channel_range_restricts_match() {
        let spec = EvSpec::for_chan(2, 5);
        assert!(spec.matches(&Ev::note_on(2, 5, 60, 100)));
        assert!(!spec.matches(&Ev::note_on(2, 6, 60, 100)));
        assert!(!spec.matches(&Ev::note_on(3, 5, 60, 100)));
    }
}
