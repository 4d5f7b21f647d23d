/*!
`Ev` is the single event type shared by wire events (`Ctl`, `Pc`, `Noff`,
`Non`, `Kat`, `Cat`, `Bend`) and canonical, context-free events (`Xctl`,
`Xpc`, `Nrpn`, `Rpn`), plus the two meta events (`Tempo`, `TimeSig`) and the
end-of-track sentinel (`Nil`). Keeping one small `Copy` struct for all of
these, with `v0`/`v1` reinterpreted per kind, mirrors the original `struct
ev` and keeps `Track`/`SeqEv` free of an enum-per-kind payload that would
otherwise dominate their size.
!*/

use std::fmt;

/// Sentinel meaning "value not known" for a controller/context value.
/// Distinct from any legal 7-bit or 14-bit value. Stays `u16` since every
/// caller outside `Ev` itself (`StateList`, `ControllerRegistry`) works in
/// that 14-bit space; only `Ev.v0`/`v1` are widened to `u32` for `Tempo`,
/// so those few sites cast it up with `UNDEF as u32`.
pub const UNDEF: u16 = 0xFFFF;

/// Default note-off velocity used when the wire doesn't supply one.
pub const NOFF_DEFAULT_VEL: u16 = 100;

/// Default pitch-bend value (centered).
pub const BEND_DEFAULT: u16 = 0x2000;

/// Default channel-aftertouch value.
pub const CAT_DEFAULT: u16 = 0;

/// Closed enumeration of event kinds. `Nil` is the end-of-track sentinel;
/// `Tempo`/`TimeSig` are meta events; `Nrpn`/`Rpn`/`Xctl`/`Xpc` are
/// canonical (context-free) voice events; the rest are wire voice events.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum EvKind {
    /// End-of-track sentinel. Never appears except as the track's tail.
    Nil = 0,
    /// Tempo change, microseconds per 24th note in `v0`.
    Tempo = 2,
    /// Time signature change, beats in `v0`, ticks-per-beat in `v1`.
    TimeSig = 3,
    /// Canonical NRPN + data entry: `v0` = rpn number, `v1` = value.
    Nrpn = 4,
    /// Canonical RPN + data entry: `v0` = rpn number, `v1` = value.
    Rpn = 5,
    /// Canonical 14-bit controller: `v0` = controller number, `v1` = value.
    Xctl = 6,
    /// Canonical program change with bank: `v0` = bank, `v1` = program.
    Xpc = 7,
    /// Wire note-off: `v0` = note number, `v1` = velocity.
    Noff = 8,
    /// Wire note-on: `v0` = note number, `v1` = velocity.
    Non = 9,
    /// Wire key aftertouch: `v0` = note number, `v1` = pressure.
    Kat = 10,
    /// Wire controller change: `v0` = controller number, `v1` = value.
    Ctl = 11,
    /// Wire program change: `v0` = program.
    Pc = 12,
    /// Wire channel aftertouch: `v0` = pressure.
    Cat = 13,
    /// Wire pitch bend: `v0` = 14-bit value.
    Bend = 14,
}

impl EvKind {
    /// True for the canonical, context-free voice events.
    pub fn is_canonical(self) -> bool {
        matches!(self, EvKind::Nrpn | EvKind::Rpn | EvKind::Xctl | EvKind::Xpc)
    }

    /// True for raw wire voice events.
    pub fn is_wire_voice(self) -> bool {
        matches!(
            self,
            EvKind::Noff
                | EvKind::Non
                | EvKind::Kat
                | EvKind::Ctl
                | EvKind::Pc
                | EvKind::Cat
                | EvKind::Bend
        )
    }

    /// True for the two meta-track events.
    pub fn is_meta(self) -> bool {
        matches!(self, EvKind::Tempo | EvKind::TimeSig)
    }

    /// True for the three note-lifecycle events.
    pub fn is_note(self) -> bool {
        matches!(self, EvKind::Non | EvKind::Noff | EvKind::Kat)
    }
}

/// Bitmask classification of an event's role inside a frame. See
/// `Ev::phase`.
pub mod phase {
    /// The event can open a frame.
    pub const FIRST: u8 = 1;
    /// The event can continue an already-open frame.
    pub const NEXT: u8 = 2;
    /// The event can close a frame.
    pub const LAST: u8 = 4;
}

/// A single event: either a wire MIDI message, a canonical context-free
/// event, a meta event, or the end-of-track sentinel. `device`/`channel`
/// are meaningless for `Nil`/`Tempo`/`TimeSig` and are left at `0`. `v0`/
/// `v1` are full `u32`s, matching the original's `unsigned v0, v1` --
/// every event kind here carries at most a 14-bit payload except `Tempo`,
/// which needs the full width for slow tempos (microseconds per 24th
/// note comfortably exceeds `u16::MAX` below roughly 38 BPM).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Ev {
    pub kind: EvKind,
    pub device: u8,
    pub channel: u8,
    pub v0: u32,
    pub v1: u32,
}

impl Ev {
    /// The end-of-track sentinel event.
    pub fn nil() -> Self {
        Ev {
            kind: EvKind::Nil,
            device: 0,
            channel: 0,
            v0: UNDEF as u32,
            v1: UNDEF as u32,
        }
    }

    pub fn tempo(usec_per_24th: u32) -> Self {
        Ev {
            kind: EvKind::Tempo,
            device: 0,
            channel: 0,
            v0: usec_per_24th,
            v1: UNDEF as u32,
        }
    }

    pub fn timesig(beats: u8, ticks_per_beat: u16) -> Self {
        Ev {
            kind: EvKind::TimeSig,
            device: 0,
            channel: 0,
            v0: beats as u32,
            v1: ticks_per_beat as u32,
        }
    }

    pub fn note_on(device: u8, channel: u8, note: u8, vel: u8) -> Self {
        Ev {
            kind: EvKind::Non,
            device,
            channel,
            v0: note as u32,
            v1: vel as u32,
        }
    }

    pub fn note_off(device: u8, channel: u8, note: u8, vel: u8) -> Self {
        Ev {
            kind: EvKind::Noff,
            device,
            channel,
            v0: note as u32,
            v1: vel as u32,
        }
    }

    pub fn key_aftertouch(device: u8, channel: u8, note: u8, pressure: u8) -> Self {
        Ev {
            kind: EvKind::Kat,
            device,
            channel,
            v0: note as u32,
            v1: pressure as u32,
        }
    }

    pub fn ctl(device: u8, channel: u8, num: u8, val: u8) -> Self {
        Ev {
            kind: EvKind::Ctl,
            device,
            channel,
            v0: num as u32,
            v1: val as u32,
        }
    }

    pub fn pc(device: u8, channel: u8, prog: u8) -> Self {
        Ev {
            kind: EvKind::Pc,
            device,
            channel,
            v0: prog as u32,
            v1: UNDEF as u32,
        }
    }

    pub fn channel_aftertouch(device: u8, channel: u8, pressure: u8) -> Self {
        Ev {
            kind: EvKind::Cat,
            device,
            channel,
            v0: pressure as u32,
            v1: UNDEF as u32,
        }
    }

    pub fn bend(device: u8, channel: u8, value: u16) -> Self {
        Ev {
            kind: EvKind::Bend,
            device,
            channel,
            v0: value as u32,
            v1: UNDEF as u32,
        }
    }

    pub fn xctl(device: u8, channel: u8, num: u8, val: u16) -> Self {
        Ev {
            kind: EvKind::Xctl,
            device,
            channel,
            v0: num as u32,
            v1: val as u32,
        }
    }

    pub fn xpc(device: u8, channel: u8, bank: u16, prog: u8) -> Self {
        Ev {
            kind: EvKind::Xpc,
            device,
            channel,
            v0: bank as u32,
            v1: prog as u32,
        }
    }

    pub fn nrpn(device: u8, channel: u8, num: u16, val: u16) -> Self {
        Ev {
            kind: EvKind::Nrpn,
            device,
            channel,
            v0: num as u32,
            v1: val as u32,
        }
    }

    pub fn rpn(device: u8, channel: u8, num: u16, val: u16) -> Self {
        Ev {
            kind: EvKind::Rpn,
            device,
            channel,
            v0: num as u32,
            v1: val as u32,
        }
    }

    // -- field accessors, named the way the original's cmd-specific
    // macros (note_num, ctl_num, pc_bank, ...) named the same v0/v1 slots.

    pub fn note_num(&self) -> u8 {
        self.v0 as u8
    }
    pub fn note_vel(&self) -> u8 {
        self.v1 as u8
    }
    pub fn ctl_num(&self) -> u8 {
        self.v0 as u8
    }
    pub fn ctl_val(&self) -> u16 {
        self.v1 as u16
    }
    pub fn pc_prog(&self) -> u8 {
        match self.kind {
            EvKind::Xpc => self.v1 as u8,
            _ => self.v0 as u8,
        }
    }
    pub fn pc_bank(&self) -> u16 {
        self.v0 as u16
    }
    pub fn cat_val(&self) -> u16 {
        self.v0 as u16
    }
    pub fn bend_val(&self) -> u16 {
        self.v0 as u16
    }
    pub fn rpn_num(&self) -> u16 {
        self.v0 as u16
    }
    pub fn rpn_val(&self) -> u16 {
        self.v1 as u16
    }
    /// Microseconds per 24th note. Unlike every other accessor here, this
    /// one is not narrowed back down to 14 bits -- tempo is the one event
    /// kind whose payload can legitimately exceed that range.
    pub fn tempo_usec24(&self) -> u32 {
        self.v0
    }
    pub fn timesig_beats(&self) -> u8 {
        self.v0 as u8
    }
    pub fn timesig_ticks(&self) -> u16 {
        self.v1 as u16
    }

    /// True if device and channel match between two voice events.
    pub fn same_chan(&self, other: &Ev) -> bool {
        self.device == other.device && self.channel == other.channel
    }
}

impl fmt::Display for Ev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EvKind::Nil => write!(f, "nil"),
            EvKind::Tempo => write!(f, "tempo {}", self.tempo_usec24()),
            EvKind::TimeSig => write!(
                f,
                "timesig {}/{}",
                self.timesig_beats(),
                self.timesig_ticks()
            ),
            _ => write!(
                f,
                "{:?} {{{} {}}} {} {}",
                self.kind, self.device, self.channel, self.v0, self.v1
            ),
        }
    }
}

/// Default note-off velocity, RPN/NRPN pitch-bend-range reset value, and
/// the other "what value does a frame controller rest at" facts needed by
/// `phase`.
pub fn is_default_for_frame_kind(kind: EvKind, value: u16) -> bool {
    match kind {
        EvKind::Cat => value == CAT_DEFAULT,
        EvKind::Bend => value == BEND_DEFAULT,
        _ => false,
    }
}

/// Classify an event's phase within a frame (spec §4.2). `ctl_is_frame`
/// must answer "is this XCTL's controller number a frame controller (has a
/// default other than UNDEF)?"; it is threaded in rather than looked up
/// globally so this function stays free of any registry dependency.
pub fn phase_of(ev: &Ev, ctl_default: Option<u16>) -> u8 {
    use phase::*;
    match ev.kind {
        EvKind::Non => FIRST,
        EvKind::Noff => LAST,
        EvKind::Kat => NEXT,
        EvKind::Cat => {
            if ev.cat_val() != CAT_DEFAULT {
                FIRST | NEXT
            } else {
                LAST
            }
        }
        EvKind::Bend => {
            if ev.bend_val() != BEND_DEFAULT {
                FIRST | NEXT
            } else {
                LAST
            }
        }
        EvKind::Xctl => match ctl_default {
            None => FIRST | LAST,
            Some(default) => {
                if ev.ctl_val() != default {
                    FIRST | NEXT
                } else {
                    LAST
                }
            }
        },
        _ => FIRST | LAST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_is_first_only() {
        let ev = Ev::note_on(0, 0, 60, 100);
        assert_eq!(phase_of(&ev, None), phase::FIRST);
    }

    #[test]
    fn note_off_is_last_only() {
        let ev = Ev::note_off(0, 0, 60, 64);
        assert_eq!(phase_of(&ev, None), phase::LAST);
    }

    #[test]
    fn bend_at_center_is_last() {
        let ev = Ev::bend(0, 0, BEND_DEFAULT);
        assert_eq!(phase_of(&ev, None), phase::LAST);
    }

    #[test]
    fn bend_off_center_is_first_and_next() {
        let ev = Ev::bend(0, 0, 0x3000);
        assert_eq!(phase_of(&ev, None), phase::FIRST | phase::NEXT);
    }

    #[test]
    fn xctl_parametric_is_single_event_frame() {
        let ev = Ev::xctl(0, 0, 7, 42);
        assert_eq!(phase_of(&ev, None), phase::FIRST | phase::LAST);
    }

    #[test]
    fn xctl_frame_at_default_closes() {
        let ev = Ev::xctl(0, 0, 64, 0);
        assert_eq!(phase_of(&ev, Some(0)), phase::LAST);
    }

    #[test]
    fn xctl_frame_off_default_opens() {
        let ev = Ev::xctl(0, 0, 64, 127);
        assert_eq!(phase_of(&ev, Some(0)), phase::FIRST | phase::NEXT);
    }

    #[test]
    fn nil_sentinel_has_undef_payload() {
        let ev = Ev::nil();
        assert_eq!(ev.kind, EvKind::Nil);
        assert_eq!(ev.v0, UNDEF as u32);
    }

    #[test]
    fn slow_tempo_survives_round_trip() {
        // 100_000 us/24th is ~25 BPM, well inside musically normal range,
        // and already past u16::MAX.
        let ev = Ev::tempo(100_000);
        assert_eq!(ev.tempo_usec24(), 100_000);
    }
}
