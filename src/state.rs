/*!
`StateList` remembers the last-seen value of every (device, channel,
controller number) triple the packer/unpacker has observed. It backs the
bank-select / RPN / NRPN context tracking in `conv`: a data-entry byte only
means something once we know which RPN or NRPN number it belongs to, and
that number lives here, not in the event stream itself.

Grounded directly on `conv_setctl`/`conv_getctl`/`conv_rmctl`/`conv_getctx`
in the original `conv.c`. The original keeps these as a singly-linked list
of heap nodes; we keep a flat `Vec`, since the whole list is scanned
linearly on every lookup anyway and a handful of active controllers per
channel never makes the linear scan a real cost.
!*/

use crate::event::UNDEF;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct StateEntry {
    device: u8,
    channel: u8,
    ctl_num: u8,
    ctl_val: u16,
}

/// The set of controller values currently in effect, across every
/// (device, channel, controller number) observed so far.
#[derive(Clone, Debug, Default)]
pub struct StateList {
    entries: Vec<StateEntry>,
}

impl StateList {
    pub fn new() -> Self {
        StateList {
            entries: Vec::new(),
        }
    }

    fn find(&self, device: u8, channel: u8, num: u8) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.device == device && e.channel == channel && e.ctl_num == num)
    }

    /// Record (or update) the value of controller `num` on `(device,
    /// channel)`. Mirrors `conv_setctl`.
    pub fn set_ctl(&mut self, device: u8, channel: u8, num: u8, val: u16) {
        match self.find(device, channel, num) {
            Some(i) => self.entries[i].ctl_val = val,
            None => self.entries.push(StateEntry {
                device,
                channel,
                ctl_num: num,
                ctl_val: val,
            }),
        }
        trace_state!(
            "state: set dev={} ch={} ctl={} val={}",
            device,
            channel,
            num,
            val
        );
    }

    /// The last-recorded value of controller `num` on `(device, channel)`,
    /// or `UNDEF` if no state is recorded. Mirrors `conv_getctl`.
    pub fn get_ctl(&self, device: u8, channel: u8, num: u8) -> u16 {
        self.find(device, channel, num)
            .map(|i| self.entries[i].ctl_val)
            .unwrap_or(UNDEF)
    }

    /// Forget the value of controller `num` on `(device, channel)`, if any
    /// is recorded. Mirrors `conv_rmctl`.
    pub fn remove_ctl(&mut self, device: u8, channel: u8, num: u8) {
        if let Some(i) = self.find(device, channel, num) {
            self.entries.remove(i);
            trace_state!("state: rm dev={} ch={} ctl={}", device, channel, num);
        }
    }

    /// The combined 14-bit value of a (high, low) controller pair on
    /// `(device, channel)`, or `UNDEF` if either half is missing. Mirrors
    /// `conv_getctx`.
    pub fn get_ctx(&self, device: u8, channel: u8, hi: u8, lo: u8) -> u16 {
        let vlo = self.get_ctl(device, channel, lo);
        if vlo == UNDEF {
            return UNDEF;
        }
        let vhi = self.get_ctl(device, channel, hi);
        if vhi == UNDEF {
            return UNDEF;
        }
        vlo + (vhi << 7)
    }
}
