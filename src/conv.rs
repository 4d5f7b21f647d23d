/*!
Conversion between wire MIDI events (`Ctl`, `Pc`, and the context-free
passthroughs) and canonical, context-free events (`Xctl`, `Xpc`, `Nrpn`,
`Rpn`). This is the packer/unpacker described in spec.md §4.3/§4.4,
grounded directly on `conv_packev`/`conv_unpackev` in the original
`conv.c`.

Packing folds a run of wire `Ctl`/`Pc` events into the fewest canonical
events that carry the same meaning, using a `StateList` to remember bank,
RPN/NRPN selection, and data-entry context across calls. Unpacking is the
inverse: given a canonical event and the state of what the receiving
device already believes, emit only the wire events needed to bring it up
to date.
!*/

use crate::event::{Ev, EvKind, UNDEF};
use crate::registry::{
    FineControllerSet, BANK_HI, BANK_LO, DATAENT_HI, DATAENT_LO, NRPN_HI, NRPN_LO, RPN_HI, RPN_LO,
};
use crate::state::StateList;

/// Convert one wire event into a canonical event, threading context
/// through `state`. Returns `None` when the wire event was context-setup
/// only (bank/RPN/NRPN select, or an incomplete data-entry pair) and
/// doesn't yet resolve to a canonical event on its own -- this is the
/// "silent contextual absence" case from the crate's error taxonomy, not
/// an error.
pub fn pack(state: &mut StateList, fine: &FineControllerSet, ev: &Ev) -> Option<Ev> {
    match ev.kind {
        EvKind::Pc => {
            let bank = state.get_ctx(ev.device, ev.channel, BANK_HI, BANK_LO);
            Some(Ev::xpc(ev.device, ev.channel, bank, ev.pc_prog()))
        }
        EvKind::Ctl => pack_ctl(state, fine, ev),
        _ => Some(*ev),
    }
}

fn pack_ctl(state: &mut StateList, fine: &FineControllerSet, ev: &Ev) -> Option<Ev> {
    let num = ev.ctl_num();
    let (device, channel) = (ev.device, ev.channel);

    match num {
        BANK_HI => {
            state.remove_ctl(device, channel, BANK_LO);
            state.set_ctl(device, channel, num, ev.ctl_val());
            None
        }
        RPN_HI => {
            state.remove_ctl(device, channel, NRPN_LO);
            state.remove_ctl(device, channel, RPN_LO);
            state.set_ctl(device, channel, num, ev.ctl_val());
            None
        }
        NRPN_HI => {
            state.remove_ctl(device, channel, RPN_LO);
            state.remove_ctl(device, channel, NRPN_LO);
            state.set_ctl(device, channel, num, ev.ctl_val());
            None
        }
        DATAENT_HI => {
            state.remove_ctl(device, channel, DATAENT_LO);
            state.set_ctl(device, channel, num, ev.ctl_val());
            None
        }
        BANK_LO => {
            state.set_ctl(device, channel, num, ev.ctl_val());
            None
        }
        NRPN_LO => {
            state.remove_ctl(device, channel, RPN_LO);
            state.set_ctl(device, channel, num, ev.ctl_val());
            None
        }
        RPN_LO => {
            state.remove_ctl(device, channel, NRPN_LO);
            state.set_ctl(device, channel, num, ev.ctl_val());
            None
        }
        DATAENT_LO => {
            let (kind, rpn_num) = {
                let nrpn_num = state.get_ctx(device, channel, NRPN_HI, NRPN_LO);
                if nrpn_num != UNDEF {
                    (EvKind::Nrpn, nrpn_num)
                } else {
                    let rpn_num = state.get_ctx(device, channel, RPN_HI, RPN_LO);
                    if rpn_num == UNDEF {
                        return None;
                    }
                    (EvKind::Rpn, rpn_num)
                }
            };
            let hi = state.get_ctl(device, channel, DATAENT_HI);
            if hi == UNDEF {
                return None;
            }
            let val = ev.ctl_val() + (hi << 7);
            Some(match kind {
                EvKind::Nrpn => Ev::nrpn(device, channel, rpn_num, val),
                _ => Ev::rpn(device, channel, rpn_num, val),
            })
        }
        _ if num < 32 => {
            if fine.is_fine(num) {
                state.set_ctl(device, channel, num, ev.ctl_val());
                None
            } else {
                Some(Ev::xctl(device, channel, num, ev.ctl_val() << 7))
            }
        }
        _ if num < 64 => {
            let base = num - 32;
            if !fine.is_fine(base) {
                return None;
            }
            let hi = state.get_ctl(device, channel, base);
            if hi == UNDEF {
                return None;
            }
            Some(Ev::xctl(device, channel, base, ev.ctl_val() + (hi << 7)))
        }
        _ => Some(Ev::xctl(device, channel, num, ev.ctl_val() << 7)),
    }
}

/// Convert one canonical event into the wire events needed to carry its
/// meaning, in order. The returned `Vec` may be empty (nothing needs to
/// change), one event, or several (e.g. an `Xpc` whose bank differs from
/// what `state` already has emits two bank-select `Ctl`s before the
/// `Pc`). Updates `state` to reflect the emitted context, matching
/// `conv_unpackev`.
pub fn unpack(state: &mut StateList, fine: &FineControllerSet, ev: &Ev) -> Vec<Ev> {
    match ev.kind {
        EvKind::Xctl => unpack_xctl(state, fine, ev),
        EvKind::Xpc => unpack_xpc(state, ev),
        EvKind::Nrpn => unpack_rpn_like(state, ev, NRPN_HI, NRPN_LO, RPN_HI, RPN_LO),
        EvKind::Rpn => unpack_rpn_like(state, ev, RPN_HI, RPN_LO, NRPN_HI, NRPN_LO),
        _ => vec![*ev],
    }
}

fn unpack_xctl(state: &mut StateList, fine: &FineControllerSet, ev: &Ev) -> Vec<Ev> {
    let (device, channel, num) = (ev.device, ev.channel, ev.ctl_num());
    let mut out = Vec::new();

    if num < 32 && fine.is_fine(num) {
        let hi = ev.ctl_val() >> 7;
        let known = state.get_ctl(device, channel, num);
        if known != hi {
            let hi_ev = Ev::ctl(device, channel, num, hi as u8);
            state.set_ctl(device, channel, num, hi);
            out.push(hi_ev);
        }
        out.push(Ev::ctl(device, channel, num + 32, (ev.ctl_val() & 0x7f) as u8));
        out
    } else {
        out.push(Ev::ctl(device, channel, num, (ev.ctl_val() >> 7) as u8));
        out
    }
}

fn unpack_xpc(state: &mut StateList, ev: &Ev) -> Vec<Ev> {
    let (device, channel) = (ev.device, ev.channel);
    let mut out = Vec::new();

    let known_bank = state.get_ctx(device, channel, BANK_HI, BANK_LO);
    let bank = ev.pc_bank();
    if known_bank != bank && bank != UNDEF {
        let hi = Ev::ctl(device, channel, BANK_HI, (bank >> 7) as u8);
        state.set_ctl(device, channel, BANK_HI, bank >> 7);
        out.push(hi);
        let lo = Ev::ctl(device, channel, BANK_LO, (bank & 0x7f) as u8);
        state.set_ctl(device, channel, BANK_LO, bank & 0x7f);
        out.push(lo);
    }
    out.push(Ev::pc(device, channel, ev.pc_prog()));
    out
}

/// Shared body for `Nrpn`/`Rpn` unpacking: both select-number then
/// data-entry, only differing in which select controller pair is used and
/// which pair must be invalidated in the receiver's state.
fn unpack_rpn_like(
    state: &mut StateList,
    ev: &Ev,
    select_hi: u8,
    select_lo: u8,
    other_hi: u8,
    other_lo: u8,
) -> Vec<Ev> {
    let (device, channel) = (ev.device, ev.channel);
    let mut out = Vec::new();

    let known_num = state.get_ctx(device, channel, select_hi, select_lo);
    if known_num != ev.rpn_num() {
        state.remove_ctl(device, channel, other_hi);
        state.remove_ctl(device, channel, other_lo);

        let hi = Ev::ctl(device, channel, select_hi, (ev.rpn_num() >> 7) as u8);
        state.set_ctl(device, channel, select_hi, ev.rpn_num() >> 7);
        out.push(hi);

        let lo = Ev::ctl(device, channel, select_lo, (ev.rpn_num() & 0x7f) as u8);
        state.set_ctl(device, channel, select_lo, ev.rpn_num() & 0x7f);
        out.push(lo);
    }

    out.push(Ev::ctl(
        device,
        channel,
        DATAENT_HI,
        (ev.rpn_val() >> 7) as u8,
    ));
    out.push(Ev::ctl(
        device,
        channel,
        DATAENT_LO,
        (ev.rpn_val() & 0x7f) as u8,
    ));
    out
}
