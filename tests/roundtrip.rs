mod utils;

use midi_normalize::prelude::*;
use utils::enable_logging;

fn round_trip(canonical: Ev) -> Vec<Ev> {
    let env = Environment::new();
    let fine = *env.fine_controllers(0);
    let mut unpack_state = StateList::new();
    let mut pack_state = StateList::new();

    let wire = unpack(&mut unpack_state, &fine, &canonical);
    let mut repacked = Vec::new();
    for ev in &wire {
        if let Some(c) = pack(&mut pack_state, &fine, ev) {
            repacked.push(c);
        }
    }
    repacked
}

// Invariant 1 (spec §8): for every canonical event, unpacking then
// repacking (against initially empty state lists) recovers the original.
#[test]
fn xpc_round_trips() {
    enable_logging();
    let original = Ev::xpc(0, 0, 42, 7);
    assert_eq!(round_trip(original), vec![original]);
}

#[test]
fn nrpn_round_trips() {
    let original = Ev::nrpn(1, 2, 300, 8000);
    assert_eq!(round_trip(original), vec![original]);
}

#[test]
fn rpn_round_trips() {
    let original = Ev::rpn(1, 2, 0, 0x2000);
    assert_eq!(round_trip(original), vec![original]);
}

#[test]
fn xctl_fine_round_trips() {
    // controller 1 as fine on device 0
    let env = Environment::new();
    let mut fine = *env.fine_controllers(0);
    fine.set_fine(1, true);

    let mut unpack_state = StateList::new();
    let mut pack_state = StateList::new();
    let original = Ev::xctl(0, 0, 1, 900);

    let wire = unpack(&mut unpack_state, &fine, &original);
    let mut repacked = Vec::new();
    for ev in &wire {
        if let Some(c) = pack(&mut pack_state, &fine, ev) {
            repacked.push(c);
        }
    }
    assert_eq!(repacked, vec![original]);
}

#[test]
fn xctl_coarse_round_trips() {
    let original = Ev::xctl(0, 0, 7, 100 << 7);
    assert_eq!(round_trip(original), vec![original]);
}

// Invariant 2 (spec §8): two consecutive PCs with the same bank emit at
// most one bank-select pair total via unpack.
#[test]
fn repeated_bank_emits_select_pair_only_once() {
    let env = Environment::new();
    let fine = *env.fine_controllers(0);
    let mut mirror = StateList::new();

    let first = unpack(&mut mirror, &fine, &Ev::xpc(0, 0, 9, 1));
    assert_eq!(first.len(), 3); // bank hi, bank lo, pc

    let second = unpack(&mut mirror, &fine, &Ev::xpc(0, 0, 9, 2));
    assert_eq!(second, vec![Ev::pc(0, 0, 2)]);
}
