/*!
Clamped newtypes for the small integer ranges that recur throughout MIDI:
channel numbers, device numbers, 7-bit data bytes, and 14-bit controller
values. Each is generated by the `clamp!` macro (see `clamp.rs`): silent
clamping on construction, an explicit `set` that reports whether the value
was in range.
!*/

// A device is an output port; midish allows up to 16 in the original, we
// keep the same ceiling.
clamp!(Device, u8, 0, 15, 0, pub);

// channel is 0-15, displayed to users as 1-16.
clamp!(Channel, u8, 0, 15, 0, pub);

/// A plain 7-bit MIDI data byte (0..=127).
clamp!(U7, u8, 0, 127, 0, pub);

/// A controller number (0..=127).
clamp!(CtlNum, u8, 0, 127, 0, pub);

/// A note number (0..=127).
clamp!(NoteNumber, u8, 0, 127, 60, pub);

/// A note velocity (0..=127).
clamp!(Velocity, u8, 0, 127, 100, pub);

/// A program (patch) number (0..=127).
clamp!(Program, u8, 0, 127, 0, pub);

/// A 14-bit value as used by pitch bend, RPN/NRPN data, and fine
/// controller pairs (0..=16383).
clamp!(U14, u16, 0, 16_383, 0, pub);
