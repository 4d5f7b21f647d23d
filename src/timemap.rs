/*!
The time map: tick↔measure translation driven by a dedicated meta track
holding only `TEMPO` and `TIMESIG` events (§4.7). Walking the meta track
while summing deltas and accumulating measure lengths from the
time-signature events in force gives both directions of the mapping.

Grounded on the original's time-map walk (`song_measure_to_tick` /
`getctlset`-style accumulation described in spec §4.7); no direct
`timemap.c` survives in the source pack, so the accumulation loop here is
authored from the contract, the way `frame.rs` is.
!*/

use crate::error::LibResult;
use crate::event::{Ev, EvKind};
use crate::track::Track;

/// Tempo and time signature in force at some point in the track, plus the
/// measure-length in ticks that time signature implies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeInfo {
    pub usec_per_24th: u32,
    pub beats_per_measure: u8,
    pub ticks_per_beat: u16,
}

impl TimeInfo {
    fn measure_ticks(&self) -> u64 {
        self.beats_per_measure as u64 * self.ticks_per_beat as u64
    }
}

const DEFAULT_TEMPO_USEC24: u32 = 20_833; // 120 BPM, microseconds per 24th note
const DEFAULT_BEATS: u8 = 4;
const DEFAULT_TICKS_PER_BEAT: u16 = 24;

fn default_info() -> TimeInfo {
    TimeInfo {
        usec_per_24th: DEFAULT_TEMPO_USEC24,
        beats_per_measure: DEFAULT_BEATS,
        ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
    }
}

/// A meta track's tick-to-measure map, computed by walking its TEMPO and
/// TIMESIG events once.
pub struct TimeMap {
    /// `(tick_at_which_this_segment_starts, measure_at_start, info)`,
    /// ordered by tick.
    segments: Vec<(u64, u64, TimeInfo)>,
}

impl TimeMap {
    /// Build a map from a meta track. Panics (via `bug!`, not `Result`) if
    /// given a non-meta track -- that's a programming invariant violation,
    /// not a recoverable input error.
    pub fn build(meta: &Track) -> TimeMap {
        if !meta.is_meta_track() {
            bug!("TimeMap::build called on a non-meta track");
        }

        let mut segments = Vec::new();
        let mut info = default_info();
        let mut tick = 0u64;
        let mut measure = 0u64;
        segments.push((tick, measure, info));

        for (ev_tick, ev) in meta.absolute_events() {
            match ev.kind {
                EvKind::Tempo => {
                    info.usec_per_24th = ev.tempo_usec24();
                }
                EvKind::TimeSig => {
                    // account for whole measures elapsed under the prior
                    // signature before the new one takes effect.
                    let prior = segments.last().unwrap().2;
                    let elapsed = ev_tick - tick;
                    if prior.measure_ticks() > 0 {
                        measure += elapsed / prior.measure_ticks();
                    }
                    tick = ev_tick;
                    info.beats_per_measure = ev.timesig_beats();
                    info.ticks_per_beat = ev.timesig_ticks();
                }
                _ => unreachable!("meta track may only contain TEMPO/TIMESIG"),
            }
            segments.push((tick, measure, info));
        }

        TimeMap { segments }
    }

    fn segment_for_tick(&self, tick: u64) -> &(u64, u64, TimeInfo) {
        self.segments
            .iter()
            .rev()
            .find(|(seg_tick, _, _)| *seg_tick <= tick)
            .unwrap_or(&self.segments[0])
    }

    /// The tempo and time signature in force at `tick`.
    pub fn time_info(&self, tick: u64) -> TimeInfo {
        self.segment_for_tick(tick).2
    }

    /// The absolute tick at which measure `m` begins.
    pub fn find_measure(&self, m: u64) -> u64 {
        let seg = self
            .segments
            .iter()
            .rev()
            .find(|(_, seg_measure, _)| *seg_measure <= m)
            .unwrap_or(&self.segments[0]);
        let (seg_tick, seg_measure, info) = *seg;
        seg_tick + (m - seg_measure) * info.measure_ticks()
    }

    /// True iff `tick` falls exactly on a measure boundary.
    pub fn is_measure_boundary(&self, tick: u64) -> bool {
        let seg = self.segment_for_tick(tick);
        let (seg_tick, _, info) = *seg;
        info.measure_ticks() > 0 && (tick - seg_tick) % info.measure_ticks() == 0
    }

    /// Validate and insert a `TIMESIG` at `tick` into `meta`. Rejected if
    /// `tick` isn't a measure boundary -- callers must seek there first
    /// (§4.7's "the core requires callers to seek to a measure boundary").
    pub fn insert_timesig(
        &self,
        meta: &mut Track,
        tick: u64,
        beats: u8,
        ticks_per_beat: u16,
    ) -> LibResult<()> {
        if !self.is_measure_boundary(tick) {
            bad_measure!(
                (tick / self.time_info(tick).measure_ticks().max(1)) as u32,
                "time signature changes are only allowed on a measure boundary"
            );
        }
        let mut events = meta.absolute_events();
        let total_len = meta.len_ticks();
        events.push((tick, Ev::timesig(beats, ticks_per_beat)));
        events.sort_by_key(|&(t, _)| t);
        meta.rebuild_from(events, total_len.max(tick));
        Ok(())
    }

    /// Remove the `TIMESIG` at `tick`, if any. Per the open question in
    /// §9, this performs a precise removal (not the reference's generic
    /// consistency-fixup pass) -- see DESIGN.md for the rationale.
    pub fn remove_timesig(&self, meta: &mut Track, tick: u64) {
        let total_len = meta.len_ticks();
        let events: Vec<(u64, Ev)> = meta
            .absolute_events()
            .into_iter()
            .filter(|(t, ev)| !(*t == tick && ev.kind == EvKind::TimeSig))
            .collect();
        meta.rebuild_from(events, total_len);
    }
}
