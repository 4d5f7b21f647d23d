/*!
A delta-encoded event track: each `SeqEv` carries `(delta_ticks, event)` and
is linked into a doubly-linked list terminated by a single end-of-track
sentinel (§3, §9 design notes). The original links `struct seqev` nodes
through raw pointer-to-pointer back-links; here the same shape is an arena
of `Node`s addressed by index, with a stack-based free list recycling
slots freed by `remove`. No raw pointers are exposed anywhere in this
module's public API.

The sentinel occupies arena slot `SENTINEL` for the lifetime of the
track and is never freed. Its own `delta` field holds the blank space
*after* the last real event -- this mirrors the original exactly:
`seqev_ins` transfers `pos->delta` onto the newly inserted node and zeros
`pos->delta`, so inserting before the sentinel moves trailing blank ticks
onto the new tail event and leaves the sentinel free to describe whatever
blank space follows it.
!*/

use crate::event::Ev;

pub(crate) const SENTINEL: usize = 0;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) delta: u32,
    pub(crate) ev: Ev,
    pub(crate) next: usize,
    pub(crate) prev: usize,
}

/// A track: a sequence of `(delta, event)` pairs ending in a sentinel.
#[derive(Clone, Debug)]
pub struct Track {
    pub(crate) arena: Vec<Node>,
    free: Vec<usize>,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    /// An empty track: just the sentinel, zero trailing ticks.
    pub fn new() -> Self {
        Track {
            arena: vec![Node {
                delta: 0,
                ev: Ev::nil(),
                next: SENTINEL,
                prev: SENTINEL,
            }],
            free: Vec::new(),
        }
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.arena[idx] = node;
                idx
            }
            None => {
                self.arena.push(node);
                self.arena.len() - 1
            }
        }
    }

    pub(crate) fn sentinel(&self) -> usize {
        SENTINEL
    }

    pub(crate) fn head(&self) -> usize {
        self.arena[SENTINEL].next
    }

    pub(crate) fn is_sentinel(&self, idx: usize) -> bool {
        idx == SENTINEL
    }

    pub(crate) fn delta_at(&self, idx: usize) -> u32 {
        self.arena[idx].delta
    }

    pub(crate) fn ev_at(&self, idx: usize) -> Ev {
        self.arena[idx].ev
    }

    pub(crate) fn next_of(&self, idx: usize) -> usize {
        self.arena[idx].next
    }

    pub(crate) fn prev_of(&self, idx: usize) -> usize {
        self.arena[idx].prev
    }

    pub(crate) fn set_delta_at(&mut self, idx: usize, delta: u32) {
        self.arena[idx].delta = delta;
    }

    /// Insert `ev` just before node `pos`, carrying the given `delta`.
    /// `pos`'s own delta is reset to zero, since the new node now accounts
    /// for the ticks that used to elapse before `pos`. Mirrors `seqev_ins`.
    /// Returns the index of the inserted node.
    pub(crate) fn insert_before(&mut self, pos: usize, delta: u32, ev: Ev) -> usize {
        let prev = self.arena[pos].prev;
        let new_idx = self.alloc(Node {
            delta,
            ev,
            next: pos,
            prev,
        });
        self.arena[pos].prev = new_idx;
        self.arena[pos].delta = 0;
        self.arena[prev].next = new_idx;
        new_idx
    }

    /// Remove node `pos` (must not be the sentinel), folding its delta
    /// into the following node so absolute tick positions downstream are
    /// unchanged. Mirrors `seqev_rm`.
    pub(crate) fn remove(&mut self, pos: usize) {
        debug_assert!(pos != SENTINEL, "cannot remove the end-of-track sentinel");
        let next = self.arena[pos].next;
        let prev = self.arena[pos].prev;
        self.arena[next].delta += self.arena[pos].delta;
        self.arena[prev].next = next;
        self.arena[next].prev = prev;
        self.free.push(pos);
    }

    /// Number of real (non-sentinel) events.
    pub fn len_events(&self) -> usize {
        let mut n = 0;
        let mut i = self.head();
        while !self.is_sentinel(i) {
            n += 1;
            i = self.next_of(i);
        }
        n
    }

    /// Total tick length of the track, sentinel's trailing delta included.
    pub fn len_ticks(&self) -> u64 {
        let mut total: u64 = 0;
        let mut i = self.head();
        while !self.is_sentinel(i) {
            total += self.delta_at(i) as u64;
            i = self.next_of(i);
        }
        total + self.delta_at(SENTINEL) as u64
    }

    /// Remove every real event, leaving an empty track with zero length.
    pub fn clear(&mut self) {
        let mut i = self.head();
        while !self.is_sentinel(i) {
            let next = self.next_of(i);
            self.free.push(i);
            i = next;
        }
        self.arena[SENTINEL].delta = 0;
        self.arena[SENTINEL].next = SENTINEL;
        self.arena[SENTINEL].prev = SENTINEL;
    }

    /// The events in order, alongside the absolute tick each starts at.
    pub fn absolute_events(&self) -> Vec<(u64, Ev)> {
        let mut out = Vec::with_capacity(self.len_events());
        let mut tick: u64 = 0;
        let mut i = self.head();
        while !self.is_sentinel(i) {
            tick += self.delta_at(i) as u64;
            out.push((tick, self.ev_at(i)));
            i = self.next_of(i);
        }
        out
    }

    /// Rebuild the track's contents from an ordered `(absolute_tick,
    /// event)` list plus a declared total length. `events` must be sorted
    /// non-decreasing by tick; `total_len` must be >= the last event's
    /// tick (any shortfall is silently raised to the last event's tick).
    pub fn rebuild_from(&mut self, events: Vec<(u64, Ev)>, total_len: u64) {
        self.clear();
        let mut prev_tick: u64 = 0;
        for (tick, ev) in events {
            debug_assert!(tick >= prev_tick, "rebuild_from requires sorted input");
            let delta = (tick - prev_tick) as u32;
            let sentinel = self.sentinel();
            self.insert_before(sentinel, delta, ev);
            prev_tick = tick;
        }
        let trailing = total_len.saturating_sub(prev_tick);
        self.set_delta_at(SENTINEL, trailing as u32);
    }

    /// Append an event at the track's tail with the given delta.
    pub fn push_back(&mut self, delta: u32, ev: Ev) {
        let sentinel = self.sentinel();
        self.insert_before(sentinel, delta, ev);
    }

    /// Transfer all of `src`'s content into `self`, leaving `src` empty.
    /// Mirrors `track_moveall`: a move, not a copy -- `src`'s nodes are
    /// freed from its own arena and reallocated in `self`'s, since the two
    /// tracks have independent index spaces.
    pub fn absorb(&mut self, src: &mut Track) {
        let events = src.absolute_events();
        let total_len = src.len_ticks();
        self.rebuild_from(events, total_len);
        src.clear();
    }

    /// Merge `src`'s events into `self` by absolute tick, consuming `src`.
    /// On equal ticks, `self`'s original events are kept ahead of `src`'s
    /// incoming ones (supplements `track_moveall`; grounded on the
    /// stable-merge convention documented for `quantize`'s own tie rule,
    /// extended here to cross-track merging per SPEC_FULL.md §B).
    pub fn merge(&mut self, src: Track) {
        let dst_events = self.absolute_events();
        let dst_len = self.len_ticks();
        let src_events = src.absolute_events();
        let src_len = src.len_ticks();

        let mut merged = Vec::with_capacity(dst_events.len() + src_events.len());
        let (mut i, mut j) = (0, 0);
        while i < dst_events.len() && j < src_events.len() {
            if dst_events[i].0 <= src_events[j].0 {
                merged.push(dst_events[i]);
                i += 1;
            } else {
                merged.push(src_events[j]);
                j += 1;
            }
        }
        merged.extend_from_slice(&dst_events[i..]);
        merged.extend_from_slice(&src_events[j..]);

        self.rebuild_from(merged, dst_len.max(src_len));
    }

    /// True iff `ev` is a voice or canonical event (excludes sentinel and
    /// meta events).
    pub fn is_voice_track(&self) -> bool {
        let mut i = self.head();
        while !self.is_sentinel(i) {
            let kind = self.ev_at(i).kind;
            if kind.is_meta() {
                return false;
            }
            i = self.next_of(i);
        }
        true
    }

    /// True iff every event on the track is a meta event (suitable as the
    /// tempo/time-signature map).
    pub fn is_meta_track(&self) -> bool {
        let mut i = self.head();
        while !self.is_sentinel(i) {
            let kind = self.ev_at(i).kind;
            if !kind.is_meta() {
                return false;
            }
            i = self.next_of(i);
        }
        true
    }
}
