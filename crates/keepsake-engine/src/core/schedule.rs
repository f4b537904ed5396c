// core/schedule.rs
//
// Cancellable timers and per-frame loops.
//
// Every engine owns its own Scheduler, so dropping the engine drops its timers.
// Handles carry a generation: cancelling a handle whose timer already fired or
// was replaced is a no-op and can never hit a newer timer in the same slot.
//
// Usage:
//   let mut timers = Scheduler::new();
//   let tick = timers.every(0.1, Timer::ArmTick);
//   for fired in timers.advance(dt) { ... }
//   timers.cancel(tick);

use super::time::FixedTimestep;

/// Handle to a scheduled timer, returned by every start call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    slot: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
enum TimerKind {
    /// Fires once after the remaining time elapses.
    Once { remaining: f32 },
    /// Fires once per elapsed period.
    Every { step: FixedTimestep },
    /// Fires on every `advance` call.
    EachFrame,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    kind: TimerKind,
    tag: T,
    seq: u64,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    entry: Option<Entry<T>>,
}

/// Owns one-shot timers, repeating timers and frame loops for a single owner.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    next_seq: u64,
    session: u32,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            next_seq: 0,
            session: 0,
        }
    }

    fn insert(&mut self, kind: TimerKind, tag: T) -> TimerHandle {
        let entry = Entry { kind, tag, seq: self.next_seq };
        self.next_seq += 1;

        if let Some(slot) = self.free.pop() {
            let s = &mut self.slots[slot as usize];
            s.entry = Some(entry);
            TimerHandle { slot, generation: s.generation }
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, entry: Some(entry) });
            TimerHandle { slot, generation: 0 }
        }
    }

    fn release(&mut self, slot: u32) {
        let s = &mut self.slots[slot as usize];
        s.entry = None;
        s.generation = s.generation.wrapping_add(1);
        self.free.push(slot);
    }

    /// Fire `tag` once after `delay` seconds.
    pub fn after(&mut self, delay: f32, tag: T) -> TimerHandle {
        self.insert(TimerKind::Once { remaining: delay.max(0.0) }, tag)
    }

    /// Fire `tag` once every `period` seconds until cancelled.
    pub fn every(&mut self, period: f32, tag: T) -> TimerHandle {
        self.insert(TimerKind::Every { step: FixedTimestep::new(period) }, tag)
    }

    /// Fire `tag` on every advance until cancelled.
    pub fn each_frame(&mut self, tag: T) -> TimerHandle {
        self.insert(TimerKind::EachFrame, tag)
    }

    /// Cancel a timer. Returns false if the handle is stale.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if self.is_active(handle) {
            self.release(handle.slot);
            true
        } else {
            false
        }
    }

    /// Cancel the timer behind an optional handle and clear it.
    pub fn cancel_opt(&mut self, handle: &mut Option<TimerHandle>) {
        if let Some(h) = handle.take() {
            self.cancel(h);
        }
    }

    /// Whether the handle still refers to a live timer.
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.slots
            .get(handle.slot as usize)
            .map(|s| s.generation == handle.generation && s.entry.is_some())
            .unwrap_or(false)
    }

    /// Tear down every timer.
    pub fn cancel_all(&mut self) {
        for slot in 0..self.slots.len() as u32 {
            if self.slots[slot as usize].entry.is_some() {
                self.release(slot);
            }
        }
    }

    /// Cancel everything and start a new session. Returns the new session number.
    pub fn begin_session(&mut self) -> u32 {
        self.cancel_all();
        self.session = self.session.wrapping_add(1);
        self.session
    }

    /// Current session number.
    pub fn session(&self) -> u32 {
        self.session
    }

    /// Number of live timers.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    /// Advance all timers by `dt` seconds. Returns fired tags in creation order.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        let mut order: Vec<(u64, u32)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.entry.as_ref().map(|e| (e.seq, i as u32)))
            .collect();
        order.sort_unstable();

        let mut fired = Vec::new();
        let mut finished = Vec::new();

        for (_, slot) in order {
            let Some(entry) = self.slots[slot as usize].entry.as_mut() else {
                continue;
            };
            match &mut entry.kind {
                TimerKind::Once { remaining } => {
                    *remaining -= dt;
                    if *remaining <= 0.0 {
                        fired.push(entry.tag.clone());
                        finished.push(slot);
                    }
                }
                TimerKind::Every { step } => {
                    for _ in 0..step.accumulate(dt) {
                        fired.push(entry.tag.clone());
                    }
                }
                TimerKind::EachFrame => {
                    fired.push(entry.tag.clone());
                }
            }
        }

        for slot in finished {
            self.release(slot);
        }

        fired
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        A,
        B,
        Frame,
    }

    #[test]
    fn one_shot_fires_once_after_delay() {
        let mut s = Scheduler::new();
        s.after(0.5, Tag::A);
        assert!(s.advance(0.3).is_empty());
        assert_eq!(s.advance(0.3), vec![Tag::A]);
        assert!(s.advance(1.0).is_empty());
        assert_eq!(s.active(), 0);
    }

    #[test]
    fn repeating_fires_per_period() {
        let mut s = Scheduler::new();
        s.every(0.1, Tag::A);
        assert_eq!(s.advance(0.35).len(), 3);
        assert_eq!(s.advance(0.06).len(), 1);
    }

    #[test]
    fn frame_loop_fires_every_advance() {
        let mut s = Scheduler::new();
        let h = s.each_frame(Tag::Frame);
        assert_eq!(s.advance(0.016), vec![Tag::Frame]);
        assert_eq!(s.advance(0.016), vec![Tag::Frame]);
        assert!(s.cancel(h));
        assert!(s.advance(0.016).is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut s = Scheduler::new();
        let h = s.after(0.1, Tag::A);
        assert!(s.cancel(h));
        assert!(s.advance(1.0).is_empty());
    }

    #[test]
    fn stale_handle_cannot_cancel_new_timer() {
        let mut s = Scheduler::new();
        let old = s.after(0.1, Tag::A);
        assert_eq!(s.advance(0.2), vec![Tag::A]);

        // Same slot gets reused with a new generation
        let new = s.after(0.1, Tag::B);
        assert!(!s.cancel(old));
        assert!(s.is_active(new));
        assert_eq!(s.advance(0.2), vec![Tag::B]);
    }

    #[test]
    fn begin_session_tears_everything_down() {
        let mut s = Scheduler::new();
        s.after(0.1, Tag::A);
        s.every(0.1, Tag::B);
        s.each_frame(Tag::Frame);
        assert_eq!(s.active(), 3);

        let session = s.begin_session();
        assert_eq!(session, 1);
        assert_eq!(s.active(), 0);
        assert!(s.advance(5.0).is_empty());
    }

    #[test]
    fn fired_order_follows_creation_order() {
        let mut s = Scheduler::new();
        s.after(0.2, Tag::B);
        s.after(0.1, Tag::A);
        assert_eq!(s.advance(0.5), vec![Tag::B, Tag::A]);
    }
}
