//! Cancelable one-shot timers on a virtual millisecond clock
//!
//! Repeating behavior (decay, countdown) is a timer that reschedules itself
//! when it fires. Nothing here reads the wall clock; the owning session feeds
//! time in through `pop_due`.

/// Handle returned by `schedule`, used to cancel a single timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: u64,
    due_ms: u64,
    timer: T,
}

/// Pending timers, fired in (due time, scheduling order)
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    pending: Vec<Pending<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: Copy + PartialEq> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `timer` to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, timer: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_ms: now_ms.saturating_add(delay_ms),
            timer,
        });
        TimerId(id)
    }

    /// Cancel one timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id.0);
        self.pending.len() != before
    }

    /// Cancel every pending timer of this kind
    pub fn cancel_kind(&mut self, timer: T) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.timer != timer);
        before - self.pending.len()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Due time of the earliest pending timer of this kind
    pub fn due_of(&self, timer: T) -> Option<u64> {
        self.pending
            .iter()
            .filter(|p| p.timer == timer)
            .map(|p| p.due_ms)
            .min()
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    /// Remove and return the earliest timer due at or before `until_ms`
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(u64, T)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= until_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.id))
            .map(|(i, _)| i)?;
        let p = self.pending.swap_remove(idx);
        Some((p.due_ms, p.timer))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
