//! Delayed-callback scheduling.
//!
//! Animators never sleep and never own a thread. Each one holds a
//! [`Scheduler`] and posts a [`TickKind`] with a delay; whoever runs the
//! event loop pops due entries and hands them back through
//! [`Animated::handle_tick`]. Entries for the same tag run in the order they
//! were scheduled, and once [`Scheduler::cancel`] returns nothing with that
//! tag fires again.
//!
//! [`ManualScheduler`] is a virtual-clock implementation: time only moves
//! when the driver pops entries or advances it, which makes every animation
//! fully deterministic under test.

use std::collections::BTreeMap;
use tracing::trace;

/// The two kinds of scheduled work an animator can post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TickKind {
    /// Redraw only, no state change.
    Draw,
    /// Advance the animation state, then redraw.
    Advance,
}

impl TickKind {
    /// Every tick kind, for blanket cancellation.
    pub const ALL: [Self; 2] = [Self::Draw, Self::Advance];
}

/// Handle returned for a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

/// Host-provided delayed-callback primitive.
pub trait Scheduler {
    /// Post `tag` to fire after `delay_ms`.
    fn schedule(&mut self, delay_ms: u64, tag: TickKind) -> Ticket;

    /// Remove every pending entry carrying `tag`.
    fn cancel(&mut self, tag: TickKind);

    /// Whether any entry carrying `tag` is pending.
    fn is_pending(&self, tag: TickKind) -> bool;

    /// Remove every pending entry.
    fn cancel_all(&mut self) {
        for tag in TickKind::ALL {
            self.cancel(tag);
        }
    }
}

/// A scheduled entry popped from a [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    /// Ticket handed out when the entry was scheduled
    pub ticket: Ticket,
    /// Tag the entry was scheduled with
    pub tag: TickKind,
    /// Virtual time at which it fired
    pub at_ms: u64,
}

/// Virtual-clock message queue.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_ticket: u64,
    // (due time, ticket) keeps equal due times in scheduling order.
    queue: BTreeMap<(u64, Ticket), TickKind>,
    disposed: bool,
}

impl ManualScheduler {
    /// Create an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Due time of the earliest pending entry.
    #[must_use]
    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.keys().next().map(|&(due, _)| due)
    }

    /// Pop the earliest entry due at or before `deadline_ms`, moving the
    /// clock to its due time.
    pub fn pop_due(&mut self, deadline_ms: u64) -> Option<Due> {
        let (&(due, ticket), _) = self.queue.iter().next()?;
        if due > deadline_ms {
            return None;
        }
        let tag = self.queue.remove(&(due, ticket))?;
        self.now_ms = self.now_ms.max(due);
        Some(Due {
            ticket,
            tag,
            at_ms: self.now_ms,
        })
    }

    /// Pop the earliest entry regardless of how far away it is.
    pub fn pop_next(&mut self) -> Option<Due> {
        self.pop_due(u64::MAX)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, at_ms: u64) {
        self.now_ms = self.now_ms.max(at_ms);
    }

    /// Drop all pending work and refuse any further scheduling.
    pub fn dispose(&mut self) {
        self.queue.clear();
        self.disposed = true;
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Scheduler for ManualScheduler {
    /// # Panics
    ///
    /// Panics if the scheduler has been disposed.
    fn schedule(&mut self, delay_ms: u64, tag: TickKind) -> Ticket {
        assert!(!self.disposed, "schedule({tag:?}) on a disposed scheduler");
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((due, ticket), tag);
        trace!(?tag, due, ticket = ticket.0, "scheduled");
        ticket
    }

    fn cancel(&mut self, tag: TickKind) {
        self.queue.retain(|_, pending| *pending != tag);
    }

    fn is_pending(&self, tag: TickKind) -> bool {
        self.queue.values().any(|pending| *pending == tag)
    }
}

/// A component whose state advances on scheduled ticks.
pub trait Animated {
    /// Scheduler the component posts its ticks to.
    type Scheduler: Scheduler;

    /// Process one fired tick.
    fn handle_tick(&mut self, kind: TickKind);

    /// Shared access to the component's scheduler.
    fn scheduler(&self) -> &Self::Scheduler;

    /// Exclusive access to the component's scheduler.
    fn scheduler_mut(&mut self) -> &mut Self::Scheduler;
}

/// Run `target` for `window_ms` of virtual time, dispatching every entry that
/// falls due inside the window, including ones scheduled along the way.
/// Returns the number of ticks dispatched.
pub fn drive<A>(target: &mut A, window_ms: u64) -> usize
where
    A: Animated<Scheduler = ManualScheduler>,
{
    let deadline = target.scheduler().now_ms().saturating_add(window_ms);
    let mut fired = 0;
    while let Some(due) = target.scheduler_mut().pop_due(deadline) {
        target.handle_tick(due.tag);
        fired += 1;
    }
    target.scheduler_mut().advance_to(deadline);
    fired
}

/// Dispatch up to `count` ticks in due order, however far apart they are.
/// Returns the number actually dispatched, which is smaller only when the
/// queue runs dry.
pub fn step<A>(target: &mut A, count: usize) -> usize
where
    A: Animated<Scheduler = ManualScheduler>,
{
    let mut fired = 0;
    while fired < count {
        let Some(due) = target.scheduler_mut().pop_next() else {
            break;
        };
        target.handle_tick(due.tag);
        fired += 1;
    }
    fired
}
