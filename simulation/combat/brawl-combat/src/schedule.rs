//! Deferred tasks on a pausable virtual clock
//!
//! Every task remembers the epoch it was scheduled in. Bumping the epoch with
//! [`Scheduler::advance_epoch`] turns all pending tasks stale; they are dropped
//! the next time the scheduler runs instead of touching a world that moved on.
//! A scheduler split off with [`Scheduler::take_pending`] shares its epoch and
//! cancellations with the original, so a running task can still cancel or
//! invalidate the tasks queued behind it.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Handle to a pending task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

enum Job<C> {
    After {
        due: f32,
        task: Box<dyn FnOnce(&mut C)>,
    },
    When {
        predicate: Box<dyn FnMut(&C) -> bool>,
        task: Box<dyn FnOnce(&mut C)>,
    },
    During {
        until: f32,
        tick: Box<dyn FnMut(&mut C, f32)>,
    },
}

struct Pending<C> {
    id: TaskId,
    epoch: u64,
    job: Job<C>,
}

/// State a scheduler shares with the halves split off from it
#[derive(Debug, Default)]
struct Control {
    epoch: u64,
    /// Tasks moved out by `take_pending` and not merged back yet
    in_flight: HashSet<TaskId>,
    /// In-flight tasks to drop instead of run or merge
    cancelled: HashSet<TaskId>,
}

/// Runs closures over a context `C` once their trigger fires
pub struct Scheduler<C> {
    clock: f32,
    paused: bool,
    next_id: u64,
    pending: Vec<Pending<C>>,
    control: Rc<RefCell<Control>>,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self {
            clock: 0.0,
            paused: false,
            next_id: 1,
            pending: Vec::new(),
            control: Rc::default(),
        }
    }
}

impl<C> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("clock", &self.clock)
            .field("epoch", &self.epoch())
            .field("paused", &self.paused)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds of unpaused time since creation
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn epoch(&self) -> u64 {
        self.control.borrow().epoch
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Invalidate every pending task and return the new epoch
    pub fn advance_epoch(&mut self) -> u64 {
        let mut control = self.control.borrow_mut();
        control.epoch += 1;
        log::debug!("Scheduler epoch is now {}", control.epoch);
        control.epoch
    }

    fn push(&mut self, job: Job<C>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let epoch = self.epoch();
        self.pending.push(Pending { id, epoch, job });
        id
    }

    /// Run `task` once `seconds` of unpaused time have passed
    pub fn after(&mut self, seconds: f32, task: impl FnOnce(&mut C) + 'static) -> TaskId {
        let due = self.clock + seconds.max(0.0);
        self.push(Job::After {
            due,
            task: Box::new(task),
        })
    }

    /// Run `task` on the first tick where `predicate` holds
    pub fn when(
        &mut self,
        predicate: impl FnMut(&C) -> bool + 'static,
        task: impl FnOnce(&mut C) + 'static,
    ) -> TaskId {
        self.push(Job::When {
            predicate: Box::new(predicate),
            task: Box::new(task),
        })
    }

    /// Run `tick` every tick for the next `seconds`, passing the tick's delta time
    pub fn for_duration(&mut self, seconds: f32, tick: impl FnMut(&mut C, f32) + 'static) -> TaskId {
        let until = self.clock + seconds.max(0.0);
        self.push(Job::During {
            until,
            tick: Box::new(tick),
        })
    }

    /// Drop a task, including one that is part of a run in progress
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        if self.pending.len() != before {
            return true;
        }
        let mut control = self.control.borrow_mut();
        control.in_flight.contains(&id) && control.cancelled.insert(id)
    }

    /// Move the clock forward unless paused
    pub fn advance(&mut self, dt: f32) {
        if !self.paused {
            self.clock += dt.max(0.0);
        }
    }

    /// Move every pending task into a new scheduler sharing this clock and epoch
    ///
    /// Used when the context owns its scheduler: the split-off half runs against
    /// the context while new tasks land in the original, then [`Self::merge`]
    /// recombines them.
    pub fn take_pending(&mut self) -> Self {
        self.control
            .borrow_mut()
            .in_flight
            .extend(self.pending.iter().map(|p| p.id));
        Self {
            clock: self.clock,
            paused: self.paused,
            next_id: self.next_id,
            pending: std::mem::take(&mut self.pending),
            control: Rc::clone(&self.control),
        }
    }

    /// Fold the tasks still pending in `other` back in, ahead of any new ones
    ///
    /// Tasks cancelled while they were split off are dropped here.
    pub fn merge(&mut self, mut other: Self) {
        self.next_id = self.next_id.max(other.next_id);
        {
            let mut control = self.control.borrow_mut();
            other.pending.retain(|p| {
                control.in_flight.remove(&p.id);
                !control.cancelled.remove(&p.id)
            });
        }
        other.pending.append(&mut self.pending);
        self.pending = other.pending;
    }

    /// Whether `p` may still run, forgetting it when it may not
    fn is_live(&self, p: &Pending<C>) -> bool {
        let mut control = self.control.borrow_mut();
        if control.cancelled.remove(&p.id) {
            control.in_flight.remove(&p.id);
            log::debug!("Dropping cancelled task {:?}", p.id);
            return false;
        }
        if p.epoch != control.epoch {
            control.in_flight.remove(&p.id);
            log::debug!("Dropping stale task {:?} from epoch {}", p.id, p.epoch);
            return false;
        }
        true
    }

    fn finished(&self, id: TaskId) {
        self.control.borrow_mut().in_flight.remove(&id);
    }

    /// Run every task whose trigger fired; stale and cancelled tasks are dropped
    ///
    /// Each task is checked right before it runs, so an earlier task in the
    /// same run can still invalidate it.
    pub fn run_due(&mut self, context: &mut C, dt: f32) {
        if self.paused {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        let mut kept = Vec::with_capacity(pending.len());

        for mut p in pending {
            if !self.is_live(&p) {
                continue;
            }
            match p.job {
                Job::After { due, task } => {
                    if due <= self.clock {
                        self.finished(p.id);
                        task(context);
                    } else {
                        p.job = Job::After { due, task };
                        kept.push(p);
                    }
                }
                Job::When { mut predicate, task } => {
                    if predicate(context) {
                        self.finished(p.id);
                        task(context);
                    } else {
                        p.job = Job::When { predicate, task };
                        kept.push(p);
                    }
                }
                Job::During { until, mut tick } => {
                    tick(context, dt);
                    if self.clock < until {
                        p.job = Job::During { until, tick };
                        kept.push(p);
                    } else {
                        self.finished(p.id);
                    }
                }
            }
        }

        kept.append(&mut self.pending);
        self.pending = kept;
    }

    /// Advance the clock and run due tasks
    pub fn tick(&mut self, context: &mut C, dt: f32) {
        self.advance(dt);
        self.run_due(context, dt);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// A context that owns its scheduler, the way a scene does
    #[derive(Default)]
    struct World {
        scheduler: Scheduler<World>,
        hits: u32,
        cancelled: bool,
    }

    impl World {
        fn tick(&mut self, dt: f32) {
            self.scheduler.advance(dt);
            let mut due = self.scheduler.take_pending();
            due.run_due(self, dt);
            self.scheduler.merge(due);
        }
    }

    #[test]
    fn test_after_runs_once_when_due() {
        let mut scheduler = Scheduler::<Vec<String>>::new();
        let mut log = Vec::new();
        scheduler.after(1.0, |log| log.push("fired".to_string()));

        scheduler.tick(&mut log, 0.5);
        assert!(log.is_empty());
        scheduler.tick(&mut log, 0.5);
        assert_eq!(log, vec!["fired".to_string()]);
        scheduler.tick(&mut log, 5.0);
        assert_eq!(log.len(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_when_waits_for_predicate() {
        let mut scheduler = Scheduler::<i32>::new();
        let mut value = 0;
        scheduler.when(|v| *v >= 3, |v| *v = 100);

        for _ in 0..3 {
            scheduler.tick(&mut value, 0.1);
            value += 1;
        }
        assert_eq!(value, 3);
        scheduler.tick(&mut value, 0.1);
        assert_eq!(value, 100);
    }

    #[test]
    fn test_for_duration_ticks_until_expiry() {
        let mut scheduler = Scheduler::<u32>::new();
        let mut ticks = 0;
        scheduler.for_duration(0.35, |t, _dt| *t += 1);
        for _ in 0..10 {
            scheduler.tick(&mut ticks, 0.1);
        }
        assert_eq!(ticks, 4);
    }

    #[test]
    fn test_paused_clock_stands_still() {
        let mut scheduler = Scheduler::<u32>::new();
        let mut hits = 0;
        scheduler.after(0.1, |h| *h += 1);
        scheduler.set_paused(true);
        scheduler.tick(&mut hits, 1.0);
        assert_eq!(hits, 0);
        assert!(scheduler.clock().abs() < 0.001);

        scheduler.set_paused(false);
        scheduler.tick(&mut hits, 0.1);
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_stale_epoch_is_dropped() {
        let mut scheduler = Scheduler::<u32>::new();
        let mut hits = 0;
        scheduler.after(0.0, |h| *h += 1);
        scheduler.advance_epoch();
        scheduler.after(0.0, |h| *h += 10);
        scheduler.tick(&mut hits, 0.1);
        assert_eq!(hits, 10);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::<u32>::new();
        let mut hits = 0;
        let id = scheduler.after(0.0, |h| *h += 1);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        scheduler.tick(&mut hits, 0.1);
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_split_and_merge() {
        let mut scheduler = Scheduler::<u32>::new();
        scheduler.after(1.0, |_| {});
        scheduler.advance(0.5);

        let mut running = scheduler.take_pending();
        assert!(scheduler.is_empty());
        scheduler.after(1.0, |_| {});

        let mut ctx = 0;
        running.run_due(&mut ctx, 0.0);
        scheduler.merge(running);
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn test_epoch_bump_inside_run_drops_later_tasks() {
        let mut world = World::default();
        world.scheduler.after(0.0, |w: &mut World| {
            w.scheduler.advance_epoch();
        });
        world.scheduler.after(0.0, |w: &mut World| w.hits += 1);
        world.scheduler.when(|_| true, |w: &mut World| w.hits += 1);

        world.tick(0.1);
        assert_eq!(world.hits, 0);
        assert!(world.scheduler.is_empty());
        assert_eq!(world.scheduler.epoch(), 1);
    }

    #[test]
    fn test_cancel_inside_run_reaches_later_task() {
        let mut world = World::default();
        let target = Rc::new(Cell::new(None));
        let slot = Rc::clone(&target);
        world.scheduler.after(0.0, move |w: &mut World| {
            if let Some(id) = slot.get() {
                w.cancelled = w.scheduler.cancel(id);
            }
        });
        target.set(Some(world.scheduler.after(0.0, |w: &mut World| w.hits += 1)));

        world.tick(0.1);
        assert!(world.cancelled);
        assert_eq!(world.hits, 0);
        assert!(world.scheduler.is_empty());
    }

    #[test]
    fn test_cancel_inside_run_stops_running_task() {
        let mut world = World::default();
        let ticking = world.scheduler.for_duration(1.0, |w: &mut World, _dt| w.hits += 1);
        world.scheduler.after(0.0, move |w: &mut World| {
            w.cancelled = w.scheduler.cancel(ticking);
        });

        world.tick(0.1);
        assert!(world.cancelled);
        assert_eq!(world.hits, 1);
        assert!(world.scheduler.is_empty());

        world.tick(0.1);
        assert_eq!(world.hits, 1);
        assert!(!world.scheduler.cancel(ticking));
    }
}
