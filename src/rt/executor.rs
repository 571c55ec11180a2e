use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Poll, Wake};

use super::Task;
use crate::log::{debug, trace};

/// Single threaded cooperative task scheduler.
///
/// Only tasks that were woken, or newly pushed, since the last call are polled. Completed tasks
/// are handed back to the application by [`poll_next`][Executor::poll_next].
pub struct Executor {
    ready: Arc<ReadyQueue>,
    tasks: Mutex<Slab>,
    completed: Mutex<VecDeque<Box<Task>>>,
}

/// Weak handle used by futures to spawn more tasks on their executor.
#[derive(Clone, Default)]
pub(crate) struct WeakExec(Weak<Executor>);

/// Stable identity of a task while it is owned by an executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TaskId {
    slot: usize,
    generation: u64,
}

struct ReadyQueue {
    queue: Mutex<VecDeque<TaskId>>,
}

/// Per task waker, shared by every [`std::task::Waker`] cloned from it.
struct TaskWaker {
    id: TaskId,
    /// set while the task is in the ready queue
    queued: AtomicBool,
    queue: Weak<ReadyQueue>,
}

#[derive(Default)]
struct Slab {
    slots: Vec<Slot>,
    vacant: Vec<usize>,
}

struct Slot {
    generation: u64,
    entry: Entry,
}

/// Outcome of a single task poll.
enum Polled {
    /// completed, or pending until woken
    Done,
    /// pending, and already woken during the poll
    Yielded,
}

enum Entry {
    Vacant,
    Idle(Box<Task>, Arc<TaskWaker>),
    /// task is moved out while being polled
    Running,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ===== Executor =====

impl Executor {
    /// Create new [`Executor`].
    pub fn new() -> Arc<Executor> {
        Arc::new(Executor {
            ready: Arc::new(ReadyQueue {
                queue: Mutex::new(VecDeque::new()),
            }),
            tasks: Mutex::new(Slab::default()),
            completed: Mutex::new(VecDeque::new()),
        })
    }

    pub(crate) fn downgrade(exec: &Arc<Executor>) -> WeakExec {
        WeakExec(Arc::downgrade(exec))
    }

    /// Push a task to be polled on the next [`poll_next`][Executor::poll_next].
    ///
    /// A task that already completed is handed back by the next poll.
    pub fn push(&self, task: Box<Task>) {
        let id = lock(&self.tasks).insert(task, &self.ready);
        trace!("task {}:{} pushed", id.slot, id.generation);
        self.ready.push(id);
    }

    /// Drive every ready task until it completes or is pending, then returns the oldest
    /// completed task if any.
    ///
    /// Tasks spawned, or woken by another task, while polling are driven within the same call.
    /// A task that wakes itself during its own poll is yielding, it is polled again on the next
    /// call. When more than one task completes, the rest are returned by subsequent calls.
    pub fn poll_next(&self) -> Option<Box<Task>> {
        let mut yielded = Vec::new();
        while let Some(id) = self.ready.pop() {
            if yielded.contains(&id) {
                continue;
            }
            if let Polled::Yielded = self.poll_task(id) {
                yielded.push(id);
            }
        }
        // still marked queued, so later wakes do not push them twice
        for id in yielded {
            self.ready.push(id);
        }
        lock(&self.completed).pop_front()
    }

    fn poll_task(&self, id: TaskId) -> Polled {
        let Some((mut task, task_waker)) = lock(&self.tasks).checkout(id) else {
            // stale wake of a completed task
            return Polled::Done;
        };

        task_waker.queued.store(false, Ordering::Release);

        let waker = std::task::Waker::from(task_waker.clone());
        let mut cx = std::task::Context::from_waker(&waker);

        match task.poll(&mut cx) {
            Poll::Ready(()) => {
                debug!("task {}:{} completed as {:?}", id.slot, id.generation, task.kind());
                lock(&self.tasks).remove(id);
                lock(&self.completed).push_back(task);
                Polled::Done
            }
            Poll::Pending => {
                let yielded = task_waker.queued.load(Ordering::Acquire);
                lock(&self.tasks).checkin(id, task, task_waker);
                match yielded {
                    true => {
                        trace!("task {}:{} yielded", id.slot, id.generation);
                        Polled::Yielded
                    }
                    false => Polled::Done,
                }
            }
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

// ===== WeakExec =====

impl WeakExec {
    pub(crate) fn upgrade(&self) -> Option<Arc<Executor>> {
        self.0.upgrade()
    }
}

impl std::fmt::Debug for WeakExec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("WeakExec").field(&(self.0.strong_count() > 0)).finish()
    }
}

// ===== Ready Queue =====

impl ReadyQueue {
    fn push(&self, id: TaskId) {
        lock(&self.queue).push_back(id);
    }

    fn pop(&self) -> Option<TaskId> {
        lock(&self.queue).pop_front()
    }
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        if self.queued.swap(true, Ordering::AcqRel) {
            return;
        }
        // executor is gone, nothing to schedule
        if let Some(queue) = self.queue.upgrade() {
            queue.push(self.id);
        }
    }
}

// ===== Slab =====

impl Slab {
    fn insert(&mut self, task: Box<Task>, ready: &Arc<ReadyQueue>) -> TaskId {
        let slot = match self.vacant.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Entry::Vacant,
                });
                self.slots.len() - 1
            }
        };

        let id = TaskId {
            slot,
            generation: self.slots[slot].generation,
        };
        let waker = Arc::new(TaskWaker {
            id,
            // the initial poll is scheduled by the caller
            queued: AtomicBool::new(true),
            queue: Arc::downgrade(ready),
        });
        self.slots[slot].entry = Entry::Idle(task, waker);
        id
    }

    fn checkout(&mut self, id: TaskId) -> Option<(Box<Task>, Arc<TaskWaker>)> {
        let slot = self.slots.get_mut(id.slot)?;
        if slot.generation != id.generation || !matches!(slot.entry, Entry::Idle(..)) {
            return None;
        }
        match std::mem::replace(&mut slot.entry, Entry::Running) {
            Entry::Idle(task, waker) => Some((task, waker)),
            _ => None,
        }
    }

    fn checkin(&mut self, id: TaskId, task: Box<Task>, waker: Arc<TaskWaker>) {
        if let Some(slot) = self.slots.get_mut(id.slot) {
            slot.entry = Entry::Idle(task, waker);
        }
    }

    fn remove(&mut self, id: TaskId) {
        if let Some(slot) = self.slots.get_mut(id.slot) {
            slot.entry = Entry::Vacant;
            slot.generation = slot.generation.wrapping_add(1);
            self.vacant.push(id.slot);
        }
    }
}
