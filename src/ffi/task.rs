use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::ptr;
use std::sync::Arc;

use super::Buf;
use super::error::Code;
use crate::log::warning;
use crate::rt::{Context, Executor, Task, TaskType, TaskValue, Waker};

// ===== Executor =====

ffi_fn! {
    /// Creates a new task executor.
    fn tsue_executor_new() -> *const Executor {
        Arc::into_raw(Executor::new())
    } ?= ptr::null()
}

ffi_fn! {
    /// Frees an executor and any incomplete tasks still owned by it.
    fn tsue_executor_free(exec: *const Executor) {
        drop(non_null!(Arc::from_raw(exec) ?= ()));
    }
}

ffi_fn! {
    /// Push a task onto the executor.
    ///
    /// The executor takes ownership of the task, which must not be accessed again until it is
    /// returned by `tsue_executor_poll`.
    fn tsue_executor_push(exec: *const Executor, task: *mut Task) -> Code {
        let exec = non_null!(&*exec ?= Code::InvalidArg);
        let task = non_null!(Box::from_raw(task) ?= Code::InvalidArg);
        exec.push(task);
        Code::Ok
    } ?= Code::InvalidArg
}

ffi_fn! {
    /// Polls the executor, driving every ready task.
    ///
    /// Returns one completed task, or null if none is ready. Keep calling until null is returned
    /// to collect every completion.
    fn tsue_executor_poll(exec: *const Executor) -> *mut Task {
        // the executor is borrowed, not consumed
        let exec = ManuallyDrop::new(non_null!(Arc::from_raw(exec) ?= ptr::null_mut()));
        match exec.poll_next() {
            Some(task) => Box::into_raw(task),
            None => ptr::null_mut(),
        }
    } ?= ptr::null_mut()
}

// ===== Task =====

ffi_fn! {
    /// Free a task.
    ///
    /// A task that is not complete is aborted.
    fn tsue_task_free(task: *mut Task) {
        drop(non_null!(Box::from_raw(task) ?= ()));
    }
}

ffi_fn! {
    /// Takes the output value of a completed task.
    ///
    /// Must only be called once, subsequent calls return null. The returned pointer must be cast
    /// according to `tsue_task_type`, and is owned by the caller.
    fn tsue_task_value(task: *mut Task) -> *mut c_void {
        let task = non_null!(&mut *task ?= ptr::null_mut());

        let Some(value) = task.take_value() else {
            if task.is_complete() && task.kind() != TaskType::Empty {
                warning!("task value taken more than once");
            }
            return ptr::null_mut();
        };

        match value {
            TaskValue::Empty => ptr::null_mut(),
            TaskValue::Error(err) => Box::into_raw(Box::new(err)).cast(),
            TaskValue::ClientConn(conn) => Box::into_raw(Box::new(conn)).cast(),
            TaskValue::Response(res) => Box::into_raw(Box::new(res)).cast(),
            TaskValue::Buf(bytes) => Box::into_raw(Box::new(Buf::new(bytes))).cast(),
        }
    } ?= ptr::null_mut()
}

ffi_fn! {
    /// Query the return type of this task.
    ///
    /// `TSUE_TASK_EMPTY` until the task completes.
    fn tsue_task_type(task: *mut Task) -> TaskType {
        non_null!(&*task ?= TaskType::Empty).kind()
    } ?= TaskType::Empty
}

ffi_fn! {
    /// Set a user data pointer associated with the task.
    fn tsue_task_set_userdata(task: *mut Task, userdata: *mut c_void) {
        non_null!(&mut *task ?= ()).set_userdata(userdata);
    }
}

ffi_fn! {
    /// Retrieve the user data pointer associated with the task.
    fn tsue_task_userdata(task: *mut Task) -> *mut c_void {
        non_null!(&*task ?= ptr::null_mut()).userdata()
    } ?= ptr::null_mut()
}

// ===== Context =====

ffi_fn! {
    /// Creates a waker associated with the task context.
    ///
    /// The waker must be consumed by either `tsue_waker_wake` or `tsue_waker_free`.
    fn tsue_context_waker(cx: *mut Context<'_>) -> *mut Waker {
        let waker = non_null!(&*cx ?= ptr::null_mut()).waker();
        Box::into_raw(Box::new(waker))
    } ?= ptr::null_mut()
}

// ===== Waker =====

ffi_fn! {
    /// Free a waker without waking it.
    fn tsue_waker_free(waker: *mut Waker) {
        drop(non_null!(Box::from_raw(waker) ?= ()));
    }
}

ffi_fn! {
    /// Wake the task associated with the waker, consuming it.
    ///
    /// May be called from any thread.
    fn tsue_waker_wake(waker: *mut Waker) {
        non_null!(Box::from_raw(waker) ?= ()).wake();
    }
}
