use std::ffi::c_void;
use std::pin::Pin;
use std::task::Poll;

use bytes::Bytes;

use crate::client::ClientConn;
use crate::common::UserData;
use crate::error::Error;
use crate::response::Response;

type BoxFuture = Pin<Box<dyn Future<Output = TaskValue> + Send>>;

/// Type erased unit of asynchronous work.
///
/// A task is polled by an [`Executor`] until it completes, after which its [`TaskValue`] can be
/// taken exactly once.
///
/// [`Executor`]: super::Executor
pub struct Task {
    future: Option<BoxFuture>,
    output: Option<TaskValue>,
    kind: TaskType,
    userdata: UserData,
}

/// Tag of a [`TaskValue`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskType {
    /// No value, or the task is not complete.
    Empty,
    /// The task failed with an [`Error`].
    Error,
    /// A connection returned by a handshake.
    ClientConn,
    /// A response returned by a send.
    Response,
    /// A chunk of body.
    Buf,
}

/// Output of a completed [`Task`].
#[derive(Debug)]
pub enum TaskValue {
    Empty,
    Error(Error),
    ClientConn(ClientConn),
    Response(Response),
    Buf(Bytes),
}

impl TaskValue {
    pub fn kind(&self) -> TaskType {
        match self {
            TaskValue::Empty => TaskType::Empty,
            TaskValue::Error(_) => TaskType::Error,
            TaskValue::ClientConn(_) => TaskType::ClientConn,
            TaskValue::Response(_) => TaskType::Response,
            TaskValue::Buf(_) => TaskType::Buf,
        }
    }
}

impl Task {
    /// Create a boxed task from a future.
    pub(crate) fn new<F>(future: F) -> Box<Task>
    where
        F: Future + Send + 'static,
        F::Output: IntoTaskValue,
    {
        Box::new(Task {
            future: Some(Box::pin(async move { future.await.into_task_value() })),
            output: None,
            kind: TaskType::Empty,
            userdata: UserData::null(),
        })
    }

    /// Poll the inner future, returns `Ready` once the output is stored.
    pub(crate) fn poll(&mut self, cx: &mut std::task::Context) -> Poll<()> {
        let Some(future) = &mut self.future else {
            return Poll::Ready(());
        };
        let output = std::task::ready!(future.as_mut().poll(cx));
        self.future = None;
        self.kind = output.kind();
        self.output = Some(output);
        Poll::Ready(())
    }

    /// Returns `true` if the task has completed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.future.is_none()
    }

    /// Returns the output tag, [`TaskType::Empty`] if the task is not complete.
    ///
    /// The tag is kept after the value is taken.
    #[inline]
    pub fn kind(&self) -> TaskType {
        self.kind
    }

    /// Takes the output, returns `None` if not complete or already taken.
    #[inline]
    pub fn take_value(&mut self) -> Option<TaskValue> {
        self.output.take()
    }

    #[inline]
    pub fn userdata(&self) -> *mut c_void {
        self.userdata.0
    }

    #[inline]
    pub fn set_userdata(&mut self, userdata: *mut c_void) {
        self.userdata = UserData(userdata);
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("complete", &self.is_complete())
            .field("kind", &self.kind)
            .field("userdata", &self.userdata)
            .finish()
    }
}

// ===== Conversion =====

/// Conversion from a future output into a [`TaskValue`].
pub(crate) trait IntoTaskValue {
    fn into_task_value(self) -> TaskValue;
}

impl IntoTaskValue for () {
    fn into_task_value(self) -> TaskValue {
        TaskValue::Empty
    }
}

impl IntoTaskValue for ClientConn {
    fn into_task_value(self) -> TaskValue {
        TaskValue::ClientConn(self)
    }
}

impl IntoTaskValue for Response {
    fn into_task_value(self) -> TaskValue {
        TaskValue::Response(self)
    }
}

impl IntoTaskValue for Bytes {
    fn into_task_value(self) -> TaskValue {
        TaskValue::Buf(self)
    }
}

impl<T: IntoTaskValue> IntoTaskValue for Option<T> {
    fn into_task_value(self) -> TaskValue {
        match self {
            Some(value) => value.into_task_value(),
            None => TaskValue::Empty,
        }
    }
}

impl<T: IntoTaskValue> IntoTaskValue for Result<T, Error> {
    fn into_task_value(self) -> TaskValue {
        match self {
            Ok(value) => value.into_task_value(),
            Err(err) => TaskValue::Error(err),
        }
    }
}
