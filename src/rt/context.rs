/// Task context handed to application callbacks.
///
/// Only valid for the duration of the callback it is passed to.
#[repr(transparent)]
pub struct Context<'a>(std::task::Context<'a>);

/// Handle that schedules a task to be polled again.
///
/// Can be sent to, and woken from, any thread.
pub struct Waker {
    waker: std::task::Waker,
}

impl<'a> Context<'a> {
    /// Reinterprets a [`std::task::Context`] as the callback context.
    pub(crate) fn wrap<'b>(cx: &'b mut std::task::Context<'a>) -> &'b mut Context<'a> {
        // SAFETY: `Context` is a transparent wrapper of `std::task::Context`
        unsafe { &mut *(cx as *mut std::task::Context<'a>).cast::<Context<'a>>() }
    }

    /// Returns a new waker for the task currently polled.
    pub fn waker(&self) -> Waker {
        Waker {
            waker: self.0.waker().clone(),
        }
    }
}

impl Waker {
    /// Schedule the task, consuming the waker.
    #[inline]
    pub fn wake(self) {
        self.waker.wake();
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Context").field(&self.0).finish()
    }
}

impl std::fmt::Debug for Waker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Waker").field(&self.waker).finish()
    }
}
