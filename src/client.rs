//! HTTP/1 client connection.
use std::future::poll_fn;

use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, ErrorKind, Result};
use crate::h1::{self, Config, Connection, Envelope};
use crate::io::Io;
use crate::log::debug;
use crate::request::Request;
use crate::response::Response;
use crate::rt::{Executor, Task, WeakExec};

/// Handle to a negotiated connection.
///
/// Requests are handed to the background connection task, which must be kept polled by the
/// executor the connection was created with.
#[derive(Debug)]
pub struct ClientConn {
    tx: mpsc::UnboundedSender<Envelope>,
}

/// Options for [`handshake`].
#[derive(Debug, Default)]
pub struct ClientConnOptions {
    exec: WeakExec,
    config: Config,
}

/// An invalid option value.
#[derive(Debug)]
pub struct InvalidOption;

impl ClientConnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the executor that runs the background connection task.
    ///
    /// Only a weak reference is kept.
    pub fn exec(&mut self, exec: &std::sync::Arc<Executor>) {
        self.exec = Executor::downgrade(exec);
    }

    /// Set the maximum number of header fields in a response.
    pub fn max_headers(&mut self, max: usize) -> Result<(), InvalidOption> {
        if max == 0 {
            return Err(InvalidOption);
        }
        self.config.max_headers = max;
        Ok(())
    }

    /// Set the maximum size of a response head.
    pub fn max_buf_size(&mut self, max: usize) -> Result<(), InvalidOption> {
        if max < h1::MIN_BUF_SIZE {
            return Err(InvalidOption);
        }
        self.config.max_buf_size = max;
        Ok(())
    }
}

/// Start a connection over `io`.
///
/// HTTP/1 has no preface, the handshake completes once the transport accepts an empty write. On
/// success the connection task is spawned on the configured executor.
pub async fn handshake(mut io: Io, options: ClientConnOptions) -> Result<ClientConn> {
    poll_fn(|cx| io.poll_ready(cx)).await?;

    let Some(exec) = options.exec.upgrade() else {
        return Err(Error::new(ErrorKind::NoExecutor));
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let conn = Connection::new(io, rx, options.config);
    exec.push(Task::new(conn));

    debug!("handshake complete");
    Ok(ClientConn { tx })
}

impl ClientConn {
    /// Send a request, the returned future resolves with the response head.
    pub fn send(&mut self, request: Request) -> impl Future<Output = Result<Response>> + Send + 'static {
        let (reply, rx) = oneshot::channel();
        let sent = self.tx.send(Envelope { request, reply }).is_ok();

        async move {
            if !sent {
                return Err(Error::closed());
            }
            match rx.await {
                Ok(result) => result,
                // connection ended with the request still queued
                Err(_) => Err(Error::new(ErrorKind::Canceled)),
            }
        }
    }
}

impl std::error::Error for InvalidOption { }

impl std::fmt::Display for InvalidOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid option value")
    }
}
