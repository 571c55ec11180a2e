use std::mem;
use std::pin::Pin;
use std::task::{Poll, ready};

use bytes::BytesMut;
use tokio::sync::{mpsc, oneshot};

use super::decoder::Decoder;
use super::encoder::{self, Encoder};
use super::error::ParseError;
use super::parser::{self, Header, StatusLine};
use crate::body::{self, Body};
use crate::common::ParseResult;
use crate::error::{Error, ErrorKind, Result};
use crate::headers::standard::CONNECTION;
use crate::headers::{HeaderMap, HeaderName, HeaderValue};
use crate::http::{Method, StatusCode, Version};
use crate::io::{self, Io};
use crate::log::{debug, error, trace};
use crate::request::Request;
use crate::response::{self, Response};

const INIT_BUFFER_CAP: usize = 8 * 1024;

/// Default limit of header fields in a response head.
pub(crate) const DEFAULT_MAX_HEADERS: usize = 100;

/// Default limit of a response head size.
pub(crate) const DEFAULT_MAX_BUF_SIZE: usize = 400 * 1024;

/// Smallest accepted response head size limit.
pub(crate) const MIN_BUF_SIZE: usize = INIT_BUFFER_CAP;

/// Request sent to the connection task, with the channel to deliver its response.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) request: Request,
    pub(crate) reply: oneshot::Sender<Result<Response>>,
}

/// Connection limits.
#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) max_headers: usize,
    pub(crate) max_buf_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_headers: DEFAULT_MAX_HEADERS,
            max_buf_size: DEFAULT_MAX_BUF_SIZE,
        }
    }
}

/// HTTP/1 client connection task.
///
/// Serves one request at a time from the dispatch channel: write the request, read the response
/// head, then stream the response body on demand of its [`Body`].
#[derive(Debug)]
pub(crate) struct Connection {
    io: Io,
    rx: mpsc::UnboundedReceiver<Envelope>,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
    config: Config,
    keep_alive: bool,
    phase: Phase,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Write {
        body: Body,
        encoder: Encoder,
        done: bool,
        exchange: Exchange,
    },
    ReadHead {
        head: Head,
        exchange: Exchange,
    },
    ReadBody {
        decoder: Decoder,
        sender: body::Sender,
    },
    Closed,
}

/// In flight request state.
#[derive(Debug)]
struct Exchange {
    reply: oneshot::Sender<Result<Response>>,
    is_head: bool,
}

#[derive(Debug, Default)]
struct Head {
    line: Option<StatusLine>,
    headers: HeaderMap,
    /// bytes consumed by the head so far
    size: usize,
}

impl Connection {
    pub(crate) fn new(io: Io, rx: mpsc::UnboundedReceiver<Envelope>, config: Config) -> Self {
        Self {
            io,
            rx,
            read_buffer: BytesMut::with_capacity(INIT_BUFFER_CAP),
            write_buffer: BytesMut::with_capacity(INIT_BUFFER_CAP),
            config,
            keep_alive: true,
            phase: Phase::Idle,
        }
    }

    fn try_poll(&mut self, cx: &mut std::task::Context) -> Poll<Result<()>> {
        loop {
            match &mut self.phase {
                Phase::Idle => {
                    let Some(Envelope { request, reply }) = ready!(self.rx.poll_recv(cx)) else {
                        debug!("client dropped, connection shutdown");
                        return Poll::Ready(Ok(()));
                    };

                    let (parts, body) = request.into_parts();
                    if !is_keep_alive(parts.version, &parts.headers) {
                        self.keep_alive = false;
                    }

                    let encoder = encoder::encode_head(&parts, &body, &mut self.write_buffer);
                    trace!("request head encoded, body: {encoder:?}");

                    self.phase = Phase::Write {
                        body,
                        encoder,
                        done: false,
                        exchange: Exchange {
                            reply,
                            is_head: parts.method == Method::HEAD,
                        },
                    };
                }
                Phase::Write { body, encoder, done, .. } => {
                    loop {
                        ready!(io::poll_write_all(&mut self.io, &mut self.write_buffer, cx))?;

                        if *done {
                            break;
                        }
                        if encoder.is_eof() {
                            *done = true;
                            continue;
                        }

                        match ready!(body.poll_data(cx)) {
                            Some(Ok(chunk)) => encoder.encode(chunk, &mut self.write_buffer)?,
                            Some(Err(err)) => return Poll::Ready(Err(err)),
                            None => {
                                encoder.encode_eof(&mut self.write_buffer)?;
                                *done = true;
                            }
                        }
                    }

                    let Phase::Write { exchange, .. } = mem::replace(&mut self.phase, Phase::Closed)
                    else {
                        unreachable!()
                    };
                    trace!("request written");
                    self.phase = Phase::ReadHead {
                        head: Head::default(),
                        exchange,
                    };
                }
                Phase::ReadHead { head, .. } => {
                    ready!(poll_head(
                        &mut self.io,
                        &mut self.read_buffer,
                        &self.config,
                        head,
                        cx
                    ))?;

                    let Phase::ReadHead { head, exchange } =
                        mem::replace(&mut self.phase, Phase::Closed)
                    else {
                        unreachable!()
                    };
                    let Some(line) = head.line else {
                        unreachable!()
                    };

                    self.phase = self.dispatch(line, head.headers, exchange)?;
                }
                Phase::ReadBody { decoder, sender } => {
                    if ready!(sender.poll_want(cx)).is_err() {
                        debug!("response body dropped, connection closed");
                        self.keep_alive = false;
                        self.phase = Phase::Closed;
                        continue;
                    }

                    match decoder.decode(&mut self.read_buffer) {
                        ParseResult::Ok(Some(chunk)) => sender.send_data(chunk),
                        ParseResult::Ok(None) => {
                            sender.send_eof();
                            self.phase = self.next_phase();
                        }
                        ParseResult::Err(err) => return Poll::Ready(Err(err.into())),
                        ParseResult::Pending => {
                            let read = ready!(io::poll_read_buf(
                                &mut self.io,
                                &mut self.read_buffer,
                                INIT_BUFFER_CAP,
                                cx
                            ))?;
                            if read == 0 {
                                if !decoder.is_eof_delimited() {
                                    return Poll::Ready(Err(ErrorKind::UnexpectedEof.into()));
                                }
                                sender.send_eof();
                                self.keep_alive = false;
                                self.phase = Phase::Closed;
                            }
                        }
                    }
                }
                Phase::Closed => return Poll::Ready(Ok(())),
            }
        }
    }

    /// Deliver the response, returns the phase that serves its body.
    fn dispatch(
        &mut self,
        line: StatusLine,
        headers: HeaderMap,
        exchange: Exchange,
    ) -> Result<Phase> {
        let status = line.status;

        if status.is_informational() && status != StatusCode::SWITCHING_PROTOCOLS {
            trace!("informational response {status} ignored");
            return Ok(Phase::ReadHead {
                head: Head::default(),
                exchange,
            });
        }

        if !is_keep_alive(line.version, &headers) {
            self.keep_alive = false;
        }

        let decoder = if exchange.is_head
            || status.is_informational()
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED
        {
            Decoder::Length(0)
        } else {
            match Decoder::new(&headers) {
                Ok(decoder) => decoder,
                Err(err) => {
                    let err = Error::from(err);
                    let _ = exchange.reply.send(Err(err.duplicate()));
                    return Err(err);
                }
            }
        };

        if decoder.is_eof_delimited() || status == StatusCode::SWITCHING_PROTOCOLS {
            self.keep_alive = false;
        }

        debug!("response {status}, body: {decoder:?}");

        let parts = response::Parts {
            version: line.version,
            status,
            reason: line.reason,
            headers,
        };

        let (phase, body) = match decoder {
            Decoder::Length(0) => (self.next_phase(), Body::empty()),
            decoder => {
                let (sender, recv) = body::channel();
                let body = Body::incoming(recv, decoder.content_length());
                (Phase::ReadBody { decoder, sender }, body)
            }
        };

        if exchange.reply.send(Ok(Response::from_parts(parts, body))).is_err() {
            trace!("response receiver dropped");
        }

        Ok(phase)
    }

    fn next_phase(&self) -> Phase {
        match self.keep_alive {
            true => Phase::Idle,
            false => Phase::Closed,
        }
    }

    /// Route a fault to whoever is waiting on the current exchange.
    fn fail(&mut self, err: &Error) {
        match mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Write { exchange, .. } | Phase::ReadHead { exchange, .. } => {
                let _ = exchange.reply.send(Err(err.duplicate()));
            }
            Phase::ReadBody { mut sender, .. } => sender.send_error(err.duplicate()),
            Phase::Idle | Phase::Closed => {}
        }
    }
}

impl Future for Connection {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        let me = self.get_mut();
        match ready!(me.try_poll(cx)) {
            Ok(()) => Poll::Ready(Ok(())),
            Err(err) => {
                error!("connection error: {err}");
                me.fail(&err);
                Poll::Ready(Err(err))
            }
        }
    }
}

// ===== Helpers =====

/// Read and parse the response head until the empty line.
fn poll_head(
    io: &mut Io,
    read_buffer: &mut BytesMut,
    config: &Config,
    head: &mut Head,
    cx: &mut std::task::Context,
) -> Poll<Result<()>> {
    loop {
        let before = read_buffer.len();

        let result = match head.line {
            None => match parser::parse_status_chunk(read_buffer) {
                ParseResult::Ok(line) => {
                    head.line = Some(line);
                    ParseResult::Ok(false)
                }
                ParseResult::Err(err) => ParseResult::Err(err),
                ParseResult::Pending => ParseResult::Pending,
            },
            Some(_) => match parser::parse_header_chunk(read_buffer) {
                ParseResult::Ok(Some(header)) => {
                    if head.headers.len() >= config.max_headers {
                        ParseResult::Err(ParseError::TooManyHeaders)
                    } else {
                        match append_header(&mut head.headers, header) {
                            Ok(()) => ParseResult::Ok(false),
                            Err(err) => ParseResult::Err(err),
                        }
                    }
                }
                ParseResult::Ok(None) => ParseResult::Ok(true),
                ParseResult::Err(err) => ParseResult::Err(err),
                ParseResult::Pending => ParseResult::Pending,
            },
        };

        head.size += before - read_buffer.len();

        match result {
            ParseResult::Ok(true) => return Poll::Ready(Ok(())),
            ParseResult::Ok(false) => continue,
            ParseResult::Err(err) => return Poll::Ready(Err(err.into())),
            ParseResult::Pending => {}
        }

        if head.size + read_buffer.len() >= config.max_buf_size {
            return Poll::Ready(Err(ErrorKind::MessageHeadTooLarge.into()));
        }

        let read = ready!(io::poll_read_buf(io, read_buffer, INIT_BUFFER_CAP, cx))?;
        if read == 0 {
            return Poll::Ready(Err(ErrorKind::UnexpectedEof.into()));
        }
    }
}

fn append_header(headers: &mut HeaderMap, header: Header) -> Result<(), ParseError> {
    let Header { name: orig, value } = header;
    let name = HeaderName::from_slice(&orig).map_err(|_| ParseError::InvalidHeader)?;
    let value = HeaderValue::from_bytes(value).map_err(|_| ParseError::InvalidHeader)?;
    headers.append_cased(name, orig, value);
    Ok(())
}

/// Persistence of a connection per message version and `Connection` header.
fn is_keep_alive(version: Version, headers: &HeaderMap) -> bool {
    let mut keep_alive = version.is_keep_alive_default();
    for value in headers.get_all(CONNECTION) {
        for option in value.as_bytes().split(|&b| b == b',') {
            let option = option.trim_ascii();
            if option.eq_ignore_ascii_case(b"close") {
                return false;
            }
            if option.eq_ignore_ascii_case(b"keep-alive") {
                keep_alive = true;
            }
        }
    }
    keep_alive
}
