use std::cell::{Cell, RefCell};
use std::ffi::{CStr, c_int, c_void};
use std::ptr;

use super::body::*;
use super::client::*;
use super::error::*;
use super::http_types::*;
use super::io::*;
use super::task::*;
use super::*;
use crate::client::{ClientConn, ClientConnOptions};
use crate::error::Error;
use crate::headers::HeaderMap;
use crate::io::Io;
use crate::request::Request;
use crate::response::Response;
use crate::rt::{Context, Executor, Task, TaskType, Waker};

// ===== Mock Transport =====

#[derive(Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Ready,
    Pending,
    /// accepts the empty probe, fails once bytes are written
    ErrorOnData,
    Error,
}

struct Mock {
    input: RefCell<Vec<u8>>,
    output: RefCell<Vec<u8>>,
    eof: Cell<bool>,
    write: Cell<WriteMode>,
    waker: Cell<*mut Waker>,
}

impl Mock {
    fn new(input: &[u8]) -> Box<Mock> {
        Box::new(Mock {
            input: RefCell::new(input.to_vec()),
            output: RefCell::new(Vec::new()),
            eof: Cell::new(true),
            write: Cell::new(WriteMode::Ready),
            waker: Cell::new(ptr::null_mut()),
        })
    }

    fn io(&self) -> *mut Io {
        let io = tsue_io_new();
        tsue_io_set_userdata(io, self as *const Mock as *mut c_void);
        tsue_io_set_read(io, mock_read);
        tsue_io_set_write(io, mock_write);
        io
    }

    fn register(&self, cx: *mut Context<'_>) {
        tsue_waker_free(self.waker.replace(tsue_context_waker(cx)));
    }

    fn wake(&self) {
        tsue_waker_wake(self.waker.replace(ptr::null_mut()));
    }

    fn output(&self) -> String {
        String::from_utf8(self.output.borrow().clone()).unwrap()
    }
}

impl Drop for Mock {
    fn drop(&mut self) {
        tsue_waker_free(self.waker.get());
    }
}

extern "C" fn mock_read(userdata: *mut c_void, cx: *mut Context<'_>, buf: *mut u8, cap: usize) -> usize {
    let mock = unsafe { &*(userdata as *const Mock) };
    let mut input = mock.input.borrow_mut();
    if input.is_empty() {
        if mock.eof.get() {
            return 0;
        }
        mock.register(cx);
        return TSUE_IO_PENDING;
    }
    let n = input.len().min(cap);
    unsafe { ptr::copy_nonoverlapping(input.as_ptr(), buf, n) };
    input.drain(..n);
    n
}

extern "C" fn mock_write(userdata: *mut c_void, cx: *mut Context<'_>, buf: *const u8, len: usize) -> usize {
    let mock = unsafe { &*(userdata as *const Mock) };
    match mock.write.get() {
        WriteMode::Pending => {
            mock.register(cx);
            TSUE_IO_PENDING
        }
        WriteMode::Error => TSUE_IO_ERROR,
        WriteMode::ErrorOnData if len > 0 => TSUE_IO_ERROR,
        WriteMode::Ready | WriteMode::ErrorOnData => {
            let bytes = unsafe { std::slice::from_raw_parts(buf, len) };
            mock.output.borrow_mut().extend_from_slice(bytes);
            len
        }
    }
}

// ===== Helpers =====

/// Poll until no task completes, every completed task is collected.
fn poll_all(exec: *const Executor) -> Vec<*mut Task> {
    let mut tasks = vec![];
    loop {
        let task = tsue_executor_poll(exec);
        if task.is_null() {
            return tasks;
        }
        tasks.push(task);
    }
}

/// Takes the completed task tagged with `tag`, freeing nothing else.
fn take_tagged(tasks: &mut Vec<*mut Task>, tag: usize) -> *mut Task {
    let i = tasks
        .iter()
        .position(|&t| tsue_task_userdata(t) == tag as *mut c_void)
        .unwrap();
    tasks.remove(i)
}

fn free_all(tasks: Vec<*mut Task>) {
    for task in tasks {
        tsue_task_free(task);
    }
}

fn push_tagged(exec: *const Executor, task: *mut Task, tag: usize) {
    assert!(!task.is_null());
    tsue_task_set_userdata(task, tag as *mut c_void);
    assert_eq!(tsue_executor_push(exec, task), Code::Ok);
}

const HANDSHAKE: usize = 1;
const SEND: usize = 2;
const BODY: usize = 3;

fn handshake(exec: *const Executor, mock: &Mock) -> *mut ClientConn {
    handshake_with(exec, mock, tsue_clientconn_options_new())
}

fn handshake_with(exec: *const Executor, mock: &Mock, opts: *mut ClientConnOptions) -> *mut ClientConn {
    tsue_clientconn_options_exec(opts, exec);
    push_tagged(exec, tsue_clientconn_handshake(mock.io(), opts), HANDSHAKE);

    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, HANDSHAKE);
    assert_eq!(tsue_task_type(task), TaskType::ClientConn);
    let conn = tsue_task_value(task).cast::<ClientConn>();
    tsue_task_free(task);
    free_all(tasks);
    conn
}

fn get(uri: &[u8]) -> *mut Request {
    let req = tsue_request_new();
    assert_eq!(tsue_request_set_method(req, b"GET".as_ptr(), 3), Code::Ok);
    assert_eq!(tsue_request_set_uri(req, uri.as_ptr(), uri.len()), Code::Ok);
    req
}

/// Sends a request and expects a response, with no other task completing.
fn send_ok(exec: *const Executor, conn: *mut ClientConn, req: *mut Request) -> *mut Response {
    push_tagged(exec, tsue_clientconn_send(conn, req), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert!(tasks.is_empty());
    assert_eq!(tsue_task_type(task), TaskType::Response);
    let res = tsue_task_value(task).cast::<Response>();
    tsue_task_free(task);
    res
}

/// Reads the whole response body, returns it with every other task completed meanwhile.
fn read_body(exec: *const Executor, res: *mut Response) -> (Vec<u8>, Vec<*mut Task>) {
    let mut chunks = Vec::<u8>::new();
    let body = tsue_response_body(res);
    let task = tsue_body_foreach(body, collect_chunk, (&mut chunks as *mut Vec<u8>).cast());
    push_tagged(exec, task, BODY);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, BODY);
    assert_eq!(tsue_task_type(task), TaskType::Empty);
    tsue_task_free(task);
    (chunks, tasks)
}

fn error_message(err: *const Error) -> String {
    let mut dst = [0u8; 256];
    let n = tsue_error_print(err, dst.as_mut_ptr(), dst.len());
    String::from_utf8(dst[..n].to_vec()).unwrap()
}

extern "C" fn collect_header(
    userdata: *mut c_void,
    name: *const u8,
    name_len: usize,
    value: *const u8,
    value_len: usize,
) -> c_int {
    let fields = unsafe { &mut *(userdata as *mut Vec<(String, String)>) };
    let name = unsafe { std::slice::from_raw_parts(name, name_len) };
    let value = unsafe { std::slice::from_raw_parts(value, value_len) };
    fields.push((
        String::from_utf8(name.to_vec()).unwrap(),
        String::from_utf8(value.to_vec()).unwrap(),
    ));
    TSUE_ITER_CONTINUE
}

fn collect_headers(headers: *const HeaderMap) -> Vec<(String, String)> {
    let mut fields = Vec::<(String, String)>::new();
    tsue_headers_foreach(headers, collect_header, (&mut fields as *mut Vec<_>).cast());
    fields
}

extern "C" fn collect_chunk(userdata: *mut c_void, buf: *const Buf) -> c_int {
    let chunks = unsafe { &mut *(userdata as *mut Vec<u8>) };
    let bytes = unsafe { std::slice::from_raw_parts(tsue_buf_bytes(buf), tsue_buf_len(buf)) };
    chunks.extend_from_slice(bytes);
    TSUE_ITER_CONTINUE
}

// ===== Scenarios =====

#[test]
fn handshake_pending_transport() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"");
    mock.write.set(WriteMode::Pending);

    let opts = tsue_clientconn_options_new();
    tsue_clientconn_options_exec(opts, exec);
    push_tagged(exec, tsue_clientconn_handshake(mock.io(), opts), HANDSHAKE);

    assert!(tsue_executor_poll(exec).is_null());
    assert!(tsue_executor_poll(exec).is_null());

    mock.write.set(WriteMode::Ready);
    mock.wake();

    let task = tsue_executor_poll(exec);
    assert_eq!(tsue_task_userdata(task), HANDSHAKE as *mut c_void);
    assert_eq!(tsue_task_type(task), TaskType::ClientConn);
    let conn = tsue_task_value(task).cast::<ClientConn>();
    assert!(!conn.is_null());
    tsue_task_free(task);

    // nothing is written before a request
    assert!(mock.output.borrow().is_empty());

    tsue_clientconn_free(conn);
    let tasks = poll_all(exec);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Empty);
    free_all(tasks);
    tsue_executor_free(exec);
}

#[test]
fn get_without_body() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"HTTP/1.1 200 OK\r\n\r\n");
    let conn = handshake(exec, &mock);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"/")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert!(tasks.is_empty());
    assert_eq!(tsue_task_type(task), TaskType::Response);
    let res = tsue_task_value(task).cast::<Response>();
    // value is taken once
    assert!(tsue_task_value(task).is_null());
    assert_eq!(tsue_task_type(task), TaskType::Response);
    tsue_task_free(task);

    assert_eq!(mock.output(), "GET / HTTP/1.1\r\n\r\n");
    assert_eq!(tsue_response_status(res), 200);
    assert_eq!(tsue_response_version(res), TSUE_HTTP_VERSION_1_1);
    let reason = unsafe {
        std::slice::from_raw_parts(tsue_response_reason_phrase(res), tsue_response_reason_phrase_len(res))
    };
    assert_eq!(reason, b"OK");

    let body = tsue_response_body(res);
    push_tagged(exec, tsue_body_data(body), BODY);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, BODY);
    assert_eq!(tsue_task_type(task), TaskType::Empty);
    assert!(tsue_task_value(task).is_null());
    tsue_task_free(task);

    // close delimited body ends the connection task
    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Empty);
    free_all(tasks);

    tsue_body_free(body);
    tsue_response_free(res);
    tsue_clientconn_free(conn);
    tsue_executor_free(exec);
}

#[test]
fn send_write_error() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"");
    mock.write.set(WriteMode::ErrorOnData);
    let conn = handshake(exec, &mock);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"/")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert_eq!(tsue_task_type(task), TaskType::Error);
    let err = tsue_task_value(task).cast::<Error>();
    assert_eq!(tsue_error_code(err), Code::Error);
    assert!(error_message(err).starts_with("transport error"));
    tsue_error_free(err);
    tsue_task_free(task);

    // the connection task reports the same fault
    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Error);
    free_all(tasks);

    // connection is unusable
    push_tagged(exec, tsue_clientconn_send(conn, get(b"/")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert_eq!(tsue_task_type(task), TaskType::Error);
    tsue_task_free(task);

    tsue_clientconn_free(conn);
    tsue_executor_free(exec);
}

#[test]
fn headers_set_and_add() {
    let req = tsue_request_new();
    let headers = tsue_request_headers(req);

    let set = |name: &[u8], value: &[u8]| {
        tsue_headers_set(headers, name.as_ptr(), name.len(), value.as_ptr(), value.len())
    };
    let add = |name: &[u8], value: &[u8]| {
        tsue_headers_add(headers, name.as_ptr(), name.len(), value.as_ptr(), value.len())
    };

    assert_eq!(set(b"X-Foo", b"a"), Code::Ok);
    assert_eq!(set(b"X-Foo", b"b"), Code::Ok);
    assert_eq!(add(b"Accept", b"text/html"), Code::Ok);
    assert_eq!(add(b"Accept", b"*/*"), Code::Ok);
    assert_eq!(set(b"Bad Name", b"x"), Code::InvalidArg);
    assert_eq!(add(b"X-Bar", b"x\r\ny"), Code::InvalidArg);

    assert_eq!(
        collect_headers(headers),
        [
            ("X-Foo".to_owned(), "b".to_owned()),
            ("Accept".to_owned(), "text/html".to_owned()),
            ("Accept".to_owned(), "*/*".to_owned()),
        ]
    );

    tsue_request_free(req);
}

// ===== Connection =====

#[test]
fn handshake_errors() {
    let exec = tsue_executor_new();

    // probe fails
    let mock = Mock::new(b"");
    mock.write.set(WriteMode::Error);
    let opts = tsue_clientconn_options_new();
    tsue_clientconn_options_exec(opts, exec);
    push_tagged(exec, tsue_clientconn_handshake(mock.io(), opts), HANDSHAKE);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, HANDSHAKE);
    assert!(tasks.is_empty());
    assert_eq!(tsue_task_type(task), TaskType::Error);
    tsue_task_free(task);

    // no executor configured
    let mock = Mock::new(b"");
    let opts = tsue_clientconn_options_new();
    push_tagged(exec, tsue_clientconn_handshake(mock.io(), opts), HANDSHAKE);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, HANDSHAKE);
    assert_eq!(tsue_task_type(task), TaskType::Error);
    let err = tsue_task_value(task).cast::<Error>();
    assert_eq!(error_message(err), "no executor to run the connection task");
    tsue_error_free(err);
    tsue_task_free(task);

    tsue_executor_free(exec);
}

#[test]
fn chunked_body_foreach() {
    let exec = tsue_executor_new();
    let mock = Mock::new(
        b"HTTP/1.1 100 Continue\r\n\r\n\
        HTTP/1.1 200 OK\r\n\
        Transfer-Encoding: chunked\r\n\
        X-Trace: 7\r\n\r\n\
        5\r\nHello\r\n6\r\n World\r\n0\r\n\r\n",
    );
    mock.eof.set(false);
    let conn = handshake(exec, &mock);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"http://example.com/index?q=1")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert_eq!(tsue_task_type(task), TaskType::Response);
    let res = tsue_task_value(task).cast::<Response>();
    tsue_task_free(task);

    assert_eq!(mock.output(), "GET /index?q=1 HTTP/1.1\r\nHost: example.com\r\n\r\n");
    assert_eq!(tsue_response_status(res), 200);
    assert_eq!(
        collect_headers(tsue_response_headers(res)),
        [
            ("Transfer-Encoding".to_owned(), "chunked".to_owned()),
            ("X-Trace".to_owned(), "7".to_owned()),
        ]
    );

    let mut chunks = Vec::<u8>::new();
    let body = tsue_response_body(res);
    let task = tsue_body_foreach(body, collect_chunk, (&mut chunks as *mut Vec<u8>).cast());
    push_tagged(exec, task, BODY);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, BODY);
    assert!(tasks.is_empty());
    assert_eq!(tsue_task_type(task), TaskType::Empty);
    assert_eq!(chunks, b"Hello World");
    tsue_task_free(task);
    tsue_response_free(res);

    // connection is kept alive, freeing the client ends it
    tsue_clientconn_free(conn);
    let tasks = poll_all(exec);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Empty);
    free_all(tasks);
    tsue_executor_free(exec);
}

#[test]
fn body_data_chunks() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"HTTP/1.0 200 OK\r\nContent-Length: 5\r\n\r\nHello");
    let conn = handshake(exec, &mock);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"/")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    let res = tsue_task_value(task).cast::<Response>();
    tsue_task_free(task);
    assert_eq!(tsue_response_version(res), TSUE_HTTP_VERSION_1_0);

    let body = tsue_response_body(res);
    push_tagged(exec, tsue_body_data(body), BODY);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, BODY);
    assert_eq!(tsue_task_type(task), TaskType::Buf);
    let buf = tsue_task_value(task).cast::<Buf>();
    let bytes = unsafe { std::slice::from_raw_parts(tsue_buf_bytes(buf), tsue_buf_len(buf)) };
    assert_eq!(bytes, b"Hello");
    tsue_buf_free(buf);
    tsue_task_free(task);
    assert!(tasks.is_empty());

    push_tagged(exec, tsue_body_data(body), BODY);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, BODY);
    assert_eq!(tsue_task_type(task), TaskType::Empty);
    tsue_task_free(task);

    // HTTP/1.0 closes the connection after the exchange
    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Empty);
    free_all(tasks);

    tsue_body_free(body);
    tsue_response_free(res);
    tsue_clientconn_free(conn);
    tsue_executor_free(exec);
}

#[test]
fn truncated_response() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"HTTP/1.1 200 OK\r\nContent-Le");
    let conn = handshake(exec, &mock);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"/")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert_eq!(tsue_task_type(task), TaskType::Error);
    let err = tsue_task_value(task).cast::<Error>();
    assert_eq!(tsue_error_code(err), Code::UnexpectedEof);
    tsue_error_free(err);
    tsue_task_free(task);
    free_all(tasks);

    tsue_clientconn_free(conn);
    tsue_executor_free(exec);
}

#[test]
fn keep_alive_reuse() {
    let exec = tsue_executor_new();
    let mock = Mock::new(
        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi\
        HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n",
    );
    mock.eof.set(false);
    let conn = handshake(exec, &mock);

    let res = send_ok(exec, conn, get(b"/a"));
    assert_eq!(tsue_response_status(res), 200);
    let (body, tasks) = read_body(exec, res);
    assert_eq!(body, b"hi");
    assert!(tasks.is_empty());
    tsue_response_free(res);

    let res = send_ok(exec, conn, get(b"/b"));
    assert_eq!(tsue_response_status(res), 404);
    let (body, tasks) = read_body(exec, res);
    assert!(body.is_empty());
    assert!(tasks.is_empty());
    tsue_response_free(res);

    assert_eq!(mock.output(), "GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n");

    tsue_clientconn_free(conn);
    let tasks = poll_all(exec);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Empty);
    free_all(tasks);
    tsue_executor_free(exec);
}

#[test]
fn head_response_without_body() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n");
    mock.eof.set(false);
    let conn = handshake(exec, &mock);

    let req = get(b"/");
    assert_eq!(tsue_request_set_method(req, b"HEAD".as_ptr(), 4), Code::Ok);
    let res = send_ok(exec, conn, req);
    assert_eq!(mock.output(), "HEAD / HTTP/1.1\r\n\r\n");
    assert_eq!(
        collect_headers(tsue_response_headers(res)),
        [("Content-Length".to_owned(), "5".to_owned())]
    );

    // the declared length is not read, the connection stays open
    let (body, tasks) = read_body(exec, res);
    assert!(body.is_empty());
    assert!(tasks.is_empty());
    tsue_response_free(res);

    tsue_clientconn_free(conn);
    let tasks = poll_all(exec);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Empty);
    free_all(tasks);
    tsue_executor_free(exec);
}

#[test]
fn connection_close_ends_task() {
    const QUEUED: usize = 4;

    let exec = tsue_executor_new();
    let mock = Mock::new(b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Length: 2\r\n\r\nhi");
    mock.eof.set(false);
    let conn = handshake(exec, &mock);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"/a")), SEND);
    push_tagged(exec, tsue_clientconn_send(conn, get(b"/b")), QUEUED);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert!(tasks.is_empty());
    assert_eq!(tsue_task_type(task), TaskType::Response);
    let res = tsue_task_value(task).cast::<Response>();
    tsue_task_free(task);

    // the connection ends once the body is read, the queued request is never written
    let (body, mut tasks) = read_body(exec, res);
    assert_eq!(body, b"hi");
    tsue_response_free(res);
    assert_eq!(mock.output(), "GET /a HTTP/1.1\r\n\r\n");

    let task = take_tagged(&mut tasks, QUEUED);
    assert_eq!(tsue_task_type(task), TaskType::Error);
    let err = tsue_task_value(task).cast::<Error>();
    assert_eq!(tsue_error_code(err), Code::Error);
    assert_eq!(error_message(err), "operation was canceled");
    tsue_error_free(err);
    tsue_task_free(task);

    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Empty);
    free_all(tasks);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"/c")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    let err = tsue_task_value(task).cast::<Error>();
    assert_eq!(error_message(err), "connection closed");
    tsue_error_free(err);
    tsue_task_free(task);

    tsue_clientconn_free(conn);
    tsue_executor_free(exec);
}

#[test]
fn response_head_limits() {
    let exec = tsue_executor_new();

    let mock = Mock::new(b"HTTP/1.1 200 OK\r\nA: 1\r\nB: 2\r\n\r\n");
    mock.eof.set(false);
    let opts = tsue_clientconn_options_new();
    assert_eq!(tsue_clientconn_options_set_max_headers(opts, 1), Code::Ok);
    let conn = handshake_with(exec, &mock, opts);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"/")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    let err = tsue_task_value(task).cast::<Error>();
    assert_eq!(error_message(err), "invalid response head: too many headers");
    tsue_error_free(err);
    tsue_task_free(task);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tsue_task_type(tasks[0]), TaskType::Error);
    free_all(tasks);
    tsue_clientconn_free(conn);

    let mut input = b"HTTP/1.1 200 OK\r\nX-Big: ".to_vec();
    input.resize(input.len() + 9000, b'a');
    let mock = Mock::new(&input);
    mock.eof.set(false);
    let opts = tsue_clientconn_options_new();
    assert_eq!(tsue_clientconn_options_set_max_buf_size(opts, 8 * 1024), Code::Ok);
    let conn = handshake_with(exec, &mock, opts);

    push_tagged(exec, tsue_clientconn_send(conn, get(b"/")), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    let err = tsue_task_value(task).cast::<Error>();
    assert_eq!(error_message(err), "message head is too large");
    tsue_error_free(err);
    tsue_task_free(task);
    free_all(tasks);
    tsue_clientconn_free(conn);

    tsue_executor_free(exec);
}

// ===== Request Body =====

struct Chunks {
    chunks: RefCell<Vec<&'static [u8]>>,
    fail: bool,
}

extern "C" fn next_chunk(userdata: *mut c_void, _: *mut Context<'_>, out: *mut *mut Buf) -> c_int {
    let chunks = unsafe { &*(userdata as *const Chunks) };
    if chunks.fail {
        return TSUE_POLL_ERROR;
    }
    let mut chunks = chunks.chunks.borrow_mut();
    if !chunks.is_empty() {
        let chunk = chunks.remove(0);
        unsafe { *out = tsue_buf_copy(chunk.as_ptr(), chunk.len()) };
    }
    TSUE_POLL_READY
}

fn post(chunks: &Chunks) -> *mut Request {
    let req = get(b"/upload");
    assert_eq!(tsue_request_set_method(req, b"POST".as_ptr(), 4), Code::Ok);
    let body = tsue_body_new();
    tsue_body_set_userdata(body, chunks as *const Chunks as *mut c_void);
    tsue_body_set_data_func(body, next_chunk);
    assert_eq!(tsue_request_set_body(req, body), Code::Ok);
    req
}

#[test]
fn streamed_request_body() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"HTTP/1.1 204 No Content\r\n\r\n");
    mock.eof.set(false);
    let conn = handshake(exec, &mock);

    let chunks = Chunks {
        chunks: RefCell::new(vec![&b"ping"[..], &b""[..], &b"pong!"[..]]),
        fail: false,
    };
    push_tagged(exec, tsue_clientconn_send(conn, post(&chunks)), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert_eq!(tsue_task_type(task), TaskType::Response);
    let res = tsue_task_value(task).cast::<Response>();
    assert_eq!(tsue_response_status(res), 204);
    tsue_response_free(res);
    tsue_task_free(task);

    assert_eq!(
        mock.output(),
        "POST /upload HTTP/1.1\r\ntransfer-encoding: chunked\r\n\r\n\
        4\r\nping\r\n5\r\npong!\r\n0\r\n\r\n"
    );

    tsue_clientconn_free(conn);
    free_all(poll_all(exec));
    tsue_executor_free(exec);
}

#[test]
fn aborted_request_body() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"");
    mock.eof.set(false);
    let conn = handshake(exec, &mock);

    let chunks = Chunks {
        chunks: RefCell::new(vec![]),
        fail: true,
    };
    push_tagged(exec, tsue_clientconn_send(conn, post(&chunks)), SEND);
    let mut tasks = poll_all(exec);
    let task = take_tagged(&mut tasks, SEND);
    assert_eq!(tsue_task_type(task), TaskType::Error);
    let err = tsue_task_value(task).cast::<Error>();
    assert_eq!(tsue_error_code(err), Code::AbortedByCallback);
    tsue_error_free(err);
    tsue_task_free(task);
    free_all(tasks);

    tsue_clientconn_free(conn);
    tsue_executor_free(exec);
}

// ===== Arguments =====

#[test]
fn invalid_arguments() {
    let exec = tsue_executor_new();
    assert_eq!(tsue_executor_push(exec, ptr::null_mut()), Code::InvalidArg);
    assert_eq!(tsue_executor_push(ptr::null(), ptr::null_mut()), Code::InvalidArg);
    assert!(tsue_executor_poll(exec).is_null());
    assert_eq!(tsue_task_type(ptr::null_mut()), TaskType::Empty);
    assert!(tsue_task_value(ptr::null_mut()).is_null());

    let req = tsue_request_new();
    assert_eq!(tsue_request_set_method(req, b"G T".as_ptr(), 3), Code::InvalidArg);
    assert_eq!(tsue_request_set_uri(req, b"".as_ptr(), 0), Code::InvalidArg);
    assert_eq!(tsue_request_set_uri(req, ptr::null(), 4), Code::InvalidArg);
    assert_eq!(tsue_request_set_version(req, 20), Code::InvalidArg);
    assert_eq!(tsue_request_set_version(req, TSUE_HTTP_VERSION_1_0), Code::Ok);
    assert_eq!(tsue_request_set_body(req, ptr::null_mut()), Code::InvalidArg);
    tsue_request_free(req);

    let opts = tsue_clientconn_options_new();
    assert_eq!(tsue_clientconn_options_set_max_headers(opts, 0), Code::InvalidArg);
    assert_eq!(tsue_clientconn_options_set_max_headers(opts, 16), Code::Ok);
    assert_eq!(tsue_clientconn_options_set_max_buf_size(opts, 1024), Code::InvalidArg);
    assert_eq!(tsue_clientconn_options_set_max_buf_size(opts, 64 * 1024), Code::Ok);
    tsue_clientconn_options_free(opts);

    // handshake consumes the io even without options
    let mock = Mock::new(b"");
    assert!(tsue_clientconn_handshake(mock.io(), ptr::null_mut()).is_null());

    assert!(tsue_buf_copy(ptr::null(), 3).is_null());
    let buf = tsue_buf_copy(ptr::null(), 0);
    assert_eq!(tsue_buf_len(buf), 0);
    tsue_buf_free(buf);

    // freeing null is a no-op
    tsue_executor_free(ptr::null());
    tsue_task_free(ptr::null_mut());
    tsue_io_free(ptr::null_mut());
    tsue_clientconn_free(ptr::null_mut());
    tsue_clientconn_options_free(ptr::null_mut());
    tsue_request_free(ptr::null_mut());
    tsue_response_free(ptr::null_mut());
    tsue_body_free(ptr::null_mut());
    tsue_buf_free(ptr::null_mut());
    tsue_error_free(ptr::null_mut());
    tsue_waker_free(ptr::null_mut());
    tsue_waker_wake(ptr::null_mut());

    tsue_executor_free(exec);
}

#[test]
fn executor_free_drops_pending_tasks() {
    let exec = tsue_executor_new();
    let mock = Mock::new(b"");
    mock.write.set(WriteMode::Pending);

    let opts = tsue_clientconn_options_new();
    tsue_clientconn_options_exec(opts, exec);
    push_tagged(exec, tsue_clientconn_handshake(mock.io(), opts), HANDSHAKE);
    assert!(tsue_executor_poll(exec).is_null());

    tsue_executor_free(exec);
    // the waker outlives its executor
    mock.wake();
}

#[test]
fn version_string() {
    let version = unsafe { CStr::from_ptr(tsue_version()) };
    assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
}
