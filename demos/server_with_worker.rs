//! Demo: an HTTP server that enqueues background work, and a worker loop
//! that executes it. Every log line on both sides of the queue carries the
//! same request id.
//!
//! Run with `cargo run --example server_with_worker`, then:
//! ```text
//! curl -H 'X-Request-ID: demo-1' http://127.0.0.1:3000/hello
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use request_correlation::observability::init_logging;
use request_correlation::task::{
    register_task_fetcher, with_task_headers, OutboundTask, PropagatingQueue, TaskQueue,
};
use request_correlation::RequestIdLayer;

struct MpscQueue {
    sender: mpsc::UnboundedSender<OutboundTask>,
}

impl TaskQueue for MpscQueue {
    type Error = mpsc::error::SendError<OutboundTask>;

    fn enqueue(&self, task: OutboundTask) -> Result<(), Self::Error> {
        self.sender.send(task)
    }
}

#[derive(Clone)]
struct AppState {
    queue: Arc<PropagatingQueue<MpscQueue>>,
}

async fn hello(State(state): State<AppState>) -> &'static str {
    tracing::info!("Saying hello");
    state
        .queue
        .enqueue(OutboundTask::new(
            "send_greeting",
            serde_json::json!({"greeting": "hello"}),
        ))
        .ok();
    "hello\n"
}

async fn worker_loop(mut receiver: mpsc::UnboundedReceiver<OutboundTask>) {
    while let Some(task) = receiver.recv().await {
        let headers = task.headers.clone().unwrap_or_default();
        with_task_headers(headers, async {
            tracing::info!(task = %task.name, payload = %task.payload, "Executing task");
        })
        .await;
    }
}

#[tokio::main]
async fn main() {
    init_logging("info");
    register_task_fetcher();

    let (sender, receiver) = mpsc::unbounded_channel();
    tokio::spawn(worker_loop(receiver));

    let state = AppState {
        queue: Arc::new(PropagatingQueue::new(MpscQueue { sender })),
    };
    let app = Router::new()
        .route("/hello", get(hello))
        .with_state(state)
        .layer(RequestIdLayer::new().log_requests(true))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .expect("bind demo port");
    tracing::info!(address = %listener.local_addr().unwrap(), "Server starting");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
