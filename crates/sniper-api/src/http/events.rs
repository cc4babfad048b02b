//! Change notifications as server-sent events.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

use crate::state::ApiState;

/// Event name carried by every notification.
pub const CAPTURE_EVENT: &str = "capture";

/// Stream the record: the current value first, then one event per change.
pub async fn capture_events(
    State(state): State<Arc<ApiState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(state.updates.clone())
        .map(|record| Event::default().event(CAPTURE_EVENT).json_data(&record));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
