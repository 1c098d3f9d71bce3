use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, stream};
use tokio::sync::broadcast::error::RecvError;

use crate::{app::api::AppContext, events::AppEvent};

fn event_name(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::SessionCreated { .. } => "session_created",
        AppEvent::SessionDeactivated { .. } => "session_deactivated",
        AppEvent::AttendanceRecorded { .. } => "attendance_recorded",
    }
}

#[utoipa::path(
    get,
    path = "/events",
    tag = "Events",
    responses(
        (status = 200, description = "Session and attendance event stream", content_type = "text/event-stream"),
    )
)]
pub async fn sse_handler(
    State(context): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = context.state.events.subscribe();

    let stream = stream::unfold(receiver, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let data = serde_json::to_string(&event).unwrap_or_default();
                    let sse_event = Event::default().event(event_name(&event)).data(data);
                    return Some((Ok(sse_event), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("SSE subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(30))
            .text("keep-alive"),
    )
}
