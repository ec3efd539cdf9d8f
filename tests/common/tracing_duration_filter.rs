use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{Subscriber, span};
use tracing_subscriber::{Layer, layer::Context};

/// A tracing layer that reports spans taking longer than a minimum duration.
///
/// Collider generation and mesh simplification are instrumented, this makes the slow
/// passes stand out in test output.
pub struct DurationFilterLayer {
    min_duration: Duration,
    span_times: Arc<Mutex<HashMap<span::Id, Instant>>>,
}

impl DurationFilterLayer {
    pub fn new(min_duration: Duration) -> Self {
        Self {
            min_duration,
            span_times: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<S> Layer<S> for DurationFilterLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_enter(&self, id: &span::Id, _ctx: Context<'_, S>) {
        self.span_times
            .lock()
            .unwrap()
            .entry(id.clone())
            .or_insert_with(Instant::now);
    }

    fn on_close(&self, id: span::Id, ctx: Context<'_, S>) {
        let Some(start_time) = self.span_times.lock().unwrap().remove(&id) else {
            return;
        };
        let elapsed = start_time.elapsed();
        if elapsed < self.min_duration {
            return;
        }
        if let Some(span) = ctx.span(&id) {
            let metadata = span.metadata();
            eprintln!(
                "[SLOW] {}::{} took {elapsed:?} (threshold: {:?})",
                metadata.target(),
                metadata.name(),
                self.min_duration
            );
        }
    }
}
