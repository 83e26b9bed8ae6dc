use std::{
    collections::{BTreeMap, VecDeque},
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{
    Event, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    EnvFilter, Layer, layer::Context, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Target prefix of the events a [`TransitionRecorder`] keeps.
pub const GATE_TARGET: &str = "orbit_core::gate";

#[derive(Clone, Debug)]
struct StoredEvent {
    fields: BTreeMap<String, serde_json::Value>,
    level: String,
    message: String,
    target: String,
    thread_id: String,
    timestamp: u64,
}

struct JsonVisitor<'a> {
    fields: &'a mut BTreeMap<String, serde_json::Value>,
    message: &'a mut String,
}

impl Visit for JsonVisitor<'_> {
    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_owned(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = format!("{value:?}");
        } else {
            self.fields.insert(
                field.name().to_owned(),
                serde_json::Value::String(format!("{value:?}")),
            );
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_owned(), serde_json::Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_owned(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_owned(), serde_json::Value::from(value));
    }
}

/// A `tracing` layer keeping the most recent lifecycle gate events.
///
/// Only events whose target starts with [`GATE_TARGET`] are kept. Once
/// `capacity` events are stored the oldest one is dropped for every new one.
/// Clones share the same buffer.
#[derive(Clone, Debug)]
pub struct TransitionRecorder {
    buffer: Arc<Mutex<VecDeque<StoredEvent>>>,
    capacity: usize,
}

impl TransitionRecorder {
    /// Builds a Chrome Trace Event array from the stored events, oldest first.
    #[must_use]
    pub fn chrome_trace(&self) -> serde_json::Value {
        let Ok(buffer) = self.buffer.lock() else {
            return serde_json::Value::Array(Vec::new());
        };

        buffer
            .iter()
            .map(|event| {
                serde_json::json!({
                    "name": event.message,
                    "cat": event.target,
                    "ph": "i",
                    "ts": event.timestamp,
                    "pid": 1,
                    "tid": event.thread_id,
                    "s": "g",
                    "args": {
                        "level": event.level,
                        "fields": event.fields,
                    }
                })
            })
            .collect()
    }

    /// Writes [`TransitionRecorder::chrome_trace`] to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn flush_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &self.chrome_trace())?;
        writer.flush()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.lock().map_or(0, |buffer| buffer.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }
}

impl<S> Layer<S> for TransitionRecorder
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with(GATE_TARGET) {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message = String::new();
        event.record(&mut JsonVisitor {
            fields: &mut fields,
            message: &mut message,
        });

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
            });

        let stored_event = StoredEvent {
            fields,
            level: event.metadata().level().to_string(),
            message,
            target: event.metadata().target().to_owned(),
            thread_id: format!("{:?}", std::thread::current().id()),
            timestamp,
        };

        if let Ok(mut buffer) = self.buffer.lock() {
            if buffer.len() >= self.capacity {
                buffer.pop_front();
            }
            buffer.push_back(stored_event);
        }
    }
}

/// Installs the global subscriber: an [`EnvFilter`] built from `filter`, a
/// formatter on stderr and, if given, a [`TransitionRecorder`].
///
/// # Errors
///
/// Returns an error if `filter` is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init(
    filter: &str,
    recorder: Option<TransitionRecorder>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_new(filter)?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(recorder)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_gate_events() {
        let recorder = TransitionRecorder::new(8);
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "orbit_core::gate", autosave = true, "pausing emulator");
            tracing::info!(target: "orbit_std::thread", "autosaved");
        });

        assert_eq!(recorder.len(), 1);
        let trace = recorder.chrome_trace();
        assert_eq!(trace[0]["name"], "pausing emulator");
        assert_eq!(trace[0]["cat"], GATE_TARGET);
        assert_eq!(trace[0]["args"]["fields"]["autosave"], true);
    }

    #[test]
    fn drops_oldest_when_full() {
        let recorder = TransitionRecorder::new(2);
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            for step in 0_u64..5 {
                tracing::debug!(target: "orbit_core::gate", step, "step");
            }
        });

        let trace = recorder.chrome_trace();
        assert_eq!(recorder.len(), 2);
        assert_eq!(trace[0]["args"]["fields"]["step"], 3);
        assert_eq!(trace[1]["args"]["fields"]["step"], 4);
    }

    #[test]
    fn flushed_trace_is_a_json_array() {
        let recorder = TransitionRecorder::new(4);
        let subscriber = tracing_subscriber::registry().with(recorder.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "orbit_core::gate", "starting emulator");
        });

        let path = std::env::temp_dir().join(format!("orbit-trace-{}.json", std::process::id()));
        recorder.flush_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));

        std::fs::remove_file(path).unwrap();
    }
}
