use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("audio_reply_webhook_statds")
        .with_description("Audio reply webhook statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: &'static str, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_message_type_statds(msg_type: &str) {
    incr_statds("message_type", msg_type.into())
}

pub fn incr_error_kind_statds(kind: &str) {
    incr_statds("error_kind", kind.into())
}
