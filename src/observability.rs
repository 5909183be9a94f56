use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("geminus.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("geminus.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("geminus.client.request_duration_seconds");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("geminus.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("geminus.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("geminus.stream.bytes");
pub(crate) static STREAM_FIRST_FRAGMENT: Moments =
    Moments::new("geminus.stream.first_fragment_seconds");
pub(crate) static STREAM_DURATION: Moments = Moments::new("geminus.stream.duration_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("geminus.session.turns");
pub(crate) static SESSION_TURN_ERRORS: Counter = Counter::new("geminus.session.turn_errors");
pub(crate) static SESSION_FRAGMENTS: Counter = Counter::new("geminus.session.fragments");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: &Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_moments(&STREAM_FIRST_FRAGMENT);
    collector.register_moments(&STREAM_DURATION);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_TURN_ERRORS);
    collector.register_counter(&SESSION_FRAGMENTS);
}
