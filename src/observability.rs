use biometrics::{Collector, Counter, Moments};

pub(crate) static PROVIDER_REQUESTS: Counter = Counter::new("thinkrelay.provider.requests");
pub(crate) static PROVIDER_REQUEST_ERRORS: Counter =
    Counter::new("thinkrelay.provider.request_errors");
pub(crate) static PROVIDER_REQUEST_DURATION: Moments =
    Moments::new("thinkrelay.provider.request_duration_seconds");

pub(crate) static GATEWAY_COMPLETIONS: Counter = Counter::new("thinkrelay.gateway.completions");
pub(crate) static GATEWAY_FAILURES: Counter = Counter::new("thinkrelay.gateway.failures");
pub(crate) static GATEWAY_PLACEHOLDERS: Counter = Counter::new("thinkrelay.gateway.placeholders");

pub(crate) static RELAY_REQUESTS: Counter = Counter::new("thinkrelay.relay.requests");
pub(crate) static RELAY_REJECTIONS: Counter = Counter::new("thinkrelay.relay.rejections");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&PROVIDER_REQUESTS);
    collector.register_counter(&PROVIDER_REQUEST_ERRORS);
    collector.register_moments(&PROVIDER_REQUEST_DURATION);

    collector.register_counter(&GATEWAY_COMPLETIONS);
    collector.register_counter(&GATEWAY_FAILURES);
    collector.register_counter(&GATEWAY_PLACEHOLDERS);

    collector.register_counter(&RELAY_REQUESTS);
    collector.register_counter(&RELAY_REJECTIONS);
}
