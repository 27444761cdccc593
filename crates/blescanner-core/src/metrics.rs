//! Metric names and recording helpers.
//!
//! Metrics tracked:
//! - `blescanner_processing_seconds` - summary of scan-cycle wall-clock time
//! - `blescanner_seen_total` - counter of accepted observations per (address, name)
//! - `blescanner_tracked_devices` - gauge of distinct tracked addresses
//! - `blescanner_cycles_total` - counter of completed cycles by status
//!
//! Recording goes through the `metrics` facade, so the core stays agnostic
//! of the sink. The exporter binary installs a Prometheus recorder, which
//! handles concurrent scrapes against the single writing scan task.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Summary of cycle wall-clock duration in seconds.
pub const PROCESSING_SECONDS: &str = "blescanner_processing_seconds";

/// Number of intervals each device was seen.
pub const SEEN_TOTAL: &str = "blescanner_seen_total";

/// Number of distinct addresses currently tracked.
pub const TRACKED_DEVICES: &str = "blescanner_tracked_devices";

/// Number of completed scan cycles by status.
pub const CYCLES_TOTAL: &str = "blescanner_cycles_total";

/// Register descriptions for all metrics. Call once after the recorder is
/// installed.
pub fn describe_metrics() {
    describe_histogram!(
        PROCESSING_SECONDS,
        "Time spent processing one scan cycle in seconds"
    );
    describe_counter!(
        SEEN_TOTAL,
        "Number of scan intervals in which this device was seen"
    );
    describe_gauge!(
        TRACKED_DEVICES,
        "Number of distinct device addresses tracked since start"
    );
    describe_counter!(CYCLES_TOTAL, "Number of completed scan cycles by status");
}

/// Record one accepted observation of a device.
pub fn record_device_seen(address: &str, name: &str) {
    counter!(
        SEEN_TOTAL,
        "address" => address.to_string(),
        "name" => name.to_string()
    )
    .increment(1);
}

/// Record the wall-clock duration of one scan cycle.
pub fn record_cycle_duration(duration: Duration) {
    histogram!(PROCESSING_SECONDS).record(duration.as_secs_f64());
}

/// Count a finished cycle by outcome.
pub fn record_cycle_result(success: bool) {
    let status = if success { "ok" } else { "error" };
    counter!(CYCLES_TOTAL, "status" => status).increment(1);
}

/// Update the tracked-device gauge to the current registry size.
pub fn set_tracked_devices(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!(TRACKED_DEVICES).set(count as f64);
}
