//! Batching settings handed to the batch export processor.
//!
//! The options object only carries these values; queuing, scheduling and
//! flushing are done by the `opentelemetry_sdk` batch processors, which can be
//! configured from this type through the `From` conversions below.

use std::cmp::min;
use std::{env, str::FromStr, time::Duration};

/// Delay interval between two consecutive exports.
pub const OTEL_BSP_SCHEDULE_DELAY: &str = "OTEL_BSP_SCHEDULE_DELAY";
/// Default delay interval between two consecutive exports.
pub const OTEL_BSP_SCHEDULE_DELAY_DEFAULT: u64 = 5_000;
/// Maximum queue size
pub const OTEL_BSP_MAX_QUEUE_SIZE: &str = "OTEL_BSP_MAX_QUEUE_SIZE";
/// Default maximum queue size
pub const OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT: usize = 2_048;
/// Maximum batch size, must be less than or equal to OTEL_BSP_MAX_QUEUE_SIZE
pub const OTEL_BSP_MAX_EXPORT_BATCH_SIZE: &str = "OTEL_BSP_MAX_EXPORT_BATCH_SIZE";
/// Default maximum batch size
pub const OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT: usize = 512;
/// Maximum allowed time to export data.
pub const OTEL_BSP_EXPORT_TIMEOUT: &str = "OTEL_BSP_EXPORT_TIMEOUT";
/// Default maximum allowed time to export data.
pub const OTEL_BSP_EXPORT_TIMEOUT_DEFAULT: u64 = 30_000;

/// Whether exported items go through a batching or a pass-through processor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ExportProcessorType {
    /// Export every item as soon as it is finished.
    Simple,
    /// Buffer items and export them in batches.
    #[default]
    Batch,
}

/// Batch export processor settings.
///
/// `Default` starts from the values recommended by the OpenTelemetry
/// specification and overrides them with the following environment variables
/// when they are set to a valid number:
/// * `OTEL_BSP_MAX_QUEUE_SIZE`
/// * `OTEL_BSP_SCHEDULE_DELAY`
/// * `OTEL_BSP_MAX_EXPORT_BATCH_SIZE`
/// * `OTEL_BSP_EXPORT_TIMEOUT`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchExportProcessorOptions {
    max_queue_size: usize,
    scheduled_delay: Duration,
    max_export_batch_size: usize,
    export_timeout: Duration,
}

impl Default for BatchExportProcessorOptions {
    fn default() -> Self {
        BatchExportProcessorOptions {
            max_queue_size: OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT,
            scheduled_delay: Duration::from_millis(OTEL_BSP_SCHEDULE_DELAY_DEFAULT),
            max_export_batch_size: OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT,
            export_timeout: Duration::from_millis(OTEL_BSP_EXPORT_TIMEOUT_DEFAULT),
        }
        .init_from_env_vars()
    }
}

impl BatchExportProcessorOptions {
    /// The maximum queue size to buffer items for delayed processing. If the
    /// queue gets full it drops the items. The default value of is 2048.
    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    /// The delay interval between two consecutive processing of batches. The
    /// default value is 5 seconds.
    pub fn scheduled_delay(&self) -> Duration {
        self.scheduled_delay
    }

    /// The maximum number of items to process in a single batch, never larger
    /// than [`max_queue_size`](Self::max_queue_size). The default value is 512.
    pub fn max_export_batch_size(&self) -> usize {
        min(self.max_export_batch_size, self.max_queue_size)
    }

    /// The maximum duration to export a batch of data. The default value is
    /// 30 seconds.
    pub fn export_timeout(&self) -> Duration {
        self.export_timeout
    }

    /// Set the maximum queue size.
    pub fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    /// Set the delay between two consecutive batch exports.
    pub fn with_scheduled_delay(mut self, scheduled_delay: Duration) -> Self {
        self.scheduled_delay = scheduled_delay;
        self
    }

    /// Set the maximum number of items exported in one batch.
    pub fn with_max_export_batch_size(mut self, max_export_batch_size: usize) -> Self {
        self.max_export_batch_size = max_export_batch_size;
        self
    }

    /// Set the maximum duration of a single export.
    pub fn with_export_timeout(mut self, export_timeout: Duration) -> Self {
        self.export_timeout = export_timeout;
        self
    }

    fn init_from_env_vars(mut self) -> Self {
        if let Some(max_queue_size) = env_value(OTEL_BSP_MAX_QUEUE_SIZE) {
            self.max_queue_size = max_queue_size;
        }
        if let Some(max_export_batch_size) = env_value(OTEL_BSP_MAX_EXPORT_BATCH_SIZE) {
            self.max_export_batch_size = max_export_batch_size;
        }
        if let Some(millis) = env_value(OTEL_BSP_SCHEDULE_DELAY) {
            self.scheduled_delay = Duration::from_millis(millis);
        }
        if let Some(millis) = env_value(OTEL_BSP_EXPORT_TIMEOUT) {
            self.export_timeout = Duration::from_millis(millis);
        }
        self
    }
}

/// The trimmed value of `name` parsed as `T`, `None` when unset or unparsable.
fn env_value<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok()?.trim().parse().ok()
}

// The export timeout is only configurable on the SDK builders behind their
// experimental async runtime features, so it is not forwarded here.
#[cfg(feature = "trace")]
impl From<&BatchExportProcessorOptions> for opentelemetry_sdk::trace::BatchConfig {
    fn from(options: &BatchExportProcessorOptions) -> Self {
        opentelemetry_sdk::trace::BatchConfigBuilder::default()
            .with_max_queue_size(options.max_queue_size())
            .with_scheduled_delay(options.scheduled_delay())
            .with_max_export_batch_size(options.max_export_batch_size())
            .build()
    }
}

#[cfg(feature = "logs")]
impl From<&BatchExportProcessorOptions> for opentelemetry_sdk::logs::BatchConfig {
    fn from(options: &BatchExportProcessorOptions) -> Self {
        opentelemetry_sdk::logs::BatchConfigBuilder::default()
            .with_max_queue_size(options.max_queue_size())
            .with_scheduled_delay(options.scheduled_delay())
            .with_max_export_batch_size(options.max_export_batch_size())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::run_env_test;

    #[test]
    fn test_default_const_values() {
        assert_eq!(OTEL_BSP_SCHEDULE_DELAY, "OTEL_BSP_SCHEDULE_DELAY");
        assert_eq!(OTEL_BSP_SCHEDULE_DELAY_DEFAULT, 5_000);
        assert_eq!(OTEL_BSP_MAX_QUEUE_SIZE, "OTEL_BSP_MAX_QUEUE_SIZE");
        assert_eq!(OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT, 2048);
        assert_eq!(OTEL_BSP_MAX_EXPORT_BATCH_SIZE, "OTEL_BSP_MAX_EXPORT_BATCH_SIZE");
        assert_eq!(OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT, 512);
        assert_eq!(OTEL_BSP_EXPORT_TIMEOUT, "OTEL_BSP_EXPORT_TIMEOUT");
        assert_eq!(OTEL_BSP_EXPORT_TIMEOUT_DEFAULT, 30_000);
    }

    #[test]
    fn test_default_batch_options_without_env_vars() {
        temp_env::with_vars_unset(
            [
                OTEL_BSP_MAX_QUEUE_SIZE,
                OTEL_BSP_SCHEDULE_DELAY,
                OTEL_BSP_MAX_EXPORT_BATCH_SIZE,
                OTEL_BSP_EXPORT_TIMEOUT,
            ],
            || {
                let options = BatchExportProcessorOptions::default();
                assert_eq!(options.max_queue_size(), OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT);
                assert_eq!(
                    options.scheduled_delay(),
                    Duration::from_millis(OTEL_BSP_SCHEDULE_DELAY_DEFAULT)
                );
                assert_eq!(
                    options.max_export_batch_size(),
                    OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT
                );
                assert_eq!(
                    options.export_timeout(),
                    Duration::from_millis(OTEL_BSP_EXPORT_TIMEOUT_DEFAULT)
                );
            },
        );
    }

    #[test]
    fn test_batch_options_configurable_by_env_vars() {
        run_env_test(
            vec![
                (OTEL_BSP_SCHEDULE_DELAY, "2000"),
                (OTEL_BSP_EXPORT_TIMEOUT, "60000"),
                (OTEL_BSP_MAX_QUEUE_SIZE, "4096"),
                (OTEL_BSP_MAX_EXPORT_BATCH_SIZE, "1024"),
            ],
            || {
                let options = BatchExportProcessorOptions::default();
                assert_eq!(options.scheduled_delay(), Duration::from_millis(2000));
                assert_eq!(options.export_timeout(), Duration::from_millis(60000));
                assert_eq!(options.max_queue_size(), 4096);
                assert_eq!(options.max_export_batch_size(), 1024);
            },
        );
    }

    #[test]
    fn test_invalid_env_vars_are_ignored() {
        run_env_test(
            vec![
                (OTEL_BSP_SCHEDULE_DELAY, "soon"),
                (OTEL_BSP_MAX_QUEUE_SIZE, "-1"),
            ],
            || {
                let options = BatchExportProcessorOptions::default();
                assert_eq!(
                    options.scheduled_delay(),
                    Duration::from_millis(OTEL_BSP_SCHEDULE_DELAY_DEFAULT)
                );
                assert_eq!(options.max_queue_size(), OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT);
            },
        );
    }

    #[test]
    fn test_batch_size_is_clamped_to_queue_size() {
        run_env_test(
            vec![
                (OTEL_BSP_MAX_QUEUE_SIZE, "256"),
                (OTEL_BSP_MAX_EXPORT_BATCH_SIZE, "1024"),
            ],
            || {
                let options = BatchExportProcessorOptions::default();
                assert_eq!(options.max_queue_size(), 256);
                assert_eq!(options.max_export_batch_size(), 256);
            },
        );

        temp_env::with_vars_unset(
            [OTEL_BSP_MAX_QUEUE_SIZE, OTEL_BSP_MAX_EXPORT_BATCH_SIZE],
            || {
                let options = BatchExportProcessorOptions::default()
                    .with_max_export_batch_size(10)
                    .with_max_queue_size(5);
                assert_eq!(options.max_export_batch_size(), 5);

                // growing the queue again releases the configured batch size
                let options = options.with_max_queue_size(100);
                assert_eq!(options.max_export_batch_size(), 10);
            },
        );
    }

    #[test]
    fn test_code_based_options_override_env_vars() {
        run_env_test(vec![(OTEL_BSP_SCHEDULE_DELAY, "2000")], || {
            let options = BatchExportProcessorOptions::default()
                .with_scheduled_delay(Duration::from_millis(100))
                .with_export_timeout(Duration::from_secs(1));
            assert_eq!(options.scheduled_delay(), Duration::from_millis(100));
            assert_eq!(options.export_timeout(), Duration::from_secs(1));
        });
    }

    #[test]
    fn test_default_export_processor_type_is_batch() {
        assert_eq!(ExportProcessorType::default(), ExportProcessorType::Batch);
    }

    #[cfg(feature = "logs")]
    #[test]
    fn test_convert_into_logs_batch_config() {
        temp_env::with_vars_unset(
            [
                OTEL_BSP_MAX_QUEUE_SIZE,
                OTEL_BSP_SCHEDULE_DELAY,
                OTEL_BSP_MAX_EXPORT_BATCH_SIZE,
                OTEL_BSP_EXPORT_TIMEOUT,
            ],
            || {
                let options = BatchExportProcessorOptions::default()
                    .with_max_queue_size(64)
                    .with_max_export_batch_size(16)
                    .with_scheduled_delay(Duration::from_millis(250));
                let debug = format!("{:?}", opentelemetry_sdk::logs::BatchConfig::from(&options));
                assert!(debug.contains("max_queue_size: 64"), "{debug}");
                assert!(debug.contains("max_export_batch_size: 16"), "{debug}");
                assert!(debug.contains("scheduled_delay: 250ms"), "{debug}");

                // a batch larger than the queue is clamped before it reaches the SDK
                let options = options.with_max_export_batch_size(1_000);
                let debug = format!("{:?}", opentelemetry_sdk::logs::BatchConfig::from(&options));
                assert!(debug.contains("max_export_batch_size: 64"), "{debug}");
            },
        );
    }

    #[cfg(feature = "trace")]
    #[test]
    fn test_convert_into_trace_batch_config() {
        temp_env::with_vars_unset(
            [
                OTEL_BSP_MAX_QUEUE_SIZE,
                OTEL_BSP_SCHEDULE_DELAY,
                OTEL_BSP_MAX_EXPORT_BATCH_SIZE,
                OTEL_BSP_EXPORT_TIMEOUT,
            ],
            || {
                let options = BatchExportProcessorOptions::default()
                    .with_max_queue_size(10)
                    .with_max_export_batch_size(3);
                let config = opentelemetry_sdk::trace::BatchConfig::from(&options);
                let debug = format!("{config:?}");
                assert!(debug.contains("max_queue_size: 10"), "{debug}");
                assert!(debug.contains("max_export_batch_size: 3"), "{debug}");
            },
        );
    }
}
