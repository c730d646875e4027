//! Controller behind the landing panel: two sliders and two send buttons.

use std::cell::Cell;
use std::sync::Arc;

use sensor_panel_model::{
    HumidityRecord, SliderRange, TemperatureRecord, HUMIDITY_RANGE, TEMPERATURE_RANGE,
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::http::Response;
use crate::logger::{AppLogger, LogRecipient, LogType};
use crate::record::{HumidityService, RecordService, TemperatureService};

/// Returns the current unix time in seconds.
pub type Clock = fn() -> f64;

/// Wall clock time with millisecond precision.
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Holds the slider values and sends them on request.
///
/// Lives on the UI thread; sends run as independent tasks on `runtime` and
/// report their outcome to the user through the logger.
pub struct LandingController<T = TemperatureService, H = HumidityService> {
    temperature: Cell<i32>,
    humidity: Cell<i32>,
    temperature_service: Arc<T>,
    humidity_service: Arc<H>,
    logger: AppLogger,
    runtime: Handle,
    clock: Clock,
}

impl<T, H> LandingController<T, H>
where
    T: RecordService<TemperatureRecord>,
    H: RecordService<HumidityRecord>,
{
    pub fn new(temperature_service: T, humidity_service: H, logger: AppLogger, runtime: Handle) -> Self {
        Self {
            temperature: Cell::new(TEMPERATURE_RANGE.default),
            humidity: Cell::new(HUMIDITY_RANGE.default),
            temperature_service: Arc::new(temperature_service),
            humidity_service: Arc::new(humidity_service),
            logger,
            runtime,
            clock: unix_now,
        }
    }

    /// Replace the clock used to timestamp records.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn temperature(&self) -> i32 {
        self.temperature.get()
    }

    pub fn humidity(&self) -> i32 {
        self.humidity.get()
    }

    /// Store a new temperature slider value, clamped to the slider range.
    pub fn set_temperature(&self, degrees: i32) -> i32 {
        Self::store(&self.temperature, TEMPERATURE_RANGE, degrees)
    }

    /// Store a new humidity slider value (percent), clamped to the slider range.
    pub fn set_humidity(&self, percent: i32) -> i32 {
        Self::store(&self.humidity, HUMIDITY_RANGE, percent)
    }

    /// Send the current temperature.
    ///
    /// The returned handle can be dropped; the outcome is logged either way.
    pub fn send_temperature(&self) -> JoinHandle<()> {
        let record = TemperatureRecord::new(self.temperature.get(), (self.clock)());
        let service = self.temperature_service.clone();

        self.spawn_send("temperature", service, record)
    }

    /// Send the current humidity as a fraction of one.
    pub fn send_humidity(&self) -> JoinHandle<()> {
        let record = HumidityRecord::from_percent(self.humidity.get(), (self.clock)());
        let service = self.humidity_service.clone();

        self.spawn_send("humidity", service, record)
    }

    fn store(value: &Cell<i32>, range: SliderRange, new_value: i32) -> i32 {
        let clamped = range.clamp(new_value);
        if clamped != new_value {
            log::warn!("Slider value {new_value} outside {}..={}, using {clamped}", range.min, range.max);
        }
        value.set(clamped);
        clamped
    }

    fn spawn_send<R, S>(&self, name: &'static str, service: Arc<S>, record: R) -> JoinHandle<()>
    where
        R: Send + 'static,
        S: RecordService<R>,
    {
        let logger = self.logger.clone();

        self.runtime.spawn(async move {
            let response = service.send_record(record).await;
            report(&logger, name, response);
        })
    }
}

fn report(logger: &AppLogger, name: &str, response: Response<()>) {
    match response {
        Ok(()) => logger.log(
            LogType::Success,
            LogRecipient::User,
            &format!("Successfully sent {name} record"),
            None,
        ),
        Err(err) => logger.log(
            LogType::Error,
            LogRecipient::User,
            &format!("Could not send {name} record"),
            Some(&err.message()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpError;
    use crate::logger::LogHistory;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers every record with a fixed outcome after `delay`, remembering what it got.
    struct FakeService<R> {
        sent: Arc<Mutex<Vec<R>>>,
        failure: Option<&'static str>,
        delay: Duration,
    }

    impl<R> FakeService<R> {
        fn ok() -> Self {
            Self {
                sent: Arc::default(),
                failure: None,
                delay: Duration::ZERO,
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                failure: Some(message),
                ..Self::ok()
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl<R: Send + 'static> RecordService<R> for FakeService<R> {
        async fn send_record(&self, record: R) -> Response<()> {
            tokio::time::sleep(self.delay).await;
            self.sent.lock().unwrap().push(record);

            match self.failure {
                Some(message) => Err(HttpError::Transport(message.into())),
                None => Ok(()),
            }
        }
    }

    fn controller(
        temperature: FakeService<TemperatureRecord>,
        humidity: FakeService<HumidityRecord>,
    ) -> (
        LandingController<FakeService<TemperatureRecord>, FakeService<HumidityRecord>>,
        LogHistory,
    ) {
        let history = LogHistory::new();
        let logger = AppLogger::new().with_sink(Arc::new(history.clone()));
        let controller = LandingController::new(temperature, humidity, logger, Handle::current())
            .with_clock(|| 1_700_000_000.25);

        (controller, history)
    }

    #[tokio::test]
    async fn starts_with_slider_defaults() {
        let (controller, _) = controller(FakeService::ok(), FakeService::ok());

        assert_eq!(controller.temperature(), 0);
        assert_eq!(controller.humidity(), 50);
    }

    #[tokio::test]
    async fn setters_clamp_to_slider_range() {
        let (controller, _) = controller(FakeService::ok(), FakeService::ok());

        assert_eq!(controller.set_temperature(-100), -70);
        assert_eq!(controller.set_temperature(100), 70);
        assert_eq!(controller.set_temperature(21), 21);
        assert_eq!(controller.temperature(), 21);

        assert_eq!(controller.set_humidity(-5), 0);
        assert_eq!(controller.set_humidity(101), 100);
        assert_eq!(controller.set_humidity(42), 42);
        assert_eq!(controller.humidity(), 42);
    }

    #[tokio::test]
    async fn temperature_record_uses_slider_value_and_clock() {
        let service = FakeService::ok();
        let sent = service.sent.clone();
        let (controller, _) = controller(service, FakeService::ok());

        for degrees in [-70, -1, 0, 35, 70] {
            controller.set_temperature(degrees);
            controller.send_temperature().await.unwrap();
        }

        let sent = sent.lock().unwrap();
        let values: Vec<i32> = sent.iter().map(|record| record.value).collect();
        assert_eq!(values, vec![-70, -1, 0, 35, 70]);
        assert!(sent.iter().all(|record| record.time == 1_700_000_000.25));
    }

    #[tokio::test]
    async fn humidity_record_is_slider_over_hundred() {
        let service = FakeService::ok();
        let sent = service.sent.clone();
        let (controller, _) = controller(FakeService::ok(), service);

        for percent in [0, 25, 50, 100] {
            controller.set_humidity(percent);
            controller.send_humidity().await.unwrap();
        }

        let values: Vec<f64> = sent.lock().unwrap().iter().map(|record| record.value).collect();
        assert_eq!(values, vec![0.0, 0.25, 0.5, 1.0]);
    }

    #[tokio::test]
    async fn success_logs_one_entry_without_detail() {
        let (controller, history) = controller(FakeService::ok(), FakeService::ok());

        controller.send_temperature().await.unwrap();

        let entries = history.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LogType::Success);
        assert_eq!(entries[0].recipient, LogRecipient::User);
        assert_eq!(entries[0].message, "Successfully sent temperature record");
        assert_eq!(entries[0].detail, None);
    }

    #[tokio::test]
    async fn failure_logs_one_error_with_message() {
        let (controller, history) =
            controller(FakeService::ok(), FakeService::failing("network down"));

        controller.send_humidity().await.unwrap();

        let entries = history.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LogType::Error);
        assert_eq!(entries[0].message, "Could not send humidity record");
        assert_eq!(entries[0].detail.as_deref(), Some("network down"));
    }

    #[tokio::test]
    async fn concurrent_sends_log_independently() {
        let (controller, history) = controller(
            FakeService::ok().delayed(Duration::from_millis(50)),
            FakeService::failing("network down"),
        );

        let temperature = controller.send_temperature();
        let humidity = controller.send_humidity();
        let (first, second) = tokio::join!(temperature, humidity);
        first.unwrap();
        second.unwrap();

        let entries = history.entries();
        assert_eq!(entries.len(), 2);
        // The slower temperature send finishes last.
        assert_eq!(entries[0].message, "Could not send humidity record");
        assert_eq!(entries[1].message, "Successfully sent temperature record");
    }

    #[tokio::test]
    async fn repeated_clicks_each_send() {
        let service = FakeService::ok();
        let sent = service.sent.clone();
        let (controller, history) = controller(service, FakeService::ok());

        let handles = [controller.send_temperature(), controller.send_temperature()];
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(sent.lock().unwrap().len(), 2);
        assert_eq!(history.entries().len(), 2);
    }
}
