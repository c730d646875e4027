use std::future::Future;
use std::marker::PhantomData;

use serde::Serialize;
use sensor_panel_model::{HumidityRecord, TemperatureRecord};

use crate::http::{AuthorizationType, HttpService, Response};

/// Something that delivers records of type `R` to the backend.
pub trait RecordService<R>: Send + Sync + 'static {
    /// Send one record. Failures are returned, never raised.
    fn send_record(&self, record: R) -> impl Future<Output = Response<()>> + Send;
}

/// Posts records of type `R` to a fixed endpoint, without authorization,
/// expecting an empty answer.
pub struct RecordSender<R> {
    service: HttpService,
    path: &'static str,
    _record: PhantomData<fn(R)>,
}

pub type TemperatureService = RecordSender<TemperatureRecord>;
pub type HumidityService = RecordSender<HumidityRecord>;

impl<R> RecordSender<R> {
    pub fn new(service: HttpService, path: &'static str) -> Self {
        Self {
            service,
            path,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

impl RecordSender<TemperatureRecord> {
    pub const PATH: &'static str = "/temperature";

    pub fn temperature(service: HttpService) -> Self {
        Self::new(service, Self::PATH)
    }
}

impl RecordSender<HumidityRecord> {
    pub const PATH: &'static str = "/humidity";

    pub fn humidity(service: HttpService) -> Self {
        Self::new(service, Self::PATH)
    }
}

impl<R> Clone for RecordSender<R> {
    fn clone(&self) -> Self {
        Self::new(self.service.clone(), self.path)
    }
}

impl<R> RecordService<R> for RecordSender<R>
where
    R: Serialize + Send + Sync + 'static,
{
    async fn send_record(&self, record: R) -> Response<()> {
        self.service
            .post::<R, ()>(self.path, &record, AuthorizationType::None)
            .await
    }
}

#[test]
fn test_fixed_paths() {
    let service = HttpService::with_client(
        reqwest::Client::new(),
        &crate::config::ClientConfig::default(),
        None,
    );

    assert_eq!(TemperatureService::temperature(service.clone()).path(), "/temperature");
    assert_eq!(HumidityService::humidity(service).path(), "/humidity");
}
