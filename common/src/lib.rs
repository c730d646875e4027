pub mod config;
pub mod http;
pub mod landing;
pub mod logger;
pub mod record;

pub use config::{ClientConfig, ConfigError};
pub use http::{AuthorizationType, HttpError, HttpService, Json, RequestContext, Response};
pub use landing::LandingController;
pub use logger::{AppLogger, LogEntry, LogHistory, LogRecipient, LogSink, LogType};
pub use record::{HumidityService, RecordSender, RecordService, TemperatureService};
