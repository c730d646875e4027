// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

use std::rc::Rc;
use std::sync::Arc;

use sensor_panel_common::{
    AppLogger, ClientConfig, HttpService, HumidityService, LandingController, LogEntry, LogSink,
    LogType, TemperatureService,
};
use sensor_panel_model::{HUMIDITY_RANGE, TEMPERATURE_RANGE};

/// Shows the latest user log entry in the status line of the window.
///
/// Entries arrive from the runtime threads, so the UI is only touched from the event loop.
struct StatusLine {
    ui: slint::Weak<AppWindow>,
}

impl LogSink for StatusLine {
    fn write(&self, entry: &LogEntry) {
        let kind = match entry.kind {
            LogType::Success => StatusKind::Success,
            LogType::Warning | LogType::Error => StatusKind::Failure,
            LogType::Info => StatusKind::Idle,
        };
        let text = format!("{}  {}", chrono::Local::now().format("%H:%M:%S"), entry);

        // The window may already be closed when a slow request finishes.
        if let Err(e) = self.ui.upgrade_in_event_loop(move |ui| {
            let model = ui.global::<ViewModel>();
            model.set_status(text.into());
            model.set_status_kind(kind);
        }) {
            log::warn!("Could not show status: {e}");
        }
    }
}

/// Our App struct that holds the UI, the controller and the runtime the requests run on.
///
/// The controller stays on the UI thread; every send becomes a task on the runtime.
struct App {
    ui: AppWindow,
    controller: Rc<LandingController>,
    // Kept alive for as long as the window is open.
    _runtime: tokio::runtime::Runtime,
}

impl App {
    /// Create a new App struct.
    ///
    /// Builds the window, the request runtime and the services for `config`.
    fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        // Make a new AppWindow
        let ui = AppWindow::new()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("sensor-panel-http")
            .enable_all()
            .build()?;

        // Both services share one connection pool.
        let http = HttpService::new(config, None)?;
        let logger = AppLogger::new().with_sink(Arc::new(StatusLine { ui: ui.as_weak() }));

        let controller = Rc::new(LandingController::new(
            TemperatureService::temperature(http.clone()),
            HumidityService::humidity(http),
            logger,
            runtime.handle().clone(),
        ));

        // Initialize the view model with the slider ranges and start values
        let model = ui.global::<ViewModel>();
        model.set_min_temperature(TEMPERATURE_RANGE.min);
        model.set_max_temperature(TEMPERATURE_RANGE.max);
        model.set_min_humidity(HUMIDITY_RANGE.min);
        model.set_max_humidity(HUMIDITY_RANGE.max);
        model.set_temperature(controller.temperature());
        model.set_humidity(controller.humidity());

        Ok(Self {
            ui,
            controller,
            _runtime: runtime,
        })
    }

    /// Connect the UI callbacks to the controller and run the event loop.
    fn run(&mut self) -> anyhow::Result<()> {
        let model = self.ui.global::<ViewModel>();

        let ui_handle = self.ui.as_weak();
        let controller = self.controller.clone();
        model.on_temperature_changed(move |position| {
            slider_moved(
                position,
                |degrees| controller.set_temperature(degrees),
                |degrees| {
                    if let Some(ui) = ui_handle.upgrade() {
                        ui.global::<ViewModel>().set_temperature(degrees);
                    }
                },
            );
        });

        let ui_handle = self.ui.as_weak();
        let controller = self.controller.clone();
        model.on_humidity_changed(move |position| {
            slider_moved(
                position,
                |percent| controller.set_humidity(percent),
                |percent| {
                    if let Some(ui) = ui_handle.upgrade() {
                        ui.global::<ViewModel>().set_humidity(percent);
                    }
                },
            );
        });

        // Sends are fire-and-forget, the outcome shows up in the status line.
        let controller = self.controller.clone();
        model.on_send_temperature(move || {
            controller.send_temperature();
        });

        let controller = self.controller.clone();
        model.on_send_humidity(move || {
            controller.send_humidity();
        });

        // Run the UI (and map an error to an anyhow::Error).
        self.ui.run().map_err(|e| e.into())
    }
}

/// Round a slider position to whole units, `store` it and `show` the value that was kept.
///
/// `store` clamps, so the view model always shows what the next send will use.
fn slider_moved(position: f32, store: impl FnOnce(i32) -> i32, show: impl FnOnce(i32)) {
    show(store(position.round() as i32));
}

/// A minimal main function that loads the configuration, initializes the App and runs it.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = ClientConfig::from_env()?;
    log::info!("Sending records to {}", config.base_url);

    let mut app = App::new(&config)?;

    app.run()
}
