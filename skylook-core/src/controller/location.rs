use std::sync::Arc;

use crate::{
    error::LookupError,
    locate::{Geolocator, PositionOptions},
    model::MY_LOCATION,
    provider::WeatherSource,
    recent::RecentCache,
    render::{OutputFormat, render_weather},
    ui::{BusyGuard, Control, UiPorts},
};

/// "Use my location": position, remember, fetch, render.
pub struct LocationController {
    locator: Arc<Geolocator>,
    weather: Arc<dyn WeatherSource>,
    recent: RecentCache,
    ui: Arc<dyn UiPorts>,
    options: PositionOptions,
    format: OutputFormat,
}

impl std::fmt::Debug for LocationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationController")
            .field("locator", &self.locator)
            .field("options", &self.options)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl LocationController {
    pub fn new(
        locator: Arc<Geolocator>,
        weather: Arc<dyn WeatherSource>,
        recent: RecentCache,
        ui: Arc<dyn UiPorts>,
    ) -> Self {
        Self {
            locator,
            weather,
            recent,
            ui,
            options: PositionOptions::default(),
            format: OutputFormat::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn locate(&self) -> Result<(), LookupError> {
        let ui = self.ui.as_ref();
        ui.set_error(None);

        if !self.locator.is_available() {
            let err = LookupError::GeolocationUnsupported;
            ui.set_error(Some(err.to_string()));
            return Err(err);
        }

        let _busy = BusyGuard::enter(ui, Control::Locate);

        match self.lookup().await {
            Ok(rendered) => {
                ui.set_output(rendered);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "locate failed");
                ui.set_error(Some(format!("Location error: {e}")));
                Err(e)
            }
        }
    }

    async fn lookup(&self) -> Result<String, LookupError> {
        let here = self.locator.current_position(&self.options).await?;
        self.recent.record(MY_LOCATION, self.ui.as_ref());

        let snapshot = self.weather.fetch_current(here, None).await?;
        Ok(render_weather(Some(&snapshot), &here.label(), self.format))
    }
}
