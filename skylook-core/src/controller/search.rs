use std::sync::Arc;

use crate::{
    error::LookupError,
    provider::{Geocoder, WeatherSource},
    recent::RecentCache,
    render::{OutputFormat, render_no_results, render_weather},
    ui::{BusyGuard, Control, UiPorts},
};

const EMPTY_QUERY_MESSAGE: &str = "Please enter a city name.";

/// Typed search: geocode, remember, fetch, render.
#[derive(Clone)]
pub struct SearchController {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherSource>,
    recent: RecentCache,
    ui: Arc<dyn UiPorts>,
    format: OutputFormat,
}

impl std::fmt::Debug for SearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("geocoder", &self.geocoder)
            .field("weather", &self.weather)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl SearchController {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherSource>,
        recent: RecentCache,
        ui: Arc<dyn UiPorts>,
    ) -> Self {
        Self {
            geocoder,
            weather,
            recent,
            ui,
            format: OutputFormat::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Search for whatever is in the input.
    ///
    /// Every outcome is already reported through the UI ports; the result
    /// is returned for callers that need an exit status.
    pub async fn search(&self) -> Result<(), LookupError> {
        let ui = self.ui.as_ref();
        ui.set_error(None);

        let query = ui.input_value().trim().to_string();
        if query.is_empty() {
            ui.set_error(Some(EMPTY_QUERY_MESSAGE.to_string()));
            return Err(LookupError::EmptyInput);
        }

        let _busy = BusyGuard::enter(ui, Control::Search);

        match self.lookup(&query).await {
            Ok(rendered) => {
                ui.set_output(rendered);
                Ok(())
            }
            Err(e) => {
                tracing::error!(query = %query, error = %e, "search failed");
                ui.set_error(Some(e.to_string()));
                ui.set_output(render_no_results(self.format));
                Err(e)
            }
        }
    }

    /// Put a remembered place into the input and search for it.
    pub async fn search_recent(&self, label: &str) -> Result<(), LookupError> {
        self.ui.set_input_value(label);
        self.search().await
    }

    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        let place = self.geocoder.geocode(query).await?;
        self.recent.record(&place.recent_label(), self.ui.as_ref());

        let snapshot = self
            .weather
            .fetch_current(place.coordinates(), place.timezone.as_deref())
            .await?;

        Ok(render_weather(Some(&snapshot), &place.display_label(), self.format))
    }
}
