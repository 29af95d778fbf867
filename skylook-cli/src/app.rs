use std::sync::Arc;

use anyhow::Result;
use skylook_core::{
    Config, FileStore, Geolocator, LocationController, OutputFormat, RecentCache,
    SearchController, services_from_config,
};

use crate::terminal::TerminalUi;

/// Everything a command needs, wired from the config file.
#[derive(Debug)]
pub struct App {
    pub ui: Arc<TerminalUi>,
    pub recent: RecentCache,
    pub search: SearchController,
    pub locate: LocationController,
}

impl App {
    pub fn build(
        config: &Config,
        format: Option<OutputFormat>,
        echo_recent: bool,
    ) -> Result<Self> {
        let format = format.unwrap_or_else(|| config.output_format());
        let services = services_from_config(config);

        let store = FileStore::open_default()?;
        tracing::debug!(path = %store.path().display(), "recent store");
        let recent = RecentCache::new(Arc::new(store));

        let ui = Arc::new(TerminalUi::new(format).echo_recent(echo_recent));
        let locator = Arc::new(Geolocator::new(services.position));

        let search = SearchController::new(
            services.geocoder,
            services.weather.clone(),
            recent.clone(),
            ui.clone(),
        )
        .with_format(format);
        let locate = LocationController::new(
            locator,
            services.weather,
            recent.clone(),
            ui.clone(),
        )
        .with_format(format);

        Ok(Self {
            ui,
            recent,
            search,
            locate,
        })
    }
}
