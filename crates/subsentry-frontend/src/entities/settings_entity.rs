use subsentry_bridge::config::{AlertsConfig, Config};

/// Last configuration received from the backend.
#[derive(Debug, Clone, Default)]
pub struct SettingsEntity {
    pub config: Config,
}

impl SettingsEntity {
    pub fn update(&mut self, config: Config) {
        if self.config != config {
            log::debug!("Settings updated: {config:?}");
        }
        self.config = config;
    }

    pub fn alerts(&self) -> &AlertsConfig {
        &self.config.alerts
    }
}
