//! Topic hierarchy under one base path
//!
//! The InfluxDB line-protocol feed is the exception: time-series ingesters
//! subscribe to it on a fixed path shared by every node, so it does not
//! follow the base.

/// Base path used when none is configured
pub const DEFAULT_BASE_TOPIC: &str = "sensors/envnode";

/// Shared line-protocol topic
pub const DEFAULT_INFLUX_TOPIC: &str = "sensors/influx/environment";

/// Every topic the node publishes to or subscribes on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    data: String,
    config: String,
    commands: String,
    status: String,
    alerts: String,
    anomalies: String,
    buffered_data: String,
    influx: String,
}

impl Topics {
    /// Builds the hierarchy below `base`; a trailing `/` is ignored
    pub fn new(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            data: base.to_string(),
            config: format!("{}/config", base),
            commands: format!("{}/commands", base),
            status: format!("{}/status", base),
            alerts: format!("{}/alerts", base),
            anomalies: format!("{}/anomalies", base),
            buffered_data: format!("{}/buffered_data", base),
            influx: DEFAULT_INFLUX_TOPIC.to_string(),
        }
    }

    /// Moves the line-protocol feed to `topic`
    pub fn with_influx(mut self, topic: &str) -> Self {
        self.influx = topic.to_string();
        self
    }

    /// Live readings
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Inbound partial config updates
    pub fn config(&self) -> &str {
        &self.config
    }

    /// Inbound commands
    pub fn commands(&self) -> &str {
        &self.commands
    }

    /// Online announcements and command acknowledgements
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Spike and battery alerts
    pub fn alerts(&self) -> &str {
        &self.alerts
    }

    /// Z-score alerts
    pub fn anomalies(&self) -> &str {
        &self.anomalies
    }

    /// Batches replayed from the offline buffer
    pub fn buffered_data(&self) -> &str {
        &self.buffered_data
    }

    /// InfluxDB line-protocol records
    pub fn influx(&self) -> &str {
        &self.influx
    }

    /// Topics the node subscribes to
    pub fn inbound(&self) -> [&str; 2] {
        [&self.config, &self.commands]
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_TOPIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let topics = Topics::default();
        assert_eq!(topics.data(), "sensors/envnode");
        assert_eq!(topics.config(), "sensors/envnode/config");
        assert_eq!(topics.commands(), "sensors/envnode/commands");
        assert_eq!(topics.status(), "sensors/envnode/status");
        assert_eq!(topics.alerts(), "sensors/envnode/alerts");
        assert_eq!(topics.anomalies(), "sensors/envnode/anomalies");
        assert_eq!(topics.buffered_data(), "sensors/envnode/buffered_data");
        assert_eq!(topics.influx(), "sensors/influx/environment");
    }

    #[test]
    fn influx_ignores_base() {
        assert_eq!(Topics::new("site/a").influx(), DEFAULT_INFLUX_TOPIC);
        assert_eq!(Topics::new("site/a").with_influx("lab/influx").influx(), "lab/influx");
    }

    #[test]
    fn trailing_slash_ignored() {
        assert_eq!(Topics::new("site/a/"), Topics::new("site/a"));
        assert_eq!(Topics::new("site/a/").inbound(), ["site/a/config", "site/a/commands"]);
    }
}
