// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use lexis_config::LexisConfig;
use lexis_familiarity::EncounterPolicy;

/// Tunables the router takes from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterSettings {
    pub encounter: EncounterPolicy,
    /// Inactivity bound for upstream streams, relayed or drained.
    pub stream_timeout: Duration,
    /// Outbound frame queue per connected client.
    pub client_buffer: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self::from(&LexisConfig::default())
    }
}

impl From<&LexisConfig> for RouterSettings {
    fn from(config: &LexisConfig) -> Self {
        Self {
            encounter: EncounterPolicy {
                threshold: config.familiarity.encounter_threshold,
                window: config
                    .familiarity
                    .encounter_window_secs
                    .map(Duration::from_secs),
            },
            stream_timeout: Duration::from_secs(config.relay.stream_timeout_secs),
            client_buffer: config.gateway.client_buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_maps_to_duration() {
        let mut config = LexisConfig::default();
        config.familiarity.encounter_window_secs = Some(3600);
        config.familiarity.encounter_threshold = 5;
        let settings = RouterSettings::from(&config);
        assert_eq!(settings.encounter.threshold, 5);
        assert_eq!(settings.encounter.window, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn defaults_follow_config_defaults() {
        let settings = RouterSettings::default();
        assert_eq!(settings.encounter.threshold, 3);
        assert_eq!(settings.encounter.window, None);
        assert_eq!(settings.stream_timeout, Duration::from_secs(120));
        assert_eq!(settings.client_buffer, 256);
    }
}
