use anyhow::{Context, Result};
use jack::{AsyncClient, Client, ClientOptions};
use log::{error, info, warn};
use std::sync::Arc;

use crate::effect::EffectRegistry;
use crate::host::{EffectHost, EffectHostHandle};
use crate::io::CLIENT_NAME;
use crate::io::jack::{NotificationHandler, ProcessHandler};
use crate::io::ports::{IN_LEFT, IN_RIGHT, OUT_LEFT, OUT_RIGHT};
use crate::settings::AudioSettings;

/// Owns the JACK client that drives the effect host.
pub struct Manager {
    active_client: AsyncClient<NotificationHandler, ProcessHandler>,
    host_handle: EffectHostHandle,
}

impl Manager {
    pub fn new(
        settings: &AudioSettings,
        registry: Arc<EffectRegistry>,
        initial_effect: usize,
    ) -> Result<Self> {
        let (client, _) = Client::new(CLIENT_NAME, ClientOptions::NO_START_SERVER)
            .context("failed to create JACK client")?;

        let sample_rate = client.sample_rate() as f32;
        let (host, host_handle) = EffectHost::new(registry, initial_effect, sample_rate)
            .context("failed to create effect host")?;

        let jack_handler =
            ProcessHandler::new(&client, host).context("failed to create process handler")?;

        let active_client = client
            .activate_async(NotificationHandler, jack_handler)
            .context("failed to activate async client")?;

        let manager = Self {
            active_client,
            host_handle,
        };

        manager.connect_ports(settings);

        Ok(manager)
    }

    fn port_pairs(settings: &AudioSettings) -> [(String, String); 4] {
        [
            (
                settings.input_left_port.clone(),
                format!("{CLIENT_NAME}:{IN_LEFT}"),
            ),
            (
                settings.input_right_port.clone(),
                format!("{CLIENT_NAME}:{IN_RIGHT}"),
            ),
            (
                format!("{CLIENT_NAME}:{OUT_LEFT}"),
                settings.output_left_port.clone(),
            ),
            (
                format!("{CLIENT_NAME}:{OUT_RIGHT}"),
                settings.output_right_port.clone(),
            ),
        ]
    }

    /// Connect audio ports based on settings
    fn connect_ports(&self, settings: &AudioSettings) {
        let client = self.active_client.as_client();

        for (source, destination) in Self::port_pairs(settings) {
            if let Err(e) = client.connect_ports_by_name(&source, &destination) {
                warn!("Failed to connect '{source}' -> '{destination}': {e}");
            } else {
                info!("Connected {source} -> {destination}");
            }
        }
    }

    /// Disconnect all audio connections
    pub fn disconnect_all(&self) {
        let client = self.active_client.as_client();

        for name in [IN_LEFT, IN_RIGHT, OUT_LEFT, OUT_RIGHT] {
            if let Some(port) = client.port_by_name(&format!("{CLIENT_NAME}:{name}")) {
                client.disconnect(&port).unwrap_or_else(|e| {
                    error!("Failed to disconnect {name}: {e}");
                });
            }
        }
    }

    /// Get available input ports
    pub fn get_available_inputs(&self) -> Vec<String> {
        self.available_ports(jack::PortFlags::IS_OUTPUT)
    }

    /// Get available output ports
    pub fn get_available_outputs(&self) -> Vec<String> {
        self.available_ports(jack::PortFlags::IS_INPUT)
    }

    fn available_ports(&self, flags: jack::PortFlags) -> Vec<String> {
        let own_prefix = format!("{CLIENT_NAME}:");
        self.active_client
            .as_client()
            .ports(None, Some("audio"), flags)
            .into_iter()
            .filter(|p| !p.starts_with(&own_prefix))
            .collect()
    }

    pub const fn host(&self) -> &EffectHostHandle {
        &self.host_handle
    }

    pub fn sample_rate(&self) -> usize {
        self.active_client.as_client().sample_rate() as usize
    }

    pub fn buffer_size(&self) -> usize {
        self.active_client.as_client().buffer_size() as usize
    }
}
