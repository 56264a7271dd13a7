//! Test helpers for integration testing.
//!
//! This module provides utilities shared by the integration test binaries:
//! - A recording sink that captures notifications and subscription handoffs
//! - Service configuration fixtures mirroring typical renderer services
//! - Handlers used across dispatch scenarios

use std::sync::Arc;

use parking_lot::Mutex;
use renderer_control::{
    ActionEvent, ControlError, NotificationSink, RendererDevice, Result, ServiceConfig,
};

/// Captures every sink callback so tests can assert on exactly what a
/// subscriber process would have received.
#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<(String, Vec<(String, String)>)>>,
    subscriptions: Mutex<Vec<(String, String, Vec<(String, String)>)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All `notify` calls in arrival order, as (service id, variables).
    pub fn notifications(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.notifications.lock().clone()
    }

    /// All `accept_subscription` calls, as (service id, subscriber id, variables).
    #[allow(dead_code)]
    pub fn subscriptions(&self) -> Vec<(String, String, Vec<(String, String)>)> {
        self.subscriptions.lock().clone()
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.lock().len()
    }

    /// The aggregate document of every notification for `service_id`.
    #[allow(dead_code)]
    pub fn documents_for(&self, service_id: &str) -> Vec<String> {
        self.notifications
            .lock()
            .iter()
            .filter(|(id, _)| id == service_id)
            .flat_map(|(_, variables)| variables.iter().map(|(_, value)| value.clone()))
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, service_id: &str, variables: &[(String, String)]) {
        self.notifications
            .lock()
            .push((service_id.to_string(), variables.to_vec()));
    }

    fn accept_subscription(&self, service_id: &str, subscriber_id: &str, variables: &[(String, String)]) {
        self.subscriptions.lock().push((
            service_id.to_string(),
            subscriber_id.to_string(),
            variables.to_vec(),
        ));
    }
}

/// A RenderingControl-shaped service: aggregate variable, two evented
/// variables, one silent argument-type variable. Attach actions per test.
pub fn rendering_control_config() -> ServiceConfig {
    ServiceConfig::new(
        "urn:upnp-org:serviceId:RenderingControl",
        "urn:schemas-upnp-org:service:RenderingControl:1",
        "urn:schemas-upnp-org:metadata-1-0/RCS/",
    )
    .variable("LastChange", "")
    .variable("Volume", "10")
    .variable("Mute", "0")
    .variable("A_ARG_TYPE_Channel", "Master")
}

/// An AVTransport-shaped service for multi-service scenarios.
#[allow(dead_code)]
pub fn av_transport_config() -> ServiceConfig {
    ServiceConfig::new(
        "urn:upnp-org:serviceId:AVTransport",
        "urn:schemas-upnp-org:service:AVTransport:1",
        "urn:schemas-upnp-org:metadata-1-0/AVT/",
    )
    .variable("LastChange", "")
    .variable("TransportState", "STOPPED")
    .variable("CurrentTrackURI", "")
}

/// Build a one-service device around the given configuration.
pub fn build_device(sink: Arc<RecordingSink>, config: ServiceConfig) -> RendererDevice {
    RendererDevice::builder()
        .sink(sink)
        .service(config)
        .build()
        .expect("device configuration should be valid")
}

/// Standard SetVolume handler: reads DesiredVolume, writes Volume.
pub fn set_volume(event: &mut ActionEvent) -> Result<()> {
    let desired = event.argument("DesiredVolume")?;
    let index = volume_index(event)?;
    event.variables_mut().set(index, desired)?;
    Ok(())
}

/// Standard GetVolume handler: answers with CurrentVolume.
#[allow(dead_code)]
pub fn get_volume(event: &mut ActionEvent) -> Result<()> {
    let index = volume_index(event)?;
    event.append_variable(index, "CurrentVolume")?;
    Ok(())
}

fn volume_index(event: &ActionEvent) -> Result<usize> {
    event
        .variables()
        .index_of("Volume")
        .ok_or_else(|| ControlError::HandlerFault {
            code: 501,
            message: "Volume variable not declared".to_string(),
        })
}
