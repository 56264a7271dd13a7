//! Basic renderer wiring - services, handlers, eventing
//!
//! Builds a device with RenderingControl and AVTransport style services,
//! dispatches a few actions against it, and prints every notification the
//! sink receives.
//!
//! Run: cargo run -p renderkit-renderer-control --example basic_usage

use std::sync::Arc;

use renderer_control::logging::{init_logging, LoggingMode};
use renderer_control::{
    ActionEvent, ActionInvocation, ControlError, NotificationSink, RendererDevice, Result,
    ServiceConfig, ServiceId, StateVariableQuery, SubscriptionRequest,
};

/// Prints everything the device publishes. A real host would frame these
/// as eventing HTTP requests to each subscriber.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, service_id: &str, variables: &[(String, String)]) {
        for (name, value) in variables {
            println!("  [notify] {} {} = {}", service_id, name, value);
        }
    }

    fn accept_subscription(&self, service_id: &str, subscriber_id: &str, variables: &[(String, String)]) {
        println!("  [subscribe] {} joined {}", subscriber_id, service_id);
        for (name, value) in variables {
            println!("  [initial] {} = {}", name, value);
        }
    }
}

fn set_volume(event: &mut ActionEvent) -> Result<()> {
    let desired = event.argument("DesiredVolume")?;
    let index = event.variables().index_of("Volume").ok_or_else(|| {
        ControlError::HandlerFault {
            code: 501,
            message: "Volume variable not declared".to_string(),
        }
    })?;
    event.variables_mut().set(index, desired)?;
    Ok(())
}

fn get_volume(event: &mut ActionEvent) -> Result<()> {
    let index = event.variables().index_of("Volume").ok_or_else(|| {
        ControlError::HandlerFault {
            code: 501,
            message: "Volume variable not declared".to_string(),
        }
    })?;
    event.append_variable(index, "CurrentVolume")?;
    Ok(())
}

fn play(event: &mut ActionEvent) -> Result<()> {
    let index = event.variables().index_of("TransportState").ok_or_else(|| {
        ControlError::HandlerFault {
            code: 501,
            message: "TransportState variable not declared".to_string(),
        }
    })?;
    event.variables_mut().set(index, "PLAYING")?;
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingMode::Development)?;

    println!("1. Building the device...");
    let device = RendererDevice::builder()
        .sink(Arc::new(ConsoleSink))
        .service(
            ServiceConfig::new(
                "urn:upnp-org:serviceId:RenderingControl",
                "urn:schemas-upnp-org:service:RenderingControl:1",
                "urn:schemas-upnp-org:metadata-1-0/RCS/",
            )
            .variable("LastChange", "")
            .variable("Volume", "50")
            .variable("Mute", "0")
            .handled_action("SetVolume", set_volume)
            .handled_action("GetVolume", get_volume),
        )
        .service(
            ServiceConfig::new(
                "urn:upnp-org:serviceId:AVTransport",
                "urn:schemas-upnp-org:service:AVTransport:1",
                "urn:schemas-upnp-org:metadata-1-0/AVT/",
            )
            .variable("LastChange", "")
            .variable("TransportState", "STOPPED")
            .variable("CurrentTrackURI", "")
            .variable("A_ARG_TYPE_SeekTarget", "")
            .handled_action("Play", play),
        )
        .build()?;
    println!("✓ {} services registered", device.service_count());

    let rendering_control = ServiceId::new("urn:upnp-org:serviceId:RenderingControl");
    let av_transport = ServiceId::new("urn:upnp-org:serviceId:AVTransport");

    println!("\n2. Accepting a subscriber on RenderingControl...");
    device.subscribe(&SubscriptionRequest::new(
        rendering_control.clone(),
        "uuid:subscriber-1",
    ))?;

    println!("\n3. Dispatching SetVolume(42)...");
    device.dispatch_action(
        &ActionInvocation::new(rendering_control.clone(), "SetVolume")
            .with_argument("DesiredVolume", "42"),
    )?;

    println!("\n4. Dispatching GetVolume...");
    let response = device.dispatch_action(&ActionInvocation::new(
        rendering_control.clone(),
        "GetVolume",
    ))?;
    println!("✓ CurrentVolume = {:?}", response.argument("CurrentVolume"));

    println!("\n5. Querying the Mute variable directly...");
    let mute = device.query_variable(&StateVariableQuery::new(rendering_control.clone(), "Mute"))?;
    println!("✓ Mute = {}", mute);

    println!("\n6. Backend reports a new track and starts playback...");
    device.update_service(&av_transport, |vars| {
        let track = vars.index_of("CurrentTrackURI").unwrap();
        let state = vars.index_of("TransportState").unwrap();
        vars.set(track, "http://radio.example/stream.mp3").unwrap();
        vars.set(state, "TRANSITIONING").unwrap();
        vars.set(state, "PLAYING").unwrap();
    })?;

    println!("\n7. Dispatching an action the service does not declare...");
    match device.dispatch_action(&ActionInvocation::new(rendering_control, "Teleport")) {
        Ok(_) => println!("✗ unexpected success"),
        Err(fault) => println!("✓ fault {} - {}", fault.fault_code(), fault),
    }

    println!("\n✓ Example completed");
    Ok(())
}
