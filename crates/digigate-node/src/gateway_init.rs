//! Gateway construction from configuration.

use std::rc::Rc;
use std::time::Duration;

use digigate_transport::{
    Digipeater, DigipeaterSource, Gateway, InterfaceIndex, InterfaceKind, InterfaceRegistry,
    InterfaceSpec, StationIdentity,
};

use crate::config::{InterfaceEntry, InterfaceKindEntry, NodeConfig};
use crate::error::NodeError;
use crate::filter::CallsignFilter;
use crate::transport_log::LoggingTransport;

fn interface_spec(entry: &InterfaceEntry) -> InterfaceSpec {
    let mut spec = InterfaceSpec::new(entry.callsign.clone(), InterfaceKind::from(&entry.kind))
        .transmitting(entry.tx_ok)
        .with_aliases(entry.aliases.iter().cloned());
    spec.telemetry_to_is = entry.telemetry_to_is;
    spec.telemetry_to_rf = entry.telemetry_to_rf;
    spec.group = entry.group;
    spec
}

/// Build the registry, digipeaters and sources described by `config`.
///
/// Interfaces are registered in file order. Each radio interface gets a
/// [`LoggingTransport`].
pub fn build_gateway(config: &NodeConfig) -> Result<Gateway, NodeError> {
    let mut registry = InterfaceRegistry::new();
    for entry in &config.interfaces {
        let index = registry.register(interface_spec(entry))?;
        if !matches!(entry.kind, InterfaceKindEntry::Null) {
            registry.attach_transport(index, Rc::new(LoggingTransport::new(&entry.callsign)))?;
        }
    }

    let mut identity = StationIdentity::new(config.station.mycall.clone());
    identity.aprsis_login = config.station.aprsis_login.clone();
    let mut gateway = Gateway::new(identity, registry);

    for digi in &config.digipeaters {
        let tx = find_index(&gateway, &digi.transmitter)?;
        let id = gateway.add_digipeater(Digipeater::with_memory_stores(tx))?;
        for source in &digi.sources {
            let rx = find_index(&gateway, &source.interface)?;
            let mut binding = DigipeaterSource::new(id);
            if let Some(via) = source.via()? {
                binding = binding.with_via_path(via);
            }
            if let Some(via) = source.msg_via()? {
                binding = binding.with_msg_via_path(via);
            }
            if !source.filter.is_empty() {
                binding = binding.with_filter(Box::new(CallsignFilter::from(&source.filter)));
            }
            gateway.attach_source(rx, binding)?;
            tracing::debug!(
                transmitter = %digi.transmitter,
                source = %source.interface,
                "digipeater source attached"
            );
        }
    }

    tracing::info!(
        interfaces = gateway.registry().len(),
        digipeaters = config.digipeaters.len(),
        "gateway configured"
    );
    Ok(gateway)
}

fn find_index(gateway: &Gateway, callsign: &str) -> Result<InterfaceIndex, NodeError> {
    gateway
        .registry()
        .find_by_callsign(callsign)
        .map(|i| i.index())
        .ok_or_else(|| NodeError::Config(format!("unknown interface {callsign}")))
}

/// Beacon period; `None` sends beacons only once at startup.
pub fn beacon_period(interval_secs: u64) -> Option<Duration> {
    (interval_secs > 0).then(|| Duration::from_secs(interval_secs))
}
