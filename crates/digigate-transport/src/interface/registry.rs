//! Registry of every interface of the station.

use std::rc::Rc;

use super::{APRSIS_GROUP, Interface, InterfaceIndex, InterfaceSpec, MAX_IF_GROUP};
use crate::digipeater::DigipeaterSource;
use crate::error::RegistryError;
use crate::services::Transport;

/// Ordered set of interfaces.
///
/// The APRS-IS pseudo-interface always occupies index 0 and group 0; radio
/// interfaces follow in registration order. The registry is filled at
/// startup and only read afterwards.
#[derive(Debug)]
pub struct InterfaceRegistry {
    interfaces: Vec<Interface>,
    top_group: u16,
}

impl InterfaceRegistry {
    /// Registry holding only the APRS-IS pseudo-interface.
    pub fn new() -> Self {
        Self {
            interfaces: vec![Interface::aprsis()],
            top_group: APRSIS_GROUP + 1,
        }
    }

    /// Append an interface, assigning its index and, unless pinned, its
    /// group.
    ///
    /// An unpinned interface gets the current registry size as its group,
    /// which is its 1-based position among radio interfaces, clamped to the
    /// last group.
    pub fn register(&mut self, spec: InterfaceSpec) -> Result<InterfaceIndex, RegistryError> {
        if self.find_by_callsign(&spec.callsign).is_some() {
            return Err(RegistryError::DuplicateCallsign(spec.callsign));
        }
        let group = match spec.group {
            Some(group) if (1..MAX_IF_GROUP).contains(&group) => group,
            Some(group) => {
                return Err(RegistryError::GroupOutOfRange {
                    group,
                    max: MAX_IF_GROUP,
                });
            }
            None => {
                let next = u16::try_from(self.interfaces.len()).unwrap_or(u16::MAX);
                next.min(MAX_IF_GROUP - 1)
            }
        };
        let index = InterfaceIndex(self.interfaces.len());
        let interface = Interface::from_spec(spec, index, group)?;
        tracing::debug!(
            callsign = %interface.callsign(),
            %index,
            group,
            kind = interface.kind().label(),
            tx_ok = interface.tx_ok(),
            "interface registered"
        );
        self.interfaces.push(interface);
        if self.top_group <= group {
            self.top_group = group + 1;
        }
        Ok(index)
    }

    /// Case-insensitive exact callsign match.
    #[must_use]
    pub fn find_by_callsign(&self, callsign: &str) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|i| i.callsign().eq_ignore_ascii_case(callsign))
    }

    /// Interface at raw position `index`, bounds-checked.
    #[must_use]
    pub fn find_by_index(&self, index: usize) -> Option<&Interface> {
        self.interfaces.get(index)
    }

    /// Interface at `index`.
    #[must_use]
    pub fn get(&self, index: InterfaceIndex) -> Option<&Interface> {
        self.interfaces.get(index.0)
    }

    /// Mutable interface at `index`.
    pub fn get_mut(&mut self, index: InterfaceIndex) -> Option<&mut Interface> {
        self.interfaces.get_mut(index.0)
    }

    /// Interface multiplexed on a KISS link under the given TNC port.
    #[must_use]
    pub fn find_by_kiss_port(&self, link: &str, port: u8) -> Option<&Interface> {
        self.interfaces.iter().find(|i| {
            i.kind()
                .kiss_link()
                .is_some_and(|(name, p)| name == link && p == port)
        })
    }

    /// The APRS-IS pseudo-interface, always at index 0.
    pub fn aprsis(&self) -> &Interface {
        &self.interfaces[0]
    }

    /// Bind the byte sink of the interface at `index`.
    pub fn attach_transport(
        &mut self,
        index: InterfaceIndex,
        transport: Rc<dyn Transport>,
    ) -> Result<(), RegistryError> {
        let iface = self
            .get_mut(index)
            .ok_or(RegistryError::UnknownInterface(index.0))?;
        iface.attach_transport(transport);
        Ok(())
    }

    /// Append a digipeater source to the interface at `index`. Sources are
    /// dispatched in the order they were attached.
    pub(crate) fn attach_source(
        &mut self,
        index: InterfaceIndex,
        source: DigipeaterSource,
    ) -> Result<(), RegistryError> {
        let iface = self
            .get_mut(index)
            .ok_or(RegistryError::UnknownInterface(index.0))?;
        iface.push_source(source);
        Ok(())
    }

    /// One past the highest group in use.
    pub fn top_group(&self) -> u16 {
        self.top_group
    }

    /// Interfaces in index order, APRS-IS first.
    pub fn iter(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.iter()
    }

    /// Number of interfaces, including APRS-IS.
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

impl Default for InterfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
