use log::{debug, info, warn};
use std::thread;
use std::time::Duration;

use crate::session::{PortalConfig, Session, SessionOutcome};
use crate::transport::{Connection, Listener};
use crate::types::ProvisioningResult;

/// Pause between accept polls so an idle portal does not pin a core.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The accept loop: serves one connection at a time until a session
/// completes with a submitted configuration.
///
/// Sessions that only served the form, or whose peer dropped mid-request,
/// are released and the loop re-accepts. With a configured
/// [`read_timeout`](PortalConfig::read_timeout), a stalled peer is likewise
/// dropped rather than wedging the portal; without one, the loop preserves
/// the original block-forever behavior.
pub struct ProvisioningPortal<L: Listener> {
    listener: L,
    config: PortalConfig,
}

impl<L: Listener> ProvisioningPortal<L> {
    pub fn new(listener: L, config: PortalConfig) -> Self {
        Self { listener, config }
    }

    /// Block until a configuration form is submitted, returning its values.
    ///
    /// The caller is expected to have brought the access point up already
    /// and to tear it down (and join the configured network) afterwards.
    pub fn run(&mut self) -> ProvisioningResult {
        info!("provisioning portal waiting for a configuration submission");
        loop {
            let mut conn = self.accept_one();
            let outcome = Session::new(&self.config).run(&mut conn);
            conn.close();
            match outcome {
                Ok(SessionOutcome::Complete(result)) => {
                    info!(
                        "provisioning complete: ssid {:?}, display {}",
                        result.ssid, result.display_ip
                    );
                    return result;
                }
                Ok(SessionOutcome::ServedForm) => {
                    debug!("form served, awaiting submission");
                }
                Ok(SessionOutcome::Aborted) => {
                    debug!("peer disconnected mid-request");
                }
                Err(e) => {
                    warn!("dropping connection: {e}");
                }
            }
        }
    }

    fn accept_one(&mut self) -> L::Conn {
        loop {
            if let Some(conn) = self.listener.poll_accept() {
                return conn;
            }
            thread::sleep(ACCEPT_POLL_INTERVAL);
        }
    }
}
