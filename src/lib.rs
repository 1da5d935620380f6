//! # softap-portal
//!
//! The provisioning micro-server of a headless IoT sensor node: while the
//! node hosts a temporary access point, this crate serves a one-page
//! configuration form over a **hand-rolled, line-oriented HTTP subset** and
//! parses the submitted network SSID, password, and companion display
//! address out of a raw polled byte stream.
//!
//! The protocol machine reproduces the deployed device's wire behavior
//! exactly, quirks included: single-byte polling reads, the
//! `Content-Length + 22` compensation constant, and the ordinal
//! three-field body split. See [`body::LENGTH_COMPENSATION`] and
//! [`form::split_ordinal`] for the details, and [`PortalConfig`] for the
//! opt-in redesigns (read deadlines, generic form decoding).
//!
//! ## Quick start — parsing a form body
//!
//! ```rust
//! use softap_portal::parse_form_body;
//!
//! let result = parse_form_body("ssid=My+Home&password=secret&ipaddress=192.168.1.5");
//! assert_eq!(result.ssid, "My Home");
//! assert_eq!(result.password, "secret");
//! assert_eq!(result.display_ip, "192.168.1.5");
//! ```
//!
//! ## Quick start — running the portal over TCP
//!
//! ```rust,no_run
//! use softap_portal::{PortalConfig, ProvisioningPortal, TcpPortalListener};
//!
//! let listener = TcpPortalListener::bind("0.0.0.0:80")?;
//! let mut portal = ProvisioningPortal::new(listener, PortalConfig::default());
//! let result = portal.run(); // blocks until a form is submitted
//! println!("join {} and talk to {}", result.ssid, result.display_ip);
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod body;
mod error;
pub mod form;
pub mod page;
mod reader;
mod service;
mod session;
pub mod transport;
mod types;

// Re-export public API.
pub use error::PortalError;
pub use form::{decode_generic, decode_pairs, parse_form_body, split_ordinal};
pub use page::{FORM_PAGE, form_response, serve_form};
pub use reader::LineReader;
pub use service::ProvisioningPortal;
pub use session::{FormDecoding, PortalConfig, Session, SessionOutcome};
pub use transport::{Connection, Listener, TcpConnection, TcpPortalListener};
pub use types::{ProvisioningResult, RequestKind};
