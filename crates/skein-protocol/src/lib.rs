//! Skein protocol core.
//!
//! Lets a set of independent peers over redundant point-to-point links
//! broadcast small structured events and cooperatively hold a single
//! exclusive token (the "enabled" right) with at most one holder,
//! using only pairwise message exchange — no central coordinator.
//!
//! Wire format: 1-byte discriminant + fixed little-endian payload.
//! Transport discovery, rendering, and input capture are external
//! collaborators consumed through [`Transport`] and [`LinkEvent`].

pub mod codec;
pub mod error;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod token;
pub mod types;

pub use codec::Message;
pub use error::{DecodeError, SkeinError};
pub use registry::PeerRegistry;
pub use router::{Inbound, OutboundFrame};
pub use runtime::{
    LinkEvent, ProtocolEvent, RuntimeChannels, RuntimeConfig, RuntimeHandle, SkeinRuntime,
    Transport,
};
pub use token::{TokenAction, TokenCoordinator};
pub use types::{Link, LinkId, PeerId};
