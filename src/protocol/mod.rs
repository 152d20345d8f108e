//! Wire protocol between the synchronizer and the browser client
//!
//! Every frame is a single JSON object. Commands flow in, creation messages
//! flow out.

mod inbound;
mod outbound;

pub use inbound::{ClientCommand, ACTIONS};
pub use outbound::{
    ConnectionCreated, ConnectionTag, ObjectCreated, OutboundMessage, SessionDescriptor,
};
