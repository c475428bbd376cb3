// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Connection lifecycle events and session handles

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::Context;

/// Identifier of a database connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A live connection and the context its metadata is cached under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub context: Context,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, context: impl Into<Context>) -> Self {
        Self {
            id: id.into(),
            context: context.into(),
        }
    }
}

/// Notifications from the connection layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// An existing connection transitioned into the connected state
    BecameConnected(Session),
    /// A new connection was established
    ConnectSucceeded(Session),
    /// The connection dropped unexpectedly
    ConnectionLost(SessionId),
    /// The connection was closed on request
    DisconnectSucceeded(SessionId),
}

impl ConnectionEvent {
    /// The connection this event is about
    pub fn session_id(&self) -> &SessionId {
        match self {
            ConnectionEvent::BecameConnected(session)
            | ConnectionEvent::ConnectSucceeded(session) => &session.id,
            ConnectionEvent::ConnectionLost(id) | ConnectionEvent::DisconnectSucceeded(id) => id,
        }
    }
}
