//! Server lookup for database targets

use crate::config::{DatabaseTarget, InlineDatabase, ServerConfig};
use std::collections::HashMap;
use tracing::warn;

/// Connection parameters of one target, wherever they were configured
#[derive(Debug, Clone, Copy)]
pub enum Connection<'a> {
    /// Joined from a `[[servers]]` entry
    Server(&'a ServerConfig),
    /// Carried by the target itself
    Inline(&'a InlineDatabase),
}

impl<'a> Connection<'a> {
    pub fn server_name(&self) -> &'a str {
        match self {
            Connection::Server(server) => &server.name,
            Connection::Inline(inline) => inline.label(),
        }
    }

    pub fn address(&self) -> &'a str {
        match self {
            Connection::Server(server) => &server.address,
            Connection::Inline(inline) => &inline.address,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Connection::Server(server) => server.port,
            Connection::Inline(inline) => inline.port,
        }
    }

    pub fn username(&self) -> &'a str {
        match self {
            Connection::Server(server) => &server.username,
            Connection::Inline(inline) => &inline.username,
        }
    }

    pub fn encrypted_password(&self) -> Option<&'a str> {
        match self {
            Connection::Server(server) => server.encrypted_password(),
            Connection::Inline(inline) => inline.encrypted_password(),
        }
    }
}

/// Servers by name, read-only once built
#[derive(Debug, Default)]
pub struct TargetRegistry {
    servers: HashMap<String, ServerConfig>,
}

impl TargetRegistry {
    /// Build the registry; a repeated name replaces the earlier entry
    pub fn build(servers: &[ServerConfig]) -> Self {
        let mut map = HashMap::with_capacity(servers.len());

        for server in servers {
            if map.insert(server.name.clone(), server.clone()).is_some() {
                warn!(
                    "Server '{}' is defined more than once, using the last definition",
                    server.name
                );
            }
        }

        Self { servers: map }
    }

    pub fn resolve(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name)
    }

    /// Connection for a target, `None` when its server is unknown
    pub fn connection_for<'a>(&'a self, target: &'a DatabaseTarget) -> Option<Connection<'a>> {
        match target {
            DatabaseTarget::Inline(inline) => Some(Connection::Inline(inline)),
            DatabaseTarget::Server(reference) => {
                self.resolve(&reference.server).map(Connection::Server)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
