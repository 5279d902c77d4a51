use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use mirror_channels::{ChannelId, EndpointId, RelayEndpoint};

use crate::error::{Error, Result};

/// Where messages from one channel are mirrored to.
#[derive(Clone)]
pub struct Route {
    /// The other channel of the pair.
    pub partner: ChannelId,
    /// Endpoint that posts into `partner`.
    pub endpoint: Arc<dyn RelayEndpoint>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("partner", &self.partner)
            .field("endpoint", &self.endpoint.identity())
            .finish()
    }
}

/// Explicit channel -> partner map for every configured relay pair.
///
/// Each channel belongs to at most one pair, so "the other channel" is a
/// direct lookup rather than a scan over all configured channels.
#[derive(Debug, Default)]
pub struct RelayRoutes {
    routes: HashMap<ChannelId, Route>,
}

impl RelayRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pair. `a_out` posts into `b`, `b_out` posts into `a`.
    pub fn add_pair(
        &mut self,
        a: ChannelId,
        a_out: Arc<dyn RelayEndpoint>,
        b: ChannelId,
        b_out: Arc<dyn RelayEndpoint>,
    ) -> Result<()> {
        if a == b {
            return Err(Error::invalid_route(a, "channel cannot be paired with itself"));
        }
        for channel in [a, b] {
            if let Some(existing) = self.routes.get(&channel) {
                return Err(Error::invalid_route(
                    channel,
                    format!("already paired with {}", existing.partner),
                ));
            }
        }
        self.routes.insert(a, Route {
            partner: b,
            endpoint: a_out,
        });
        self.routes.insert(b, Route {
            partner: a,
            endpoint: b_out,
        });
        Ok(())
    }

    pub fn get(&self, channel: ChannelId) -> Option<&Route> {
        self.routes.get(&channel)
    }

    pub fn partner(&self, channel: ChannelId) -> Option<ChannelId> {
        self.routes.get(&channel).map(|r| r.partner)
    }

    pub fn is_relay_channel(&self, channel: ChannelId) -> bool {
        self.routes.contains_key(&channel)
    }

    /// Identities of every configured endpoint, for loop detection.
    pub fn identities(&self) -> HashSet<EndpointId> {
        self.routes
            .values()
            .map(|r| r.endpoint.identity())
            .collect()
    }

    pub fn channels(&self) -> Vec<ChannelId> {
        let mut channels: Vec<_> = self.routes.keys().copied().collect();
        channels.sort();
        channels
    }

    /// Number of configured pairs.
    pub fn len(&self) -> usize {
        self.routes.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
