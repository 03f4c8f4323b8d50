//! Resolves the pool key of the selected token.
//!
//! Only v4 pools can be resolved. The position manager keeps a registry of
//! pool keys indexed by the first 25 bytes of the pool id, which is read with
//! a single `eth_call` per selection. Failures are not retried on their own;
//! reselecting the token or a manual refresh issues a new read.

use {
    crate::{
        domain::{
            PoolKey,
            Protocol,
            TokenOption,
            pool::truncate_pool_id,
            registry::Pool,
        },
        infra::PoolKeyReading,
        util::{Generation, Generations},
    },
    alloy::primitives::Address,
    futures::{FutureExt, future::BoxFuture},
    std::sync::Arc,
};

pub const UNSUPPORTED_PROTOCOL: &str = "This demo only supports V4 pools for quoting/swapping.";

/// The outcome of a pool key read, tagged with the request it answers.
#[derive(Debug)]
pub struct Resolution {
    pub generation: Generation,
    pub token: Address,
    pub result: anyhow::Result<PoolKey>,
}

pub struct PoolKeyResolver {
    reader: Arc<dyn PoolKeyReading>,
    registry: Address,
    generations: Generations,
    pool_key: Option<PoolKey>,
    error: Option<String>,
}

impl PoolKeyResolver {
    /// `registry` is the position manager holding the pool key registry.
    pub fn new(reader: Arc<dyn PoolKeyReading>, registry: Address) -> Self {
        Self {
            reader,
            registry,
            generations: Generations::default(),
            pool_key: None,
            error: None,
        }
    }

    /// Starts resolving the pool key of `token`, invalidating any read still
    /// in flight.
    ///
    /// Returns the read to run, or `None` if no read is needed because the
    /// token's protocol is unsupported.
    pub fn resolve(&mut self, token: &TokenOption) -> Option<BoxFuture<'static, Resolution>> {
        self.pool_key = None;
        let pool_id = match token.pool {
            Pool::V4(pool_id) => pool_id,
            Pool::V3(_) => {
                self.generations.invalidate();
                self.error = Some(UNSUPPORTED_PROTOCOL.to_string());
                tracing::debug!(token = %token.address, protocol = ?Protocol::V3, "skipping pool key lookup");
                return None;
            }
        };

        self.error = None;
        let generation = self.generations.next();
        let reader = self.reader.clone();
        let registry = self.registry;
        let token = token.address;
        tracing::debug!(%token, %pool_id, ?generation, "resolving pool key");

        Some(
            async move {
                let result = reader.pool_key(registry, truncate_pool_id(pool_id)).await;
                Resolution {
                    generation,
                    token,
                    result,
                }
            }
            .boxed(),
        )
    }

    /// Applies a finished read. Returns whether it was applied, which is only
    /// the case for the most recent request.
    pub fn apply(&mut self, resolution: Resolution) -> bool {
        if !self.generations.is_current(resolution.generation) {
            tracing::debug!(
                token = %resolution.token,
                generation = ?resolution.generation,
                "discarding stale pool key"
            );
            return false;
        }

        match resolution.result {
            Ok(pool_key) => {
                tracing::debug!(token = %resolution.token, ?pool_key, "resolved pool key");
                self.pool_key = Some(pool_key);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(token = %resolution.token, ?err, "failed to resolve pool key");
                self.pool_key = None;
                self.error = Some(format!("{err:#}"));
            }
        }
        true
    }

    /// Drops whatever read is in flight, e.g. on shutdown.
    pub fn cancel(&mut self) {
        self.generations.invalidate();
    }

    pub fn pool_key(&self) -> Option<&PoolKey> {
        self.pool_key.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the last read finished without a pool key. A new read is only
    /// issued on request.
    pub fn has_failed(&self) -> bool {
        self.pool_key.is_none() && self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{domain::registry::{CLANKER, TOKEN_OPTIONS}, infra::blockchain::MockPoolKeyReading},
        alloy::primitives::address,
        anyhow::anyhow,
    };

    const WETH: Address = address!("0x4200000000000000000000000000000000000006");

    fn key_for(token: Address) -> PoolKey {
        PoolKey::for_pair(token, WETH, CLANKER.hook_static_fee, 10_000, 60)
    }

    #[tokio::test]
    async fn resolves_v4_pool_keys() {
        let token = TOKEN_OPTIONS[0];
        let Pool::V4(pool_id) = token.pool else {
            unreachable!()
        };
        let mut reader = MockPoolKeyReading::new();
        reader
            .expect_pool_key()
            .withf(move |registry, id| {
                *registry == CLANKER.position_manager && *id == truncate_pool_id(pool_id)
            })
            .times(1)
            .returning(move |_, _| Ok(key_for(token.address)));

        let mut resolver = PoolKeyResolver::new(Arc::new(reader), CLANKER.position_manager);
        let read = resolver.resolve(&token).unwrap();
        assert!(resolver.apply(read.await));
        assert_eq!(resolver.pool_key(), Some(&key_for(token.address)));
        assert_eq!(resolver.error(), None);
    }

    #[tokio::test]
    async fn skips_unsupported_protocols() {
        let mut reader = MockPoolKeyReading::new();
        reader.expect_pool_key().never();

        let mut resolver = PoolKeyResolver::new(Arc::new(reader), CLANKER.position_manager);
        assert!(resolver.resolve(&TOKEN_OPTIONS[3]).is_none());
        assert_eq!(resolver.pool_key(), None);
        assert_eq!(resolver.error(), Some(UNSUPPORTED_PROTOCOL));
    }

    #[tokio::test]
    async fn failures_clear_the_pool_key() {
        let mut reader = MockPoolKeyReading::new();
        let mut calls = 0;
        reader.expect_pool_key().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok(key_for(TOKEN_OPTIONS[0].address))
            } else {
                Err(anyhow!("execution reverted"))
            }
        });

        let mut resolver = PoolKeyResolver::new(Arc::new(reader), CLANKER.position_manager);
        let read = resolver.resolve(&TOKEN_OPTIONS[0]).unwrap();
        resolver.apply(read.await);
        assert!(resolver.pool_key().is_some());
        assert!(!resolver.has_failed());

        let read = resolver.resolve(&TOKEN_OPTIONS[1]).unwrap();
        assert!(!resolver.has_failed());
        assert!(resolver.apply(read.await));
        assert_eq!(resolver.pool_key(), None);
        assert_eq!(resolver.error(), Some("execution reverted"));
        assert!(resolver.has_failed());
    }

    #[tokio::test]
    async fn latest_selection_wins() {
        let mut reader = MockPoolKeyReading::new();
        reader
            .expect_pool_key()
            .returning(|_, id| {
                let token = TOKEN_OPTIONS
                    .iter()
                    .find(|option| matches!(option.pool, Pool::V4(pool_id) if truncate_pool_id(pool_id) == id))
                    .unwrap()
                    .address;
                Ok(key_for(token))
            });

        let mut resolver = PoolKeyResolver::new(Arc::new(reader), CLANKER.position_manager);
        let slow = resolver.resolve(&TOKEN_OPTIONS[0]).unwrap();
        let fast = resolver.resolve(&TOKEN_OPTIONS[1]).unwrap();

        // The second request answers first, then the first one trickles in.
        assert!(resolver.apply(fast.await));
        assert!(!resolver.apply(slow.await));
        assert_eq!(resolver.pool_key(), Some(&key_for(TOKEN_OPTIONS[1].address)));
    }

    #[tokio::test]
    async fn unsupported_selection_discards_reads_in_flight() {
        let mut reader = MockPoolKeyReading::new();
        reader
            .expect_pool_key()
            .returning(|_, _| Ok(key_for(TOKEN_OPTIONS[0].address)));

        let mut resolver = PoolKeyResolver::new(Arc::new(reader), CLANKER.position_manager);
        let read = resolver.resolve(&TOKEN_OPTIONS[0]).unwrap();
        assert!(resolver.resolve(&TOKEN_OPTIONS[3]).is_none());

        assert!(!resolver.apply(read.await));
        assert_eq!(resolver.pool_key(), None);
        assert_eq!(resolver.error(), Some(UNSUPPORTED_PROTOCOL));
    }
}
