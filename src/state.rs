use crate::config::Config;
use crate::types::activity::ActivityMetadata;
use crate::types::trim::TrimOutcome;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    cache: Arc<DashMap<String, CachedTrim>>,
}

/// A finished trim kept around so its TCX export can be fetched later.
#[derive(Clone)]
pub struct CachedTrim {
    pub outcome: TrimOutcome,
    pub activity: ActivityMetadata,
    inserted_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn insert(&self, trim_id: String, outcome: TrimOutcome, activity: ActivityMetadata) {
        self.cache.insert(
            trim_id,
            CachedTrim {
                outcome,
                activity,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, trim_id: &str) -> Option<CachedTrim> {
        let entry = self.cache.get(trim_id)?;
        if entry.inserted_at.elapsed() >= self.config.cache_ttl {
            return None;
        }
        Some(entry.value().clone())
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.cache.retain(|_, cached| {
            now.duration_since(cached.inserted_at) < ttl
        });
        tracing::info!("Cache eviction complete. Current size: {}", self.cache.len());
    }
}
