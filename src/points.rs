use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::PointsError;
use crate::game::PlayerName;

/// Persists the points players earn when a game is won
#[async_trait]
pub trait UserPointsStore: Send + Sync {
    /// Adds `increment(name)` to the points of every named user.
    async fn update_points_increment(
        &self,
        usernames: &[PlayerName],
        increment: &(dyn for<'a> Fn(&'a str) -> i64 + Sync),
    ) -> Result<(), PointsError>;
}

/// Points kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct InMemoryPointsStore {
    points: RwLock<HashMap<PlayerName, i64>>,
}

impl InMemoryPointsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn points(&self, username: &str) -> i64 {
        self.points.read().await.get(username).copied().unwrap_or(0)
    }
}

#[async_trait]
impl UserPointsStore for InMemoryPointsStore {
    async fn update_points_increment(
        &self,
        usernames: &[PlayerName],
        increment: &(dyn for<'a> Fn(&'a str) -> i64 + Sync),
    ) -> Result<(), PointsError> {
        let mut points = self.points.write().await;
        for name in usernames {
            *points.entry(name.clone()).or_insert(0) += increment(name);
        }
        Ok(())
    }
}
