use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{BlueprintStore, Result, StoreError};
use crate::models::{Blueprint, Point};

/// Process-lifetime store backed by a keyed map. Used for tests and as the
/// default backend when no database is configured.
#[derive(Default)]
pub struct InMemoryStore {
    blueprints: RwLock<HashMap<(String, String), Blueprint>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlueprintStore for InMemoryStore {
    async fn save(&self, blueprint: &Blueprint) -> Result<()> {
        let mut blueprints = self.blueprints.write().unwrap();
        // Entry does the insert-if-absent in one step, so concurrent saves
        // for the same key cannot both succeed.
        match blueprints.entry((blueprint.author.clone(), blueprint.name.clone())) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists {
                author: blueprint.author.clone(),
                name: blueprint.name.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(blueprint.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, author: &str, name: &str) -> Result<Blueprint> {
        let blueprints = self.blueprints.read().unwrap();
        blueprints
            .get(&(author.to_owned(), name.to_owned()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                author: author.to_owned(),
                name: name.to_owned(),
            })
    }

    async fn get_by_author(&self, author: &str) -> Result<HashSet<Blueprint>> {
        let blueprints = self.blueprints.read().unwrap();
        let owned: HashSet<Blueprint> = blueprints
            .values()
            .filter(|bp| bp.author == author)
            .cloned()
            .collect();
        if owned.is_empty() {
            return Err(StoreError::AuthorNotFound {
                author: author.to_owned(),
            });
        }
        Ok(owned)
    }

    async fn get_all(&self) -> Result<HashSet<Blueprint>> {
        let blueprints = self.blueprints.read().unwrap();
        Ok(blueprints.values().cloned().collect())
    }

    async fn add_point(&self, author: &str, name: &str, x: i64, y: i64) -> Result<()> {
        let mut blueprints = self.blueprints.write().unwrap();
        let blueprint = blueprints
            .get_mut(&(author.to_owned(), name.to_owned()))
            .ok_or_else(|| StoreError::NotFound {
                author: author.to_owned(),
                name: name.to_owned(),
            })?;
        // Readers hold the read lock, so the push is never visible half-done.
        blueprint.points.push(Point::new(x, y));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn house() -> Blueprint {
        Blueprint::new(
            "john",
            "house",
            vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)],
        )
    }

    #[tokio::test]
    async fn save_then_get_preserves_point_order() {
        let store = InMemoryStore::new();
        store.save(&house()).await.unwrap();

        let got = store.get("john", "house").await.unwrap();
        assert_eq!(
            got.points,
            vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)]
        );
    }

    #[tokio::test]
    async fn duplicate_save_rejected_and_first_points_kept() {
        let store = InMemoryStore::new();
        store.save(&house()).await.unwrap();

        let second = Blueprint::new("john", "house", vec![Point::new(99, 99)]);
        let err = store.save(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let got = store.get("john", "house").await.unwrap();
        assert_eq!(got.points.len(), 3);
    }

    #[tokio::test]
    async fn get_missing_blueprint_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get("nobody", "nothing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_by_author_distinguishes_no_data_from_empty() {
        let store = InMemoryStore::new();
        store.save(&house()).await.unwrap();
        store
            .save(&Blueprint::new("john", "garage", vec![]))
            .await
            .unwrap();

        let owned = store.get_by_author("john").await.unwrap();
        assert_eq!(owned.len(), 2);

        let err = store.get_by_author("jane").await.unwrap_err();
        assert!(matches!(err, StoreError::AuthorNotFound { .. }));
    }

    #[tokio::test]
    async fn get_all_on_empty_store_is_empty_not_an_error() {
        let store = InMemoryStore::new();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_point_appends_at_the_end() {
        let store = InMemoryStore::new();
        store.save(&house()).await.unwrap();

        store.add_point("john", "house", 99, 99).await.unwrap();

        let got = store.get("john", "house").await.unwrap();
        assert_eq!(got.points.len(), 4);
        assert_eq!(got.points.last(), Some(&Point::new(99, 99)));
        assert_eq!(got.points[0], Point::new(0, 0));
    }

    #[tokio::test]
    async fn add_point_to_missing_blueprint_changes_nothing() {
        let store = InMemoryStore::new();
        let err = store.add_point("john", "house", 1, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_saves_for_same_key_have_one_winner() {
        let store = Arc::new(InMemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let bp = Blueprint::new("race", "track", vec![Point::new(i, i)]);
                store.save(&bp).await
            }));
        }

        let mut wins = 0;
        let mut losses = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(StoreError::AlreadyExists { .. }) => losses += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(losses, 7);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_does_not_change_blueprint_count() {
        let store = InMemoryStore::new();
        store.save(&house()).await.unwrap();
        store.add_point("john", "house", 5, 5).await.unwrap();
        store.add_point("john", "house", 6, 6).await.unwrap();
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }
}
