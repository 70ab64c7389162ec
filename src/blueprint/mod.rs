pub mod filters;

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::db::{BlueprintStore, StoreError};
use crate::models::Blueprint;

use self::filters::PointsFilter;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid blueprint: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Orchestrates one store and one filter, both chosen at construction.
///
/// The filter runs on the read path only; whatever it drops stays in the
/// store untouched.
pub struct BlueprintService {
    store: Arc<dyn BlueprintStore>,
    filter: Arc<dyn PointsFilter>,
}

impl BlueprintService {
    pub fn new(store: Arc<dyn BlueprintStore>, filter: Arc<dyn PointsFilter>) -> Self {
        BlueprintService { store, filter }
    }

    pub async fn add_new_blueprint(&self, blueprint: Blueprint) -> Result<Blueprint> {
        if blueprint.author.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "author must be non-empty".into(),
            ));
        }
        if blueprint.name.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "name must be non-empty".into(),
            ));
        }
        self.store.save(&blueprint).await?;
        Ok(blueprint)
    }

    pub async fn get_blueprint(&self, author: &str, name: &str) -> Result<Blueprint> {
        let blueprint = self.store.get(author, name).await?;
        Ok(self.filtered(blueprint))
    }

    pub async fn get_blueprints_by_author(&self, author: &str) -> Result<HashSet<Blueprint>> {
        let blueprints = self.store.get_by_author(author).await?;
        Ok(blueprints.into_iter().map(|bp| self.filtered(bp)).collect())
    }

    pub async fn get_all_blueprints(&self) -> Result<HashSet<Blueprint>> {
        let blueprints = self.store.get_all().await?;
        Ok(blueprints.into_iter().map(|bp| self.filtered(bp)).collect())
    }

    pub async fn add_point(&self, author: &str, name: &str, x: i64, y: i64) -> Result<()> {
        self.store.add_point(author, name, x, y).await?;
        Ok(())
    }

    fn filtered(&self, mut blueprint: Blueprint) -> Blueprint {
        blueprint.points = self.filter.apply(blueprint.points);
        blueprint
    }
}
