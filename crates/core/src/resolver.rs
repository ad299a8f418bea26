//! Threshold resolution over the scope override chain.
//!
//! A reading's threshold is the first hit walking device, project and global
//! default scopes in the store, then the built-in [`FallbackTable`], then the
//! generic `[0, 100]` range. Store lookups run one at a time and stop at the
//! first hit.

use async_trait::async_trait;

use crate::sensor::SensorType;
use crate::threshold::{FallbackTable, ResolvedThreshold, ThresholdBounds, ThresholdSource};
use crate::types::DbId;

/// A threshold row as the store returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredThreshold {
    pub id: DbId,
    pub bounds: ThresholdBounds,
}

/// Point lookups the resolver needs from threshold storage.
///
/// Each lookup is scoped to one exact sensor type. Errors are returned to
/// the caller of [`ThresholdResolver::resolve`] unchanged.
#[async_trait]
pub trait ThresholdStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Threshold bound to this device.
    async fn find_for_device(
        &self,
        sensor_type: SensorType,
        device_id: DbId,
    ) -> Result<Option<StoredThreshold>, Self::Error>;

    /// Threshold bound to this project with no device.
    async fn find_for_project(
        &self,
        sensor_type: SensorType,
        project_id: DbId,
    ) -> Result<Option<StoredThreshold>, Self::Error>;

    /// Global default: no device, no project, default flag set.
    async fn find_global_default(
        &self,
        sensor_type: SensorType,
    ) -> Result<Option<StoredThreshold>, Self::Error>;
}

/// One step of the stored-threshold override chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupScope {
    Device,
    Project,
    GlobalDefault,
}

impl LookupScope {
    /// Store scopes in precedence order. New scopes slot in here.
    pub const OVERRIDE_CHAIN: [LookupScope; 3] = [
        LookupScope::Device,
        LookupScope::Project,
        LookupScope::GlobalDefault,
    ];

    pub fn source(self) -> ThresholdSource {
        match self {
            LookupScope::Device => ThresholdSource::Device,
            LookupScope::Project => ThresholdSource::Project,
            LookupScope::GlobalDefault => ThresholdSource::GlobalDefault,
        }
    }

    /// Run this step against the store. Steps whose id is absent are
    /// skipped without a query.
    async fn lookup<S: ThresholdStore + ?Sized>(
        self,
        store: &S,
        sensor_type: SensorType,
        device_id: Option<DbId>,
        project_id: Option<DbId>,
    ) -> Result<Option<StoredThreshold>, S::Error> {
        match self {
            LookupScope::Device => match device_id {
                Some(id) => store.find_for_device(sensor_type, id).await,
                None => Ok(None),
            },
            LookupScope::Project => match project_id {
                Some(id) => store.find_for_project(sensor_type, id).await,
                None => Ok(None),
            },
            LookupScope::GlobalDefault => store.find_global_default(sensor_type).await,
        }
    }
}

/// Picks the single threshold that applies to a reading.
///
/// Holds no mutable state; the fallback table is fixed at construction.
#[derive(Debug)]
pub struct ThresholdResolver<S> {
    store: S,
    fallbacks: FallbackTable,
}

impl<S: ThresholdStore> ThresholdResolver<S> {
    pub fn new(store: S, fallbacks: FallbackTable) -> Self {
        Self { store, fallbacks }
    }

    /// Resolver backed by the factory default table.
    pub fn with_builtin_defaults(store: S) -> Self {
        Self::new(store, FallbackTable::builtin())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fallbacks(&self) -> &FallbackTable {
        &self.fallbacks
    }

    /// Resolve the threshold for `sensor_type` in the context of an optional
    /// device and project.
    ///
    /// A name outside the known sensor types skips the store entirely and
    /// yields the generic range. The only failure is a store error.
    pub async fn resolve(
        &self,
        sensor_type: &str,
        device_id: Option<DbId>,
        project_id: Option<DbId>,
    ) -> Result<ResolvedThreshold, S::Error> {
        let Ok(kind) = sensor_type.parse::<SensorType>() else {
            return Ok(ResolvedThreshold {
                id: None,
                source: ThresholdSource::Generic,
                bounds: ThresholdBounds::generic(sensor_type),
            });
        };

        for scope in LookupScope::OVERRIDE_CHAIN {
            if let Some(found) = scope
                .lookup(&self.store, kind, device_id, project_id)
                .await?
            {
                return Ok(ResolvedThreshold {
                    id: Some(found.id),
                    source: scope.source(),
                    bounds: found.bounds,
                });
            }
        }

        Ok(match self.fallbacks.get(kind) {
            Some(bounds) => ResolvedThreshold {
                id: None,
                source: ThresholdSource::BuiltIn,
                bounds: bounds.clone(),
            },
            None => ResolvedThreshold {
                id: None,
                source: ThresholdSource::Generic,
                bounds: ThresholdBounds::generic(sensor_type),
            },
        })
    }
}
