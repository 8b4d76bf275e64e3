//! Concurrent fan-out of independent lookups.
//!
//! [`parallel`] drives every named lookup at once and resumes exactly once:
//! with all results keyed by name, or with the first failure observed. On
//! failure the remaining lookups are dropped and nothing partial is returned.
//! Lookups of different result types use `tokio::try_join!`, which gives the
//! same fail-fast guarantee with a typed tuple instead of a map.

use futures::future::try_join_all;
use indexmap::IndexMap;
use std::{future::Future, hash::Hash};

use crate::error::AppResult;

/// Run `tasks` concurrently; results keep the declaration order of their names
pub async fn parallel<K, T, F>(tasks: Vec<(K, F)>) -> AppResult<IndexMap<K, T>>
where
    K: Hash + Eq,
    F: Future<Output = AppResult<T>>,
{
    let (names, lookups): (Vec<K>, Vec<F>) = tasks.into_iter().unzip();
    let results = try_join_all(lookups).await?;
    Ok(names.into_iter().zip(results).collect())
}
