/// Read-through caching for catalog calls.
///
/// Checks the cache first; on a miss, runs the block, queues the result for
/// a background write, and returns it. A failed cache READ is treated as a
/// miss (logged) rather than an error: an unreachable Redis must not take
/// the catalog down with it.
///
/// # Arguments
/// * `$cache`: a [`crate::db::Cache`]
/// * `$key`: the [`crate::db::CacheKey`] for this value, evaluated once
/// * `$ttl`: time-to-live in seconds for the cached value
/// * `$block`: async block computing the value on a miss
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            Ok(None) => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
            Err(e) => {
                ::tracing::warn!(error = %e, "Cache read failed, fetching from source");
                $block.await
            }
        }
    }};
}
