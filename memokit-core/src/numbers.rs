//! Delayed number generator.
//!
//! A finite, lazy stream of random floats in `[0, upper_bound)`. Each item is
//! preceded by a fixed pause, so draining the default stream takes ten
//! seconds. Every call returns a fresh, independent stream.

use futures::stream::{self, Stream, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::sleep;
use tracing::{trace, warn};

use crate::config::GeneratorConfig;

/// A fresh delayed number stream seeded from OS entropy.
pub fn delayed_numbers(config: &GeneratorConfig) -> impl Stream<Item = f64> + Send + use<> {
    delayed_numbers_with_rng(config, StdRng::from_entropy())
}

/// A fresh delayed number stream drawing from `rng`.
///
/// Yields exactly `config.count` values. If `config.upper_bound` is not a
/// positive finite number the stream is empty.
pub fn delayed_numbers_with_rng<R>(
    config: &GeneratorConfig,
    rng: R,
) -> impl Stream<Item = f64> + Send + use<R>
where
    R: Rng + Send,
{
    let delay = config.delay();
    let upper_bound = config.upper_bound;
    let count = if upper_bound.is_finite() && upper_bound > 0.0 {
        config.count
    } else {
        warn!(upper_bound, "generator upper bound is not positive, stream is empty");
        0
    };

    stream::unfold((0_usize, rng), move |(produced, mut rng)| async move {
        if produced >= count {
            return None;
        }
        sleep(delay).await;
        let value = rng.gen_range(0.0..upper_bound);
        trace!(index = produced, value, "generated delayed number");
        Some((value, (produced + 1, rng)))
    })
}

/// Drain one fresh delayed number stream into a `Vec`.
pub async fn collect_numbers(config: &GeneratorConfig) -> Vec<f64> {
    delayed_numbers(config).collect().await
}
