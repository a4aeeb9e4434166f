use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spy_census::{InstanceRegistry, Tracked};
use spy_config::DemoConfig;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Object type kept alive by the generator.
#[derive(Debug)]
pub struct DemoObject;

/// Spawn a task that periodically replaces its set of tracked objects with a
/// new one of random size, so the registry census has a moving series.
pub fn spawn(registry: InstanceRegistry, config: DemoConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        let mut ticker = tokio::time::interval(Duration::from_millis(config.interval_ms));
        let mut container: Vec<Tracked<DemoObject>> = Vec::new();

        loop {
            ticker.tick().await;
            let count = next_count(&mut rng, config.max_objects);
            info!("Generating {count} demo objects");
            container.clear();
            container.extend((0..count).map(|_| registry.track(DemoObject)));
        }
    })
}

/// Uniform count in `0..=max`.
fn next_count<R: Rng>(rng: &mut R, max: usize) -> usize {
    rng.gen_range(0..=max)
}
