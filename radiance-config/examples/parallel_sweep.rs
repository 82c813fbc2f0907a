//! Derive a ray batch-size sweep from one shared base config on several threads.
//!
//! Run with: cargo run -p radiance-config --example parallel_sweep

use radiance_config::{ConfigError, MethodRegistry, Override};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn main() -> Result<(), ConfigError> {
    let registry = Arc::new(MethodRegistry::with_builtin_methods());
    let batch_sizes = [1024u32, 2048, 4096, 8192];

    let workers: Vec<_> = batch_sizes
        .into_iter()
        .map(|rays| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || -> Result<_, ConfigError> {
                let overrides = [
                    Override::new(
                        "pipeline.datamanager.train_num_rays_per_batch".parse()?,
                        json!(rays),
                    ),
                    Override::new("experiment_name".parse()?, json!(format!("lego_rays_{rays}"))),
                ];
                registry.resolve("vanilla_nerf", &overrides)
            })
        })
        .collect();

    for worker in workers {
        let config = match worker.join() {
            Ok(result) => result?,
            Err(_) => {
                eprintln!("sweep worker panicked");
                continue;
            }
        };
        println!(
            "{:<20} rays/batch={:<5} checkpoints={}",
            config.experiment_name(),
            config.pipeline.datamanager.train_num_rays_per_batch(),
            config.checkpoint_dir("sweep").display()
        );
    }

    let base = registry.get("vanilla_nerf")?;
    println!(
        "base untouched: rays/batch={}",
        base.pipeline.datamanager.train_num_rays_per_batch()
    );
    Ok(())
}
