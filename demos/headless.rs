//! Headless Garden Example
//!
//! Builds the garden scene, queues one asynchronous attachment through the
//! tokio loader, and runs 120 fixed-step ticks against the recording
//! renderer. Pass a JSON config path as the first argument to override the
//! defaults.
//!
//! Run with `RUST_LOG=info cargo run --example headless`.

use std::time::Duration;

use glam::Vec3;
use grove::assets::{AssetSource, Prefab, PrefabNode, TokioLoader};
use grove::prelude::*;

fn lantern() -> Prefab {
    let mut prefab = Prefab::new("Lantern");
    let post = prefab.push(PrefabNode::new("Post"), None);
    let mut lamp = PrefabNode::new("Lamp");
    lamp.transform = Transform::from_position(Vec3::Y * 1.2);
    prefab.push(lamp, Some(post));
    prefab
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => GroveConfig::load(path)?,
        None => GroveConfig::default(),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let loader = TokioLoader::new(runtime.handle().clone(), |source: AssetSource| async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        match source.uri() {
            "lantern" => Ok(lantern()),
            other => Err(GroveError::asset_load(other, "no such asset")),
        }
    });

    let garden = build_scene(&config)?;
    let structure = garden.structure;
    let mut driver = garden.into_driver(&config)?;
    driver.context_mut().request_attach(
        &loader,
        "lantern",
        structure,
        Transform::from_position(Vec3::new(0.8, 0.0, 0.8)),
    );

    let mut renderer = RecordingRenderer::keep_last_only();
    driver.start(&mut renderer);
    driver.handle_input(InputEvent::Resize { width: 1920, height: 1080 }, &mut renderer);

    for _ in 0..120 {
        driver.handle_input(InputEvent::PointerDelta { dx: 2.0, dy: 0.0 }, &mut renderer);
        if let Some(report) = driver.tick(&mut renderer) {
            for outcome in &report.attachments {
                log::info!("Frame {}: {outcome:?}", report.frame);
            }
        }
        // Give the loader a real frame's worth of time
        std::thread::sleep(Duration::from_millis(1));
    }
    driver.stop();

    let stats = driver.stats();
    log::info!(
        "{} nodes, {} attached subtrees, {} pending, {} frames submitted",
        stats.node_count,
        stats.attached_subtrees,
        stats.pending_attachments,
        renderer.submitted()
    );
    if let Some(frame) = renderer.last_frame() {
        for (light, position) in &frame.point_lights {
            log::info!("Light {light:?} at {position}");
        }
    }
    Ok(())
}
