//! Host-side walkthrough: a character body with a hat child, a UI portrait
//! that mirrors the body clip for clip, a dust gate that is only visible
//! while walking, and a footstep sound pool fed by triggers.
//!
//! Run with `RUST_LOG=debug cargo run -p flipbook-core --example character`.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use flipbook_core::{
    parse_clip_library_json, AnimatorGraph, ClipGate, ClipLibrary, Config, Flippable,
    FrameSurface, NodeConfig, SortOrdered, SortingOrder, SurfaceSet, Visible,
};

const CHARACTER: &str = include_str!("../../../../fixtures/clips/character.json");
const HAT: &str = include_str!("../../../../fixtures/clips/hat.json");
const STEP: f32 = 1.0 / 60.0;

/// Prints instead of drawing.
struct ConsoleSprite {
    label: &'static str,
    frame: Option<usize>,
    flipped: bool,
    order: SortingOrder,
    visible: bool,
}

impl ConsoleSprite {
    fn new(label: &'static str, order_offset: i32) -> Self {
        Self {
            label,
            frame: None,
            flipped: false,
            order: SortingOrder::new(order_offset),
            visible: true,
        }
    }
}

impl FrameSurface for ConsoleSprite {
    fn show_frame(&mut self, index: usize) {
        self.frame = Some(index);
    }
}

impl Flippable for ConsoleSprite {
    fn is_flipped(&self) -> bool {
        self.flipped
    }

    fn set_flipped(&mut self, flipped: bool) {
        self.flipped = flipped;
    }
}

impl SortOrdered for ConsoleSprite {
    fn sorting_order(&self) -> i32 {
        self.order.get()
    }

    fn set_sorting_order(&mut self, order: i32) {
        self.order.set(order);
    }
}

impl Visible for ConsoleSprite {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Uniform random pick from a fixed set of sounds.
struct SoundPool {
    sounds: &'static [&'static str],
    rng: StdRng,
}

impl SoundPool {
    fn pick(&mut self) -> &'static str {
        self.sounds[self.rng.gen_range(0..self.sounds.len())]
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let body_clips = parse_clip_library_json(CHARACTER)?;
    // The portrait renders the very same clip instances as the body.
    let portrait_clips = ClipLibrary::from_refs(body_clips.iter().cloned())?;
    let hat_clips = parse_clip_library_json(HAT)?;

    let mut graph = AnimatorGraph::new(Config {
        rng_seed: Some(2024),
        ..Config::default()
    });
    let body = graph.add_frame_node("body", body_clips, NodeConfig::default());
    let hat = graph.add_frame_node("hat", hat_clips, NodeConfig::default());
    let dust = graph.add_gate("dust", ClipGate::new(["Walk"]), NodeConfig::default());
    let portrait = graph.add_frame_node(
        "portrait",
        portrait_clips,
        NodeConfig {
            autoplay: false,
            ..NodeConfig::default()
        },
    );
    graph.set_children(body, vec![hat, dust])?;
    graph.set_shared(body, vec![portrait])?;

    let mut sprites = SurfaceSet::new();
    sprites.insert(body, ConsoleSprite::new("body", 0));
    sprites.insert(hat, ConsoleSprite::new("hat", 1));
    sprites.insert(dust, ConsoleSprite::new("dust", -1));
    sprites.insert(portrait, ConsoleSprite::new("portrait", 0));
    sprites.set_sorting_order(&graph, body, 10);

    let mut footsteps = SoundPool {
        sounds: &["step_grass_1", "step_grass_2", "step_grass_3"],
        rng: StdRng::seed_from_u64(7),
    };

    graph.start()?;

    let mut steps_played = 0;
    for step in 0..180 {
        match step {
            30 => {
                info!("-> Walk");
                graph.play(body, "Walk")?;
            }
            90 => {
                info!("-> turn around and Attack");
                sprites.flip(&graph, body, true);
                graph.play(body, "Attack")?;
            }
            _ => {}
        }
        graph.tick_all(STEP);

        let out = graph.drain_outputs();
        sprites.apply_frame_events(&out);
        sprites.sync_gate_visibility(&out);
        for (node, name) in out.triggers() {
            match name {
                "footstep" => {
                    steps_played += 1;
                    info!("{node}: footstep -> {}", footsteps.pick());
                }
                other => info!("{node}: trigger '{other}'"),
            }
        }
        if out.dropped > 0 {
            log::warn!("{} events dropped this update", out.dropped);
        }
    }

    for id in [body, hat, dust, portrait] {
        if let Some(sprite) = sprites.get(id) {
            info!(
                "{:<8} frame={:?} flipped={} order={} visible={} playing={}",
                sprite.label,
                sprite.frame,
                sprite.is_flipped(),
                sprite.sorting_order(),
                sprite.is_visible(),
                graph.is_playing(id)
            );
        }
    }
    info!("{steps_played} footsteps played");
    Ok(())
}
