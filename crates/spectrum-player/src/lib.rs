//! Audio-reactive album player.
//!
//! A row of bars, one per analyser bin, each showing a vertical slice of the
//! album's looping video clipped to the bin's loudness. Picking another
//! album fades the current one out and swaps the whole session.
//!
//! Everything outside the `web` module is plain Rust and runs on any target; the
//! browser glue is only built for `wasm32`.

pub mod album;
pub mod analysis;
pub mod bars;
pub mod camera;
pub mod config;
pub mod error;
pub mod player;
pub mod scene;
pub mod state;
pub mod timers;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::PlayerConfig;
pub use error::PlayerError;
pub use player::{MediaInfo, Player, PlayerHost, Selection};
pub use state::PlaybackState;

// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = web::run().await {
            log::error!("startup failed: {e}");
        }
    });

    Ok(())
}
