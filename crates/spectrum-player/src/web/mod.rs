//! Browser side: DOM, media elements, the Web Audio route and the eframe app.

mod app;
mod dom;
mod media;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::AudioContext;

use crate::album::Album;
use crate::analysis::SpectrumFrame;
use crate::error::PlayerError;
use crate::player::{Player, PlayerHost};
use crate::state::PlaybackState;

use app::SpectrumPlayerApp;
use dom::Page;
use media::{FrameGrabber, WebMedia};

/// Readable text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// The page and its media, as seen by the [`Player`].
pub struct WebHost {
    page: Page,
    media: WebMedia,
}

impl PlayerHost for WebHost {
    fn teardown_media(&mut self) {
        self.media.teardown();
    }

    fn load_media(&mut self, album: &Album, generation: u64) -> Result<(), PlayerError> {
        self.media.load(album, generation)
    }

    fn start_playback(&mut self, volume: f32) -> Result<(), PlayerError> {
        self.media.start(volume)
    }

    fn read_spectrum(&mut self, frame: &mut SpectrumFrame) {
        self.media.read_spectrum(frame);
    }

    fn volume(&self) -> f32 {
        self.media.volume()
    }

    fn set_volume(&mut self, volume: f32) {
        self.media.set_volume(volume);
    }

    fn show_state(&mut self, _previous: PlaybackState, next: PlaybackState) {
        self.page.show_state(next);
    }

    fn show_active_album(&mut self, previous: Option<usize>, next: usize) {
        self.page.show_active_album(previous, next);
    }

    fn set_backdrop_alpha(&mut self, alpha: f32) {
        self.page.set_backdrop_alpha(alpha);
    }
}

/// Wire the page up and hand the canvas to eframe.
pub async fn run() -> Result<(), PlayerError> {
    let mut page = Page::locate()?;
    let config = page.read_config();
    let canvas = page.canvas()?;

    let audio = AudioContext::new().map_err(|e| PlayerError::Audio(describe(&e)))?;
    let clicks = Rc::new(RefCell::new(VecDeque::new()));

    let player = Player::new(config.clone());
    page.build_picker(player.picker(), &clicks, &audio)?;

    let grabber = FrameGrabber::new(&page.document, config.texture_width)?;
    let media = WebMedia::new(
        page.document.clone(),
        page.video_container.clone(),
        audio,
        config.fft_size,
    );
    let mut host = WebHost { page, media };
    player.mirror_state(&mut host);
    log::info!(
        "{} albums from ./{}/, {} bins",
        config.album_count,
        config.band,
        config.bin_count()
    );

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(move |cc| {
                Ok(Box::new(SpectrumPlayerApp::new(
                    cc, player, host, clicks, grabber,
                )))
            }),
        )
        .await
        .map_err(|e| PlayerError::Dom(describe(&e)))
}
