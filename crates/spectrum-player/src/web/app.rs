use eframe::egui::{self, Sense, TextureHandle, TextureOptions};

use super::dom::ClickQueue;
use super::media::{FrameGrabber, MediaEvent, MediaEvents};
use super::WebHost;
use crate::player::Player;
use crate::scene::Scene;

pub struct SpectrumPlayerApp {
    player: Player,
    host: WebHost,
    scene: Scene,

    // Filled by DOM callbacks, drained once per frame
    clicks: ClickQueue,
    media_events: MediaEvents,

    grabber: FrameGrabber,
    // (session generation, texture) so each session gets a fresh texture
    texture: Option<(u64, TextureHandle)>,
}

impl SpectrumPlayerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        player: Player,
        host: WebHost,
        clicks: ClickQueue,
        grabber: FrameGrabber,
    ) -> Self {
        let scene = Scene::new(player.config());
        let media_events = host.media.events();
        Self {
            player,
            host,
            scene,
            clicks,
            media_events,
            grabber,
            texture: None,
        }
    }

    fn drain_clicks(&mut self, now_ms: f64) {
        let pending: Vec<usize> = self.clicks.borrow_mut().drain(..).collect();
        for index in pending {
            match self.player.select_album(index, now_ms, &mut self.host) {
                Ok(selection) => log::debug!("album {index}: {selection:?}"),
                Err(e) => log::warn!("album {index}: {e}"),
            }
        }
    }

    fn drain_media_events(&mut self, now_ms: f64) {
        let pending: Vec<MediaEvent> = self.media_events.borrow_mut().drain(..).collect();
        for event in pending {
            match event {
                MediaEvent::Ready { generation, info } => {
                    self.player.media_ready(generation, info, now_ms, &mut self.host);
                }
                MediaEvent::Failed { generation, reason } => {
                    self.player.media_failed(generation, &reason, &mut self.host);
                }
            }
        }
    }

    /// Upload the current video frame; drop the texture when no session is
    /// ready.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(generation) = self
            .player
            .session()
            .filter(|s| s.is_ready())
            .map(|s| s.generation)
        else {
            self.texture = None;
            return;
        };
        let Some(image) = self
            .host
            .media
            .playing_video()
            .and_then(|video| self.grabber.grab(video))
        else {
            return;
        };
        match &mut self.texture {
            Some((g, handle)) if *g == generation => handle.set(image, TextureOptions::LINEAR),
            _ => {
                let handle = ctx.load_texture("video-frame", image, TextureOptions::LINEAR);
                self.texture = Some((generation, handle));
            }
        }
    }
}

impl eframe::App for SpectrumPlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = ctx.input(|i| i.time) * 1000.0;

        self.drain_clicks(now_ms);
        self.drain_media_events(now_ms);
        self.player.frame(now_ms, &mut self.host);
        self.refresh_texture(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let viewport = ui.max_rect();
                let response = ui.allocate_rect(viewport, Sense::click_and_drag());
                self.scene.handle_input(ui, &response);
                self.scene.update(viewport);
                self.scene.paint(
                    ui.painter(),
                    viewport,
                    self.player.bars(),
                    self.texture.as_ref().map(|(_, t)| t.id()),
                );
            });

        // the loop runs every frame regardless of playback state
        ctx.request_repaint();
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // transparent, so the page backdrop tint shows through
        [0.0; 4]
    }
}
