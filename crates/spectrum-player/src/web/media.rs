use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use egui::ColorImage;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    AnalyserNode, AudioContext, CanvasRenderingContext2d, Document, Element, GainNode,
    HtmlCanvasElement, HtmlVideoElement, MediaElementAudioSourceNode,
};

use super::describe;
use crate::album::Album;
use crate::analysis::SpectrumFrame;
use crate::error::PlayerError;
use crate::player::MediaInfo;

// HTMLMediaElement.HAVE_CURRENT_DATA
const HAVE_CURRENT_DATA: u16 = 2;

/// Reports from media callbacks, drained by the app each frame.
#[derive(Debug)]
pub enum MediaEvent {
    Ready { generation: u64, info: MediaInfo },
    Failed { generation: u64, reason: String },
}

pub type MediaEvents = Rc<RefCell<VecDeque<MediaEvent>>>;

struct AudioRoute {
    source: MediaElementAudioSourceNode,
    gain: GainNode,
    analyser: AnalyserNode,
}

impl AudioRoute {
    fn disconnect(&self) {
        self.source.disconnect().ok();
        self.gain.disconnect().ok();
        self.analyser.disconnect().ok();
    }
}

struct LoadedVideo {
    video: HtmlVideoElement,
    generation: u64,
    route: Option<AudioRoute>,
    _on_can_play: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

/// Owns the current `<video>` and its audio route. The audio context is
/// shared by every session.
pub struct WebMedia {
    document: Document,
    container: Element,
    audio: AudioContext,
    fft_size: u32,
    current: Option<LoadedVideo>,
    events: MediaEvents,
}

impl WebMedia {
    pub fn new(document: Document, container: Element, audio: AudioContext, fft_size: u32) -> Self {
        Self {
            document,
            container,
            audio,
            fft_size,
            current: None,
            events: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn events(&self) -> MediaEvents {
        self.events.clone()
    }

    /// The video whose audio is routed, once playback started.
    pub fn playing_video(&self) -> Option<&HtmlVideoElement> {
        self.current
            .as_ref()
            .filter(|c| c.route.is_some())
            .map(|c| &c.video)
    }

    pub fn teardown(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };
        let video = &current.video;
        video.set_oncanplay(None);
        video.set_onerror(None);
        video.pause().ok();
        video.remove();
        if let Some(route) = &current.route {
            route.disconnect();
        }
        log::debug!("tore down generation {}", current.generation);
    }

    pub fn load(&mut self, album: &Album, generation: u64) -> Result<(), PlayerError> {
        let video: HtmlVideoElement = self
            .document
            .create_element("video")
            .map_err(|e| PlayerError::Dom(describe(&e)))?
            .unchecked_into();
        video
            .style()
            .set_property("object-fit", "cover")
            .map_err(|e| PlayerError::Dom(describe(&e)))?;
        video.set_cross_origin(Some("anonymous"));
        video.set_loop(true);

        let events = self.events.clone();
        let ready_video = video.clone();
        let on_can_play = Closure::wrap(Box::new(move || {
            events.borrow_mut().push_back(MediaEvent::Ready {
                generation,
                info: MediaInfo {
                    width: ready_video.video_width(),
                    height: ready_video.video_height(),
                    duration: ready_video.duration(),
                },
            });
        }) as Box<dyn FnMut()>);

        let events = self.events.clone();
        let failed_video = video.clone();
        let on_error = Closure::wrap(Box::new(move || {
            let reason = failed_video.error().map_or_else(
                || "unknown media error".to_owned(),
                |e| format!("media error code {}: {}", e.code(), e.message()),
            );
            events
                .borrow_mut()
                .push_back(MediaEvent::Failed { generation, reason });
        }) as Box<dyn FnMut()>);

        video.set_oncanplay(Some(on_can_play.as_ref().unchecked_ref()));
        video.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        video.set_src(&album.video);

        self.current = Some(LoadedVideo {
            video,
            generation,
            route: None,
            _on_can_play: on_can_play,
            _on_error: on_error,
        });
        Ok(())
    }

    /// Attach the loaded video, start it and route its audio through
    /// `gain -> analyser` and `gain -> speakers`.
    pub fn start(&mut self, volume: f32) -> Result<(), PlayerError> {
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| PlayerError::Audio("no media loaded".into()))?;
        if current.route.is_some() {
            return Ok(());
        }
        self.container
            .append_child(&current.video)
            .map_err(|e| PlayerError::Dom(describe(&e)))?;

        let audio_err = |e: JsValue| PlayerError::Audio(describe(&e));
        let source = self
            .audio
            .create_media_element_source(&current.video)
            .map_err(audio_err)?;
        let gain = self.audio.create_gain().map_err(audio_err)?;
        gain.gain().set_value(volume);
        let analyser = self.audio.create_analyser().map_err(audio_err)?;
        analyser.set_fft_size(self.fft_size);

        source.connect_with_audio_node(&gain).map_err(audio_err)?;
        gain.connect_with_audio_node(&analyser).map_err(audio_err)?;
        gain.connect_with_audio_node(&self.audio.destination())
            .map_err(audio_err)?;
        current.route = Some(AudioRoute {
            source,
            gain,
            analyser,
        });

        let promise = current.video.play().map_err(audio_err)?;
        let events = self.events.clone();
        let generation = current.generation;
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                events.borrow_mut().push_back(MediaEvent::Failed {
                    generation,
                    reason: format!("play() rejected: {}", describe(&e)),
                });
            }
        });
        Ok(())
    }

    pub fn read_spectrum(&self, frame: &mut SpectrumFrame) {
        if let Some(route) = self.current.as_ref().and_then(|c| c.route.as_ref()) {
            route.analyser.get_byte_frequency_data(&mut frame.frequency_data);
        }
    }

    pub fn volume(&self) -> f32 {
        self.current
            .as_ref()
            .and_then(|c| c.route.as_ref())
            .map_or(0.0, |r| r.gain.gain().value())
    }

    pub fn set_volume(&self, volume: f32) {
        if let Some(route) = self.current.as_ref().and_then(|c| c.route.as_ref()) {
            route.gain.gain().set_value(volume);
        }
    }
}

/// Copies the current video frame into an image through an offscreen 2D
/// canvas, scaled down to at most `max_width` pixels.
pub struct FrameGrabber {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    max_width: u32,
}

impl FrameGrabber {
    pub fn new(document: &Document, max_width: u32) -> Result<Self, PlayerError> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|e| PlayerError::Dom(describe(&e)))?
            .unchecked_into();
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| PlayerError::Dom(describe(&e)))?
            .ok_or_else(|| PlayerError::Dom("no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PlayerError::Dom("2d context has unexpected type".into()))?;
        Ok(Self {
            canvas,
            ctx,
            max_width: max_width.max(1),
        })
    }

    pub fn grab(&self, video: &HtmlVideoElement) -> Option<ColorImage> {
        let (vw, vh) = (video.video_width(), video.video_height());
        if vw == 0 || vh == 0 || video.ready_state() < HAVE_CURRENT_DATA {
            return None;
        }
        let w = vw.min(self.max_width);
        let h = ((f64::from(vh) * f64::from(w) / f64::from(vw)).round() as u32).max(1);
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
        let (fw, fh) = (f64::from(w), f64::from(h));
        self.ctx
            .draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, fw, fh)
            .ok()?;
        let pixels = self.ctx.get_image_data(0.0, 0.0, fw, fh).ok()?.data();
        Some(ColorImage::from_rgba_unmultiplied(
            [w as usize, h as usize],
            &pixels.0,
        ))
    }
}
