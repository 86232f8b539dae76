use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AudioContext, Document, Element, HtmlCanvasElement, HtmlElement};

use super::describe;
use crate::album::AlbumPicker;
use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::state::PlaybackState;

pub const CANVAS_ID: &str = "spectrum_player_canvas";
const CONFIG_ID: &str = "player-config";

/// Picker clicks waiting for the next frame.
pub type ClickQueue = Rc<RefCell<VecDeque<usize>>>;

/// The page elements the player reads from and mirrors its state onto.
pub struct Page {
    pub document: Document,
    body: HtmlElement,
    album_selector: Element,
    pub video_container: Element,
    albums: Vec<HtmlElement>,
    // kept alive for as long as the thumbnails exist
    click_handlers: Vec<Closure<dyn FnMut()>>,
}

impl Page {
    pub fn locate() -> Result<Self, PlayerError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| PlayerError::Dom("no document".into()))?;
        let body = document
            .body()
            .ok_or_else(|| PlayerError::Dom("no <body>".into()))?;
        let album_selector = query(&document, ".album-selector")?;
        let video_container = query(&document, ".video-container")?;
        Ok(Self {
            document,
            body,
            album_selector,
            video_container,
            albums: Vec::new(),
            click_handlers: Vec::new(),
        })
    }

    pub fn canvas(&self) -> Result<HtmlCanvasElement, PlayerError> {
        self.document
            .get_element_by_id(CANVAS_ID)
            .ok_or_else(|| PlayerError::Dom(format!("no canvas with id '{CANVAS_ID}'")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| PlayerError::Dom(format!("'{CANVAS_ID}' is not a canvas")))
    }

    /// Config from `<script id="player-config" type="application/json">`,
    /// falling back to defaults when absent or invalid.
    pub fn read_config(&self) -> PlayerConfig {
        let Some(text) = self
            .document
            .get_element_by_id(CONFIG_ID)
            .and_then(|el| el.text_content())
        else {
            return PlayerConfig::default();
        };
        match PlayerConfig::from_json(&text) {
            Ok(config) => {
                log::info!("loaded config from #{CONFIG_ID}");
                config
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                PlayerConfig::default()
            }
        }
    }

    /// Insert one thumbnail per album at the top of the selector. A click
    /// resumes the audio context (it needs the user gesture) and queues the
    /// album index.
    pub fn build_picker(
        &mut self,
        picker: &AlbumPicker,
        clicks: &ClickQueue,
        audio: &AudioContext,
    ) -> Result<(), PlayerError> {
        let mut entries = Vec::with_capacity(picker.len());
        for album in picker.albums() {
            let entry: HtmlElement = self
                .document
                .create_element("div")
                .map_err(|e| PlayerError::Dom(describe(&e)))?
                .unchecked_into();
            entry.set_class_name(&format!("album id-{}", album.index));

            let img = self
                .document
                .create_element("img")
                .map_err(|e| PlayerError::Dom(describe(&e)))?;
            img.set_attribute("src", &album.thumbnail)
                .map_err(|e| PlayerError::Dom(describe(&e)))?;
            entry
                .append_child(&img)
                .map_err(|e| PlayerError::Dom(describe(&e)))?;

            let queue = clicks.clone();
            let ctx = audio.clone();
            let index = album.index;
            let handler = Closure::wrap(Box::new(move || {
                let _ = ctx.resume();
                queue.borrow_mut().push_back(index);
            }) as Box<dyn FnMut()>);
            entry.set_onclick(Some(handler.as_ref().unchecked_ref()));

            self.click_handlers.push(handler);
            entries.push(entry);
        }

        // afterbegin reverses, so insert back to front
        for entry in entries.iter().rev() {
            self.album_selector
                .insert_adjacent_element("afterbegin", entry)
                .map_err(|e| PlayerError::Dom(describe(&e)))?;
        }
        self.albums = entries;
        Ok(())
    }

    /// Keep exactly one state class on `<body>`.
    pub fn show_state(&self, next: PlaybackState) {
        let classes = self.body.class_list();
        for state in PlaybackState::ALL {
            if state != next {
                classes.remove_1(state.css_class()).ok();
            }
        }
        classes.add_1(next.css_class()).ok();
    }

    pub fn show_active_album(&self, previous: Option<usize>, next: usize) {
        if let Some(el) = previous.and_then(|i| self.albums.get(i)) {
            el.class_list().remove_1("active").ok();
        }
        if let Some(el) = self.albums.get(next) {
            el.class_list().add_1("active").ok();
        }
    }

    pub fn set_backdrop_alpha(&self, alpha: f32) {
        self.body
            .style()
            .set_property("background", &format!("rgba(0,0,0,{alpha})"))
            .ok();
    }
}

fn query(document: &Document, selector: &str) -> Result<Element, PlayerError> {
    document
        .query_selector(selector)
        .map_err(|e| PlayerError::Dom(describe(&e)))?
        .ok_or_else(|| PlayerError::Dom(format!("missing {selector}")))
}
