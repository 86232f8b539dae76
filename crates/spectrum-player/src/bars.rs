use egui::{pos2, Rect};

/// The region of the video frame a bar may show, in texture UV space with
/// `y` pointing up (0 = bottom row of the frame).
pub type ClipRect = Rect;

/// One frequency bin's quad.
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub slot: usize,
    /// Vertical scale in `[0, 1]`.
    pub height: f32,
    pub clip: ClipRect,
}

impl Bar {
    fn new(slot: usize, count: usize, height: f32) -> Self {
        let mut bar = Self {
            slot,
            height: 0.0,
            clip: Rect::NOTHING,
        };
        bar.set_height(height, count);
        bar
    }

    /// Scale the bar and re-derive its clip: the horizontal slice is fixed by
    /// the slot, the vertical extent is centered on 0.5 and equals `height`.
    pub fn set_height(&mut self, height: f32, count: usize) {
        let p = height.clamp(0.0, 1.0);
        let n = count as f32;
        let i = self.slot as f32;
        self.height = p;
        self.clip = Rect::from_min_max(pos2(i / n, 0.5 - p / 2.0), pos2((i + 1.0) / n, 0.5 + p / 2.0));
    }
}

/// All bars of one playback session.
///
/// Each bar is `visual_width / fft_size` wide, so the row covers half of the
/// visual width, and as tall as the video would be at `visual_width` across.
#[derive(Clone, Debug)]
pub struct SpectrumBars {
    bars: Vec<Bar>,
    bar_width: f32,
    full_height: f32,
}

impl SpectrumBars {
    pub fn new(count: usize, visual_width: f32, aspect: f32, initial_height: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 16.0 / 9.0 };
        Self {
            bars: (0..count).map(|slot| Bar::new(slot, count, initial_height)).collect(),
            bar_width: visual_width / (count * 2).max(1) as f32,
            full_height: visual_width / aspect,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bar_width(&self) -> f32 {
        self.bar_width
    }

    /// Height of a bar at scale 1.
    pub fn full_height(&self) -> f32 {
        self.full_height
    }

    /// Scene-space x of the bar's center; the row is centered on 0.
    pub fn center_x(&self, slot: usize) -> f32 {
        (slot as f32 - self.bars.len() as f32 / 2.0 + 0.5) * self.bar_width
    }

    pub fn set_height(&mut self, slot: usize, height: f32) {
        let count = self.bars.len();
        if let Some(bar) = self.bars.get_mut(slot) {
            bar.set_height(height, count);
        }
    }

    /// Drive every bar from analyser bytes; missing bins read as silence.
    pub fn apply_spectrum(&mut self, bytes: &[u8]) {
        let count = self.bars.len();
        for bar in &mut self.bars {
            let sample = bytes.get(bar.slot).copied().unwrap_or(0);
            bar.set_height((f32::from(sample) / 255.0).max(0.0), count);
        }
    }

    /// Shrink every bar by `step`, stopping at zero.
    pub fn decay(&mut self, step: f32) {
        let count = self.bars.len();
        for bar in &mut self.bars {
            bar.set_height((bar.height - step).max(0.0), count);
        }
    }

    pub fn heights(&self) -> impl Iterator<Item = f32> + '_ {
        self.bars.iter().map(|b| b.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn clip_follows_height() {
        let mut bars = SpectrumBars::new(512, 4.0, 16.0 / 9.0, 0.01);
        let bytes: Vec<u8> = (0..512).map(|i| (i % 256) as u8).collect();
        bars.apply_spectrum(&bytes);
        let n = bars.len() as f32;
        for bar in bars.bars() {
            let i = bar.slot as f32;
            assert!(close(bar.clip.min.x, i / n));
            assert!(close(bar.clip.max.x, (i + 1.0) / n));
            assert!(close(bar.clip.min.y, 0.5 - bar.height / 2.0));
            assert!(close(bar.clip.max.y - bar.clip.min.y, bar.height));
        }
        assert!(close(bars.bars()[255].height, 1.0));
        assert!(close(bars.bars()[0].height, 0.0));
    }

    #[test]
    fn starts_small() {
        let bars = SpectrumBars::new(8, 4.0, 2.0, 0.01);
        assert!(bars.heights().all(|h| close(h, 0.01)));
        assert!(close(bars.full_height(), 2.0));
    }

    #[test]
    fn positions_are_even_and_centered() {
        let bars = SpectrumBars::new(512, 4.0, 1.0, 0.01);
        assert!(close(bars.bar_width(), 4.0 / 1024.0));
        let first = bars.center_x(0);
        let last = bars.center_x(511);
        assert!(close(first, -last));
        for i in 1..512 {
            assert!(close(bars.center_x(i) - bars.center_x(i - 1), bars.bar_width()));
        }
    }

    #[test]
    fn decay_is_monotone_and_floors_at_zero() {
        let mut bars = SpectrumBars::new(4, 4.0, 1.0, 0.0);
        bars.set_height(0, 0.035);
        bars.set_height(1, 0.5);
        let mut prev: Vec<f32> = bars.heights().collect();
        for _ in 0..100 {
            bars.decay(0.01);
            let now: Vec<f32> = bars.heights().collect();
            for (a, b) in prev.iter().zip(&now) {
                assert!(b <= a);
                assert!(*b >= 0.0);
                assert!(*a == 0.0 || close(a - b, 0.01) || *b == 0.0);
            }
            prev = now;
        }
        assert!(bars.heights().all(|h| h == 0.0));
    }

    #[test]
    fn short_spectrum_reads_as_silence() {
        let mut bars = SpectrumBars::new(4, 4.0, 1.0, 0.5);
        bars.apply_spectrum(&[255]);
        let h: Vec<f32> = bars.heights().collect();
        assert_eq!(h, vec![1.0, 0.0, 0.0, 0.0]);
    }
}
