// Frequency data pulled from the analyser once per frame.
#[derive(Clone, Debug, Default)]
pub struct SpectrumFrame {
    // Raw analyser bytes, one per bin (0..=255)
    pub frequency_data: Vec<u8>,
}

impl SpectrumFrame {
    pub fn new(bins: usize) -> Self {
        Self {
            frequency_data: vec![0u8; bins],
        }
    }

    /// Resize to `bins` and zero the buffer, ready for the next capture.
    pub fn reset(&mut self, bins: usize) {
        self.frequency_data.clear();
        self.frequency_data.resize(bins, 0);
    }

    /// Magnitude of bin `i` in `[0, 1]`.
    pub fn normalized(&self, i: usize) -> f32 {
        self.frequency_data
            .get(i)
            .map_or(0.0, |&b| (f32::from(b) / 255.0).max(0.0))
    }

    /// Mean byte value over all bins (0..=255).
    pub fn average(&self) -> f32 {
        if self.frequency_data.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.frequency_data.iter().map(|&x| u32::from(x)).sum();
        sum as f32 / self.frequency_data.len() as f32
    }

    /// Backdrop opacity for this frame: a base alpha raised by loudness,
    /// capped at `max_alpha`.
    pub fn backdrop_alpha(&self, fft_size: u32, base_alpha: f32, max_alpha: f32) -> f32 {
        (base_alpha + self.average() / fft_size.max(1) as f32).min(max_alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_handles_empty() {
        let f = SpectrumFrame::default();
        assert_eq!(f.average(), 0.0);
        assert_eq!(f.normalized(3), 0.0);
    }

    #[test]
    fn backdrop_alpha_is_capped() {
        let mut f = SpectrumFrame::new(4);
        assert_eq!(f.backdrop_alpha(1024, 0.5, 0.6), 0.5);

        f.frequency_data = vec![51, 51, 51, 51];
        let a = f.backdrop_alpha(1024, 0.5, 0.6);
        assert!((a - (0.5 + 51.0 / 1024.0)).abs() < 1e-6);

        f.frequency_data = vec![255; 4];
        assert_eq!(f.backdrop_alpha(1024, 0.5, 0.6), 0.6);
    }

    #[test]
    fn reset_resizes_and_zeroes() {
        let mut f = SpectrumFrame::new(2);
        f.frequency_data[1] = 9;
        f.reset(5);
        assert_eq!(f.frequency_data, vec![0; 5]);
        assert_eq!(f.normalized(0), 0.0);
    }
}
