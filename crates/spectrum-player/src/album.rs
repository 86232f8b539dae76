use crate::error::PlayerError;

/// One selectable album: a thumbnail plus the looping video whose audio
/// drives the bars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Album {
    pub index: usize,
    pub thumbnail: String,
    pub video: String,
}

impl Album {
    pub fn new(band: &str, index: usize) -> Self {
        Self {
            index,
            thumbnail: format!("./{band}/{index}/album.png"),
            video: format!("./{band}/{index}/vid.mp4"),
        }
    }
}

/// Fixed list of albums built at startup, plus which one the picker shows
/// as active.
#[derive(Clone, Debug)]
pub struct AlbumPicker {
    albums: Vec<Album>,
    active: Option<usize>,
}

impl AlbumPicker {
    pub fn new(band: &str, count: usize) -> Self {
        Self {
            albums: (0..count).map(|i| Album::new(band, i)).collect(),
            active: None,
        }
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Album, PlayerError> {
        self.albums.get(index).ok_or(PlayerError::AlbumOutOfRange {
            index,
            count: self.albums.len(),
        })
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Make `index` the only active entry. Returns the previously active one.
    pub fn activate(&mut self, index: usize) -> Result<Option<usize>, PlayerError> {
        self.get(index)?;
        Ok(self.active.replace(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_paths_are_index_keyed() {
        let a = Album::new("jyocho", 2);
        assert_eq!(a.thumbnail, "./jyocho/2/album.png");
        assert_eq!(a.video, "./jyocho/2/vid.mp4");
    }

    #[test]
    fn picker_tracks_a_single_active_album() {
        let mut p = AlbumPicker::new("jyocho", 4);
        assert_eq!(p.len(), 4);
        assert_eq!(p.active(), None);
        assert_eq!(p.activate(1), Ok(None));
        assert_eq!(p.activate(3), Ok(Some(1)));
        assert_eq!(p.active(), Some(3));
    }

    #[test]
    fn out_of_range_leaves_active_alone() {
        let mut p = AlbumPicker::new("jyocho", 2);
        p.activate(0).unwrap();
        assert_eq!(
            p.activate(5),
            Err(PlayerError::AlbumOutOfRange { index: 5, count: 2 })
        );
        assert_eq!(p.active(), Some(0));
    }
}
