//! Rekordbox XML schema constants

pub const XML_VERSION: &str = "1.0";
pub const XML_ENCODING: &str = "UTF-8";

/// DJ_PLAYLISTS version attribute
pub const PLAYLISTS_VERSION: &str = "1.0.0";

pub const PRODUCT_NAME: &str = "mixmap";
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of the generated import playlist
pub const IMPORT_PLAYLIST_PREFIX: &str = "mixmap_import_";

/// TRACK attribute names
pub mod attrs {
    pub const TRACK_ID: &str = "TrackID";
    pub const NAME: &str = "Name";
    pub const ARTIST: &str = "Artist";
    pub const ALBUM: &str = "Album";
    pub const GENRE: &str = "Genre";
    pub const YEAR: &str = "Year";
    pub const LOCATION: &str = "Location";
    pub const TOTAL_TIME: &str = "TotalTime";
    pub const TONALITY: &str = "Tonality";
    pub const DATE_ADDED: &str = "DateAdded";
    pub const SAMPLE_RATE: &str = "SampleRate";
    pub const COMMENTS: &str = "Comments";
}

/// POSITION_MARK attribute names and values
pub mod marks {
    pub const NAME: &str = "Name";
    pub const TYPE: &str = "Type";
    pub const START: &str = "Start";
    pub const NUM: &str = "Num";

    /// Plain cue (as opposed to fade-in, fade-out, load or loop)
    pub const TYPE_CUE: &str = "0";
    /// Memory cue; hot cues use 0-7
    pub const NUM_MEMORY: &str = "-1";
}

/// Playlist node types
pub mod node_types {
    pub const FOLDER: &str = "0";
    pub const PLAYLIST: &str = "1";
}
