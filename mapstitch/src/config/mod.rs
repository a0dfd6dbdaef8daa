//! Configuration types for MapStitch components.
//!
//! - [`StitcherConfig`] is the immutable per-stitcher configuration (tile
//!   size, tile quota, fetch concurrency, zoom search bounds, colors).
//! - [`HttpConfig`] and [`ServerConfig`] configure the transport and the
//!   HTTP front end.
//! - [`ConfigFile`] loads all of the above plus provider templates from
//!   `~/.mapstitch/config.ini`.
//!
//! # Example
//!
//! ```
//! use mapstitch::config::ConfigFile;
//!
//! let config = ConfigFile::from_ini_str("[stitch]\nmax_tiles = 100\n").unwrap();
//! assert_eq!(config.stitch.max_tiles(), 100);
//! ```

mod file;
mod parser;
mod settings;
mod stitcher;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use parser::parse_color;
pub use settings::{
    ConfigFile, HttpConfig, ServerConfig, DEFAULT_BIND, DEFAULT_HEIGHT, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_USER_AGENT, DEFAULT_WIDTH,
};
pub use stitcher::{
    StitcherConfig, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_MAX_TILES, DEFAULT_MAX_ZOOM,
    DEFAULT_MIN_ZOOM, TRANSPARENT,
};
