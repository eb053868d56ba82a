//! Configuration loading and parsing.
//!
//! Reads `tailview.toml` from the working directory, else from the platform
//! config directory (`<config_dir>/tailview/tailview.toml`), unless the binary
//! passes an explicit path. A missing file or a parse error yields defaults;
//! unknown keys are ignored.
//!
//! ```toml
//! [view]
//! wrap = "none"        # none | exact | nice
//! tab_width = 4        # clamped to 1..=16
//! virtual_space = false
//! follow = true
//! filler = "~"
//! marker = ">"
//!
//! [filter]
//! initial = ""
//! ```

use anyhow::Result;
use core_text::{DEFAULT_TAB_WIDTH, WrapMode};
use serde::Deserialize;
use std::{fs, io, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "tailview.toml";
pub const MIN_TAB_WIDTH: usize = 1;
pub const MAX_TAB_WIDTH: usize = 16;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WrapSetting {
    #[default]
    None,
    Exact,
    Nice,
}

impl From<WrapSetting> for WrapMode {
    fn from(setting: WrapSetting) -> Self {
        match setting {
            WrapSetting::None => WrapMode::None,
            WrapSetting::Exact => WrapMode::Exact,
            WrapSetting::Nice => WrapMode::Nice,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ViewConfig {
    pub wrap: WrapSetting,
    pub tab_width: usize,
    pub virtual_space: bool,
    pub follow: bool,
    pub filler: String,
    pub marker: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            wrap: WrapSetting::None,
            tab_width: DEFAULT_TAB_WIDTH,
            virtual_space: false,
            follow: true,
            filler: "~".to_string(),
            marker: ">".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    pub initial: String,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    pub view: ViewConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Where the settings came from; `None` when defaults were used.
    pub source: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("tailview").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_unreadable");
            return Ok(Config::default());
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                source: Some(path),
                file,
            };
            cfg.normalize();
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn wrap_mode(&self) -> WrapMode {
        self.file.view.wrap.into()
    }

    pub fn tab_width(&self) -> usize {
        self.file.view.tab_width
    }

    fn normalize(&mut self) {
        let raw = self.file.view.tab_width;
        let clamped = raw.clamp(MIN_TAB_WIDTH, MAX_TAB_WIDTH);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                min = MIN_TAB_WIDTH,
                max = MAX_TAB_WIDTH,
                "tab_width_clamped"
            );
            self.file.view.tab_width = clamped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.source.is_none());
        assert_eq!(cfg.wrap_mode(), WrapMode::None);
        assert_eq!(cfg.tab_width(), DEFAULT_TAB_WIDTH);
        assert!(cfg.file.view.follow);
        assert_eq!(cfg.file.view.filler, "~");
        assert_eq!(cfg.file.view.marker, ">");
        assert!(cfg.file.filter.initial.is_empty());
    }

    #[test]
    fn parses_view_and_filter_sections() {
        let tmp = write_config(
            "[view]\nwrap = \"nice\"\ntab_width = 8\nvirtual_space = true\nfollow = false\n\
             filler = \".\"\nmarker = \"$\"\n[filter]\ninitial = \"error\"\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.source.as_deref(), Some(tmp.path()));
        assert_eq!(cfg.wrap_mode(), WrapMode::Nice);
        assert_eq!(cfg.tab_width(), 8);
        assert!(cfg.file.view.virtual_space);
        assert!(!cfg.file.view.follow);
        assert_eq!(cfg.file.view.filler, ".");
        assert_eq!(cfg.file.view.marker, "$");
        assert_eq!(cfg.file.filter.initial, "error");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let tmp = write_config("[view]\nwrap = \"exact\"\nunknown_key = 1\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.wrap_mode(), WrapMode::Exact);
        assert_eq!(cfg.tab_width(), DEFAULT_TAB_WIDTH);
        assert!(cfg.file.view.follow);
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let tmp = write_config("[view]\nwrap = \"sideways\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.source.is_none());
        assert_eq!(cfg.wrap_mode(), WrapMode::None);
    }

    #[test]
    fn zero_tab_width_is_raised() {
        let tmp = write_config("[view]\ntab_width = 0\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.tab_width(), MIN_TAB_WIDTH);
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let tmp = write_config("[view]\ntab_width = 40\n");
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf())).unwrap());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("tab_width_clamped"));
        assert_eq!(cfg.tab_width(), MAX_TAB_WIDTH);
    }
}
