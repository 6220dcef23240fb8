pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!("threadload/", env!("CARGO_PKG_VERSION"));

/// Config files checked, in order, when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["threadload.toml", "threadload.json"];
