//! Built-in named formats.

use std::fmt;

/// A named format shortcut.
///
/// Passing one of these names wherever a format string is expected selects
/// the preset's template instead. `debug` additionally forces decorated
/// output, whatever the caller asked for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Preset {
    Combined,
    Common,
    Dev,
    Short,
    Tiny,
    Debug,
}

const COMBINED: &str = r#":remote-addr - :remote-user [:date[clf]] ":method :url HTTP/:http-version" :status :response[content-length] ":referrer" ":user-agent""#;

const COMMON: &str = r#":remote-addr - :remote-user [:date[clf]] ":method :url HTTP/:http-version" :status :response[content-length]"#;

const DEV: &str = ":method :url :status :response-time ms - :response[content-length]";

const SHORT: &str = ":remote-addr :remote-user :method :url HTTP/:http-version :status :response[content-length] - :response-time ms";

const TINY: &str = ":method :url :status :response[content-length] - :response-time ms";

const DEBUG: &str = concat!(
    "METHOD:         :method\n",
    "URL:            :url\n",
    "STATUS:         :status\n",
    "DATE:           :date[web]\n",
    "RESPONSE_TIME:  :response-time ms\n",
    "CONTENT_LENGTH: :response[content-length]\n",
    "HTTP_VERSION:   :http-version\n",
    "REMOTE_ADDR:    :remote-addr\n",
    "REMOTE_USER:    :remote-user\n",
    "REFERER:        :referrer\n",
    "USER_AGENT:     :user-agent\n",
);

impl Preset {
    pub const ALL: [Preset; 6] = [
        Self::Combined,
        Self::Common,
        Self::Dev,
        Self::Short,
        Self::Tiny,
        Self::Debug,
    ];

    /// Looks a preset up by its exact, lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Common   => "common",
            Self::Dev      => "dev",
            Self::Short    => "short",
            Self::Tiny     => "tiny",
            Self::Debug    => "debug",
        }
    }

    /// The template the preset expands to.
    ///
    /// `debug` spans eleven lines and ends with a newline, so consecutive
    /// entries are separated by a blank line in the output.
    pub fn template(self) -> &'static str {
        match self {
            Self::Combined => COMBINED,
            Self::Common   => COMMON,
            Self::Dev      => DEV,
            Self::Short    => SHORT,
            Self::Tiny     => TINY,
            Self::Debug    => DEBUG,
        }
    }

    /// Whether selecting this preset turns on decorated output.
    pub fn forces_debug(self) -> bool {
        self == Self::Debug
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
