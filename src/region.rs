use {
    crate::ConfigError,
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// A Tuya data center. Each region has its own OpenAPI endpoint and its own credentials.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Region {
    /// Central Europe data center.
    #[default]
    Eu,

    /// Western America data center.
    Us,

    /// China data center.
    Cn,
}

impl Region {
    /// The OpenAPI base URL for this region, without a trailing slash.
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Eu => "https://openapi.tuyaeu.com",
            Self::Us => "https://openapi.tuyaus.com",
            Self::Cn => "https://openapi.tuyacn.com",
        }
    }

    /// The short region code used in configuration.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Eu => "eu",
            Self::Us => "us",
            Self::Cn => "cn",
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eu" => Ok(Self::Eu),
            "us" => Ok(Self::Us),
            "cn" => Ok(Self::Cn),
            _ => Err(ConfigError::InvalidRegion(s.to_string())),
        }
    }
}
