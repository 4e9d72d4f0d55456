/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Storage namespace the paths are relative to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, EnumString, IntoStaticStr, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Root {
    /// The whole account
    #[default]
    Dropbox,
    /// The folder restricted to this application
    Sandbox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ThumbnailSize {
    /// 32x32
    Small,
    /// 64x64
    Medium,
    /// 128x128
    #[default]
    Large,
    /// 64x64
    S,
    /// 128x128
    M,
    /// 640x480
    L,
    /// 1024x768
    Xl,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ThumbnailFormat {
    #[default]
    Jpeg,
    Png,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn root_names() {
        let dropbox: &'static str = Root::Dropbox.into();
        assert_eq!(dropbox, "dropbox");
        assert_eq!(Root::Sandbox.to_string(), "sandbox");
        assert_eq!(Root::from_str("sandbox").unwrap(), Root::Sandbox);
    }

    #[test]
    fn thumbnail_names() {
        let size: &'static str = ThumbnailSize::Xl.into();
        assert_eq!(size, "xl");
        let format: &'static str = ThumbnailFormat::Png.into();
        assert_eq!(format, "png");
    }
}
