use {
    crate::InferError,
    base::Vec2,
    std::{fmt, str::FromStr},
};

/// Published Monodepth2 checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelName {
    Mono640x192,
    Stereo640x192,
    MonoStereo640x192,
    MonoNoPt640x192,
    StereoNoPt640x192,
    MonoStereoNoPt640x192,
    Mono1024x320,
    Stereo1024x320,
    MonoStereo1024x320,
}

impl ModelName {
    pub const ALL: [Self; 9] = [
        Self::Mono640x192,
        Self::Stereo640x192,
        Self::MonoStereo640x192,
        Self::MonoNoPt640x192,
        Self::StereoNoPt640x192,
        Self::MonoStereoNoPt640x192,
        Self::Mono1024x320,
        Self::Stereo1024x320,
        Self::MonoStereo1024x320,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mono640x192 => "mono_640x192",
            Self::Stereo640x192 => "stereo_640x192",
            Self::MonoStereo640x192 => "mono+stereo_640x192",
            Self::MonoNoPt640x192 => "mono_no_pt_640x192",
            Self::StereoNoPt640x192 => "stereo_no_pt_640x192",
            Self::MonoStereoNoPt640x192 => "mono+stereo_no_pt_640x192",
            Self::Mono1024x320 => "mono_1024x320",
            Self::Stereo1024x320 => "stereo_1024x320",
            Self::MonoStereo1024x320 => "mono+stereo_1024x320",
        }
    }

    /// Training resolution (width, height), used when the weights do not
    /// record it.
    pub fn feed_size(&self) -> Vec2<usize> {
        match self {
            Self::Mono1024x320 | Self::Stereo1024x320 | Self::MonoStereo1024x320 => {
                Vec2::new(1024, 320)
            }
            _ => Vec2::new(640, 192),
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|name| name.as_str()).collect();
                InferError::Config(format!(
                    "unknown model name '{s}', expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for name in ModelName::ALL {
            assert_eq!(name.as_str().parse::<ModelName>().unwrap(), name);
        }
    }

    #[test]
    fn test_feed_size_follows_name() {
        for name in ModelName::ALL {
            let size = name.feed_size();
            assert!(name.as_str().ends_with(&format!("_{}x{}", size.x, size.y)));
        }
    }

    #[test]
    fn test_unknown_name_is_config_error() {
        assert!(matches!(
            "mono_512x256".parse::<ModelName>(),
            Err(InferError::Config(_))
        ));
        assert!("".parse::<ModelName>().is_err());
    }
}
