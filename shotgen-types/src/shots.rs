//! Shot vocabulary for a five-image product pack.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 产品图类型（固定五种）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShotKind {
    Main,
    Angle,
    Detail,
    Lifestyle,
    Dimension,
}

impl ShotKind {
    /// 展示顺序。
    pub const ALL: [Self; 5] = [
        Self::Main,
        Self::Angle,
        Self::Detail,
        Self::Lifestyle,
        Self::Dimension,
    ];

    /// 在 [`ShotKind::ALL`] 中的位置。
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Main => 0,
            Self::Angle => 1,
            Self::Detail => 2,
            Self::Lifestyle => 3,
            Self::Dimension => 4,
        }
    }

    /// API 风格的名称。
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::Angle => "ANGLE",
            Self::Detail => "DETAIL",
            Self::Lifestyle => "LIFESTYLE",
            Self::Dimension => "DIMENSION",
        }
    }

    /// 展示标题。
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Main => "Main Listing Image",
            Self::Angle => "Feature Angle",
            Self::Detail => "Material & Quality",
            Self::Lifestyle => "Lifestyle Context",
            Self::Dimension => "Profile View",
        }
    }

    /// 展示说明。
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Main => {
                "Hero shot on pure white background. The primary image customers see in search results."
            }
            Self::Angle => {
                "3/4 perspective shot highlighting the overall form and key physical design features."
            }
            Self::Detail => {
                "Macro shot showing off textures, stitching, buttons or finish to prove build quality."
            }
            Self::Lifestyle => {
                "Real-world application showing the product in its natural intended environment."
            }
            Self::Dimension => {
                "Side-on profile shot showing thickness, proportions, and sleek design elements."
            }
        }
    }
}

impl fmt::Display for ShotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单张图的生成状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotStatus {
    #[default]
    Idle,
    Generating,
    Completed,
    Error,
}

impl ShotStatus {
    /// 是否处于可重试的静止状态。
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}
