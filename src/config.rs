use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::error::{OmrError, Result};
use crate::types::AnswerLabel;

/// Named pipeline presets. The two presets describe the two ways a form can
/// be read: one blob per bubble, or one rectangle per answer row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Threshold the image, take every bubble-sized contour and read the
    /// answer from where the bubble sits.
    #[default]
    BubbleThreshold,

    /// Trace answer boxes in an edge map and read the answer from how much
    /// of each option column is filled.
    BoxEdges,
}

impl FromStr for Strategy {
    type Err = OmrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bubble-threshold" => Ok(Strategy::BubbleThreshold),
            "box-edges" => Ok(Strategy::BoxEdges),
            _ => Err(OmrError::InvalidConfig(format!("unknown strategy: {}", s))),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::BubbleThreshold => write!(f, "bubble-threshold"),
            Strategy::BoxEdges => write!(f, "box-edges"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Answer area of the form. `None` uses the whole image.
    pub roi: Option<RoiConfig>,
    pub preprocess: PreprocessConfig,
    pub detect: DetectConfig,
    pub classify: ClassifyConfig,
    /// Options of every question, left to right.
    pub options: Vec<AnswerLabel>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiConfig {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Which preprocessed representation is handed to the region detector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeSource {
    Threshold,
    Edges,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreprocessConfig {
    pub equalize: bool,
    /// Side of the square Gaussian kernel; odd and positive.
    pub blur_kernel_size: u32,
    pub threshold: u8,
    /// Make dark pixels the foreground of the binary image.
    pub invert: bool,
    pub canny_low: f32,
    pub canny_high: f32,
    pub shape_source: ShapeSource,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievalMode {
    /// Every border, including holes and nested shapes.
    Tree,
    /// Outermost borders only.
    External,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum AcceptancePolicy {
    /// Accept rects whose width and height both fall in `min..=max`.
    #[serde(rename_all = "camelCase", rename = "size-window")]
    SizeWindow { min: u32, max: u32 },

    /// Accept contours that simplify to four vertices and whose rect is
    /// strictly larger than `min_size` on both sides.
    #[serde(rename_all = "camelCase", rename = "quadrilateral")]
    Quadrilateral { min_size: u32, epsilon_ratio: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectConfig {
    pub retrieval: RetrievalMode,
    pub acceptance: AcceptancePolicy,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ClassifyPolicy {
    /// Reads the option from the column containing the region's center.
    #[serde(rename_all = "camelCase", rename = "position")]
    Position {
        #[serde(default)]
        column_basis: ColumnBasis,
    },

    /// `threshold` is a percentage in `0.0..=100.0`.
    #[serde(rename_all = "camelCase", rename = "fill-ratio")]
    FillRatio { threshold: f32 },
}

/// What width the position policy splits into option columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnBasis {
    /// The region's own width.
    #[default]
    Region,
    /// The width of the whole answer area.
    AnswerArea,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifyConfig {
    pub policy: ClassifyPolicy,
    /// Representation whose foreground is measured by the fill-ratio policy.
    pub source: ShapeSource,
}

impl RoiConfig {
    /// Clamps the ROI to an image of the given size. Returns `None` when the
    /// ROI lies entirely outside the image.
    pub fn clamp_to(&self, (width, height): (u32, u32)) -> Option<Rect> {
        if self.x >= width || self.y >= height || self.width == 0 || self.height == 0 {
            return None;
        }
        let clamped_width = self.width.min(width - self.x);
        let clamped_height = self.height.min(height - self.y);
        Some(Rect::at(self.x as i32, self.y as i32).of_size(clamped_width, clamped_height))
    }
}

impl PreprocessConfig {
    /// Converts the kernel size to a Gaussian sigma the same way a zero
    /// sigma is derived from the kernel size in common imaging libraries.
    pub fn blur_sigma(&self) -> f32 {
        0.3 * ((self.blur_kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_strategy(Strategy::default())
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self::for_strategy(Strategy::default())
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self::for_strategy(Strategy::default())
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self::for_strategy(Strategy::default())
    }
}

impl PreprocessConfig {
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::BubbleThreshold => Self {
                equalize: false,
                blur_kernel_size: 3,
                threshold: 125,
                invert: false,
                canny_low: 100.0,
                canny_high: 200.0,
                shape_source: ShapeSource::Threshold,
            },
            Strategy::BoxEdges => Self {
                equalize: true,
                blur_kernel_size: 5,
                threshold: 125,
                invert: true,
                canny_low: 100.0,
                canny_high: 200.0,
                shape_source: ShapeSource::Edges,
            },
        }
    }
}

impl DetectConfig {
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::BubbleThreshold => Self {
                retrieval: RetrievalMode::Tree,
                acceptance: AcceptancePolicy::SizeWindow { min: 25, max: 70 },
            },
            Strategy::BoxEdges => Self {
                retrieval: RetrievalMode::External,
                acceptance: AcceptancePolicy::Quadrilateral {
                    min_size: 50,
                    epsilon_ratio: 0.02,
                },
            },
        }
    }
}

impl ClassifyConfig {
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::BubbleThreshold => Self {
                policy: ClassifyPolicy::Position {
                    column_basis: ColumnBasis::Region,
                },
                source: ShapeSource::Threshold,
            },
            Strategy::BoxEdges => Self {
                policy: ClassifyPolicy::FillRatio { threshold: 10.0 },
                source: ShapeSource::Threshold,
            },
        }
    }
}

impl PipelineConfig {
    pub fn for_strategy(strategy: Strategy) -> Self {
        Self {
            roi: Some(RoiConfig {
                x: 0,
                y: 540,
                width: 1190,
                height: 1050,
            }),
            preprocess: PreprocessConfig::for_strategy(strategy),
            detect: DetectConfig::for_strategy(strategy),
            classify: ClassifyConfig::for_strategy(strategy),
            options: AnswerLabel::OPTIONS.to_vec(),
        }
    }

    /// Reads a configuration from a JSON file. Missing fields take the
    /// default preset's values.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            OmrError::InvalidConfig(format!("reading {}: {}", path.display(), e))
        })?;
        let config: PipelineConfig = serde_json::from_str(&json).map_err(|e| {
            OmrError::InvalidConfig(format!("parsing {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let kernel = self.preprocess.blur_kernel_size;
        if kernel == 0 || kernel % 2 == 0 {
            return Err(OmrError::InvalidConfig(format!(
                "blur kernel size must be odd and positive, got {}",
                kernel
            )));
        }

        if self.preprocess.canny_low > self.preprocess.canny_high {
            return Err(OmrError::InvalidConfig(format!(
                "canny low threshold {} exceeds high threshold {}",
                self.preprocess.canny_low, self.preprocess.canny_high
            )));
        }

        if self.options.is_empty() {
            return Err(OmrError::InvalidConfig("no answer options".to_string()));
        }
        if self.options.iter().any(AnswerLabel::is_blank) {
            return Err(OmrError::InvalidConfig(
                "blank cannot be an answer option".to_string(),
            ));
        }

        match self.detect.acceptance {
            AcceptancePolicy::SizeWindow { min, max } if min == 0 || min > max => {
                return Err(OmrError::InvalidConfig(format!(
                    "size window {}..={} is empty",
                    min, max
                )));
            }
            AcceptancePolicy::Quadrilateral { epsilon_ratio, .. } if epsilon_ratio <= 0.0 => {
                return Err(OmrError::InvalidConfig(format!(
                    "polygon tolerance {} must be positive",
                    epsilon_ratio
                )));
            }
            _ => {}
        }

        if let ClassifyPolicy::FillRatio { threshold } = self.classify.policy {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(OmrError::InvalidConfig(format!(
                    "fill threshold {} is not a percentage",
                    threshold
                )));
            }
        }

        Ok(())
    }
}
