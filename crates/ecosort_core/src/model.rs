use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

pub type RewardId = String;

/// Identity of the signed-in user. Credentials are never verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_points: u64,
    pub items_scanned: u64,
    pub streak_days: u32,
    pub level: u32,
}

impl UserStats {
    /// Stats for a brand-new account.
    pub fn fresh() -> Self {
        Self {
            total_points: 0,
            items_scanned: 0,
            streak_days: 1,
            level: 1,
        }
    }
}

impl Default for UserStats {
    fn default() -> Self {
        Self::fresh()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WasteCategory {
    Recyclable,
    Organic,
    Hazardous,
    Residual,
    Unknown,
}

impl WasteCategory {
    pub const ALL: [WasteCategory; 5] = [
        WasteCategory::Recyclable,
        WasteCategory::Organic,
        WasteCategory::Hazardous,
        WasteCategory::Residual,
        WasteCategory::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WasteCategory::Recyclable => "Recyclable",
            WasteCategory::Organic => "Organic",
            WasteCategory::Hazardous => "Hazardous",
            WasteCategory::Residual => "Residual",
            WasteCategory::Unknown => "Unknown",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinColor {
    Blue,
    Green,
    Red,
    Gray,
}

impl BinColor {
    pub const ALL: [BinColor; 4] = [BinColor::Blue, BinColor::Green, BinColor::Red, BinColor::Gray];

    pub fn as_str(self) -> &'static str {
        match self {
            BinColor::Blue => "blue",
            BinColor::Green => "green",
            BinColor::Red => "red",
            BinColor::Gray => "gray",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

/// Normalized answer of the classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub item_name: String,
    pub category: WasteCategory,
    pub bin_color: BinColor,
    pub confidence: f64,
    pub explanation: String,
    pub tip: String,
    pub eco_points: u64,
}

impl ClassificationResult {
    /// Result reported when the service could not produce a usable answer.
    pub fn failed(explanation: impl Into<String>) -> Self {
        Self {
            item_name: "Analysis failed".to_string(),
            category: WasteCategory::Unknown,
            bin_color: BinColor::Gray,
            confidence: 0.0,
            explanation: explanation.into(),
            tip: "Check your connection and make sure the item is clearly visible.".to_string(),
            eco_points: 0,
        }
    }

    /// Shown while a classification is still running.
    pub fn analyzing() -> Self {
        Self {
            item_name: "Analyzing...".to_string(),
            category: WasteCategory::Unknown,
            bin_color: BinColor::Gray,
            confidence: 0.0,
            explanation: String::new(),
            tip: String::new(),
            eco_points: 0,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.category != WasteCategory::Unknown
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub item_name: String,
    pub category: WasteCategory,
    pub bin_color: BinColor,
    pub confidence: f64,
    pub explanation: String,
    pub tip: String,
    pub eco_points: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub image_url: String,
}

impl HistoryItem {
    pub fn from_result(
        id: String,
        result: &ClassificationResult,
        timestamp: i64,
        image_url: String,
    ) -> Self {
        Self {
            id,
            item_name: result.item_name.clone(),
            category: result.category,
            bin_color: result.bin_color,
            confidence: result.confidence,
            explanation: result.explanation.clone(),
            tip: result.tip.clone(),
            eco_points: result.eco_points,
            timestamp,
            image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub id: RewardId,
    pub title: String,
    pub cost: u64,
    pub description: String,
    pub emoji: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Front,
    #[default]
    Back,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }
}

/// A single encoded still image, from the camera or an upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageArtifact {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }
}

impl fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_carries_mime_type() {
        let image = ImageArtifact::new("image/png", vec![1, 2, 3]);
        assert_eq!(image.data_uri(), "data:image/png;base64,AQID");
    }

    #[test]
    fn categories_parse_from_wire_names() {
        assert_eq!(WasteCategory::parse("Organic"), Some(WasteCategory::Organic));
        assert_eq!(WasteCategory::parse("organic"), None);
        assert_eq!(BinColor::parse("gray"), Some(BinColor::Gray));
        assert_eq!(BinColor::parse("purple"), None);
    }
}
