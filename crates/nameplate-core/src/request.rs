//! Form input and the validated render request built from it

use crate::error::{Field, PlateError, PlateResult};
use std::str::FromStr;

/// Plate tier selecting the background art
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PlateType {
    #[default]
    Wood,
    Blue,
    Red,
    Silver,
    Gold,
    Rainbow,
}

impl PlateType {
    pub const ALL: [PlateType; 6] = [
        PlateType::Wood,
        PlateType::Blue,
        PlateType::Red,
        PlateType::Silver,
        PlateType::Gold,
        PlateType::Rainbow,
    ];

    /// Stable key used in asset paths
    pub fn key(self) -> &'static str {
        match self {
            PlateType::Wood => "wood",
            PlateType::Blue => "blue",
            PlateType::Red => "red",
            PlateType::Silver => "silver",
            PlateType::Gold => "gold",
            PlateType::Rainbow => "rainbow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown plate type: {0}")]
pub struct UnknownPlateType(pub String);

impl FromStr for PlateType {
    type Err = UnknownPlateType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlateType::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| UnknownPlateType(s.to_string()))
    }
}

/// Raw form values, exactly as the form holds them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormInput {
    pub title: String,
    pub player_name: String,
    pub plate_type: PlateType,
    pub show_rank: bool,
    pub rank_tier: String,
    pub frame_color: String,
    pub pass_color: String,
}

/// Parameters of the rank decoration overlay
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankDecoration {
    pub tier: String,
    pub frame_color: String,
    pub pass_color: String,
}

/// One validated draw attempt
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    pub title: String,
    pub player_name: String,
    pub plate_type: PlateType,
    /// Present iff the decoration is shown
    pub rank: Option<RankDecoration>,
}

impl RenderRequest {
    /// Trim and validate form values; the first missing field wins
    pub fn from_form(form: &FormInput) -> PlateResult<Self> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(PlateError::Validation { field: Field::Title });
        }
        let player_name = form.player_name.trim();
        if player_name.is_empty() {
            return Err(PlateError::Validation { field: Field::PlayerName });
        }

        let rank = if form.show_rank {
            let tier = form.rank_tier.trim();
            let frame_color = form.frame_color.trim();
            let pass_color = form.pass_color.trim();
            if tier.is_empty() || frame_color.is_empty() || pass_color.is_empty() {
                return Err(PlateError::Validation { field: Field::Rank });
            }
            Some(RankDecoration {
                tier: tier.to_string(),
                frame_color: frame_color.to_string(),
                pass_color: pass_color.to_string(),
            })
        } else {
            None
        };

        Ok(Self {
            title: title.to_string(),
            player_name: player_name.to_string(),
            plate_type: form.plate_type,
            rank,
        })
    }

    pub fn show_rank(&self) -> bool {
        self.rank.is_some()
    }
}
