//! Logical asset keys and their resolution to loadable locations

use crate::request::{PlateType, RankDecoration};
use std::path::PathBuf;

/// A named font resource; list order is fallback priority
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSpec {
    pub logical_name: String,
    pub resource_key: String,
}

impl FontSpec {
    pub fn new(logical_name: &str, resource_key: &str) -> Self {
        Self {
            logical_name: logical_name.to_string(),
            resource_key: resource_key.to_string(),
        }
    }
}

/// Everything the pipeline can ask the resolver for
#[derive(Clone, Copy, Debug)]
pub enum AssetKey<'a> {
    Font(&'a FontSpec),
    Plate { plate_type: PlateType, show_rank: bool },
    Decoration(&'a RankDecoration),
}

/// Deterministic key → location mapping rooted at an asset directory
#[derive(Clone, Debug)]
pub struct AssetResolver {
    root: PathBuf,
}

impl AssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, key: &AssetKey<'_>) -> String {
        let path = match key {
            AssetKey::Font(spec) => self.root.join(&spec.resource_key),
            AssetKey::Plate { plate_type, show_rank } => {
                let variant = if *show_rank { "dan" } else { "no-dan" };
                self.root
                    .join("images/plate")
                    .join(variant)
                    .join(format!("{}.png", plate_type.key()))
            }
            AssetKey::Decoration(rank) => self
                .root
                .join("images/dani")
                .join(&rank.tier)
                .join(format!("{}-{}.png", rank.frame_color, rank.pass_color)),
        };
        path.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_resolution() {
        let resolver = AssetResolver::new("assets");
        let spec = FontSpec::new("TnT", "fonts/TnT.ttf");
        assert_eq!(resolver.resolve(&AssetKey::Font(&spec)), "assets/fonts/TnT.ttf");
    }

    #[test]
    fn test_plate_resolution_depends_on_rank_visibility() {
        let resolver = AssetResolver::new("assets");
        let plain = resolver.resolve(&AssetKey::Plate { plate_type: PlateType::Gold, show_rank: false });
        let ranked = resolver.resolve(&AssetKey::Plate { plate_type: PlateType::Gold, show_rank: true });
        assert_eq!(plain, "assets/images/plate/no-dan/gold.png");
        assert_eq!(ranked, "assets/images/plate/dan/gold.png");
    }

    #[test]
    fn test_decoration_resolution() {
        let resolver = AssetResolver::new("/srv/plates");
        let rank = RankDecoration {
            tier: "10dan".into(),
            frame_color: "gold".into(),
            pass_color: "red".into(),
        };
        assert_eq!(
            resolver.resolve(&AssetKey::Decoration(&rank)),
            "/srv/plates/images/dani/10dan/gold-red.png"
        );
    }
}
