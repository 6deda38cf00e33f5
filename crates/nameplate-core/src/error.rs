// src/error.rs
use thiserror::Error;

/// Failure modes of the nameplate pipeline
///
/// Every variant is recoverable: the compositor reports it once through the
/// notifier and returns to an interactive state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlateError {
    // Input validation
    #[error("Missing required field: {field}")]
    Validation { field: Field },

    // Font readiness
    #[error("Fonts are still loading")]
    FontsLoading,

    #[error("Fonts failed to load: {reason}")]
    FontsUnavailable { reason: String },

    #[error("Font {family} failed to load: {message}")]
    FontLoad { family: String, message: String },

    // Per-request asset loads
    #[error("Background {url} failed to load: {message}")]
    BackgroundLoad { url: String, message: String },

    #[error("No decoration art at {url}")]
    DecorationMissing { url: String },

    #[error("Render error: {message}")]
    Render { message: String },

    // Export
    #[error("Nothing to export")]
    NothingToExport,

    #[error("Export failed: {message}")]
    Export { message: String },
}

/// Form fields that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    PlayerName,
    Rank,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Title => f.write_str("title"),
            Field::PlayerName => f.write_str("player name"),
            Field::Rank => f.write_str("rank"),
        }
    }
}

impl PlateError {
    /// Text shown to the user for this error
    pub fn user_message(&self) -> &'static str {
        match self {
            PlateError::Validation { field: Field::Title } => "称号名を入力してください",
            PlateError::Validation { field: Field::PlayerName } => "プレイヤー名を入力してください",
            PlateError::Validation { field: Field::Rank } => "段位を選択してください",
            PlateError::FontsLoading => "フォントを読込中です。少しお待ちください",
            PlateError::FontsUnavailable { .. } | PlateError::FontLoad { .. } => {
                "フォントの読み込みに失敗しました。ページを再読み込みしてください"
            }
            PlateError::BackgroundLoad { .. } => "プレート画像の読み込みに失敗しました",
            PlateError::DecorationMissing { .. } => {
                "すみません。この段位表示は素材がありません。\n見つかり次第追加します🙇‍♀️"
            }
            PlateError::Render { .. } => "描画に失敗しました",
            PlateError::NothingToExport => "称号が生成されていません",
            PlateError::Export { .. } => "画像のダウンロードに失敗しました。もう一度お試しください",
        }
    }
}

/// Asset loading failures reported by an `AssetLoader`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Asset not found: {url}")]
    NotFound { url: String },

    #[error("Failed to decode {url}: {message}")]
    Decode { url: String, message: String },

    #[error("IO error reading {url}: {message}")]
    Io { url: String, message: String },
}

pub type PlateResult<T> = Result<T, PlateError>;

impl From<crate::traits::BackendError> for PlateError {
    fn from(e: crate::traits::BackendError) -> Self {
        PlateError::Render { message: e.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_field_specific() {
        let title = PlateError::Validation { field: Field::Title };
        let name = PlateError::Validation { field: Field::PlayerName };
        assert_ne!(title.user_message(), name.user_message());
        assert_eq!(title.to_string(), "Missing required field: title");
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::NotFound { url: "assets/x.png".into() };
        assert_eq!(err.to_string(), "Asset not found: assets/x.png");
    }
}
