//! Script detection and font stack construction

use crate::traits::FontDescription;

/// Unicode script groups the detector knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// Hiragana, katakana and half-width katakana
    Kana,
    /// CJK unified and compatibility ideographs
    Han,
}

impl Script {
    pub fn contains(self, ch: char) -> bool {
        let code = ch as u32;
        match self {
            Script::Kana => matches!(code,
                0x3040..=0x309F |      // Hiragana
                0x30A0..=0x30FF |      // Katakana
                0x31F0..=0x31FF |      // Katakana Phonetic Extensions
                0xFF66..=0xFF9F        // Half-width Katakana
            ),
            Script::Han => matches!(code,
                0x3400..=0x4DBF |      // CJK Unified Ideographs Extension A
                0x4E00..=0x9FFF |      // CJK Unified Ideographs
                0xF900..=0xFAFF |      // CJK Compatibility Ideographs
                0x20000..=0x2A6DF      // CJK Unified Ideographs Extension B
            ),
        }
    }
}

/// Prefer `family` when the text contains any character of `script`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRule {
    pub script: Script,
    pub family: String,
}

impl ScriptRule {
    pub fn new(script: Script, family: &str) -> Self {
        Self { script, family: family.to_string() }
    }
}

/// Picks the preferred family for a string and builds the full stack
#[derive(Debug, Clone)]
pub struct ScriptDetector {
    rules: Vec<ScriptRule>,
    default_family: String,
    /// Every configured family, in fallback priority order
    stack: Vec<String>,
}

impl ScriptDetector {
    pub fn new(rules: Vec<ScriptRule>, default_family: &str, stack: Vec<String>) -> Self {
        Self {
            rules,
            default_family: default_family.to_string(),
            stack,
        }
    }

    /// Family for `text`: the first rule whose script occurs anywhere in the
    /// text, else the default. Rule order decides, not character order.
    pub fn select_font(&self, text: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| text.chars().any(|ch| rule.script.contains(ch)))
            .map(|rule| rule.family.as_str())
            .unwrap_or(&self.default_family)
    }

    /// Preferred family first, then the rest of the stack, deduplicated
    pub fn font_stack(&self, text: &str, size: f64) -> FontDescription {
        let preferred = self.select_font(text);
        let mut families = vec![preferred.to_string()];
        for family in &self.stack {
            if !families.contains(family) {
                families.push(family.clone());
            }
        }
        FontDescription::new(families, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn detector() -> ScriptDetector {
        ScriptDetector::new(
            vec![
                ScriptRule::new(Script::Kana, "KanaFont"),
                ScriptRule::new(Script::Han, "HanFont"),
            ],
            "LatinFont",
            vec!["LatinFont".into(), "KanaFont".into(), "HanFont".into()],
        )
    }

    #[test]
    fn test_empty_string_selects_default() {
        assert_eq!(detector().select_font(""), "LatinFont");
    }

    #[test]
    fn test_latin_selects_default() {
        assert_eq!(detector().select_font("Champion"), "LatinFont");
    }

    #[test]
    fn test_kana_selected() {
        assert_eq!(detector().select_font("どんちゃん"), "KanaFont");
        assert_eq!(detector().select_font("ｶﾂ"), "KanaFont");
    }

    #[test]
    fn test_han_selected() {
        assert_eq!(detector().select_font("達人"), "HanFont");
    }

    #[test]
    fn test_kana_outranks_han_regardless_of_position() {
        // 初心者 is all ideographs; adding trailing kana flips the choice
        assert_eq!(detector().select_font("初心者"), "HanFont");
        assert_eq!(detector().select_font("初心者です"), "KanaFont");
    }

    #[test]
    fn test_font_stack_puts_preferred_first_without_duplicates() {
        let stack = detector().font_stack("達人", 20.0);
        assert_eq!(stack.families, ["HanFont", "LatinFont", "KanaFont"]);
        assert_eq!(stack.size, 20.0);

        let stack = detector().font_stack("Bob", 25.0);
        assert_eq!(stack.families, ["LatinFont", "KanaFont", "HanFont"]);
    }

    #[test]
    fn test_family_absent_from_stack_still_leads() {
        let detector = ScriptDetector::new(
            vec![ScriptRule::new(Script::Han, "Mincho")],
            "Sans",
            vec!["Sans".into()],
        );
        assert_eq!(detector.font_stack("漢", 10.0).families, ["Mincho", "Sans"]);
    }

    proptest! {
        #[test]
        fn prop_select_font_is_deterministic_and_known(text in "\\PC*") {
            let detector = detector();
            let first = detector.select_font(&text).to_string();
            prop_assert_eq!(detector.select_font(&text), first.as_str());
            prop_assert!(["LatinFont", "KanaFont", "HanFont"].contains(&first.as_str()));
        }
    }
}
