//! Per-command match policy.
//!
//! Each [`Command`](crate::Command) carries one [`Trigger`]. The policy is
//! chosen per command, so a table may freely mix exact keywords (`help`),
//! prefixed commands (`待辦：<content>`) and substring triggers.
//!
//! # Example
//!
//! ```rust,ignore
//! use brass_framework::Trigger;
//!
//! let help = Trigger::exact(["help", "幫助"]);
//! assert!(help.matches("  help "));
//!
//! let todo = Trigger::prefix(["待辦"]);
//! assert!(todo.matches("待辦：買咖啡"));
//! assert!(!todo.matches("待辦事項"));
//! ```

/// Delimiters separating a command keyword from its content: half-width and
/// full-width colon.
pub const DELIMITERS: [char; 2] = [':', '：'];

/// How a command recognizes its messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The trimmed text equals one of the keywords.
    Exact(Vec<String>),
    /// The text has a delimiter and the trimmed part before the first
    /// delimiter equals one of the keywords.
    Prefix(Vec<String>),
    /// The text contains one of the keywords.
    Contains(Vec<String>),
}

impl Trigger {
    /// Exact-equality trigger.
    pub fn exact<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exact(keywords.into_iter().map(Into::into).collect())
    }

    /// Prefix-before-delimiter trigger.
    pub fn prefix<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Prefix(keywords.into_iter().map(Into::into).collect())
    }

    /// Substring trigger.
    pub fn contains<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Contains(keywords.into_iter().map(Into::into).collect())
    }

    /// The keywords of this trigger.
    pub fn keywords(&self) -> &[String] {
        match self {
            Self::Exact(k) | Self::Prefix(k) | Self::Contains(k) => k,
        }
    }

    /// Short name of the policy, for logging.
    pub fn policy(&self) -> &'static str {
        match self {
            Self::Exact(_) => "exact",
            Self::Prefix(_) => "prefix",
            Self::Contains(_) => "contains",
        }
    }

    /// Tests `text` against this trigger.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Exact(keywords) => {
                let text = text.trim();
                keywords.iter().any(|k| k == text)
            }
            Self::Prefix(keywords) => match split_at_delimiter(text) {
                Some((head, _)) => {
                    let head = head.trim();
                    keywords.iter().any(|k| k == head)
                }
                None => false,
            },
            Self::Contains(keywords) => keywords
                .iter()
                .any(|k| !k.is_empty() && text.contains(k.as_str())),
        }
    }
}

fn split_at_delimiter(text: &str) -> Option<(&str, &str)> {
    let idx = text.find(DELIMITERS)?;
    let delimiter_len = text[idx..].chars().next().map_or(1, char::len_utf8);
    Some((&text[..idx], &text[idx + delimiter_len..]))
}

/// Returns the trimmed text after the first delimiter, or `None` when there
/// is no delimiter or nothing follows it.
pub fn extract_content(text: &str) -> Option<&str> {
    let (_, rest) = split_at_delimiter(text)?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_requires_equality() {
        let t = Trigger::exact(["help"]);
        assert!(t.matches("help"));
        assert!(t.matches("  help\n"));
        assert!(!t.matches("help me"));
        assert!(!t.matches("Help"));
    }

    #[test]
    fn test_prefix_full_and_half_width() {
        let t = Trigger::prefix(["待辦"]);
        assert!(t.matches("待辦：買咖啡"));
        assert!(t.matches("待辦:買咖啡"));
        assert!(t.matches(" 待辦 ： "));
        assert!(!t.matches("待辦"));
        assert!(!t.matches("我的待辦：買咖啡"));
    }

    #[test]
    fn test_prefix_uses_first_delimiter() {
        let t = Trigger::prefix(["筆記"]);
        assert!(t.matches("筆記：會議 10:30"));
        assert_eq!(extract_content("筆記：會議 10:30"), Some("會議 10:30"));
    }

    #[test]
    fn test_contains() {
        let t = Trigger::contains(["天氣"]);
        assert!(t.matches("今天天氣如何"));
        assert!(!t.matches("今天好熱"));
        assert!(!Trigger::contains([""]).matches("anything"));
    }

    #[test]
    fn test_extract_content() {
        assert_eq!(extract_content("待辦：買咖啡"), Some("買咖啡"));
        assert_eq!(extract_content("待辦:  買咖啡  "), Some("買咖啡"));
        assert_eq!(extract_content("待辦："), None);
        assert_eq!(extract_content("待辦：   "), None);
        assert_eq!(extract_content("沒有分隔符"), None);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(Trigger::exact(["a"]).policy(), "exact");
        assert_eq!(Trigger::prefix(["a"]).policy(), "prefix");
        assert_eq!(Trigger::contains(["a"]).policy(), "contains");
        assert_eq!(Trigger::prefix(["a", "b"]).keywords().len(), 2);
    }
}
