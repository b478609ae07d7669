//! Root element class-list mutation

use crate::traits::ClassList;
use std::borrow::Cow;
use std::cell::RefCell;

/// Append `token` to a class attribute value, duplicates included.
pub fn append_token(class_name: &str, token: &str) -> String {
    if class_name.is_empty() {
        token.to_string()
    } else {
        format!("{} {}", class_name, token)
    }
}

/// Remove every whitespace-delimited occurrence of `token`.
///
/// Only whole tokens match: stripping `x` leaves `box` alone. The value is
/// borrowed back untouched when `token` is absent.
pub fn strip_token<'a>(class_name: &'a str, token: &str) -> Cow<'a, str> {
    if !class_name.split_whitespace().any(|existing| existing == token) {
        return Cow::Borrowed(class_name);
    }
    Cow::Owned(
        class_name
            .split_whitespace()
            .filter(|existing| *existing != token)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// A class attribute held as a plain string, like `document.documentElement.className`.
#[derive(Debug, Default)]
pub struct TokenClassList {
    class_name: RefCell<String>,
}

impl TokenClassList {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: RefCell::new(class_name.to_string()),
        }
    }

    pub fn class_name(&self) -> String {
        self.class_name.borrow().clone()
    }

    pub fn set_class_name(&self, class_name: &str) {
        *self.class_name.borrow_mut() = class_name.to_string();
    }

    pub fn count(&self, token: &str) -> usize {
        self.class_name
            .borrow()
            .split_whitespace()
            .filter(|existing| *existing == token)
            .count()
    }
}

impl ClassList for TokenClassList {
    fn add_token(&self, token: &str) {
        let updated = append_token(&self.class_name.borrow(), token);
        *self.class_name.borrow_mut() = updated;
    }

    fn remove_token(&self, token: &str) {
        let updated = match strip_token(&self.class_name.borrow(), token) {
            Cow::Borrowed(_) => return,
            Cow::Owned(updated) => updated,
        };
        *self.class_name.borrow_mut() = updated;
    }

    fn contains(&self, token: &str) -> bool {
        self.count(token) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_does_not_deduplicate() {
        let classes = TokenClassList::new("js");
        classes.add_token("hide-webfonts");
        classes.add_token("hide-webfonts");
        assert_eq!(classes.class_name(), "js hide-webfonts hide-webfonts");
        assert_eq!(classes.count("hide-webfonts"), 2);
    }

    #[test]
    fn test_remove_strips_all_occurrences() {
        let classes = TokenClassList::new("  hide  js\thide hide ");
        classes.remove_token("hide");
        assert_eq!(classes.class_name(), "js");
        assert!(!classes.contains("hide"));
    }

    #[test]
    fn test_remove_is_idempotent_and_whole_token() {
        let classes = TokenClassList::new("box x-large");
        classes.remove_token("x");
        classes.remove_token("x");
        assert_eq!(classes.class_name(), "box x-large");
    }

    #[test]
    fn test_remove_without_match_keeps_attribute_verbatim() {
        let classes = TokenClassList::new("  js\tfoo ");
        classes.remove_token("fallback");
        assert_eq!(classes.class_name(), "  js\tfoo ");
        assert!(matches!(strip_token("js  foo", "fo"), Cow::Borrowed("js  foo")));
    }

    #[test]
    fn test_append_to_empty() {
        assert_eq!(append_token("", "fallback"), "fallback");
        assert_eq!(strip_token("fallback", "fallback"), "");
    }
}
