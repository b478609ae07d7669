//! Font requests and the normalization of loader input

use crate::error::LoaderError;
use std::str::FromStr;

/// A single typeface to wait for, with optional extra style declarations
/// applied to its measurement surface (e.g. `font-weight: 300`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontRequest {
    family: String,
    style: Option<String>,
}

impl FontRequest {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }
}

impl From<&str> for FontRequest {
    fn from(family: &str) -> Self {
        Self::new(family)
    }
}

impl From<String> for FontRequest {
    fn from(family: String) -> Self {
        Self::new(family)
    }
}

impl From<&FontRequest> for FontRequest {
    fn from(request: &FontRequest) -> Self {
        request.clone()
    }
}

/// Parses `Family` or `Family; extra: declarations`.
///
/// Quotes around the family name are stripped.
///
/// ```
/// use fontwatch_core::FontRequest;
///
/// let request: FontRequest = "'Dolly'; font-weight: 300".parse().unwrap();
/// assert_eq!(request.family(), "Dolly");
/// assert_eq!(request.style(), Some("font-weight: 300"));
/// ```
impl FromStr for FontRequest {
    type Err = LoaderError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (family, style) = match input.split_once(';') {
            Some((family, style)) => (family, Some(style.trim())),
            None => (input, None),
        };
        let family = family.trim().trim_matches(|c| c == '\'' || c == '"').trim();
        if family.is_empty() {
            return Err(LoaderError::InvalidFontRequest {
                input: input.to_string(),
            });
        }
        let request = Self::new(family);
        Ok(match style {
            Some(style) if !style.is_empty() => request.with_style(style),
            _ => request,
        })
    }
}

/// Ordered font requests as accepted by the loader.
///
/// Built from a single request or any sequence of them; a single request is
/// always treated as a sequence of one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontRequests(Vec<FontRequest>);

impl FontRequests {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FontRequest> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<FontRequest> {
        self.0
    }
}

impl IntoIterator for FontRequests {
    type Item = FontRequest;
    type IntoIter = std::vec::IntoIter<FontRequest>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<FontRequest> for FontRequests {
    fn from(request: FontRequest) -> Self {
        Self(vec![request])
    }
}

impl From<&str> for FontRequests {
    fn from(family: &str) -> Self {
        Self(vec![FontRequest::from(family)])
    }
}

impl From<String> for FontRequests {
    fn from(family: String) -> Self {
        Self(vec![FontRequest::from(family)])
    }
}

impl<T: Into<FontRequest>> From<Vec<T>> for FontRequests {
    fn from(requests: Vec<T>) -> Self {
        Self(requests.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FontRequest>, const N: usize> From<[T; N]> for FontRequests {
    fn from(requests: [T; N]) -> Self {
        Self(requests.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<FontRequest>> From<&[T]> for FontRequests {
    fn from(requests: &[T]) -> Self {
        Self(requests.iter().cloned().map(Into::into).collect())
    }
}

impl FromIterator<FontRequest> for FontRequests {
    fn from_iter<I: IntoIterator<Item = FontRequest>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_family_becomes_sequence_of_one() {
        let requests = FontRequests::from("Sauna");
        assert_eq!(requests.into_vec(), vec![FontRequest::new("Sauna")]);
    }

    #[test]
    fn test_mixed_sequence_keeps_order() {
        let requests = FontRequests::from(vec![
            FontRequest::new("Sauna"),
            FontRequest::new("Dolly").with_style("font-weight: 300"),
        ]);
        let families: Vec<&str> = requests.iter().map(FontRequest::family).collect();
        assert_eq!(families, ["Sauna", "Dolly"]);
        assert_eq!(requests.iter().nth(1).and_then(FontRequest::style), Some("font-weight: 300"));
    }

    #[test]
    fn test_array_and_slice_inputs() {
        assert_eq!(FontRequests::from(["Bello", "Liza"]).len(), 2);
        let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(FontRequests::from(names.as_slice()).len(), 3);
        assert!(FontRequests::from(Vec::<FontRequest>::new()).is_empty());
    }

    #[test]
    fn test_parse_plain_family() {
        let request: FontRequest = "  Fakir ".parse().unwrap();
        assert_eq!(request.family(), "Fakir");
        assert_eq!(request.style(), None);
    }

    #[test]
    fn test_parse_family_with_style() {
        let request: FontRequest = "\"Open Sans\"; font-style: italic; font-weight: 700"
            .parse()
            .unwrap();
        assert_eq!(request.family(), "Open Sans");
        assert_eq!(request.style(), Some("font-style: italic; font-weight: 700"));

        let trailing: FontRequest = "Dolly;".parse().unwrap();
        assert_eq!(trailing.style(), None);
    }

    #[test]
    fn test_parse_rejects_missing_family() {
        assert!(matches!(
            "".parse::<FontRequest>(),
            Err(LoaderError::InvalidFontRequest { .. })
        ));
        assert!("''; font-weight: 300".parse::<FontRequest>().is_err());
    }
}
