//! Minimal inline-style handling for measurement surfaces
//!
//! Only what the probes need: composing the probe's style text, reading back
//! declarations with the cascade's priority rules, and putting a requested
//! family ahead of the fallback list. Malformed declarations are skipped the
//! way a browser ignores them.

use crate::config::LoaderConfig;
use cssparser::{Delimiter, ParseError, Parser, ParserInput, Token};

/// Style text for a fresh probe: layout-neutral declarations, the probe
/// size and fallback family list, then the caller's extra declarations so
/// they can override any of the defaults.
pub fn probe_css_text(config: &LoaderConfig, extra_style: Option<&str>) -> String {
    let mut css = String::from(crate::constants::PROBE_BASE_STYLE);
    css.push_str(&format!(
        "font-size:{}px;font-family:{};",
        config.probe_font_size_px, config.probe_fallback_families
    ));
    if let Some(extra) = extra_style {
        css.push_str(extra);
    }
    css
}

/// Family list with `family` quoted and placed first.
///
/// ```
/// use fontwatch_core::style::prefer_family;
///
/// assert_eq!(prefer_family("Dolly", "Georgia,sans-serif"), "'Dolly',Georgia,sans-serif");
/// ```
pub fn prefer_family(family: &str, current: &str) -> String {
    let quoted = quote_family(family);
    if current.trim().is_empty() {
        quoted
    } else {
        format!("{},{}", quoted, current)
    }
}

fn quote_family(family: &str) -> String {
    let escaped = family.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// One `property: value` declaration of an inline style
#[derive(Clone, Debug, PartialEq, Eq)]
struct Declaration {
    property: String,
    value: String,
    important: bool,
}

/// Ordered declarations of an inline style.
///
/// A later declaration replaces an earlier one of the same property unless
/// the earlier one is `!important` and the later one is not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Declarations {
    entries: Vec<Declaration>,
}

impl Declarations {
    pub fn parse(css_text: &str) -> Self {
        let mut input = ParserInput::new(css_text);
        let mut parser = Parser::new(&mut input);
        let mut declarations = Self::default();

        while !parser.is_exhausted() {
            // Malformed declarations are dropped up to the next semicolon
            if let Ok(declaration) = parser.parse_until_after(Delimiter::Semicolon, parse_declaration) {
                declarations.apply(declaration);
            }
        }
        declarations
    }

    fn apply(&mut self, declaration: Declaration) {
        match self.entries.iter_mut().find(|entry| entry.property == declaration.property) {
            Some(entry) if entry.important && !declaration.important => {}
            Some(entry) => *entry = declaration,
            None => self.entries.push(declaration),
        }
    }

    /// Set or replace a declaration; a replaced one keeps its position
    pub fn set(&mut self, property: &str, value: &str) {
        let declaration = Declaration {
            property: property.to_string(),
            value: value.to_string(),
            important: false,
        };
        match self.entries.iter_mut().find(|entry| entry.property == property) {
            Some(entry) => *entry = declaration,
            None => self.entries.push(declaration),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.property == property)
            .map(|entry| entry.value.as_str())
    }

    pub fn is_important(&self, property: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.property == property && entry.important)
    }

    /// `font-size` in pixels, if it is a plain `px` length
    pub fn font_size_px(&self) -> Option<f64> {
        let value = self.get("font-size")?;
        let mut input = ParserInput::new(value);
        let mut parser = Parser::new(&mut input);

        let px = match parser.next() {
            Ok(Token::Dimension {
                value, ref unit, ..
            }) if unit.eq_ignore_ascii_case("px") => f64::from(*value),
            _ => return None,
        };
        parser.expect_exhausted().ok()?;
        Some(px).filter(|px| px.is_finite() && *px > 0.0)
    }

    pub fn families(&self) -> Vec<String> {
        self.get("font-family").map(split_family_list).unwrap_or_default()
    }

    pub fn to_css_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let priority = if entry.important { " !important" } else { "" };
                format!("{}:{}{};", entry.property, entry.value, priority)
            })
            .collect()
    }
}

fn parse_declaration<'i, 't>(
    parser: &mut Parser<'i, 't>,
) -> Result<Declaration, ParseError<'i, ()>> {
    let property = parser.expect_ident()?.to_ascii_lowercase();
    parser.expect_colon()?;

    let value_start = parser.position();
    let mut value_end = value_start;
    let mut important = false;
    loop {
        match parser.next() {
            Err(_) => break,
            Ok(Token::Delim('!')) => {
                parser.expect_ident_matching("important")?;
                parser.expect_exhausted()?;
                important = true;
                break;
            }
            Ok(
                Token::Function(_)
                | Token::ParenthesisBlock
                | Token::SquareBracketBlock
                | Token::CurlyBracketBlock,
            ) => {
                let _ = parser.parse_nested_block(|nested| {
                    while nested.next().is_ok() {}
                    Ok::<_, ParseError<()>>(())
                });
                value_end = parser.position();
            }
            Ok(_) => value_end = parser.position(),
        }
    }

    let value = parser.slice(value_start..value_end).trim();
    if value.is_empty() {
        return Err(parser.new_custom_error(()));
    }
    Ok(Declaration {
        property,
        value: value.to_string(),
        important,
    })
}

/// Split a `font-family` value into unquoted family names.
///
/// Unquoted names made of several identifiers are joined with single spaces.
pub fn split_family_list(value: &str) -> Vec<String> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let mut families = Vec::new();
    let mut words: Vec<String> = Vec::new();

    while let Ok(token) = parser.next() {
        match token {
            Token::QuotedString(name) | Token::Ident(name) => words.push(name.to_string()),
            Token::Comma => push_family(&mut families, &mut words),
            _ => {}
        }
    }
    push_family(&mut families, &mut words);
    families
}

fn push_family(families: &mut Vec<String>, words: &mut Vec<String>) {
    let name = words.join(" ");
    words.clear();
    if !name.trim().is_empty() {
        families.push(name);
    }
}
