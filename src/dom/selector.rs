//! A small CSS selector subset: compound selectors built from a tag name,
//! `#id`, `.class` and `[attr]` / `[attr="value"]`, optionally joined by
//! the descendant combinator (whitespace).

use crate::error::DomError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, Option<String>)>,
}

/// A parsed selector. Each step must match a descendant of the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub(crate) steps: Vec<Compound>,
    source: String,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Selector, DomError> {
        let invalid = || DomError::InvalidSelector {
            selector: source.to_string(),
        };

        let steps = source
            .split_whitespace()
            .map(|part| parse_compound(part).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;

        if steps.is_empty() {
            return Err(invalid());
        }

        Ok(Selector {
            steps,
            source: source.trim().to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compound the matched element itself must satisfy.
    pub(crate) fn last(&self) -> &Compound {
        // parse() rejects empty selectors
        &self.steps[self.steps.len() - 1]
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_name(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if !is_name_char(c) {
            break;
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn parse_compound(part: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut chars = part.chars().peekable();

    if chars.peek().map(|c| is_name_char(*c)).unwrap_or(false) {
        compound.tag = Some(take_name(&mut chars)?.to_lowercase());
    } else if chars.peek() == Some(&'*') {
        chars.next();
    }

    while let Some(c) = chars.next() {
        match c {
            '#' => compound.id = Some(take_name(&mut chars)?),
            '.' => compound.classes.push(take_name(&mut chars)?),
            '[' => {
                let name = take_name(&mut chars)?;
                let value = match chars.next()? {
                    ']' => None,
                    '=' => {
                        let mut value = String::new();
                        let quote = match chars.peek() {
                            Some(&q) if q == '"' || q == '\'' => {
                                chars.next();
                                Some(q)
                            }
                            _ => None,
                        };
                        loop {
                            let c = chars.next()?;
                            match quote {
                                Some(q) if c == q => {
                                    if chars.next()? != ']' {
                                        return None;
                                    }
                                    break;
                                }
                                None if c == ']' => break,
                                _ => value.push(c),
                            }
                        }
                        Some(value)
                    }
                    _ => return None,
                };
                compound.attributes.push((name, value));
            }
            _ => return None,
        }
    }

    Some(compound)
}
