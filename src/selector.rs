//! Selectors used to address page elements: compounds of `tag`, `#id` and
//! `.class` joined by descendant whitespace, grouped with commas.

use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

/// A parsed selector. Each chain lists its compounds outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    chains: Vec<Vec<Compound>>,
}

impl Selector {
    pub(crate) fn parse(src: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedSelector(src.to_string());
        let mut chains = Vec::new();
        for group in src.split(',') {
            let chain = group
                .split_ascii_whitespace()
                .map(parse_compound)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(unsupported)?;
            if chain.is_empty() {
                return Err(unsupported());
            }
            chains.push(chain);
        }
        Ok(Self { chains })
    }

    /// The id when the selector is exactly `#id`, for the index fast path.
    pub(crate) fn lone_id(&self) -> Option<&str> {
        match self.chains.as_slice() {
            [chain] => match chain.as_slice() {
                [Compound {
                    tag: None,
                    id: Some(id),
                    classes,
                }] if classes.is_empty() => Some(id.as_str()),
                _ => None,
            },
            _ => None,
        }
    }
}

fn parse_compound(token: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = token;

    let tag_len = ident_len(rest);
    if tag_len > 0 {
        compound.tag = Some(rest[..tag_len].to_ascii_lowercase());
        rest = &rest[tag_len..];
    }

    while let Some(marker) = rest.bytes().next() {
        if marker != b'#' && marker != b'.' {
            return None;
        }
        let name_len = ident_len(&rest[1..]);
        if name_len == 0 {
            return None;
        }
        let name = rest[1..=name_len].to_string();
        if marker == b'.' {
            compound.classes.push(name);
        } else if compound.id.replace(name).is_some() {
            return None;
        }
        rest = &rest[1 + name_len..];
    }
    Some(compound)
}

fn ident_len(src: &str) -> usize {
    src.bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
        .count()
}

impl Dom {
    pub(crate) fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector
            .chains
            .iter()
            .any(|chain| self.matches_chain(node, chain))
    }

    fn matches_chain(&self, node: NodeId, chain: &[Compound]) -> bool {
        let Some((last, ancestors)) = chain.split_last() else {
            return false;
        };
        if !self.matches_compound(node, last) {
            return false;
        }
        // Descendant-only chains can be matched greedily, nearest ancestor first.
        let mut cursor = self.parent(node);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(candidate) = cursor else {
                    return false;
                };
                cursor = self.parent(candidate);
                if self.matches_compound(candidate, compound) {
                    break;
                }
            }
        }
        true
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        if compound
            .tag
            .as_ref()
            .is_some_and(|tag| !element.tag_name.eq_ignore_ascii_case(tag))
        {
            return false;
        }
        if compound
            .id
            .as_ref()
            .is_some_and(|id| element.attrs.get("id") != Some(id))
        {
            return false;
        }
        let class_attr = element.attrs.get("class").map(String::as_str).unwrap_or("");
        compound
            .classes
            .iter()
            .all(|class_name| class_attr.split_ascii_whitespace().any(|c| c == class_name))
    }
}
