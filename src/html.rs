//! Markup loader for page fixtures. Lenient about nesting: an end tag
//! closes up to its nearest open match, and unmatched end tags are ignored.

use std::collections::BTreeMap;

use crate::dom::{Dom, NodeId, is_raw_text_tag, is_void_tag};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub(crate) struct ParseOutput {
    pub(crate) dom: Dom,
}

pub(crate) fn parse_html(html: &str) -> Result<ParseOutput> {
    let mut dom = Dom::new();
    let mut open = vec![dom.root];
    let mut reader = Reader { src: html, pos: 0 };

    while !reader.at_end() {
        if reader.eat("<!--") {
            reader.skip_past("-->", "HTML comment")?;
        } else if reader.eat("<!") {
            // Doctype and similar declarations carry no nodes.
            reader.skip_past(">", "declaration")?;
        } else if reader.eat("</") {
            let tag = reader.end_tag()?;
            close_element(&dom, &mut open, &tag);
        } else if reader.eat("<") {
            let StartTag {
                name,
                attrs,
                self_closing,
            } = reader.start_tag()?;
            let parent = innermost(&dom, &open);
            let node = dom.create_element(parent, name.clone(), attrs);
            if self_closing || is_void_tag(&name) {
                continue;
            }
            if is_raw_text_tag(&name) {
                let body = reader.raw_text(&name)?;
                if !body.is_empty() {
                    let body = if name == "textarea" {
                        decode_entities(body)
                    } else {
                        body.to_string()
                    };
                    dom.create_text(node, body);
                }
            } else {
                open.push(node);
            }
        } else {
            let text = reader.take_while(|ch| ch != '<');
            let parent = innermost(&dom, &open);
            dom.create_text(parent, decode_entities(text));
        }
    }

    dom.initialize_form_control_values();
    Ok(ParseOutput { dom })
}

fn innermost(dom: &Dom, open: &[NodeId]) -> NodeId {
    open.last().copied().unwrap_or(dom.root)
}

fn close_element(dom: &Dom, open: &mut Vec<NodeId>, tag: &str) {
    let matching = open.iter().rposition(|node| {
        *node != dom.root
            && dom
                .tag_name(*node)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    });
    if let Some(depth) = matching {
        open.truncate(depth);
    }
}

struct StartTag {
    name: String,
    attrs: BTreeMap<String, String>,
    self_closing: bool,
}

/// Byte cursor over the markup. Only ever advances over ASCII markers or
/// whole `char`s, so `pos` stays on a char boundary.
struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        let matched = self.rest().starts_with(prefix);
        if matched {
            self.pos += prefix.len();
        }
        matched
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, ch)| !keep(*ch))
            .map_or(rest.len(), |(idx, _)| idx);
        self.pos += len;
        &rest[..len]
    }

    fn skip_ws(&mut self) {
        self.take_while(|ch| ch.is_ascii_whitespace());
    }

    /// Returns the text before `marker` and moves past the marker.
    fn skip_past(&mut self, marker: &str, what: &str) -> Result<&'a str> {
        let rest = self.rest();
        let at = rest
            .find(marker)
            .ok_or_else(|| Error::HtmlParse(format!("unclosed {what}")))?;
        self.pos += at + marker.len();
        Ok(&rest[..at])
    }

    fn start_tag(&mut self) -> Result<StartTag> {
        self.skip_ws();
        let name = self.take_while(is_name_char).to_ascii_lowercase();
        if name.is_empty() {
            return Err(Error::HtmlParse("empty tag name".into()));
        }

        let mut attrs = BTreeMap::new();
        loop {
            self.skip_ws();
            if self.eat(">") {
                return Ok(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                });
            }
            if self.eat("/>") {
                return Ok(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                });
            }
            if self.at_end() {
                return Err(Error::HtmlParse(format!("unclosed <{name}> start tag")));
            }

            let attr = self
                .take_while(|ch| is_name_char(ch) || ch == ':')
                .to_ascii_lowercase();
            if attr.is_empty() {
                return Err(Error::HtmlParse(format!("invalid attribute name in <{name}>")));
            }
            self.skip_ws();
            let value = if self.eat("=") {
                self.skip_ws();
                self.attr_value()?
            } else {
                String::new()
            };
            attrs.insert(attr, value);
        }
    }

    fn attr_value(&mut self) -> Result<String> {
        let raw = if self.eat("\"") {
            self.skip_past("\"", "quoted attribute value")?
        } else if self.eat("'") {
            self.skip_past("'", "quoted attribute value")?
        } else {
            let rest = self.rest();
            let len = rest
                .char_indices()
                .find(|(idx, ch)| {
                    ch.is_ascii_whitespace() || *ch == '>' || rest[*idx..].starts_with("/>")
                })
                .map_or(rest.len(), |(idx, _)| idx);
            self.pos += len;
            &rest[..len]
        };
        Ok(decode_entities(raw))
    }

    /// Reads after the `</` of an end tag, up to and including its `>`.
    fn end_tag(&mut self) -> Result<String> {
        self.skip_ws();
        let name = self.take_while(is_name_char).to_ascii_lowercase();
        self.skip_past(">", "end tag")?;
        Ok(name)
    }

    /// Body of a raw-text element, consuming its end tag.
    fn raw_text(&mut self, tag: &str) -> Result<&'a str> {
        let rest = self.rest();
        // ASCII lowercasing keeps byte offsets intact.
        let at = rest
            .to_ascii_lowercase()
            .find(&format!("</{tag}"))
            .ok_or_else(|| Error::HtmlParse(format!("unclosed <{tag}>")))?;
        self.pos += at + 2;
        self.end_tag()?;
        Ok(&rest[..at])
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn decode_entities(src: &str) -> String {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&nbsp;", '\u{a0}'),
    ];
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_markup_builds_expected_tree() -> Result<()> {
        let ParseOutput { dom } = parse_html(
            "<!DOCTYPE html><div id='a' class='x y'><span>hi</span><input id='q' value='v'></div>",
        )?;
        let div = dom.by_id("a").expect("div indexed by id");
        assert_eq!(dom.tag_name(div), Some("div"));
        assert_eq!(dom.text_content(div), "hi");
        let input = dom.by_id("q").expect("input indexed by id");
        assert_eq!(dom.value(input)?, "v");
        assert_eq!(dom.parent(input), Some(div));
        Ok(())
    }

    #[test]
    fn style_body_is_kept_as_raw_text() -> Result<()> {
        let ParseOutput { dom } = parse_html("<style>.a > .b { color: red; }</style><p>x</p>")?;
        let style = dom.query_selector("style")?.expect("style element");
        assert_eq!(dom.text_content(style), ".a > .b { color: red; }");
        assert_eq!(dom.query_selector_all("p")?.len(), 1);
        Ok(())
    }

    #[test]
    fn entities_are_decoded_in_text_and_attributes() -> Result<()> {
        let ParseOutput { dom } = parse_html("<p id='p' title='a &amp; b'>1 &lt; 2</p>")?;
        let p = dom.by_id("p").expect("paragraph");
        assert_eq!(dom.attr(p, "title").as_deref(), Some("a & b"));
        assert_eq!(dom.text_content(p), "1 < 2");
        Ok(())
    }

    #[test]
    fn stray_end_tags_and_case_are_tolerated() -> Result<()> {
        let ParseOutput { dom } =
            parse_html("<DIV id='outer'><p>one</span></P><TEXTAREA id='t'>a &amp; b</textarea></div>")?;
        let outer = dom.by_id("outer").expect("outer div");
        let textarea = dom.by_id("t").expect("textarea");
        assert_eq!(dom.parent(textarea), Some(outer));
        assert_eq!(dom.value(textarea)?, "a & b");
        Ok(())
    }

    #[test]
    fn unclosed_comment_is_an_error() {
        assert!(matches!(
            parse_html("<div><!-- nope"),
            Err(Error::HtmlParse(_))
        ));
    }
}
