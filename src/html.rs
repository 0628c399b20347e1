use super::*;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    let mut scanner = Scanner { src: html, pos: 0 };
    let mut tree = TreeBuilder::new();

    while !scanner.at_end() {
        if scanner.eat("<!--") {
            scanner
                .skip_past("-->")
                .ok_or_else(|| Error::HtmlParse("unclosed HTML comment".into()))?;
        } else if scanner.eat("</") {
            let tag = scanner.end_tag()?;
            tree.close(&tag);
        } else if scanner.eat("<!") {
            // doctype
            scanner
                .skip_past(">")
                .ok_or_else(|| Error::HtmlParse("unclosed declaration".into()))?;
        } else if scanner.at_start_tag() {
            let tag = scanner.start_tag()?;
            tree.open(tag);
        } else {
            let text = scanner.text();
            tree.text(text);
        }
    }

    Ok(tree.dom)
}

struct StartTag {
    name: String,
    attrs: HashMap<String, String>,
    self_closing: bool,
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        self.src.get(self.pos..).unwrap_or_default()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn skip_past(&mut self, needle: &str) -> Option<&'a str> {
        let rest = self.rest();
        let end = rest.find(needle)?;
        self.pos += end + needle.len();
        rest.get(..end)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|ch: char| !keep(ch)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(|ch| ch.is_ascii_whitespace());
    }

    fn at_start_tag(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('<') && chars.next().is_some_and(|ch| ch.is_ascii_alphabetic())
    }

    // a '<' that does not open a tag stays in the text run
    fn text(&mut self) -> &'a str {
        let rest = self.rest();
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..].find('<').map_or(rest.len(), |at| at + skip);
        self.pos += end;
        &rest[..end]
    }

    fn start_tag(&mut self) -> Result<StartTag> {
        self.eat("<");
        let name = self.take_while(is_name_char).to_ascii_lowercase();
        let mut attrs = HashMap::new();

        loop {
            self.skip_whitespace();
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

            let attr_name = self.take_while(is_name_char);
            if attr_name.is_empty() {
                // stray character between attributes
                self.pos += self.rest().chars().next().map_or(0, char::len_utf8);
                continue;
            }
            let attr_name = attr_name.to_ascii_lowercase();

            self.skip_whitespace();
            let value = if self.eat("=") {
                self.skip_whitespace();
                self.attr_value()?
            } else {
                String::new()
            };
            attrs.entry(attr_name).or_insert(value);
        }
    }

    fn attr_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let closing = char::from(quote).to_string();
                let raw = self
                    .skip_past(&closing)
                    .ok_or_else(|| Error::HtmlParse("unclosed quoted attribute value".into()))?;
                Ok(decode_entities(raw))
            }
            _ => {
                let raw = self.take_while(|ch| !ch.is_ascii_whitespace() && ch != '>');
                Ok(decode_entities(raw))
            }
        }
    }

    fn end_tag(&mut self) -> Result<String> {
        self.skip_whitespace();
        let name = self.take_while(is_name_char).to_ascii_lowercase();
        self.skip_past(">")
            .ok_or_else(|| Error::HtmlParse(format!("unclosed </{name}> end tag")))?;
        Ok(name)
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':')
}

struct OpenElement {
    node: NodeId,
    tag: String,
    // stack index of the innermost `li` not fenced off by a nested list
    list_item: Option<usize>,
}

struct TreeBuilder {
    dom: Dom,
    open: Vec<OpenElement>,
    open_tags: HashMap<String, usize>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            dom: Dom::new(),
            open: Vec::new(),
            open_tags: HashMap::new(),
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().map_or(self.dom.root, |entry| entry.node)
    }

    fn open(&mut self, tag: StartTag) {
        // a new <li> implicitly ends the previous one in the same list
        if tag.name == "li" {
            if let Some(index) = self.open.last().and_then(|entry| entry.list_item) {
                while self.open.len() > index {
                    self.pop();
                }
            }
        }

        let parent = self.current();
        let node = self.dom.append_element(parent, tag.name.clone(), tag.attrs);
        if tag.self_closing || is_void_tag(&tag.name) {
            return;
        }

        let list_item = match tag.name.as_str() {
            "li" => Some(self.open.len()),
            "ul" | "ol" | "menu" => None,
            _ => self.open.last().and_then(|entry| entry.list_item),
        };
        *self.open_tags.entry(tag.name.clone()).or_default() += 1;
        self.open.push(OpenElement {
            node,
            tag: tag.name,
            list_item,
        });
    }

    // end tags without a matching open element are dropped
    fn close(&mut self, tag: &str) {
        if self.open_tags.get(tag).copied().unwrap_or(0) == 0 {
            return;
        }
        while let Some(entry) = self.pop() {
            if entry.tag == tag {
                break;
            }
        }
    }

    fn pop(&mut self) -> Option<OpenElement> {
        let entry = self.open.pop()?;
        if let Some(count) = self.open_tags.get_mut(&entry.tag) {
            *count = count.saturating_sub(1);
        }
        Some(entry)
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current();
        self.dom.append_text(parent, decode_entities(text));
    }
}

fn decode_entities(raw: &str) -> String {
    let mut pieces = raw.split('&');
    let mut out = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        let decoded = piece
            .split_once(';')
            .and_then(|(name, tail)| Some((entity_char(name)?, tail)));
        match decoded {
            Some((ch, tail)) => {
                out.push(ch);
                out.push_str(tail);
            }
            None => {
                out.push('&');
                out.push_str(piece);
            }
        }
    }
    out
}

fn entity_char(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
