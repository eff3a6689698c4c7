//! Manual Page Document Model
//!
//! Pages are stored as a sequence of typed blocks instead of raw HTML.
//! Authors write Markdown in the editor; it is parsed with pulldown-cmark
//! into blocks and rendered back through `render_html`, which escapes
//! every piece of text. Only `data:` sources are kept for images and
//! attachments, and only http(s) links survive as text.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Deserializer, Serialize};

/// One structural piece of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    List { ordered: bool, items: Vec<String> },
    Image { src: String, alt: String },
    Attachment { name: String, src: String },
}

/// Page content
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Stored {
            Blocks(Vec<Block>),
            LegacyHtml(String),
        }

        Ok(match Stored::deserialize(deserializer)? {
            Stored::Blocks(blocks) => Document { blocks },
            Stored::LegacyHtml(html) => Document::from_legacy_html(&html),
        })
    }
}

fn is_data_uri(src: &str) -> bool {
    src.trim_start().to_ascii_lowercase().starts_with("data:")
}

fn is_image_data_uri(src: &str) -> bool {
    src.trim_start().to_ascii_lowercase().starts_with("data:image/")
}

fn is_web_link(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("http://") || url.starts_with("https://")
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// Accumulates pulldown-cmark events into blocks
#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    text: String,
    heading: Option<u8>,
    list: Option<(bool, Vec<String>)>,
    list_depth: usize,
    image: Option<(String, String)>,
    link: Option<(String, String)>,
}

impl BlockBuilder {
    fn flush_paragraph(&mut self) {
        let text = self.text.trim();
        if !text.is_empty() && self.list.is_none() {
            self.blocks.push(Block::Paragraph { text: text.to_string() });
        }
        if self.list.is_none() {
            self.text.clear();
        }
    }

    fn flush_item(&mut self) {
        let text = self.text.trim().to_string();
        if let Some((_, items)) = self.list.as_mut() {
            if !text.is_empty() {
                items.push(text);
            }
        }
        self.text.clear();
    }

    fn push_text(&mut self, piece: &str) {
        if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(piece);
        } else if let Some((_, label)) = self.link.as_mut() {
            label.push_str(piece);
        } else {
            self.text.push_str(piece);
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_paragraph();
                self.heading = Some(heading_level(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = self.heading.take() {
                    let text = self.text.trim().to_string();
                    if !text.is_empty() {
                        self.blocks.push(Block::Heading { level, text });
                    }
                }
                self.text.clear();
            }
            Event::Start(Tag::Paragraph) => {
                if self.list.is_none() {
                    self.text.clear();
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if self.list.is_some() {
                    self.text.push(' ');
                } else {
                    self.flush_paragraph();
                }
            }
            Event::Start(Tag::List(start)) => {
                self.list_depth += 1;
                if self.list.is_none() {
                    self.flush_paragraph();
                    self.list = Some((start.is_some(), Vec::new()));
                } else {
                    // Nested lists are flattened into the outer one
                    self.flush_item();
                }
            }
            Event::End(TagEnd::List(_)) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.flush_item();
                    if let Some((ordered, items)) = self.list.take() {
                        if !items.is_empty() {
                            self.blocks.push(Block::List { ordered, items });
                        }
                    }
                }
            }
            Event::Start(Tag::Item) => self.flush_item(),
            Event::End(TagEnd::Item) => self.flush_item(),
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((src, alt)) = self.image.take() {
                    if is_image_data_uri(&src) {
                        self.flush_paragraph();
                        self.blocks.push(Block::Image { src, alt: alt.trim().to_string() });
                    } else {
                        log::warn!("Dropping image with non-inline source");
                        self.text.push_str(&alt);
                    }
                }
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.link = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Link) => {
                if let Some((url, label)) = self.link.take() {
                    if is_data_uri(&url) {
                        self.flush_paragraph();
                        let name = if label.trim().is_empty() { "anexo".to_string() } else { label.trim().to_string() };
                        self.blocks.push(Block::Attachment { name, src: url });
                    } else if is_web_link(&url) {
                        self.text.push_str(&format!("{} ({})", label, url));
                    } else {
                        self.text.push_str(&label);
                    }
                }
            }
            Event::Text(t) | Event::Code(t) => self.push_text(&t),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_paragraph();
        self.blocks
    }
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Parse editor Markdown into blocks
    pub fn from_markdown(text: &str) -> Self {
        let mut builder = BlockBuilder::default();
        for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
            builder.event(event);
        }
        Self { blocks: builder.finish() }
    }

    /// Editor text for this document. Parsing it back with `from_markdown`
    /// yields the same blocks.
    pub fn to_markdown(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Heading { level, text } => {
                    format!("{} {}", "#".repeat((*level).clamp(1, 6) as usize), escape_markdown(text))
                }
                Block::Paragraph { text } => text.split('\n').map(escape_markdown).collect::<Vec<_>>().join("  \n"),
                Block::List { ordered, items } => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item = escape_markdown(item);
                        if *ordered { format!("{}. {}", i + 1, item) } else { format!("- {}", item) }
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
                Block::Image { src, alt } => format!("![{}]({})", escape_markdown(alt), src),
                Block::Attachment { name, src } => format!("[{}]({})", escape_markdown(name), src),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Text content only, one line per block
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { text, .. } | Block::Paragraph { text } => Some(text.clone()),
                Block::List { items, .. } => Some(items.join("\n")),
                Block::Image { alt, .. } if !alt.is_empty() => Some(alt.clone()),
                Block::Attachment { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert stored HTML from older pages: text is kept, markup dropped,
    /// inline `data:image` pictures become image blocks.
    pub fn from_legacy_html(html: &str) -> Self {
        let mut blocks = Vec::new();
        let mut text = String::new();
        let mut rest = html;

        let flush = |text: &mut String, blocks: &mut Vec<Block>| {
            for line in decode_entities(text).lines() {
                let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
                if !line.is_empty() {
                    blocks.push(Block::Paragraph { text: line });
                }
            }
            text.clear();
        };

        while let Some(open) = rest.find('<') {
            text.push_str(&rest[..open]);
            let Some(close) = rest[open..].find('>') else {
                text.push_str(&rest[open..]);
                rest = "";
                break;
            };
            let tag = &rest[open + 1..open + close];
            let name = tag
                .trim_start_matches('/')
                .split(|c: char| c.is_whitespace() || c == '/')
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();

            match name.as_str() {
                "p" | "div" | "br" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "tr" => text.push('\n'),
                "img" => {
                    if let Some(src) = attribute(tag, "src").filter(|s| is_image_data_uri(s)) {
                        flush(&mut text, &mut blocks);
                        let alt = attribute(tag, "alt").unwrap_or_default();
                        blocks.push(Block::Image { src, alt });
                    }
                }
                _ => {}
            }
            rest = &rest[open + close + 1..];
        }
        text.push_str(rest);
        flush(&mut text, &mut blocks);

        Self { blocks }
    }
}

/// Escape one line of block text so Markdown reads it back literally
fn escape_markdown(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '(' | ')' | '#' | '!' | '<' | '>' | '&' | '~') {
            out.push('\\');
        }
        out.push(c);
    }

    // Line starts that would open a list, quote or setext heading
    let digits = out.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && matches!(out[digits..].chars().next(), Some('.') | Some(')')) {
        out.insert(digits, '\\');
    } else if matches!(out.chars().next(), Some('-') | Some('+') | Some('=')) {
        out.insert(0, '\\');
    }
    out
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let needle = format!("{}=", name);
    // Only a whole attribute name counts (`src=`, not `data-src=`)
    let at = lower.match_indices(&needle).map(|(i, _)| i).find(|&i| {
        lower[..i].chars().next_back().map_or(true, char::is_whitespace)
    })?;
    let value = &tag[at + needle.len()..];
    let quote = value.chars().next()?;
    if quote == '"' || quote == '\'' {
        let end = value[1..].find(quote)?;
        Some(value[1..1 + end].to_string())
    } else {
        Some(value.split_whitespace().next()?.to_string())
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a document to HTML. Pure: the same document always yields the
/// same markup, and no stored text is ever emitted unescaped.
pub fn render_html(doc: &Document) -> String {
    let mut html = String::new();
    for block in &doc.blocks {
        match block {
            Block::Heading { level, text } => {
                let level = (*level).clamp(1, 6);
                html.push_str(&format!("<h{0}>{1}</h{0}>", level, escape_html(text)));
            }
            Block::Paragraph { text } => {
                let lines: Vec<String> = text.split('\n').map(escape_html).collect();
                html.push_str(&format!("<p>{}</p>", lines.join("<br>")));
            }
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                html.push_str(&format!("<{}>", tag));
                for item in items {
                    html.push_str(&format!("<li>{}</li>", escape_html(item)));
                }
                html.push_str(&format!("</{}>", tag));
            }
            Block::Image { src, alt } => {
                if is_image_data_uri(src) {
                    html.push_str(&format!(r#"<img src="{}" alt="{}" class="manual-image" />"#, escape_html(src), escape_html(alt)));
                }
            }
            Block::Attachment { name, src } => {
                if is_data_uri(src) {
                    html.push_str(&format!(
                        r#"<a class="manual-attachment" href="{}" download="{}">📎 {}</a>"#,
                        escape_html(src),
                        escape_html(name),
                        escape_html(name)
                    ));
                }
            }
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_blocks() {
        let doc = Document::from_markdown("# Fechamento\n\nConferir **apuração** do mês.\n\n- ICMS\n- ISS\n\n1. Gerar SPED\n2. Transmitir");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Heading { level: 1, text: "Fechamento".into() },
                Block::Paragraph { text: "Conferir apuração do mês.".into() },
                Block::List { ordered: false, items: vec!["ICMS".into(), "ISS".into()] },
                Block::List { ordered: true, items: vec!["Gerar SPED".into(), "Transmitir".into()] },
            ]
        );
    }

    #[test]
    fn test_inline_image_and_attachment() {
        let doc = Document::from_markdown("Veja:\n\n![tela](data:image/png;base64,AAAA)\n\n[guia.pdf](data:application/pdf;base64,BBBB)");
        assert_eq!(doc.blocks[0], Block::Paragraph { text: "Veja:".into() });
        assert_eq!(doc.blocks[1], Block::Image { src: "data:image/png;base64,AAAA".into(), alt: "tela".into() });
        assert_eq!(doc.blocks[2], Block::Attachment { name: "guia.pdf".into(), src: "data:application/pdf;base64,BBBB".into() });
    }

    #[test]
    fn test_unsafe_sources_are_dropped() {
        let doc = Document::from_markdown("[clique](javascript:alert(1)) e ![x](http://example.com/a.png)");
        assert!(doc.blocks.iter().all(|b| matches!(b, Block::Paragraph { .. })));
        assert!(!render_html(&doc).contains("javascript"));
    }

    #[test]
    fn test_render_escapes_text() {
        let doc = Document::new(vec![Block::Paragraph { text: "<script>alert('x')</script>".into() }]);
        assert_eq!(render_html(&doc), "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>");
    }

    #[test]
    fn test_markdown_round_trip() {
        let doc = Document::from_markdown("## Passos\n\n1. Abrir\n2. Fechar\n\nFim.");
        assert_eq!(Document::from_markdown(&doc.to_markdown()), doc);
    }

    #[test]
    fn test_markdown_round_trip_keeps_literal_symbols() {
        let doc = Document::from_markdown("Use \\*asterisco\\* aqui\n\n1\\. Não é lista");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph { text: "Use *asterisco* aqui".into() },
                Block::Paragraph { text: "1. Não é lista".into() },
            ]
        );
        assert_eq!(Document::from_markdown(&doc.to_markdown()), doc);

        let tricky = Document::new(vec![
            Block::Heading { level: 2, text: "# CFOP_5102 [ver] (nota)".into() },
            Block::Paragraph { text: "- não é item\n+ nem este\n> nem citação".into() },
            Block::Paragraph { text: "a \\ b & c < d `e` ~f~ !g".into() },
            Block::List { ordered: false, items: vec!["2) segundo".into(), "*ênfase*".into()] },
            Block::List { ordered: true, items: vec!["R$ 10,00".into()] },
        ]);
        assert_eq!(Document::from_markdown(&tricky.to_markdown()), tricky);
    }

    #[test]
    fn test_legacy_html_keeps_text_and_images() {
        let doc = Document::from_legacy_html(r#"<h1>Título</h1><p>Texto &amp; mais</p><img src="data:image/png;base64,AA" alt="print"><script>x()</script>"#);
        assert_eq!(doc.blocks[0], Block::Paragraph { text: "Título".into() });
        assert_eq!(doc.blocks[1], Block::Paragraph { text: "Texto & mais".into() });
        assert_eq!(doc.blocks[2], Block::Image { src: "data:image/png;base64,AA".into(), alt: "print".into() });
    }

    #[test]
    fn test_legacy_image_ignores_data_src() {
        let doc = Document::from_legacy_html(r#"<img data-src="lazy.png" src="data:image/png;base64,CC" alt="nf">"#);
        assert_eq!(doc.blocks, vec![Block::Image { src: "data:image/png;base64,CC".into(), alt: "nf".into() }]);
    }

    #[test]
    fn test_serializes_as_block_array() {
        let doc = Document::new(vec![Block::Heading { level: 2, text: "A".into() }]);
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"[{"type":"heading","level":2,"text":"A"}]"#);
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
