pub mod frontmatter;
pub mod splitter;

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Deck {
    pub meta: DeckMeta,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub animation_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub items: Vec<Item>,
    /// Raw markdown for this slide.
    pub raw_source: String,
}

/// One animatable element of a slide. Every item takes part in the entrance
/// animation; stagger items additionally get a per-position delay.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Heading { level: u8, text: String },
    Paragraph(String),
    Bullet(String),
    Stagger(String),
    Image { alt: String, path: String },
    Code(String),
}

impl Item {
    pub fn is_stagger(&self) -> bool {
        matches!(self, Item::Stagger(_))
    }
}

impl Slide {
    /// Text of the first heading, if any.
    pub fn title(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            Item::Heading { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn image_paths(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            Item::Image { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }
}

impl Deck {
    pub fn image_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for path in self.slides.iter().flat_map(Slide::image_paths) {
            if !paths.iter().any(|p| p == path) {
                paths.push(path.to_string());
            }
        }
        paths
    }
}

/// How a reloaded deck differs from the one being shown.
#[derive(Debug, PartialEq)]
pub enum DeckEdit {
    Unchanged,
    /// New slides at the end; everything before them is untouched.
    Appended(Vec<Slide>),
    /// Exactly one slide disappeared at this index.
    Removed(usize),
    Replaced(Vec<Slide>),
}

/// Compare slides by their markdown source.
pub fn diff(old: &[Slide], mut new: Vec<Slide>) -> DeckEdit {
    let same = |a: &Slide, b: &Slide| a.raw_source == b.raw_source;
    let shared = old.iter().zip(&new).take_while(|(a, b)| same(a, b)).count();

    if shared == old.len() && shared == new.len() {
        return DeckEdit::Unchanged;
    }
    if shared == old.len() {
        return DeckEdit::Appended(new.split_off(shared));
    }
    if new.len() + 1 == old.len()
        && old[shared + 1..]
            .iter()
            .zip(&new[shared..])
            .all(|(a, b)| same(a, b))
    {
        return DeckEdit::Removed(shared);
    }
    DeckEdit::Replaced(new)
}

pub fn load(path: &Path) -> anyhow::Result<Deck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read deck {}", path.display()))?;
    Ok(parse(&content))
}

pub fn parse(content: &str) -> Deck {
    let (meta, body) = frontmatter::extract(content);
    let slides = splitter::split(&body)
        .into_iter()
        .map(|raw| Slide {
            items: parse_items(&raw),
            raw_source: raw,
        })
        .filter(|slide| !slide.items.is_empty())
        .collect();
    Deck { meta, slides }
}

fn parse_items(raw: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut code: Option<Vec<&str>> = None;

    for line in raw.lines() {
        let trimmed = line.trim();

        if splitter::is_fence(trimmed) {
            match code.take() {
                Some(lines) => items.push(Item::Code(lines.join("\n"))),
                None => code = Some(Vec::new()),
            }
            continue;
        }
        if let Some(lines) = code.as_mut() {
            lines.push(line);
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }
        items.push(parse_line(trimmed));
    }

    // An unterminated fence still shows its content
    if let Some(lines) = code {
        items.push(Item::Code(lines.join("\n")));
    }
    items
}

fn parse_line(line: &str) -> Item {
    let level = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&level) && line[level..].starts_with(' ') {
        return Item::Heading {
            level: level as u8,
            text: line[level..].trim().to_string(),
        };
    }
    if let Some(text) = line.strip_prefix("+ ") {
        return Item::Stagger(text.trim().to_string());
    }
    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Item::Bullet(text.trim().to_string());
    }
    if let Some((alt, path)) = parse_image(line) {
        return Item::Image { alt, path };
    }
    Item::Paragraph(line.to_string())
}

/// Parse a `![alt](path)` line.
fn parse_image(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("![")?;
    let (alt, rest) = rest.split_once("](")?;
    let path = rest.strip_suffix(')')?;
    if path.is_empty() {
        return None;
    }
    Some((alt.to_string(), path.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "---\ntitle: Singapore\n---\n\
        # Singapore\n\nThe Lion City\n\n---\n\n\
        # Quick Facts\n\n+ Population 5.9M\n+ Area 734 km²\n+ Founded 1819\n\n\
        # Food\n\n![Chilli crab](images/chilli-crab.jpg)\n\n- Chilli crab\n- Laksa";

    fn slides_of(deck: &str) -> Vec<Slide> {
        parse(deck).slides
    }

    #[test]
    fn test_diff_unchanged() {
        let old = slides_of("# A\n\n# B");
        assert_eq!(diff(&old, slides_of("# A\n\n# B")), DeckEdit::Unchanged);
    }

    #[test]
    fn test_diff_appended() {
        let old = slides_of("# A\n\n# B");
        match diff(&old, slides_of("# A\n\n# B\n\n# C\n\n# D")) {
            DeckEdit::Appended(added) => {
                let names: Vec<_> = added.iter().filter_map(Slide::title).collect();
                assert_eq!(names, vec!["C", "D"]);
            }
            other => panic!("expected appended slides, got {other:?}"),
        }
    }

    #[test]
    fn test_diff_removed() {
        let old = slides_of("# A\n\n# B\n\n# C");
        assert_eq!(diff(&old, slides_of("# A\n\n# C")), DeckEdit::Removed(1));
        assert_eq!(diff(&old, slides_of("# A\n\n# B")), DeckEdit::Removed(2));
        assert_eq!(diff(&old, slides_of("# B\n\n# C")), DeckEdit::Removed(0));
    }

    #[test]
    fn test_diff_edited_slide_replaces_deck() {
        let old = slides_of("# A\n\n# B");
        assert!(matches!(
            diff(&old, slides_of("# A\n\n# B changed")),
            DeckEdit::Replaced(slides) if slides.len() == 2
        ));
        assert!(matches!(
            diff(&old, slides_of("# X")),
            DeckEdit::Replaced(_)
        ));
    }

    #[test]
    fn test_sample_deck_parses() {
        let deck = parse(SAMPLE);
        assert_eq!(deck.meta.title.as_deref(), Some("Singapore"));
        assert_eq!(deck.slides.len(), 3);
        assert_eq!(deck.slides[0].title(), Some("Singapore"));
        assert_eq!(deck.slides[1].title(), Some("Quick Facts"));
        assert_eq!(deck.slides[2].title(), Some("Food"));
    }

    #[test]
    fn test_stagger_items() {
        let deck = parse(SAMPLE);
        let stagger: Vec<_> = deck.slides[1]
            .items
            .iter()
            .filter(|i| i.is_stagger())
            .collect();
        assert_eq!(stagger.len(), 3);
        assert_eq!(deck.slides[1].items[1], Item::Stagger("Population 5.9M".into()));
    }

    #[test]
    fn test_image_items() {
        let deck = parse(SAMPLE);
        assert_eq!(
            deck.slides[2].items[1],
            Item::Image {
                alt: "Chilli crab".into(),
                path: "images/chilli-crab.jpg".into()
            }
        );
        assert_eq!(deck.image_paths(), vec!["images/chilli-crab.jpg".to_string()]);
    }

    #[test]
    fn test_image_paths_are_deduplicated() {
        let deck = parse("![a](x.png)\n\n---\n\n![b](x.png)\n![c](y.png)");
        assert_eq!(deck.image_paths(), vec!["x.png".to_string(), "y.png".to_string()]);
    }

    #[test]
    fn test_heading_levels() {
        let deck = parse("# One\n## Two\n####### Seven");
        let items = &deck.slides[0].items;
        assert_eq!(items[0], Item::Heading { level: 1, text: "One".into() });
        assert_eq!(items[1], Item::Heading { level: 2, text: "Two".into() });
        assert_eq!(items[2], Item::Paragraph("####### Seven".into()));
    }

    #[test]
    fn test_code_block_is_single_item() {
        let deck = parse("# Code\n\n```rust\nfn main() {}\n\nlet x = 1;\n```");
        let items = &deck.slides[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], Item::Code("fn main() {}\n\nlet x = 1;".into()));
    }

    #[test]
    fn test_empty_document_has_no_slides() {
        assert!(parse("").slides.is_empty());
        assert!(parse("---\ntitle: x\n---\n\n\n").slides.is_empty());
    }
}
