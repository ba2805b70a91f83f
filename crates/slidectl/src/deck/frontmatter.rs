use super::DeckMeta;

/// Extract YAML frontmatter delimited by `---` lines at the very top of the file.
/// Returns the parsed metadata and the remaining body. Malformed frontmatter is
/// logged and treated as empty metadata.
pub fn extract(content: &str) -> (DeckMeta, String) {
    let content = content.replace("\r\n", "\n");
    let Some(rest) = content.strip_prefix("---\n") else {
        return (DeckMeta::default(), content);
    };

    let Some(end) = find_closing(rest) else {
        return (DeckMeta::default(), content);
    };

    let yaml = &rest[..end];
    let body = rest[end..]
        .split_once('\n')
        .map(|(_, body)| body)
        .unwrap_or("")
        .to_string();

    let meta = if yaml.trim().is_empty() {
        DeckMeta::default()
    } else {
        serde_yaml::from_str(yaml).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed frontmatter: {e}");
            DeckMeta::default()
        })
    };

    (meta, body)
}

/// Byte offset of the closing `---` line within `rest`.
fn find_closing(rest: &str) -> Option<usize> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}
