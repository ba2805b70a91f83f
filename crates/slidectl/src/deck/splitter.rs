/// Split a deck body (after frontmatter extraction) into raw slide strings.
///
/// Three mechanisms create slide breaks:
/// 1. `---` with blank lines on both sides
/// 2. Three or more consecutive blank lines (4+ newlines)
/// 3. A `# ` heading when the current slide already has content
pub fn split(body: &str) -> Vec<String> {
    let body = body.replace("\r\n", "\n");
    let lines: Vec<&str> = body.split('\n').collect();

    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut blank_run = 0;
    let mut in_code_fence = false;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if is_fence(trimmed) {
            in_code_fence = !in_code_fence;
        }

        if !in_code_fence && is_dash_separator(trimmed) {
            let prev_blank = current.last().is_none_or(|l| l.trim().is_empty());
            let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
            if prev_blank && next_blank {
                flush(&mut current, &mut chunks);
                blank_run = 0;
                i += 1;
                continue;
            }
        }

        if !in_code_fence && trimmed.is_empty() {
            blank_run += 1;
            if blank_run == 3 {
                flush(&mut current, &mut chunks);
            }
        } else {
            blank_run = 0;
        }

        current.push(line);
        i += 1;
    }
    flush(&mut current, &mut chunks);

    let mut slides = Vec::new();
    for chunk in chunks {
        split_by_heading_inference(&chunk, &mut slides);
    }
    slides
}

fn flush(current: &mut Vec<&str>, chunks: &mut Vec<String>) {
    let text = current.join("\n").trim().to_string();
    if !text.is_empty() {
        chunks.push(text);
    }
    current.clear();
}

/// Split a chunk by H1 heading inference: when `# ` appears at the start of a line
/// and the current slide already has content, insert a break.
/// Lines inside fenced code blocks are never treated as headings.
fn split_by_heading_inference(chunk: &str, slides: &mut Vec<String>) {
    let mut current = String::new();
    let mut has_content = false;
    let mut in_code_fence = false;

    for line in chunk.lines() {
        let trimmed = line.trim();

        if !in_code_fence && line.starts_with("# ") && has_content {
            let slide_text = current.trim().to_string();
            if !slide_text.is_empty() {
                slides.push(slide_text);
            }
            current.clear();
            has_content = false;
        }

        if is_fence(trimmed) {
            in_code_fence = !in_code_fence;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);

        if !trimmed.is_empty() {
            has_content = true;
        }
    }

    let slide_text = current.trim().to_string();
    if !slide_text.is_empty() {
        slides.push(slide_text);
    }
}

pub(crate) fn is_fence(line: &str) -> bool {
    line.starts_with("```") || line.starts_with("~~~")
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}
