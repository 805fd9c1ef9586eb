use super::types::Section;

const PREAMBLE_TITLE: &str = "Introduction";

/// Split markdown into sections at ATX headings.
///
/// Every heading (`#` through `######`) opens a new section whose content runs
/// until the next heading. Non-empty text before the first heading becomes an
/// `Introduction` section. Lines inside fenced code blocks never count as
/// headings.
pub fn split_markdown(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            body.push(line);
            continue;
        }

        if !in_fence && let Some(heading) = heading_text(trimmed) {
            flush(&mut sections, title.take(), &body);
            body.clear();
            title = Some(heading);
            continue;
        }

        body.push(line);
    }

    flush(&mut sections, title, &body);
    sections
}

fn flush(sections: &mut Vec<Section>, title: Option<String>, body: &[&str]) {
    let content = body.join("\n").trim().to_string();
    match title {
        Some(title) => sections.push(Section::new(title, content)),
        None if !content.is_empty() => sections.push(Section::new(PREAMBLE_TITLE, content)),
        None => {}
    }
}

fn heading_text(line: &str) -> Option<String> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    Some(text.to_string())
}
