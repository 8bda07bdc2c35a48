//! Turns the heading-delimited plaintext returned by the MediaWiki
//! `extracts` module into a lead summary, a readable body and a nested
//! section tree.

use wk_core::{PageContent, RawSection};

struct Heading<'a> {
    depth: usize,
    title: &'a str,
}

/// `== Title ==` is depth 0, `=== Title ===` depth 1, and so on.
fn parse_heading(line: &str) -> Option<Heading<'_>> {
    let line = line.trim();
    let leading = line.chars().take_while(|c| *c == '=').count();
    let trailing = line.chars().rev().take_while(|c| *c == '=').count();
    if leading < 2 || trailing < 2 || leading + trailing >= line.len() {
        return None;
    }
    let title = line[leading..line.len() - trailing].trim();
    if title.is_empty() {
        return None;
    }
    Some(Heading {
        depth: leading.min(trailing) - 2,
        title,
    })
}

struct OpenSection {
    depth: usize,
    section: RawSection,
    lines: Vec<String>,
}

fn close(stack: &mut Vec<OpenSection>, roots: &mut Vec<RawSection>) {
    if let Some(mut open) = stack.pop() {
        open.section.text = open.lines.join("\n").trim().to_string();
        match stack.last_mut() {
            Some(parent) => parent.section.subsections.push(open.section),
            None => roots.push(open.section),
        }
    }
}

pub fn parse_extract(extract: &str) -> PageContent {
    let mut intro = Vec::new();
    let mut body = Vec::new();
    let mut stack: Vec<OpenSection> = Vec::new();
    let mut roots = Vec::new();

    for line in extract.lines() {
        if let Some(heading) = parse_heading(line) {
            while stack.last().is_some_and(|open| open.depth >= heading.depth) {
                close(&mut stack, &mut roots);
            }
            stack.push(OpenSection {
                depth: heading.depth,
                section: RawSection::new(heading.title, ""),
                lines: Vec::new(),
            });
            body.push(heading.title.to_string());
            continue;
        }

        match stack.last_mut() {
            Some(open) => open.lines.push(line.to_string()),
            None => intro.push(line.to_string()),
        }
        body.push(line.to_string());
    }

    while !stack.is_empty() {
        close(&mut stack, &mut roots);
    }

    PageContent {
        summary: intro.join("\n").trim().to_string(),
        full_text: body.join("\n").trim().to_string(),
        sections: roots,
    }
}
