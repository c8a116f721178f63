//! Turns rough session notes into structured journal entries and digests
//! a campaign's entries into a summary.

use crate::models::Journal;

pub const MAX_EVENTS_IN_SUMMARY: usize = 10;
pub const EMPTY_SUMMARY: &str = "No entries to summarize.";

const BULLETS: [char; 3] = ['-', '•', '*'];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedEntry {
    pub title: String,
    pub content: String,
    pub characters: Vec<String>,
    pub locations: Vec<String>,
    pub key_events: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Title,
    Content,
    Characters,
    Locations,
    Events,
}

fn section_marker(line: &str) -> Option<Section> {
    if !line.contains(':') {
        return None;
    }
    let lower = line.to_lowercase();
    if lower.contains("character") {
        Some(Section::Characters)
    } else if lower.contains("location") {
        Some(Section::Locations)
    } else if lower.contains("event") || lower.contains("key moment") {
        Some(Section::Events)
    } else {
        None
    }
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| BULLETS.contains(&c) || c.is_whitespace())
        .trim()
}

fn split_inline(items: &str) -> impl Iterator<Item = String> + '_ {
    items
        .split(',')
        .map(strip_bullet)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

/// Structures notes line by line. The first non-empty line is the title;
/// lines after it are narrative until a "Characters:", "Locations:" or
/// "Events:"/"Key moments:" marker switches the current list.
pub fn parse_notes(notes: &str, session_number: Option<u32>) -> ParsedEntry {
    let mut entry = ParsedEntry::default();
    let mut content_lines: Vec<&str> = Vec::new();
    let mut section = Section::Title;

    for line in notes.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(marker) = section_marker(line) {
            section = marker;
            // "Characters: Aria, Borin" carries items after the colon
            if let Some((_, rest)) = line.split_once(':') {
                let items = split_inline(rest);
                match marker {
                    Section::Characters => entry.characters.extend(items),
                    Section::Locations => entry.locations.extend(items),
                    Section::Events => entry.key_events.extend(items),
                    Section::Title | Section::Content => {}
                }
            }
            continue;
        }

        match section {
            Section::Title => {
                entry.title = line
                    .replace("Title:", "")
                    .replace("**", "")
                    .replace('#', "")
                    .trim()
                    .to_string();
                section = Section::Content;
            }
            Section::Content => content_lines.push(line),
            Section::Characters => push_item(&mut entry.characters, line),
            Section::Locations => push_item(&mut entry.locations, line),
            Section::Events => push_item(&mut entry.key_events, line),
        }
    }

    if entry.title.is_empty() {
        entry.title = match session_number {
            Some(n) => format!("Session {}", n),
            None => "Adventure Log".to_string(),
        };
    }

    entry.content = if content_lines.is_empty() {
        notes.trim().to_string()
    } else {
        content_lines.join("\n\n")
    };

    entry
}

fn push_item(list: &mut Vec<String>, line: &str) {
    let item = strip_bullet(line);
    if !item.is_empty() {
        list.push(item.to_string());
    }
}

fn or_unknown(items: &[String]) -> String {
    if items.is_empty() {
        "Unknown".to_string()
    } else {
        items.join(", ")
    }
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Digest of a campaign's journal entries in the order given.
pub fn summarize(entries: &[Journal]) -> String {
    if entries.is_empty() {
        return EMPTY_SUMMARY.to_string();
    }

    let mut lines = vec![format!("Campaign spanning {} sessions:", entries.len()), String::new()];
    let mut characters: Vec<String> = Vec::new();
    let mut locations: Vec<String> = Vec::new();
    let mut events: Vec<&str> = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let number = entry
            .session_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| (index + 1).to_string());
        lines.push(format!("Session {}: {}", number, entry.title));

        for character in &entry.characters {
            push_unique(&mut characters, character);
        }
        for location in &entry.locations {
            push_unique(&mut locations, location);
        }
        events.extend(entry.key_events.iter().map(String::as_str));
    }

    lines.push(String::new());
    lines.push(format!("Main Characters: {}", or_unknown(&characters)));
    lines.push(format!("Locations: {}", or_unknown(&locations)));

    if !events.is_empty() {
        lines.push(String::new());
        lines.push("Major Events:".to_string());
        for event in events.into_iter().take(MAX_EVENTS_IN_SUMMARY) {
            lines.push(format!("- {}", event));
        }
    }

    lines.join("\n")
}
