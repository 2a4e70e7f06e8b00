use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());

const ELLIPSIS_GLYPHS: [char; 2] = ['…', '⋯'];
const DOTS: [char; 2] = ['.', '．'];

/// Cleans up a stop or route name scraped from a page.
///
/// Decodes leftover HTML entities, trims whitespace and drops the trailing ellipsis the
/// pages use for names that were cut short. Returns `None` if nothing is left.
///
/// Running it on its own output changes nothing.
pub fn normalize_name(raw: &str) -> Option<String> {
    let mut name = raw.to_string();

    loop {
        let decoded = decode_entities(&name);
        let next = strip_trailing_ellipsis(decoded.trim()).trim_end().to_string();

        if next == name {
            break;
        }
        name = next;
    }

    if name.is_empty() { None } else { Some(name) }
}

/// Decodes the entities the pages are known to double escape, plus numeric ones.
/// Unknown named entities are left alone.
fn decode_entities(s: &str) -> Cow<'_, str> {
    ENTITY_PATTERN.replace_all(s, |caps: &Captures| {
        let entity = &caps[1];

        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            "hellip" => Some('…'),
            _ => entity.strip_prefix('#').and_then(|number| {
                let code = match number.strip_prefix(&['x', 'X'][..]) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse().ok(),
                };
                code.and_then(char::from_u32)
            }),
        };

        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Drops the trailing run of dots and ellipsis glyphs, in any mix. A lone trailing dot
/// is kept ("Sta."), two or more dots or any glyph make it an ellipsis.
fn strip_trailing_ellipsis(name: &str) -> &str {
    let stripped = name.trim_end_matches(|c| ELLIPSIS_GLYPHS.contains(&c) || DOTS.contains(&c));
    let run = &name[stripped.len()..];

    if run.contains(&ELLIPSIS_GLYPHS[..]) || run.chars().count() >= 2 {
        stripped
    } else {
        name
    }
}
