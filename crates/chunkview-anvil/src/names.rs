//! Parsing of user-typed block name lists such as `stone, grass_block, 'mod:ore'`.

use crate::mapping::NAMESPACE;
use std::iter::Peekable;
use std::str::Chars;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | ' ')
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

/// Resolves one entry. `is_known` is asked about unqualified vanilla names.
fn resolve(raw: &str, is_known: &impl Fn(&str) -> bool) -> Option<String> {
    if let Some(quoted) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        return (!quoted.is_empty()).then(|| quoted.to_owned());
    }
    let name: String = raw.chars().filter(|&c| c != ' ').collect();
    match name.strip_prefix(NAMESPACE) {
        Some(bare) if is_known(bare) => Some(name),
        Some(_) => None,
        None if is_known(&name) => Some(format!("{}{}", NAMESPACE, name)),
        None => None,
    }
}

/// Splits a comma-separated list into fully-qualified names. Bare and
/// `minecraft:` names must be known; single-quoted names are taken verbatim.
/// Any invalid entry or a dangling comma rejects the whole list.
pub fn parse_block_names(raw: &str, is_known: impl Fn(&str) -> bool) -> Option<Vec<String>> {
    let mut chars = raw.chars().peekable();
    let mut names = Vec::new();

    skip_whitespace(&mut chars);
    while chars.peek().is_some() {
        let entry = if chars.next_if_eq(&'\'').is_some() {
            let mut quoted = String::from("'");
            loop {
                match chars.next()? {
                    '\'' => break,
                    c => quoted.push(c),
                }
            }
            quoted.push('\'');
            quoted
        } else {
            let mut simple = String::new();
            while let Some(c) = chars.next_if(|&c| is_name_char(c)) {
                simple.push(c);
            }
            simple
        };

        names.push(resolve(&entry, &is_known)?);

        skip_whitespace(&mut chars);
        if chars.peek().is_some() {
            chars.next_if_eq(&',')?;
            skip_whitespace(&mut chars);
            chars.peek()?;
        }
    }
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(name: &str) -> bool {
        matches!(name, "stone" | "grass_block" | "oak_log")
    }

    #[test]
    fn test_bare_and_qualified() {
        assert_eq!(
            parse_block_names("stone, minecraft:grass_block,oak_log", known),
            Some(vec![
                "minecraft:stone".to_owned(),
                "minecraft:grass_block".to_owned(),
                "minecraft:oak_log".to_owned(),
            ])
        );
    }

    #[test]
    fn test_quoted_passthrough() {
        assert_eq!(
            parse_block_names("'mod:custom block', stone", known),
            Some(vec!["mod:custom block".to_owned(), "minecraft:stone".to_owned()])
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse_block_names("stone,", known), None);
        assert_eq!(parse_block_names("stone, dirt", known), None);
        assert_eq!(parse_block_names("minecraft:dirt", known), None);
        assert_eq!(parse_block_names("'unterminated", known), None);
        assert_eq!(parse_block_names("stone; grass_block", known), None);
        assert_eq!(parse_block_names("''", known), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_block_names("", known), Some(vec![]));
        assert_eq!(parse_block_names("   ", known), Some(vec![]));
    }
}
