//! Tests for listfile parsing.

use std::io::{self, BufRead, BufReader, Read};

use super::*;

const PREFIX: &str = "https://www.curseforge.com/minecraft/mc-mods/";

fn parse_ids(text: &str) -> Result<Directives, ParseError> {
    parse(text.as_bytes(), &ListFormat::Ids)
}

fn parse_urls(text: &str) -> Result<Directives, ParseError> {
    parse(
        text.as_bytes(),
        &ListFormat::Urls {
            prefix: PREFIX.to_string(),
        },
    )
}

fn ids(directives: &Directives) -> Vec<u64> {
    directives
        .entries
        .iter()
        .map(|e| e.key.as_id().unwrap())
        .collect()
}

fn patterns(directives: &Directives) -> Vec<&str> {
    directives.exclusions.iter().map(|r| r.as_str()).collect()
}

#[test]
fn ids_keep_first_appearance_order() {
    let d = parse_ids(
        "version 1.12.2

         # jei
         238222

         # shadowfacts-forgelin
         248453
         # dimitrodam-test
         321466",
    )
    .unwrap();
    assert_eq!(ids(&d), vec![238222, 248453, 321466]);
    assert!(d.exclusions.is_empty());
    assert_eq!(d.version.as_str(), "1.12.2");
    assert!(d.entries.iter().all(|e| e.selector == Selector::Latest));
}

#[test]
fn order_is_not_sorted() {
    let d = parse_ids("version 1.12.2\n900\n100\n500").unwrap();
    assert_eq!(ids(&d), vec![900, 100, 500]);
}

#[test]
fn excludes_are_compiled_in_order() {
    let d = parse_ids(
        "version 1.12.2

         exclude ^OptiFine.*\\.jar$
         exclude ^Computronics.*\\.jar$",
    )
    .unwrap();
    assert!(d.entries.is_empty());
    assert_eq!(
        patterns(&d),
        vec!["^OptiFine.*\\.jar$", "^Computronics.*\\.jar$"]
    );
    assert!(d.is_excluded("OptiFine_1.12.2_HD_U_E3.jar"));
    assert!(!d.is_excluded("jei_1.12.2-4.16.1.301.jar"));
}

#[test]
fn comments_and_blank_lines_only() {
    let d = parse_ids(
        "version 1.12.2

         #comment

         #
         ## comment with space",
    )
    .unwrap();
    assert!(d.entries.is_empty());
    assert!(d.exclusions.is_empty());
    assert_eq!(d.version.as_str(), "1.12.2");
}

#[test]
fn non_numeric_id_is_invalid_syntax() {
    let err = parse_ids("version 1.12.2\n\ncofhcore").unwrap_err();
    match err {
        ParseError::InvalidSyntax { line_no, line } => {
            assert_eq!(line_no, 3);
            assert_eq!(line, "cofhcore");
        }
        other => panic!("expected InvalidSyntax, got {other:?}"),
    }
    assert!(matches!(
        parse_ids("version 1.12.2\nhttps://somedifferentprefix"),
        Err(ParseError::InvalidSyntax { .. })
    ));
}

#[test]
fn too_many_tokens_is_invalid_syntax() {
    assert!(matches!(
        parse_ids("version 1.12.2\n238222 beta 12345"),
        Err(ParseError::InvalidSyntax { .. })
    ));
}

#[test]
fn invalid_patterns_are_rejected() {
    for pattern in ["(", "?", "(?"] {
        let err = parse_ids(&format!("version 1.12.2\nexclude {pattern}")).unwrap_err();
        match err {
            ParseError::InvalidPattern { line, .. } => {
                assert_eq!(line, format!("exclude {pattern}"));
            }
            other => panic!("pattern {pattern:?}: expected InvalidPattern, got {other:?}"),
        }
    }
}

#[test]
fn duplicate_ids_are_rejected_across_comments() {
    let err = parse_ids(
        "version 1.12.2

         238222
         # same again

         238222",
    )
    .unwrap_err();
    match err {
        ParseError::DuplicateEntry { line_no, line } => {
            assert_eq!(line_no, 6);
            assert_eq!(line, "238222");
        }
        other => panic!("expected DuplicateEntry, got {other:?}"),
    }
}

#[test]
fn duplicate_id_with_different_selector_is_rejected() {
    assert!(matches!(
        parse_ids("version 1.12.2\n238222\n238222 beta"),
        Err(ParseError::DuplicateEntry { .. })
    ));
}

#[test]
fn missing_version_fails() {
    assert!(matches!(
        parse_ids("238222"),
        Err(ParseError::MissingVersion)
    ));
    assert!(matches!(parse_ids(""), Err(ParseError::MissingVersion)));
}

#[test]
fn duplicate_version_fails() {
    let err = parse_ids("version 1.12.2\n238222\nversion 1.12.2").unwrap_err();
    match err {
        ParseError::DuplicateVersion { line_no, .. } => assert_eq!(line_no, 3),
        other => panic!("expected DuplicateVersion, got {other:?}"),
    }
}

#[test]
fn version_may_come_last() {
    let d = parse_ids("238222\nversion 1.16.5 Fabric").unwrap();
    assert_eq!(ids(&d), vec![238222]);
    assert_eq!(d.version.tokens().collect::<Vec<_>>(), vec!["1.16.5", "Fabric"]);
}

#[test]
fn pinned_file_version() {
    let d = parse_ids("version 1.12.2\n\n292785 2639533").unwrap();
    assert_eq!(
        d.entries,
        vec![Entry {
            key: EntryKey::Id(292785),
            selector: Selector::Pinned(2639533),
        }]
    );
    assert!(d.entries[0].is_pinned());
}

#[test]
fn release_channels() {
    let d = parse_ids(
        "version 1.12.2

         69162 release
         239286 beta
         238222 alpha",
    )
    .unwrap();
    let selectors: Vec<Selector> = d.entries.iter().map(|e| e.selector).collect();
    assert_eq!(
        selectors,
        vec![
            Selector::Channel(Channel::Release),
            Selector::Channel(Channel::Beta),
            Selector::Channel(Channel::Alpha),
        ]
    );
}

#[test]
fn unknown_release_types_fail() {
    for line in ["69162 re1ease", "239286 Beta", "238222 ALPHA"] {
        let err = parse_ids(&format!("version 1.12.2\n{line}")).unwrap_err();
        match err {
            ParseError::UnknownReleaseType { token, .. } => {
                assert_eq!(token, line.split_whitespace().nth(1).unwrap());
            }
            other => panic!("{line}: expected UnknownReleaseType, got {other:?}"),
        }
    }
}

#[test]
fn mixed_listfile() {
    let d = parse_ids(
        "version 1.12.2

         ## Not dependencies of my mod
         # jei
         238222

         ## We want to keep OptiFine and Computronics.
         exclude ^OptiFine.*\\.jar$
         exclude ^Computronics.*\\.jar$

         ## Thermal mods
         69162
         271384

         ## Miscellaneous mods
         # vanillafix 1.0.10-99
         292785 2639533
         # cyclic
     239286 beta",
    )
    .unwrap();
    assert_eq!(ids(&d), vec![238222, 69162, 271384, 292785, 239286]);
    assert_eq!(d.entries[3].selector, Selector::Pinned(2639533));
    assert_eq!(d.entries[4].selector, Selector::Channel(Channel::Beta));
    assert_eq!(d.exclusions.len(), 2);
}

#[test]
fn urls_get_prefix_and_keep_order() {
    let d = parse_urls(
        "version 1.16.5

         jei
         https://www.curseforge.com/minecraft/mc-mods/appleskin
         # comment
         fabric-api",
    )
    .unwrap();
    let urls: Vec<String> = d.entries.iter().map(|e| e.key.to_string()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{PREFIX}jei"),
            format!("{PREFIX}appleskin"),
            format!("{PREFIX}fabric-api"),
        ]
    );
    assert!(d.warnings.is_empty());
}

#[test]
fn foreign_url_warns_but_parses() {
    let d = parse_urls("version 1.16.5\nhttps://example.com/mods/thing").unwrap();
    assert_eq!(
        d.entries[0].key,
        EntryKey::Url("https://example.com/mods/thing".to_string())
    );
    assert_eq!(d.warnings.len(), 1);
    assert!(d.warnings[0].contains("https://example.com/mods/thing"));
}

#[test]
fn duplicate_normalized_urls_fail() {
    let err = parse_urls(&format!("version 1.16.5\njei\n{PREFIX}jei")).unwrap_err();
    assert!(matches!(err, ParseError::DuplicateEntry { line_no: 3, .. }));
}

/// Reader that yields one valid line and then fails.
struct FailingReader {
    sent: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        }
        self.sent = true;
        let line = b"version 1.12.2\n";
        buf[..line.len()].copy_from_slice(line);
        Ok(line.len())
    }
}

#[test]
fn read_errors_are_io_not_content_errors() {
    let reader: Box<dyn BufRead> = Box::new(BufReader::new(FailingReader { sent: false }));
    let err = parse(reader, &ListFormat::Ids).unwrap_err();
    assert!(matches!(err, ParseError::Io(_)));
    assert!(err.is_io());
    assert!(!ParseError::MissingVersion.is_io());
}

#[test]
fn parse_file_missing_path_is_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_file(&dir.path().join("nope.txt"), &ListFormat::Ids).unwrap_err();
    assert!(matches!(err, ParseError::Open { .. }));
    assert!(err.is_io());
}

#[test]
fn parse_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mods.txt");
    std::fs::write(&path, "version 1.12.2\n238222 beta\n").unwrap();
    let d = parse_file(&path, &ListFormat::Ids).unwrap();
    assert_eq!(ids(&d), vec![238222]);
}
