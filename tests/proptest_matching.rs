//! Property-based tests for output splitting and ordered matching.
//!
//! Uses proptest to verify that:
//! - Splitting only ever drops the single newline that ends the output
//! - Wildcard patterns consume lines one for one
//! - Any subsequence of the output, escaped, matches in full
//! - Archive fingerprints are stable lowercase SHA-256 hex

use proptest::prelude::*;
use tracing::info;

use anwork_testing::archive::fingerprint::fingerprint_bytes;
use anwork_testing::expect::{match_lines, split_output_lines};

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

fn output_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9 :()\\[\\].*+?-]{0,16}", 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..Default::default()
    })]

    /// Property: rejoining the lines gives back the output minus one trailing newline
    #[test]
    fn split_rejoins_to_input(output in "[a-z\\n]{0,40}") {
        init_test_logging();
        let lines = split_output_lines(&output);
        let expected = output.strip_suffix('\n').unwrap_or(&output);
        prop_assert_eq!(lines.join("\n"), expected);
        if output.is_empty() {
            prop_assert!(lines.is_empty());
        }
    }

    /// Property: no line ever contains a newline
    #[test]
    fn split_lines_have_no_newlines(output in "[a-z\\n]{0,40}") {
        init_test_logging();
        prop_assert!(split_output_lines(&output).iter().all(|l| !l.contains('\n')));
    }

    /// Property: `.*` matches every line, so matching stops when either side runs out
    #[test]
    fn wildcards_take_a_prefix(lines in output_lines(), patterns in 0usize..16) {
        init_test_logging();
        let patterns = vec![".*"; patterns];
        let matched = match_lines(&lines, &patterns).expect("valid patterns");

        let expected = lines.len().min(patterns.len());
        info!(lines = lines.len(), patterns = patterns.len(), matched = matched.len(), "wildcards");
        prop_assert_eq!(matched.len(), expected);
        prop_assert_eq!(&matched[..], &lines[..expected]);
    }

    /// Property: escaped lines picked in order always match in full
    #[test]
    fn escaped_subsequence_matches(
        lines in output_lines(),
        mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        init_test_logging();
        let patterns: Vec<String> = lines
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(line, _)| regex::escape(line))
            .collect();

        let matched = match_lines(&lines, &patterns).expect("escaped patterns compile");
        prop_assert_eq!(matched.len(), patterns.len());
        for (line, pattern) in matched.iter().zip(&patterns) {
            let re = regex::Regex::new(pattern).expect("escaped pattern");
            prop_assert!(re.is_match(line));
        }
    }

    /// Property: matched lines appear in the output in the same order
    #[test]
    fn matched_lines_are_an_ordered_subsequence(
        lines in output_lines(),
        patterns in prop::collection::vec("[a-z]{0,2}", 0..6),
    ) {
        init_test_logging();
        let matched = match_lines(&lines, &patterns).expect("plain patterns");
        prop_assert!(matched.len() <= patterns.len());

        let mut rest = lines.iter();
        for line in &matched {
            prop_assert!(rest.any(|l| l == line), "{line:?} out of order");
        }
    }

    /// Property: fingerprints are deterministic 64-char lowercase hex
    #[test]
    fn fingerprint_is_stable_hex(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        init_test_logging();
        let first = fingerprint_bytes(&bytes);
        prop_assert_eq!(first.len(), 64);
        prop_assert!(first.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        prop_assert_eq!(first, fingerprint_bytes(&bytes));
    }
}
