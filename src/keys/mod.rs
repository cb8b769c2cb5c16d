//! Canonical keys for traces, result dictionaries and output directories.
//!
//! Every per-group artifact (trace entries, summary files, plot directories)
//! is named through this module so that the same species/sex/location slice
//! always lands under the same key, regardless of which pipeline produced it.

use std::path::{Path, PathBuf};

use crate::domain::ClassMetadata;

/// Convert an arbitrary label into a lowercase-with-underscores token.
///
/// Spaces, dots and dashes become underscores; the result is deterministic
/// and idempotent (`snake_case_string(snake_case_string(s)) == snake_case_string(s)`).
pub fn snake_case_string(text: &str) -> String {
    text.trim().replace([' ', '.', '-'], "_").to_lowercase()
}

/// Split a comma-delimited string into trimmed, non-empty tokens.
///
/// Accepts natural-language lists ("age, fork length, and sex"): the `and`
/// connective is stripped. Leading/trailing/doubled commas never produce
/// empty tokens; empty input yields an empty vector.
pub fn parse_comma_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .map(|token| token.strip_prefix("and ").unwrap_or(token).trim())
        .filter(|token| !token.is_empty() && *token != "and")
        .map(str::to_string)
        .collect()
}

/// Compose a unique trace key from a parameter name and a group identity.
///
/// The separator `::` cannot appear in snake-cased segments, so keys for two
/// distinct groups never collide, and repeated calls with identical inputs
/// return identical keys.
pub fn get_trace_dict_key(parameter_name: &str, class_metadata: &ClassMetadata) -> String {
    format!("{parameter_name}::{}", class_metadata.group_key())
}

/// Resolve an output directory segment for a class/order/species name.
///
/// The name is snake-cased for filesystem safety. Nested layouts
/// (`data/<class>/<order>/<species>`) are built by chaining calls.
pub fn get_dir_path(base_dir: &Path, class_name: &str) -> PathBuf {
    base_dir.join(snake_case_string(class_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_handles_species_names() {
        assert_eq!(snake_case_string("Great White Shark"), "great_white_shark");
        assert_eq!(snake_case_string("  C. limbatus "), "c__limbatus");
    }

    #[test]
    fn snake_case_is_idempotent() {
        for s in ["Great White Shark", "blacktip-shark", "A.B c"] {
            let once = snake_case_string(s);
            assert_eq!(snake_case_string(&once), once);
        }
    }

    #[test]
    fn comma_list_drops_empty_tokens() {
        assert_eq!(parse_comma_list("a, b,,c "), vec!["a", "b", "c"]);
        assert_eq!(parse_comma_list(",,"), Vec::<String>::new());
        assert_eq!(parse_comma_list(""), Vec::<String>::new());
    }

    #[test]
    fn comma_list_strips_and_connective() {
        assert_eq!(
            parse_comma_list("new south wales, queensland, and tasmania"),
            vec!["new south wales", "queensland", "tasmania"]
        );
    }

    #[test]
    fn trace_keys_never_collide_across_groups() {
        let a = ClassMetadata::new("shark_a").with_sex("female");
        let b = ClassMetadata::new("shark_b").with_sex("female");
        assert_ne!(get_trace_dict_key("k", &a), get_trace_dict_key("k", &b));
        assert_eq!(get_trace_dict_key("k", &a), get_trace_dict_key("k", &a));
    }

    #[test]
    fn dir_path_snake_cases_the_segment() {
        let p = get_dir_path(Path::new("data"), "Carcharhinus Limbatus");
        assert_eq!(p, Path::new("data").join("carcharhinus_limbatus"));
    }
}
