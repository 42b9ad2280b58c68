//
// path_mapping.rs
//
// User-configured alias-prefix substitution for typed path fragments
//

use crate::config::Config;

/// Result of applying the configured path mappings to a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingResult {
    /// The fragment with a matched alias prefix stripped (unchanged when no
    /// mapping matched)
    pub remaining_path: String,
    /// The expanded target directory of the matched mapping, if any
    pub resolved_base_directory: Option<String>,
}

/// Apply the configured path mappings to `fragment`.
///
/// Mapping keys are tried in configured order; the first key the fragment
/// starts with wins and mappings are never combined. The matched target has
/// its `${workspace}` and `${home}` placeholders expanded; `${workspace}` is
/// left as-is when no workspace root is known.
pub fn apply_mapping(fragment: &str, config: &Config, workspace_root: Option<&str>) -> MappingResult {
    for (alias, target) in &config.path_mappings {
        if !fragment.starts_with(alias.as_str()) {
            continue;
        }

        let mut resolved = target.clone();
        if let Some(root) = workspace_root {
            resolved = resolved.replace("${workspace}", root);
        }
        resolved = resolved.replace("${home}", &config.home_directory);

        log::trace!(
            "apply_mapping: alias '{}' matched, base directory '{}'",
            alias,
            resolved
        );

        return MappingResult {
            remaining_path: fragment[alias.len()..].to_string(),
            resolved_base_directory: Some(resolved),
        };
    }

    MappingResult {
        remaining_path: fragment.to_string(),
        resolved_base_directory: None,
    }
}
