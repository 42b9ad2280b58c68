//
// config.rs
//
// Configuration snapshot for path completion
//
// The live configuration is held as an Arc<Config> inside WorldState and is
// replaced as a whole unit on workspace/didChangeConfiguration. A completion
// request clones the Arc once at entry, so it observes a single consistent
// snapshot for its whole lifetime.
//

use glob::Pattern;
use indexmap::IndexMap;
use regex::Regex;

/// An exclusion rule: drop a listed entry whose absolute path matches `item`,
/// but only while the currently edited file matches `when`.
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    pub item: Pattern,
    pub when: Pattern,
}

/// A configured insert-text transformation.
///
/// Applies in configured order. When `when_file_name` is present the rule
/// only fires for entries whose base name matches it. Only the `replace`
/// type exists; it performs a single (non-global) regex substitution.
#[derive(Debug, Clone)]
pub struct Transformation {
    pub when_file_name: Option<Regex>,
    pub pattern: Regex,
    pub replacement: String,
}

/// Immutable configuration snapshot.
#[derive(Debug, Clone)]
pub struct Config {
    /// Keep the file extension in the inserted text (`extensionOnImport`)
    pub with_extension_on_insert: bool,
    /// Exclusion rules in configured order
    pub excluded_items: Vec<ExclusionRule>,
    /// Alias prefix -> target path template, in configured order.
    /// Targets may contain `${workspace}` and `${home}` placeholders.
    pub path_mappings: IndexMap<String, String>,
    /// Insert-text transformations in configured order
    pub transformations: Vec<Transformation>,
    /// Skip the quote-state gate and always provide completions
    pub trigger_outside_strings: bool,
    /// Re-trigger completion after inserting a directory candidate
    pub enable_folder_trailing_slash: bool,
    /// Expansion target for `~` fragments and the `${home}` placeholder
    pub home_directory: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            with_extension_on_insert: false,
            excluded_items: Vec::new(),
            path_mappings: IndexMap::new(),
            transformations: Vec::new(),
            trigger_outside_strings: false,
            enable_folder_trailing_slash: false,
            home_directory: detect_home_directory(),
        }
    }
}

/// Read the home directory from the environment (USERPROFILE on Windows,
/// HOME elsewhere). Empty when neither is set.
fn detect_home_directory() -> String {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var(var).unwrap_or_default()
}

/// Parse the `pathsense` section of LSP settings into a Config.
///
/// Only fields present in the JSON are applied; absent fields keep their
/// defaults from `Config::default()`. Invalid regex or glob patterns are
/// skipped with a warning rather than failing the whole configuration.
///
/// Returns `None` when the `pathsense` section is missing, in which case the
/// caller keeps the previously applied configuration.
pub fn parse_config(settings: &serde_json::Value) -> Option<Config> {
    let section = settings.get("pathsense")?;

    let mut config = Config::default();

    if let Some(v) = section.get("extensionOnImport").and_then(|v| v.as_bool()) {
        config.with_extension_on_insert = v;
    }
    if let Some(v) = section
        .get("triggerOutsideStrings")
        .and_then(|v| v.as_bool())
    {
        config.trigger_outside_strings = v;
    }
    if let Some(v) = section
        .get("enableFolderTrailingSlash")
        .and_then(|v| v.as_bool())
    {
        config.enable_folder_trailing_slash = v;
    }
    if let Some(v) = section.get("homeDirectory").and_then(|v| v.as_str()) {
        if !v.is_empty() {
            config.home_directory = v.to_string();
        }
    }

    // pathMappings: JSON object order is preserved (serde_json preserve_order),
    // and mapping precedence follows that order.
    if let Some(mappings) = section.get("pathMappings").and_then(|v| v.as_object()) {
        for (alias, target) in mappings {
            if let Some(target) = target.as_str() {
                config
                    .path_mappings
                    .insert(alias.clone(), target.to_string());
            } else {
                log::warn!("pathMappings entry '{}' is not a string, skipping", alias);
            }
        }
    }

    // excludedItems: { "<item glob>": { "when": "<file glob>" } }
    if let Some(items) = section.get("excludedItems").and_then(|v| v.as_object()) {
        for (item_glob, rule) in items {
            let Some(when_glob) = rule.get("when").and_then(|v| v.as_str()) else {
                log::warn!("excludedItems entry '{}' has no 'when' glob, skipping", item_glob);
                continue;
            };
            match (Pattern::new(item_glob), Pattern::new(when_glob)) {
                (Ok(item), Ok(when)) => config.excluded_items.push(ExclusionRule { item, when }),
                _ => {
                    log::warn!(
                        "excludedItems entry '{}' (when '{}') has an invalid glob, skipping",
                        item_glob,
                        when_glob
                    );
                }
            }
        }
    }

    // transformations: [{ "when": { "fileName": re }, "type": "replace",
    //                     "parameters": [pattern, replacement] }]
    if let Some(transforms) = section.get("transformations").and_then(|v| v.as_array()) {
        for transform in transforms {
            if let Some(t) = parse_transformation(transform) {
                config.transformations.push(t);
            }
        }
    }

    log::info!("Path completion configuration loaded from LSP settings:");
    log::info!("  extension_on_import: {}", config.with_extension_on_insert);
    log::info!("  trigger_outside_strings: {}", config.trigger_outside_strings);
    log::info!(
        "  enable_folder_trailing_slash: {}",
        config.enable_folder_trailing_slash
    );
    log::info!("  path_mappings: {}", config.path_mappings.len());
    log::info!("  excluded_items: {}", config.excluded_items.len());
    log::info!("  transformations: {}", config.transformations.len());

    Some(config)
}

/// Parse a single transformation entry. Entries with an unsupported type or
/// an invalid pattern are no-ops, so they are dropped here.
fn parse_transformation(value: &serde_json::Value) -> Option<Transformation> {
    let kind = value.get("type").and_then(|v| v.as_str()).unwrap_or("");
    if kind != "replace" {
        log::warn!("Unsupported transformation type '{}', ignoring", kind);
        return None;
    }

    let parameters = value.get("parameters").and_then(|v| v.as_array())?;
    let pattern_src = parameters.first().and_then(|v| v.as_str())?;
    let replacement = parameters
        .get(1)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let pattern = match Regex::new(pattern_src) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("Invalid transformation pattern '{}': {}", pattern_src, e);
            return None;
        }
    };

    let when_file_name = match value
        .get("when")
        .and_then(|w| w.get("fileName"))
        .and_then(|v| v.as_str())
    {
        Some(src) => match Regex::new(src) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Invalid transformation fileName regex '{}': {}", src, e);
                return None;
            }
        },
        None => None,
    };

    Some(Transformation {
        when_file_name,
        pattern,
        replacement,
    })
}
