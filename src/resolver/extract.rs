//! Turning a resolved `deps` tree into dependency records.

use crate::core::dep::{DepRecord, DepSet};
use crate::parser::{find_first, find_matching, ExprNode, ManifestError, Pattern, Property};
use crate::resolver::vars::VarTable;
use crate::util::config::SyncConfig;

/// Location prefix of Chromium's GitHub mirrors.
pub const GITHUB_MIRROR: &str = "chromium.googlesource.com/external/github.com";

/// Replacement for [`GITHUB_MIRROR`].
pub const GITHUB: &str = "github.com";

/// Upper bound on `{name}` expansions within one value.
const MAX_EXPANSIONS: usize = 256;

/// Extract the dependency set from a resolved `deps` tree.
pub fn extract_deps(
    tree: &ExprNode,
    vars: &VarTable,
    config: &SyncConfig,
) -> Result<DepSet, ManifestError> {
    let props = match find_first(&Pattern::object(), tree).and_then(|n| n.as_expr()) {
        Some(ExprNode::Object(props)) => props,
        _ => return Err(ManifestError::not_found("an object in `deps`")),
    };

    let mut deps = DepSet::new();

    for prop in props {
        let path = string_key(prop, "`deps`")?;

        let raw = match &prop.value {
            ExprNode::Literal(lit) => lit.as_text(),
            ExprNode::Object(inner) => match url_field(inner)? {
                Some(url) => url,
                None => {
                    tracing::debug!("skipping `{}`: no url", path);
                    continue;
                }
            },
            ExprNode::Identifier(name) => {
                tracing::debug!("skipping `{}`: bound to identifier `{}`", path, name);
                continue;
            }
            other => {
                return Err(ManifestError::unsupported(
                    format!("unsupported value for dependency `{}`", path),
                    &other.to_string(),
                ))
            }
        };

        let value = interpolate(&raw, vars)?;
        let mut record = DepRecord::from_pinned(&path, &value)?;
        rewrite_github(&mut record, &value, &config.no_github);

        if !passes_filter(&path, &config.filter_dirs) {
            tracing::debug!("filtered out `{}`", path);
            continue;
        }

        deps.insert(path, record);
    }

    Ok(deps)
}

/// The `url` field of a dependency object, if present.
///
/// Other fields are ignored, but every key must be a string.
pub fn url_field(props: &[Property]) -> Result<Option<String>, ManifestError> {
    let mut url = None;

    for prop in props {
        if string_key(prop, "dependency object")? != "url" {
            continue;
        }
        match prop.value.as_literal() {
            Some(lit) => url = Some(lit.as_text()),
            None => {
                return Err(ManifestError::unsupported(
                    format!("`url` must be a string, found {}", prop.value.kind()),
                    &prop.value.to_string(),
                ))
            }
        }
    }

    Ok(url)
}

fn string_key(prop: &Property, context: &str) -> Result<String, ManifestError> {
    match prop.key.as_literal() {
        Some(lit) => Ok(lit.as_text()),
        None => Err(ManifestError::unsupported(
            format!("{} key must be a string, found {}", context, prop.key.kind()),
            &prop.key.to_string(),
        )),
    }
}

/// Expand `{name}` occurrences naming known variables.
///
/// Unknown names and unbalanced braces are left as written. Expanded text is
/// scanned again, so values may refer to other variables.
pub fn interpolate(value: &str, vars: &VarTable) -> Result<String, ManifestError> {
    let mut out = value.to_string();
    let mut from = 0;
    let mut expansions = 0;

    while let Some(offset) = out[from..].find('{') {
        let open = from + offset;
        let Ok(close) = find_matching(open, &out) else {
            break;
        };

        let replacement = vars.get(&out[open + 1..close]).map(str::to_owned);
        match replacement {
            Some(replacement) => {
                expansions += 1;
                if expansions > MAX_EXPANSIONS {
                    return Err(ManifestError::unsupported(
                        "variable interpolation does not terminate",
                        value,
                    ));
                }
                out.replace_range(open..=close, &replacement);
                from = open;
            }
            None => from = open + 1,
        }
    }

    Ok(out)
}

/// Point GitHub mirrors back at GitHub unless an exclusion matches `original`.
pub fn rewrite_github(record: &mut DepRecord, original: &str, exclusions: &[String]) {
    if !record.location.contains(GITHUB_MIRROR) {
        return;
    }
    if let Some(hit) = exclusions.iter().find(|ex| original.contains(ex.as_str())) {
        tracing::debug!("keeping mirror for `{}` (no-github `{}`)", record.path, hit);
        return;
    }
    record.location = record.location.replacen(GITHUB_MIRROR, GITHUB, 1);
}

/// Whether `path` survives the `filter-dir` allow-list. Empty means no filter.
pub fn passes_filter(path: &str, filters: &[String]) -> bool {
    filters.is_empty() || filters.iter().any(|f| path.contains(f.as_str()))
}
