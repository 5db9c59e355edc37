//! Depth-bounded search over JSON values.

use serde_json::Value;

/// Result of a bounded search.
#[derive(Debug, Clone, PartialEq)]
pub enum Search<'a> {
    /// The first matching value and the keys/indices leading to it
    Found { value: &'a Value, path: Vec<String> },
    NotFound,
}

impl<'a> Search<'a> {
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Search::Found { value, .. } => Some(value),
            Search::NotFound => None,
        }
    }

    /// Dotted path to the match, e.g. `props.pageProps.recipe`.
    pub fn path_string(&self) -> Option<String> {
        match self {
            Search::Found { path, .. } => Some(path.join(".")),
            Search::NotFound => None,
        }
    }
}

/// Depth-first search for the first value matching `matches`.
///
/// The root sits at depth 0; nothing deeper than `max_depth` is visited. A
/// match beyond the bound is reported as `NotFound`.
pub fn search<'a>(
    value: &'a Value,
    max_depth: usize,
    matches: &dyn Fn(&Value) -> bool,
) -> Search<'a> {
    let mut path = Vec::new();
    visit(value, max_depth, &mut path, matches)
}

fn visit<'a>(
    value: &'a Value,
    remaining: usize,
    path: &mut Vec<String>,
    matches: &dyn Fn(&Value) -> bool,
) -> Search<'a> {
    if matches(value) {
        return Search::Found {
            value,
            path: path.clone(),
        };
    }
    if remaining == 0 {
        return Search::NotFound;
    }

    match value {
        Value::Object(map) => {
            // @graph holds the page's entities; look there before anything else
            let graph = map.get("@graph").map(|v| ("@graph", v));
            let rest = map
                .iter()
                .filter(|(k, _)| k.as_str() != "@graph")
                .map(|(k, v)| (k.as_str(), v));
            for (key, child) in graph.into_iter().chain(rest) {
                if !matches!(child, Value::Object(_) | Value::Array(_)) {
                    continue;
                }
                path.push(key.to_string());
                let found = visit(child, remaining - 1, path, matches);
                path.pop();
                if found != Search::NotFound {
                    return found;
                }
            }
            Search::NotFound
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                path.push(i.to_string());
                let found = visit(child, remaining - 1, path, matches);
                path.pop();
                if found != Search::NotFound {
                    return found;
                }
            }
            Search::NotFound
        }
        _ => Search::NotFound,
    }
}
