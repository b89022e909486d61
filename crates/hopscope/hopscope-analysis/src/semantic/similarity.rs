//! Deterministic similarity heuristics between two graph nodes.
//!
//! Three signals, each in [0, 1]:
//! - name: Jaccard over identifier tokens of `name` (falling back to id)
//! - params: arity agreement plus Jaccard over parameter types from `params`
//! - doc: Jaccard over lowercase words of `doc`
//!
//! The combined score is a weighted mean over the signals present on both
//! nodes.

use std::collections::BTreeSet;

use crate::graph::GraphNode;

pub const NAME_WEIGHT: f64 = 0.5;
pub const PARAMS_WEIGHT: f64 = 0.3;
pub const DOC_WEIGHT: f64 = 0.2;

/// Exact Jaccard similarity. Returns 0.0 if both sets are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Split an identifier into lowercase tokens on separators (`_`, `::`, `.`,
/// anything non-alphanumeric) and camelCase / acronym boundaries.
///
/// `parseHTTPRequest` → {parse, http, request}; `auth::login_user` →
/// {auth, login, user}.
pub fn identifier_tokens(ident: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for word in ident.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = word.chars().collect();
        let mut start = 0;
        for i in 1..chars.len() {
            let prev = chars[i - 1];
            let cur = chars[i];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let boundary = (prev.is_lowercase() && cur.is_uppercase())
                || (prev.is_uppercase() && cur.is_uppercase() && next_is_lower)
                || (prev.is_alphabetic() && cur.is_numeric())
                || (prev.is_numeric() && cur.is_alphabetic());
            if boundary {
                push_token(&mut tokens, &chars[start..i]);
                start = i;
            }
        }
        push_token(&mut tokens, &chars[start..]);
    }
    tokens
}

fn push_token(tokens: &mut BTreeSet<String>, chars: &[char]) {
    if !chars.is_empty() {
        tokens.insert(chars.iter().collect::<String>().to_lowercase());
    }
}

/// Lowercase word set of free text.
pub fn word_set(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Parameter types from a `params` attribute such as
/// `"id: UserId, opts: Options"` or `"UserId, Options"`.
pub fn parameter_types(params: &str) -> Vec<String> {
    params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.rsplit_once(':')
                .map_or(p, |(_, ty)| ty)
                .trim()
                .to_lowercase()
        })
        .collect()
}

pub fn name_similarity(a: &GraphNode, b: &GraphNode) -> f64 {
    jaccard(&identifier_tokens(display_name(a)), &identifier_tokens(display_name(b)))
}

/// `None` when either node lacks a `params` attribute.
pub fn parameter_similarity(a: &GraphNode, b: &GraphNode) -> Option<f64> {
    let pa = parameter_types(a.attr("params")?.as_str()?);
    let pb = parameter_types(b.attr("params")?.as_str()?);
    if pa.is_empty() && pb.is_empty() {
        return Some(1.0);
    }
    let arity = pa.len().min(pb.len()) as f64 / pa.len().max(pb.len()) as f64;
    let ta: BTreeSet<String> = pa.into_iter().collect();
    let tb: BTreeSet<String> = pb.into_iter().collect();
    Some(0.5 * arity + 0.5 * jaccard(&ta, &tb))
}

/// `None` when either node lacks a non-empty `doc` attribute.
pub fn doc_similarity(a: &GraphNode, b: &GraphNode) -> Option<f64> {
    let wa = word_set(a.attr("doc")?.as_str()?);
    let wb = word_set(b.attr("doc")?.as_str()?);
    if wa.is_empty() || wb.is_empty() {
        return None;
    }
    Some(jaccard(&wa, &wb))
}

/// Weighted mean over the signals present on both nodes, in [0, 1].
pub fn similarity(a: &GraphNode, b: &GraphNode) -> f64 {
    let mut total = NAME_WEIGHT * name_similarity(a, b);
    let mut weight = NAME_WEIGHT;
    if let Some(score) = parameter_similarity(a, b) {
        total += PARAMS_WEIGHT * score;
        weight += PARAMS_WEIGHT;
    }
    if let Some(score) = doc_similarity(a, b) {
        total += DOC_WEIGHT * score;
        weight += DOC_WEIGHT;
    }
    (total / weight).clamp(0.0, 1.0)
}

fn display_name(node: &GraphNode) -> &str {
    node.attr("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(&node.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokenizes_mixed_identifiers() {
        assert_eq!(
            identifier_tokens("parseHTTPRequest"),
            set(&["parse", "http", "request"])
        );
        assert_eq!(
            identifier_tokens("auth::login_user"),
            set(&["auth", "login", "user"])
        );
        assert_eq!(identifier_tokens("utf8Decode"), set(&["utf", "8", "decode"]));
        assert!(identifier_tokens("::").is_empty());
    }

    #[test]
    fn parameter_types_strip_names() {
        assert_eq!(
            parameter_types("id: UserId, opts: Options"),
            vec!["userid".to_string(), "options".to_string()]
        );
        assert_eq!(parameter_types(""), Vec::<String>::new());
    }

    #[test]
    fn identical_nodes_score_one() {
        let a = GraphNode::new("a")
            .with_attr("name", "loadUser")
            .with_attr("params", "id: UserId")
            .with_attr("doc", "Load a user by id");
        let b = GraphNode::new("b")
            .with_attr("name", "loadUser")
            .with_attr("params", "id: UserId")
            .with_attr("doc", "Load a user by id");
        assert!((similarity(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_signals_are_renormalized() {
        let a = GraphNode::new("x").with_attr("name", "fetchUser");
        let b = GraphNode::new("y").with_attr("name", "fetchOrder");
        // Only the name signal: {fetch} / {fetch, user, order}.
        assert!((similarity(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn unrelated_nodes_score_zero() {
        let a = GraphNode::new("alpha");
        let b = GraphNode::new("omega");
        assert_eq!(similarity(&a, &b), 0.0);
    }
}
