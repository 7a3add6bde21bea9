//! Absorption-edge classification for the legacy element/edge fields.
//!
//! Older start records stored the element symbol in the `edge` field and left
//! `element` empty. Re-exporting those runs must move the symbol back and
//! derive the edge from which soft x-ray window the element falls in.

/// Elements measured at their K edge
pub const K_EDGE_ELEMENTS: &[&str] = &["b", "c", "n", "o", "f", "ne", "na", "mg", "al", "si"];

/// Elements measured at their L edges
pub const L_EDGE_ELEMENTS: &[&str] = &[
    "p", "s", "cl", "ar", "k", "ca", "sc", "ti", "v", "cr", "mn", "fe", "co", "ni", "cu", "zn",
    "ga", "ge", "as", "se", "br",
];

/// Elements measured at their M edges
pub const M_EDGE_ELEMENTS: &[&str] = &[
    "la", "ce", "pr", "nd", "pm", "sm", "eu", "gd", "tb", "dy", "ho", "er", "tm", "yb", "lu",
];

/// Edge category for an element symbol, if it is in one of the known sets
pub fn edge_for_element(symbol: &str) -> Option<&'static str> {
    let symbol = symbol.trim().to_ascii_lowercase();
    [
        ("K", K_EDGE_ELEMENTS),
        ("L", L_EDGE_ELEMENTS),
        ("M", M_EDGE_ELEMENTS),
    ]
    .into_iter()
    .find(|(_, set)| set.contains(&symbol.as_str()))
    .map(|(edge, _)| edge)
}

/// Apply the legacy element/edge remap.
///
/// Only triggers when `symbol` is empty and `edge` is not: the edge value is
/// taken as the symbol and the edge is re-derived (empty when unknown).
pub fn normalize_element_edge(symbol: &str, edge: &str) -> (String, String) {
    if symbol.is_empty() && !edge.is_empty() {
        let derived = edge_for_element(edge).unwrap_or("");
        (edge.to_string(), derived.to_string())
    } else {
        (symbol.to_string(), edge.to_string())
    }
}
