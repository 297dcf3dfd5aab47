//! Disease Ontology identifier normalization.

/// Canonical DOID prefix.
pub const DOID_PREFIX: &str = "DOID:";

/// Underscore form found in some prediction exports.
pub const DOID_UNDERSCORE_PREFIX: &str = "DOID_";

/// Normalize a disease identifier to the canonical `DOID:<n>` form.
///
/// Every `DOID_` is rewritten to `DOID:`; identifiers already in canonical form
/// pass through unchanged. Identifiers in any other format are returned as-is
/// (no stricter validation is attempted). Idempotent: the output never contains
/// `DOID_`.
pub fn normalize_doid(raw: &str) -> String {
    raw.replace(DOID_UNDERSCORE_PREFIX, DOID_PREFIX)
}
