//! Allow-list membership checks.

/// Returns true if `requester_id` is present in `allow_list`.
///
/// Linear scan; allow-lists are a handful of IDs and the result does not
/// depend on their order.
///
/// # Examples
///
/// ```
/// use camsnap_core::access::is_allowed;
///
/// assert!(is_allowed(42, &[7, 42]));
/// assert!(!is_allowed(1, &[7, 42]));
/// ```
#[must_use]
pub fn is_allowed(requester_id: i64, allow_list: &[i64]) -> bool {
    allow_list.iter().any(|&id| id == requester_id)
}
