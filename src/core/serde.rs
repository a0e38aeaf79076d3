//! Serde helper functions for `skip_serializing_if`

/// Skip serializing if Option is None
pub fn is_none<T>(value: &Option<T>) -> bool {
    value.is_none()
}

/// Skip serializing if Vec is empty
pub fn is_empty_vec<T>(value: &Vec<T>) -> bool {
    value.is_empty()
}

/// Skip serializing if bool is false
pub fn is_false(value: &bool) -> bool {
    !*value
}
