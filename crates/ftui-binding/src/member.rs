//! Dot-separated member paths.
//!
//! A binding member such as `"customer.address.city"` names a chain of
//! properties. The registry keys managers by the *path* (everything before the
//! last dot) and the binding itself reads the *field* (the last segment).

/// Normalize a member path for cache keying.
///
/// Member paths are case-insensitive; keys always use the lower-cased form.
#[must_use]
pub fn normalize(member: &str) -> String {
    member.to_lowercase()
}

/// Split a member at its last dot into `(path, field)`.
///
/// `"a.b.c"` → `("a.b", "c")`, `"a"` → `("", "a")`, `""` → `("", "")`.
#[must_use]
pub fn split_last(member: &str) -> (&str, &str) {
    match member.rfind('.') {
        Some(dot) => (&member[..dot], &member[dot + 1..]),
        None => ("", member),
    }
}

/// Parsed form of a binding's data member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingMemberInfo {
    member: String,
    path: String,
    field: String,
}

impl BindingMemberInfo {
    /// Parse a data member string. Case is preserved.
    #[must_use]
    pub fn new(member: impl Into<String>) -> Self {
        let member = member.into();
        let (path, field) = split_last(&member);
        let (path, field) = (path.to_owned(), field.to_owned());
        Self {
            member,
            path,
            field,
        }
    }

    /// The full member string, as given.
    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }

    /// Everything before the last dot; the path whose manager owns the binding.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last segment; the property the binding reads.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl std::fmt::Display for BindingMemberInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.member)
    }
}
