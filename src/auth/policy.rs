//! Caller classes, account kinds and which kinds each class may resolve to.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Trust domain a request authenticated through. Not the account's role.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CallerClass {
    Admin,
    Frontend,
    Mobile,
}

impl CallerClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Frontend => "frontend",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for CallerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored role of an account.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Admin,
    Supplier,
    User,
}

impl AccountKind {
    pub const ALL: [Self; 3] = [Self::Admin, Self::Supplier, Self::User];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Supplier => "supplier",
            Self::User => "user",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ADMIN_BOUNDARY: &[AccountKind] = &[AccountKind::Admin, AccountKind::Supplier];
const OPEN_BOUNDARY: &[AccountKind] = &AccountKind::ALL;

/// Account kinds a caller class may resolve to.
#[must_use]
pub const fn allowed_kinds(class: CallerClass) -> &'static [AccountKind] {
    match class {
        CallerClass::Admin => ADMIN_BOUNDARY,
        CallerClass::Frontend | CallerClass::Mobile => OPEN_BOUNDARY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_class_excludes_users() {
        let kinds = allowed_kinds(CallerClass::Admin);
        assert!(kinds.contains(&AccountKind::Admin));
        assert!(kinds.contains(&AccountKind::Supplier));
        assert!(!kinds.contains(&AccountKind::User));
    }

    #[test]
    fn other_classes_allow_every_kind() {
        for class in [CallerClass::Frontend, CallerClass::Mobile] {
            assert_eq!(allowed_kinds(class), &AccountKind::ALL);
        }
    }

    #[test]
    fn kinds_use_stored_names() {
        assert_eq!(AccountKind::Supplier.to_string(), "supplier");
        assert_eq!(CallerClass::Frontend.to_string(), "frontend");
        assert_eq!(
            serde_json::to_string(&AccountKind::User).unwrap(),
            "\"user\""
        );
    }
}
