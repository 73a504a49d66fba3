//! Status enums for marketplace entities and the admin actions that move
//! between them.
//!
//! Every status is stored in the backend as a lowercase text column, so all
//! of these serialize as `snake_case` strings and round-trip through
//! `Display`/`FromStr`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A status or action string that is not one of the allowed values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} value '{value}'. Must be one of: {allowed}")]
pub struct InvalidValue {
    /// What was being parsed (e.g. "product status").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Comma-separated list of accepted values.
    pub allowed: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            /// Accepted values joined with `", "`.
            #[must_use]
            pub fn allowed_values() -> String {
                Self::ALL
                    .iter()
                    .map(Self::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = InvalidValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(InvalidValue {
                        kind: $kind,
                        value: s.to_owned(),
                        allowed: Self::allowed_values(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Listing lifecycle. Only `active` listings are shown in the catalog.
    ProductStatus, "product status" {
        Active => "active",
        Deleted => "deleted",
        Sold => "sold",
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        Self::Active
    }
}

text_enum! {
    /// Order lifecycle.
    OrderStatus, "order status" {
        Pending => "pending",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

text_enum! {
    /// Abuse report lifecycle.
    ReportStatus, "report status" {
        Pending => "pending",
        Resolved => "resolved",
        Dismissed => "dismissed",
    }
}

impl Default for ReportStatus {
    fn default() -> Self {
        Self::Pending
    }
}

text_enum! {
    /// Account standing, managed from the admin console.
    UserStatus, "user status" {
        Active => "active",
        Suspended => "suspended",
        Banned => "banned",
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

text_enum! {
    /// Admin action on a user account.
    UserAction, "user action" {
        Suspend => "suspend",
        Ban => "ban",
        Activate => "activate",
    }
}

impl UserAction {
    /// The account status this action results in.
    #[must_use]
    pub const fn target_status(self) -> UserStatus {
        match self {
            Self::Activate => UserStatus::Active,
            Self::Suspend => UserStatus::Suspended,
            Self::Ban => UserStatus::Banned,
        }
    }
}

text_enum! {
    /// Admin action on a listing.
    ProductAction, "product action" {
        Delete => "delete",
        Restore => "restore",
    }
}

impl ProductAction {
    /// The listing status this action results in.
    #[must_use]
    pub const fn target_status(self) -> ProductStatus {
        match self {
            Self::Delete => ProductStatus::Deleted,
            Self::Restore => ProductStatus::Active,
        }
    }
}

text_enum! {
    /// Admin action on an abuse report.
    ReportAction, "report action" {
        Resolve => "resolve",
        Dismiss => "dismiss",
    }
}

impl ReportAction {
    /// The report status this action results in.
    #[must_use]
    pub const fn target_status(self) -> ReportStatus {
        match self {
            Self::Resolve => ReportStatus::Resolved,
            Self::Dismiss => ReportStatus::Dismissed,
        }
    }
}
