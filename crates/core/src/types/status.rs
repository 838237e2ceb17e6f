//! Role and status enums.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Store administrator with access to `/admin`.
    Admin,
    /// Regular shopper.
    #[default]
    Customer,
}

impl UserRole {
    /// Returns true for administrators.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Order lifecycle status.
///
/// ```text
/// pending ──► paid ──► shipped ──► delivered
///    │          │
///    └──────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Paid,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether an order in this status may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Cancelled)
                | (Self::Paid, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Terminal statuses accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Spanish label shown to shoppers and admins.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Paid => "Pagado",
            Self::Shipped => "Enviado",
            Self::Delivered => "Entregado",
            Self::Cancelled => "Cancelado",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Admin, UserRole::Customer] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
        assert!("root".parse::<UserRole>().is_err());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::default().is_admin());
    }

    #[test]
    fn test_status_parse() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>(), Ok(status));
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_allowed_transitions() {
        use OrderStatus::{Cancelled, Delivered, Paid, Pending, Shipped};

        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Shipped));
        assert!(Paid.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Delivered));

        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal_statuses_are_final() {
        for from in OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }
}
