use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Inr,
    Cad,
    Aud,
    Jpy,
}

/// A member as rendered on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub mod scope {
    use super::*;

    /// Kind of shared-spending scope. Both kinds share the same settlement
    /// logic; they are separate collections only.
    ///
    /// Serialized as the URL segment: `trips` or `groups`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ScopeKind {
        Trips,
        Groups,
    }

    impl ScopeKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Trips => "trips",
                Self::Groups => "groups",
            }
        }
    }

    /// Request body for creating a trip or group.
    ///
    /// `created_by` becomes the first member, with the `admin` role.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScopeNew {
        pub name: String,
        pub description: Option<String>,
        pub currency: Option<Currency>,
        pub created_by: MemberRef,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScopeCreated {
        pub id: Uuid,
    }

    /// Request body for updating a trip or group. Missing fields are left
    /// unchanged; a blank `description` clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ScopeUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub currency: Option<Currency>,
    }

    /// Response body for listing trips or groups, newest first.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScopeListResponse {
        pub scopes: Vec<ScopeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScopeView {
        pub id: Uuid,
        pub kind: ScopeKind,
        pub name: String,
        pub description: Option<String>,
        pub currency: Currency,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
        pub members: Vec<super::membership::MemberView>,
    }
}

pub mod membership {
    use super::*;

    /// Role of a member in a trip or group. Roles never affect balances.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MembershipRole {
        Admin,
        #[default]
        Member,
    }

    impl MembershipRole {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Admin => "admin",
                Self::Member => "member",
            }
        }
    }

    /// Request body for adding a member.
    ///
    /// When `id` is missing the server assigns a fresh one.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub id: Option<Uuid>,
        pub name: String,
        pub email: String,
        #[serde(default)]
        pub role: MembershipRole,
    }

    /// Response body for listing members.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    /// A member with their role.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub member: MemberRef,
        pub role: MembershipRole,
        pub joined_at: DateTime<Utc>,
    }
}

pub mod expense {
    use super::*;

    /// Explicit share of an expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareNew {
        pub member_id: Uuid,
        pub amount_minor: i64,
        pub percentage: Option<f64>,
    }

    /// Shared expense with explicit shares (they must add up to the amount).
    ///
    /// Also the body of an expense update, which replaces every field.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount_minor: i64,
        pub description: String,
        pub category: Option<String>,
        pub date: Option<DateTime<Utc>>,
        pub paid_by: Uuid,
        pub split_between: Vec<ShareNew>,
    }

    /// Shared expense split equally across every current member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AutoSplitExpenseNew {
        pub amount_minor: i64,
        pub description: String,
        pub category: Option<String>,
        pub date: Option<DateTime<Utc>>,
        pub paid_by: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub member: MemberRef,
        pub amount_minor: i64,
        pub percentage: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub currency: Currency,
        pub description: String,
        pub category: String,
        pub date: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub paid_by: MemberRef,
        pub split_between: Vec<ShareView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod settlement {
    use super::*;

    /// One suggested payment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub from: MemberRef,
        pub to: MemberRef,
        pub amount_minor: i64,
    }

    /// Net position of a member, with the totals it is derived from.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub member: MemberRef,
        pub balance_minor: i64,
        pub total_paid_minor: i64,
        pub total_owed_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementsResponse {
        pub currency: Currency,
        pub settlements: Vec<SettlementView>,
        pub balance_summary: Vec<BalanceView>,
    }
}
