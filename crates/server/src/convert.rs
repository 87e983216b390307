//! Mapping between engine values and wire DTOs.

use api_types::{
    MemberRef,
    expense::{ExpenseView, ShareView},
    membership::MemberView,
    scope::ScopeView,
    settlement::{BalanceView, SettlementView},
};
use engine::{Balance, EngineError, Member, MemberId, Settlement};

use crate::store::{ExpenseRecord, Membership, Scope};

pub(crate) fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Gbp => api_types::Currency::Gbp,
        engine::Currency::Inr => api_types::Currency::Inr,
        engine::Currency::Cad => api_types::Currency::Cad,
        engine::Currency::Aud => api_types::Currency::Aud,
        engine::Currency::Jpy => api_types::Currency::Jpy,
    }
}

pub(crate) fn parse_currency(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Gbp => engine::Currency::Gbp,
        api_types::Currency::Inr => engine::Currency::Inr,
        api_types::Currency::Cad => engine::Currency::Cad,
        api_types::Currency::Aud => engine::Currency::Aud,
        api_types::Currency::Jpy => engine::Currency::Jpy,
    }
}

pub(crate) fn member_ref(member: &Member) -> MemberRef {
    MemberRef {
        id: member.id.uuid(),
        name: member.name.clone(),
        email: member.email.clone(),
    }
}

/// Expenses only ever reference current members: removing a member that
/// takes part in an expense is refused by the store.
fn resolve(scope: &Scope, id: MemberId) -> Result<MemberRef, EngineError> {
    scope
        .member(id)
        .map(member_ref)
        .ok_or_else(|| EngineError::UnknownMember(format!("{id} is not a member")))
}

pub(crate) fn member_view(membership: &Membership) -> MemberView {
    MemberView {
        member: member_ref(&membership.member),
        role: membership.role,
        joined_at: membership.joined_at,
    }
}

pub(crate) fn scope_view(scope: &Scope) -> ScopeView {
    ScopeView {
        id: scope.id,
        kind: scope.kind,
        name: scope.name.clone(),
        description: scope.description.clone(),
        currency: map_currency(scope.currency),
        created_by: scope.created_by.uuid(),
        created_at: scope.created_at,
        members: scope.members.iter().map(member_view).collect(),
    }
}

pub(crate) fn expense_view(
    scope: &Scope,
    record: &ExpenseRecord,
) -> Result<ExpenseView, EngineError> {
    let split_between = record
        .entry
        .shares
        .iter()
        .map(|share| {
            Ok(ShareView {
                member: resolve(scope, share.member)?,
                amount_minor: share.amount.minor(),
                percentage: share.percentage,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    Ok(ExpenseView {
        id: record.entry.id,
        amount_minor: record.entry.amount.minor(),
        currency: map_currency(record.entry.currency),
        description: record.description.clone(),
        category: record.category.clone(),
        date: record.date,
        created_at: record.created_at,
        paid_by: resolve(scope, record.entry.payer)?,
        split_between,
    })
}

pub(crate) fn balance_view(balance: &Balance) -> BalanceView {
    BalanceView {
        member: member_ref(&balance.member),
        balance_minor: balance.net.minor(),
        total_paid_minor: balance.total_paid.minor(),
        total_owed_minor: balance.total_owed.minor(),
    }
}

pub(crate) fn settlement_view(settlement: &Settlement) -> SettlementView {
    SettlementView {
        from: member_ref(&settlement.from),
        to: member_ref(&settlement.to),
        amount_minor: settlement.amount.minor(),
    }
}
