//! Finance store -- wallet transactions and the revenue headline numbers.
//!
//! Revenue aggregates are never recomputed from the collection. Adding a
//! transaction applies its [`RevenueDelta`]; deleting it applies the inverse,
//! so an add followed by a delete leaves every aggregate where it started.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::CommandContext;
use crate::error::ParseError;
use crate::filter::{contains, contains_ignore_case};
use crate::store::Store;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Direction of a wallet movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

/// Settlement state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Completed,
    Pending,
    #[serde(alias = "Expired")]
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
            Self::Failed => "Failed",
        })
    }
}

impl FromStr for TransactionStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(Self::Completed),
            "Pending" => Ok(Self::Pending),
            "Failed" | "Expired" => Ok(Self::Failed),
            other => Err(ParseError::new("transaction status", other)),
        }
    }
}

/// A wallet transaction. Amounts are in minor currency units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Caller-supplied reference such as `TXN001`.
    pub id: String,
    /// Name of the wallet owner.
    pub user: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: u64,
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Change this transaction applies to the aggregates when it is added.
    ///
    /// Amounts above `i64::MAX` saturate; the store rejects them before they
    /// get this far.
    pub fn revenue_delta(&self) -> RevenueDelta {
        let amount = i64::try_from(self.amount).unwrap_or(i64::MAX);
        match self.kind {
            TransactionKind::Deposit => RevenueDelta {
                total: amount,
                monthly: amount,
                pending: 0,
            },
            TransactionKind::Withdrawal => RevenueDelta {
                total: -amount,
                monthly: 0,
                pending: amount,
            },
        }
    }
}

/// Signed change to the three finance aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevenueDelta {
    pub total: i64,
    pub monthly: i64,
    pub pending: i64,
}

impl std::ops::Neg for RevenueDelta {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            total: self.total.saturating_neg(),
            monthly: self.monthly.saturating_neg(),
            pending: self.pending.saturating_neg(),
        }
    }
}

/// Transactions plus the revenue numbers on the finance page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceStore {
    pub transactions: Vec<Transaction>,
    pub total_revenue: i64,
    pub monthly_revenue: i64,
    /// Sum of withdrawals not yet paid out.
    pub pending_transactions: i64,
}

impl FinanceStore {
    /// Transaction with the given id, if any.
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Aggregates after applying `delta`, or `None` if any would overflow.
    fn shifted(&self, delta: RevenueDelta) -> Option<(i64, i64, i64)> {
        Some((
            self.total_revenue.checked_add(delta.total)?,
            self.monthly_revenue.checked_add(delta.monthly)?,
            self.pending_transactions.checked_add(delta.pending)?,
        ))
    }

    // `handle` has already checked the sums, so saturation never kicks in.
    fn shift(&mut self, delta: RevenueDelta) {
        self.total_revenue = self.total_revenue.saturating_add(delta.total);
        self.monthly_revenue = self.monthly_revenue.saturating_add(delta.monthly);
        self.pending_transactions = self.pending_transactions.saturating_add(delta.pending);
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands accepted by the [`FinanceStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FinanceCommand {
    /// Record a transaction and move the aggregates.
    Add(Transaction),
    /// Overwrite the status of one transaction. Aggregates are untouched.
    UpdateStatus {
        id: String,
        status: TransactionStatus,
    },
    /// Remove a transaction and reverse its effect on the aggregates.
    Delete { id: String },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Domain events produced by the [`FinanceStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FinanceEvent {
    Added(Transaction),
    StatusUpdated {
        id: String,
        status: TransactionStatus,
    },
    /// Carries the removed record so its delta can be reversed.
    Deleted(Transaction),
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from [`FinanceCommand`] handling.
#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    /// A transaction with this id already exists.
    #[error("transaction {0} already exists")]
    DuplicateId(String),
    /// Zero-amount transactions carry no movement.
    #[error("transaction amount must be greater than zero")]
    ZeroAmount,
    /// The amount does not fit the signed aggregates.
    #[error("transaction amount {0} exceeds the largest supported amount")]
    AmountTooLarge(u64),
    /// Applying the transaction would push an aggregate out of range.
    #[error("transaction {0} would overflow the revenue totals")]
    AggregateOverflow(String),
}

// ---------------------------------------------------------------------------
// Store impl
// ---------------------------------------------------------------------------

impl Store for FinanceStore {
    const STORE_NAME: &'static str = "finance";
    type Command = FinanceCommand;
    type DomainEvent = FinanceEvent;
    type Error = FinanceError;

    fn handle(
        &self,
        cmd: FinanceCommand,
        _ctx: &CommandContext,
    ) -> Result<Vec<FinanceEvent>, FinanceError> {
        match cmd {
            FinanceCommand::Add(tx) => {
                if tx.amount == 0 {
                    return Err(FinanceError::ZeroAmount);
                }
                if i64::try_from(tx.amount).is_err() {
                    return Err(FinanceError::AmountTooLarge(tx.amount));
                }
                if self.contains(&tx.id) {
                    return Err(FinanceError::DuplicateId(tx.id));
                }
                if self.shifted(tx.revenue_delta()).is_none() {
                    return Err(FinanceError::AggregateOverflow(tx.id));
                }
                Ok(vec![FinanceEvent::Added(tx)])
            }
            FinanceCommand::UpdateStatus { id, status } => {
                if !self.contains(&id) {
                    tracing::debug!(%id, "status update ignored: transaction not found");
                    return Ok(vec![]);
                }
                Ok(vec![FinanceEvent::StatusUpdated { id, status }])
            }
            FinanceCommand::Delete { id } => match self.get(&id) {
                Some(tx) if self.shifted(-tx.revenue_delta()).is_none() => {
                    Err(FinanceError::AggregateOverflow(id))
                }
                Some(tx) => Ok(vec![FinanceEvent::Deleted(tx.clone())]),
                None => {
                    tracing::debug!(%id, "delete ignored: transaction not found");
                    Ok(vec![])
                }
            },
        }
    }

    fn apply(mut self, event: &FinanceEvent) -> Self {
        match event {
            FinanceEvent::Added(tx) => {
                self.shift(tx.revenue_delta());
                self.transactions.push(tx.clone());
            }
            FinanceEvent::StatusUpdated { id, status } => {
                if let Some(tx) = self.transactions.iter_mut().find(|t| t.id == *id) {
                    tx.status = *status;
                }
            }
            FinanceEvent::Deleted(tx) => {
                if let Some(pos) = self.transactions.iter().position(|t| t.id == tx.id) {
                    let removed = self.transactions.remove(pos);
                    self.shift(-removed.revenue_delta());
                }
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Transactions whose user contains `query` ignoring case, or whose id
/// contains it exactly.
pub fn search_transactions<'a>(transactions: &'a [Transaction], query: &str) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| contains_ignore_case(&t.user, query) || contains(&t.id, query))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, kind: TransactionKind, amount: u64) -> Transaction {
        Transaction {
            id: id.into(),
            user: "Ali Smith".into(),
            kind,
            amount,
            date: "2024-01-15".into(),
            status: TransactionStatus::Completed,
        }
    }

    fn store(total: i64, monthly: i64, pending: i64) -> FinanceStore {
        FinanceStore {
            transactions: Vec::new(),
            total_revenue: total,
            monthly_revenue: monthly,
            pending_transactions: pending,
        }
    }

    fn run(store: FinanceStore, cmd: FinanceCommand) -> FinanceStore {
        let events = store
            .handle(cmd, &CommandContext::default())
            .expect("command should succeed");
        events.into_iter().fold(store, |s, e| s.apply(&e))
    }

    fn totals(s: &FinanceStore) -> (i64, i64, i64) {
        (s.total_revenue, s.monthly_revenue, s.pending_transactions)
    }

    #[test]
    fn deposit_raises_total_and_monthly() {
        let s = run(
            store(1000, 500, 0),
            FinanceCommand::Add(tx("TXN100", TransactionKind::Deposit, 100)),
        );
        assert_eq!(totals(&s), (1100, 600, 0));
    }

    #[test]
    fn deposit_add_then_delete_restores_totals() {
        let s = run(
            store(1000, 500, 0),
            FinanceCommand::Add(tx("TXN100", TransactionKind::Deposit, 100)),
        );
        let s = run(s, FinanceCommand::Delete { id: "TXN100".into() });
        assert_eq!(totals(&s), (1000, 500, 0));
        assert!(s.transactions.is_empty());
    }

    #[test]
    fn withdrawal_lowers_total_and_raises_pending() {
        let s = run(
            store(1000, 500, 50),
            FinanceCommand::Add(tx("TXN200", TransactionKind::Withdrawal, 300)),
        );
        assert_eq!(totals(&s), (700, 500, 350));

        let s = run(s, FinanceCommand::Delete { id: "TXN200".into() });
        assert_eq!(totals(&s), (1000, 500, 50));
    }

    #[test]
    fn inverse_delta_holds_across_interleavings() {
        let start = store(15_000_000, 2_800_000, 750_000);
        let before = totals(&start);
        let mut s = start;
        let batch = [
            tx("A", TransactionKind::Deposit, 1),
            tx("B", TransactionKind::Withdrawal, 250),
            tx("C", TransactionKind::Deposit, 99_999),
        ];
        for t in batch.iter().cloned() {
            s = run(s, FinanceCommand::Add(t));
        }
        for id in ["B", "A", "C"] {
            s = run(s, FinanceCommand::Delete { id: id.into() });
        }
        assert_eq!(totals(&s), before);
    }

    #[test]
    fn update_status_touches_only_status() {
        let s = run(
            store(0, 0, 0),
            FinanceCommand::Add(tx("TXN1", TransactionKind::Withdrawal, 40)),
        );
        let before = totals(&s);
        let s = run(
            s,
            FinanceCommand::UpdateStatus {
                id: "TXN1".into(),
                status: TransactionStatus::Pending,
            },
        );
        assert_eq!(s.get("TXN1").map(|t| t.status), Some(TransactionStatus::Pending));
        assert_eq!(totals(&s), before);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let s = store(10, 10, 10);
        for cmd in [
            FinanceCommand::Delete { id: "nope".into() },
            FinanceCommand::UpdateStatus {
                id: "nope".into(),
                status: TransactionStatus::Failed,
            },
        ] {
            let events = s
                .handle(cmd, &CommandContext::default())
                .expect("not found is not an error");
            assert!(events.is_empty());
        }
    }

    #[test]
    fn rejects_zero_amount_and_duplicates() {
        let s = run(
            store(0, 0, 0),
            FinanceCommand::Add(tx("TXN1", TransactionKind::Deposit, 10)),
        );
        let err = s
            .handle(
                FinanceCommand::Add(tx("TXN2", TransactionKind::Deposit, 0)),
                &CommandContext::default(),
            )
            .unwrap_err();
        assert!(matches!(err, FinanceError::ZeroAmount));

        let err = s
            .handle(
                FinanceCommand::Add(tx("TXN1", TransactionKind::Deposit, 5)),
                &CommandContext::default(),
            )
            .unwrap_err();
        assert!(matches!(err, FinanceError::DuplicateId(ref id) if id == "TXN1"));
    }

    #[test]
    fn rejects_amounts_beyond_signed_range() {
        let s = store(0, 0, 0);
        for (kind, amount) in [
            (TransactionKind::Deposit, u64::MAX),
            (TransactionKind::Withdrawal, 1 << 63),
        ] {
            let err = s
                .handle(FinanceCommand::Add(tx("BIG", kind, amount)), &CommandContext::default())
                .unwrap_err();
            assert!(matches!(err, FinanceError::AmountTooLarge(a) if a == amount));
        }
        assert_eq!(totals(&s), (0, 0, 0));
    }

    #[test]
    fn rejects_add_that_would_overflow_totals() {
        let s = run(
            store(0, 0, 0),
            FinanceCommand::Add(tx("MAX", TransactionKind::Deposit, i64::MAX as u64)),
        );
        assert_eq!(totals(&s), (i64::MAX, i64::MAX, 0));

        let err = s
            .handle(
                FinanceCommand::Add(tx("ONE", TransactionKind::Deposit, 1)),
                &CommandContext::default(),
            )
            .unwrap_err();
        assert!(matches!(err, FinanceError::AggregateOverflow(ref id) if id == "ONE"));

        // A withdrawal still fits: it lowers the total.
        let s = run(s, FinanceCommand::Add(tx("W", TransactionKind::Withdrawal, 1)));
        assert_eq!(totals(&s), (i64::MAX - 1, i64::MAX, 1));
    }

    #[test]
    fn rejects_delete_whose_reversal_would_overflow() {
        let mut s = store(i64::MIN + 5, 0, 0);
        s.transactions.push(tx("D", TransactionKind::Deposit, 10));
        let err = s
            .handle(FinanceCommand::Delete { id: "D".into() }, &CommandContext::default())
            .unwrap_err();
        assert!(matches!(err, FinanceError::AggregateOverflow(ref id) if id == "D"));
    }

    #[test]
    fn wire_format_uses_type_field_and_expired_alias() {
        let parsed: Transaction = serde_json::from_value(serde_json::json!({
            "id": "TXN009",
            "user": "Omar",
            "type": "Withdrawal",
            "amount": 2500,
            "date": "2024-02-01",
            "status": "Expired"
        }))
        .expect("valid transaction");
        assert_eq!(parsed.kind, TransactionKind::Withdrawal);
        assert_eq!(parsed.status, TransactionStatus::Failed);
    }

    #[test]
    fn search_matches_user_loosely_and_id_exactly() {
        let txs = vec![tx("TXN001", TransactionKind::Deposit, 1)];
        assert_eq!(search_transactions(&txs, "ali").len(), 1);
        assert_eq!(search_transactions(&txs, "TXN0").len(), 1);
        assert_eq!(search_transactions(&txs, "txn0").len(), 0);
    }
}
