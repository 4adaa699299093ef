//! Balance computation and greedy debt reduction.
//!
//! A positive balance means the member is owed money, a negative balance means
//! the member owes money. Reduction repeatedly matches the biggest debtor with
//! the biggest creditor until every balance is within [`SETTLEMENT_EPSILON`] of
//! zero. Each step zeroes at least one of the two, so a group of `n` members
//! needs at most `n - 1` transfers. A transfer that would itself be within
//! the tolerance is never emitted; the run stops there instead.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::model::{NewSettlement, Settlement};
use crate::error::{Result, TallyError};
use crate::expense::Expense;
use crate::group::{Group, MemberId};

/// Tolerance for every "is this balance zero" decision.
pub const SETTLEMENT_EPSILON: f64 = 0.01;

/// Net balance per member. Keyed by member id so ties resolve lexically.
pub type Balances = BTreeMap<MemberId, f64>;

/// One debtor → creditor payment produced by the reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: f64,
}

impl Transfer {
    pub fn into_new_settlement(self, group_id: impl Into<String>) -> NewSettlement {
        NewSettlement {
            group_id: group_id.into(),
            from: self.from,
            to: self.to,
            amount: self.amount,
        }
    }
}

/// Settlement reduction service.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettlementReducer;

impl SettlementReducer {
    /// Computes each member's net balance.
    ///
    /// Every expense is split equally across all group members. Settlements
    /// already confirmed are applied on top so the debt they discharged is not
    /// surfaced again; pending ones are ignored.
    pub fn balances(
        &self,
        group: &Group,
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> Result<Balances> {
        if group.members.is_empty() {
            return Err(TallyError::invariant(format!(
                "group '{}' has no members",
                group.id
            )));
        }

        let member_count = group.member_count() as f64;
        let mut balances: Balances = group.members.iter().map(|m| (m.clone(), 0.0)).collect();

        for expense in expenses {
            let share = expense.total_amount / member_count;
            for (member, balance) in balances.iter_mut() {
                *balance -= share;
                *balance += expense.paid_by_member(member);
            }

            for payer in expense.paid_by.keys().filter(|p| !group.is_member(p)) {
                warn!(
                    expense_id = %expense.id,
                    payer = %payer,
                    "Ignoring payment by non-member"
                );
            }
        }

        for settlement in settlements.iter().filter(|s| s.settled) {
            if !group.is_member(&settlement.from) || !group.is_member(&settlement.to) {
                warn!(
                    settlement_id = %settlement.id,
                    "Ignoring settled record that references a non-member"
                );
                continue;
            }
            if let Some(balance) = balances.get_mut(&settlement.from) {
                *balance += settlement.amount;
            }
            if let Some(balance) = balances.get_mut(&settlement.to) {
                *balance -= settlement.amount;
            }
        }

        Ok(balances)
    }

    /// Reduces balances to a minimal list of transfers.
    ///
    /// Fails with `InvariantViolation` when the balances do not sum to zero
    /// (a debtor is left with nobody to pay) or when the loop exceeds
    /// `2 × member_count` iterations.
    pub fn reduce(&self, balances: Balances) -> Result<Vec<Transfer>> {
        let cap = 2 * balances.len();
        reduce_bounded(balances, cap)
    }
}

pub(crate) fn reduce_bounded(balances: Balances, max_iterations: usize) -> Result<Vec<Transfer>> {
    let mut working = balances;
    let mut transfers = Vec::new();
    let mut emitted: BTreeSet<(MemberId, MemberId)> = BTreeSet::new();
    let mut iterations = 0;

    while working.values().any(|b| b.abs() > SETTLEMENT_EPSILON) {
        if iterations >= max_iterations {
            return Err(TallyError::invariant(format!(
                "balances did not converge after {} iterations",
                max_iterations
            )));
        }
        iterations += 1;

        let (Some((debtor, debt)), Some((creditor, credit))) = (
            extreme(&working, Ordering::Less),
            extreme(&working, Ordering::Greater),
        ) else {
            let residual: f64 = working.values().sum();
            return Err(TallyError::invariant(format!(
                "unbalanced ledger: residual {:.2} has no counterparty",
                residual
            )));
        };

        if !emitted.insert((debtor.clone(), creditor.clone())) {
            debug!(from = %debtor, to = %creditor, "Pair already emitted in this run, stopping");
            break;
        }

        let amount = (-debt).min(credit);
        if amount <= SETTLEMENT_EPSILON {
            let residual: f64 = working.values().sum();
            if residual.abs() > SETTLEMENT_EPSILON {
                return Err(TallyError::invariant(format!(
                    "unbalanced ledger: residual {:.2} has no counterparty",
                    residual
                )));
            }
            debug!(from = %debtor, to = %creditor, amount, "Remaining transfer below tolerance, stopping");
            break;
        }
        if let Some(balance) = working.get_mut(&debtor) {
            *balance += amount;
        }
        if let Some(balance) = working.get_mut(&creditor) {
            *balance -= amount;
        }

        debug!(from = %debtor, to = %creditor, amount, "Matched transfer");
        transfers.push(Transfer {
            from: debtor,
            to: creditor,
            amount,
        });
    }

    Ok(transfers)
}

/// Finds the most negative (`Less`) or most positive (`Greater`) non-zero
/// balance. Ties keep the lexically smallest member id.
fn extreme(balances: &Balances, direction: Ordering) -> Option<(MemberId, f64)> {
    let mut best: Option<(&MemberId, f64)> = None;
    for (member, &balance) in balances {
        if balance.partial_cmp(&0.0) != Some(direction) {
            continue;
        }
        let better = match best {
            None => true,
            Some((_, current)) => balance.partial_cmp(&current) == Some(direction),
        };
        if better {
            best = Some((member, balance));
        }
    }
    best.map(|(member, balance)| (member.clone(), balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn reducer() -> SettlementReducer {
        SettlementReducer
    }

    fn group(members: &[&str]) -> Group {
        Group::new(
            "Test",
            members[0],
            members.iter().map(|m| m.to_string()),
            "ABCD",
        )
    }

    fn expense(total: f64, paid: &[(&str, f64)]) -> Expense {
        Expense::new(
            "g",
            total,
            paid.iter().map(|(m, a)| (m.to_string(), *a)).collect(),
            "expense",
        )
    }

    fn settled(from: &str, to: &str, amount: f64) -> Settlement {
        let mut settlement = NewSettlement {
            group_id: "g".to_string(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
        }
        .into_pending();
        settlement.settled = true;
        settlement
    }

    fn balances(entries: &[(&str, f64)]) -> Balances {
        entries.iter().map(|(m, b)| (m.to_string(), *b)).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[rstest]
    fn single_payer_equal_split(reducer: SettlementReducer) {
        let group = group(&["a", "b", "c", "d"]);
        let result = reducer
            .balances(&group, &[expense(100.0, &[("b", 100.0)])], &[])
            .unwrap();

        assert_close(result["b"], 100.0 - 25.0);
        for member in ["a", "c", "d"] {
            assert_close(result[member], -25.0);
        }
    }

    #[rstest]
    fn pending_settlements_do_not_affect_balances(reducer: SettlementReducer) {
        let group = group(&["a", "b"]);
        let mut pending = settled("b", "a", 25.0);
        pending.settled = false;

        let result = reducer
            .balances(&group, &[expense(50.0, &[("a", 50.0)])], &[pending])
            .unwrap();
        assert_close(result["a"], 25.0);
        assert_close(result["b"], -25.0);
    }

    #[rstest]
    fn settled_history_is_applied(reducer: SettlementReducer) {
        let group = group(&["a", "b"]);
        let result = reducer
            .balances(
                &group,
                &[expense(50.0, &[("a", 50.0)])],
                &[settled("b", "a", 25.0)],
            )
            .unwrap();
        assert_close(result["a"], 0.0);
        assert_close(result["b"], 0.0);
        assert!(reducer.reduce(result).unwrap().is_empty());
    }

    #[rstest]
    fn non_member_payer_is_ignored(reducer: SettlementReducer) {
        let group = group(&["a", "b"]);
        let result = reducer
            .balances(
                &group,
                &[expense(20.0, &[("a", 20.0), ("mallory", 5.0)])],
                &[],
            )
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_close(result["a"], 10.0);
        assert_close(result["b"], -10.0);
    }

    #[rstest]
    fn empty_group_is_invariant_violation(reducer: SettlementReducer) {
        let mut group = group(&["a"]);
        group.members.clear();
        let err = reducer.balances(&group, &[], &[]).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[rstest]
    #[case::nothing_owed(balances(&[("a", 0.0), ("b", 0.0)]), vec![])]
    #[case::one_creditor_two_debtors(
        balances(&[("a", 20.0), ("b", -10.0), ("c", -10.0)]),
        vec![("b", "a", 10.0), ("c", "a", 10.0)]
    )]
    #[case::one_debtor_two_creditors(
        balances(&[("a", 10.0), ("b", 10.0), ("c", -20.0)]),
        vec![("c", "a", 10.0), ("c", "b", 10.0)]
    )]
    #[case::largest_matched_first(
        balances(&[("a", 5.0), ("b", 30.0), ("c", -35.0)]),
        vec![("c", "b", 30.0), ("c", "a", 5.0)]
    )]
    #[case::below_tolerance_ignored(balances(&[("a", 0.004), ("b", -0.004)]), vec![])]
    #[case::dust_split_across_creditors(
        balances(&[("a", 0.009), ("b", 0.009), ("c", -0.018)]),
        vec![]
    )]
    fn reduce_cases(
        reducer: SettlementReducer,
        #[case] input: Balances,
        #[case] expected: Vec<(&str, &str, f64)>,
    ) {
        let transfers = reducer.reduce(input).unwrap();
        let expected: Vec<Transfer> = expected
            .into_iter()
            .map(|(from, to, amount)| Transfer {
                from: from.to_string(),
                to: to.to_string(),
                amount,
            })
            .collect();
        assert_eq!(transfers, expected);
    }

    #[rstest]
    fn conservation_and_minimality(reducer: SettlementReducer) {
        let group = group(&["ann", "ben", "cat", "dan", "eve"]);
        let expenses = vec![
            expense(120.0, &[("ann", 120.0)]),
            expense(45.5, &[("ben", 20.5), ("cat", 25.0)]),
            expense(10.0, &[("eve", 10.0)]),
            expense(99.99, &[("dan", 99.99)]),
        ];
        let before = reducer.balances(&group, &expenses, &[]).unwrap();
        assert!(before.values().sum::<f64>().abs() < SETTLEMENT_EPSILON);

        let transfers = reducer.reduce(before.clone()).unwrap();
        assert!(transfers.len() <= group.member_count() - 1);

        for (member, balance) in &before {
            let received: f64 = transfers
                .iter()
                .filter(|t| &t.to == member)
                .map(|t| t.amount)
                .sum();
            let paid: f64 = transfers
                .iter()
                .filter(|t| &t.from == member)
                .map(|t| t.amount)
                .sum();
            assert!(
                (received - paid - balance).abs() < SETTLEMENT_EPSILON,
                "{member}: balance {balance}, net transfers {}",
                received - paid
            );
        }
    }

    #[rstest]
    fn ties_break_on_member_id(reducer: SettlementReducer) {
        let transfers = reducer
            .reduce(balances(&[("z", 10.0), ("y", 10.0), ("b", -10.0), ("a", -10.0)]))
            .unwrap();
        assert_eq!(transfers[0].from, "a");
        assert_eq!(transfers[0].to, "y");
        assert_eq!(transfers.len(), 2);
    }

    #[rstest]
    fn unbalanced_input_is_rejected(reducer: SettlementReducer) {
        let err = reducer
            .reduce(balances(&[("a", 10.0), ("b", -25.0)]))
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn iteration_cap_aborts() {
        let err = reduce_bounded(balances(&[("a", 20.0), ("b", -10.0), ("c", -10.0)]), 1)
            .unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(err.to_string().contains("did not converge"));
    }

    #[test]
    fn no_pair_is_emitted_twice() {
        use rand::{Rng, SeedableRng, rngs::StdRng};

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(2..9);
            let mut entries: Vec<(String, f64)> = (0..n - 1)
                .map(|i| (format!("m{i}"), rng.gen_range(-20_000..20_000) as f64 / 100.0))
                .collect();
            let rest: f64 = entries.iter().map(|(_, b)| b).sum();
            entries.push((format!("m{}", n - 1), -rest));

            let transfers = reduce_bounded(entries.into_iter().collect(), 2 * n).unwrap();
            let pairs: BTreeSet<_> = transfers.iter().map(|t| (&t.from, &t.to)).collect();
            assert_eq!(pairs.len(), transfers.len());
            assert!(transfers.len() <= n - 1);
        }
    }

    #[test]
    fn dust_on_an_unbalanced_ledger_is_rejected() {
        let err = reduce_bounded(balances(&[("a", 0.005), ("b", -10.0)]), 4).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn transfer_becomes_new_settlement() {
        let new = Transfer {
            from: "b".to_string(),
            to: "a".to_string(),
            amount: 10.0,
        }
        .into_new_settlement("g-1");
        assert_eq!(new.group_id, "g-1");
        assert!(new.validate().is_ok());
    }
}
