//! Budget progress
//!
//! Joins a budget's allocations with the spending summary for the budget's
//! window. Every figure is a percentage clamped to `[0, 100]`: spending can
//! exceed an allocation, but reported progress never goes past 100.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use super::aggregation::SpendingSummary;
use crate::error::{HearthError, HearthResult};
use crate::models::{Budget, CategoryId, Money};

/// What to do when progress would divide by a zero amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroAllocationPolicy {
    /// Fail with `DivisionHazard`
    #[default]
    Error,
    /// 100% once anything is spent, 0% otherwise
    TreatAsFull,
}

impl fmt::Display for ZeroAllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::TreatAsFull => write!(f, "treat_as_full"),
        }
    }
}

impl FromStr for ZeroAllocationPolicy {
    type Err = HearthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "error" => Ok(Self::Error),
            "treat_as_full" | "full" => Ok(Self::TreatAsFull),
            other => Err(HearthError::Validation(format!(
                "Unknown zero-allocation policy '{}' (expected 'error' or 'treat_as_full')",
                other
            ))),
        }
    }
}

/// Key of the flattened progress map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProgressKey {
    Overall,
    Category(CategoryId),
}

impl ProgressKey {
    /// Reserved key for the whole-budget figure
    pub const OVERALL: &'static str = "overall";
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => f.write_str(Self::OVERALL),
            Self::Category(id) => f.write_str(&id.key()),
        }
    }
}

impl Serialize for ProgressKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Percentage used, overall and per allocated category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub overall: f64,
    pub categories: BTreeMap<CategoryId, f64>,
}

impl BudgetProgress {
    pub fn get(&self, key: ProgressKey) -> Option<f64> {
        match key {
            ProgressKey::Overall => Some(self.overall),
            ProgressKey::Category(id) => self.categories.get(&id).copied(),
        }
    }

    /// Single map with the overall figure under the reserved `overall` key
    pub fn as_map(&self) -> BTreeMap<ProgressKey, f64> {
        std::iter::once((ProgressKey::Overall, self.overall))
            .chain(
                self.categories
                    .iter()
                    .map(|(id, pct)| (ProgressKey::Category(*id), *pct)),
            )
            .collect()
    }
}

/// Detail row for one allocated category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProgress {
    pub category_id: CategoryId,
    pub allocated: Money,
    pub spent: Money,
    /// Negative when over budget
    pub remaining: Money,
    pub percent: f64,
    pub over_budget: bool,
}

/// Computes progress under a fixed zero-allocation policy
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressCalculator {
    policy: ZeroAllocationPolicy,
}

impl ProgressCalculator {
    pub fn new(policy: ZeroAllocationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ZeroAllocationPolicy {
        self.policy
    }

    /// Progress for every allocation of `budget`.
    ///
    /// `spending` must cover exactly the budget's date range. Spending in
    /// unallocated categories is left out of the per-category map but still
    /// counts toward the overall figure.
    pub fn calculate(&self, budget: &Budget, spending: &SpendingSummary) -> HearthResult<BudgetProgress> {
        let mut categories = BTreeMap::new();
        for allocation in &budget.allocations {
            let spent = spending.spent_in(allocation.category_id);
            let pct = self.percent_used(spent, allocation.amount, || allocation.category_id.to_string())?;
            categories.insert(allocation.category_id, pct);
        }

        let overall = self.percent_used(spending.total, budget.total_amount, || {
            ProgressKey::OVERALL.to_string()
        })?;

        Ok(BudgetProgress { overall, categories })
    }

    /// Amount-level breakdown per allocation, in allocation order
    pub fn details(&self, budget: &Budget, spending: &SpendingSummary) -> HearthResult<Vec<CategoryProgress>> {
        budget
            .allocations
            .iter()
            .map(|allocation| {
                let spent = spending.spent_in(allocation.category_id);
                let percent =
                    self.percent_used(spent, allocation.amount, || allocation.category_id.to_string())?;
                Ok(CategoryProgress {
                    category_id: allocation.category_id,
                    allocated: allocation.amount,
                    spent,
                    remaining: allocation.amount - spent,
                    percent,
                    over_budget: spent > allocation.amount,
                })
            })
            .collect()
    }

    fn percent_used<F>(&self, spent: Money, limit: Money, label: F) -> HearthResult<f64>
    where
        F: FnOnce() -> String,
    {
        match spent.ratio(limit) {
            Some(ratio) => Ok(ratio.clamp(0.0, 1.0) * 100.0),
            None => match self.policy {
                ZeroAllocationPolicy::Error => Err(HearthError::DivisionHazard { category: label() }),
                ZeroAllocationPolicy::TreatAsFull if spent.is_positive() => Ok(100.0),
                ZeroAllocationPolicy::TreatAsFull => Ok(0.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryAllocation, Expense, HouseholdId, PeriodKind, UserId};
    use crate::services::aggregation::{DateRange, SpendingAggregator};
    use chrono::NaiveDate;

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn budget(total: i64, allocations: Vec<CategoryAllocation>) -> Budget {
        Budget::for_period(
            HouseholdId::new(),
            "March",
            Money::from_cents(total),
            PeriodKind::Monthly,
            march(),
        )
        .unwrap()
        .with_allocations(allocations)
    }

    fn summary(budget: &Budget, spending: &[(CategoryId, i64)]) -> SpendingSummary {
        let user = UserId::new();
        let expenses: Vec<Expense> = spending
            .iter()
            .map(|(cat, cents)| {
                Expense::on_day(budget.household_id, Money::from_cents(*cents), march(), *cat, user)
            })
            .collect();
        let range = DateRange::new(budget.start_date, budget.end_date).unwrap();
        SpendingAggregator::aggregate(&range, &expenses)
    }

    #[test]
    fn test_half_spent() {
        let cat = CategoryId::new();
        let b = budget(10_000, vec![CategoryAllocation::fixed(cat, Money::from_cents(10_000))]);
        let progress = ProgressCalculator::default()
            .calculate(&b, &summary(&b, &[(cat, 5_000)]))
            .unwrap();
        assert_eq!(progress.categories[&cat], 50.0);
    }

    #[test]
    fn test_overspend_clamps_to_full() {
        let cat = CategoryId::new();
        let b = budget(100_000, vec![CategoryAllocation::fixed(cat, Money::from_cents(10_000))]);
        let progress = ProgressCalculator::default()
            .calculate(&b, &summary(&b, &[(cat, 15_000)]))
            .unwrap();
        assert_eq!(progress.categories[&cat], 100.0);
    }

    #[test]
    fn test_allocated_without_spending_is_zero() {
        let cat = CategoryId::new();
        let b = budget(10_000, vec![CategoryAllocation::fixed(cat, Money::from_cents(4_000))]);
        let progress = ProgressCalculator::default().calculate(&b, &summary(&b, &[])).unwrap();
        assert_eq!(progress.categories[&cat], 0.0);
        assert_eq!(progress.overall, 0.0);
    }

    #[test]
    fn test_overall_uses_all_spending() {
        let allocated = CategoryId::new();
        let unallocated = CategoryId::new();
        let b = budget(
            10_000,
            vec![CategoryAllocation::fixed(allocated, Money::from_cents(6_000))],
        );
        let spending = summary(&b, &[(allocated, 3_000), (unallocated, 5_000)]);

        let progress = ProgressCalculator::default().calculate(&b, &spending).unwrap();
        assert_eq!(progress.overall, 80.0);
        assert_eq!(progress.categories[&allocated], 50.0);
        assert!(!progress.categories.contains_key(&unallocated));
    }

    #[test]
    fn test_zero_allocation_errors_by_default() {
        let cat = CategoryId::new();
        let b = budget(10_000, vec![CategoryAllocation::fixed(cat, Money::zero())]);
        let err = ProgressCalculator::default()
            .calculate(&b, &summary(&b, &[]))
            .unwrap_err();
        assert!(matches!(err, HearthError::DivisionHazard { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_zero_allocation_treat_as_full() {
        let spent = CategoryId::new();
        let idle = CategoryId::new();
        let b = budget(
            10_000,
            vec![
                CategoryAllocation::fixed(spent, Money::zero()),
                CategoryAllocation::fixed(idle, Money::zero()),
            ],
        );
        let calc = ProgressCalculator::new(ZeroAllocationPolicy::TreatAsFull);
        let progress = calc.calculate(&b, &summary(&b, &[(spent, 1)])).unwrap();
        assert_eq!(progress.categories[&spent], 100.0);
        assert_eq!(progress.categories[&idle], 0.0);
    }

    #[test]
    fn test_zero_total_uses_policy_for_overall() {
        let b = budget(0, vec![]);
        let err = ProgressCalculator::default()
            .calculate(&b, &summary(&b, &[]))
            .unwrap_err();
        assert!(matches!(err, HearthError::DivisionHazard { ref category } if category == "overall"));

        let full = ProgressCalculator::new(ZeroAllocationPolicy::TreatAsFull)
            .calculate(&b, &summary(&b, &[(CategoryId::new(), 500)]))
            .unwrap();
        assert_eq!(full.overall, 100.0);
    }

    #[test]
    fn test_as_map_has_reserved_overall_key() {
        let cat = CategoryId::new();
        let b = budget(20_000, vec![CategoryAllocation::fixed(cat, Money::from_cents(10_000))]);
        let progress = ProgressCalculator::default()
            .calculate(&b, &summary(&b, &[(cat, 2_500)]))
            .unwrap();

        let map = progress.as_map();
        assert_eq!(map[&ProgressKey::Overall], 12.5);
        assert_eq!(map[&ProgressKey::Category(cat)], 25.0);

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["overall"], 12.5);
        assert_eq!(json[cat.key()], 25.0);
    }

    #[test]
    fn test_details() {
        let cat = CategoryId::new();
        let b = budget(50_000, vec![CategoryAllocation::fixed(cat, Money::from_cents(10_000))]);
        let rows = ProgressCalculator::default()
            .details(&b, &summary(&b, &[(cat, 12_000)]))
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].remaining, Money::from_cents(-2_000));
        assert!(rows[0].over_budget);
        assert_eq!(rows[0].percent, 100.0);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "treat-as-full".parse::<ZeroAllocationPolicy>().unwrap(),
            ZeroAllocationPolicy::TreatAsFull
        );
        assert_eq!("Error".parse::<ZeroAllocationPolicy>().unwrap(), ZeroAllocationPolicy::Error);
        assert!("sometimes".parse::<ZeroAllocationPolicy>().is_err());
    }
}
