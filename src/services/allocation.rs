//! Allocation engine
//!
//! Pure functions that turn a budget total into per-category allocations.
//! Nothing here touches storage. None of the strategies is required to
//! allocate the full total: whatever is left over is simply unallocated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Category, CategoryAllocation, CategoryId, Money};

/// A named share of the budget total and the categories it covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBucket {
    /// Bucket label (e.g., "Needs")
    pub name: String,

    /// Share of the total, in percent points
    pub percentage: f64,

    /// Member categories by display name, compared case-insensitively
    #[serde(default)]
    pub category_names: Vec<String>,

    /// Member categories by id; unaffected by renames
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl RuleBucket {
    pub fn new(name: impl Into<String>, percentage: f64) -> Self {
        Self {
            name: name.into(),
            percentage,
            category_names: Vec::new(),
            category_ids: Vec::new(),
        }
    }

    /// Add member category names
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add member category ids
    pub fn with_ids(mut self, ids: impl IntoIterator<Item = CategoryId>) -> Self {
        self.category_ids.extend(ids);
        self
    }

    /// Whether `category` belongs to this bucket
    pub fn matches(&self, category: &Category) -> bool {
        self.category_ids.contains(&category.id)
            || self
                .category_names
                .iter()
                .any(|name| name.trim().eq_ignore_ascii_case(category.name.trim()))
    }

    /// The shipped needs/wants/savings rule, with members named after the
    /// default categories
    pub fn fifty_thirty_twenty() -> Vec<RuleBucket> {
        vec![
            RuleBucket::new("Needs", 50.0).with_names([
                "Rent",
                "Utilities",
                "Groceries",
                "Transportation",
                "Health",
            ]),
            RuleBucket::new("Wants", 30.0).with_names(["Dining Out", "Entertainment", "Shopping"]),
            RuleBucket::new("Savings", 20.0).with_names(["Emergency Fund", "Investments"]),
        ]
    }
}

/// How a budget total is distributed over categories
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationStrategy {
    /// Same amount for every active category
    Equal,
    /// Percentage buckets
    Rule(Vec<RuleBucket>),
    /// Caller-supplied amounts
    Custom(Vec<(CategoryId, Money)>),
}

impl AllocationStrategy {
    /// Compute allocations for `total` over `categories`
    pub fn allocate(&self, total: Money, categories: &[Category]) -> Vec<CategoryAllocation> {
        match self {
            Self::Equal => equal_split(total, categories),
            Self::Rule(buckets) => rule_based_split(total, categories, buckets),
            Self::Custom(amounts) => custom_split(amounts),
        }
    }

    /// Short label for display and logging
    pub fn label(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Rule(_) => "rule",
            Self::Custom(_) => "custom",
        }
    }
}

/// Divide `total` evenly across the active categories.
///
/// Amounts are cent-exact: they sum to `total` and differ by at most one
/// cent, with the extra cents going to the first categories in input order.
/// No active categories yields no allocations.
pub fn equal_split(total: Money, categories: &[Category]) -> Vec<CategoryAllocation> {
    let active: Vec<&Category> = categories.iter().filter(|c| c.is_active()).collect();

    total
        .split_even(active.len())
        .into_iter()
        .zip(active)
        .map(|(amount, category)| CategoryAllocation::fixed(category.id, amount))
        .collect()
}

/// Allocate `total` by percentage buckets.
///
/// Each bucket's share is split evenly over the active categories it
/// matches, and every resulting allocation records the bucket percentage
/// divided by the number of members. A bucket with no matching categories
/// contributes nothing; its share stays unallocated. A category matched by
/// several buckets is allocated by the first one only.
pub fn rule_based_split(
    total: Money,
    categories: &[Category],
    buckets: &[RuleBucket],
) -> Vec<CategoryAllocation> {
    let mut claimed: HashSet<CategoryId> = HashSet::new();
    let mut allocations = Vec::new();

    for bucket in buckets {
        let members: Vec<&Category> = categories
            .iter()
            .filter(|c| c.is_active() && !claimed.contains(&c.id) && bucket.matches(c))
            .collect();

        if members.is_empty() {
            continue;
        }

        let share = bucket.percentage / members.len() as f64;
        let amounts = total.percent_of(bucket.percentage).split_even(members.len());

        for (category, amount) in members.into_iter().zip(amounts) {
            claimed.insert(category.id);
            allocations.push(CategoryAllocation::from_percentage(category.id, amount, share));
        }
    }

    allocations
}

/// One allocation per entry with a positive amount, in input order
pub fn custom_split(amounts: &[(CategoryId, Money)]) -> Vec<CategoryAllocation> {
    retain_positive(
        amounts
            .iter()
            .map(|(category_id, amount)| CategoryAllocation::fixed(*category_id, *amount)),
    )
}

/// Drop hand-entered allocations that fund nothing, keeping input order
pub fn retain_positive<I>(allocations: I) -> Vec<CategoryAllocation>
where
    I: IntoIterator<Item = CategoryAllocation>,
{
    allocations
        .into_iter()
        .filter(|allocation| allocation.amount.is_positive())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::DEFAULT_CATEGORIES;
    use crate::models::HouseholdId;

    fn categories(names: &[&str]) -> Vec<Category> {
        let household = HouseholdId::new();
        names.iter().map(|n| Category::new(household, *n)).collect()
    }

    fn defaults() -> Vec<Category> {
        let names: Vec<&str> = DEFAULT_CATEGORIES.iter().map(|(n, _, _)| *n).collect();
        categories(&names)
    }

    fn sum(allocations: &[CategoryAllocation]) -> Money {
        allocations.iter().map(|a| a.amount).sum()
    }

    #[test]
    fn test_equal_split_identical_amounts() {
        let cats = categories(&["A", "B", "C", "D"]);
        let allocations = equal_split(Money::from_cents(100_000), &cats);

        assert_eq!(allocations.len(), 4);
        assert!(allocations.iter().all(|a| a.amount == Money::from_cents(25_000)));
        assert!(allocations.iter().all(|a| !a.is_percentage));
        assert_eq!(sum(&allocations), Money::from_cents(100_000));
    }

    #[test]
    fn test_equal_split_is_cent_exact() {
        let cats = categories(&["A", "B", "C"]);
        let allocations = equal_split(Money::from_cents(10_000), &cats);

        let amounts: Vec<i64> = allocations.iter().map(|a| a.amount.cents()).collect();
        assert_eq!(amounts, vec![3_334, 3_333, 3_333]);
        assert_eq!(sum(&allocations), Money::from_cents(10_000));
    }

    #[test]
    fn test_equal_split_empty() {
        assert!(equal_split(Money::from_cents(50_000), &[]).is_empty());
    }

    #[test]
    fn test_equal_split_skips_archived() {
        let mut cats = categories(&["A", "B", "C"]);
        cats[1].archive();

        let allocations = equal_split(Money::from_cents(1_000), &cats);
        let ids: Vec<CategoryId> = allocations.iter().map(|a| a.category_id).collect();
        assert_eq!(ids, vec![cats[0].id, cats[2].id]);
        assert_eq!(sum(&allocations), Money::from_cents(1_000));
    }

    #[test]
    fn test_equal_split_only_archived_is_empty() {
        let mut cats = categories(&["A"]);
        cats[0].archive();
        assert!(equal_split(Money::from_cents(1_000), &cats).is_empty());
    }

    #[test]
    fn test_rule_split_sums_to_total_when_all_buckets_match() {
        let cats = defaults();
        let total = Money::from_cents(333_337);
        let allocations = rule_based_split(total, &cats, &RuleBucket::fifty_thirty_twenty());

        assert_eq!(allocations.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(sum(&allocations), total);
        assert!(allocations.iter().all(|a| a.is_percentage));
    }

    #[test]
    fn test_rule_split_percentages_sum_to_bucket_share() {
        let cats = defaults();
        let allocations =
            rule_based_split(Money::from_cents(100_000), &cats, &RuleBucket::fifty_thirty_twenty());

        let rent = cats.iter().find(|c| c.name == "Rent").unwrap();
        let rent_alloc = allocations.iter().find(|a| a.category_id == rent.id).unwrap();
        assert_eq!(rent_alloc.amount, Money::from_cents(10_000));
        assert_eq!(rent_alloc.percentage, Some(10.0));

        let total_pct: f64 = allocations.iter().filter_map(|a| a.percentage).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rule_split_drops_empty_bucket_share() {
        let cats = categories(&["rent", "Dining Out", "Misc"]);
        let allocations =
            rule_based_split(Money::from_cents(100_000), &cats, &RuleBucket::fifty_thirty_twenty());

        // Savings matches nothing and Misc is in no bucket
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].category_id, cats[0].id);
        assert_eq!(allocations[0].amount, Money::from_cents(50_000));
        assert_eq!(allocations[1].amount, Money::from_cents(30_000));
        assert_eq!(sum(&allocations), Money::from_cents(80_000));
    }

    #[test]
    fn test_rule_split_matches_by_id_after_rename() {
        let mut cats = categories(&["Rent"]);
        let bucket = RuleBucket::new("Housing", 40.0).with_ids([cats[0].id]);
        cats[0].name = "Mortgage".into();

        let allocations = rule_based_split(Money::from_cents(10_000), &cats, &[bucket]);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].amount, Money::from_cents(4_000));
        assert_eq!(allocations[0].percentage, Some(40.0));
    }

    #[test]
    fn test_rule_split_first_bucket_wins_overlap() {
        let cats = categories(&["Groceries"]);
        let buckets = vec![
            RuleBucket::new("Needs", 50.0).with_names(["Groceries"]),
            RuleBucket::new("Wants", 30.0).with_names(["groceries"]),
        ];

        let allocations = rule_based_split(Money::from_cents(10_000), &cats, &buckets);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].amount, Money::from_cents(5_000));
    }

    #[test]
    fn test_rule_split_skips_archived_members() {
        let mut cats = categories(&["Rent", "Utilities"]);
        cats[0].archive();
        let buckets = vec![RuleBucket::new("Needs", 50.0).with_names(["Rent", "Utilities"])];

        let allocations = rule_based_split(Money::from_cents(10_000), &cats, &buckets);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].category_id, cats[1].id);
        assert_eq!(allocations[0].amount, Money::from_cents(5_000));
        assert_eq!(allocations[0].percentage, Some(50.0));
    }

    #[test]
    fn test_custom_split_drops_non_positive() {
        let a = CategoryId::new();
        let b = CategoryId::new();
        let c = CategoryId::new();
        let allocations = custom_split(&[
            (a, Money::from_cents(10_000)),
            (b, Money::zero()),
            (c, Money::from_cents(-500)),
        ]);

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].category_id, a);
        assert_eq!(allocations[0].amount, Money::from_cents(10_000));
        assert!(!allocations[0].is_percentage);
    }

    #[test]
    fn test_non_positive_total_is_accepted() {
        let cats = categories(&["A", "B"]);
        let allocations = equal_split(Money::from_cents(-3), &cats);
        assert_eq!(sum(&allocations), Money::from_cents(-3));

        let zero = AllocationStrategy::Equal.allocate(Money::zero(), &cats);
        assert!(zero.iter().all(|a| a.amount.is_zero()));
    }

    #[test]
    fn test_strategy_dispatch() {
        let cats = categories(&["A", "B"]);
        let custom = AllocationStrategy::Custom(vec![(cats[1].id, Money::from_cents(700))]);
        let allocations = custom.allocate(Money::from_cents(1_000), &cats);
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].category_id, cats[1].id);
        assert_eq!(custom.label(), "custom");
    }

    #[test]
    fn test_retain_positive_keeps_percentage_entries() {
        let cats = categories(&["A", "B", "C"]);
        let kept = retain_positive(vec![
            CategoryAllocation::from_percentage(cats[0].id, Money::from_cents(2_500), 25.0),
            CategoryAllocation::from_percentage(cats[1].id, Money::zero(), 0.0),
            CategoryAllocation::fixed(cats[2].id, Money::from_cents(-100)),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category_id, cats[0].id);
        assert_eq!(kept[0].percentage, Some(25.0));
    }
}
