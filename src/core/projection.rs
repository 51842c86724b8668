use super::error::ProjectionError;
use super::tax::{TaxEngine, floor_currency};
use super::types::{
    ExpenseBreakdown, ProjectionInput, ProjectionResult, ProjectionSummary, YearlyRecord,
};

const HOUSING_SHARE: f64 = 0.30;
const LIVING_SHARE: f64 = 0.50;
const OTHER_SHARE: f64 = 0.20;

/// Projects the input with the built-in tax year.
pub fn project(input: &ProjectionInput) -> Result<ProjectionResult, ProjectionError> {
    project_with(&TaxEngine::default(), input)
}

pub fn project_with(
    engine: &TaxEngine,
    input: &ProjectionInput,
) -> Result<ProjectionResult, ProjectionError> {
    validate(input)?;

    let profile = &input.profile;
    let savings_rate = input.savings.savings_rate;
    let total_years = profile.retirement_age - profile.current_age;

    let mut total_assets = profile.current_savings;
    let mut income = profile.current_annual_income;
    let mut total_tax_paid: i64 = 0;
    let mut yearly_records = Vec::with_capacity(total_years as usize);

    for offset in 0..total_years {
        let age = profile.current_age + offset;
        let overflow = || ProjectionError::AmountOverflow { age };

        // Growth lands strictly after the previous record was emitted.
        if offset > 0 {
            income = grow_income(income, profile.income_growth_rate).ok_or_else(overflow)?;
        }

        let tax = engine.compute(income);
        let savings_contribution = floor_currency(tax.net_income as f64 * (savings_rate / 100.0));
        total_assets = total_assets
            .checked_add(savings_contribution)
            .ok_or_else(overflow)?;
        total_tax_paid = total_tax_paid.checked_add(tax.total).ok_or_else(overflow)?;
        let year = i32::try_from(offset)
            .ok()
            .and_then(|o| input.start_year.checked_add(o))
            .ok_or_else(overflow)?;

        yearly_records.push(YearlyRecord {
            year,
            age,
            tax,
            expense: split_expenses(tax.net_income - savings_contribution),
            savings_contribution,
            total_assets,
        });
    }

    Ok(ProjectionResult {
        input: input.clone(),
        yearly_records,
        summary: ProjectionSummary {
            total_years,
            final_age: profile.retirement_age,
            final_total_assets: total_assets,
            total_tax_paid,
        },
    })
}

fn validate(input: &ProjectionInput) -> Result<(), ProjectionError> {
    let profile = &input.profile;
    if profile.retirement_age <= profile.current_age {
        return Err(ProjectionError::InvalidPeriod {
            current_age: profile.current_age,
            retirement_age: profile.retirement_age,
        });
    }

    let rate = input.savings.savings_rate;
    if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
        return Err(ProjectionError::InvalidSavingsRate(rate));
    }

    Ok(())
}

/// `None` once the grown income no longer fits in an `i64`.
fn grow_income(income: i64, growth_rate: f64) -> Option<i64> {
    let grown = (income as f64 * (1.0 + growth_rate / 100.0)).floor();
    (grown.is_finite() && grown >= i64::MIN as f64 && grown < i64::MAX as f64)
        .then_some(grown as i64)
}

fn split_expenses(total: i64) -> ExpenseBreakdown {
    let total_f = total as f64;
    ExpenseBreakdown {
        housing: floor_currency(total_f * HOUSING_SHARE),
        living: floor_currency(total_f * LIVING_SHARE),
        other: floor_currency(total_f * OTHER_SHARE),
        total,
    }
}
