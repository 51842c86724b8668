use serde::Serialize;

use super::tax::TaxBreakdown;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_annual_income: i64,
    /// Percent per year, e.g. `2.0` for 2%.
    pub income_growth_rate: f64,
    pub current_savings: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPolicy {
    /// Percent of net income, 0 to 100.
    pub savings_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub profile: Profile,
    pub savings: SavingsPolicy,
    /// Calendar year of the first simulated year.
    pub start_year: i32,
}

/// Split of the unsaved part of net income.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub housing: i64,
    pub living: i64,
    pub other: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRecord {
    pub year: i32,
    pub age: u32,
    pub tax: TaxBreakdown,
    pub expense: ExpenseBreakdown,
    pub savings_contribution: i64,
    pub total_assets: i64,
}

impl YearlyRecord {
    pub fn gross_income(&self) -> i64 {
        self.tax.gross_income
    }

    pub fn net_income(&self) -> i64 {
        self.tax.net_income
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub final_age: u32,
    pub final_total_assets: i64,
    pub total_tax_paid: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub input: ProjectionInput,
    pub yearly_records: Vec<YearlyRecord>,
    pub summary: ProjectionSummary,
}
