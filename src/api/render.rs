use tabled::{Table, builder::Builder};

use crate::core::{GoalSolveResult, GoalType, ProjectionResult};

/// Formats an amount with comma thousands separators.
pub(crate) fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn render_projection(result: &ProjectionResult) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "Year",
        "Age",
        "Gross",
        "Tax + SI",
        "Net",
        "Saved",
        "Total assets",
    ]);
    for record in &result.yearly_records {
        builder.push_record([
            record.year.to_string(),
            record.age.to_string(),
            group_thousands(record.gross_income()),
            group_thousands(record.tax.total),
            group_thousands(record.net_income()),
            group_thousands(record.savings_contribution),
            group_thousands(record.total_assets),
        ]);
    }

    let summary = &result.summary;
    format!(
        "{}\n\n{} years to age {}: final assets {}, total tax and insurance {}\n",
        Table::from(builder),
        summary.total_years,
        summary.final_age,
        group_thousands(summary.final_total_assets),
        group_thousands(summary.total_tax_paid),
    )
}

pub fn render_solve(result: &GoalSolveResult) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);

    if let Some(value) = result.solved_value {
        match result.config.goal_type {
            GoalType::RequiredSavingsRate => {
                builder.push_record(["Required savings rate".to_string(), format!("{value:.2}%")]);
            }
            GoalType::RequiredIncome => {
                builder.push_record([
                    "Required starting income".to_string(),
                    group_thousands(value.ceil() as i64),
                ]);
            }
        }
    }
    if let Some(assets) = result.achieved_total_assets {
        builder.push_record(["Projected assets".to_string(), group_thousands(assets)]);
    }
    builder.push_record([
        "Target assets".to_string(),
        group_thousands(result.config.target_assets),
    ]);
    builder.push_record(["Bisection steps".to_string(), result.iterations.len().to_string()]);
    builder.push_record(["Converged".to_string(), result.converged.to_string()]);

    format!("{}\n{}\n", result.message, Table::from(builder))
}
