use serde::Serialize;

use super::error::ProjectionError;
use super::projection::project_with;
use super::tax::TaxEngine;
use super::types::ProjectionInput;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalType {
    /// Lowest savings rate (percent) that reaches the target.
    RequiredSavingsRate,
    /// Lowest starting gross income that reaches the target.
    RequiredIncome,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveConfig {
    pub goal_type: GoalType,
    pub target_assets: i64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl GoalSolveConfig {
    pub fn savings_rate(target_assets: i64) -> Self {
        Self {
            goal_type: GoalType::RequiredSavingsRate,
            target_assets,
            search_min: 0.0,
            search_max: 100.0,
            tolerance: 0.01,
            max_iterations: 40,
        }
    }

    pub fn income(target_assets: i64) -> Self {
        Self {
            goal_type: GoalType::RequiredIncome,
            target_assets,
            search_min: 1.0,
            search_max: 100_000_000.0,
            tolerance: 1_000.0,
            max_iterations: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub final_total_assets: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub config: GoalSolveConfig,
    pub solved_value: Option<f64>,
    pub achieved_total_assets: Option<i64>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

pub fn solve_goal(
    input: &ProjectionInput,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, ProjectionError> {
    solve_goal_with(&TaxEngine::default(), input, config)
}

/// Bisects on the configured quantity; final assets are monotone in both.
pub fn solve_goal_with(
    engine: &TaxEngine,
    input: &ProjectionInput,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, ProjectionError> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_assets = evaluate_candidate(engine, input, config, config.search_min)?;
    let high_assets = evaluate_candidate(engine, input, config, config.search_max)?;

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_assets >= config.target_assets {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already meets target at the lower search bound.".to_string();
    } else if high_assets < config.target_assets {
        feasible = false;
        message = "No feasible value found within the search bounds.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let assets = evaluate_candidate(engine, input, config, mid)?;
            iterations.push(GoalSolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                final_total_assets: assets,
            });

            if assets >= config.target_assets {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_value = Some(hi);
        feasible = true;
        message = if converged {
            match config.goal_type {
                GoalType::RequiredSavingsRate => "Solved required savings rate.".to_string(),
                GoalType::RequiredIncome => "Solved required starting income.".to_string(),
            }
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    let achieved_total_assets = match solved_value {
        Some(value) => Some(evaluate_candidate(engine, input, config, value)?),
        None => None,
    };

    Ok(GoalSolveResult {
        config,
        solved_value,
        achieved_total_assets,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(
    engine: &TaxEngine,
    base_input: &ProjectionInput,
    config: GoalSolveConfig,
    candidate_value: f64,
) -> Result<i64, ProjectionError> {
    let mut input = base_input.clone();
    match config.goal_type {
        GoalType::RequiredSavingsRate => {
            input.savings.savings_rate = candidate_value.clamp(0.0, 100.0);
        }
        GoalType::RequiredIncome => {
            input.profile.current_annual_income = candidate_value.ceil().max(1.0) as i64;
        }
    }
    Ok(project_with(engine, &input)?.summary.final_total_assets)
}

fn validate_config(config: GoalSolveConfig) -> Result<(), ProjectionError> {
    let invalid = |msg: &str| Err(ProjectionError::InvalidSolveConfig(msg.to_string()));

    if config.target_assets < 0 {
        return invalid("target_assets must be >= 0");
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return invalid("search bounds must be finite");
    }
    if config.search_max <= config.search_min {
        return invalid("search_max must be greater than search_min");
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return invalid("tolerance must be > 0");
    }
    if config.max_iterations == 0 {
        return invalid("max_iterations must be > 0");
    }
    match config.goal_type {
        GoalType::RequiredSavingsRate => {
            if config.search_min < 0.0 || config.search_max > 100.0 {
                return invalid("savings rate search bounds must be within 0 and 100");
            }
        }
        GoalType::RequiredIncome => {
            if config.search_min <= 0.0 {
                return invalid("income search_min must be > 0");
            }
        }
    }
    Ok(())
}
