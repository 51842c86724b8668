//! Constant tables for one tax year.
//!
//! A [`TaxSchedule`] is plain data: the engine is bound to one at construction,
//! so a different tax year is a different value rather than a global swap.

use serde::Serialize;

/// Basic deduction available to every earner.
pub const BASIC_DEDUCTION: i64 = 480_000;
/// Surtax levied on top of the national income tax.
pub const SURTAX_RATE: f64 = 0.021;
pub const RESIDENT_TAX_RATE: f64 = 0.10;
/// Per-capita resident tax, due even when taxable income is zero.
pub const RESIDENT_TAX_FLAT: i64 = 5_000;
pub const PENSION_RATE: f64 = 0.0915;
pub const PENSION_MONTHLY_CAP: i64 = 650_000;
pub const HEALTH_INSURANCE_RATE: f64 = 0.05;
pub const HEALTH_MONTHLY_CAP: i64 = 1_390_000;
pub const EMPLOYMENT_INSURANCE_RATE: f64 = 0.006;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum DeductionRule {
    Fixed { amount: i64 },
    Formula { rate: f64, adjustment: f64 },
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionBand {
    /// Inclusive upper bound; `None` for the open top band.
    pub upper_limit: Option<i64>,
    pub rule: DeductionRule,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxBracket {
    pub upper_limit: Option<i64>,
    pub rate: f64,
    pub deduction: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceComponent {
    pub rate: f64,
    /// Ceiling applied to the nominal monthly salary before the rate.
    pub monthly_cap: Option<i64>,
}

/// Whether social insurance is subtracted before taxable income is computed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SocialInsuranceTreatment {
    Deductible,
    NotDeductible,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSchedule {
    pub salary_deduction_bands: Vec<DeductionBand>,
    pub basic_deduction: i64,
    pub income_tax_brackets: Vec<IncomeTaxBracket>,
    pub surtax_rate: f64,
    pub resident_tax_rate: f64,
    pub resident_tax_flat: i64,
    pub pension: InsuranceComponent,
    pub health: InsuranceComponent,
    pub employment_rate: f64,
    pub social_insurance_treatment: SocialInsuranceTreatment,
}

impl TaxSchedule {
    /// The 2024 tax year.
    pub fn fy2024() -> Self {
        Self {
            salary_deduction_bands: vec![
                band(Some(1_625_000), DeductionRule::Fixed { amount: 550_000 }),
                band(Some(1_800_000), formula(0.4, -100_000.0)),
                band(Some(3_600_000), formula(0.3, 80_000.0)),
                band(Some(6_600_000), formula(0.2, 440_000.0)),
                band(Some(8_500_000), formula(0.1, 1_100_000.0)),
                band(None, DeductionRule::Fixed { amount: 1_950_000 }),
            ],
            basic_deduction: BASIC_DEDUCTION,
            income_tax_brackets: vec![
                bracket(Some(1_950_000), 0.05, 0),
                bracket(Some(3_300_000), 0.10, 97_500),
                bracket(Some(6_950_000), 0.20, 427_500),
                bracket(Some(9_000_000), 0.23, 636_000),
                bracket(Some(18_000_000), 0.33, 1_536_000),
                bracket(Some(40_000_000), 0.40, 2_796_000),
                bracket(None, 0.45, 4_796_000),
            ],
            surtax_rate: SURTAX_RATE,
            resident_tax_rate: RESIDENT_TAX_RATE,
            resident_tax_flat: RESIDENT_TAX_FLAT,
            pension: InsuranceComponent {
                rate: PENSION_RATE,
                monthly_cap: Some(PENSION_MONTHLY_CAP),
            },
            health: InsuranceComponent {
                rate: HEALTH_INSURANCE_RATE,
                monthly_cap: Some(HEALTH_MONTHLY_CAP),
            },
            employment_rate: EMPLOYMENT_INSURANCE_RATE,
            social_insurance_treatment: SocialInsuranceTreatment::Deductible,
        }
    }

    pub fn with_social_insurance_treatment(mut self, treatment: SocialInsuranceTreatment) -> Self {
        self.social_insurance_treatment = treatment;
        self
    }

    /// Drops the monthly salary ceilings on pension and health contributions.
    pub fn without_insurance_caps(mut self) -> Self {
        self.pension.monthly_cap = None;
        self.health.monthly_cap = None;
        self
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        Self::fy2024()
    }
}

pub(crate) fn within(upper_limit: Option<i64>, value: i64) -> bool {
    upper_limit.is_none_or(|limit| value <= limit)
}

fn band(upper_limit: Option<i64>, rule: DeductionRule) -> DeductionBand {
    DeductionBand { upper_limit, rule }
}

fn formula(rate: f64, adjustment: f64) -> DeductionRule {
    DeductionRule::Formula { rate, adjustment }
}

fn bracket(upper_limit: Option<i64>, rate: f64, deduction: i64) -> IncomeTaxBracket {
    IncomeTaxBracket {
        upper_limit,
        rate,
        deduction,
    }
}
