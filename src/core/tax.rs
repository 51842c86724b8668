use serde::Serialize;

use super::schedule::{
    DeductionRule, InsuranceComponent, SocialInsuranceTreatment, TaxSchedule, within,
};

/// Truncates a currency amount toward negative infinity.
pub(crate) fn floor_currency(value: f64) -> i64 {
    value.floor() as i64
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialInsurance {
    pub pension: i64,
    pub health: i64,
    pub employment: i64,
    pub total: i64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub gross_income: i64,
    pub salary_deduction: i64,
    pub taxable_income: i64,
    pub income_tax: i64,
    pub surtax: i64,
    pub resident_tax: i64,
    pub social_insurance: SocialInsurance,
    /// Income tax, surtax, resident tax and social insurance.
    pub total: i64,
    pub net_income: i64,
}

#[derive(Clone, Debug, Default)]
pub struct TaxEngine {
    schedule: TaxSchedule,
}

impl TaxEngine {
    pub fn new(schedule: TaxSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &TaxSchedule {
        &self.schedule
    }

    pub fn compute(&self, gross_income: i64) -> TaxBreakdown {
        let salary_deduction = self.salary_deduction(gross_income);
        let social_insurance = self.social_insurance(gross_income);
        let taxable_income = self.taxable_income(gross_income, salary_deduction, &social_insurance);
        let income_tax = self.income_tax(taxable_income);
        let surtax = self.surtax(income_tax);
        let resident_tax = self.resident_tax(taxable_income);

        let total = income_tax + surtax + resident_tax + social_insurance.total;

        TaxBreakdown {
            gross_income,
            salary_deduction,
            taxable_income,
            income_tax,
            surtax,
            resident_tax,
            social_insurance,
            total,
            net_income: gross_income - total,
        }
    }

    pub fn salary_deduction(&self, gross_income: i64) -> i64 {
        let bands = &self.schedule.salary_deduction_bands;
        let Some(band) = bands
            .iter()
            .find(|b| within(b.upper_limit, gross_income))
            .or_else(|| bands.last())
        else {
            return 0;
        };

        match band.rule {
            DeductionRule::Fixed { amount } => amount,
            DeductionRule::Formula { rate, adjustment } => {
                floor_currency(gross_income as f64 * rate + adjustment)
            }
        }
    }

    pub fn social_insurance(&self, gross_income: i64) -> SocialInsurance {
        let monthly_salary = gross_income as f64 / 12.0;
        let pension = capped_annual_contribution(monthly_salary, self.schedule.pension);
        let health = capped_annual_contribution(monthly_salary, self.schedule.health);
        let employment = floor_currency(gross_income as f64 * self.schedule.employment_rate);

        SocialInsurance {
            pension,
            health,
            employment,
            total: pension + health + employment,
        }
    }

    pub fn taxable_income(
        &self,
        gross_income: i64,
        salary_deduction: i64,
        social_insurance: &SocialInsurance,
    ) -> i64 {
        let insurance_deduction = match self.schedule.social_insurance_treatment {
            SocialInsuranceTreatment::Deductible => social_insurance.total,
            SocialInsuranceTreatment::NotDeductible => 0,
        };
        (gross_income - salary_deduction - self.schedule.basic_deduction - insurance_deduction)
            .max(0)
    }

    pub fn income_tax(&self, taxable_income: i64) -> i64 {
        if taxable_income <= 0 {
            return 0;
        }

        let brackets = &self.schedule.income_tax_brackets;
        brackets
            .iter()
            .find(|b| within(b.upper_limit, taxable_income))
            .or_else(|| brackets.last())
            .map(|b| floor_currency(taxable_income as f64 * b.rate - b.deduction as f64))
            .unwrap_or(0)
    }

    pub fn surtax(&self, income_tax: i64) -> i64 {
        floor_currency(income_tax as f64 * self.schedule.surtax_rate)
    }

    pub fn resident_tax(&self, taxable_income: i64) -> i64 {
        if taxable_income <= 0 {
            return self.schedule.resident_tax_flat;
        }
        floor_currency(taxable_income as f64 * self.schedule.resident_tax_rate)
            + self.schedule.resident_tax_flat
    }
}

fn capped_annual_contribution(monthly_salary: f64, component: InsuranceComponent) -> i64 {
    let base = match component.monthly_cap {
        Some(cap) => monthly_salary.min(cap as f64),
        None => monthly_salary,
    };
    floor_currency(base * component.rate) * 12
}
