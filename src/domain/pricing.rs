// 料金計算
// 月額料金 × 月数で合計金額を求め、ゲートウェイの最小取引額を検証する

use crate::domain::error::DomainError;
use crate::domain::model::Money;

/// Khaltiの最小取引額（Rs. 10）
pub const DEFAULT_MINIMUM_CHARGE_PAISA: i64 = 1_000;

/// 見積もり結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// 合計金額
    pub total: Money,
    /// ゲートウェイに送る金額（最小通貨単位）
    pub amount_minor: i64,
}

/// 料金ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    minimum_charge: Money,
}

impl PricingPolicy {
    pub fn new(minimum_charge: Money) -> Self {
        Self { minimum_charge }
    }

    pub fn minimum_charge(&self) -> Money {
        self.minimum_charge
    }

    /// 月額料金と月数から見積もりを作成
    ///
    /// # Arguments
    /// * `monthly_rate` - 部屋の月額料金
    /// * `months` - 滞在月数（1以上）
    ///
    /// # Returns
    /// * `Err(DomainError::BelowMinimumCharge)` - 最小取引額を下回る
    pub fn quote(&self, monthly_rate: Money, months: u32) -> Result<Quote, DomainError> {
        if months == 0 {
            return Err(DomainError::validation(
                "months",
                "滞在月数は1以上である必要があります",
            ));
        }

        let amount_minor = monthly_rate
            .paisa()
            .checked_mul(i64::from(months))
            .ok_or_else(|| DomainError::validation("months", "合計金額が大きすぎます"))?;

        if amount_minor < self.minimum_charge.paisa() {
            return Err(DomainError::BelowMinimumCharge {
                amount_paisa: amount_minor,
                minimum_paisa: self.minimum_charge.paisa(),
            });
        }

        Ok(Quote {
            total: Money::from_paisa(amount_minor),
            amount_minor,
        })
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(Money::from_paisa(DEFAULT_MINIMUM_CHARGE_PAISA))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_monthly_total() {
        let quote = PricingPolicy::default().quote(Money::npr(5_000), 3).unwrap();
        assert_eq!(quote.total, Money::npr(15_000));
        assert_eq!(quote.amount_minor, 1_500_000);
    }

    #[test]
    fn test_quote_rejects_zero_months() {
        let result = PricingPolicy::default().quote(Money::npr(5_000), 0);
        assert!(matches!(
            result,
            Err(DomainError::Validation { field: "months", .. })
        ));
    }

    #[test]
    fn test_quote_below_minimum_charge() {
        let result = PricingPolicy::default().quote(Money::from_paisa(999), 1);
        assert_eq!(
            result,
            Err(DomainError::BelowMinimumCharge {
                amount_paisa: 999,
                minimum_paisa: 1_000,
            })
        );
    }

    #[test]
    fn test_quote_at_minimum_charge_is_accepted() {
        let quote = PricingPolicy::default().quote(Money::npr(10), 1).unwrap();
        assert_eq!(quote.amount_minor, 1_000);
    }

    #[test]
    fn test_custom_minimum() {
        let policy = PricingPolicy::new(Money::npr(20_000));
        assert!(policy.quote(Money::npr(5_000), 3).is_err());
        assert!(policy.quote(Money::npr(5_000), 4).is_ok());
    }
}
