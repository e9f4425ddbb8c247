use crate::domain::ids;
use crate::domain::money::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Fixed tax rate applied to the discounted base amount, in percent.
pub const TAX_RATE: Decimal = dec!(10);
/// Fixed GST rate applied to the discounted base amount, in percent.
pub const GST_RATE: Decimal = dec!(18);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Upi,
    NetBanking,
    Wallet,
}

impl PaymentMethod {
    /// Parses the wire form (`credit_card`, `upi`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "credit_card" => Some(Self::CreditCard),
            "debit_card" => Some(Self::DebitCard),
            "upi" => Some(Self::Upi),
            "net_banking" => Some(Self::NetBanking),
            "wallet" => Some(Self::Wallet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Upi => "upi",
            Self::NetBanking => "net_banking",
            Self::Wallet => "wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Method-specific payment fields. Only the fields the chosen method needs
/// are required; see [`PaymentDetails::validate_for`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_holder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl PaymentDetails {
    /// Checks the shape required by `method`, returning a method-specific
    /// message on failure. No fallback between methods is attempted.
    pub fn validate_for(&self, method: PaymentMethod) -> Result<(), String> {
        match method {
            PaymentMethod::CreditCard | PaymentMethod::DebitCard => {
                if present(&self.card_number)
                    && present(&self.card_holder_name)
                    && present(&self.expiry_month)
                    && present(&self.expiry_year)
                    && present(&self.cvv)
                {
                    Ok(())
                } else {
                    Err(
                        "Card number, holder name, expiry date, and CVV are required for card payments."
                            .to_string(),
                    )
                }
            }
            PaymentMethod::Upi => {
                if present(&self.upi_id) {
                    Ok(())
                } else {
                    Err("UPI ID is required for UPI payments.".to_string())
                }
            }
            PaymentMethod::NetBanking => {
                if present(&self.bank_name) {
                    Ok(())
                } else {
                    Err("Bank name is required for net banking.".to_string())
                }
            }
            PaymentMethod::Wallet => {
                if present(&self.wallet_type) {
                    Ok(())
                } else {
                    Err("Wallet type is required for wallet payments.".to_string())
                }
            }
        }
    }

    /// Normalizes the details before persisting: card number loses all
    /// whitespace.
    pub fn sanitized(mut self) -> Self {
        if let Some(number) = self.card_number.take() {
            self.card_number = Some(number.split_whitespace().collect());
        }
        self
    }

    /// Shape safe to return to clients: card number masked to the last four
    /// digits, CVV dropped entirely.
    pub fn masked(&self) -> Self {
        let mut out = self.clone();
        if let Some(number) = &out.card_number {
            let last4: String = number
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            out.card_number = Some(format!("**** **** **** {last4}"));
        }
        out.cvv = None;
        out
    }
}

/// A recorded course purchase with its full pricing breakdown.
///
/// `base_amount` keeps the original course price; the tax and GST amounts are
/// derived from the discounted base, so the invariant is
/// `total == (base - discount) + tax + gst` within 0.01.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub base_amount: Money,
    pub discount_applied: Money,
    pub coupon_code_applied: Option<String>,
    pub tax_amount: Money,
    pub gst_amount: Money,
    pub total_amount: Money,
    pub tax_rate: Decimal,
    pub gst_rate: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_details: PaymentDetails,
    pub status: PaymentStatus,
    pub transaction_id: String,
    pub payment_date: DateTime<Utc>,
}

impl Payment {
    #[allow(clippy::too_many_arguments)]
    pub fn completed(
        course_id: Uuid,
        user_id: Uuid,
        base_amount: Money,
        discount_applied: Money,
        coupon_code_applied: Option<String>,
        tax_amount: Money,
        gst_amount: Money,
        total_amount: Money,
        payment_method: PaymentMethod,
        payment_details: PaymentDetails,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            course_id,
            user_id,
            base_amount,
            discount_applied,
            coupon_code_applied,
            tax_amount,
            gst_amount,
            total_amount,
            tax_rate: TAX_RATE,
            gst_rate: GST_RATE,
            payment_method,
            payment_details: payment_details.sanitized(),
            status: PaymentStatus::Completed,
            transaction_id: ids::transaction_id(),
            payment_date: Utc::now(),
        }
    }

    /// `total == (base - discount) + tax + gst` within tolerance.
    pub fn total_consistent(&self) -> bool {
        let expected =
            self.base_amount - self.discount_applied + self.tax_amount + self.gst_amount;
        expected.reconciles_with(self.total_amount)
    }

    /// Clone with client-safe payment details.
    pub fn masked(&self) -> Self {
        let mut out = self.clone();
        out.payment_details = out.payment_details.masked();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_details() -> PaymentDetails {
        PaymentDetails {
            card_number: Some("4111 1111 1111 1234".to_string()),
            card_holder_name: Some("Meera Iyer".to_string()),
            expiry_month: Some("04".to_string()),
            expiry_year: Some("2030".to_string()),
            cvv: Some("123".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_card_validation() {
        assert!(card_details().validate_for(PaymentMethod::CreditCard).is_ok());

        let mut missing_cvv = card_details();
        missing_cvv.cvv = None;
        assert!(missing_cvv.validate_for(PaymentMethod::DebitCard).is_err());
    }

    #[test]
    fn test_upi_and_wallet_validation() {
        let upi = PaymentDetails {
            upi_id: Some("meera@upi".to_string()),
            ..Default::default()
        };
        assert!(upi.validate_for(PaymentMethod::Upi).is_ok());
        assert!(upi.validate_for(PaymentMethod::Wallet).is_err());

        let blank = PaymentDetails {
            upi_id: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.validate_for(PaymentMethod::Upi).is_err());
    }

    #[test]
    fn test_net_banking_validation() {
        let details = PaymentDetails {
            bank_name: Some("State Bank".to_string()),
            ..Default::default()
        };
        assert!(details.validate_for(PaymentMethod::NetBanking).is_ok());
        assert!(
            PaymentDetails::default()
                .validate_for(PaymentMethod::NetBanking)
                .is_err()
        );
    }

    #[test]
    fn test_sanitize_strips_card_whitespace() {
        let sanitized = card_details().sanitized();
        assert_eq!(sanitized.card_number.as_deref(), Some("4111111111111234"));
    }

    #[test]
    fn test_mask_keeps_last_four_and_drops_cvv() {
        let masked = card_details().sanitized().masked();
        assert_eq!(masked.card_number.as_deref(), Some("**** **** **** 1234"));
        assert!(masked.cvv.is_none());
        // other fields survive
        assert_eq!(masked.card_holder_name.as_deref(), Some("Meera Iyer"));
    }

    #[test]
    fn test_payment_method_parse_round_trip() {
        for raw in ["credit_card", "debit_card", "upi", "net_banking", "wallet"] {
            let method = PaymentMethod::parse(raw).unwrap();
            assert_eq!(method.as_str(), raw);
        }
        assert!(PaymentMethod::parse("cheque").is_none());
    }

    #[test]
    fn test_total_consistency() {
        use rust_decimal_macros::dec;
        let payment = Payment::completed(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Money::new(dec!(1000)),
            Money::new(dec!(100)),
            Some("SAVE10".to_string()),
            Money::new(dec!(90)),
            Money::new(dec!(162)),
            Money::new(dec!(1152)),
            PaymentMethod::Upi,
            PaymentDetails {
                upi_id: Some("meera@upi".to_string()),
                ..Default::default()
            },
        );
        assert!(payment.total_consistent());
        assert!(payment.transaction_id.starts_with("TXN-"));
    }
}
