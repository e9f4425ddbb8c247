use crate::domain::catalog::Course;
use crate::domain::money::Money;
use crate::domain::offer::CouponError;
use crate::domain::payment::{
    GST_RATE, Payment, PaymentDetails, PaymentMethod, PaymentStatus, TAX_RATE,
};
use crate::domain::ports::{CourseStoreRef, OfferStoreRef, PaymentFilter, PaymentStoreRef};
use crate::error::{CommerceError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of resolving an optional coupon code against a base amount.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponOutcome {
    pub discount_amount: Money,
    pub coupon_code_applied: Option<String>,
    pub offer_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    /// Course price before any discount, kept for display.
    pub original_base_amount: Money,
    /// Discounted base the tax and GST are computed from.
    pub base_amount: Money,
    pub discount_amount: Money,
    pub coupon_code_applied: Option<String>,
    pub tax_amount: Money,
    pub gst_amount: Money,
    pub total_amount: Money,
    pub tax_rate: Decimal,
    pub gst_rate: Decimal,
    pub course_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessPaymentRequest {
    pub course_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub payment_details: Option<PaymentDetails>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentReportQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBucket {
    pub count: u64,
    pub total_amount: Money,
}

/// Full-scan reduction over the filtered payment set; no incremental
/// counters are maintained anywhere.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReport {
    pub total_payments: u64,
    pub total_base_amount: Money,
    pub total_tax_amount: Money,
    pub total_gst_amount: Money,
    pub total_amount: Money,
    pub total_discount_applied: Money,
    pub payment_method_breakdown: BTreeMap<String, MethodBucket>,
    pub payments: Vec<Payment>,
}

/// A purchased course joined with a summary of the payment that bought it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedCourse {
    #[serde(flatten)]
    pub course: Course,
    pub payment_details: PurchaseSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub transaction_id: String,
    pub total_amount: Money,
    pub payment_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub coupon_code_applied: Option<String>,
    pub discount_applied: Money,
}

/// Amendment for an existing payment record; all amounts are required and the
/// total invariant is re-checked before anything is written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentAmendment {
    pub base_amount: Option<Money>,
    pub tax_amount: Option<Money>,
    pub gst_amount: Option<Money>,
    pub total_amount: Option<Money>,
    pub payment_method: Option<String>,
    pub status: Option<PaymentStatus>,
    pub coupon_code_applied: Option<String>,
    pub discount_applied: Option<Money>,
}

/// The single-course payment pricing pipeline and its read paths.
pub struct PaymentService {
    payments: PaymentStoreRef,
    courses: CourseStoreRef,
    offers: OfferStoreRef,
}

impl PaymentService {
    pub fn new(payments: PaymentStoreRef, courses: CourseStoreRef, offers: OfferStoreRef) -> Self {
        Self {
            payments,
            courses,
            offers,
        }
    }

    /// Resolves an optional coupon code. Absence of a code is valid and
    /// yields a zero discount; a code that does not match an active offer is
    /// an error.
    pub async fn apply_coupon(
        &self,
        coupon_code: Option<&str>,
        base_amount: Money,
    ) -> Result<CouponOutcome> {
        let Some(code) = coupon_code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(CouponOutcome::default());
        };

        let offer = self
            .offers
            .find_active_by_code(code)
            .await?
            .ok_or(CouponError::Invalid)?;
        let applied = offer.evaluate(Utc::now(), base_amount)?;

        Ok(CouponOutcome {
            discount_amount: applied.discount_amount,
            coupon_code_applied: Some(applied.coupon_code_applied),
            offer_id: Some(applied.offer_id),
        })
    }

    /// Prices a course purchase without persisting anything.
    pub async fn calculate_breakdown(
        &self,
        course_id: Uuid,
        coupon_code: Option<&str>,
    ) -> Result<PaymentBreakdown> {
        let course = self
            .courses
            .get(course_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Course not found."))?;

        let coupon = self.apply_coupon(coupon_code, course.price).await?;
        let base_amount = course.price - coupon.discount_amount;
        let tax_amount = base_amount.percent(TAX_RATE);
        let gst_amount = base_amount.percent(GST_RATE);

        Ok(PaymentBreakdown {
            original_base_amount: course.price,
            base_amount,
            discount_amount: coupon.discount_amount,
            coupon_code_applied: coupon.coupon_code_applied,
            tax_amount,
            gst_amount,
            total_amount: base_amount + tax_amount + gst_amount,
            tax_rate: TAX_RATE,
            gst_rate: GST_RATE,
            course_name: course.name,
        })
    }

    /// The full payment pipeline: duplicate guard, course resolution, details
    /// validation, coupon, fixed-rate tax/GST, persist, usage count.
    pub async fn process_payment(&self, req: ProcessPaymentRequest) -> Result<Payment> {
        let (Some(course_id), Some(user_id), Some(method_raw)) =
            (req.course_id, req.user_id, req.payment_method.as_deref())
        else {
            return Err(CommerceError::validation(
                "Course ID, User ID, and Payment Method are required.",
            ));
        };
        let payment_method = PaymentMethod::parse(method_raw)
            .ok_or_else(|| CommerceError::validation("Invalid payment method."))?;

        if self.payments.has_completed(user_id, course_id).await? {
            return Err(CommerceError::conflict(
                "Course already purchased by this user.",
            ));
        }

        let course = self
            .courses
            .get(course_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Course not found."))?;

        let details = req
            .payment_details
            .ok_or_else(|| CommerceError::validation("Payment details are required."))?;
        details
            .validate_for(payment_method)
            .map_err(CommerceError::validation)?;

        let coupon = self
            .apply_coupon(req.coupon_code.as_deref(), course.price)
            .await?;
        let discounted_base = course.price - coupon.discount_amount;
        let tax_amount = discounted_base.percent(TAX_RATE);
        let gst_amount = discounted_base.percent(GST_RATE);
        let total_amount = discounted_base + tax_amount + gst_amount;

        let payment = Payment::completed(
            course.id,
            user_id,
            course.price,
            coupon.discount_amount,
            coupon.coupon_code_applied.clone(),
            tax_amount,
            gst_amount,
            total_amount,
            payment_method,
            details,
        );

        // The store enforces one completed payment per (user, course); a
        // concurrent winner surfaces here as a conflict.
        self.payments.insert_unique(payment.clone()).await?;
        info!(transaction_id = %payment.transaction_id, total = %payment.total_amount, "payment recorded");

        if let Some(offer_id) = coupon.offer_id {
            let incremented = self.offers.increment_usage_if_available(offer_id).await?;
            if !incremented {
                warn!(%offer_id, "coupon usage cap reached while recording redemption");
            }
        }

        Ok(payment)
    }

    /// Payment history for a user, newest first. Not found when empty.
    pub async fn payment_history(&self, user_id: Uuid) -> Result<Vec<Payment>> {
        let filter = PaymentFilter {
            user_id: Some(user_id),
            ..PaymentFilter::default()
        };
        let mut payments = self.payments.find(&filter).await?;
        if payments.is_empty() {
            return Err(CommerceError::not_found(
                "No payment history found for this user.",
            ));
        }
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(payments)
    }

    pub async fn purchased_courses(&self, user_id: Uuid) -> Result<Vec<PurchasedCourse>> {
        let filter = PaymentFilter {
            user_id: Some(user_id),
            status: Some(PaymentStatus::Completed),
            ..PaymentFilter::default()
        };
        let payments = self.payments.find(&filter).await?;

        let mut purchased = Vec::with_capacity(payments.len());
        for payment in payments {
            if let Some(course) = self.courses.get(payment.course_id).await? {
                purchased.push(PurchasedCourse {
                    course,
                    payment_details: PurchaseSummary {
                        transaction_id: payment.transaction_id,
                        total_amount: payment.total_amount,
                        payment_date: payment.payment_date,
                        payment_method: payment.payment_method,
                        coupon_code_applied: payment.coupon_code_applied,
                        discount_applied: payment.discount_applied,
                    },
                });
            }
        }
        if purchased.is_empty() {
            return Err(CommerceError::not_found(
                "No purchased courses found for this user.",
            ));
        }
        Ok(purchased)
    }

    pub async fn all_payments(&self) -> Result<Vec<Payment>> {
        let mut payments = self.payments.find(&PaymentFilter::default()).await?;
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(payments.into_iter().map(|p| p.masked()).collect())
    }

    pub async fn payment_report(&self, query: PaymentReportQuery) -> Result<PaymentReport> {
        let filter = PaymentFilter {
            status: query.status,
            payment_method: query.payment_method,
            paid_from: query.start_date,
            paid_until: query.end_date,
            ..PaymentFilter::default()
        };
        let payments = self.payments.find(&filter).await?;

        let mut report = PaymentReport {
            total_payments: payments.len() as u64,
            total_base_amount: Money::ZERO,
            total_tax_amount: Money::ZERO,
            total_gst_amount: Money::ZERO,
            total_amount: Money::ZERO,
            total_discount_applied: Money::ZERO,
            payment_method_breakdown: BTreeMap::new(),
            payments: Vec::with_capacity(payments.len()),
        };
        for payment in payments {
            report.total_base_amount += payment.base_amount;
            report.total_tax_amount += payment.tax_amount;
            report.total_gst_amount += payment.gst_amount;
            report.total_amount += payment.total_amount;
            report.total_discount_applied += payment.discount_applied;

            let bucket = report
                .payment_method_breakdown
                .entry(payment.payment_method.as_str().to_string())
                .or_default();
            bucket.count += 1;
            bucket.total_amount += payment.total_amount;

            report.payments.push(payment.masked());
        }
        report
            .payments
            .sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(report)
    }

    pub async fn update_status(&self, id: Uuid, status: PaymentStatus) -> Result<Payment> {
        let mut payment = self
            .payments
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Payment not found."))?;
        payment.status = status;
        self.payments.update(payment.clone()).await?;
        Ok(payment)
    }

    pub async fn update_details(&self, id: Uuid, amendment: PaymentAmendment) -> Result<Payment> {
        let mut errors = Vec::new();
        let required_amount = |field: Option<Money>, name: &str, errors: &mut Vec<String>| {
            match field {
                Some(amount) if !amount.is_negative() => Some(amount),
                Some(_) => {
                    errors.push(format!("{name} must be non-negative."));
                    None
                }
                None => {
                    errors.push(format!("{name} is required."));
                    None
                }
            }
        };
        let base_amount = required_amount(amendment.base_amount, "Base amount", &mut errors);
        let tax_amount = required_amount(amendment.tax_amount, "Tax amount", &mut errors);
        let gst_amount = required_amount(amendment.gst_amount, "GST amount", &mut errors);
        let total_amount = required_amount(amendment.total_amount, "Total amount", &mut errors);

        let payment_method = match amendment.payment_method.as_deref() {
            Some(raw) => match PaymentMethod::parse(raw) {
                Some(method) => Some(method),
                None => {
                    errors.push("Invalid payment method.".to_string());
                    None
                }
            },
            None => {
                errors.push("Payment method is required.".to_string());
                None
            }
        };
        if amendment.status.is_none() {
            errors.push("Status is required.".to_string());
        }
        if !errors.is_empty() {
            return Err(CommerceError::Validation(errors));
        }
        let (
            Some(base_amount),
            Some(tax_amount),
            Some(gst_amount),
            Some(total_amount),
            Some(payment_method),
            Some(status),
        ) = (
            base_amount,
            tax_amount,
            gst_amount,
            total_amount,
            payment_method,
            amendment.status,
        )
        else {
            return Err(CommerceError::validation("invalid payment amendment"));
        };

        let discount_applied = amendment.discount_applied.unwrap_or(Money::ZERO);
        let expected = base_amount - discount_applied + tax_amount + gst_amount;
        if !expected.reconciles_with(total_amount) {
            return Err(CommerceError::validation(
                "Total amount does not match calculated sum (base - discount + tax + GST).",
            ));
        }

        let mut payment = self
            .payments
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Payment not found."))?;
        payment.base_amount = base_amount;
        payment.tax_amount = tax_amount;
        payment.gst_amount = gst_amount;
        payment.total_amount = total_amount;
        payment.payment_method = payment_method;
        payment.status = status;
        payment.coupon_code_applied = amendment.coupon_code_applied;
        payment.discount_applied = discount_applied;

        self.payments.update(payment.clone()).await?;
        Ok(payment)
    }
}
