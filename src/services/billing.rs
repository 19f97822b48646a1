//! Charge computation for returned borrowings
//!
//! Pure date arithmetic over whole days; callers only invoke this once the
//! actual return date is set.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::payment::PaymentType;

/// Multiplier applied to the per-day fee when a return is late
pub const FINE_MULTIPLIER: i64 = 2;

/// Amount owed for a closed borrowing, and whether it is a fee or a fine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub payment_type: PaymentType,
    pub amount: Decimal,
}

/// Compute what a borrower owes at return time.
///
/// On-time returns pay the agreed window: days(expected - borrow) times the
/// daily fee. Late returns pay a fine instead: days(actual - expected) times
/// the daily fee times [`FINE_MULTIPLIER`]. A zero-day window yields a zero
/// amount; there is no minimum charge.
pub fn charge_for_return(
    borrow_date: NaiveDate,
    expected_return_date: NaiveDate,
    actual_return_date: NaiveDate,
    daily_fee: Decimal,
) -> Charge {
    if actual_return_date > expected_return_date {
        let days_overdue = (actual_return_date - expected_return_date).num_days();
        Charge {
            payment_type: PaymentType::Fine,
            amount: Decimal::from(days_overdue) * daily_fee * Decimal::from(FINE_MULTIPLIER),
        }
    } else {
        let days_borrowed = (expected_return_date - borrow_date).num_days();
        Charge {
            payment_type: PaymentType::Payment,
            amount: Decimal::from(days_borrowed) * daily_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn fee() -> Decimal {
        // 9.99
        Decimal::new(999, 2)
    }

    #[test]
    fn on_time_return_charges_the_agreed_window() {
        // borrow day 1, expected day 3, returned day 3: 2 days * 9.99
        let charge = charge_for_return(day(1), day(3), day(3), fee());
        assert_eq!(charge.payment_type, PaymentType::Payment);
        assert_eq!(charge.amount, Decimal::new(1998, 2));
    }

    #[test]
    fn early_return_still_charges_the_agreed_window() {
        let charge = charge_for_return(day(1), day(3), day(2), fee());
        assert_eq!(charge.payment_type, PaymentType::Payment);
        assert_eq!(charge.amount, Decimal::new(1998, 2));
    }

    #[test]
    fn late_return_charges_doubled_fee_per_overdue_day() {
        // expected day 3, returned day 6: 3 days * 9.99 * 2
        let charge = charge_for_return(day(1), day(3), day(6), fee());
        assert_eq!(charge.payment_type, PaymentType::Fine);
        assert_eq!(charge.amount, Decimal::new(5994, 2));
    }

    #[test]
    fn same_day_return_is_free() {
        let charge = charge_for_return(day(1), day(1), day(1), fee());
        assert_eq!(charge.payment_type, PaymentType::Payment);
        assert_eq!(charge.amount, Decimal::ZERO);
    }

    #[test]
    fn one_day_late_on_zero_day_window_is_a_fine() {
        let charge = charge_for_return(day(1), day(1), day(2), fee());
        assert_eq!(charge.payment_type, PaymentType::Fine);
        assert_eq!(charge.amount, Decimal::new(1998, 2));
    }
}
