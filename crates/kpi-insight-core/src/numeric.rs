//! Overflow-checked Decimal helpers.
//!
//! Decimal operators panic when a result leaves the 96-bit range. KPI
//! values arrive from user files, so every sum or product over them goes
//! through these helpers and overflow becomes `KpiError::Overflow`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::KpiError;
use crate::KpiResult;

/// Values at or below this magnitude are squared without rescaling.
const RESCALE_ABOVE: Decimal = dec!(1000000);

pub fn overflow(context: &str) -> KpiError {
    KpiError::Overflow {
        context: context.to_string(),
    }
}

pub fn mul(a: Decimal, b: Decimal, context: &str) -> KpiResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

pub fn div(a: Decimal, b: Decimal, context: &str) -> KpiResult<Decimal> {
    if b.is_zero() {
        return Err(KpiError::DivisionByZero {
            context: context.to_string(),
        });
    }
    a.checked_div(b).ok_or_else(|| overflow(context))
}

pub fn add(a: Decimal, b: Decimal, context: &str) -> KpiResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

pub fn sub(a: Decimal, b: Decimal, context: &str) -> KpiResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(context))
}

/// Sum with overflow reported instead of panicking.
pub fn sum<I>(values: I, context: &str) -> KpiResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| add(acc, v, context))
}

/// Arithmetic mean; `Ok(None)` for no values.
pub fn mean(values: &[Decimal], context: &str) -> KpiResult<Option<Decimal>> {
    if values.is_empty() {
        return Ok(None);
    }
    let total = sum(values.iter().copied(), context)?;
    Ok(Some(div(total, Decimal::from(values.len() as u64), context)?))
}

/// Power of ten that brings `max_abs` into [1, 10) when it exceeds
/// `RESCALE_ABOVE`, otherwise one. Dividing by a power of ten only moves
/// the decimal point, so small inputs keep exact arithmetic.
pub fn pow10_scale(max_abs: Decimal) -> Decimal {
    let mut scale = Decimal::ONE;
    if max_abs <= RESCALE_ABOVE {
        return scale;
    }
    let ten = Decimal::TEN;
    while max_abs / scale >= ten {
        scale *= ten;
    }
    scale
}
