use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::{InvoiceError, ValidationError};
use super::types::*;

/// Highest GST slab accepted on a line, in percent.
pub const MAX_TAX_RATE: Decimal = dec!(28);

/// Fractional digits carried by every monetary value.
pub const CURRENCY_SCALE: u32 = 2;

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantize to exactly 2 fractional digits, half-up. `80` becomes `80.00`.
///
/// Returns `None` when the value is too large to carry 2 fractional digits.
pub fn to_currency(value: Decimal) -> Option<Decimal> {
    let mut rounded = round_half_up(value, CURRENCY_SCALE);
    rounded.rescale(CURRENCY_SCALE);
    (rounded.scale() == CURRENCY_SCALE).then_some(rounded)
}

fn currency_at(value: Decimal, index: usize) -> Result<Decimal, InvoiceError> {
    to_currency(value)
        .ok_or_else(|| InvoiceError::invalid_line(index, "amount exceeds representable range"))
}

fn fractional_digits(value: Decimal) -> u32 {
    value.normalize().scale()
}

/// Compute subtotal and tax for a single line.
///
/// `subtotal = quantity × unit_price`, `tax = subtotal × tax_rate / 100`,
/// each rounded half-up to 2 digits.
pub fn calculate_line(line: &LineItem) -> Result<LineAmounts, InvoiceError> {
    calculate_line_at(line, 0)
}

fn calculate_line_at(line: &LineItem, index: usize) -> Result<LineAmounts, InvoiceError> {
    if line.quantity <= 0 {
        return Err(InvoiceError::invalid_line(
            index,
            format!("quantity must be positive, got {}", line.quantity),
        ));
    }
    if line.unit_price < Decimal::ZERO {
        return Err(InvoiceError::invalid_line(
            index,
            format!("unit price must not be negative, got {}", line.unit_price),
        ));
    }
    if fractional_digits(line.unit_price) > CURRENCY_SCALE {
        return Err(InvoiceError::invalid_line(
            index,
            format!(
                "unit price {} has more than {CURRENCY_SCALE} fractional digits",
                line.unit_price
            ),
        ));
    }
    if line.tax_rate < Decimal::ZERO {
        return Err(InvoiceError::invalid_line(
            index,
            format!("tax rate must not be negative, got {}", line.tax_rate),
        ));
    }
    if line.tax_rate > MAX_TAX_RATE {
        return Err(InvoiceError::invalid_line(
            index,
            format!("tax rate {} exceeds maximum of {MAX_TAX_RATE}", line.tax_rate),
        ));
    }
    if fractional_digits(line.tax_rate) > CURRENCY_SCALE {
        return Err(InvoiceError::invalid_line(
            index,
            format!(
                "tax rate {} has more than {CURRENCY_SCALE} fractional digits",
                line.tax_rate
            ),
        ));
    }

    let subtotal = Decimal::from(line.quantity)
        .checked_mul(line.unit_price)
        .ok_or_else(|| InvoiceError::invalid_line(index, "line subtotal overflows"))?;
    let tax = subtotal
        .checked_mul(line.tax_rate)
        .ok_or_else(|| InvoiceError::invalid_line(index, "line tax overflows"))?
        / dec!(100);

    Ok(LineAmounts {
        subtotal: currency_at(subtotal, index)?,
        tax: currency_at(tax, index)?,
    })
}

/// Sum line results and apply the discount.
///
/// The discount is clamped to `[0, subtotal]`. A non-negative discount with
/// more than 2 fractional digits is rejected, the same as a sub-paisa price.
pub fn aggregate(lines: &[LineAmounts], discount: Decimal) -> Result<Totals, InvoiceError> {
    if lines.is_empty() {
        return Err(InvoiceError::EmptyInvoice);
    }
    let discount = discount.max(Decimal::ZERO);
    if fractional_digits(discount) > CURRENCY_SCALE {
        return Err(InvoiceError::InvalidDiscount(discount));
    }
    let last = lines.len() - 1;

    let mut subtotal = Decimal::ZERO;
    let mut tax_total = Decimal::ZERO;
    for (i, line) in lines.iter().enumerate() {
        if line.subtotal < Decimal::ZERO || line.tax < Decimal::ZERO {
            return Err(InvoiceError::invalid_line(i, "line amounts must not be negative"));
        }
        subtotal = subtotal
            .checked_add(line.subtotal)
            .ok_or_else(|| InvoiceError::invalid_line(i, "invoice subtotal overflows"))?;
        tax_total = tax_total
            .checked_add(line.tax)
            .ok_or_else(|| InvoiceError::invalid_line(i, "invoice tax overflows"))?;
    }
    let subtotal = currency_at(subtotal, last)?;
    let tax_total = currency_at(tax_total, last)?;

    let discount = currency_at(discount, last)?;
    let effective_discount = discount.min(subtotal);

    let gross = subtotal
        .checked_add(tax_total)
        .ok_or_else(|| InvoiceError::invalid_line(last, "grand total overflows"))?;
    let grand_total = currency_at(gross - effective_discount, last)?;

    Ok(Totals {
        subtotal,
        tax_total,
        discount,
        effective_discount,
        grand_total,
    })
}

/// Compute invoice totals straight from line items.
///
/// Every line is validated before anything is summed; the first bad line
/// wins.
pub fn compute_invoice_totals(lines: &[LineItem], discount: Decimal) -> Result<Totals, InvoiceError> {
    if lines.is_empty() {
        return Err(InvoiceError::EmptyInvoice);
    }

    let amounts = lines
        .iter()
        .enumerate()
        .map(|(i, line)| calculate_line_at(line, i))
        .collect::<Result<Vec<_>, _>>()?;

    let totals = aggregate(&amounts, discount)?;
    tracing::debug!(
        lines = lines.len(),
        subtotal = %totals.subtotal,
        tax = %totals.tax_total,
        grand_total = %totals.grand_total,
        "computed invoice totals"
    );
    Ok(totals)
}

/// Check the cached totals of an invoice against a fresh computation.
/// Returns every mismatch found (not just the first).
pub fn validate_totals(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let totals = &invoice.totals;

    // TOT-05: identity on the cached values themselves
    let expected_grand = totals
        .subtotal
        .checked_add(totals.tax_total)
        .and_then(|v| v.checked_sub(totals.effective_discount));
    if expected_grand != Some(totals.grand_total) {
        errors.push(ValidationError::with_rule(
            "totals.grand_total",
            format!(
                "grand total {} does not match subtotal {} + tax {} - discount {}",
                totals.grand_total, totals.subtotal, totals.tax_total, totals.effective_discount
            ),
            "TOT-05",
        ));
    }
    if totals.grand_total < Decimal::ZERO {
        errors.push(ValidationError::with_rule(
            "totals.grand_total",
            format!("grand total {} must not be negative", totals.grand_total),
            "TOT-05",
        ));
    }

    let recomputed = match compute_invoice_totals(&invoice.lines, invoice.discount) {
        Ok(t) => t,
        Err(e) => {
            errors.push(ValidationError::with_rule("lines", e.to_string(), "TOT-01"));
            return errors;
        }
    };

    let checks = [
        ("totals.subtotal", totals.subtotal, recomputed.subtotal, "TOT-01"),
        ("totals.tax_total", totals.tax_total, recomputed.tax_total, "TOT-02"),
        (
            "totals.effective_discount",
            totals.effective_discount,
            recomputed.effective_discount,
            "TOT-03",
        ),
        ("totals.grand_total", totals.grand_total, recomputed.grand_total, "TOT-04"),
    ];
    for (field, stored, expected, rule) in checks {
        if stored != expected {
            errors.push(ValidationError::with_rule(
                field,
                format!("stored value {stored} does not match recomputed {expected}"),
                rule,
            ));
        }
    }

    errors
}
