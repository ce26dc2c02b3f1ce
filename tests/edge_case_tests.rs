//! Boundary values and unusual inputs.

#![cfg(all(feature = "gst", feature = "query"))]

use chrono::NaiveDate;
use gstinvoice::core::*;
use gstinvoice::gst::*;
use gstinvoice::query::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn line(qty: i64, price: Decimal, rate: Decimal) -> LineItem {
    LineItemBuilder::new(qty, price).tax_rate(rate).build()
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

#[test]
fn max_tax_rate_is_inclusive() {
    let amounts = calculate_line(&line(1, dec!(100.00), MAX_TAX_RATE)).unwrap();
    assert_eq!(amounts.tax, dec!(28.00));
}

#[test]
fn fractional_rate_allowed() {
    // cess-style rates such as 0.25% and 1.5%
    let amounts = calculate_line(&line(4, dec!(25.00), dec!(0.25))).unwrap();
    assert_eq!(amounts.tax, dec!(0.25));
    let amounts = calculate_line(&line(1, dec!(99.99), dec!(1.5))).unwrap();
    assert_eq!(amounts.tax, dec!(1.50));
}

#[test]
fn discount_equal_to_subtotal() {
    let totals = compute_invoice_totals(&[line(2, dec!(50.00), dec!(18))], dec!(100.00)).unwrap();
    assert_eq!(totals.effective_discount, dec!(100.00));
    assert_eq!(totals.grand_total, dec!(18.00));
}

#[test]
fn sub_paisa_discount_rejected() {
    let lines = [line(1, dec!(10.00), dec!(0))];
    assert!(matches!(
        compute_invoice_totals(&lines, dec!(0.005)),
        Err(InvoiceError::InvalidDiscount(d)) if d == dec!(0.005)
    ));
    let totals = compute_invoice_totals(&lines, dec!(0.010)).unwrap();
    assert_eq!(totals.discount.to_string(), "0.01");
    assert_eq!(totals.grand_total, dec!(9.99));
}

#[test]
fn all_zero_invoice() {
    let totals = compute_invoice_totals(&[line(1, dec!(0), dec!(0))], dec!(50)).unwrap();
    assert_eq!(totals.effective_discount, dec!(0.00));
    assert_eq!(totals.grand_total, dec!(0.00));
    assert_eq!(totals.grand_total.to_string(), "0.00");
}

#[test]
fn huge_quantity_does_not_panic() {
    let result = calculate_line(&line(i64::MAX, Decimal::MAX, dec!(28)));
    assert!(matches!(result, Err(InvoiceError::InvalidLineItem { .. })));
}

#[test]
fn amount_without_room_for_paise_rejected() {
    // representable as a Decimal, but only with fewer than 2 fractional digits
    let err = calculate_line(&line(i64::MAX, dec!(3000000000.00), dec!(0))).unwrap_err();
    assert!(matches!(err, InvoiceError::InvalidLineItem { index: 0, .. }));
    assert!(err.to_string().contains("representable range"));

    let result = InvoiceBuilder::new("INV-1", date(2024, 1, 1))
        .vendor("V", "27AAPFU0939F1ZV")
        .billed_gstin("29AABCT1332L1ZA")
        .uploaded_by(OwnerId::new("alice"))
        .add_line(line(i64::MAX, dec!(3000000000.00), dec!(0)))
        .build();
    assert!(matches!(result, Err(InvoiceError::InvalidLineItem { .. })));
}

#[test]
fn sums_without_room_for_paise_rejected() {
    // each line keeps 2 digits, the subtotal of three does not
    let big = line(i64::MAX, dec!(30000000.00), dec!(0));
    assert_eq!(calculate_line(&big).unwrap().subtotal.scale(), 2);
    let err = compute_invoice_totals(&[big.clone(), big.clone(), big], Decimal::ZERO).unwrap_err();
    assert!(matches!(err, InvoiceError::InvalidLineItem { index: 2, .. }));
}

#[test]
fn huge_sum_does_not_panic() {
    let big = LineAmounts {
        subtotal: Decimal::MAX,
        tax: Decimal::ZERO,
    };
    assert!(aggregate(&[big, big], Decimal::ZERO).is_err());
}

#[test]
fn negative_line_amounts_rejected_by_aggregate() {
    let bad = LineAmounts {
        subtotal: dec!(-1.00),
        tax: Decimal::ZERO,
    };
    assert!(matches!(
        aggregate(&[bad], Decimal::ZERO),
        Err(InvoiceError::InvalidLineItem { index: 0, .. })
    ));
}

#[test]
fn many_small_lines_accumulate_exactly() {
    // 1000 × 0.01 with 18% tax: each line tax rounds 0.0018 → 0.00
    let lines = vec![line(1, dec!(0.01), dec!(18)); 1000];
    let totals = compute_invoice_totals(&lines, Decimal::ZERO).unwrap();
    assert_eq!(totals.subtotal, dec!(10.00));
    assert_eq!(totals.tax_total, dec!(0.00));
}

// ---------------------------------------------------------------------------
// GSTIN
// ---------------------------------------------------------------------------

#[test]
fn gstin_surrounding_whitespace_is_ignored() {
    let o = evaluate_compliance(
        " 27AAPFU0939F1ZV\t",
        "29AABCT1332L1ZA\n",
        &VerificationSignals::verified(),
    );
    assert_eq!(o.classification, Classification::Clean);
}

#[test]
fn gstin_inner_whitespace_rejected() {
    assert!(validate_gstin_format("27AAPFU 939F1ZV").is_err());
}

#[test]
fn gstin_special_state_codes() {
    assert!(validate_gstin_format("38AAPFU0939F1ZV").is_ok());
    assert!(validate_gstin_format("39AAPFU0939F1ZV").is_err());
    assert!(validate_gstin_format("99AAPFU0939F1ZV").is_ok());
}

#[test]
fn gstin_empty_and_multibyte() {
    let o = evaluate_compliance("", "", &VerificationSignals::verified());
    assert_eq!(o.flags.len(), 2);
    assert!(validate_gstin_format("27AAPFU0939F1Z€").is_err());
    assert_eq!(gstin_check_char("27AAPFU0939F1€"), None);
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[test]
fn filter_on_empty_collection() {
    let none: Vec<Invoice> = Vec::new();
    let page = filter_invoices(&OwnerId::new("alice"), "paid", &none).unwrap();
    assert_eq!(page.count, 0);
}

#[test]
fn whitespace_label_means_all() {
    assert_eq!(StatusFilter::from_label("   "), Some(StatusFilter::All));
}

#[test]
fn same_day_invoices_sorted_by_number() {
    let owner = OwnerId::new("alice");
    let invoices: Vec<Invoice> = ["INV-3", "INV-1", "INV-2"]
        .into_iter()
        .map(|n| {
            InvoiceBuilder::new(n, date(2024, 5, 1))
                .vendor("V", "27AAPFU0939F1ZV")
                .billed_gstin("29AABCT1332L1ZA")
                .uploaded_by(owner.clone())
                .add_line(line(1, dec!(1), dec!(0)))
                .build()
                .unwrap()
        })
        .collect();
    let page = filter_invoices(&owner, "all", &invoices).unwrap();
    let numbers: Vec<_> = page.invoices.iter().map(|i| i.number.as_str()).collect();
    assert_eq!(numbers, ["INV-1", "INV-2", "INV-3"]);
}

#[test]
fn dashboard_for_owner_without_invoices() {
    let none: Vec<Invoice> = Vec::new();
    let m = dashboard_metrics(&OwnerId::new("nobody"), &none, date(2024, 1, 31), 3).unwrap();
    assert_eq!(m.invoices_count, 0);
    assert_eq!(m.clients_count, 0);
    assert_eq!(m.pending_amount, dec!(0.00));
    assert_eq!(m.monthly_revenue.len(), 3);
    assert_eq!(m.monthly_revenue[0].month, "2023-11");
}
