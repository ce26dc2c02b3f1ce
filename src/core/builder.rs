use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::InvoiceError;
use super::status::InvoiceStatus;
use super::totals;
use super::types::*;

/// Upper bound on line items per invoice.
pub const MAX_LINE_ITEMS: usize = 10_000;

/// Builder for constructing invoices with computed totals.
///
/// ```
/// use gstinvoice::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("INV-001", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
///     .vendor("Shree Traders", "27AAPFU0939F1ZV")
///     .billed_gstin("29AABCT1332L1ZA")
///     .uploaded_by(OwnerId::new("alice"))
///     .add_line(LineItemBuilder::new(3, dec!(10.00)).tax_rate(dec!(18)).build())
///     .add_line(LineItemBuilder::new(1, dec!(50.00)).build())
///     .discount(dec!(5.00))
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.totals.grand_total, dec!(80.40));
/// assert_eq!(invoice.status, InvoiceStatus::PendingAnalysis);
/// ```
pub struct InvoiceBuilder {
    number: String,
    issue_date: NaiveDate,
    vendor_name: Option<String>,
    vendor_gstin: Option<String>,
    billed_gstin: Option<String>,
    lines: Vec<LineItem>,
    discount: Decimal,
    uploaded_by: Option<OwnerId>,
    file_path: Option<String>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            issue_date,
            vendor_name: None,
            vendor_gstin: None,
            billed_gstin: None,
            lines: Vec::new(),
            discount: Decimal::ZERO,
            uploaded_by: None,
            file_path: None,
        }
    }

    pub fn vendor(mut self, name: impl Into<String>, gstin: impl Into<String>) -> Self {
        self.vendor_name = Some(name.into());
        self.vendor_gstin = Some(gstin.into());
        self
    }

    pub fn billed_gstin(mut self, gstin: impl Into<String>) -> Self {
        self.billed_gstin = Some(gstin.into());
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = LineItem>) -> Self {
        self.lines.extend(lines);
        self
    }

    pub fn discount(mut self, amount: Decimal) -> Self {
        self.discount = amount;
        self
    }

    pub fn uploaded_by(mut self, owner: OwnerId) -> Self {
        self.uploaded_by = Some(owner);
        self
    }

    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Build the invoice, computing totals.
    ///
    /// The result is always in `PENDING_ANALYSIS` with GST verification
    /// `PENDING` and no flags; evaluation happens afterwards.
    pub fn build(self) -> Result<Invoice, InvoiceError> {
        let vendor_name = self
            .vendor_name
            .ok_or_else(|| InvoiceError::Builder("vendor is required".into()))?;
        let vendor_gstin = self
            .vendor_gstin
            .ok_or_else(|| InvoiceError::Builder("vendor GSTIN is required".into()))?;
        let billed_gstin = self
            .billed_gstin
            .ok_or_else(|| InvoiceError::Builder("billed company GSTIN is required".into()))?;
        let uploaded_by = self
            .uploaded_by
            .ok_or_else(|| InvoiceError::Builder("uploader is required".into()))?;

        if self.number.trim().is_empty() {
            return Err(InvoiceError::Builder("invoice number must not be empty".into()));
        }
        if self.number.len() > 200 {
            return Err(InvoiceError::Builder(
                "invoice number cannot exceed 200 characters".into(),
            ));
        }
        if self.lines.len() > MAX_LINE_ITEMS {
            return Err(InvoiceError::Builder(format!(
                "invoice cannot have more than {MAX_LINE_ITEMS} line items"
            )));
        }

        let totals = totals::compute_invoice_totals(&self.lines, self.discount)?;

        Ok(Invoice {
            number: self.number,
            issue_date: self.issue_date,
            vendor_name,
            vendor_gstin,
            billed_gstin,
            lines: self.lines,
            discount: self.discount,
            totals,
            status: InvoiceStatus::PendingAnalysis,
            gst_verification: GstVerificationStatus::Pending,
            flags: Vec::new(),
            uploaded_by,
            file_path: self.file_path,
        })
    }
}

/// Builder for LineItem.
pub struct LineItemBuilder {
    quantity: i64,
    unit_price: Decimal,
    tax_rate: Decimal,
    description: Option<String>,
    hsn_sac: Option<String>,
}

impl LineItemBuilder {
    /// A line with 0% tax unless [`tax_rate`](Self::tax_rate) is set.
    pub fn new(quantity: i64, unit_price: Decimal) -> Self {
        Self {
            quantity,
            unit_price,
            tax_rate: Decimal::ZERO,
            description: None,
            hsn_sac: None,
        }
    }

    pub fn tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn hsn_sac(mut self, code: impl Into<String>) -> Self {
        self.hsn_sac = Some(code.into());
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            quantity: self.quantity,
            unit_price: self.unit_price,
            tax_rate: self.tax_rate,
            description: self.description,
            hsn_sac: self.hsn_sac,
        }
    }
}

impl Invoice {
    /// Swap in new line items and discount.
    ///
    /// Totals are recomputed first; on error the invoice is left untouched.
    /// On success lines, discount and totals change together, flags are
    /// dropped and the invoice goes back to `PENDING_ANALYSIS`.
    pub fn replace_lines(
        &mut self,
        lines: Vec<LineItem>,
        discount: Decimal,
    ) -> Result<&Totals, InvoiceError> {
        if lines.len() > MAX_LINE_ITEMS {
            return Err(InvoiceError::Builder(format!(
                "invoice cannot have more than {MAX_LINE_ITEMS} line items"
            )));
        }
        let totals = totals::compute_invoice_totals(&lines, discount)?;

        self.lines = lines;
        self.discount = discount;
        self.totals = totals;
        self.flags.clear();
        self.status = super::status::request_reanalysis(self.status);
        Ok(&self.totals)
    }
}
