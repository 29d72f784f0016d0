//! Invoice renderer
//!
//! Turns an invoice payload into printer directives. Rendering is pure:
//! the same payload always yields the same directive sequence.

use shared::{LineItem, PrintData, PrintJob};
use spool_printer::{Directive, DirectiveBuilder, pad_column};

use super::money::{format_decimal, format_money, format_quantity};
use crate::error::RenderError;

const ITEM_WIDTH: usize = 18;
const QTY_WIDTH: usize = 4;
const PRICE_WIDTH: usize = 8;
const TOTAL_WIDTH: usize = 8;

/// Invoice renderer
///
/// Layout: header, meta block, item table, totals, footer.
#[derive(Debug, Clone)]
pub struct InvoiceRenderer {
    width: usize,
}

impl InvoiceRenderer {
    /// Create a renderer for the given paper width in characters
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Decode a job's payload and render it
    pub fn render_job(&self, job: &PrintJob) -> Result<Vec<Directive>, RenderError> {
        let payload = job.print_data.as_ref().ok_or(RenderError::MissingPayload)?;
        let data = PrintData::from_payload(payload)?;
        self.render(&data)
    }

    /// Render an invoice to directives
    ///
    /// Fails only when a derived line total overflows.
    pub fn render(&self, data: &PrintData) -> Result<Vec<Directive>, RenderError> {
        let mut b = DirectiveBuilder::new(self.width);

        self.render_header(&mut b, data);
        self.render_meta(&mut b, data);
        self.render_items(&mut b, &data.products)?;
        self.render_totals(&mut b, data);
        self.render_footer(&mut b);

        Ok(b.build())
    }

    fn render_header(&self, b: &mut DirectiveBuilder, data: &PrintData) {
        b.center();
        b.bold();
        b.double_size();
        b.line(&data.company_name);
        b.reset_size();
        b.bold_off();

        if !data.company_address.is_empty() {
            b.line(&data.company_address);
        }
        if !data.company_vat.is_empty() {
            b.line(&format!("VAT Reg: {}", data.company_vat));
        }

        b.left();
        b.sep_single();
    }

    fn render_meta(&self, b: &mut DirectiveBuilder, data: &PrintData) {
        b.line(&format!("Invoice: {}", data.invoice_id));
        b.line(&format!("Date: {}", data.date));
        b.line(&format!("Member: {}", data.member_name));
        b.line(&format!("Department: {}", data.department));
        b.line(&format!("Payment: {}", data.payment_type.to_uppercase()));
        b.sep_single();
    }

    fn render_items(
        &self,
        b: &mut DirectiveBuilder,
        items: &[LineItem],
    ) -> Result<(), RenderError> {
        b.line(&table_row("Item", "Qty", "Price", "Total"));

        for item in items {
            let total = item
                .line_total()
                .ok_or_else(|| RenderError::Overflow(item.name.clone()))?;
            b.line(&table_row(
                &item.name,
                &format_quantity(item.quantity),
                &format_money(item.price),
                &format_decimal(total),
            ));
        }

        b.sep_single();
        Ok(())
    }

    fn render_totals(&self, b: &mut DirectiveBuilder, data: &PrintData) {
        b.line(&format!("Discount: {}", format_money(data.discount)));
        b.line(&format!("Service: {}", format_money(data.service_charge)));
        b.line(&format!("VAT: {}", format_money(data.vat_amount)));
        b.line(&format!(
            "Invoice Discount: {}",
            format_money(data.invoice_discount_amount)
        ));
        b.line(&format!("TOTAL: {}", format_money(data.total)));

        if !data.total_in_words.is_empty() {
            b.line(&format!("In Words: {}", data.total_in_words));
        }
    }

    fn render_footer(&self, b: &mut DirectiveBuilder) {
        b.sep_single();
        b.center();
        b.line("Thank you!");
        b.feed(4);
        b.cut();
        b.close();
    }
}

impl Default for InvoiceRenderer {
    fn default() -> Self {
        Self::new(48)
    }
}

fn table_row(item: &str, qty: &str, price: &str, total: &str) -> String {
    format!(
        "{}{}{}{}",
        pad_column(item, ITEM_WIDTH),
        pad_column(qty, QTY_WIDTH),
        pad_column(price, PRICE_WIDTH),
        pad_column(total, TOTAL_WIDTH)
    )
}
