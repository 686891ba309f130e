//! Invoice

use crate::{
    money::format_price,
    products::ProductSpecs,
    snapshot::OrderDocumentSnapshot,
};

use super::{
    DocumentError, DocumentKind, RenderedDocument,
    layout::{PAGE_TOP_MM, PageWriter, block_height, wrap},
};

const MARGIN: f32 = 14.0;
const SPECS_INDENT: f32 = 18.0;
const AMOUNT_RIGHT: f32 = 170.0;
const SPECS_WIDTH: f32 = 148.0;
const NOTES_WIDTH: f32 = 180.0;
const BREAK_BEFORE_LINE: f32 = 250.0;
const BREAK_AFTER_LINE: f32 = 265.0;

/// Renders the invoice: customer block, item lines with specs, total and notes.
///
/// # Errors
///
/// Returns a [`DocumentError`] if the PDF cannot be written.
pub fn render_invoice(snapshot: &OrderDocumentSnapshot) -> Result<RenderedDocument, DocumentError> {
    let code = DocumentKind::Invoice.code(snapshot);
    let customer = snapshot.customer();

    let mut page = PageWriter::new();

    page.text(MARGIN, 18.0, 20.0, "STATIC - Invoice");

    page.text(MARGIN, 28.0, 11.0, &format!("Invoice: {code}"));
    page.text(MARGIN, 34.0, 11.0, &format!("Order: #{}", snapshot.order_id()));
    page.text(MARGIN, 40.0, 11.0, &format!("Date: {}", snapshot.formatted_date()));

    page.text(MARGIN, 52.0, 11.0, "Customer");
    page.text(MARGIN, 58.0, 11.0, &format!("Email: {}", customer.email));
    page.text(MARGIN, 64.0, 11.0, &format!("Phone: {}", customer.phone));
    page.text(
        MARGIN,
        70.0,
        11.0,
        &format!("Shipping: {}", customer.shipping_address),
    );
    page.text(
        MARGIN,
        76.0,
        11.0,
        &format!("Billing: {}", customer.billing_address),
    );
    page.text(
        MARGIN,
        82.0,
        11.0,
        &format!("Payment: {}", customer.payment_label),
    );

    let mut y = 94.0;
    page.text(MARGIN, y, 11.0, "Products");
    y += 8.0;

    for (index, line) in snapshot.lines().iter().enumerate() {
        let specs = wrap(&specs_text(line.specs.as_ref()), SPECS_WIDTH, 9.0);

        if y > BREAK_BEFORE_LINE {
            page.add_page();
            y = PAGE_TOP_MM;
        }

        page.text(
            MARGIN,
            y,
            11.0,
            &format!("{}. {} x{}", index + 1, line.name, line.quantity),
        );
        page.text_right(AMOUNT_RIGHT, y, 11.0, &format_price(line.subtotal()));
        y += 6.0;

        page.lines(SPECS_INDENT, y, 9.0, &specs);
        y += block_height(&specs) + 4.0;

        if y > BREAK_AFTER_LINE {
            page.add_page();
            y = PAGE_TOP_MM;
        }
    }

    y += 6.0;
    page.text_right(
        AMOUNT_RIGHT,
        y,
        12.0,
        &format!("Total: {}", format_price(snapshot.total())),
    );

    if !customer.notes.trim().is_empty() {
        y += 10.0;

        let notes = wrap(&format!("Notes: {}", customer.notes), NOTES_WIDTH, 10.0);
        page.lines(MARGIN, y, 10.0, &notes);
    }

    Ok(RenderedDocument {
        kind: DocumentKind::Invoice,
        file_name: format!("{code}.pdf"),
        bytes: page.finish()?,
    })
}

fn specs_text(specs: Option<&ProductSpecs>) -> String {
    match specs {
        Some(specs) => format!(
            "Specs: H {} • W {} • Weight {} • Load {} • Material {}",
            specs.height, specs.width, specs.weight, specs.load, specs.material
        ),
        None => "Specs: n/a".to_string(),
    }
}
