//! Order summary

use crate::{
    money::{format_amount, format_price},
    products::ProductSpecs,
    snapshot::OrderDocumentSnapshot,
};

use super::{
    DocumentError, DocumentKind, RenderedDocument,
    layout::{PAGE_TOP_MM, PageWriter, block_height, wrap},
};

const MARGIN: f32 = 14.0;
const DETAIL_INDENT: f32 = 18.0;
const AMOUNT_RIGHT: f32 = 170.0;
const SPECS_WIDTH: f32 = 165.0;
const BREAK_BEFORE_LINE: f32 = 250.0;
const LAST_BASELINE: f32 = 285.0;

/// Renders the order summary: item, quantity and price breakdown with the order total.
///
/// # Errors
///
/// Returns a [`DocumentError`] if the PDF cannot be written.
pub fn render_summary(snapshot: &OrderDocumentSnapshot) -> Result<RenderedDocument, DocumentError> {
    let code = DocumentKind::Summary.code(snapshot);

    let mut page = PageWriter::new();

    page.text(MARGIN, 18.0, 20.0, "STATIC - Order Summary");
    page.text(MARGIN, 28.0, 11.0, &format!("Summary: {code}"));
    page.text(MARGIN, 34.0, 11.0, &format!("Order: #{}", snapshot.order_id()));
    page.text(MARGIN, 40.0, 11.0, &format!("Date: {}", snapshot.formatted_date()));

    let mut y = 52.0;

    for (index, line) in snapshot.lines().iter().enumerate() {
        let specs = wrap(&specs_text(line.specs.as_ref()), SPECS_WIDTH, 10.0);

        if y > BREAK_BEFORE_LINE {
            page.add_page();
            y = PAGE_TOP_MM;
        }

        page.text(MARGIN, y, 11.0, &format!("{}. {}", index + 1, line.name));
        y += 6.0;

        page.text(
            DETAIL_INDENT,
            y,
            10.0,
            &format!(
                "Quantity: {}  |  Unit price: EUR {}  |  Line total: EUR {}",
                line.quantity,
                format_amount(line.unit_price),
                format_amount(line.subtotal())
            ),
        );
        y += 5.0;

        page.lines(DETAIL_INDENT, y, 10.0, &specs);
        y += block_height(&specs) + 5.0;
    }

    page.text_right(
        AMOUNT_RIGHT,
        (y + 2.0).min(LAST_BASELINE),
        12.0,
        &format!("Order total: {}", format_price(snapshot.total())),
    );

    Ok(RenderedDocument {
        kind: DocumentKind::Summary,
        file_name: format!("{code}.pdf"),
        bytes: page.finish()?,
    })
}

fn specs_text(specs: Option<&ProductSpecs>) -> String {
    match specs {
        Some(specs) => format!(
            "Height {}, Width {}, Weight {}, Load {}, Material {}",
            specs.height, specs.width, specs.weight, specs.load, specs.material
        ),
        None => "Specs not available".to_string(),
    }
}
