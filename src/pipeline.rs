//! Pipeline – ties the stages together into the operations callers use.
//!
//! One render call is one independent unit of work over immutable inputs:
//! context building, template expansion, theme compilation, markup parsing,
//! layout, pagination, and PDF emission all happen inside the call with no
//! shared state. The artifact is written to a fresh unique temp path; if any
//! stage fails, the partially written file is removed before the error
//! propagates.

use std::path::PathBuf;

use serde_json::Value;

use crate::context::RenderContext;
use crate::css::{build_styled_tree, Stylesheet};
use crate::document::invoice_html;
use crate::dom::{body_children, parse_html};
use crate::error::{PipelineError, RenderError};
use crate::fonts::FontManager;
use crate::invoice::InvoiceRecord;
use crate::layout::compute_layout;
use crate::layout_spec::LayoutSpec;
use crate::page::DocumentLayout;
use crate::pagination::paginate;
use crate::pdf::render_document;
use crate::sample::sample_invoice;
use crate::theme::{compile_stylesheet, Theme};

/// The finished rendered output plus where it was written.
///
/// Ownership transfers to the caller, which attaches or uploads the file and
/// is responsible for eventual cleanup of the path.
#[derive(Debug)]
pub struct DocumentArtifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Render an invoice against a layout and write the artifact to a fresh
/// temporary location.
pub fn render_invoice(
    invoice: &InvoiceRecord,
    layout: &LayoutSpec,
) -> Result<DocumentArtifact, PipelineError> {
    let bytes = render_invoice_bytes(invoice, layout)?;
    let path = persist_artifact(&bytes)?;
    Ok(DocumentArtifact { path, bytes })
}

/// Render an invoice to PDF bytes without touching the filesystem, for
/// callers that attach rather than upload.
pub fn render_invoice_bytes(
    invoice: &InvoiceRecord,
    layout: &LayoutSpec,
) -> Result<Vec<u8>, PipelineError> {
    let ctx = RenderContext::new(invoice.clone(), layout);
    render_context_bytes(&ctx)
}

/// Render a context the caller has already assembled, e.g. with a pinned
/// generated-at timestamp for reproducible output.
pub fn render_context_bytes(ctx: &RenderContext) -> Result<Vec<u8>, PipelineError> {
    let html = invoice_html(ctx);
    let css = compile_stylesheet(&Theme::from_layout(&ctx.layout));
    Ok(render_markup(&html, &css, &pdf_title(&ctx.invoice))?)
}

/// Render from raw JSON values as they come from the storage collaborators.
pub fn render_invoice_json(
    invoice: &Value,
    layout: &Value,
) -> Result<DocumentArtifact, PipelineError> {
    let layout = LayoutSpec::from_json(layout)?;
    let invoice = InvoiceRecord::from_json(invoice)?;
    render_invoice(&invoice, &layout)
}

/// Render the canonical sample invoice against a layout, for template
/// preview without live data.
pub fn preview(layout: &LayoutSpec) -> Result<DocumentArtifact, PipelineError> {
    render_invoice(&sample_invoice(), layout)
}

/// Compute the paginated layout without emitting PDF bytes (testing aid).
pub fn compute_document_layout(
    invoice: &InvoiceRecord,
    layout: &LayoutSpec,
) -> Result<DocumentLayout, PipelineError> {
    let ctx = RenderContext::new(invoice.clone(), layout);
    let html = invoice_html(&ctx);
    let css = compile_stylesheet(&Theme::from_layout(&ctx.layout));
    Ok(compose(&html, &css, &pdf_title(invoice))?)
}

fn pdf_title(invoice: &InvoiceRecord) -> String {
    if invoice.invoice_number.is_empty() {
        "Invoice".to_string()
    } else {
        format!("Invoice {}", invoice.invoice_number)
    }
}

/// The rendering backend: composed markup + stylesheet → PDF bytes.
fn render_markup(html: &str, css: &str, title: &str) -> Result<Vec<u8>, RenderError> {
    let layout = compose(html, css, title)?;
    log::debug!(
        "rendering `{title}`: {} page(s)",
        layout.pages.len()
    );
    render_document(&layout)
}

/// Markup + stylesheet → paginated document layout.
fn compose(html: &str, css: &str, title: &str) -> Result<DocumentLayout, RenderError> {
    let sheet = Stylesheet::parse(css)?;

    let dom = parse_html(html);
    let nodes = body_children(&dom);
    if nodes.is_empty() {
        return Err(RenderError::EmptyDocument);
    }

    let styled = build_styled_tree(&nodes, &sheet);
    let fonts = FontManager::new();
    let boxes = compute_layout(
        &styled,
        sheet.page.content_width(),
        sheet.page.margin_pt,
        &fonts,
    );

    Ok(paginate(
        &boxes,
        title,
        sheet.page.width_pt,
        sheet.page.height_pt,
        sheet.page.margin_pt,
        &fonts,
    ))
}

/// Write bytes to a fresh collision-free temp file and hand over the path.
/// The file is deleted automatically if anything fails before `keep`.
fn persist_artifact(bytes: &[u8]) -> Result<PathBuf, PipelineError> {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("invoice-")
        .suffix(".pdf")
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    let (_, path) = file
        .keep()
        .map_err(|e| PipelineError::Io(e.error))?;
    Ok(path)
}
