//! # billpress – layout-driven invoice PDF rendering
//!
//! Turns stored billing data into a styled, paginated PDF invoice and
//! composes the companion email artifacts. The core is a user-authored
//! [`LayoutSpec`](layout_spec::LayoutSpec) (colors, fonts, header/footer
//! fragments, ordered line-item columns, logo) plus an
//! [`InvoiceRecord`](invoice::InvoiceRecord); one render call flows through:
//!
//! 1. **Context** – merge invoice + layout, sort columns ([`context`])
//! 2. **Template** – expand the fixed structural document ([`document`])
//! 3. **Theme** – compile the four theme values into a stylesheet ([`theme`])
//! 4. **Parse** – composed markup → DOM tree ([`dom`])
//! 5. **Style** – apply stylesheet rules and inline styles ([`css`])
//! 6. **Layout** – compute flexbox/table layout with Taffy ([`layout`])
//! 7. **Paginate** – split into pages ([`pagination`])
//! 8. **Render** – emit PDF bytes via printpdf ([`pdf`])
//!
//! Transport concerns (HTTP, SMTP, object storage, datastore access) are
//! external collaborators; [`email`] and
//! [`DocumentArtifact`](pipeline::DocumentArtifact) define the contracts
//! they consume.

pub mod context;
pub mod css;
pub mod document;
pub mod dom;
pub mod email;
pub mod error;
pub mod fonts;
pub mod invoice;
pub mod layout;
pub mod layout_spec;
pub mod page;
pub mod pagination;
pub mod pdf;
pub mod pipeline;
pub mod sample;
pub mod theme;

// Re-exports for convenience
pub use error::{ContextError, LayoutError, PipelineError, RenderError};
pub use invoice::{InvoiceRecord, LineItem};
pub use layout_spec::LayoutSpec;
pub use pipeline::{preview, render_invoice, render_invoice_bytes, render_invoice_json, DocumentArtifact};
