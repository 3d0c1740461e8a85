pub mod certificate;

pub use certificate::{
    handle_certificate, handle_render_request, handle_resolve, handle_typed_certificate,
    CertificateQuery, ResolveQuery, ResolveResponse,
};
pub use certificate::{
    __path_handle_certificate, __path_handle_render_request, __path_handle_resolve,
    __path_handle_typed_certificate,
};
