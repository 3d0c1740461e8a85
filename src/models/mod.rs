pub mod certificate_type;
pub mod config;
pub mod request;
pub mod style;
pub mod template_ref;

pub use certificate_type::CertificateType;
pub use config::{AppConfig, FontSettings, HackathonRecord, HttpSettings};
pub use request::{RenderRequest, RenderResult};
pub use style::{FontDescriptor, HexColor, PartialStyle, StyleConfig, TextAlign};
pub use template_ref::{TemplateLocation, TemplateReference, TemplateSourceKind};
