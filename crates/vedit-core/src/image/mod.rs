//! Self-describing image blobs.
//!
//! Every image the editor holds is a data URL (`data:<mime>;base64,<payload>`),
//! so an entry can be displayed, exported or re-submitted without any lookup.

mod data_url;

pub use data_url::{DEFAULT_MIME_TYPE, InlineImage, OUTPUT_MIME_TYPE, encode, parse_data_url};
