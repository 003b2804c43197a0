pub mod markup;
pub mod types;

pub use markup::{
    contains_code, extract_code, sanitize_for_speech, strip_emphasis_markup, tokenize, Segment,
    SPEECH_CODE_PLACEHOLDER,
};
pub use types::{ArchiveEntry, Message, Role, UPLOADED_IMAGE_PLACEHOLDER};
