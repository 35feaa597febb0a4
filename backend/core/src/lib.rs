pub mod error;
pub mod frame;
pub mod traits;
pub mod types;

pub use error::StockError;
pub use frame::EncodedFrame;
pub use traits::{ExtractionProvider, ExtractionRequest, ExtractionResponse};
pub use types::{now_millis, Item, ItemDraft, ItemField};
