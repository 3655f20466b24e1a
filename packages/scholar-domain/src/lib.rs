pub mod batch;
pub mod document;
pub mod filename;
pub mod normalize;
pub mod record;

pub use batch::{Batch, partition};
pub use document::{Assessment, Document, OMITTED_REASON, rank_by_score};
pub use filename::{asset_file_name, sanitize_filename};
pub use normalize::{NormalizeError, normalize};
pub use record::ScoreRecord;
