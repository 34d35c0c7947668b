pub mod models;
pub mod traits;
pub mod ytdlp;

pub use models::{FetchOptions, ProgressEvent, SubtitleSelection};
pub use traits::MediaFetcher;
pub use ytdlp::YtDlpFetcher;
