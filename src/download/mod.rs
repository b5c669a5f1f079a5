/// Run identifiers, artifacts, and media-kind classification
pub mod artifact;
/// Best-effort deletion of downloaded artifacts
pub mod cleanup;
/// Download error taxonomy and extractor diagnostic classification
pub mod error;
/// Discovery of the files one extraction run produced
pub mod resolve;
/// Instagram link recognition and extraction
pub mod url;
/// yt-dlp extraction adapter
pub mod ytdlp;

pub use artifact::{Artifact, MediaKind, RunId};
pub use error::DownloadError;
pub use ytdlp::{Extractor, ExtractorConfig};
