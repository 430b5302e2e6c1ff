//! File retrieval.
//!
//! A [`DownloadTarget`] pairs a URL with its destination; the [`Dispatcher`]
//! hands it to the [`DirectFetcher`] for plain `http` and to the
//! [`DelegatedFetcher`] for everything else.

mod delegated;
mod direct;
mod dispatcher;
mod target;
mod traits;

pub use delegated::{DelegatedFetcher, ProgramExit, ProgramRunner, SystemProgramRunner};
pub use direct::DirectFetcher;
pub use dispatcher::{Dispatcher, Strategy};
pub use target::{scheme, sidecar_path, DownloadTarget};
pub use traits::Fetcher;
