//! Collaborators and run flags shared by every engine stage.
use std::sync::Arc;

use crate::logging::Log;
use crate::operations::{
    ContentReader, ContentRenderer, DestinationLister, FsContentReader, HandlebarsRenderer,
    LocalDestination, PathRemover, PathWriter,
};

/// Shared context for one reconciliation run.
#[derive(Clone)]
pub struct Context {
    /// Logger for progress and decisions.
    pub log: Arc<dyn Log>,
    /// Check mode: the destination reports changes without applying them.
    pub dry_run: bool,
    /// Walk source roots in parallel using Rayon.
    pub parallel: bool,
    /// Lists the destination tree.
    pub lister: Arc<dyn DestinationLister>,
    /// Reads plain source files.
    pub reader: Arc<dyn ContentReader>,
    /// Renders template source files.
    pub renderer: Arc<dyn ContentRenderer>,
    /// Creates files and directories.
    pub writer: Arc<dyn PathWriter>,
    /// Removes destination objects.
    pub remover: Arc<dyn PathRemover>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("parallel", &self.parallel)
            .field("lister", &"<dyn DestinationLister>")
            .field("reader", &"<dyn ContentReader>")
            .field("renderer", &"<dyn ContentRenderer>")
            .field("writer", &"<dyn PathWriter>")
            .field("remover", &"<dyn PathRemover>")
            .finish()
    }
}

impl Context {
    /// Context targeting the local filesystem with handlebars rendering.
    #[must_use]
    pub fn local(log: Arc<dyn Log>, dry_run: bool, parallel: bool) -> Self {
        let mut ctx = Self::with_destination(log, Arc::new(LocalDestination::system(dry_run)));
        ctx.dry_run = dry_run;
        ctx.parallel = parallel;
        ctx
    }

    /// Context whose lister, writer and remover are all `destination`.
    ///
    /// Sources are read from the local filesystem.  Check mode and
    /// parallelism are off; set the public fields to change them.
    #[must_use]
    pub fn with_destination<D>(log: Arc<dyn Log>, destination: Arc<D>) -> Self
    where
        D: DestinationLister + PathWriter + PathRemover + 'static,
    {
        Self {
            log,
            dry_run: false,
            parallel: false,
            lister: Arc::clone(&destination) as Arc<dyn DestinationLister>,
            reader: Arc::new(FsContentReader),
            renderer: Arc::new(HandlebarsRenderer::new()),
            writer: Arc::clone(&destination) as Arc<dyn PathWriter>,
            remover: destination,
        }
    }

    /// Replace the path writer (used to inject mocks in tests).
    #[must_use]
    pub fn with_writer(mut self, writer: Arc<dyn PathWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Replace the path remover (used to inject mocks in tests).
    #[must_use]
    pub fn with_remover(mut self, remover: Arc<dyn PathRemover>) -> Self {
        self.remover = remover;
        self
    }
}
