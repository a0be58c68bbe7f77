//! Background conversion jobs
//!
//! A conversion runs on tokio's blocking pool and streams [`JobMessage`]s
//! back to whoever started it. Only one conversion may hold a
//! [`ConversionSlot`] at a time; a second request is refused with
//! [`ConversionError::Busy`].

use crate::fonts::GlyphCoverageIndex;
use crate::pipeline::{convert_file, ConversionError, ConversionReport, RandomizationSettings};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Progress updates sent from a running conversion
#[derive(Debug, Clone)]
pub enum JobMessage {
    Started { input: PathBuf, output: PathBuf },
    /// Zero-based ordinal of a paragraph that has just been transformed
    ParagraphDone(usize),
    Completed(ConversionReport),
    Failed(String),
}

/// Everything a conversion job needs, owned so it can move to another thread
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub index: Arc<GlyphCoverageIndex>,
    pub settings: RandomizationSettings,
    pub seed: Option<u64>,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Guards against overlapping conversions
#[derive(Debug, Clone, Default)]
pub struct ConversionSlot {
    busy: Arc<AtomicBool>,
}

/// Holds the slot until dropped
#[derive(Debug)]
pub struct SlotGuard {
    busy: Arc<AtomicBool>,
}

impl ConversionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn try_acquire(&self) -> Result<SlotGuard, ConversionError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ConversionError::Busy)?;
        Ok(SlotGuard {
            busy: Arc::clone(&self.busy),
        })
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Start a conversion on the blocking pool.
///
/// Must be called from within a tokio runtime. Fails immediately with
/// [`ConversionError::Busy`] when `slot` is taken; otherwise the slot is
/// released when the job finishes, whatever its outcome.
pub fn spawn_conversion(
    slot: &ConversionSlot,
    request: ConversionRequest,
    tx: mpsc::UnboundedSender<JobMessage>,
) -> Result<JoinHandle<Result<ConversionReport, ConversionError>>, ConversionError> {
    let guard = slot.try_acquire()?;

    Ok(tokio::task::spawn_blocking(move || {
        let _guard = guard;
        // The receiver may have gone away; the job still runs to completion
        let _ = tx.send(JobMessage::Started {
            input: request.input.clone(),
            output: request.output.clone(),
        });

        let result = convert_file(
            &request.index,
            request.settings,
            request.seed,
            &request.input,
            &request.output,
            |ordinal| {
                let _ = tx.send(JobMessage::ParagraphDone(ordinal));
            },
        );

        let _ = match &result {
            Ok(report) => tx.send(JobMessage::Completed(report.clone())),
            Err(e) => tx.send(JobMessage::Failed(e.to_string())),
        };
        result
    }))
}
