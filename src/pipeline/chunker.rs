//! Fixed-size chunking of variable-length capture frames.
//!
//! The capture side delivers frames of whatever length the driver hands out;
//! the estimator consumes blocks of exactly the configured chunk size. The
//! chunker bridges the two: append each frame to a residual buffer, emit
//! full chunks off the front, carry the remainder into the next call.

use crate::pipeline::types::{AudioChunk, AudioFrame};

/// Accumulates audio frames and emits fixed-size chunks.
///
/// Owned by the producer side of the pipeline; the residual buffer is never
/// visible to the consumer. Chunks do not overlap — each sample belongs to
/// exactly one emitted chunk, in arrival order.
#[derive(Debug)]
pub struct Chunker {
    chunk_size: usize,
    residual: Vec<f32>,
    next_sequence: u64,
}

impl Chunker {
    /// Creates a chunker emitting chunks of `chunk_size` samples.
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            chunk_size,
            residual: Vec::with_capacity(chunk_size * 2),
            next_sequence: 0,
        }
    }

    /// Ingests one frame, returning zero or more full chunks.
    ///
    /// An empty frame is reported and skipped; it never fails the pipeline.
    pub fn ingest(&mut self, frame: &AudioFrame) -> Vec<AudioChunk> {
        if frame.samples.is_empty() {
            eprintln!(
                "pitchline: empty audio frame (sequence {}), skipping",
                frame.sequence
            );
            return Vec::new();
        }

        self.residual.extend_from_slice(&frame.samples);

        let mut chunks = Vec::new();
        while self.residual.len() >= self.chunk_size {
            let samples: Vec<f32> = self.residual.drain(..self.chunk_size).collect();
            chunks.push(AudioChunk::new(samples, self.next_sequence));
            self.next_sequence += 1;
        }

        chunks
    }

    /// Number of samples currently held back, waiting for a full chunk.
    pub fn residual_len(&self) -> usize {
        self.residual.len()
    }

    /// The fixed chunk size this chunker emits.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Discards the residual and restarts sequence numbering.
    ///
    /// Used at session teardown: a partial block is dropped, never emitted
    /// short — a short block would bias the correlation window.
    pub fn reset(&mut self) {
        self.residual.clear();
        self.next_sequence = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn frame(samples: Vec<f32>, sequence: u64) -> AudioFrame {
        AudioFrame::new(samples, Instant::now(), sequence)
    }

    fn ramp(start: usize, len: usize) -> Vec<f32> {
        (start..start + len).map(|i| i as f32).collect()
    }

    #[test]
    fn no_chunk_until_threshold() {
        let mut chunker = Chunker::new(4096);

        let chunks = chunker.ingest(&frame(vec![0.0; 4095], 0));
        assert!(chunks.is_empty());
        assert_eq!(chunker.residual_len(), 4095);
    }

    #[test]
    fn exact_multiple_emits_full_chunks_with_no_residual() {
        let mut chunker = Chunker::new(1024);

        let chunks = chunker.ingest(&frame(ramp(0, 3 * 1024), 0));
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.samples.len() == 1024));
        assert_eq!(chunker.residual_len(), 0);
    }

    #[test]
    fn concatenated_chunks_equal_concatenated_input() {
        let mut chunker = Chunker::new(256);
        let mut input = Vec::new();
        let mut output = Vec::new();

        // Irregular frame lengths, total an exact multiple of 256
        for (i, len) in [100usize, 412, 1, 255, 256, 1024 - 100 - 412 - 1 - 255]
            .iter()
            .enumerate()
        {
            let samples = ramp(input.len(), *len);
            input.extend_from_slice(&samples);
            for chunk in chunker.ingest(&frame(samples, i as u64)) {
                output.extend_from_slice(&chunk.samples);
            }
        }

        assert_eq!(input.len() % 256, 0);
        assert_eq!(output, input);
        assert_eq!(chunker.residual_len(), 0);
    }

    #[test]
    fn single_sample_frames_match_one_large_frame() {
        let total = 2 * 512 + 100;
        let samples = ramp(0, total);

        let mut bulk = Chunker::new(512);
        let bulk_chunks = bulk.ingest(&frame(samples.clone(), 0));

        let mut trickle = Chunker::new(512);
        let mut trickle_chunks = Vec::new();
        for (i, &s) in samples.iter().enumerate() {
            trickle_chunks.extend(trickle.ingest(&frame(vec![s], i as u64)));
        }

        assert_eq!(bulk_chunks.len(), trickle_chunks.len());
        for (a, b) in bulk_chunks.iter().zip(trickle_chunks.iter()) {
            assert_eq!(a.samples, b.samples);
            assert_eq!(a.sequence, b.sequence);
        }
        assert_eq!(bulk.residual_len(), 100);
        assert_eq!(trickle.residual_len(), 100);
    }

    #[test]
    fn residual_prefixes_next_chunk() {
        let mut chunker = Chunker::new(8);

        assert!(chunker.ingest(&frame(ramp(0, 5), 0)).is_empty());
        let chunks = chunker.ingest(&frame(ramp(5, 6), 1));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].samples, ramp(0, 8));
        assert_eq!(chunker.residual_len(), 3);
    }

    #[test]
    fn chunk_sequences_are_consecutive() {
        let mut chunker = Chunker::new(16);
        let mut sequences = Vec::new();

        for i in 0..10 {
            for chunk in chunker.ingest(&frame(ramp(0, 7), i)) {
                sequences.push(chunk.sequence);
            }
        }

        let expected: Vec<u64> = (0..sequences.len() as u64).collect();
        assert_eq!(sequences, expected);
    }

    #[test]
    fn empty_frame_is_a_no_op() {
        let mut chunker = Chunker::new(8);
        chunker.ingest(&frame(ramp(0, 5), 0));

        let chunks = chunker.ingest(&frame(Vec::new(), 1));
        assert!(chunks.is_empty());
        assert_eq!(chunker.residual_len(), 5);

        // Pipeline continues normally afterwards
        let chunks = chunker.ingest(&frame(ramp(5, 3), 2));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].samples, ramp(0, 8));
    }

    #[test]
    fn reset_discards_residual_and_restarts_sequences() {
        let mut chunker = Chunker::new(8);
        chunker.ingest(&frame(ramp(0, 13), 0));
        assert_eq!(chunker.residual_len(), 5);

        chunker.reset();
        assert_eq!(chunker.residual_len(), 0);

        let chunks = chunker.ingest(&frame(ramp(100, 8), 1));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].sequence, 0);
        // Discarded residual must not leak into the new session's chunk
        assert_eq!(chunks[0].samples, ramp(100, 8));
    }

    #[test]
    #[should_panic(expected = "chunk size must be positive")]
    fn zero_chunk_size_is_rejected() {
        let _ = Chunker::new(0);
    }
}
