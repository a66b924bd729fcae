use crate::host::BLOCK_SIZE;

/// Adapts a frame-at-a-time caller to block-at-a-time effects.
///
/// Each call pairs one [`push_input`](Self::push_input) with one
/// [`pop_output`](Self::pop_output). When the input accumulator fills, the
/// owner runs [`process_block`](Self::process_block) once, which replaces the
/// output block and rewinds both cursors. Output therefore lags input by
/// `N - 1` frames.
pub struct BlockBuffer<const N: usize = BLOCK_SIZE> {
    input: [[f32; N]; 2],
    output: [[f32; N]; 2],
    in_pos: usize,
    out_pos: usize,
}

impl<const N: usize> Default for BlockBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BlockBuffer<N> {
    pub const fn new() -> Self {
        assert!(N > 0, "block size must be non-zero");
        Self {
            input: [[0.0; N]; 2],
            output: [[0.0; N]; 2],
            in_pos: 0,
            out_pos: 0,
        }
    }

    pub const fn is_full(&self) -> bool {
        self.in_pos == N
    }

    /// Accumulate one stereo frame. Returns `true` once a full block is
    /// waiting for [`process_block`](Self::process_block).
    pub fn push_input(&mut self, left: f32, right: f32) -> bool {
        debug_assert!(!self.is_full(), "full block was never processed");
        if self.is_full() {
            // Unprocessed block; start over rather than index out of range.
            self.in_pos = 0;
        }

        self.input[0][self.in_pos] = left;
        self.input[1][self.in_pos] = right;
        self.in_pos += 1;
        self.is_full()
    }

    /// Run `process` over the accumulated block and rewind. Does nothing
    /// unless the block is full.
    pub fn process_block<F>(&mut self, process: F)
    where
        F: FnOnce([&[f32]; 2], [&mut [f32]; 2]),
    {
        if !self.is_full() {
            return;
        }

        let [in_l, in_r] = &self.input;
        let [out_l, out_r] = &mut self.output;
        process([in_l, in_r], [out_l, out_r]);

        self.in_pos = 0;
        self.out_pos = 0;
    }

    /// Next frame of the most recently produced output block.
    pub fn pop_output(&mut self) -> (f32, f32) {
        let frame = (self.output[0][self.out_pos], self.output[1][self.out_pos]);
        self.out_pos = (self.out_pos + 1) % N;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_fills_after_n_frames() {
        let mut buffer = BlockBuffer::<4>::new();
        assert!(!buffer.push_input(0.1, 0.1));
        assert!(!buffer.push_input(0.2, 0.2));
        assert!(!buffer.push_input(0.3, 0.3));
        assert!(buffer.push_input(0.4, 0.4));
        assert!(buffer.is_full());
    }

    #[test]
    fn test_process_runs_once_per_block() {
        let mut buffer = BlockBuffer::<4>::new();
        let mut calls = 0;

        for i in 0..16 {
            if buffer.push_input(i as f32, -(i as f32)) {
                buffer.process_block(|_, _| calls += 1);
            }
            buffer.pop_output();
        }

        assert_eq!(calls, 4);
    }

    #[test]
    fn test_outputs_come_from_exactly_one_block() {
        let mut buffer = BlockBuffer::<4>::new();
        for i in 1..=4 {
            if buffer.push_input(i as f32, 10.0 * i as f32) {
                buffer.process_block(|input, output| {
                    for (inp, out) in input.into_iter().zip(output) {
                        for (i, o) in inp.iter().zip(out.iter_mut()) {
                            *o = *i * 2.0;
                        }
                    }
                });
            }
        }

        let frames: Vec<_> = (0..4).map(|_| buffer.pop_output()).collect();
        assert_eq!(frames, [(2.0, 20.0), (4.0, 40.0), (6.0, 60.0), (8.0, 80.0)]);
    }

    #[test]
    fn test_process_is_ignored_on_partial_block() {
        let mut buffer = BlockBuffer::<4>::new();
        buffer.push_input(1.0, 1.0);

        let mut called = false;
        buffer.process_block(|_, _| called = true);
        assert!(!called);
    }

    #[test]
    fn test_output_cursor_stays_in_range() {
        let mut buffer = BlockBuffer::<2>::new();
        for _ in 0..5 {
            buffer.pop_output();
        }
        assert_eq!(buffer.pop_output(), (0.0, 0.0));
    }
}
