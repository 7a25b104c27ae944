//! Disjunctive (OR) merge of posting cursors
//!
//! Powers synonym groups: several term posting lists behave as one, with
//! frequencies summed wherever the lists agree on a document.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::Result;

use super::cursor::PostingCursor;
use super::types::DocId;

/// Merged cursor over the union of `k` sorted posting lists
///
/// At each output position the frequency (and each field frequency) is the
/// sum over the subset of inputs currently positioned at the output id.
/// The heap holds `(id, input_index)` so ties break deterministically by
/// input index; O(log k) per step.
pub struct OrPostingCursor {
    inputs: Vec<Box<dyn PostingCursor>>,
    heap: BinaryHeap<Reverse<(u32, usize)>>,
    current: u32,
    frequency: u32,
    fields: Vec<u32>,
    field_count: usize,
    started: bool,
}

impl OrPostingCursor {
    pub fn new(inputs: Vec<Box<dyn PostingCursor>>, field_count: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(inputs.len()),
            inputs,
            current: 0,
            frequency: 0,
            fields: vec![0; field_count],
            field_count,
            started: false,
        }
    }

    /// Move every input to its first posting and seed the heap
    fn start(&mut self) -> Result<()> {
        for (idx, input) in self.inputs.iter_mut().enumerate() {
            if let Some(id) = input.next()? {
                self.heap.push(Reverse((id.as_u32(), idx)));
            }
        }
        self.started = true;
        Ok(())
    }
}

impl PostingCursor for OrPostingCursor {
    fn next(&mut self) -> Result<Option<DocId>> {
        if !self.started {
            self.start()?;
        }
        let Reverse((id, _)) = match self.heap.peek() {
            Some(&entry) => entry,
            None => return Ok(None),
        };

        self.current = id;
        self.frequency = 0;
        self.fields.iter_mut().for_each(|f| *f = 0);

        // Drain every input positioned at this id, summing as we go
        while let Some(&Reverse((head, idx))) = self.heap.peek() {
            if head != id {
                break;
            }
            self.heap.pop();
            let input = &mut self.inputs[idx];
            self.frequency += input.frequency();
            if let Some(ffs) = input.field_frequencies() {
                for (sum, ff) in self.fields.iter_mut().zip(ffs) {
                    *sum += ff;
                }
            }
            if let Some(next_id) = input.next()? {
                self.heap.push(Reverse((next_id.as_u32(), idx)));
            }
        }
        Ok(Some(DocId(id)))
    }

    fn id(&self) -> DocId {
        DocId(self.current)
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn field_frequencies(&self) -> Option<&[u32]> {
        if self.field_count == 0 {
            None
        } else {
            Some(&self.fields)
        }
    }

    fn len_hint(&self) -> u32 {
        // Upper bound: the union is no larger than the sum of the inputs
        self.inputs.iter().map(|i| i.len_hint()).sum()
    }
}
