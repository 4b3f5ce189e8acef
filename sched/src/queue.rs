//! Generic singly-linked list operations over the arena's intrusive `next`
//! field.
//!
//! One small set of primitives backs all three orderings so the bucket,
//! sleep-queue, and semaphore-wait-queue code in the rest of this crate
//! doesn't re-derive list surgery three times.

use crate::percpu::Bucket;
use crate::tcb::{Arena, Tcb};

fn next_of(arena: &mut Arena, index: u32) -> Option<u32> {
    arena.get_by_index_mut(index).and_then(|t| t.next)
}

fn set_next(arena: &mut Arena, index: u32, next: Option<u32>) {
    if let Some(tcb) = arena.get_by_index_mut(index) {
        tcb.next = next;
    }
}

/// Append to the tail of a priority bucket.
pub fn bucket_push_tail(arena: &mut Arena, bucket: &mut Bucket, index: u32) {
    set_next(arena, index, None);
    match bucket.tail {
        Some(tail) => set_next(arena, tail, Some(index)),
        None => bucket.head = Some(index),
    }
    bucket.tail = Some(index);
    bucket.len += 1;
}

/// Pop the head of a priority bucket.
pub fn bucket_pop_head(arena: &mut Arena, bucket: &mut Bucket) -> Option<u32> {
    let head = bucket.head?;
    let next = next_of(arena, head);
    bucket.head = next;
    if next.is_none() {
        bucket.tail = None;
    }
    bucket.len -= 1;
    Some(head)
}

/// Append to the tail of a plain FIFO list (no `len` counter; callers that
/// need a count track it separately, as semaphores do).
pub fn list_push_tail(
    arena: &mut Arena,
    head: &mut Option<u32>,
    tail: &mut Option<u32>,
    index: u32,
) {
    set_next(arena, index, None);
    match *tail {
        Some(t) => set_next(arena, t, Some(index)),
        None => *head = Some(index),
    }
    *tail = Some(index);
}

pub fn list_pop_head(
    arena: &mut Arena,
    head: &mut Option<u32>,
    tail: &mut Option<u32>,
) -> Option<u32> {
    let h = (*head)?;
    let next = next_of(arena, h);
    *head = next;
    if next.is_none() {
        *tail = None;
    }
    Some(h)
}

/// Insert `index` into a list ordered ascending by `key`, after every
/// existing entry whose key is `<=` the new one (spec: "FIFO within ties").
pub fn list_insert_sorted(
    arena: &mut Arena,
    head: &mut Option<u32>,
    index: u32,
    key: impl Fn(&Tcb) -> u64,
) {
    let index_key = arena.get_by_index_mut(index).map(|t| key(t)).unwrap_or(0);

    let mut prev: Option<u32> = None;
    let mut cursor = *head;
    while let Some(c) = cursor {
        let c_key = arena.get_by_index_mut(c).map(|t| key(t)).unwrap_or(0);
        if c_key > index_key {
            break;
        }
        prev = Some(c);
        cursor = next_of(arena, c);
    }

    set_next(arena, index, cursor);
    match prev {
        Some(p) => set_next(arena, p, Some(index)),
        None => *head = Some(index),
    }
}

/// Pop every head entry whose key (evaluated before each pop) satisfies
/// `pred`, in ascending order, calling `on_pop` for each. Used by the sleep
/// queue's tick drain.
pub fn drain_while(
    arena: &mut Arena,
    head: &mut Option<u32>,
    tail: &mut Option<u32>,
    key: impl Fn(&Tcb) -> u64,
    pred: impl Fn(u64) -> bool,
    mut on_pop: impl FnMut(&mut Arena, u32),
) {
    loop {
        let Some(h) = *head else { break };
        let h_key = arena.get_by_index_mut(h).map(|t| key(t)).unwrap_or(0);
        if !pred(h_key) {
            break;
        }
        list_pop_head(arena, head, tail);
        on_pop(arena, h);
    }
}
