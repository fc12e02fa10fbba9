// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trace ring buffers for the display PHY drivers
//!
//! This contains an implementation for a static ring buffer designed to be
//! used to instrument arbitrary contexts, such as a message bus transaction
//! or a link-training handshake.  The design center is debugging bring-up:
//! every bounded wait that times out, every bus reset and every training
//! state change leaves an entry behind, and the entries can be inspected
//! with a debugger or read back on the host with [`Ringbuf::iter_recent`].
//!
//! ## Constraints
//!
//! The type in the ring buffer must implement both `Copy` and `PartialEq`.
//!
//! If you use the variants of the `ringbuf!` macro that leave the name of the
//! data structure implicit, you can only have one per module. (You can lift
//! this constraint by providing a name.)
//!
//! ## Creating a ring buffer
//!
//! Ring buffers are instantiated with the [`ringbuf!`] macro, to which one
//! must provide the type of per-entry payload, the number of entries, and a
//! static initializer:
//!
//! ```ignore
//! ringbuf!(Trace, 32, Trace::None);
//! ```
//!
//! Entries are generated with [`ringbuf_entry!`]:
//!
//! ```ignore
//! ringbuf_entry!(Trace::BusReset { lane: 0 });
//! ```
//!
//! A driver with several modules usually declares one buffer at the crate
//! root and records into it from each module with [`ringbuf_entry_root!`].
//!
//! ## Concurrency
//!
//! Each buffer sits behind a spin mutex, so drivers for independent ports
//! may record into the same buffer from different threads.  Entries from
//! different ports then interleave; the payload should carry whatever is
//! needed (e.g. the port) to tell them apart.

#![cfg_attr(target_os = "none", no_std)]

/// Re-export the lock so that code generated by the macros is guaranteed to
/// be able to find it.
pub use spin::Mutex;

/// Declares a ringbuffer in the current module or context.
///
/// `ringbuf!(NAME, Type, N, expr)` makes a ringbuffer named `NAME`,
/// containing entries of type `Type`, with room for `N` such entries, all of
/// which are initialized to `expr`.
///
/// The resulting ringbuffer will be static, so `NAME` should be uppercase.
/// The actual type of `NAME` will be `Mutex<Ringbuf<T, N>>`.
///
/// To support the common case of having one quickly-installed ringbuffer per
/// module, if you omit the name, it will default to `__RINGBUF`.
#[cfg(not(feature = "disabled"))]
#[macro_export]
macro_rules! ringbuf {
    ($name:ident, $t:ty, $n:expr, $init:expr) => {
        #[used]
        static $name: $crate::Mutex<$crate::Ringbuf<$t, $n>> =
            $crate::Mutex::new($crate::Ringbuf::new($init));
    };
    ($t:ty, $n:expr, $init:expr) => {
        $crate::ringbuf!(__RINGBUF, $t, $n, $init);
    };
}

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! ringbuf {
    ($name:ident, $t:ty, $n:expr, $init:expr) => {
        #[allow(dead_code)]
        const _: $t = $init;
    };
    ($t:ty, $n:expr, $init:expr) => {
        #[allow(dead_code)]
        const _: $t = $init;
    };
}

/// Inserts data into a named ringbuffer (which should have been declared with
/// the `ringbuf!` macro).
///
/// `ringbuf_entry!(NAME, expr)` will insert `expr` into the ringbuffer called
/// `NAME`.
///
/// If you declared your ringbuffer without a name, you can also use this
/// without a name, and it will default to `__RINGBUF`.
#[cfg(not(feature = "disabled"))]
#[macro_export]
macro_rules! ringbuf_entry {
    ($buf:expr, $payload:expr) => {{
        // Evaluate both buf and payload, without letting them access each
        // other, by evaluating them in a tuple where each cannot
        // accidentally use the other's binding.
        let (p, buf) = ($payload, &$buf);
        $crate::Ringbuf::entry(
            &mut *$crate::Mutex::lock(buf),
            line!() as u16,
            p,
        );
    }};
    ($payload:expr) => {
        $crate::ringbuf_entry!(__RINGBUF, $payload);
    };
}

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! ringbuf_entry {
    ($buf:expr, $payload:expr) => {{
        let _ = &$buf;
        let _ = &$payload;
    }};
    ($payload:expr) => {{
        let _ = &$payload;
    }};
}

/// Inserts data into a ringbuffer at the root of this crate.
#[cfg(not(feature = "disabled"))]
#[allow(clippy::crate_in_macro_def)]
#[macro_export]
macro_rules! ringbuf_entry_root {
    ($buf:ident, $payload:expr) => {
        $crate::ringbuf_entry!(crate::$buf, $payload);
    };
    ($payload:expr) => {
        $crate::ringbuf_entry!(crate::__RINGBUF, $payload);
    };
}

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! ringbuf_entry_root {
    ($buf:ident, $payload:expr) => {{
        let _ = &$payload;
    }};
    ($payload:expr) => {{
        let _ = &$payload;
    }};
}

///
/// The structure of a single [`Ringbuf`] entry, carrying a payload of arbitrary
/// type.  When a ring buffer entry is generated with an identical payload to
/// the most recent entry (in terms of both `line` and `payload`), `count` will
/// be incremented rather than generating a new entry.
///
#[derive(Debug, Copy, Clone)]
pub struct RingbufEntry<T: Copy + PartialEq> {
    pub line: u16,
    pub generation: u16,
    pub count: u32,
    pub payload: T,
}

///
/// A ring buffer of parametrized type and size.  In practice, instantiating
/// this directly is strange -- see the [`ringbuf!`] macro.
///
#[derive(Debug)]
pub struct Ringbuf<T: Copy + PartialEq, const N: usize> {
    pub last: Option<usize>,
    pub buffer: [RingbufEntry<T>; N],
}

impl<T: Copy + PartialEq, const N: usize> Ringbuf<T, { N }> {
    pub const fn new(init: T) -> Self {
        Self {
            last: None,
            buffer: [RingbufEntry {
                line: 0,
                generation: 0,
                count: 0,
                payload: init,
            }; N],
        }
    }

    pub fn entry(&mut self, line: u16, payload: T) {
        // On first use, last is None; treating it as an out-of-range index
        // makes the first entry land in slot 0 without touching any count.
        let last = self.last.unwrap_or(usize::MAX);

        // get_mut also covers a corrupted `last`, in which case we simply
        // start over at 0 below.
        if let Some(ent) = self.buffer.get_mut(last) {
            if ent.line == line && ent.payload == payload {
                // Only reuse this entry if we don't overflow the
                // count.
                if let Some(new_count) = ent.count.checked_add(1) {
                    ent.count = new_count;
                    return;
                }
            }
        }

        // usize::MAX wraps to 0 here, which is our starting slot.
        let ndx = {
            let last_plus_1 = last.wrapping_add(1);
            if last_plus_1 >= self.buffer.len() {
                0
            } else {
                last_plus_1
            }
        };

        let ent = &mut self.buffer[ndx];
        *ent = RingbufEntry {
            line,
            payload,
            count: 1,
            generation: ent.generation.wrapping_add(1),
        };

        self.last = Some(ndx);
    }

    /// Walks the populated entries from newest to oldest.
    pub fn iter_recent(&self) -> impl Iterator<Item = &RingbufEntry<T>> + '_ {
        let start = self.last.map(|l| l + 1).unwrap_or(0);
        (0..N)
            .map(move |i| &self.buffer[(start + N - 1 - i) % N])
            .take_while(|e| e.count != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq)]
    enum Trace {
        None,
        Poll(u8),
    }

    #[test]
    fn first_entry_lands_in_slot_zero() {
        let mut rb = Ringbuf::<Trace, 4>::new(Trace::None);
        rb.entry(10, Trace::Poll(1));
        assert_eq!(rb.last, Some(0));
        assert_eq!(rb.buffer[0].count, 1);
        assert_eq!(rb.buffer[0].generation, 1);
    }

    #[test]
    fn repeated_entries_are_counted() {
        let mut rb = Ringbuf::<Trace, 4>::new(Trace::None);
        for _ in 0..5 {
            rb.entry(10, Trace::Poll(1));
        }
        // same payload from a different line is a new entry
        rb.entry(11, Trace::Poll(1));
        assert_eq!(rb.buffer[0].count, 5);
        assert_eq!(rb.buffer[1].count, 1);
        assert_eq!(rb.last, Some(1));
    }

    #[test]
    fn wraps_and_bumps_generation() {
        let mut rb = Ringbuf::<Trace, 3>::new(Trace::None);
        for i in 0..4 {
            rb.entry(1, Trace::Poll(i));
        }
        assert_eq!(rb.last, Some(0));
        assert_eq!(rb.buffer[0].payload, Trace::Poll(3));
        assert_eq!(rb.buffer[0].generation, 2);
    }

    #[test]
    fn iter_recent_is_newest_first() {
        let mut rb = Ringbuf::<Trace, 4>::new(Trace::None);
        assert_eq!(rb.iter_recent().count(), 0);
        for i in 0..6 {
            rb.entry(1, Trace::Poll(i));
        }
        let seen: Vec<_> = rb.iter_recent().map(|e| e.payload).collect();
        assert_eq!(
            seen,
            [Trace::Poll(5), Trace::Poll(4), Trace::Poll(3), Trace::Poll(2)]
        );
    }

    ringbuf!(TEST_RINGBUF, Trace, 8, Trace::None);

    #[test]
    fn macro_records_into_static() {
        ringbuf_entry!(TEST_RINGBUF, Trace::Poll(7));
        let rb = TEST_RINGBUF.lock();
        assert!(rb.iter_recent().any(|e| e.payload == Trace::Poll(7)));
    }
}
