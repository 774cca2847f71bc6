//! Capacity-bounded text formatting.
//!
//! Every helper here measures the formatted length first and only then writes, so a destination
//! that is too small is reported as [`FormatError::CapacityExceeded`] and is never partially
//! filled.

use std::fmt::{self, Write};

use crate::err::{FormatError, FormatResult};

/// Counts bytes without storing them.
struct Counter(usize);

impl Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// `fmt::Write` over a fixed byte slice. Refuses writes past the end.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos.checked_add(s.len()).ok_or(fmt::Error)?;
        let dst = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dst.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

#[inline]
fn measure(args: fmt::Arguments<'_>) -> usize {
    let mut counter = Counter(0);
    // `Counter` itself never fails.
    let _ = fmt::write(&mut counter, args);
    counter.0
}

/// Writes `args` into `buf`, returning the number of bytes written.
pub(crate) fn write_bounded(
    what: &'static str,
    buf: &mut [u8],
    args: fmt::Arguments<'_>,
) -> FormatResult<usize> {
    let need = measure(args);
    let capacity = buf.len();
    let overflow = FormatError::CapacityExceeded {
        what,
        need,
        capacity,
    };

    if need > capacity {
        return Err(overflow);
    }

    let mut writer = SliceWriter { buf, pos: 0 };
    fmt::write(&mut writer, args).map_err(|_| overflow)?;
    Ok(writer.pos)
}

/// Renders `args` into an owned string of at most `capacity` bytes.
pub(crate) fn format_bounded(
    what: &'static str,
    capacity: usize,
    args: fmt::Arguments<'_>,
) -> FormatResult<String> {
    let need = measure(args);
    if need > capacity {
        return Err(FormatError::CapacityExceeded {
            what,
            need,
            capacity,
        });
    }

    let mut out = String::with_capacity(need);
    out.write_fmt(args)
        .map_err(|_| FormatError::CapacityExceeded {
            what,
            need,
            capacity,
        })?;
    Ok(out)
}
