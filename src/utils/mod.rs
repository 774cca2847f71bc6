mod bounded;
mod numeric;

pub(crate) use self::bounded::{format_bounded, write_bounded};
pub(crate) use self::numeric::{parse_int_lenient, parse_long_lenient};
