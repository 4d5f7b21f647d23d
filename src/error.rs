use snafu::Snafu;

/// The public Error type for this library.
#[derive(Debug, Snafu)]
pub struct Error(LibError);

/// The public Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// The internal Result type for this library.
pub(crate) type LibResult<T> = std::result::Result<T, LibError>;

/// The internal Error type for this library.
///
/// Only semantic input rejection and resource exhaustion (see the crate's
/// error taxonomy) reach here. Programming invariant violations never
/// produce an `Error` value — they panic via `bug!()` instead, since a
/// caller cannot sensibly recover from them.
#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub(crate) enum LibError {
    #[snafu(display("{}: invalid argument: {}", site, description))]
    InvalidArgument { site: String, description: String },

    #[snafu(display("{}: measure {} is not a valid insertion point: {}", site, measure, description))]
    BadMeasure {
        site: String,
        measure: u32,
        description: String,
    },

    #[snafu(display("{}: event pool exhausted", site))]
    PoolExhausted { site: String },
}

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

/// Panics with a diagnostic identifying the call site. Used exclusively for
/// violations of this crate's own invariants (corrupt cursor, double free,
/// empty-list removal) -- never for input the caller merely got wrong.
macro_rules! bug {
    ($msg:expr) => {
        panic!("{}: internal invariant violated: {}", site!(), $msg)
    };
    ($fmt:expr, $($arg:expr),+) => {
        panic!("{}: internal invariant violated: {}", site!(), format!($fmt, $($arg),+))
    };
}

macro_rules! invalid_argument {
    ($msg:expr) => {
        return crate::error::InvalidArgument {
            site: site!(),
            description: $msg,
        }
        .fail()
    };
    ($fmt:expr, $($arg:expr),+) => {
        return crate::error::InvalidArgument {
            site: site!(),
            description: format!($fmt, $($arg),+),
        }
        .fail()
    };
}

macro_rules! bad_measure {
    ($measure:expr, $msg:expr) => {
        return crate::error::BadMeasure {
            site: site!(),
            measure: $measure,
            description: $msg,
        }
        .fail()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_test() {
        let line = line!() + 1;
        let site = site!();
        assert!(site.contains("error.rs"));
        assert!(site.contains(format!("{}", line).as_str()));
    }

    #[test]
    fn invalid_argument_macro_carries_message() {
        fn foo() -> LibResult<u64> {
            invalid_argument!("bad channel {}", 99);
        }
        let result = foo();
        assert!(result.is_err());
        let message = format!("{}", result.err().unwrap());
        assert!(message.contains("bad channel 99"));
    }

    #[test]
    fn bad_measure_macro_carries_measure_number() {
        fn foo() -> LibResult<u64> {
            bad_measure!(7, "not on a measure boundary");
        }
        let result = foo();
        assert!(result.is_err());
        let message = format!("{}", result.err().unwrap());
        assert!(message.contains("measure 7"));
        assert!(message.contains("not on a measure boundary"));
    }

    #[test]
    #[should_panic(expected = "internal invariant violated")]
    fn bug_macro_panics() {
        bug!("cursor pointed past end of track");
    }
}
