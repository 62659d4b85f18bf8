use once_cell::sync::Lazy;

/// Environment variable that turns on `[TRACE]` output on stderr.
pub const TRACE_ENV: &str = "CALCULUS_EXPR_TRACE";

pub(crate) static TRACE_ENABLED: Lazy<bool> = Lazy::new(|| {
    std::env::var(TRACE_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

macro_rules! trace {
    ($($arg:tt)*) => {
        if *$crate::trace::TRACE_ENABLED {
            eprintln!("[TRACE] {}", format_args!($($arg)*));
        }
    };
}
